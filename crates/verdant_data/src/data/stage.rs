use serde::{Deserialize, Serialize};

/// Discrete phase in a plant's lifecycle.
///
/// Stages only ever move forward, one step at a time. `Harvested` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum GrowthStage {
    #[default]
    Seed,
    Germination,
    Seedling,
    Vegetative,
    PreFlowering,
    Flowering,
    /// Ready to harvest.
    Harvest,
    Harvested,
}

impl GrowthStage {
    /// All stages in lifecycle order.
    pub const ALL: [GrowthStage; 8] = [
        GrowthStage::Seed,
        GrowthStage::Germination,
        GrowthStage::Seedling,
        GrowthStage::Vegetative,
        GrowthStage::PreFlowering,
        GrowthStage::Flowering,
        GrowthStage::Harvest,
        GrowthStage::Harvested,
    ];

    #[must_use]
    pub fn next(&self) -> Option<GrowthStage> {
        match self {
            GrowthStage::Seed => Some(GrowthStage::Germination),
            GrowthStage::Germination => Some(GrowthStage::Seedling),
            GrowthStage::Seedling => Some(GrowthStage::Vegetative),
            GrowthStage::Vegetative => Some(GrowthStage::PreFlowering),
            GrowthStage::PreFlowering => Some(GrowthStage::Flowering),
            GrowthStage::Flowering => Some(GrowthStage::Harvest),
            GrowthStage::Harvest => Some(GrowthStage::Harvested),
            GrowthStage::Harvested => None,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        *self as usize
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, GrowthStage::Harvested)
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            GrowthStage::Seed => "Seed",
            GrowthStage::Germination => "Germination",
            GrowthStage::Seedling => "Seedling",
            GrowthStage::Vegetative => "Vegetative",
            GrowthStage::PreFlowering => "Pre-Flowering",
            GrowthStage::Flowering => "Flowering",
            GrowthStage::Harvest => "Harvest Ready",
            GrowthStage::Harvested => "Harvested",
        }
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_walks_all_stages_in_order() {
        for pair in GrowthStage::ALL.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert_eq!(pair[0].index() + 1, pair[1].index());
        }
        assert_eq!(GrowthStage::Harvested.next(), None);
    }

    #[test]
    fn test_only_harvested_is_terminal() {
        let terminal: Vec<_> = GrowthStage::ALL
            .iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![&GrowthStage::Harvested]);
    }
}
