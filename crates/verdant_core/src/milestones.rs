//! One-time, threshold-triggered progress milestones.

use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;
use verdant_data::{GrowthStage, Milestone, MilestoneAchievement};

/// Recorded achievements, unique per (plant, milestone).
#[derive(Debug, Clone, Default)]
pub struct AchievementLog {
    by_plant: HashMap<Uuid, BTreeMap<String, MilestoneAchievement>>,
}

impl AchievementLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, plant_id: &Uuid, milestone_id: &str) -> bool {
        self.by_plant
            .get(plant_id)
            .is_some_and(|m| m.contains_key(milestone_id))
    }

    /// Returns `false` when the pair was already recorded; the original
    /// achievement is kept.
    pub fn record(&mut self, achievement: MilestoneAchievement) -> bool {
        let entry = self.by_plant.entry(achievement.plant_id).or_default();
        if entry.contains_key(&achievement.milestone_id) {
            return false;
        }
        entry.insert(achievement.milestone_id.clone(), achievement);
        true
    }

    pub fn for_plant(&self, plant_id: &Uuid) -> impl Iterator<Item = &MilestoneAchievement> {
        self.by_plant.get(plant_id).into_iter().flat_map(|m| m.values())
    }

    /// Drops every achievement of an unregistered plant.
    pub fn discard_plant(&mut self, plant_id: &Uuid) -> usize {
        self.by_plant.remove(plant_id).map_or(0, |m| m.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_plant.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Static milestone catalog, ordered by threshold within each stage.
#[derive(Debug, Clone)]
pub struct MilestoneTracker {
    catalog: BTreeMap<GrowthStage, Vec<Milestone>>,
}

impl Default for MilestoneTracker {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}

impl MilestoneTracker {
    #[must_use]
    pub fn new(milestones: Vec<Milestone>) -> Self {
        let mut catalog: BTreeMap<GrowthStage, Vec<Milestone>> = BTreeMap::new();
        for milestone in milestones {
            catalog.entry(milestone.stage).or_default().push(milestone);
        }
        for list in catalog.values_mut() {
            list.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
        }
        Self { catalog }
    }

    #[must_use]
    pub fn milestones_for(&self, stage: GrowthStage) -> &[Milestone] {
        self.catalog.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all(&self) -> impl Iterator<Item = &Milestone> {
        self.catalog.values().flatten()
    }

    /// Achievements newly reached by `plant_id` at `stage_progress`.
    ///
    /// Pure with respect to `already_achieved`: the caller records the
    /// returned achievements.
    #[must_use]
    pub fn check_and_record(
        &self,
        plant_id: Uuid,
        stage: GrowthStage,
        stage_progress: f32,
        already_achieved: &AchievementLog,
        timestamp: f64,
    ) -> Vec<MilestoneAchievement> {
        self.milestones_for(stage)
            .iter()
            .take_while(|m| m.threshold <= stage_progress)
            .filter(|m| !already_achieved.contains(&plant_id, &m.id))
            .map(|m| MilestoneAchievement {
                milestone_id: m.id.clone(),
                plant_id,
                timestamp,
            })
            .collect()
    }
}

/// Built-in milestones for every growing stage.
#[must_use]
pub fn default_catalog() -> Vec<Milestone> {
    use GrowthStage::*;
    vec![
        Milestone::new("seed_hydrated", "Seed Hydrated", Seed, 0.5),
        Milestone::new("taproot_emerged", "Taproot Emerged", Germination, 0.5),
        Milestone::new("germinated", "Germinated", Germination, 1.0),
        Milestone::new("first_true_leaves", "First True Leaves", Seedling, 0.3),
        Milestone::new("seedling_established", "Seedling Established", Seedling, 1.0),
        Milestone::new("topping_window", "Topping Window", Vegetative, 0.5),
        Milestone::new("vegetative_peak", "Vegetative Peak", Vegetative, 0.9),
        Milestone::new("pre_flowers_visible", "Pre-Flowers Visible", PreFlowering, 0.5),
        Milestone::new("first_buds", "First Buds", Flowering, 0.2),
        Milestone::new("peak_bloom", "Peak Bloom", Flowering, 0.6),
        Milestone::new("trichomes_cloudy", "Trichomes Cloudy", Flowering, 0.9),
        Milestone::new("harvest_ready", "Harvest Ready", Harvest, 1.0),
    ]
}
