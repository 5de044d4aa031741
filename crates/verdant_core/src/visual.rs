//! Visual targets for the renderer.
//!
//! The growth tick computes where each plant should look; the frame loop
//! eases the displayed values toward those targets at its own rate and
//! never mutates simulation state.

use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;
use verdant_data::{GeneticProfile, GrowthStage, GrowthState, StrainProfile, StressVector, VisualTarget};

const STRESS_COLOR: [f32; 3] = [0.72, 0.66, 0.24];
const HARVESTED_COLOR: [f32; 3] = [0.45, 0.36, 0.20];

/// Scale relative to mature size at the start of each stage.
#[must_use]
pub fn stage_scale(stage: GrowthStage) -> f32 {
    match stage {
        GrowthStage::Seed => 0.02,
        GrowthStage::Germination => 0.05,
        GrowthStage::Seedling => 0.12,
        GrowthStage::Vegetative => 0.3,
        GrowthStage::PreFlowering => 0.7,
        GrowthStage::Flowering => 0.85,
        GrowthStage::Harvest | GrowthStage::Harvested => 1.0,
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp_color(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

/// Size and color the plant should converge to.
#[must_use]
pub fn target_for(
    state: &GrowthState,
    genetics: &GeneticProfile,
    strain: &StrainProfile,
    stress: &StressVector,
) -> VisualTarget {
    let reference = strain.height.midpoint();
    let relative = if reference > 0.0 {
        (genetics.size / reference).max(0.0)
    } else {
        1.0
    };
    let from = stage_scale(state.stage);
    let to = state.stage.next().map_or(from, stage_scale);
    let size = relative * lerp(from, to, state.stage_progress.clamp(0.0, 1.0));

    let tint = 1.0 + genetics.color_variation;
    let base = strain.base_color.map(|c| (c * tint).clamp(0.0, 1.0));
    let stressed = lerp_color(base, STRESS_COLOR, 0.6 * stress.overall + 0.3 * (1.0 - state.health));
    let color = if state.stage == GrowthStage::Harvested {
        lerp_color(stressed, HARVESTED_COLOR, 0.7)
    } else {
        stressed
    };

    VisualTarget { size, color }
}

/// Per-frame exponential easing toward the latest targets.
#[derive(Debug, Clone)]
pub struct VisualInterpolator {
    /// Convergence speed, 1/s.
    pub response: f32,
    displayed: HashMap<Uuid, VisualTarget>,
}

impl Default for VisualInterpolator {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl VisualInterpolator {
    #[must_use]
    pub fn new(response: f32) -> Self {
        Self {
            response,
            displayed: HashMap::new(),
        }
    }

    /// Advances every displayed value by `dt` seconds. Plants seen for the
    /// first time snap to their target; plants gone from `targets` are
    /// dropped.
    pub fn frame(&mut self, targets: &BTreeMap<Uuid, VisualTarget>, dt: f32) {
        let alpha = 1.0 - (-self.response.max(0.0) * dt.max(0.0)).exp();
        self.displayed.retain(|id, _| targets.contains_key(id));
        for (id, target) in targets {
            let shown = self.displayed.entry(*id).or_insert(*target);
            shown.size = lerp(shown.size, target.size, alpha);
            shown.color = lerp_color(shown.color, target.color, alpha);
        }
    }

    #[must_use]
    pub fn displayed(&self, plant_id: &Uuid) -> Option<&VisualTarget> {
        self.displayed.get(plant_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.displayed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.displayed.is_empty()
    }
}
