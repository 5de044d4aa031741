//! Per-instance genetic variation and inheritance.
//!
//! Randomness is always passed in, so a seeded `ChaCha8Rng` gives
//! reproducible plants.

use crate::config::GeneticsConfig;
use crate::error::{Result, SimError};
use rand::Rng;
use verdant_data::{
    EnvironmentalSample, GeneticProfile, Morphology, Range, StrainProfile, StressVector,
};

/// Flowering time, in days, that maps to a flowering speed of 1.0.
pub const REFERENCE_FLOWERING_DAYS: f32 = 63.0;
/// Bounds for heat, cold and drought tolerance.
pub const TOLERANCE_BOUNDS: (f32, f32) = (0.5, 2.0);

const SCALAR_TRAITS: usize = 11;

fn scalar_fields(g: &mut GeneticProfile) -> [&mut f32; SCALAR_TRAITS] {
    [
        &mut g.size,
        &mut g.branch_density,
        &mut g.leaf_density,
        &mut g.bud_density,
        &mut g.growth_rate,
        &mut g.flowering_speed,
        &mut g.yield_potential,
        &mut g.heat_tolerance,
        &mut g.cold_tolerance,
        &mut g.drought_tolerance,
        &mut g.trichrome_amount,
    ]
}

fn scalar_values(g: &GeneticProfile) -> [f32; SCALAR_TRAITS] {
    [
        g.size,
        g.branch_density,
        g.leaf_density,
        g.bud_density,
        g.growth_rate,
        g.flowering_speed,
        g.yield_potential,
        g.heat_tolerance,
        g.cold_tolerance,
        g.drought_tolerance,
        g.trichrome_amount,
    ]
}

fn sample_range<R: Rng + ?Sized>(range: &Range, rng: &mut R) -> f32 {
    if range.max > range.min {
        rng.gen_range(range.min..=range.max)
    } else {
        range.min
    }
}

fn morphology_tolerances(morphology: Morphology) -> (f32, f32, f32) {
    // (heat, cold, drought)
    match morphology {
        Morphology::Compact => (0.9, 1.2, 1.0),
        Morphology::Balanced => (1.0, 1.0, 1.0),
        Morphology::Tall => (1.2, 0.9, 1.1),
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeneticVariationGenerator {
    pub config: GeneticsConfig,
}

impl GeneticVariationGenerator {
    #[must_use]
    pub fn new(config: GeneticsConfig) -> Self {
        Self { config }
    }

    /// Strain values with no variation applied.
    #[must_use]
    pub fn base_profile(strain: &StrainProfile, timestamp: f64) -> GeneticProfile {
        let flowering_mid = strain.flowering_days.midpoint();
        let flowering_speed = if flowering_mid > 0.0 {
            (REFERENCE_FLOWERING_DAYS / flowering_mid).clamp(0.5, 2.0)
        } else {
            1.0
        };
        let (heat, cold, drought) = morphology_tolerances(strain.morphology);
        GeneticProfile {
            strain_id: strain.id.clone(),
            size: strain.height.midpoint(),
            branch_density: strain.traits.branch_density,
            leaf_density: strain.traits.leaf_density,
            bud_density: strain.traits.bud_density,
            growth_rate: 1.0,
            flowering_speed,
            yield_potential: 1.0,
            heat_tolerance: heat,
            cold_tolerance: cold,
            drought_tolerance: drought,
            trichrome_amount: strain.traits.trichrome_amount,
            color_variation: 0.0,
            traits: strain.extra_traits.clone(),
            generation: 0,
            created_at: timestamp,
        }
    }

    /// Derives a new profile from `strain`, optionally blended with up to two
    /// parent profiles.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        strain: &StrainProfile,
        parents: &[&GeneticProfile],
        timestamp: f64,
        rng: &mut R,
    ) -> Result<GeneticProfile> {
        if parents.len() > 2 {
            return Err(SimError::InvalidParents(parents.len()));
        }

        let mut profile = Self::base_profile(strain, timestamp);
        Self::apply_variation(&mut profile, strain, rng);

        if !parents.is_empty() {
            self.inherit(&mut profile, parents, rng);
        }
        Ok(profile)
    }

    fn apply_variation<R: Rng + ?Sized>(
        profile: &mut GeneticProfile,
        strain: &StrainProfile,
        rng: &mut R,
    ) {
        let variation = &strain.variation;
        profile.size *= sample_range(&variation.size, rng);
        profile.yield_potential *= sample_range(&variation.size, rng);

        let morph_fields = [
            &mut profile.branch_density,
            &mut profile.leaf_density,
            &mut profile.bud_density,
            &mut profile.trichrome_amount,
            &mut profile.growth_rate,
            &mut profile.heat_tolerance,
            &mut profile.cold_tolerance,
            &mut profile.drought_tolerance,
        ];
        for field in morph_fields {
            *field *= sample_range(&variation.morphology, rng);
        }
        for value in profile.traits.values_mut() {
            *value *= sample_range(&variation.morphology, rng);
        }

        profile.color_variation = sample_range(&variation.color, rng) - 1.0;
        clamp_tolerances(profile);
    }

    /// Mixes each trait with the parents' values.
    ///
    /// Per trait, the inherited value is the stronger parent's with
    /// `dominant_trait_probability`, otherwise the parental mean (a single
    /// parent is copied). The child keeps half of its own variation, then
    /// each trait mutates with `mutation_probability` by up to
    /// ±`mutation_rate`. Crosses between different strains get a hybrid
    /// vigor boost to growth rate and yield potential.
    fn inherit<R: Rng + ?Sized>(
        &self,
        child: &mut GeneticProfile,
        parents: &[&GeneticProfile],
        rng: &mut R,
    ) {
        let cfg = &self.config;
        let parent_values: Vec<[f32; SCALAR_TRAITS]> =
            parents.iter().map(|p| scalar_values(p)).collect();

        for (i, field) in scalar_fields(child).into_iter().enumerate() {
            let inherited = self.pick(parent_values.iter().map(|v| v[i]), rng);
            *field = self.mutate((*field + inherited) * 0.5, rng).max(0.0);
        }

        let color = self.pick(parents.iter().map(|p| p.color_variation), rng);
        child.color_variation = (child.color_variation + color) * 0.5;
        if rng.gen_bool(f64::from(cfg.mutation_probability)) {
            child.color_variation += rng.gen_range(-cfg.mutation_rate..=cfg.mutation_rate);
        }

        let keys: Vec<String> = child.traits.keys().cloned().collect();
        for key in keys {
            let own = child.traits.get(&key).copied().unwrap_or(0.0);
            let inherited = self.pick(
                parents
                    .iter()
                    .map(|p| p.traits.get(&key).copied().unwrap_or(own)),
                rng,
            );
            let value = self.mutate((own + inherited) * 0.5, rng).max(0.0);
            child.traits.insert(key, value);
        }

        if let [a, b] = parents {
            if a.strain_id != b.strain_id {
                let vigor = 1.0 + cfg.hybrid_vigor_bonus;
                child.growth_rate *= vigor;
                child.yield_potential *= vigor;
            }
        }

        child.generation = parents.iter().map(|p| p.generation).max().unwrap_or(0) + 1;
        clamp_tolerances(child);
    }

    fn pick<R: Rng + ?Sized>(&self, values: impl Iterator<Item = f32>, rng: &mut R) -> f32 {
        let values: Vec<f32> = values.collect();
        match values.as_slice() {
            [] => 0.0,
            [only] => *only,
            [a, b, ..] => {
                if rng.gen_bool(f64::from(self.config.dominant_trait_probability)) {
                    a.max(*b)
                } else {
                    (a + b) * 0.5
                }
            }
        }
    }

    fn mutate<R: Rng + ?Sized>(&self, value: f32, rng: &mut R) -> f32 {
        let cfg = &self.config;
        if cfg.mutation_rate > 0.0 && rng.gen_bool(f64::from(cfg.mutation_probability)) {
            value * (1.0 + rng.gen_range(-cfg.mutation_rate..=cfg.mutation_rate))
        } else {
            value
        }
    }

    /// Epigenetic adaptation: stress endured in a given direction hardens the
    /// matching tolerance.
    #[must_use]
    pub fn adapt(
        &self,
        profile: &GeneticProfile,
        strain: &StrainProfile,
        sample: &EnvironmentalSample,
        stress: &StressVector,
    ) -> GeneticProfile {
        let rate = self.config.epigenetic_rate;
        let mut adapted = profile.clone();
        if rate <= 0.0 {
            return adapted;
        }
        let sample = sample.clamped();
        let optimal = &strain.optimal;
        if sample.temperature > optimal.temperature.max {
            adapted.heat_tolerance += rate * stress.temperature;
        } else if sample.temperature < optimal.temperature.min {
            adapted.cold_tolerance += rate * stress.temperature;
        }
        if sample.humidity < optimal.humidity.min {
            adapted.drought_tolerance += rate * stress.humidity;
        }
        clamp_tolerances(&mut adapted);
        adapted
    }
}

fn clamp_tolerances(profile: &mut GeneticProfile) {
    let (lo, hi) = TOLERANCE_BOUNDS;
    profile.heat_tolerance = profile.heat_tolerance.clamp(lo, hi);
    profile.cold_tolerance = profile.cold_tolerance.clamp(lo, hi);
    profile.drought_tolerance = profile.drought_tolerance.clamp(lo, hi);
}
