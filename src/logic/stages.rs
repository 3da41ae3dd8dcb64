use crate::models::{FruitCounts, ForecastParameters, Stage};

/// Degree-day requirements for a fruit to move through the unripe stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageThresholds {
    pub immature_to_ripening_gdd: f64,
    pub ripening_to_mature_gdd: f64,
}

impl StageThresholds {
    pub fn from_params(params: &ForecastParameters) -> Self {
        Self {
            immature_to_ripening_gdd: params.immature_to_ripening_gdd,
            ripening_to_mature_gdd: params.ripening_to_mature_gdd,
        }
    }

    /// Degree-days still needed before a fruit at `progress` (0.0-1.0)
    /// through `stage` is ready to pick. Flowers are not projected.
    pub fn remaining_gdd(&self, stage: Stage, progress: f64) -> Option<f64> {
        let progress = progress.clamp(0.0, 1.0);
        match stage {
            Stage::Mature => Some(0.0),
            Stage::Ripening => Some(self.ripening_to_mature_gdd * (1.0 - progress)),
            Stage::Immature => Some(
                self.immature_to_ripening_gdd * (1.0 - progress) + self.ripening_to_mature_gdd,
            ),
            Stage::Flower => None,
        }
    }

    /// Expected days until a typical (mid-stage) fruit is ready at a steady
    /// daily degree-day rate. `None` when no thermal time accrues.
    pub fn days_to_harvest(&self, stage: Stage, gdd_per_day: f64) -> Option<f64> {
        let remaining = self.remaining_gdd(stage, 0.5)?;
        if remaining <= 0.0 {
            return Some(0.0);
        }
        if gdd_per_day > 0.0 {
            Some(remaining / gdd_per_day)
        } else {
            None
        }
    }
}

/// A group of fruit in one stage sharing a remaining degree-day requirement
#[derive(Debug, Clone, PartialEq)]
pub struct Cohort {
    pub stage: Stage,
    pub fruit: u64,
    pub remaining_gdd: f64,
}

/// Split `count` fruit of one stage into at most `max_cohorts` cohorts spread
/// evenly across the stage. Cohort `k` of `n` sits at progress `(k + 0.5) / n`;
/// leftover fruit go to the earliest cohorts.
pub fn split_stage(
    stage: Stage,
    count: u64,
    max_cohorts: u32,
    thresholds: &StageThresholds,
) -> Vec<Cohort> {
    if count == 0 {
        return Vec::new();
    }

    let n = count.min(u64::from(max_cohorts.max(1)));
    let base = count / n;
    let extra = count % n;

    (0..n)
        .filter_map(|k| {
            let progress = (k as f64 + 0.5) / n as f64;
            let remaining_gdd = thresholds.remaining_gdd(stage, progress)?;
            Some(Cohort {
                stage,
                fruit: base + u64::from(k < extra),
                remaining_gdd,
            })
        })
        .collect()
}

/// Cohorts for every unripe fruit, soonest-ready first
pub fn build_cohorts(
    counts: &FruitCounts,
    thresholds: &StageThresholds,
    max_cohorts: u32,
) -> Vec<Cohort> {
    let mut cohorts = split_stage(Stage::Ripening, counts.ripening, max_cohorts, thresholds);
    cohorts.extend(split_stage(
        Stage::Immature,
        counts.immature,
        max_cohorts,
        thresholds,
    ));
    cohorts.sort_by(|a, b| a.remaining_gdd.total_cmp(&b.remaining_gdd));
    cohorts
}

/// Index of the first day whose cumulative degree-days meet `remaining_gdd`
pub fn ready_day(remaining_gdd: f64, gdd_cum: &[f64]) -> Option<usize> {
    gdd_cum.iter().position(|cum| *cum >= remaining_gdd)
}
