use serde::{Deserialize, Serialize};

/// Grower-supplied settings for one forecast run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppControls {
    /// Average mass of one mature fruit, grams
    pub avg_weight_g: f64,
    /// Share of harvested mass lost before sale, 0-100
    pub post_harvest_loss_pct: f64,
    /// Plants the analyzed image is scaled up to
    pub num_plants: i64,
    /// Horizon length in days
    pub forecast_days: i64,
    /// Base temperature for degree-day accumulation, °C
    pub gdd_base_c: f64,
    /// Labor/logistics ceiling, kg per day
    pub harvest_capacity_kg_day: f64,
    pub use_detection_model: bool,
    pub use_live_weather: bool,
    pub include_price_forecast: bool,
    /// Market lookup key, also selects the climatology table
    pub district: String,
}

impl Default for AppControls {
    fn default() -> Self {
        Self {
            avg_weight_g: 85.0,
            post_harvest_loss_pct: 7.0,
            num_plants: 10,
            forecast_days: 14,
            gdd_base_c: 10.0,
            harvest_capacity_kg_day: 20.0,
            use_detection_model: true,
            use_live_weather: false,
            include_price_forecast: true,
            district: "Coimbatore".into(),
        }
    }
}

/// Ripening model constants.
///
/// Thresholds are degree-days above the grower's base temperature. The
/// defaults follow typical greenhouse tomato development at a 10 °C base:
/// roughly 25 days from green fruit to breaker and another 8-10 days from
/// breaker to red ripe at 21-22 °C mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastParameters {
    pub immature_to_ripening_gdd: f64,
    pub ripening_to_mature_gdd: f64,
    /// Number of plants one analyzed image represents
    pub plants_per_image: f64,
    /// Mean temperature used when no weather series covers a day
    pub fallback_temp_c: f64,
    pub max_cohorts_per_stage: u32,
}

impl Default for ForecastParameters {
    fn default() -> Self {
        Self {
            immature_to_ripening_gdd: 280.0,
            ripening_to_mature_gdd: 110.0,
            plants_per_image: 1.0,
            fallback_temp_c: 25.0,
            max_cohorts_per_stage: 12,
        }
    }
}

impl ForecastParameters {
    /// Replace unusable values with defaults, describing each replacement.
    pub fn sanitized(&self) -> (Self, Vec<String>) {
        let defaults = Self::default();
        let mut params = self.clone();
        let mut notes = Vec::new();

        if !(params.immature_to_ripening_gdd.is_finite() && params.immature_to_ripening_gdd > 0.0) {
            notes.push(format!(
                "Immature-to-ripening threshold {} is invalid; using {:.0} GDD.",
                params.immature_to_ripening_gdd, defaults.immature_to_ripening_gdd
            ));
            params.immature_to_ripening_gdd = defaults.immature_to_ripening_gdd;
        }
        if !(params.ripening_to_mature_gdd.is_finite() && params.ripening_to_mature_gdd > 0.0) {
            notes.push(format!(
                "Ripening-to-mature threshold {} is invalid; using {:.0} GDD.",
                params.ripening_to_mature_gdd, defaults.ripening_to_mature_gdd
            ));
            params.ripening_to_mature_gdd = defaults.ripening_to_mature_gdd;
        }
        if !(params.plants_per_image.is_finite() && params.plants_per_image > 0.0) {
            notes.push(format!(
                "Plants per image {} is invalid; assuming 1 image per plant.",
                params.plants_per_image
            ));
            params.plants_per_image = defaults.plants_per_image;
        }
        if !params.fallback_temp_c.is_finite() {
            notes.push(format!(
                "Fallback temperature is invalid; using {:.1}°C.",
                defaults.fallback_temp_c
            ));
            params.fallback_temp_c = defaults.fallback_temp_c;
        }
        if params.max_cohorts_per_stage == 0 {
            params.max_cohorts_per_stage = 1;
        }

        (params, notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_defaults_match_dashboard() {
        let c = AppControls::default();
        assert_eq!(c.avg_weight_g, 85.0);
        assert_eq!(c.post_harvest_loss_pct, 7.0);
        assert_eq!(c.num_plants, 10);
        assert_eq!(c.forecast_days, 14);
        assert_eq!(c.harvest_capacity_kg_day, 20.0);
        assert!(!c.use_live_weather);
        assert_eq!(c.district, "Coimbatore");
    }

    #[test]
    fn controls_partial_yaml_fills_defaults() {
        let c: AppControls = serde_yaml::from_str("num_plants: 40\ndistrict: Salem\n").unwrap();
        assert_eq!(c.num_plants, 40);
        assert_eq!(c.district, "Salem");
        assert_eq!(c.forecast_days, 14);
    }

    #[test]
    fn parameters_sanitized_replaces_bad_values() {
        let params = ForecastParameters {
            ripening_to_mature_gdd: -5.0,
            plants_per_image: f64::NAN,
            max_cohorts_per_stage: 0,
            ..Default::default()
        };
        let (clean, notes) = params.sanitized();
        assert_eq!(clean.ripening_to_mature_gdd, 110.0);
        assert_eq!(clean.plants_per_image, 1.0);
        assert_eq!(clean.max_cohorts_per_stage, 1);
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn parameters_sanitized_keeps_good_values() {
        let (clean, notes) = ForecastParameters::default().sanitized();
        assert_eq!(clean, ForecastParameters::default());
        assert!(notes.is_empty());
    }
}
