use super::calculations::{accumulate_gdd, after_loss, fruit_mass_kg};
use super::harvest::{schedule_harvest, MIN_HARVEST_CAPACITY_KG_DAY};
use super::stages::{build_cohorts, ready_day, StageThresholds};
use crate::models::{
    AppControls, DailyForecast, DetectionResult, ForecastParameters, ForecastResult, FruitCounts,
    Stage, TemperatureSeries, WeatherSource,
};
use chrono::{Days, NaiveDate};

const DEFAULT_GDD_BASE_C: f64 = 10.0;

/// Longest horizon the engine projects (about ten years)
pub const MAX_FORECAST_DAYS: i64 = 3650;

/// Days actually forecast for a requested horizon: at least one, at most
/// [`MAX_FORECAST_DAYS`], and never past the last representable date.
pub(crate) fn horizon_days(requested: i64, as_of: NaiveDate) -> usize {
    let calendar_left = NaiveDate::MAX.signed_duration_since(as_of).num_days();
    let upper = MAX_FORECAST_DAYS.min(calendar_left).max(1);
    requested.clamp(1, upper) as usize
}

/// Controls after invalid values have been replaced
#[derive(Debug, Clone, PartialEq)]
struct EffectiveControls {
    avg_weight_g: f64,
    loss_pct: f64,
    num_plants: u64,
    days: usize,
    base_c: f64,
    capacity_kg_day: f64,
}

impl EffectiveControls {
    fn from_controls(controls: &AppControls, as_of: NaiveDate, notes: &mut Vec<String>) -> Self {
        let avg_weight_g = if controls.avg_weight_g.is_finite() && controls.avg_weight_g > 0.0 {
            controls.avg_weight_g
        } else {
            notes.push(format!(
                "Average fruit weight {} g is not positive; fruit mass treated as 0 g.",
                controls.avg_weight_g
            ));
            0.0
        };

        let loss_pct = if controls.post_harvest_loss_pct.is_nan() {
            notes.push("Post-harvest loss is not a number; assuming 0% loss.".to_string());
            0.0
        } else if !(0.0..=100.0).contains(&controls.post_harvest_loss_pct) {
            let clamped = controls.post_harvest_loss_pct.clamp(0.0, 100.0);
            notes.push(format!(
                "Post-harvest loss {}% is outside 0-100%; clamped to {}%.",
                controls.post_harvest_loss_pct, clamped
            ));
            clamped
        } else {
            controls.post_harvest_loss_pct
        };

        let num_plants = if controls.num_plants > 0 {
            controls.num_plants as u64
        } else {
            notes.push(format!(
                "Number of plants {} is not positive; using 1 plant.",
                controls.num_plants
            ));
            1
        };

        let days = horizon_days(controls.forecast_days, as_of);
        if controls.forecast_days <= 0 {
            notes.push(format!(
                "Forecast horizon of {} days is invalid; forecasting 1 day.",
                controls.forecast_days
            ));
        } else if controls.forecast_days as u64 > days as u64 {
            notes.push(format!(
                "Forecast horizon of {} days is too long; forecasting {} days.",
                controls.forecast_days, days
            ));
        }

        let base_c = if controls.gdd_base_c.is_finite() {
            controls.gdd_base_c
        } else {
            notes.push(format!(
                "GDD base temperature is invalid; using {:.1}°C.",
                DEFAULT_GDD_BASE_C
            ));
            DEFAULT_GDD_BASE_C
        };

        let capacity_kg_day = if controls.harvest_capacity_kg_day > 0.0 {
            controls.harvest_capacity_kg_day
        } else {
            notes.push(format!(
                "Harvest capacity {} kg/day is not positive; clamped to {} kg/day.",
                controls.harvest_capacity_kg_day, MIN_HARVEST_CAPACITY_KG_DAY
            ));
            MIN_HARVEST_CAPACITY_KG_DAY
        };

        Self {
            avg_weight_g,
            loss_pct,
            num_plants,
            days,
            base_c,
            capacity_kg_day,
        }
    }
}

/// Deterministic harvest projection from a detection snapshot.
///
/// The forecaster performs no I/O; weather must be resolved beforehand and
/// passed in as a [`TemperatureSeries`].
#[derive(Debug, Clone, Default)]
pub struct YieldForecaster {
    params: ForecastParameters,
}

impl YieldForecaster {
    pub fn new(params: ForecastParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForecastParameters {
        &self.params
    }

    /// Project ready, sellable and harvestable mass over the horizon.
    ///
    /// Never fails: degenerate inputs are clamped and explained in `notes`.
    pub fn forecast(
        &self,
        detection: &DetectionResult,
        controls: &AppControls,
        weather: Option<&TemperatureSeries>,
        as_of: NaiveDate,
    ) -> ForecastResult {
        let (params, mut notes) = self.params.sanitized();
        let counts = sanitize_detection(detection, &mut notes);
        let ctl = EffectiveControls::from_controls(controls, as_of, &mut notes);

        if counts.total_fruit() == 0 {
            notes.push(
                "No fruit detected in the analyzed image; no harvestable yield is projected."
                    .to_string(),
            );
        }

        let fruit_kg = fruit_mass_kg(ctl.avg_weight_g, ctl.num_plants, params.plants_per_image);
        let yield_now_kg = counts.mature as f64 * fruit_kg;

        let (temps, weather_source) =
            daily_temperatures(weather, ctl.days, params.fallback_temp_c, &mut notes);
        let gdd_cum = accumulate_gdd(&temps, ctl.base_c);

        let thresholds = StageThresholds::from_params(&params);
        let mut ready_fruit = vec![0u64; ctl.days];
        let mut still_unripe = 0u64;
        for cohort in build_cohorts(&counts, &thresholds, params.max_cohorts_per_stage) {
            match ready_day(cohort.remaining_gdd, &gdd_cum) {
                Some(day) => {
                    ready_fruit[day] = ready_fruit[day].saturating_add(cohort.fruit);
                }
                None => still_unripe = still_unripe.saturating_add(cohort.fruit),
            }
        }

        let daily: Vec<DailyForecast> = ready_fruit
            .iter()
            .zip(&gdd_cum)
            .enumerate()
            .map(|(i, (fruit, cum))| DailyForecast {
                date: day_after(as_of, i as u64 + 1),
                ready_kg: *fruit as f64 * fruit_kg,
                gdd_cum: *cum,
            })
            .collect();

        let gross_kg = yield_now_kg + daily.iter().map(|d| d.ready_kg).sum::<f64>();
        let sellable_kg = after_loss(gross_kg, ctl.loss_pct);

        let final_gdd = gdd_cum.last().copied().unwrap_or(0.0);
        if still_unripe > 0 {
            notes.push(unripe_note(
                still_unripe,
                ctl.days,
                final_gdd,
                ctl.base_c,
                &thresholds,
            ));
        }

        let schedule = schedule_harvest(as_of, yield_now_kg, &daily, ctl.capacity_kg_day);
        if !schedule.is_cleared() {
            let since = schedule
                .oldest_unharvested
                .map(|d| format!(", oldest ready since {}", d))
                .unwrap_or_default();
            notes.push(format!(
                "Harvest capacity of {} kg/day cannot clear the ready backlog within {} days; \
                 {:.2} kg remains unharvested{}.",
                ctl.capacity_kg_day, ctl.days, schedule.unharvested_kg, since
            ));
        }

        tracing::debug!(
            yield_now_kg,
            sellable_kg,
            days = ctl.days,
            final_gdd,
            max_wait_days = schedule.max_wait_days,
            notes = notes.len(),
            "Forecast computed"
        );

        ForecastResult {
            as_of,
            yield_now_kg,
            sellable_kg,
            daily,
            harvest_plan: schedule.tasks,
            unharvested_kg: schedule.unharvested_kg,
            weather_source,
            notes,
        }
    }
}

/// Forecast with default model parameters and no weather data
pub fn calculate_yield_forecast(
    detection: &DetectionResult,
    controls: &AppControls,
    as_of: NaiveDate,
) -> ForecastResult {
    YieldForecaster::default().forecast(detection, controls, None, as_of)
}

fn sanitize_detection(detection: &DetectionResult, notes: &mut Vec<String>) -> FruitCounts {
    let (counts, count_notes) = detection.stage_counts.sanitized();
    notes.extend(count_notes);

    let fruit = i64::try_from(counts.total_fruit()).unwrap_or(i64::MAX);
    let flowers = i64::try_from(counts.flower).unwrap_or(i64::MAX);
    let with_flowers = fruit.saturating_add(flowers);
    if detection.detections != fruit && detection.detections != with_flowers {
        notes.push(format!(
            "Detection total ({}) does not match the stage counts ({}); stage counts were used.",
            detection.detections, fruit
        ));
    }

    counts
}

/// One temperature per horizon day, padding or replacing unusable values
/// with the fallback.
fn daily_temperatures(
    weather: Option<&TemperatureSeries>,
    days: usize,
    fallback_c: f64,
    notes: &mut Vec<String>,
) -> (Vec<f64>, WeatherSource) {
    if let Some(series) = weather {
        notes.extend(series.notes.iter().cloned());
    }

    let Some(series) = weather.filter(|s| !s.is_empty()) else {
        notes.push(format!(
            "No weather data available; assuming a constant {:.1}°C mean temperature.",
            fallback_c
        ));
        return (vec![fallback_c; days], WeatherSource::Fallback);
    };

    let mut invalid = 0;
    let mut temps: Vec<f64> = series
        .daily_mean_c
        .iter()
        .take(days)
        .map(|t| {
            if t.is_finite() {
                *t
            } else {
                invalid += 1;
                fallback_c
            }
        })
        .collect();

    if invalid > 0 {
        notes.push(format!(
            "{} day(s) of weather data were unusable; {:.1}°C assumed for those days.",
            invalid, fallback_c
        ));
    }

    if temps.len() < days {
        notes.push(format!(
            "Weather data covers {} of {} days; remaining days assume {:.1}°C.",
            temps.len(),
            days,
            fallback_c
        ));
        temps.resize(days, fallback_c);
    }

    (temps, series.source)
}

fn unripe_note(
    fruit: u64,
    days: usize,
    final_gdd: f64,
    base_c: f64,
    thresholds: &StageThresholds,
) -> String {
    if final_gdd <= 0.0 {
        return format!(
            "No degree-days accumulate above the {:.1}°C base over the horizon; \
             {} unripe fruit are not projected to ripen.",
            base_c, fruit
        );
    }

    let rate = final_gdd / days as f64;
    match thresholds.days_to_harvest(Stage::Immature, rate) {
        Some(est) => format!(
            "{} fruit are still unripe after {} days; immature fruit need about {:.0} days \
             at the current rate of {:.1} GDD/day.",
            fruit, days, est, rate
        ),
        None => format!("{} fruit are still unripe after {} days.", fruit, days),
    }
}

fn day_after(as_of: NaiveDate, n: u64) -> NaiveDate {
    as_of.checked_add_days(Days::new(n)).unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StageCounts;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn detection(immature: i64, ripening: i64, mature: i64) -> DetectionResult {
        DetectionResult::from_counts(1, StageCounts::new(immature, ripening, mature), None, "")
    }

    fn has_note(result: &ForecastResult, needle: &str) -> bool {
        result.notes.iter().any(|n| n.contains(needle))
    }

    #[test]
    fn zero_detections() {
        let controls = AppControls {
            num_plants: 10,
            ..Default::default()
        };
        let r = calculate_yield_forecast(&detection(0, 0, 0), &controls, as_of());
        assert_eq!(r.yield_now_kg, 0.0);
        assert_eq!(r.sellable_kg, 0.0);
        assert_eq!(r.daily.len(), 14);
        assert!(r.daily.iter().all(|d| d.ready_kg == 0.0));
        assert!(r.harvest_plan.is_empty());
        assert!(has_note(&r, "No fruit detected"));
    }

    #[test]
    fn ready_now_mass() {
        let controls = AppControls {
            avg_weight_g: 100.0,
            num_plants: 1,
            ..Default::default()
        };
        let r = calculate_yield_forecast(&detection(0, 0, 5), &controls, as_of());
        assert_eq!(r.yield_now_kg, 0.5);
    }

    #[test]
    fn capacity_overflow_clears_within_horizon() {
        let controls = AppControls {
            avg_weight_g: 1000.0,
            num_plants: 1,
            harvest_capacity_kg_day: 1.0,
            ..Default::default()
        };
        let r = calculate_yield_forecast(&detection(0, 0, 5), &controls, as_of());
        assert_eq!(r.yield_now_kg, 5.0);
        assert_eq!(r.harvest_plan.len(), 5);
        assert_eq!(r.harvest_plan[0].date, as_of());
        assert!(r.harvest_plan.iter().all(|t| t.harvest_kg == 1.0));
        assert_eq!(r.unharvested_kg, 0.0);
        assert!(!has_note(&r, "cannot clear"));
    }

    #[test]
    fn capacity_overflow_past_horizon_is_noted() {
        let controls = AppControls {
            avg_weight_g: 1000.0,
            num_plants: 1,
            harvest_capacity_kg_day: 1.0,
            forecast_days: 2,
            ..Default::default()
        };
        let r = calculate_yield_forecast(&detection(0, 0, 5), &controls, as_of());
        assert_eq!(r.harvest_plan.len(), 3);
        assert!(r.total_harvested_kg() < 5.0);
        assert!((r.unharvested_kg - 2.0).abs() < 1e-9);
        assert!(has_note(&r, "cannot clear"));
        // Backlog still counts as sellable supply
        assert!((r.sellable_kg - 5.0 * 0.93).abs() < 1e-9);
    }

    #[test]
    fn non_positive_horizon_clamps_to_one_day() {
        for days in [0, -7] {
            let controls = AppControls {
                forecast_days: days,
                ..Default::default()
            };
            let r = calculate_yield_forecast(&detection(1, 1, 1), &controls, as_of());
            assert_eq!(r.daily.len(), 1);
            assert_eq!(r.daily[0].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
            assert!(has_note(&r, "Forecast horizon"));
        }
    }

    #[test]
    fn huge_horizon_is_capped() {
        let controls = AppControls {
            forecast_days: i64::MAX,
            ..Default::default()
        };
        let r = calculate_yield_forecast(&detection(1, 1, 1), &controls, as_of());
        assert_eq!(r.daily.len(), MAX_FORECAST_DAYS as usize);
        assert!(has_note(&r, "too long"));
        assert_eq!(r.daily[0].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        for pair in r.daily.windows(2) {
            assert_eq!(pair[1].date, pair[0].date.succ_opt().unwrap());
        }
    }

    #[test]
    fn horizon_stops_at_last_calendar_day() {
        let controls = AppControls {
            forecast_days: 3,
            ..Default::default()
        };
        let near_end = NaiveDate::MAX.pred_opt().unwrap();
        let r = calculate_yield_forecast(&detection(1, 1, 1), &controls, near_end);
        assert_eq!(r.daily.len(), 1);
        assert_eq!(r.daily[0].date, NaiveDate::MAX);
        assert!(has_note(&r, "too long"));
    }

    #[test]
    fn non_positive_capacity_clamps_to_minimum() {
        let controls = AppControls {
            harvest_capacity_kg_day: 0.0,
            ..Default::default()
        };
        let r = calculate_yield_forecast(&detection(0, 0, 3), &controls, as_of());
        assert!(r
            .harvest_plan
            .iter()
            .all(|t| t.harvest_kg <= MIN_HARVEST_CAPACITY_KG_DAY));
        assert!(r.unharvested_kg > 0.0);
        assert!(has_note(&r, "Harvest capacity 0 kg/day"));
    }

    #[test]
    fn ripening_fruit_turn_ready_as_gdd_accumulates() {
        // 25°C fallback over a 10°C base gives 15 GDD/day; ripening fruit need
        // at most 110 GDD, so all of them are ready by day 8.
        let controls = AppControls {
            avg_weight_g: 100.0,
            num_plants: 1,
            forecast_days: 10,
            post_harvest_loss_pct: 0.0,
            ..Default::default()
        };
        let r = calculate_yield_forecast(&detection(0, 4, 0), &controls, as_of());
        assert!((r.total_ready_kg() - 0.4).abs() < 1e-9);
        assert!(r.daily[8..].iter().all(|d| d.ready_kg == 0.0));
        assert_eq!(r.daily[0].gdd_cum, 15.0);
        assert_eq!(r.sellable_kg, r.gross_kg());
    }

    #[test]
    fn immature_fruit_beyond_horizon_are_noted() {
        let controls = AppControls {
            forecast_days: 5,
            ..Default::default()
        };
        let r = calculate_yield_forecast(&detection(6, 0, 0), &controls, as_of());
        assert_eq!(r.total_ready_kg(), 0.0);
        assert!(has_note(&r, "6 fruit are still unripe"));
    }

    #[test]
    fn cold_weather_stalls_ripening() {
        let weather = TemperatureSeries::flat(WeatherSource::Live, 8.0, 14);
        let r = YieldForecaster::default().forecast(
            &detection(2, 2, 0),
            &AppControls::default(),
            Some(&weather),
            as_of(),
        );
        assert!(r.daily.iter().all(|d| d.gdd_cum == 0.0));
        assert_eq!(r.weather_source, WeatherSource::Live);
        assert!(has_note(&r, "No degree-days accumulate"));
    }

    #[test]
    fn short_weather_series_is_padded() {
        let weather = TemperatureSeries::new(WeatherSource::Live, vec![20.0, f64::NAN, 30.0]);
        let controls = AppControls {
            forecast_days: 5,
            ..Default::default()
        };
        let r = YieldForecaster::default().forecast(
            &detection(0, 1, 0),
            &controls,
            Some(&weather),
            as_of(),
        );
        let cum: Vec<f64> = r.daily.iter().map(|d| d.gdd_cum).collect();
        assert_eq!(cum, vec![10.0, 25.0, 45.0, 60.0, 75.0]);
        assert!(has_note(&r, "covers 3 of 5 days"));
        assert!(has_note(&r, "1 day(s) of weather data were unusable"));
    }

    #[test]
    fn weather_notes_are_carried_into_result() {
        let weather = TemperatureSeries::flat(WeatherSource::Climatology, 26.0, 14)
            .with_note("Live weather unavailable");
        let r = YieldForecaster::default().forecast(
            &detection(1, 1, 1),
            &AppControls::default(),
            Some(&weather),
            as_of(),
        );
        assert_eq!(r.weather_source, WeatherSource::Climatology);
        assert!(has_note(&r, "Live weather unavailable"));
        assert!(!has_note(&r, "No weather data"));
    }

    #[test]
    fn malformed_counts_are_clamped_and_noted() {
        let mut d = detection(-4, 2, 3);
        d.detections = 9;
        let r = calculate_yield_forecast(&d, &AppControls::default(), as_of());
        assert!(has_note(&r, "negative immature count"));
        assert!(has_note(&r, "does not match the stage counts"));
        assert!(r.yield_now_kg > 0.0);
    }

    #[test]
    fn flower_counts_satisfy_detection_total() {
        let mut d = detection(1, 1, 1);
        d.stage_counts.flower = Some(2);
        d.detections = 5;
        let r = calculate_yield_forecast(&d, &AppControls::default(), as_of());
        assert!(!has_note(&r, "does not match"));
    }

    #[test]
    fn invalid_loss_and_weight_are_clamped() {
        let controls = AppControls {
            avg_weight_g: -10.0,
            post_harvest_loss_pct: 140.0,
            num_plants: 0,
            ..Default::default()
        };
        let r = calculate_yield_forecast(&detection(0, 0, 4), &controls, as_of());
        assert_eq!(r.yield_now_kg, 0.0);
        assert_eq!(r.sellable_kg, 0.0);
        assert!(has_note(&r, "Average fruit weight"));
        assert!(has_note(&r, "clamped to 100%"));
        assert!(has_note(&r, "using 1 plant"));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let d = DetectionResult::demo(3, "demo.jpg");
        let controls = AppControls::default();
        let a = calculate_yield_forecast(&d, &controls, as_of());
        let b = calculate_yield_forecast(&d, &controls, as_of());
        assert_eq!(a, b);
    }
}
