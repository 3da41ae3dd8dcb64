use crate::config::Config;
use crate::datasources::{climatology, OpenWeatherMapClient};
use crate::error::Result;
use crate::logic::forecast::horizon_days;
use crate::models::{AppControls, DailyTemperature, TemperatureSeries, WeatherSource};
use chrono::NaiveDate;

/// Resolves the temperature series a forecast runs on: live forecast first
/// (when requested), then district climatology, then nothing.
pub struct WeatherService {
    openweathermap_client: Option<OpenWeatherMapClient>,
}

impl WeatherService {
    pub fn new(config: &Config) -> Self {
        let openweathermap_client = config
            .openweathermap
            .as_ref()
            .filter(|c| c.enabled && !c.api_key.is_empty())
            .map(|c| {
                tracing::info!("OpenWeatherMap client configured for live temperatures");
                OpenWeatherMapClient::new(c.clone())
            });

        if openweathermap_client.is_none() {
            tracing::info!("OpenWeatherMap not configured - forecasts use climatological normals");
        }

        Self {
            openweathermap_client,
        }
    }

    /// Fetch what is available for this run. Failures become notes on the
    /// returned series rather than errors.
    pub async fn resolve(&self, controls: &AppControls, as_of: NaiveDate) -> TemperatureSeries {
        let live = if controls.use_live_weather {
            match self.openweathermap_client {
                Some(ref client) => Some(client.fetch_daily_temperatures().await),
                None => None,
            }
        } else {
            None
        };

        assemble_series(controls, live, as_of)
    }

    pub async fn check_connections(&self) -> ConnectionStatus {
        let mut status = ConnectionStatus::default();

        if let Some(ref client) = self.openweathermap_client {
            status.configured = true;
            status.openweathermap = client.test_connection().await.unwrap_or(false);
        }

        status
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionStatus {
    pub configured: bool,
    pub openweathermap: bool,
}

/// Combine a live fetch outcome (`None` when no live client was consulted)
/// with district climatology into one series for the horizon.
pub fn assemble_series(
    controls: &AppControls,
    live: Option<Result<Vec<DailyTemperature>>>,
    as_of: NaiveDate,
) -> TemperatureSeries {
    let days = horizon_days(controls.forecast_days, as_of);
    let mut notes = Vec::new();
    let normals = climatology::series(&controls.district, as_of, days);

    if controls.use_live_weather {
        match live {
            Some(Ok(forecast)) => {
                let next_day = as_of.succ_opt();
                let starts_next_day = forecast.iter().any(|d| Some(d.date) == next_day);
                let mut series = TemperatureSeries::from_daily(WeatherSource::Live, &forecast, as_of);
                series.daily_mean_c.truncate(days);
                if !series.is_empty() && !starts_next_day {
                    tracing::warn!(%as_of, "Live forecast does not start the day after the as-of date");
                    notes.push(format!(
                        "Live forecast does not cover the day after {}; it was not used.",
                        as_of
                    ));
                } else if !series.is_empty() {
                    tracing::debug!(days = series.len(), "Using live temperature forecast");
                    if let Some(ref normals) = normals {
                        if series.len() < days {
                            notes.push(format!(
                                "Live forecast covers {} of {} days; later days use {} climatological normals.",
                                series.len(),
                                days,
                                controls.district
                            ));
                            let covered = series.len();
                            series
                                .daily_mean_c
                                .extend_from_slice(&normals.daily_mean_c[covered..]);
                        }
                    }
                    series.notes = notes;
                    return series;
                } else {
                    notes.push("Live forecast returned no upcoming days.".to_string());
                }
            }
            Some(Err(e)) => {
                tracing::warn!("Failed to fetch live weather: {}", e);
                notes.push(format!("Live weather unavailable ({}).", e));
            }
            None => {
                tracing::warn!("Live weather requested but OpenWeatherMap is not configured");
                notes.push("Live weather requested but no weather service is configured.".to_string());
            }
        }
    }

    match normals {
        Some(mut series) => {
            if !notes.is_empty() {
                notes.push(format!(
                    "Using climatological normals for {}.",
                    controls.district
                ));
            }
            series.notes = notes;
            series
        }
        None => {
            tracing::warn!(district = %controls.district, "No climatological normals for district");
            notes.push(format!(
                "No climatological normals for district '{}'.",
                controls.district
            ));
            let mut series = TemperatureSeries::new(WeatherSource::Fallback, Vec::new());
            series.notes = notes;
            series
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::YieldcastError;
    use crate::logic::forecast::MAX_FORECAST_DAYS;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn live_days(n: u32, mean_c: f64) -> Vec<DailyTemperature> {
        (0..=n)
            .map(|i| DailyTemperature {
                date: NaiveDate::from_ymd_opt(2024, 6, 1 + i).unwrap(),
                mean_c,
                low_c: mean_c,
                high_c: mean_c,
            })
            .collect()
    }

    fn controls(live: bool, district: &str) -> AppControls {
        AppControls {
            use_live_weather: live,
            district: district.into(),
            forecast_days: 7,
            ..Default::default()
        }
    }

    #[test]
    fn climatology_when_live_disabled() {
        let s = assemble_series(&controls(false, "Coimbatore"), None, as_of());
        assert_eq!(s.source, WeatherSource::Climatology);
        assert_eq!(s.len(), 7);
        assert!(s.notes.is_empty());
    }

    #[test]
    fn live_forecast_padded_with_normals() {
        let live = Some(Ok(live_days(5, 31.0)));
        let s = assemble_series(&controls(true, "Coimbatore"), live, as_of());
        assert_eq!(s.source, WeatherSource::Live);
        assert_eq!(s.len(), 7);
        assert_eq!(&s.daily_mean_c[..5], &[31.0; 5]);
        // June normal for Coimbatore
        assert_eq!(s.daily_mean_c[6], 25.9);
        assert_eq!(s.notes.len(), 1);
    }

    #[test]
    fn live_failure_falls_back_to_normals() {
        let live = Some(Err(YieldcastError::DataSourceUnavailable("timeout".into())));
        let s = assemble_series(&controls(true, "Salem"), live, as_of());
        assert_eq!(s.source, WeatherSource::Climatology);
        assert!(s.notes.iter().any(|n| n.contains("timeout")));
        assert!(s.notes.iter().any(|n| n.contains("normals for Salem")));
    }

    #[test]
    fn unconfigured_live_is_noted() {
        let s = assemble_series(&controls(true, "Salem"), None, as_of());
        assert_eq!(s.source, WeatherSource::Climatology);
        assert!(s.notes.iter().any(|n| n.contains("no weather service")));
    }

    #[test]
    fn unknown_district_without_live_is_empty() {
        let s = assemble_series(&controls(false, "Atlantis"), None, as_of());
        assert!(s.is_empty());
        assert_eq!(s.source, WeatherSource::Fallback);
        assert!(s.notes[0].contains("Atlantis"));
    }

    #[test]
    fn stale_live_forecast_is_not_used() {
        let past = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let live = Some(Ok(live_days(5, 31.0)));
        let s = assemble_series(&controls(true, "Coimbatore"), live, past);
        assert_eq!(s.source, WeatherSource::Climatology);
        assert_eq!(s.len(), 7);
        assert!(s.notes.iter().any(|n| n.contains("does not cover the day after 2024-05-20")));
    }

    #[test]
    fn huge_horizon_is_bounded() {
        let mut c = controls(false, "Coimbatore");
        c.forecast_days = i64::MAX;
        let s = assemble_series(&c, None, as_of());
        assert_eq!(s.len(), MAX_FORECAST_DAYS as usize);
    }

    #[test]
    fn live_forecast_trimmed_to_horizon() {
        let mut c = controls(true, "Atlantis");
        c.forecast_days = 2;
        let s = assemble_series(&c, Some(Ok(live_days(5, 20.0))), as_of());
        assert_eq!(s.daily_mean_c, vec![20.0, 20.0]);
        assert!(s.notes.is_empty());
    }
}
