use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a temperature series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    Live,
    Climatology,
    #[default]
    Fallback,
}

impl WeatherSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherSource::Live => "OpenWeatherMap",
            WeatherSource::Climatology => "Climatology",
            WeatherSource::Fallback => "Flat fallback",
        }
    }
}

impl std::fmt::Display for WeatherSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One aggregated forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTemperature {
    pub date: NaiveDate,
    pub mean_c: f64,
    pub low_c: f64,
    pub high_c: f64,
}

/// Day-indexed mean temperatures handed to the forecast engine.
/// `daily_mean_c[0]` is the day after the forecast's as-of date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSeries {
    pub source: WeatherSource,
    pub daily_mean_c: Vec<f64>,
    /// Advisories raised while the series was assembled
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl TemperatureSeries {
    pub fn new(source: WeatherSource, daily_mean_c: Vec<f64>) -> Self {
        Self {
            source,
            daily_mean_c,
            notes: Vec::new(),
        }
    }

    pub fn flat(source: WeatherSource, temp_c: f64, days: usize) -> Self {
        Self::new(source, vec![temp_c; days])
    }

    /// Keep only days strictly after `as_of`, in date order.
    pub fn from_daily(source: WeatherSource, days: &[DailyTemperature], as_of: NaiveDate) -> Self {
        let mut upcoming: Vec<&DailyTemperature> = days.iter().filter(|d| d.date > as_of).collect();
        upcoming.sort_by_key(|d| d.date);
        Self::new(source, upcoming.iter().map(|d| d.mean_c).collect())
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn len(&self) -> usize {
        self.daily_mean_c.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daily_mean_c.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32, mean_c: f64) -> DailyTemperature {
        DailyTemperature {
            date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
            mean_c,
            low_c: mean_c - 4.0,
            high_c: mean_c + 4.0,
        }
    }

    #[test]
    fn from_daily_drops_as_of_and_earlier() {
        let days = vec![day(12, 30.0), day(10, 20.0), day(11, 25.0), day(9, 18.0)];
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let series = TemperatureSeries::from_daily(WeatherSource::Live, &days, as_of);
        assert_eq!(series.daily_mean_c, vec![25.0, 30.0]);
        assert_eq!(series.source, WeatherSource::Live);
    }

    #[test]
    fn flat_series_has_requested_length() {
        let series = TemperatureSeries::flat(WeatherSource::Fallback, 22.0, 5);
        assert_eq!(series.len(), 5);
        assert!(series.daily_mean_c.iter().all(|t| *t == 22.0));
    }
}
