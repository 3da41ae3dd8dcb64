use crate::config::OpenWeatherMapConfig;
use crate::error::{Result, YieldcastError};
use crate::models::DailyTemperature;
use chrono::{DateTime, Duration, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;

const API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
}

// OpenWeatherMap API response structures
#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastItem>,
    city: OwmCity,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCity {
    #[allow(dead_code)]
    name: String,
    /// Shift from UTC in seconds
    #[serde(default)]
    timezone: i64,
}

/// One 3-hour forecast temperature at local time
#[derive(Debug, Clone, PartialEq)]
struct TemperaturePoint {
    local_date: NaiveDate,
    temp_c: f64,
}

impl OpenWeatherMapClient {
    pub fn new(config: OpenWeatherMapConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch the 5-day/3-hour forecast and reduce it to daily mean
    /// temperatures in °C, sorted by local date.
    pub async fn fetch_daily_temperatures(&self) -> Result<Vec<DailyTemperature>> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=metric",
            API_BASE_URL, self.config.latitude, self.config.longitude, self.config.api_key
        );

        let response =
            self.client.get(&url).send().await.map_err(|e| {
                YieldcastError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(YieldcastError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        let owm_response: OwmForecastResponse = response.json().await.map_err(|e| {
            YieldcastError::DataSourceUnavailable(format!(
                "Failed to parse OpenWeatherMap response: {}",
                e
            ))
        })?;

        Ok(convert_response(owm_response))
    }

    /// Test connection to OpenWeatherMap API
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            API_BASE_URL, self.config.latitude, self.config.longitude, self.config.api_key
        );

        let response =
            self.client.get(&url).send().await.map_err(|e| {
                YieldcastError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
            })?;

        Ok(response.status().is_success())
    }
}

fn convert_response(response: OwmForecastResponse) -> Vec<DailyTemperature> {
    let offset = Duration::seconds(response.city.timezone);
    let points: Vec<TemperaturePoint> = response
        .list
        .iter()
        .filter_map(|item| {
            let timestamp = DateTime::from_timestamp(item.dt, 0)?;
            Some(TemperaturePoint {
                local_date: (timestamp + offset).date_naive(),
                temp_c: item.main.temp,
            })
        })
        .collect();

    aggregate_daily(&points)
}

fn aggregate_daily(points: &[TemperaturePoint]) -> Vec<DailyTemperature> {
    // Group by date
    let mut by_date: HashMap<NaiveDate, Vec<f64>> = HashMap::new();
    for point in points.iter().filter(|p| p.temp_c.is_finite()) {
        by_date.entry(point.local_date).or_default().push(point.temp_c);
    }

    let mut days: Vec<DailyTemperature> = by_date
        .into_iter()
        .map(|(date, temps)| DailyTemperature {
            date,
            mean_c: temps.iter().sum::<f64>() / temps.len() as f64,
            low_c: temps.iter().copied().fold(f64::INFINITY, f64::min),
            high_c: temps.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
        .collect();

    days.sort_by_key(|d| d.date);
    days
}
