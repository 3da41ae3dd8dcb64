use super::controls::AppControls;
use super::weather::WeatherSource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Projected output for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Mass turning ready on this day, kg
    pub ready_kg: f64,
    /// Degree-days accumulated since the as-of date
    pub gdd_cum: f64,
}

/// One day of the capacity-constrained harvest schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestTask {
    pub date: NaiveDate,
    pub harvest_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub as_of: NaiveDate,
    pub yield_now_kg: f64,
    pub sellable_kg: f64,
    pub daily: Vec<DailyForecast>,
    pub harvest_plan: Vec<HarvestTask>,
    /// Ready mass still waiting when the horizon ends
    pub unharvested_kg: f64,
    pub weather_source: WeatherSource,
    pub notes: Vec<String>,
}

impl ForecastResult {
    pub fn total_ready_kg(&self) -> f64 {
        self.daily.iter().map(|d| d.ready_kg).sum()
    }

    /// Mass available before post-harvest loss
    pub fn gross_kg(&self) -> f64 {
        self.yield_now_kg + self.total_ready_kg()
    }

    pub fn total_harvested_kg(&self) -> f64 {
        self.harvest_plan.iter().map(|t| t.harvest_kg).sum()
    }

    pub fn final_gdd(&self) -> f64 {
        self.daily.last().map(|d| d.gdd_cum).unwrap_or(0.0)
    }

    /// Hand-off value for the market pricing collaborator
    pub fn market_query(&self, controls: &AppControls) -> MarketQuery {
        MarketQuery {
            district: controls.district.clone(),
            sellable_kg: self.sellable_kg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuery {
    pub district: String,
    pub sellable_kg: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sample() -> ForecastResult {
        ForecastResult {
            as_of: date(1),
            yield_now_kg: 2.0,
            sellable_kg: 4.65,
            daily: vec![
                DailyForecast {
                    date: date(2),
                    ready_kg: 1.0,
                    gdd_cum: 12.0,
                },
                DailyForecast {
                    date: date(3),
                    ready_kg: 2.0,
                    gdd_cum: 25.0,
                },
            ],
            harvest_plan: vec![
                HarvestTask {
                    date: date(1),
                    harvest_kg: 2.0,
                },
                HarvestTask {
                    date: date(2),
                    harvest_kg: 1.0,
                },
            ],
            unharvested_kg: 2.0,
            weather_source: WeatherSource::Fallback,
            notes: Vec::new(),
        }
    }

    #[test]
    fn totals() {
        let r = sample();
        assert_eq!(r.total_ready_kg(), 3.0);
        assert_eq!(r.gross_kg(), 5.0);
        assert_eq!(r.total_harvested_kg(), 3.0);
        assert_eq!(r.final_gdd(), 25.0);
    }

    #[test]
    fn market_query_carries_district_and_sellable() {
        let controls = AppControls {
            district: "Salem".into(),
            ..Default::default()
        };
        let q = sample().market_query(&controls);
        assert_eq!(q.district, "Salem");
        assert_eq!(q.sellable_kg, 4.65);
    }

    #[test]
    fn serializes_dates_as_iso_strings() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["daily"][0]["date"], "2024-03-02");
        assert_eq!(json["weather_source"], "fallback");
    }
}
