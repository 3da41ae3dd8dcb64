pub mod calculations;
pub mod forecast;
pub mod harvest;
pub mod stages;
pub mod weather_sync;

pub use forecast::{calculate_yield_forecast, YieldForecaster, MAX_FORECAST_DAYS};
pub use harvest::{schedule_harvest, HarvestSchedule, MIN_HARVEST_CAPACITY_KG_DAY};
pub use weather_sync::WeatherService;
