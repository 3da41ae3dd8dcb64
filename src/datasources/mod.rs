pub mod climatology;
pub mod openweathermap;

pub use openweathermap::OpenWeatherMapClient;
