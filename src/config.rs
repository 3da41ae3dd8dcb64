use crate::error::{Result, YieldcastError};
use crate::models::{AppControls, ForecastParameters};
use dialoguer::{Confirm, Input};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub controls: AppControls,
    #[serde(default)]
    pub model: ForecastParameters,
    #[serde(default)]
    pub openweathermap: Option<OpenWeatherMapConfig>,
}

#[derive(Clone, PartialEq, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Config {
    /// Load config from an explicit path or the standard locations.
    /// Falls back to defaults when no file exists and none was requested.
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(YieldcastError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                p
            }
            None => {
                let p = Self::find_config_path()?;
                if !p.exists() {
                    tracing::info!("No config file found; using built-in defaults");
                    return Ok(Self::default());
                }
                p
            }
        };

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| YieldcastError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::parse(&config_str)?;
        tracing::debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Parse YAML after substituting `${VAR}` environment references
    pub fn parse(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);
        serde_yaml::from_str(&content)
            .map_err(|e| YieldcastError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        Self::default_config_path()
    }

    /// Default path for writing new config files (~/.config/yieldcast/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| YieldcastError::Config("Cannot determine config directory".into()))?
            .join("yieldcast");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the new Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        let defaults = AppControls::default();

        println!();
        println!("Let's set up yieldcast!");
        println!();

        // --- Growing operation ---
        println!("Planting");
        let district: String = Input::new()
            .with_prompt("  District")
            .default(defaults.district.clone())
            .interact_text()
            .map_err(|e| YieldcastError::Config(format!("Input error: {}", e)))?;

        let num_plants: i64 = Input::new()
            .with_prompt("  Number of plants")
            .default(defaults.num_plants)
            .interact_text()
            .map_err(|e| YieldcastError::Config(format!("Input error: {}", e)))?;

        let avg_weight_g: f64 = Input::new()
            .with_prompt("  Average fruit weight (g)")
            .default(defaults.avg_weight_g)
            .interact_text()
            .map_err(|e| YieldcastError::Config(format!("Input error: {}", e)))?;

        let post_harvest_loss_pct: f64 = Input::new()
            .with_prompt("  Post-harvest loss (%)")
            .default(defaults.post_harvest_loss_pct)
            .interact_text()
            .map_err(|e| YieldcastError::Config(format!("Input error: {}", e)))?;

        let harvest_capacity_kg_day: f64 = Input::new()
            .with_prompt("  Harvest capacity (kg/day)")
            .default(defaults.harvest_capacity_kg_day)
            .interact_text()
            .map_err(|e| YieldcastError::Config(format!("Input error: {}", e)))?;

        let forecast_days: i64 = Input::new()
            .with_prompt("  Forecast horizon (days)")
            .default(defaults.forecast_days)
            .interact_text()
            .map_err(|e| YieldcastError::Config(format!("Input error: {}", e)))?;

        let gdd_base_c: f64 = Input::new()
            .with_prompt("  GDD base temperature (°C)")
            .default(defaults.gdd_base_c)
            .interact_text()
            .map_err(|e| YieldcastError::Config(format!("Input error: {}", e)))?;

        let use_detection_model = Confirm::new()
            .with_prompt("  Use detection results from the vision model?")
            .default(defaults.use_detection_model)
            .interact()
            .map_err(|e| YieldcastError::Config(format!("Input error: {}", e)))?;

        println!();

        // --- OpenWeatherMap (optional) ---
        println!("OpenWeatherMap (leave API key blank to skip)");
        let owm_api_key: String = Input::new()
            .with_prompt("  API key")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| YieldcastError::Config(format!("Input error: {}", e)))?;

        let openweathermap = if owm_api_key.is_empty() {
            None
        } else {
            let latitude: f64 = Input::new()
                .with_prompt("  Latitude")
                .default(11.0168)
                .interact_text()
                .map_err(|e| YieldcastError::Config(format!("Input error: {}", e)))?;

            let longitude: f64 = Input::new()
                .with_prompt("  Longitude")
                .default(76.9558)
                .interact_text()
                .map_err(|e| YieldcastError::Config(format!("Input error: {}", e)))?;

            Some(OpenWeatherMapConfig {
                api_key: owm_api_key,
                latitude,
                longitude,
                enabled: true,
            })
        };

        println!();

        let config = Config {
            controls: AppControls {
                avg_weight_g,
                post_harvest_loss_pct,
                num_plants,
                forecast_days,
                gdd_base_c,
                harvest_capacity_kg_day,
                use_detection_model,
                use_live_weather: openweathermap.is_some(),
                district,
                ..defaults
            },
            model: ForecastParameters::default(),
            openweathermap,
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)?;

        // Write with a header comment
        let content = format!(
            "# yieldcast configuration\n# Generated by `yieldcast init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .expect("env var pattern is a valid regex");

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }
}
