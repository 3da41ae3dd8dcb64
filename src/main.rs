mod cli;

use chrono::{Datelike, Local};
use clap::Parser;
use cli::{Cli, Commands, ForecastArgs, OutputFormat};
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use yieldcast::config::Config;
use yieldcast::logic::{WeatherService, YieldForecaster};
use yieldcast::models::{AppControls, DetectionResult, ForecastResult, MarketQuery};
use yieldcast::{report, Result, YieldcastError};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Some(Commands::Init) => Config::setup_interactive().map(|_| ()),
        Some(Commands::Check) => run_check(cli.config).await,
        Some(Commands::Forecast(args)) => run_forecast(cli.config, args).await,
        None => run_forecast(cli.config, ForecastArgs::default()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Serialize)]
struct ForecastOutput<'a> {
    detection: &'a DetectionResult,
    forecast: &'a ForecastResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    market: Option<MarketQuery>,
}

async fn run_forecast(config_path: Option<std::path::PathBuf>, args: ForecastArgs) -> Result<()> {
    let config = Config::load(config_path)?;
    let controls = apply_overrides(config.controls.clone(), &args);
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let detection = match args.detection {
        Some(ref path) => load_detection(path)?,
        None if controls.use_detection_model => {
            return Err(YieldcastError::InvalidData(
                "No detection file given; pass --detection or disable use_detection_model"
                    .to_string(),
            ));
        }
        None => {
            tracing::info!("Detection model disabled - using demo detection");
            DetectionResult::demo(i64::from(as_of.num_days_from_ce()), "")
        }
    };

    let weather = WeatherService::new(&config).resolve(&controls, as_of).await;
    tracing::info!(source = %weather.source, days = weather.len(), "Weather resolved");

    let forecaster = YieldForecaster::new(config.model.clone());
    let forecast = forecaster.forecast(&detection, &controls, Some(&weather), as_of);

    match args.format {
        OutputFormat::Json => {
            let output = ForecastOutput {
                detection: &detection,
                forecast: &forecast,
                market: controls
                    .include_price_forecast
                    .then(|| forecast.market_query(&controls)),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            print!("{}", report::render(&detection, &controls, &forecast));
        }
    }

    Ok(())
}

async fn run_check(config_path: Option<std::path::PathBuf>) -> Result<()> {
    let config = Config::load(config_path)?;
    println!("Config OK");
    println!("  District: {}", config.controls.district);
    match yieldcast::datasources::climatology::canonical_name(&config.controls.district) {
        Some(name) => println!("  Climatology: {}", name),
        None => println!(
            "  Climatology: none (known: {})",
            yieldcast::datasources::climatology::known_districts().join(", ")
        ),
    }

    let service = WeatherService::new(&config);
    let status = service.check_connections().await;
    if !status.configured {
        println!("  OpenWeatherMap: not configured");
    } else if status.openweathermap {
        println!("  OpenWeatherMap: OK");
    } else {
        println!("  OpenWeatherMap: OFFLINE");
    }

    Ok(())
}

fn apply_overrides(mut controls: AppControls, args: &ForecastArgs) -> AppControls {
    if let Some(days) = args.days {
        controls.forecast_days = days;
    }
    if let Some(plants) = args.plants {
        controls.num_plants = plants;
    }
    if let Some(capacity) = args.capacity {
        controls.harvest_capacity_kg_day = capacity;
    }
    if let Some(ref district) = args.district {
        controls.district = district.clone();
    }
    if args.live_weather {
        controls.use_live_weather = true;
    }
    controls
}

fn load_detection(path: &Path) -> Result<DetectionResult> {
    let content = std::fs::read_to_string(path)?;
    let detection = serde_json::from_str(&content)?;
    Ok(detection)
}
