use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yieldcast",
    version,
    about = "Tomato yield and harvest forecasting"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project yield and a harvest plan (default)
    Forecast(ForecastArgs),
    /// Run interactive setup
    Init,
    /// Validate config and test the weather connection
    Check,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ForecastArgs {
    /// Detection result JSON produced by the vision model
    #[arg(short, long)]
    pub detection: Option<PathBuf>,

    /// Analysis date (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Override the forecast horizon in days
    #[arg(long, allow_negative_numbers = true)]
    pub days: Option<i64>,

    /// Override the number of plants
    #[arg(long, allow_negative_numbers = true)]
    pub plants: Option<i64>,

    /// Override the daily harvest capacity in kg
    #[arg(long, allow_negative_numbers = true)]
    pub capacity: Option<f64>,

    /// Override the district used for climatology and pricing
    #[arg(long)]
    pub district: Option<String>,

    /// Fetch live weather even if the config disables it
    #[arg(long)]
    pub live_weather: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
