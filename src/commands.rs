use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kneecast")]
#[command(about = "Weather forecasts for an address or a coordinate pair.")]
pub struct CommandLine {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the forecast for an address, coordinates or the selected address
    #[command(alias = "f")]
    Forecast(ForecastArgs),
    /// Manage saved addresses
    #[command(alias = "a")]
    Address {
        #[command(subcommand)]
        command: AddressCommand,
    },
}

#[derive(Args)]
pub struct ForecastArgs {
    /// Free-text address to geocode
    #[arg(long, conflicts_with = "selected")]
    pub address: Option<String>,

    #[arg(long, requires = "lon", allow_negative_numbers = true, conflicts_with = "selected")]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true, conflicts_with = "selected")]
    pub lon: Option<f64>,

    /// Use the selected saved address
    #[arg(long)]
    pub selected: bool,
}

#[derive(Subcommand)]
pub enum AddressCommand {
    /// Save an address, geocoding it when no coordinates are given
    Add {
        name: String,
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Also make it the selected address
        #[arg(long)]
        select: bool,
    },
    /// List saved addresses, newest first
    #[command(alias = "ls")]
    List,
    /// Select a saved address by id
    Select { id: i64 },
    /// Remove every saved address with this name
    #[command(alias = "rm")]
    Remove { name: String },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
