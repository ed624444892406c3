use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use kneecast_core::{Config, ConfigError, DatabaseError};
use kneecast_services::{SavedAddress, SavedAddressStore};
use kneecast_weather::{
    format_date, format_temperature, icon_label, Coordinates, ResolverSettings, WeatherError, WeatherInfo,
    WeatherResolver,
};

use commands::{AddressCommand, CommandLine, Commands, ForecastArgs};

mod commands;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CommandLine::parse_args();

    if let Err(e) = kneecast_core::init() {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {}", user_message(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: CommandLine) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Forecast(args) => forecast(&config, args).await,
        Commands::Address { command } => address(&config, command).await,
    }
}

fn load_config(cli: &CommandLine) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => {
            let config = Config::load_from(path)?;
            config.checked()?;
            config
        }
        None => Config::load_validated()?.0,
    };

    tracing::debug!("Using config directory {}", config.config_dir.display());
    Ok(config)
}

fn resolver_settings(config: &Config) -> ResolverSettings {
    let weather = &config.weather;
    let mut settings = ResolverSettings::new(&weather.geocoder_url, &weather.weather_url)
        .with_cache_ttl(Duration::from_secs(u64::from(weather.cache_ttl_minutes) * 60))
        .with_timeout(Duration::from_secs(weather.request_timeout_secs));

    match weather.effective_fallback_app_id() {
        Some(app_id) => settings = settings.with_fallback(&weather.fallback_geocoder_url, app_id),
        None => tracing::debug!("Fallback geocoder disabled: no app id"),
    }
    settings
}

fn open_store(config: &Config) -> Result<SavedAddressStore> {
    let path = config.database_path();
    SavedAddressStore::open(&path).with_context(|| format!("Failed to open {}", path.display()))
}

async fn forecast(config: &Config, args: ForecastArgs) -> Result<()> {
    let resolver = WeatherResolver::from_settings(&resolver_settings(config))?;

    let (address, coords) = if args.selected {
        let selected = open_store(config)?
            .selected()?
            .ok_or_else(|| DatabaseError::NotFound("no address is selected".into()))?;
        (Some(selected.name), Some(selected.coordinates))
    } else {
        let coords = args.lat.zip(args.lon).map(|(lat, lon)| Coordinates::new(lat, lon));
        (args.address, coords)
    };

    let info = resolver.resolve(address.as_deref(), coords).await?;
    print_forecast(address.as_deref(), &info);
    Ok(())
}

fn print_forecast(address: Option<&str>, info: &WeatherInfo) {
    let title = info
        .location_name
        .as_deref()
        .or(address)
        .unwrap_or("Current location");
    println!("{}", title);

    for day in &info.daily_forecasts {
        println!(
            "  {}  {:<24} {:>8} / {:>8}",
            format_date(&day.date),
            icon_label(day.icon_id),
            format_temperature(day.min_temp),
            format_temperature(day.max_temp)
        );
    }
}

async fn address(config: &Config, command: AddressCommand) -> Result<()> {
    let store = open_store(config)?;

    match command {
        AddressCommand::Add {
            name,
            lat,
            lon,
            select,
        } => {
            let coords = match lat.zip(lon) {
                Some((lat, lon)) => Coordinates::new(lat, lon),
                None => {
                    let resolver = WeatherResolver::from_settings(&resolver_settings(config))?;
                    resolver
                        .geocoder()
                        .resolve(&name)
                        .await
                        .map_err(|e| WeatherError::geocoding(name.trim(), e))?
                }
            };

            let saved = store.add(&name, coords, select)?;
            println!("Saved #{} {} ({})", saved.id, saved.name, saved.coordinates);
        }
        AddressCommand::List => {
            let addresses = store.list()?;
            if addresses.is_empty() {
                println!("No saved addresses.");
            }
            for address in &addresses {
                print_address(address);
            }
        }
        AddressCommand::Select { id } => {
            store.select(id)?;
            println!("Selected #{}", id);
        }
        AddressCommand::Remove { name } => {
            let removed = store.delete_by_name(&name)?;
            if removed == 0 {
                return Err(DatabaseError::NotFound(format!("no saved address named '{}'", name)).into());
            }
            println!("Removed {} address(es) named {}", removed, name);
        }
    }

    Ok(())
}

fn print_address(address: &SavedAddress) {
    let marker = if address.is_selected { "*" } else { " " };
    println!(
        "{} #{:<4} {:<32} ({})  saved {}",
        marker,
        address.id,
        address.name,
        address.coordinates,
        address.created_at.format("%Y/%m/%d")
    );
}

/// Message shown to the user for a failed command.
fn user_message(err: &anyhow::Error) -> String {
    if let Some(e) = err.downcast_ref::<WeatherError>() {
        return e.user_message();
    }
    if let Some(e) = err.downcast_ref::<DatabaseError>() {
        return format!("{} ({})", e.user_message(), e);
    }
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        return format!("{} ({})", e.user_message(), e);
    }
    format!("{:#}", err)
}
