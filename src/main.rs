use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use weather_explorer::api::GeocodingRequest;
use weather_explorer::charts::{CurrentPanel, daily_cards, daily_chart, hourly_chart};
use weather_explorer::service::{NO_LOCATIONS_FOUND, SearchOutcome, ServiceEvent};
use weather_explorer::{
    ExplorerConfig, MapView, OpenMeteoClient, OverlayCategory, WeatherApi, WeatherService,
    logging, shape_daily, shape_hourly,
};

#[derive(Debug, Parser)]
#[command(name = "weather-explorer", version, about = "Search places and explore their weather")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List places matching a name
    Search {
        query: String,
    },
    /// Show current conditions, forecasts and the map overlay for a place
    Show {
        /// Place to search; the configured initial location when omitted
        query: Option<String>,

        /// 1-based index of the search result to show
        #[arg(long, default_value_t = 1)]
        pick: usize,

        /// Overlay category (temperature, precipitation, wind, clouds)
        #[arg(long)]
        overlay: Option<OverlayCategory>,

        /// Seed for a reproducible overlay
        #[arg(long)]
        seed: Option<u64>,

        /// Write the map as GeoJSON to this file
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ExplorerConfig::load_from_path(cli.config)?;
    logging::init(&config.logging, cli.verbose)?;
    debug!("Loaded configuration: {:?}", config);

    let client = Arc::new(OpenMeteoClient::new(&config.api)?);

    match cli.command {
        Command::Search { query } => search(client.as_ref(), &config, &query).await,
        Command::Show {
            query,
            pick,
            overlay,
            seed,
            geojson,
        } => {
            let overlay = match overlay {
                Some(category) => category,
                None => config.default_overlay()?,
            };
            let seed = seed.or(config.overlay.seed);
            show(client, &config, query, pick, overlay, seed, geojson).await
        }
    }
}

async fn search(api: &OpenMeteoClient, config: &ExplorerConfig, query: &str) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        bail!("Search query must not be empty");
    }

    let request = GeocodingRequest::new(query)
        .with_count(config.search.result_count)
        .with_language(config.search.language.as_deref());
    let locations = api
        .geocode(&request)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .with_context(|| format!("Searching for '{query}'"))?;

    if locations.is_empty() {
        println!("{NO_LOCATIONS_FOUND}");
        return Ok(());
    }
    for (i, location) in locations.iter().enumerate() {
        println!(
            "{:>2}. {}  [{}]",
            i + 1,
            location.display_name(),
            location.format_coordinates()
        );
    }
    Ok(())
}

async fn show(
    client: Arc<OpenMeteoClient>,
    config: &ExplorerConfig,
    query: Option<String>,
    pick: usize,
    overlay: OverlayCategory,
    seed: Option<u64>,
    geojson: Option<PathBuf>,
) -> Result<()> {
    if pick == 0 {
        bail!("--pick starts at 1");
    }

    let (service, mut events) = WeatherService::new(client, config);
    let mut map = MapView::mount(overlay, seed);

    let outcome = match query.as_deref() {
        Some(query) => service.search(query).await,
        None => service.start().await,
    };
    if outcome == SearchOutcome::Rejected {
        bail!("Search query must not be empty");
    }

    if pick > 1 {
        let candidates = service.snapshot().await.candidates;
        let location = candidates[pick_index(pick, candidates.len())?].clone();
        info!("Picking result #{}: {}", pick, location.display_name());
        service.select_location(location).await;
    }

    while let Ok(event) = events.try_recv() {
        if let ServiceEvent::WeatherLoaded(data) = event {
            map.update(&data);
        }
    }

    let state = service.snapshot().await;
    if let Some(message) = state.error {
        map.unmount();
        bail!(message);
    }
    let Some(data) = state.weather else {
        map.unmount();
        return Ok(());
    };

    println!("{}", CurrentPanel::new(&data.location.display_name(), &data.current));
    println!("{}", hourly_chart(&shape_hourly(&data.hourly)));
    let daily = shape_daily(&data.daily);
    println!("{}", daily_chart(&daily));
    for card in daily_cards(&daily) {
        println!("{card}");
    }
    println!();
    println!("{map}");

    if let Some(path) = geojson {
        let body = serde_json::to_string_pretty(&map.to_geojson())?;
        std::fs::write(&path, body)
            .with_context(|| format!("Failed to write GeoJSON to {}", path.display()))?;
        info!("Wrote map GeoJSON to {}", path.display());
    }

    map.unmount();
    Ok(())
}

/// Zero-based index of a 1-based `--pick` among `available` results
fn pick_index(pick: usize, available: usize) -> Result<usize> {
    if pick == 0 {
        bail!("--pick starts at 1");
    }
    if pick > available {
        bail!("Only {available} results found, cannot pick #{pick}");
    }
    Ok(pick - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 5, Some(0))]
    #[case(5, 5, Some(4))]
    #[case(0, 5, None)]
    #[case(6, 5, None)]
    #[case(1, 0, None)]
    fn test_pick_index(#[case] pick: usize, #[case] available: usize, #[case] expected: Option<usize>) {
        assert_eq!(pick_index(pick, available).ok(), expected);
    }

    #[test]
    fn test_pick_zero_is_rejected_by_message() {
        let err = pick_index(0, 3).unwrap_err();
        assert_eq!(err.to_string(), "--pick starts at 1");
    }

    #[test]
    fn test_cli_parses_show_pick() {
        let cli = Cli::try_parse_from(["weather-explorer", "show", "Paris", "--pick", "2"]).unwrap();
        match cli.command {
            Command::Show { query, pick, .. } => {
                assert_eq!(query.as_deref(), Some("Paris"));
                assert_eq!(pick, 2);
            }
            Command::Search { .. } => panic!("expected show"),
        }
    }
}
