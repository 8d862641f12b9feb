use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use shelter_finder::agent::AgentSlot;
use shelter_finder::catalog::{self, CatalogError, ShelterCatalogResolver};
use shelter_finder::config::{AppConfig, ConfigError};
use shelter_finder::domain::{DomainError, GeoPoint};
use shelter_finder::geocode::{
    GeocodeBatchRunner, GeocodeError, GoogleGeocoder, OfflineGeocoder, RunOptions, RunSummary,
};
use shelter_finder::ranking::{CandidateRanker, RankingError};
use shelter_finder::routing::{GoogleRoutesBackend, RouteClient, RouteError};
use shelter_finder::telemetry::{self, TelemetryError};
use shelter_finder::web::{AppState, create_router};

#[derive(Parser, Debug)]
#[command(
    name = "shelter-finder",
    about = "Pick the nearest evacuation shelter by driving time",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Geocode the raw shelter dataset into the geocoded dataset
    Geocode(GeocodeArgs),
    /// Rank shelters for one origin and print the result as JSON
    Select(SelectArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct GeocodeArgs {
    /// Raw dataset (defaults to the data directory's raw file)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Checkpoint to write (defaults to the data directory's geocoded file)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Only consider the first N entries (0 = all)
    #[arg(long, default_value_t = 0)]
    limit: usize,
    /// Record entries without calling the geocoding API
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct SelectArgs {
    /// Origin latitude
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    /// Origin longitude
    #[arg(long, allow_negative_numbers = true)]
    lng: f64,
    /// JSON array of shelters (defaults to the fallback dataset)
    #[arg(long)]
    shelters: Option<PathBuf>,
    /// Print every scored shelter instead of only the best
    #[arg(long)]
    all: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Ranking(#[from] RankingError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("missing GOOGLE_MAPS_API_KEY in env; export it and retry")]
    MissingApiKey,
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::MissingApiKey => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "exiting");
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    telemetry::init(&config.log_level)?;

    match cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    {
        Command::Serve(args) => serve(config, args).await,
        Command::Geocode(args) => geocode(config, args).await,
        Command::Select(args) => select(config, args).await,
    }
}

async fn serve(mut config: AppConfig, args: ServeArgs) -> Result<(), CliError> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let client = RouteClient::new(config.route.clone())?;
    let ranker = CandidateRanker::new(client, config.ranking.clone());
    let catalog = ShelterCatalogResolver::new(config.catalog());
    let routes = config
        .google_routes()
        .map(GoogleRoutesBackend::new)
        .transpose()?;
    let agent = AgentSlot::from_config(&config.agent);

    let app = create_router(AppState::new(ranker, catalog, routes, agent));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        routing_backend = %config.route.base_url,
        data_dir = %config.data_dir.display(),
        "shelter finder listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

async fn geocode(config: AppConfig, args: GeocodeArgs) -> Result<(), CliError> {
    let geocoder = match config.geocoder() {
        Some(geocoder_config) if !args.dry_run => Some(GoogleGeocoder::new(geocoder_config)?),
        None if !args.dry_run => return Err(CliError::MissingApiKey),
        _ => None,
    };

    let paths = config.catalog();
    let input = args.input.unwrap_or(paths.raw_path);
    let output = args.output.unwrap_or(paths.geocoded_path);
    let options = RunOptions::new().with_region_suffix(paths.region_suffix);

    let dataset = catalog::load_raw(&input)?;

    let summary = match geocoder {
        Some(geocoder) => {
            GeocodeBatchRunner::new(geocoder, options)
                .run(&dataset, &output, args.limit, false)
                .await?
        }
        None => {
            GeocodeBatchRunner::new(OfflineGeocoder, options)
                .run(&dataset, &output, args.limit, true)
                .await?
        }
    };

    report(&summary, &output);
    Ok(())
}

fn report(summary: &RunSummary, output: &std::path::Path) {
    println!(
        "Geocoding complete: {} considered, {} skipped, {} resolved, {} recorded without lookup.",
        summary.considered, summary.skipped, summary.resolved, summary.recorded_dry
    );
    println!(
        "{} records written to {}",
        summary.checkpoint_len,
        output.display()
    );
}

async fn select(config: AppConfig, args: SelectArgs) -> Result<(), CliError> {
    let origin = GeoPoint::new(args.lat, args.lng)?;

    let shelters = match &args.shelters {
        Some(path) => catalog::load_geocoded(path)?,
        None => ShelterCatalogResolver::new(config.catalog()).resolve(Vec::new())?,
    };

    let client = RouteClient::new(config.route.clone())?;
    let ranker = CandidateRanker::new(client, config.ranking.clone());

    let json = if args.all {
        serde_json::to_string_pretty(&ranker.rank_all(origin, &shelters).await)?
    } else {
        serde_json::to_string_pretty(&ranker.select_best(origin, &shelters).await?)?
    };
    println!("{json}");
    Ok(())
}
