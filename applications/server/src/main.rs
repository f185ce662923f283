/// Jukebox Server - shared radio queue over HTTP
use clap::{Parser, Subcommand};
use jukebox_rotation::{SourceRegistry, TracingPublisher};
use jukebox_server::{config::ServerConfig, create_router, state::AppState};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jukebox-server")]
#[command(about = "Jukebox shared radio queue server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Apply database migrations and exit
    Migrate,
    /// Create a user
    CreateUser {
        /// Display name
        #[arg(short, long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "jukebox_server=info,jukebox_rotation=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Migrate => migrate(&config).await?,
        Commands::CreateUser { name } => create_user(&config, &name).await?,
    }

    Ok(())
}

async fn connect(config: &ServerConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool = jukebox_storage::create_pool(
        &config.storage.database_url,
        config.storage.max_connections,
    )
    .await?;
    jukebox_storage::run_migrations(&pool).await?;
    Ok(pool)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Jukebox Server");
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        strategy = ?config.rotation.strategy,
        "Configuration loaded"
    );

    let pool = connect(&config).await?;
    tracing::info!("Database connected");

    // Backend clients are registered here by deployments that ship them
    let sources = SourceRegistry::new(config.rotation.source_timeout());
    if sources.backends().is_empty() {
        tracing::warn!("No metadata sources registered, heads will not be validated");
    }

    let app_state = AppState::build(pool, sources, Arc::new(TracingPublisher), &config);

    let app = create_router(app_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn migrate(config: &ServerConfig) -> anyhow::Result<()> {
    connect(config).await?;
    tracing::info!(database = %config.storage.database_url, "Migrations applied");
    Ok(())
}

async fn create_user(config: &ServerConfig, name: &str) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let user = jukebox_storage::users::create(&pool, name).await?;

    println!("Created user {} - {}", user.id, user.name);

    Ok(())
}
