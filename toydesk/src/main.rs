use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use toydesk::api::{create_router, AppState};
use toydesk::catalog::{render_product_block, ProductMatcher, Vocabulary};
use toydesk::clock::{Clock, SystemClock};
use toydesk::config::Config;
use toydesk::context::{build_loader, ContextCache};
use toydesk::db::{Database, DatabaseBackend, LibSqlBackend};
use toydesk::llm::LlmProvider;

#[derive(Parser)]
#[command(name = "toydesk")]
#[command(about = "Customer-support chat backend for an online toy store")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Rank catalog products against a query and print the prompt block
    Match {
        query: String,
        /// Catalog file with one product URL per line
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long, default_value_t = 8)]
        limit: usize,
    },
    /// Load the reference documents once and report what was found
    Context,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toydesk=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Match {
            query,
            catalog,
            limit,
        } => match_products(&config, &query, &catalog, limit).await,
        Command::Context => inspect_context(&config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    if config.server.admin_keys.is_empty() {
        tracing::warn!(
            "TOYDESK_ADMIN_KEYS is not set, admin endpoints are locked. Set it to enable /admin/* routes."
        );
    }

    tracing::info!("Initializing database...");
    let raw_db = Database::new(&config.database).await?;
    let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(raw_db));

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - chat requests will be answered with 503");
    }

    let loader = build_loader(&config.context)?;
    tracing::info!("Context documents source: {}", loader.describe());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState::new(config.clone(), db, llm, loader, clock);

    let cancel_token = CancellationToken::new();

    tracing::info!(
        "Starting context pre-warm... (interval={}s)",
        state.config.context.ttl_secs
    );
    let chat = state.chat.clone();
    let interval = tokio::time::Duration::from_secs(state.config.context.ttl_secs.max(1));
    let token = cancel_token.child_token();
    tokio::spawn(async move {
        chat.prewarm().await;
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Context pre-warm shutting down...");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    let lookup = chat.prewarm().await;
                    tracing::debug!(context = %lookup.state(), "Context pre-warm finished");
                }
            }
        }
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Toydesk starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn match_products(
    config: &Config,
    query: &str,
    catalog: &Path,
    limit: usize,
) -> anyhow::Result<()> {
    let catalog_text = tokio::fs::read_to_string(catalog).await?;
    let matcher = ProductMatcher::new(
        &config.catalog,
        Arc::new(Vocabulary::toy_store()),
        Arc::new(SystemClock),
    );

    let products = matcher.find_relevant_products(query, &catalog_text, limit);
    let stats = matcher.index_stats();
    println!("Indexed {} products from {}", stats.indexed, catalog.display());
    println!();

    for (rank, scored) in products.iter().enumerate() {
        println!(
            "{:>2}. {:>4}  {}  {}",
            rank + 1,
            scored.score,
            scored.product.display_name(),
            scored.product.url
        );
    }
    if products.is_empty() {
        println!("No products matched.");
    }

    println!();
    println!("{}", render_product_block(&products));
    Ok(())
}

async fn inspect_context(config: &Config) -> anyhow::Result<()> {
    let loader = build_loader(&config.context)?;
    let cache = ContextCache::from_config(&config.context, Arc::new(SystemClock));

    let lookup = cache.get_or_load(loader.as_ref()).await;
    let status = cache.status();

    println!("Source:  {}", loader.describe());
    println!("Result:  {}", lookup.state());
    println!("Cache:   {} (expires in {} ms)", status.status, status.time_to_expiry_ms);

    match lookup.documents() {
        Some(docs) => {
            for (name, text) in docs.named() {
                println!("  {name:<8} {:>7} chars", text.chars().count());
            }
        }
        None => println!("  no documents could be loaded"),
    }
    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
