//! TenantFence server entry point.
//!
//! Wires settings, the in-memory engine behind the scope guard, and the
//! HTTP router, then serves until ctrl-c. The tenancy guardrails run
//! before the listener binds; a misconfigured catalog or route table is a
//! startup failure, not a runtime surprise.

use clap::Parser;
use tenantfence_server::engine::{GuardedEngine, MemoryEngine};
use tenantfence_server::network::{build_router, AppSettings, AppState, ROUTES};
use tenantfence_server::{entities, guardrails};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tenantfence-server", version, about = "TenantFence API server")]
struct Args {
    /// Address to bind.
    #[arg(long, env = "TENANTFENCE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "TENANTFENCE_PORT", default_value_t = 8080)]
    port: u16,

    /// Deployment environment label.
    #[arg(long, env = "TENANTFENCE_ENV", default_value = "development")]
    environment: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let catalog = entities::catalog();
    guardrails::enforce_at_startup(&catalog, ROUTES)?;

    let engine = MemoryEngine::new();
    for entity in catalog.iter() {
        engine.create_table(entity);
    }

    let settings = AppSettings {
        environment: args.environment,
        ..AppSettings::default()
    };
    let state = AppState::new(settings.clone(), GuardedEngine::new(engine));
    let app = build_router(state, &settings);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, environment = %settings.environment, "tenantfence listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
