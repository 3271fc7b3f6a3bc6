mod config;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use hbnb_api::{AppState, AppStateInner};
use hbnb_db::Database;
use hbnb_service::HbnbFacade;

use crate::config::{Config, DEFAULT_JWT_SECRET};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hbnb=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("HBNB_JWT_SECRET is not set; using the development secret");
    }

    // Init database
    let db = if config.in_memory() {
        info!("Using in-memory database");
        Database::open_in_memory()?
    } else {
        Database::open(Path::new(&config.db_path))?
    };
    let facade = HbnbFacade::new(db);

    if let Some((email, password)) = &config.admin {
        if facade.ensure_admin(email, password)? {
            info!("Seeded admin account {}", email);
        }
    }

    let state: AppState = Arc::new(AppStateInner {
        facade,
        jwt_secret: config.jwt_secret.clone(),
        token_ttl: config.token_ttl_secs,
    });
    let app = hbnb_api::router(state);

    let addr = config.addr()?;
    info!("HBnB API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
