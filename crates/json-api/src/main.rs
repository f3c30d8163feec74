//! Platter JSON API Server

use std::{process, sync::Arc};

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use thiserror::Error;
use tracing::{error, info};

use platter::{
    fixtures::{Fixture, FixtureError},
    receipt::{self, ReceiptError},
};
use platter_app::{
    auth::{AuthServiceError, StaticAuthService},
    context::{AppContext, AppInitError},
};

use crate::{
    config::{ServerConfig, pricing::PricingConfigError},
    observability::{Observability, metrics_handler, request_logging},
    state::State,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod auth;
mod carts;
mod config;
mod coupons;
mod errors;
mod extensions;
mod healthcheck;
mod observability;
mod orders;
mod payments;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
enum StartupError {
    #[error("invalid pricing configuration: {0}")]
    Pricing(#[from] PricingConfigError),

    #[error("invalid currency: {0}")]
    Currency(#[from] ReceiptError),

    #[error("failed to load auth tokens: {0}")]
    Auth(#[from] AuthServiceError),

    #[error("failed to load fixtures: {0}")]
    Fixtures(#[from] FixtureError),

    #[error("failed to initialize app context: {0}")]
    App(#[from] AppInitError),
}

async fn build_state(config: &ServerConfig) -> Result<Arc<State>, StartupError> {
    let settings = config.pricing.service_settings()?;
    let currency = receipt::currency(&config.pricing.currency)?;

    let tokens = config.fixtures.tokens_file();
    let auth = Arc::new(StaticAuthService::from_file(&tokens)?);

    info!(tokens = %tokens.display(), "loaded auth tokens");

    let app = if let Some(url) = &config.database.database_url {
        AppContext::from_database_url(url, auth, settings).await?
    } else {
        let mut fixture = Fixture::with_base_path(&config.fixtures.fixtures_path);

        fixture
            .load_catalog(&config.fixtures.fixture_set)?
            .load_coupons(&config.fixtures.fixture_set)?;

        AppContext::in_memory(&fixture, auth, settings)
    };

    Ok(State::shared(app, currency))
}

/// Platter JSON API Server entry point
#[tokio::main]
pub async fn main() {
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    let _observability = match Observability::init(&config) {
        Ok(observability) => observability,
        Err(init_error) => {
            #[expect(
                clippy::print_stderr,
                reason = "logging failed to initialize, must use eprintln"
            )]
            {
                eprintln!("Observability error: {init_error}");
            }

            process::exit(1);
        }
    };

    let state = match build_state(&config).await {
        Ok(state) => state,
        Err(startup_error) => {
            error!("failed to start: {startup_error}");

            process::exit(1);
        }
    };

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(request_logging)
        .hoop(inject(state))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(router::app_router());

    let doc = OpenApi::new("Platter API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;

    info!("server stopped");
}
