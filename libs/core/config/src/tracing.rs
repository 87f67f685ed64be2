use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre for startup errors. Call before any fallible operation.
///
/// Shows file:line of the error and hides the environment section.
/// Repeated calls are ignored.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Filter used when `RUST_LOG` is unset.
///
/// Production keeps request logs, audit events and warnings. Development is
/// verbose for the catalog crates and quieter for the connection pool.
pub fn default_filter(environment: &Environment) -> &'static str {
    if environment.is_production() {
        "info,sea_orm=warn,sqlx=warn"
    } else {
        "debug,sea_orm=info,sqlx=info,hyper=info"
    }
}

/// Initialize the global subscriber with an `ErrorLayer` for span traces.
///
/// - **Production** (`APP_ENV=production`): flattened JSON events, no targets
/// - **Development**: pretty, multi-line output
///
/// `RUST_LOG` overrides [`default_filter`]. A second call is a no-op, which
/// keeps tests that initialise tracing independent of each other.
///
/// ```ignore
/// #[instrument(skip(db))]
/// async fn connect_catalog(db: &PostgresConfig) -> eyre::Result<DatabaseConnection> {
///     connect_from_config(db.clone())
///         .await
///         .wrap_err("Failed to connect to the catalog database")
/// }
/// ```
pub fn init_tracing(environment: &Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(environment)));

    let result = if environment.is_production() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => info!(?environment, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}
