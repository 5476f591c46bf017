use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use interaction_service::config::Config;
use interaction_service::handlers;
use interaction_service::middleware::JwtAuth;
use interaction_service::services::InteractionService;
use realtime_events::EventPublisher;

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting interaction-service");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: env={}, http_port={}",
        config.app.env, config.app.http_port
    );

    // Initialize database pool
    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    // Verify database connection
    sqlx::query("SELECT 1")
        .execute(&pg_pool)
        .await
        .context("Failed to verify database connection")?;
    info!("Database pool created and verified");

    // Run database migrations
    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    // Initialize the realtime event publisher
    let publisher = EventPublisher::connect(&config.redis.url, "interaction-service".to_string())
        .await
        .context("Failed to connect event publisher to Redis")?;
    info!("Event publisher connected");

    let service = Arc::new(InteractionService::new(
        pg_pool,
        publisher,
        config.redis.events_channel.clone(),
    ));

    let addr = format!("{}:{}", config.app.host, config.app.http_port);
    info!("Starting HTTP server on {}", addr);

    let jwt_secret = config.auth.jwt_secret.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(service.clone()))
            .wrap(actix_middleware::Logger::default())
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/ready", web::get().to(|| async { "READY" }))
            .service(
                web::scope("/api/v1")
                    .wrap(JwtAuth::new(&jwt_secret))
                    .configure(|cfg| {
                        handlers::interactions::register_routes(cfg);
                        handlers::notifications::register_routes(cfg);
                    }),
            )
    })
    .bind(&addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")
}
