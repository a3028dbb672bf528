use std::sync::Arc;

use actix_web::{middleware::Logger, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use taskgate::{
    auth::{password::DEFAULT_COST, PasswordHasher},
    config::AppEnv,
    repository::{postgres, PgTaskRepository, PgUserRepository},
    routes, AppState, Config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let app_env = std::env::var("APP_ENV")
        .ok()
        .and_then(|value| AppEnv::parse(&value).ok())
        .unwrap_or(AppEnv::Development);
    dotenv::from_filename(app_env.dotenv_file()).ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io_error)?;
    let hasher = PasswordHasher::new(DEFAULT_COST).map_err(to_io_error)?;

    let state = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await
                .map_err(to_io_error)?;
            postgres::migrate(&pool).await.map_err(to_io_error)?;
            log::info!("Connected to database, migrations applied");

            AppState::new(
                &config,
                Arc::new(PgUserRepository::new(pool.clone())),
                Arc::new(PgTaskRepository::new(pool)),
                hasher,
            )
        }
        None => {
            log::warn!("DATABASE_URL not set; data is kept in memory and lost on exit");
            AppState::in_memory(&config, hasher)
        }
    };

    log::info!(
        "Starting TaskGate server at {} ({:?})",
        config.server_url(),
        config.app_env
    );
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(Logger::default())
            .configure(move |cfg| routes::configure(cfg, &state))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

fn to_io_error<E: std::fmt::Display>(error: E) -> std::io::Error {
    log::error!("Startup failed: {}", error);
    std::io::Error::new(std::io::ErrorKind::Other, error.to_string())
}
