#[macro_use]
extern crate rocket;

mod database;
mod db;
mod env;
mod error;
mod models;
mod routes;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use database::{connect_pool, ensure_schema};
use env::{AppConfig, EnvReport, load_environment};
use error::AppError;
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;
use routes::{
    add_grades, add_student, class_average, health, index, subject_topper, view_details,
    view_details_redirect,
};
use sqlx::{Pool, Sqlite};
use telemetry::{TelemetryFairing, init_tracing};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
    #[error("Launch error: {0}")]
    Launch(String),
}

#[rocket::main]
async fn main() -> Result<(), Error> {
    let (mut report, env_error) = match load_environment() {
        Ok(report) => (report, None),
        Err(e) => (EnvReport::default(), Some(e)),
    };

    let config = AppConfig::from_env(&mut report.warnings);
    let _telemetry_guard = init_tracing(&config)?;

    if let Some(e) = env_error {
        error!("Failed to load environment files: {:#}", e);
    }
    report.log();

    let pool = connect_pool(&config).await?;

    info!("Ensuring database schema...");
    if let Err(e) = ensure_schema(&pool).await {
        error!("Failed to create schema: {}", e);
        return Err(e.into());
    }

    init_rocket(pool)
        .launch()
        .await
        .map_err(|e| Error::Launch(e.to_string()))?;

    Ok(())
}

pub fn init_rocket(pool: Pool<Sqlite>) -> Rocket<Build> {
    info!("Starting grade tracker");

    rocket::build()
        .manage(pool)
        .mount(
            "/",
            routes![
                index,
                add_student,
                add_grades,
                view_details,
                view_details_redirect,
                subject_topper,
                class_average,
                health,
            ],
        )
        .attach(Template::fairing())
        .attach(TelemetryFairing)
}
