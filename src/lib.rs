pub(crate) mod cli;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;
pub(crate) mod tasks;

#[cfg(test)]
mod test_support;

use clap::Parser;

use crate::cli::Cli;
use crate::core::{config::Settings, telemetry};
use crate::services::lms::LmsClient;
use crate::tasks::retirement::{self, RetirementOptions};

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    tracing::debug!(
        environment = settings.runtime().environment.as_str(),
        strict_config = settings.runtime().strict_config,
        "Settings loaded"
    );

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let lms = LmsClient::from_settings(&settings)?;
    let options = RetirementOptions::new(
        cli.queue_names,
        cli.force,
        settings.retirement().max_number_of_failures,
    );

    let result = retirement::retire_failed_submissions(&db_pool, &lms, &options).await;

    if let Err(err) = core::metrics::write_textfile(&settings) {
        tracing::warn!(error = %err, "Failed to write Prometheus textfile");
    }

    db_pool.close().await;

    result?;

    Ok(())
}
