use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use bondscope_core::{build_report, BondScreener, RatingService};
use bondscope_market_data::{RestGateway, RestGatewayConfig, TokioSleeper};

use crate::cli::Cli;
use crate::config::Config;
use crate::export::write_report;

const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

pub fn init_tracing(default_level: &str) {
    let log_format =
        std::env::var("BONDSCOPE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Screens, shapes and exports one report. Returns the path written.
pub async fn run(cli: Cli) -> anyhow::Result<PathBuf> {
    let config = Config::load(&cli.config)?;
    let output = cli.out.unwrap_or(config.output);

    let now = Utc::now();
    let today = now.with_timezone(&Local).date_naive();

    let ratings = RatingService::from_settings(&config.settings, today)?;
    let gateway = RestGateway::connect(
        config.token,
        RestGatewayConfig {
            timeout: GATEWAY_TIMEOUT,
            ..Default::default()
        },
    )?;

    let screener = BondScreener::new(
        Arc::new(gateway),
        ratings,
        Arc::new(TokioSleeper),
        config.settings,
    );
    let run = screener.run(now).await?;
    tracing::info!(
        "{} rows kept, {} bonds skipped",
        run.rows.len(),
        run.skipped
    );

    let report = build_report(run.rows, cli.clear);
    write_report(&report, &output)?;
    tracing::info!(
        "Wrote {} government and {} corporate bonds to {}",
        report.government.len(),
        report.corporate.len(),
        output.display()
    );
    Ok(output)
}
