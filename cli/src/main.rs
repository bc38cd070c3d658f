mod cli;
mod config;
mod console;
mod render;

use std::io::Write;

use clap::Parser;
use common::logger::init_tracing;
use session::{ScannerSession, SessionConfig};
use tokio::io::BufReader;

use crate::cli::Cli;
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_env();
    init_tracing(cfg.is_production);

    tracing::info!("Starting coin scanner...");

    let session_cfg = SessionConfig {
        scanner: cli.scanner_config(),
        sort: cli.sort_spec(),
        track: cli.track.clone(),
        pumpportal_url: cfg.pumpportal_url.clone(),
        helius_url: cfg.helius_url.clone(),
        ..SessionConfig::default()
    };

    let mut session = ScannerSession::start(session_cfg);
    let shutdown = session.shutdown_signal();
    let Some(mut reports) = session.take_reports() else {
        anyhow::bail!("tick reports already taken");
    };

    eprintln!("{}", console::HELP);
    let console_task = tokio::spawn(console::run_console(
        BufReader::new(tokio::io::stdin()),
        session.handle().clone(),
        shutdown.clone(),
    ));

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            res = tokio::signal::ctrl_c() => {
                res?;
                tracing::info!("Shutdown signal received");
                break;
            }
            report = reports.recv() => {
                let Some(report) = report else { break };
                let text = if cli.json {
                    render::render_json(&report)?
                } else {
                    render::render_table(&report)
                };
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{text}")?;
                stdout.flush()?;
            }
        }
    }

    let result = session.stop().await;
    // stdin reads cannot be cancelled; don't wait on the console.
    console_task.abort();
    result
}
