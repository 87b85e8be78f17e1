use std::sync::Arc;

use tender_engine::{autoclose, report};
use tender_seal::{Keyring, Seal, SecretKey};
use tender_sqlite::Db;
use tenderd::{
    AppConfig, Cli, Commands, ReportFormat,
    impls::{LogNotifier, TenderApp},
};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Everything logs through `tracing`; RUST_LOG selects what gets printed.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::import()?;
    let command = cli.command.clone().unwrap_or_default();

    // Needs neither configuration nor a store
    if command == Commands::GenerateKey {
        println!("{}", hex::encode(SecretKey::generate().as_bytes()));
        return Ok(());
    }

    let AppConfig {
        database,
        schedule,
        seal,
        cancellation,
        access,
    } = AppConfig::load(&cli)?;

    let keyring = Keyring::from_config(&seal)?;
    let db = Db::open(&database).await?;
    let app = Arc::new(TenderApp {
        db: db.clone(),
        seal: Seal::new(keyring),
        notifier: LogNotifier,
        notification_timeout: cancellation.notification_timeout,
        evaluators: access.evaluators,
    });

    match command {
        Commands::Run => {
            if schedule.every.is_some() {
                let scheduler = Arc::clone(&app).spawn_auto_close(schedule);

                tokio::signal::ctrl_c().await?;
                tracing::info!("shutting down");
                scheduler.abort();
            } else {
                tracing::warn!("no schedule configured, waiting for ctrl-c");
                tokio::signal::ctrl_c().await?;
            }
        }
        Commands::CloseDue { batch_size } => {
            let summary =
                autoclose::run_once(&*app, batch_size.unwrap_or(schedule.batch_size)).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::ExportReport {
            tender,
            requester,
            kind,
            format,
        } => {
            let report = report::opening_report(&*app, tender, requester, kind).await?;
            match format {
                ReportFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report.export_rows())?)
                }
                ReportFormat::Csv => print!("{}", report.to_csv()),
            }
        }
        Commands::GenerateKey => {}
    }

    db.close().await;
    Ok(())
}
