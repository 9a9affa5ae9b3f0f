mod config;

use std::path::Path;
use std::time::Duration;

use clap::Parser;
use vacancy_harvester::auth::Credentials;
use vacancy_harvester::collectors::harvester::{HarvestSettings, Harvester};
use vacancy_harvester::collectors::rabota::{self, RabotaClient};
use vacancy_harvester::collectors::superjob::{self, DEFAULT_KEYWORDS, SuperJobSweep};
use vacancy_harvester::gateway::Gateway;
use vacancy_harvester::logging;
use vacancy_harvester::models::superjob_vacancy::SuperJobRow;
use vacancy_harvester::store;

use crate::config::{Command, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::parse();
    let log_dir = (!config.no_log_file).then_some(config.log_dir.as_path());
    let _log_guard = logging::init(log_dir, config.log_json)?;

    let timeout = Duration::from_secs(config.timeout_secs);

    match config.command {
        Command::Rabota {
            credentials,
            base_url,
            output,
            checkpoint,
            start_id,
            end_id,
            flush_every,
            resume,
        } => {
            tracing::info!("Parsing rabota.ru source");
            let credentials = Credentials {
                app_id: credentials.app_id,
                app_secret: credentials.app_secret,
                code: credentials.code,
            };
            let client =
                RabotaClient::new(Gateway::new()?, base_url, credentials).with_timeout(timeout);
            let settings = HarvestSettings {
                output,
                checkpoint,
                start_id,
                end_id,
                flush_every,
                resume,
            };

            let report = Harvester::new(client, settings).run().await?;
            for failure in &report.failures {
                tracing::warn!(
                    id = failure.id,
                    kind = ?failure.kind,
                    "Vacancy {} failed: {}",
                    failure.id,
                    failure.error
                );
            }
            if report.interrupted {
                tracing::warn!("Harvest interrupted at id {:?}", report.last_id);
            }
            tracing::info!(
                "Parsing completed: {} records saved, {} fetched this run, {} ids failed",
                report.records.len(),
                report.fetched,
                report.failures.len()
            );
        }
        Command::Superjob {
            secret,
            base_url,
            output,
            delay_ms,
            keywords,
        } => {
            let queries = if keywords.is_empty() {
                superjob::default_queries(DEFAULT_KEYWORDS)
            } else {
                superjob::default_queries(&keywords)
            };
            let sweep = SuperJobSweep::new(Gateway::new()?, base_url, secret)
                .with_delay(Duration::from_millis(delay_ms))
                .with_timeout(timeout);

            let report = sweep.run(&queries).await;
            save_superjob(&output, &report.rows)?;
            tracing::info!(
                "Saved {} superjob.ru vacancies, {} queries failed",
                report.rows.len(),
                report.failures.len()
            );
        }
        Command::AuthorizeUrl {
            app_id,
            base_url,
            redirect_uri,
        } => {
            println!("{}", rabota::authorization_url(&base_url, &app_id, &redirect_uri)?);
        }
    }

    Ok(())
}

fn save_superjob(output: &Path, rows: &[SuperJobRow]) -> anyhow::Result<()> {
    store::write_rows(output, &SuperJobRow::FIELDS, rows)?;
    tracing::info!("Vacancies saved to {}", output.display());
    Ok(())
}
