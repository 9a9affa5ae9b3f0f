use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;

use tracing::Instrument;
use uuid::Uuid;

use crate::auth::AccessToken;
use crate::collectors::VacancyApi;
use crate::error::{ItemErrorKind, Result};
use crate::models::vacancy::{VacancyRow, normalize};
use crate::store::{self, CheckpointFile};

pub const DEFAULT_START_ID: i64 = 46_955_330;
pub const DEFAULT_END_ID: i64 = 46_960_440;
pub const DEFAULT_FLUSH_EVERY: i64 = 10;

/// Where to pick up when a checkpoint exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ResumeMode {
    /// Start at the checkpoint id itself, re-fetching it once.
    #[default]
    Inclusive,
    /// Start right after the checkpoint id.
    Exclusive,
}

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub output: PathBuf,
    pub checkpoint: PathBuf,
    /// First id when no checkpoint exists.
    pub start_id: i64,
    /// Exclusive upper bound.
    pub end_id: i64,
    pub flush_every: i64,
    pub resume: ResumeMode,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            output: PathBuf::from("rabota_ru_vacancies.csv"),
            checkpoint: PathBuf::from("checkpoint.txt"),
            start_id: DEFAULT_START_ID,
            end_id: DEFAULT_END_ID,
            flush_every: DEFAULT_FLUSH_EVERY,
            resume: ResumeMode::default(),
        }
    }
}

/// Records collected so far plus the last id reached.
///
/// Rows are kept in first-seen order; a row whose id is already present
/// replaces the earlier one in place.
#[derive(Debug, Default)]
pub struct HarvestState {
    pub last_processed_id: Option<i64>,
    records: Vec<VacancyRow>,
    by_id: HashMap<i64, usize>,
}

impl HarvestState {
    pub fn new(last_processed_id: Option<i64>, records: Vec<VacancyRow>) -> Self {
        let mut state = Self {
            last_processed_id,
            ..Self::default()
        };
        for row in records {
            state.merge(row);
        }
        state
    }

    /// Returns `true` when the row was not seen before.
    pub fn merge(&mut self, row: VacancyRow) -> bool {
        let Some(id) = row.id else {
            self.records.push(row);
            return true;
        };
        match self.by_id.get(&id) {
            Some(&idx) => {
                self.records[idx] = row;
                false
            }
            None => {
                self.by_id.insert(id, self.records.len());
                self.records.push(row);
                true
            }
        }
    }

    pub fn records(&self) -> &[VacancyRow] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub id: i64,
    pub kind: ItemErrorKind,
    pub error: String,
}

#[derive(Debug)]
pub struct HarvestReport {
    pub records: Vec<VacancyRow>,
    pub failures: Vec<ItemFailure>,
    pub last_id: Option<i64>,
    /// Successful fetches in this run.
    pub fetched: usize,
    /// Set when the shutdown signal ended the loop early.
    pub interrupted: bool,
}

#[derive(Debug, Default)]
struct RunLog {
    failures: Vec<ItemFailure>,
    fetched: usize,
    interrupted: bool,
}

/// Enumerates an id range against a [`VacancyApi`], flushing to disk as it goes.
pub struct Harvester<A> {
    api: A,
    settings: HarvestSettings,
    checkpoint: CheckpointFile,
}

impl<A: VacancyApi> Harvester<A> {
    pub fn new(api: A, settings: HarvestSettings) -> Self {
        let checkpoint = CheckpointFile::new(settings.checkpoint.clone());
        Self {
            api,
            settings,
            checkpoint,
        }
    }

    /// Harvest until the range is exhausted or Ctrl-C is pressed.
    pub async fn run(&self) -> Result<HarvestReport> {
        self.run_until(async {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::warn!("Could not install Ctrl-C handler; running without one");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Harvest until the range is exhausted or `shutdown` resolves.
    ///
    /// The final flush runs whenever the loop is entered, even if it stopped
    /// on a shutdown signal or a failed intermediate flush.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<HarvestReport>
    where
        F: Future<Output = ()>,
    {
        let span = tracing::info_span!(
            "harvest",
            run_id = %Uuid::new_v4(),
            source = self.api.name()
        );
        self.harvest(shutdown).instrument(span).await
    }

    async fn harvest<F>(&self, shutdown: F) -> Result<HarvestReport>
    where
        F: Future<Output = ()>,
    {
        let mut state = self.load()?;
        let start = self.first_id(state.last_processed_id);
        tracing::info!(
            "Harvesting ids {start}..{} with {} existing records",
            self.settings.end_id,
            state.len()
        );

        let token = self.api.authenticate().await?;

        let mut log = RunLog::default();
        let iterated = self
            .iterate(&mut state, &token, start, &mut log, shutdown)
            .await;
        let flushed = self.flush(&state);
        iterated?;
        flushed?;

        tracing::info!(
            "Harvest finished: {} fetched, {} failed, {} records total",
            log.fetched,
            log.failures.len(),
            state.len()
        );

        Ok(HarvestReport {
            last_id: state.last_processed_id,
            records: state.records,
            failures: log.failures,
            fetched: log.fetched,
            interrupted: log.interrupted,
        })
    }

    fn load(&self) -> Result<HarvestState> {
        let rows: Vec<VacancyRow> = store::read_rows(&self.settings.output)?;
        if !rows.is_empty() {
            tracing::info!(
                "Loaded {} existing vacancies from {}",
                rows.len(),
                self.settings.output.display()
            );
        }
        let checkpoint = self.checkpoint.load()?;
        Ok(HarvestState::new(checkpoint, rows))
    }

    fn first_id(&self, checkpoint: Option<i64>) -> i64 {
        match (checkpoint, self.settings.resume) {
            (None, _) => self.settings.start_id,
            (Some(id), ResumeMode::Inclusive) => id,
            (Some(id), ResumeMode::Exclusive) => id + 1,
        }
    }

    async fn iterate<F>(
        &self,
        state: &mut HarvestState,
        token: &AccessToken,
        start: i64,
        log: &mut RunLog,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let flush_every = self.settings.flush_every.max(1);
        tokio::pin!(shutdown);

        for id in start..self.settings.end_id {
            let fetched = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::warn!("Shutdown signal received at id {id}, flushing before exit");
                    log.interrupted = true;
                    break;
                }
                result = self.fetch_one(token, id) => result,
            };

            state.last_processed_id = Some(id);
            match fetched {
                Ok(row) => {
                    log.fetched += 1;
                    state.merge(row);
                }
                Err(e) => {
                    tracing::error!("Error parsing vacancy for id {id}: {e}");
                    log.failures.push(ItemFailure {
                        id,
                        kind: ItemErrorKind::from(&e),
                        error: e.to_string(),
                    });
                }
            }

            if id % flush_every == 0 {
                self.flush(state)?;
            }
        }

        Ok(())
    }

    async fn fetch_one(&self, token: &AccessToken, id: i64) -> Result<VacancyRow> {
        tracing::info!("Parsing vacancy for id: {id}");
        let raw = self.api.fetch_vacancy(token, id).await?;
        Ok(normalize(&raw))
    }

    /// Overwrite the output with every record, then record the checkpoint.
    fn flush(&self, state: &HarvestState) -> Result<()> {
        store::write_rows(&self.settings.output, &VacancyRow::FIELDS, state.records())?;
        tracing::info!(
            "Vacancies saved to {} ({} rows)",
            self.settings.output.display(),
            state.len()
        );
        if let Some(id) = state.last_processed_id {
            self.checkpoint.save(id)?;
        }
        Ok(())
    }
}
