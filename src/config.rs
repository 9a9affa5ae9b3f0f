use std::path::PathBuf;

use clap::Parser;
use vacancy_harvester::collectors::harvester::{
    DEFAULT_END_ID, DEFAULT_FLUSH_EVERY, DEFAULT_START_ID, ResumeMode,
};
use vacancy_harvester::collectors::{rabota, superjob};

#[derive(Parser, Debug, Clone)]
#[command(name = "vacancy-harvester", about = "Collect vacancy listings into CSV files")]
pub struct Config {
    /// Emit console logs as JSON lines
    #[arg(long, env = "LOG_JSON", global = true)]
    pub log_json: bool,

    /// Directory for the daily-rotated `app.<date>.log` files
    #[arg(long, env = "LOG_DIR", default_value = ".log", global = true)]
    pub log_dir: PathBuf,

    /// Log to the console only
    #[arg(long, global = true)]
    pub no_log_file: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "60", global = true)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Harvest rabota.ru vacancies by id, resuming from the checkpoint
    Rabota {
        #[command(flatten)]
        credentials: RabotaCredentials,

        /// API base URL
        #[arg(long, env = "RABOTA_RU_BASE_URL", default_value = rabota::DEFAULT_BASE_URL)]
        base_url: String,

        /// CSV file holding every collected vacancy
        #[arg(long, default_value = "rabota_ru_vacancies.csv")]
        output: PathBuf,

        /// File holding the last processed id
        #[arg(long, default_value = "checkpoint.txt")]
        checkpoint: PathBuf,

        /// First id when no checkpoint exists
        #[arg(long, default_value_t = DEFAULT_START_ID)]
        start_id: i64,

        /// Exclusive upper bound of the id range
        #[arg(long, default_value_t = DEFAULT_END_ID)]
        end_id: i64,

        /// Flush whenever the id is a multiple of this
        #[arg(long, default_value_t = DEFAULT_FLUSH_EVERY, value_parser = clap::value_parser!(i64).range(1..))]
        flush_every: i64,

        /// Whether a resumed run re-fetches the checkpoint id
        #[arg(long, value_enum, default_value_t = ResumeMode::Inclusive)]
        resume: ResumeMode,
    },
    /// Sweep the superjob.ru search API by keyword
    Superjob {
        /// Application secret key
        #[arg(long, env = "SUPERJOB_SECRET", hide_env_values = true)]
        secret: String,

        /// API base URL
        #[arg(long, env = "SUPERJOB_BASE_URL", default_value = superjob::DEFAULT_BASE_URL)]
        base_url: String,

        /// CSV file to write
        #[arg(long, default_value = "superjob_ru_vacancies.csv")]
        output: PathBuf,

        /// Pause between requests in milliseconds
        #[arg(long, default_value = "500")]
        delay_ms: u64,

        /// Keyword to search (repeatable); replaces the built-in list
        #[arg(long = "keyword")]
        keywords: Vec<String>,
    },
    /// Print the rabota.ru page that grants the long-lived code
    AuthorizeUrl {
        #[arg(long, env = "RABOTA_RU_APP_ID")]
        app_id: String,

        #[arg(long, env = "RABOTA_RU_BASE_URL", default_value = rabota::DEFAULT_BASE_URL)]
        base_url: String,

        #[arg(long, default_value = rabota::DEFAULT_REDIRECT_URI)]
        redirect_uri: String,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct RabotaCredentials {
    #[arg(long, env = "RABOTA_RU_APP_ID")]
    pub app_id: String,

    #[arg(long, env = "RABOTA_RU_APP_SECRET", hide_env_values = true)]
    pub app_secret: String,

    /// Long-lived code obtained through `authorize-url`
    #[arg(long, env = "RABOTA_RU_CODE_TOKEN", hide_env_values = true)]
    pub code: String,
}
