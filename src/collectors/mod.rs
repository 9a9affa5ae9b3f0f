// Vacancy sources and the checkpointed harvest loop that drives them.

pub mod harvester;
pub mod rabota;
pub mod superjob;

use async_trait::async_trait;
use serde_json::Value;

use crate::auth::AccessToken;
use crate::error::Result;

/// A vacancy-by-id API the harvester can enumerate.
///
/// `authenticate` is called once per run; its token is handed back to every
/// `fetch_vacancy` call of that run.
#[async_trait]
pub trait VacancyApi: Send + Sync {
    /// Short source name used in logs.
    fn name(&self) -> &str;

    async fn authenticate(&self) -> Result<AccessToken>;

    /// Raw vacancy payload for one id.
    async fn fetch_vacancy(&self, token: &AccessToken, id: i64) -> Result<Value>;
}
