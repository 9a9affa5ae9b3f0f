use std::time::Duration;

use crate::error::{ItemErrorKind, Result};
use crate::gateway::{ApiRequest, DEFAULT_TIMEOUT, Gateway};
use crate::models::superjob_vacancy::{SuperJobRow, rows_from_response};

pub const DEFAULT_BASE_URL: &str = "https://api.superjob.ru/2.0";
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Keywords swept when none are given on the command line.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "разработчик", "аналитик данных", "BI-аналитик", "программист", "it", "аналитик",
    "devops", "junior", "middle", "senior", "lead", "доставка", "банк", "курьер", "цветы",
    "backend", "frontend", "fullstack", "web", "mobile", "android", "ios", "qa", "тестировщик",
    "системный администратор", "сетевой инженер", "data scientist", "машинное обучение",
    "искусственный интеллект", "big data", "базы данных", "sql", "nosql", "python", "java",
    "javascript", "c#", "c++", "php", "ruby", "go", "scala", "kotlin", "swift", "html",
    "css", "react", "angular", "vue", "node.js", "docker", "kubernetes", "aws", "azure",
    "google cloud", "linux", "windows", "cybersecurity", "кибербезопасность", "сеть",
    "хостинг", "сервер", "администрирование", "техническая поддержка", "helpdesk",
    "проектный менеджер", "менеджер продукта", "scrum", "agile", "kanban", "бизнес-аналитик",
    "финансовый аналитик", "бухгалтер", "экономист", "аудит", "налог", "юрист", "адвокат",
    "hr", "рекрутер", "кадры", "обучение персонала", "маркетинг", "smm", "seo",
    "контекстная реклама", "копирайтер", "контент-менеджер", "дизайнер", "графический дизайнер",
    "ui/ux", "иллюстратор", "видеомонтаж", "фотограф", "продажи", "менеджер по продажам",
    "торговый представитель", "ритейл", "логистика", "склад", "закупки", "снабжение",
    "производство", "инженер", "технолог", "механик", "электрик", "строительство", "архитектор",
    "дизайн интерьера", "недвижимость", "агент", "консультант", "оператор", "колл-центр",
    "обслуживание клиентов", "ресторан", "отель", "туризм", "спорт", "тренер", "медицина",
    "врач", "медсестра", "фармацевт", "лаборатория", "образование", "учитель", "преподаватель",
    "репетитор", "переводчик", "журналист", "редактор", "библиотекарь", "исследования", "наука",
    "лаборант", "эколог", "энергетика", "нефть", "газ", "химия", "биология", "физика",
    "математика", "статистика", "социология", "психология", "искусство", "музыка", "актер",
    "режиссер", "писатель", "блогер", "стример", "геймдев", "игры", "анимация", "3d", "vr",
    "ar", "робототехника", "дроны", "электроника", "телеком", "связь", "телевидение",
    "радио", "кино", "фото", "соцсети", "стартап", "предприниматель", "фриланс",
    "удаленная работа",
];

/// One `/vacancies/` search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepQuery {
    Keyword(String),
    SalaryOrder,
    Param { key: String, value: String },
}

impl SweepQuery {
    fn params(&self) -> Vec<(&str, &str)> {
        match self {
            SweepQuery::Keyword(keyword) => vec![("keyword", keyword.as_str())],
            SweepQuery::SalaryOrder => vec![("order_field", "payment")],
            SweepQuery::Param { key, value } => vec![(key.as_str(), value.as_str())],
        }
    }

    fn label(&self) -> String {
        match self {
            SweepQuery::Keyword(keyword) => format!("keyword '{keyword}'"),
            SweepQuery::SalaryOrder => "salary order".to_string(),
            SweepQuery::Param { key, value } => format!("{key}={value}"),
        }
    }
}

/// Keyword searches, then the salary ordering, then Moscow.
pub fn default_queries<S: AsRef<str>>(keywords: &[S]) -> Vec<SweepQuery> {
    let mut queries: Vec<SweepQuery> = keywords
        .iter()
        .map(|k| SweepQuery::Keyword(k.as_ref().to_string()))
        .collect();
    queries.push(SweepQuery::SalaryOrder);
    queries.push(SweepQuery::Param {
        key: "town".to_string(),
        value: "Москва".to_string(),
    });
    queries
}

#[derive(Debug, Clone)]
pub struct QueryFailure {
    pub query: String,
    pub kind: ItemErrorKind,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct SweepReport {
    pub rows: Vec<SuperJobRow>,
    pub failures: Vec<QueryFailure>,
}

/// Sequential keyword sweep over the superjob.ru search API.
pub struct SuperJobSweep {
    gateway: Gateway,
    base_url: String,
    app_key: String,
    delay: Duration,
    timeout: Duration,
}

impl SuperJobSweep {
    pub fn new(gateway: Gateway, base_url: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            gateway,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app_key: app_key.into(),
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run every query in order. A failed query is logged and skipped.
    pub async fn run(&self, queries: &[SweepQuery]) -> SweepReport {
        tracing::info!("Parsing superjob.ru source ({} queries)", queries.len());
        let mut report = SweepReport::default();

        for (i, query) in queries.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            match self.search(query).await {
                Ok(rows) => {
                    report.rows.extend(rows);
                    tracing::info!("New vacancies length: {}", report.rows.len());
                }
                Err(e) => {
                    tracing::error!("Query {} failed: {e}", query.label());
                    report.failures.push(QueryFailure {
                        query: query.label(),
                        kind: ItemErrorKind::from(&e),
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }

    async fn search(&self, query: &SweepQuery) -> Result<Vec<SuperJobRow>> {
        tracing::info!("Getting vacancies by {}", query.label());

        let mut req = ApiRequest::get(format!("{}/vacancies/", self.base_url))
            .header("X-Api-App-Id", self.app_key.as_str())
            .timeout(self.timeout);
        for (key, value) in query.params() {
            req = req.param(key, value);
        }

        let response = self.gateway.request(req).await?.into_json()?;
        Ok(rows_from_response(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_queries_end_with_salary_and_town() {
        let queries = default_queries(&["python", "go"]);
        assert_eq!(queries.len(), 4);
        assert_eq!(queries[0], SweepQuery::Keyword("python".into()));
        assert_eq!(queries[2], SweepQuery::SalaryOrder);
        assert_eq!(queries[3].params(), vec![("town", "Москва")]);
    }

    #[test]
    fn default_keywords_cover_the_sweep() {
        assert!(DEFAULT_KEYWORDS.contains(&"разработчик"));
        assert_eq!(default_queries(DEFAULT_KEYWORDS).len(), DEFAULT_KEYWORDS.len() + 2);
    }
}
