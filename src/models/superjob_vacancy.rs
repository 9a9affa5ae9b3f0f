use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Row written to the superjob.ru CSV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuperJobRow {
    pub vacancy_id: Option<i64>,
    pub payment_from: Option<f64>,
    pub payment_to: Option<f64>,
    pub currency: Option<String>,
    pub date_published: Option<i64>,
    pub address: Option<String>,
    pub profession: Option<String>,
    pub candidat: Option<String>,
    pub type_of_work: Option<String>,
    /// JSON-encoded list, since CSV cells are flat.
    pub languages: Option<String>,
    pub phone: Option<String>,
    pub link: Option<String>,
}

impl SuperJobRow {
    pub const FIELDS: [&'static str; 12] = [
        "vacancy_id",
        "payment_from",
        "payment_to",
        "currency",
        "date_published",
        "address",
        "profession",
        "candidat",
        "type_of_work",
        "languages",
        "phone",
        "link",
    ];

    pub fn from_api(raw: &Value) -> Self {
        let text = |key: &str| {
            raw.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        Self {
            vacancy_id: raw.get("id").and_then(Value::as_i64),
            payment_from: raw.get("payment_from").and_then(Value::as_f64),
            payment_to: raw.get("payment_to").and_then(Value::as_f64),
            currency: text("currency"),
            date_published: raw.get("date_published").and_then(Value::as_i64),
            address: text("address"),
            profession: text("profession"),
            candidat: text("candidat"),
            type_of_work: raw
                .get("type_of_work")
                .and_then(|t| t.get("title"))
                .and_then(Value::as_str)
                .map(String::from),
            languages: raw
                .get("languages")
                .filter(|v| v.is_array())
                .map(Value::to_string),
            phone: text("phone"),
            link: text("link"),
        }
    }
}

/// Rows from a `/vacancies/` response. A response without `objects` adds nothing.
pub fn rows_from_response(response: &Value) -> Vec<SuperJobRow> {
    response
        .get("objects")
        .and_then(Value::as_array)
        .map(|objects| objects.iter().map(SuperJobRow::from_api).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn maps_nested_type_of_work_and_languages() {
        let response = json!({
            "objects": [{
                "id": 101,
                "payment_from": 80000,
                "payment_to": 0,
                "currency": "rub",
                "date_published": 1740700000,
                "address": "Москва, Тверская 1",
                "profession": "Python-разработчик",
                "candidat": "Опыт от 3 лет",
                "type_of_work": {"id": 6, "title": "Полный рабочий день"},
                "languages": [[1, 2]],
                "phone": null,
                "link": "https://www.superjob.ru/vakansii/101.html"
            }],
            "total": 1
        });

        let rows = rows_from_response(&response);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.vacancy_id, Some(101));
        assert_eq!(row.payment_from, Some(80000.0));
        assert_eq!(row.type_of_work.as_deref(), Some("Полный рабочий день"));
        assert_eq!(row.languages.as_deref(), Some("[[1,2]]"));
        assert_eq!(row.phone, None);
    }

    #[test]
    fn response_without_objects_is_empty() {
        assert!(rows_from_response(&json!({"error": "x"})).is_empty());
        assert!(rows_from_response(&Value::Null).is_empty());
    }

    #[test]
    fn missing_type_of_work_is_null() {
        let row = SuperJobRow::from_api(&json!({"id": 5}));
        assert_eq!(row.type_of_work, None);
        assert_eq!(row.languages, None);
    }

    #[test]
    fn empty_text_is_null() {
        let row = SuperJobRow::from_api(&json!({"id": 5, "candidat": "", "link": "x"}));
        assert_eq!(row.candidat, None);
        assert_eq!(row.link.as_deref(), Some("x"));
    }
}
