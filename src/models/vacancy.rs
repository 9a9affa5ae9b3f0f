use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flat vacancy row written to the rabota.ru CSV.
///
/// Every field is nullable: a missing object anywhere along a path yields
/// `None` for that field only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VacancyRow {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub salary_from: Option<f64>,
    pub salary_to: Option<f64>,
    pub salary_currency: Option<String>,
    pub salary_pay_type: Option<String>,
    pub description: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub operating_schedule: Option<String>,
    pub company_name: Option<String>,
    pub company_id: Option<i64>,
    pub company_type: Option<String>,
}

impl VacancyRow {
    /// CSV header, in column order.
    pub const FIELDS: [&'static str; 14] = [
        "id",
        "title",
        "salary_from",
        "salary_to",
        "salary_currency",
        "salary_pay_type",
        "description",
        "contact_name",
        "contact_email",
        "contact_phone",
        "operating_schedule",
        "company_name",
        "company_id",
        "company_type",
    ];
}

/// Map one `response` object from the vacancy-by-id endpoint to a row.
pub fn normalize(raw: &Value) -> VacancyRow {
    let salary = object(raw, "salary");
    let contact = object(raw, "contact_person");
    let schedule = object(raw, "operating_schedule");
    let company = object(raw, "company");

    VacancyRow {
        id: raw.get("id").and_then(Value::as_i64),
        title: text(raw, "title"),
        salary_from: salary.and_then(|s| s.get("from")).and_then(Value::as_f64),
        salary_to: salary.and_then(|s| s.get("to")).and_then(Value::as_f64),
        salary_currency: salary.and_then(|s| text(s, "currency")),
        salary_pay_type: salary.and_then(|s| text(s, "pay_type")),
        description: text(raw, "description"),
        contact_name: contact.and_then(|c| text(c, "name")),
        contact_email: contact.and_then(|c| text(c, "email")),
        contact_phone: contact.and_then(contact_phone),
        operating_schedule: schedule.and_then(|s| text(s, "name")),
        company_name: company.and_then(|c| text(c, "name")),
        company_id: company.and_then(|c| c.get("id")).and_then(Value::as_i64),
        company_type: company.and_then(|c| text(c, "type")),
    }
}

/// First international number, but only when the person is flagged as
/// having a phone and the list is non-empty.
fn contact_phone(contact: &Value) -> Option<String> {
    if contact.get("has_phone").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    contact
        .get("phones")
        .and_then(Value::as_array)
        .and_then(|phones| phones.first())
        .and_then(|phone| text(phone, "number_international"))
}

/// A nested object, treating `null` the same as absent.
fn object<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| v.is_object())
}

/// A string leaf. Empty strings are `None`, which is also how they read back
/// from the CSV.
fn text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn full_record() -> Value {
        json!({
            "id": 46955335,
            "title": "Курьер",
            "salary": {"from": 50000, "to": 70000, "currency": "RUB", "pay_type": "month"},
            "description": "Доставка заказов",
            "contact_person": {
                "name": "Анна",
                "email": "hr@example.com",
                "has_phone": true,
                "phones": [{"number_international": "+7 900 000-00-00"}]
            },
            "operating_schedule": {"name": "Полный день"},
            "company": {"id": 42, "name": "ООО Ромашка", "type": "employer"}
        })
    }

    #[test]
    fn maps_every_field() {
        let row = normalize(&full_record());
        assert_eq!(
            row,
            VacancyRow {
                id: Some(46955335),
                title: Some("Курьер".into()),
                salary_from: Some(50000.0),
                salary_to: Some(70000.0),
                salary_currency: Some("RUB".into()),
                salary_pay_type: Some("month".into()),
                description: Some("Доставка заказов".into()),
                contact_name: Some("Анна".into()),
                contact_email: Some("hr@example.com".into()),
                contact_phone: Some("+7 900 000-00-00".into()),
                operating_schedule: Some("Полный день".into()),
                company_name: Some("ООО Ромашка".into()),
                company_id: Some(42),
                company_type: Some("employer".into()),
            }
        );
    }

    #[test]
    fn missing_salary_only_nulls_salary_fields() {
        let mut raw = full_record();
        raw.as_object_mut().unwrap().remove("salary");
        let row = normalize(&raw);

        assert_eq!(row.salary_from, None);
        assert_eq!(row.salary_to, None);
        assert_eq!(row.salary_currency, None);
        assert_eq!(row.salary_pay_type, None);
        assert_eq!(row.title.as_deref(), Some("Курьер"));
        assert_eq!(row.contact_phone.as_deref(), Some("+7 900 000-00-00"));
        assert_eq!(row.company_id, Some(42));
    }

    #[test]
    fn null_salary_is_treated_as_missing() {
        let mut raw = full_record();
        raw["salary"] = Value::Null;
        assert_eq!(normalize(&raw).salary_from, None);
    }

    #[test]
    fn has_phone_with_empty_list_yields_no_phone() {
        let mut raw = full_record();
        raw["contact_person"]["phones"] = json!([]);
        let row = normalize(&raw);
        assert_eq!(row.contact_phone, None);
        assert_eq!(row.contact_name.as_deref(), Some("Анна"));
    }

    #[test]
    fn phone_requires_has_phone_flag() {
        let mut raw = full_record();
        raw["contact_person"]["has_phone"] = json!(false);
        assert_eq!(normalize(&raw).contact_phone, None);

        raw["contact_person"].as_object_mut().unwrap().remove("has_phone");
        assert_eq!(normalize(&raw).contact_phone, None);

        raw["contact_person"]["has_phone"] = json!(true);
        raw["contact_person"].as_object_mut().unwrap().remove("phones");
        assert_eq!(normalize(&raw).contact_phone, None);
    }

    #[test]
    fn empty_object_yields_all_nulls() {
        assert_eq!(normalize(&json!({})), VacancyRow::default());
    }

    #[test]
    fn empty_strings_normalize_to_none() {
        let mut raw = full_record();
        raw["title"] = json!("");
        raw["contact_person"]["email"] = json!("");
        let row = normalize(&raw);

        assert_eq!(row.title, None);
        assert_eq!(row.contact_email, None);
        assert_eq!(row.contact_name.as_deref(), Some("Анна"));
    }
}
