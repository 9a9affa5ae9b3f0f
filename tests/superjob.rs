use std::time::Duration;

use serde_json::json;
use vacancy_harvester::collectors::superjob::{SuperJobSweep, default_queries};
use vacancy_harvester::error::ItemErrorKind;
use vacancy_harvester::gateway::Gateway;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn objects(ids: &[i64]) -> ResponseTemplate {
    let objects: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "payment_from": 100000,
                "currency": "rub",
                "type_of_work": {"title": "Удаленная работа"},
                "link": format!("https://www.superjob.ru/vakansii/{id}.html")
            })
        })
        .collect();
    ResponseTemplate::new(200).set_body_json(json!({ "objects": objects, "more": false }))
}

async fn mount(server: &MockServer, key: &str, value: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/2.0/vacancies/"))
        .and(header("X-Api-App-Id", "v3.r.secret"))
        .and(query_param(key, value))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn sweep_collects_every_query_and_skips_failures() {
    let server = MockServer::start().await;
    mount(&server, "keyword", "python", objects(&[1, 2])).await;
    mount(&server, "keyword", "курьер", ResponseTemplate::new(503)).await;
    mount(&server, "order_field", "payment", objects(&[3])).await;
    mount(&server, "town", "Москва", objects(&[4, 5])).await;

    let sweep = SuperJobSweep::new(
        Gateway::new().unwrap(),
        format!("{}/2.0/", server.uri()),
        "v3.r.secret",
    )
    .with_delay(Duration::ZERO);

    let report = sweep.run(&default_queries(&["python", "курьер"])).await;

    let ids: Vec<_> = report.rows.iter().map(|r| r.vacancy_id).collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
    assert_eq!(report.rows[0].type_of_work.as_deref(), Some("Удаленная работа"));

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].query, "keyword 'курьер'");
    assert_eq!(report.failures[0].kind, ItemErrorKind::HttpStatus(503));
}
