#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use covid_dash::CovidStorage;
use covid_dash::service::importer::{self, ImportOptions, ImportSummary};
use serde_json::Value;
use tower::ServiceExt;

pub const FIXTURE: &str = "\
iso_code,continent,location,date,population,total_cases,new_cases,total_deaths,positive_rate
TST,Europe,Testland,2021-01-01,2000000.0,100.0,10.0,1.0,
TST,Europe,Testland,2021-01-02,2000000.0,,,2.0,0.1
TST,Europe,Testland,2021-01-03,2000000.0,130.0,30.0,3.0,0.2
TSU,Europe,Testunia,2021-01-03,,50.0,5.0,,
OTH,Asia,Otherland,2021-01-03,1000000.0,400.0,40.0,4.0,0.3
";

pub const OPTIONS: ImportOptions = ImportOptions {
    batch_size: 2,
    progress_every: 100,
};

pub async fn empty_storage() -> CovidStorage {
    covid_dash::db::open("sqlite::memory:")
        .await
        .expect("failed to open in-memory database")
}

pub async fn import(storage: &CovidStorage, csv: &str) -> ImportSummary {
    importer::import_reader(storage, csv.as_bytes(), OPTIONS)
        .await
        .expect("import failed")
}

pub async fn seeded_storage() -> CovidStorage {
    let storage = empty_storage().await;
    import(&storage, FIXTURE).await;
    storage
}

pub fn app(storage: CovidStorage) -> Router {
    covid_dash::router::dash_router(covid_dash::router::DashState::new(storage))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body was not JSON")
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body = String::from_utf8(body.to_vec()).expect("response body was not utf-8");

    TestResponse {
        status,
        content_type,
        body,
    }
}
