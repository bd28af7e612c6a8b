mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn country_data_returns_sorted_non_null_series() {
    let app = common::app(common::seeded_storage().await);

    let resp = common::get(
        &app,
        "/api/country_data?country=tst&start_date=2021-01-01&end_date=2021-01-31",
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);

    let body = resp.json();
    assert_eq!(body["country"], "Testland");
    assert_eq!(body["metric"], "Total Cases");
    assert_eq!(body["units"], "count");
    // 2021-01-02 has no total_cases and must not appear as zero
    assert_eq!(body["dates"], json!(["2021-01-01", "2021-01-03"]));
    assert_eq!(body["values"], json!([100.0, 130.0]));
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn country_data_honours_metric_and_range() {
    let app = common::app(common::seeded_storage().await);

    let resp = common::get(
        &app,
        "/api/country_data?country=TST&metric=POSITIVE_RATE&start_date=2021-01-02&end_date=2021-01-02",
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["metric"], "Positive Rate");
    assert_eq!(body["units"], "count");
    assert_eq!(body["dates"], json!(["2021-01-02"]));
    assert_eq!(body["values"], json!([0.1]));
}

#[tokio::test]
async fn unknown_country_suggests_similar_codes() {
    let app = common::app(common::seeded_storage().await);

    let resp = common::get(&app, "/api/country_data?country=ts").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let body = resp.json();
    assert_eq!(body["error"], "Country code \"TS\" not found");
    assert_eq!(body["suggestions"], json!(["TST", "TSU"]));

    let resp = common::get(&app, "/api/country_data?country=XYZ").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.json()["suggestions"], json!([]));
}

#[tokio::test]
async fn validation_errors_are_400() {
    let app = common::app(common::seeded_storage().await);

    for uri in [
        "/api/country_data",
        "/api/country_data?country=",
        "/api/country_data?country=TST&start_date=2021-99-01",
        "/api/country_data?country=TST&end_date=not-a-date",
        "/api/country_data?country=TST&start_date=2021-02-01&end_date=2021-01-01",
        "/api/country_data?country=TST&metric=death_rate",
        "/api/dashboard_data?country=TST&start_date=01/01/2021",
        "/api/search?q=%20%20",
        "/api/search",
        "/dashboard/chart?country=TST&end_date=2021-1-32",
        "/dashboard/compare?countries=,",
    ] {
        let resp = common::get(&app, uri).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(resp.json()["error"].is_string(), "{uri}");
    }

    let resp = common::get(&app, "/api/country_data?country=TST&start_date=2021-99-01").await;
    assert_eq!(resp.json()["error"], "Invalid date format. Use YYYY-MM-DD");
}

#[tokio::test]
async fn empty_series_is_404_with_suggestion() {
    let app = common::app(common::seeded_storage().await);

    let resp = common::get(&app, "/api/country_data?country=TSU&metric=total_deaths").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let body = resp.json();
    assert_eq!(body["error"], "No total deaths data available for Testunia");
    assert_eq!(body["suggestion"], "Try a different date range or metric");
}

#[tokio::test]
async fn dashboard_data_defaults_to_trailing_year() {
    let app = common::app(common::seeded_storage().await);

    let resp = common::get(&app, "/api/dashboard_data?country=OTH&end_date=2021-06-30").await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["message"], "Success");
    assert_eq!(body["dates"], json!(["2021-01-03"]));

    let resp = common::get(&app, "/api/dashboard_data?country=OTH&end_date=2022-06-30").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_matches_name_substring() {
    let app = common::app(common::seeded_storage().await);

    let resp = common::get(&app, "/api/search?q=TEST").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.json(),
        json!([
            {"iso_code": "TST", "name": "Testland"},
            {"iso_code": "TSU", "name": "Testunia"},
        ])
    );

    let resp = common::get(&app, "/api/search?q=nowhere").await;
    assert_eq!(resp.json(), json!([]));
}

#[tokio::test]
async fn status_reports_aggregates() {
    let app = common::app(common::seeded_storage().await);

    let body = common::get(&app, "/api/status").await.json();
    assert_eq!(body["total_countries"], 3);
    assert_eq!(body["countries_with_population"], 2);
    assert_eq!(body["total_covid_records"], 5);
    assert_eq!(body["latest_date"], "2021-01-03");

    let sample = body["sample_data"].as_array().expect("sample_data array");
    assert_eq!(sample.len(), 5);
    assert_eq!(sample[0]["date"], "2021-01-03");
    assert_eq!(sample[0]["country_name"], "Otherland");
    assert_eq!(sample[0]["country_population"], 1_000_000);
}

#[tokio::test]
async fn status_on_empty_database() {
    let app = common::app(common::empty_storage().await);

    let body = common::get(&app, "/api/status").await.json();
    assert_eq!(body["total_countries"], 0);
    assert_eq!(body["total_covid_records"], 0);
    assert!(body["latest_date"].is_null());
    assert_eq!(body["sample_data"], json!([]));
}

#[tokio::test]
async fn global_snapshot_computes_cases_per_million() {
    let app = common::app(common::seeded_storage().await);

    let resp = common::get(&app, "/api/global").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.json(),
        json!({
            "last_updated": "2021-01-03",
            "countries": [
                {"iso_code": "OTH", "country": "Otherland", "total_cases": 400.0, "cases_per_million": 400.0},
                {"iso_code": "TST", "country": "Testland", "total_cases": 130.0, "cases_per_million": 65.0},
            ]
        })
    );

    let empty = common::app(common::empty_storage().await);
    let resp = common::get(&empty, "/api/global").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn debug_endpoints() {
    let app = common::app(common::seeded_storage().await);

    let body = common::get(&app, "/api/debug/countries").await.json();
    assert_eq!(body.as_array().map(Vec::len), Some(3));

    let resp = common::get(&app, "/api/debug/countries/TST").await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["country"], "Testland");
    let data = body["data"].as_array().expect("data array");
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["date"], "2021-01-03");
    assert!(data[1]["total_cases"].is_null());

    let resp = common::get(&app, "/api/debug/countries/NOPE").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chart_views_render_svg_and_html() {
    let app = common::app(common::seeded_storage().await);

    let resp = common::get(
        &app,
        "/dashboard/chart?country=TST&start_date=2021-01-01&end_date=2021-01-31",
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.content_type.as_deref(), Some("image/svg+xml"));
    assert!(resp.body.contains("<svg"));

    let resp = common::get(&app, "/dashboard/compare?countries=TST,oth&metric=new_cases").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("<svg"));

    let resp = common::get(&app, "/dashboard/compare?countries=TST,ZZZ").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = common::get(&app, "/dashboard/global").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Last updated: 2021-01-03"));
    assert!(resp.body.contains("<td>Otherland</td>"));
    assert!(!resp.body.contains("Testunia"));

    let resp = common::get(&app, "/dashboard").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("<option value=\"TSU\">Testunia</option>"));
}

#[tokio::test]
async fn global_dashboard_without_data_shows_error() {
    let app = common::app(common::empty_storage().await);

    let resp = common::get(&app, "/dashboard/global").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("No countries with complete data available"));
}
