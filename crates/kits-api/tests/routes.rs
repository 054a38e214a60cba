use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use kits_api::build_router;
use kits_api::config::Settings;
use kits_api::kits::schema::header_row;
use kits_api::kits::KitService;
use kits_api::sheets::MemorySheets;
use kits_api::state::AppState;

const SPREADSHEET_ID: &str = "sheet-test-123";

fn settings(overrides: &[(&str, &str)]) -> Settings {
    let mut builder = Settings::defaults()
        .unwrap()
        .set_override("sheets.spreadsheet_id", SPREADSHEET_ID)
        .unwrap();
    for (key, value) in overrides {
        builder = builder.set_override(*key, *value).unwrap();
    }
    builder.build().unwrap().try_deserialize().unwrap()
}

fn app_with(sheets: Arc<MemorySheets>, settings: Settings) -> Router {
    let state = AppState::new(settings, KitService::new(sheets));
    build_router(Arc::new(state))
}

fn kit_row(id: &str, active: &str, options: &str) -> Vec<String> {
    let mut cells = vec![String::new(); 19];
    cells[0] = id.to_string();
    cells[1] = format!("Kit {}", id);
    cells[3] = "1,5".to_string();
    cells[4] = "2".to_string();
    cells[17] = active.to_string();
    cells[18] = options.to_string();
    cells
}

async fn seeded_sheets(tab: &str) -> Arc<MemorySheets> {
    let sheets = Arc::new(MemorySheets::new(SPREADSHEET_ID));
    sheets
        .insert_tab(
            tab,
            vec![
                header_row(),
                kit_row("K1", "oui", r#"{"finition":"mat"}"#),
                kit_row("K2", "Non", ""),
                Vec::new(),
                kit_row("K3", "", "{bad json"),
                kit_row("K4", "false", ""),
                kit_row("K5", "1", ""),
            ],
        )
        .await;
    sheets
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_spreadsheet_without_remote_calls() {
    let sheets = Arc::new(MemorySheets::new(SPREADSHEET_ID));
    let (status, body) = get(app_with(sheets.clone(), settings(&[])), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["spreadsheetId"], SPREADSHEET_ID);
    assert_eq!(sheets.calls().total(), 0);
}

#[tokio::test]
async fn kits_returns_only_active_records_in_sheet_order() {
    let sheets = seeded_sheets("client1@test.com").await;
    let (status, body) = get(
        app_with(sheets, settings(&[])),
        "/kits?email=%20client1@test.com%20",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "client1@test.com");
    assert_eq!(body["sheetName"], "client1@test.com");
    assert_eq!(body["count"], 3);

    let kits = body["kits"].as_array().unwrap();
    let ids: Vec<_> = kits.iter().map(|k| k["kitId"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["K1", "K3", "K5"]);

    assert_eq!(kits[0]["name"], "Kit K1");
    assert_eq!(kits[0]["defaultQtyLivret"], 1.5);
    assert_eq!(kits[0]["defaultQtyPochette"], 2.0);
    assert_eq!(kits[0]["defaultQtyPatron"], 0.0);
    assert_eq!(kits[0]["active"], true);
    assert_eq!(kits[0]["pjmOptions"]["finition"], "mat");
    assert_eq!(kits[0]["config"]["typeLivret"], "");
}

#[tokio::test]
async fn kits_keeps_row_with_malformed_options() {
    let sheets = seeded_sheets("client1@test.com").await;
    let (status, body) = get(app_with(sheets, settings(&[])), "/kits?email=client1@test.com").await;

    assert_eq!(status, StatusCode::OK);
    let k3 = body["kits"]
        .as_array()
        .unwrap()
        .iter()
        .find(|k| k["kitId"] == "K3")
        .unwrap();
    assert!(k3["pjmOptions"].is_null());
}

#[tokio::test]
async fn kits_lowercases_tenant_key_by_default() {
    let sheets = seeded_sheets("client1@test.com").await;
    let (status, body) = get(
        app_with(sheets.clone(), settings(&[])),
        "/kits?email=Client1@Test.COM",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "Client1@Test.COM");
    assert_eq!(body["sheetName"], "client1@test.com");
    assert_eq!(body["count"], 3);
    assert_eq!(sheets.tab_count().await, 1);
}

#[tokio::test]
async fn admin_kits_returns_every_row_raw() {
    let sheets = seeded_sheets("client1@test.com").await;
    let (status, body) = get(
        app_with(sheets, settings(&[])),
        "/admin/kits?email=client1@test.com",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sheetName"], "client1@test.com");
    assert_eq!(body["count"], 5);

    let kits = body["kits"].as_array().unwrap();
    let rows: Vec<_> = kits
        .iter()
        .map(|k| (k["kitId"].as_str().unwrap(), k["rowIndex"].as_u64().unwrap()))
        .collect();
    assert_eq!(rows, vec![("K1", 2), ("K2", 3), ("K3", 5), ("K4", 6), ("K5", 7)]);

    assert_eq!(kits[0]["defaultQtyLivret"], "1,5");
    assert_eq!(kits[1]["activeRaw"], "Non");
    assert_eq!(kits[2]["pjmOptionsJson"], "{bad json");
    assert_eq!(kits[0]["sheetName"], "client1@test.com");
}

#[tokio::test]
async fn admin_kits_preserves_case_by_default() {
    let sheets = Arc::new(MemorySheets::new(SPREADSHEET_ID));
    let (status, body) = get(
        app_with(sheets.clone(), settings(&[])),
        "/admin/kits?email=Client1@Test.com",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "Client1@Test.com");
    assert_eq!(body["sheetName"], "Client1@Test.com");
    assert_eq!(body["count"], 0);
    assert!(sheets.tab_rows("Client1@Test.com").await.is_some());
}

#[tokio::test]
async fn admin_key_case_is_configurable() {
    let sheets = seeded_sheets("client1@test.com").await;
    let settings = settings(&[("tenancy.admin_key_case", "lowercase")]);
    let (status, body) = get(app_with(sheets, settings), "/admin/kits?email=Client1@Test.com").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "Client1@Test.com");
    assert_eq!(body["sheetName"], "client1@test.com");
    assert_eq!(body["count"], 5);
}

#[tokio::test]
async fn first_request_provisions_tenant_tab() {
    let sheets = Arc::new(MemorySheets::new(SPREADSHEET_ID));
    let app = app_with(sheets.clone(), settings(&[]));

    let (status, body) = get(app.clone(), "/kits?email=new@test.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["kits"], Value::Array(Vec::new()));

    let (status, _) = get(app, "/kits?email=new@test.com").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(sheets.tab_count().await, 1);
    assert_eq!(sheets.calls().add_tab, 1);
    assert_eq!(sheets.calls().write, 1);
    assert_eq!(sheets.tab_rows("new@test.com").await.unwrap(), vec![header_row()]);
}

#[tokio::test]
async fn missing_email_is_rejected_without_remote_calls() {
    let sheets = Arc::new(MemorySheets::new(SPREADSHEET_ID));
    let app = app_with(sheets.clone(), settings(&[]));

    for uri in ["/kits", "/kits?email=", "/kits?email=%20%20"] {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Missing email query parameter");
    }

    let (status, body) = get(app, "/admin/kits").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing email");

    assert_eq!(sheets.calls().total(), 0);
}

#[tokio::test]
async fn integration_failure_returns_error_envelope() {
    let sheets = Arc::new(MemorySheets::failing(SPREADSHEET_ID, "backend unavailable"));
    let app = app_with(sheets, settings(&[]));

    let (status, body) = get(app.clone(), "/kits?email=client1@test.com").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error reading Google Sheet");
    assert!(body["details"].as_str().unwrap().contains("backend unavailable"));

    let (status, body) = get(app, "/admin/kits?email=client1@test.com").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal error while reading kits");
    assert!(body["details"].as_str().unwrap().contains("backend unavailable"));
}

#[tokio::test]
async fn malformed_query_uses_json_envelope() {
    let sheets = Arc::new(MemorySheets::new(SPREADSHEET_ID));
    let app = app_with(sheets.clone(), settings(&[]));

    for uri in [
        "/kits?email=a@b.com&email=c@d.com",
        "/admin/kits?email=a@b.com&email=c@d.com",
    ] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            response.headers()["content-type"],
            "application/json",
            "{uri}"
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Invalid query string");
        assert!(body["details"].as_str().unwrap().contains("duplicate field"));
    }

    assert_eq!(sheets.calls().total(), 0);
}
