use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{App, test};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Value, json};

use crate::api::report::ReportContext;
use crate::config::Config;
use crate::model::corporate::{CorporateName, FactoryName, SalaryMonth};
use crate::model::payroll::{PayrollRow, ReportRow};
use crate::pdf::{PdfRenderer, RenderError};
use crate::report::shaper::tests::sample_row;
use crate::repository::payroll::{NameFilter, PayrollSource, ReportFilter};
use crate::routes;

#[derive(Default)]
struct FakeSource {
    corporates: Vec<CorporateName>,
    payroll: Vec<PayrollRow>,
    report: Vec<ReportRow>,
    fail: bool,
    calls: AtomicUsize,
    last_report_filter: Mutex<Option<ReportFilter>>,
}

impl FakeSource {
    fn answer<T: Clone + Send + 'static>(&self, rows: &[T]) -> BoxFuture<'_, Result<Vec<T>, sqlx::Error>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail {
            Err(sqlx::Error::Protocol("connection reset by mysql at 10.0.0.5".into()))
        } else {
            Ok(rows.to_vec())
        };
        async move { result }.boxed()
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PayrollSource for FakeSource {
    fn corporate_names(&self) -> BoxFuture<'_, Result<Vec<CorporateName>, sqlx::Error>> {
        self.answer(&self.corporates)
    }

    fn factory_names<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<Vec<FactoryName>, sqlx::Error>> {
        self.answer(&[])
    }

    fn months<'a>(&'a self, _: &'a str, _: &'a str) -> BoxFuture<'a, Result<Vec<SalaryMonth>, sqlx::Error>> {
        self.answer(&[])
    }

    fn payroll_rows<'a>(&'a self, _: &'a NameFilter) -> BoxFuture<'a, Result<Vec<PayrollRow>, sqlx::Error>> {
        self.answer(&self.payroll)
    }

    fn report_rows<'a>(&'a self, filter: &'a ReportFilter) -> BoxFuture<'a, Result<Vec<ReportRow>, sqlx::Error>> {
        *self.last_report_filter.lock().unwrap() = Some(filter.clone());
        self.answer(&self.report)
    }
}

/// Writes a stand-in PDF and keeps the HTML it was given. With
/// `fail_after_write` it leaves a truncated file behind and then fails, the
/// way a browser killed mid-print does.
#[derive(Default)]
struct FakeRenderer {
    fail: bool,
    fail_after_write: bool,
    documents: Mutex<Vec<String>>,
}

impl PdfRenderer for FakeRenderer {
    fn render<'a>(&'a self, html: &'a str, output: &'a Path) -> BoxFuture<'a, Result<(), RenderError>> {
        async move {
            if self.fail {
                return Err(RenderError::BrowserNotFound);
            }
            if self.fail_after_write {
                tokio::fs::write(output, b"%PDF-partial").await?;
                return Err(RenderError::Failed {
                    status: "exit status: 1".into(),
                    stderr: "print aborted".into(),
                });
            }
            self.documents.lock().unwrap().push(html.to_string());
            tokio::fs::write(output, b"%PDF-1.4\n").await?;
            Ok(())
        }
        .boxed()
    }
}

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("wage-register-api-{}", uuid::Uuid::new_v4()))
}

fn test_config(reports_dir: &Path) -> Config {
    test_config_with(reports_dir, &[])
}

fn test_config_with(reports_dir: &Path, overrides: &[(&str, &str)]) -> Config {
    let reports_dir = reports_dir.display().to_string();
    Config::from_lookup(move |key| {
        if let Some((_, value)) = overrides.iter().find(|(k, _)| *k == key) {
            return Some(value.to_string());
        }
        match key {
            "SERVER_ADDR" => Some("127.0.0.1:0".into()),
            "DATABASE_URL" => Some("mysql://localhost/unused".into()),
            "REPORTS_DIR" => Some(reports_dir.clone()),
            _ => None,
        }
    })
    .unwrap()
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

macro_rules! test_app {
    ($source:expr, $renderer:expr, $config:expr) => {{
        let source: Arc<dyn PayrollSource> = $source.clone();
        let renderer: Arc<dyn PdfRenderer> = $renderer.clone();
        let config: Config = $config.clone();
        let reports = Data::new(ReportContext::from_config(&config).unwrap());
        test::init_service(
            App::new()
                .app_data(Data::from(source))
                .app_data(Data::from(renderer))
                .app_data(reports)
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .peer_addr("127.0.0.1:40000".parse().unwrap())
}

fn payroll_row() -> PayrollRow {
    PayrollRow {
        factory_employee_id: Some("F-0042".into()),
        name: Some("Ravi Kumar".into()),
        salary: Some(r#"{"basic": 20000, "hra": 5000}"#.into()),
        net_payable: Some("23000".into()),
        earning_details: Some(r#"[{"title":"BASIC","answer":20000}]"#.into()),
        ..PayrollRow::default()
    }
}

#[actix_web::test]
async fn corporates_returns_empty_list_successfully() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource::default());
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config(&dir));

    let resp = test::call_service(&app, get("/api/corporates").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(
        body,
        json!({"success": true, "message": "Corporate names fetched successfully", "data": []})
    );
}

#[actix_web::test]
async fn corporates_lists_names() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource {
        corporates: vec![CorporateName {
            corporate_name: Some("Acme".into()),
        }],
        ..FakeSource::default()
    });
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config(&dir));

    let body: Value = test::call_and_read_body_json(&app, get("/api/corporates").to_request()).await;
    assert_eq!(body["data"], json!([{"corporate_name": "Acme"}]));
}

#[actix_web::test]
async fn missing_parameters_are_rejected_before_any_query() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource::default());
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config(&dir));

    let cases = [
        ("/api/factories", "Corporate name is required."),
        ("/api/factories?corporateName=", "Corporate name is required."),
        ("/api/months?corporateName=Acme", "Corporate name and factory name are required."),
        (
            "/api/corporate-data?corporateName=Acme&factoryName=Plant%20A",
            "Corporate name, factory name, and month are required.",
        ),
        (
            "/api/corporate-data-params?corporateId=1&month=2024-02",
            "Corporate id, factory id, and month are required.",
        ),
        (
            "/api/corporate-data-params?corporateId=one&factoryId=2&month=2024-02",
            "Corporate id, factory id, and structure id must be numeric.",
        ),
        (
            "/api/corporate-data-params?corporateId=1&factoryId=2&month=2024-02&structureId=x",
            "Corporate id, factory id, and structure id must be numeric.",
        ),
    ];

    for (uri, message) in cases {
        let resp = test::call_service(&app, get(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"success": false, "message": message}), "{uri}");
    }

    assert_eq!(source.calls(), 0);
    assert!(files_in(&dir).is_empty());
}

#[actix_web::test]
async fn name_lookups_return_empty_lists_not_404() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource::default());
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config(&dir));

    for uri in [
        "/api/factories?corporateName=Acme",
        "/api/months?corporateName=Acme&factoryName=Plant%20A",
    ] {
        let resp = test::call_service(&app, get(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"success": true, "data": []}), "{uri}");
    }
}

#[actix_web::test]
async fn corporate_data_without_rows_is_not_found() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource::default());
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config(&dir));

    let req = get("/api/corporate-data?corporateName=Acme&factoryName=Plant%20A&month=2024-01").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"success": false, "message": "No employee data found for the selected filters."})
    );
}

#[actix_web::test]
async fn corporate_data_returns_rows_verbatim() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource {
        payroll: vec![payroll_row(), PayrollRow::default()],
        ..FakeSource::default()
    });
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config(&dir));

    let req = get("/api/corporate-data?corporateName=Acme&factoryName=Plant%20A&month=2024-01").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], json!(true));
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["salary"], json!(r#"{"basic": 20000, "hra": 5000}"#));
    assert_eq!(data[0]["net_payable"], json!("23000"));
    assert_eq!(data[1]["salary"], Value::Null);
}

#[actix_web::test]
async fn report_without_rows_is_not_found_and_writes_nothing() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource::default());
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config(&dir));

    let req = get("/api/corporate-data-params?corporateId=1&factoryId=2&month=2024-02").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().starts_with("No data found"));
    assert!(files_in(&dir).is_empty());
    assert!(renderer.documents.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn report_is_written_and_its_path_returned() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource {
        report: vec![sample_row()],
        ..FakeSource::default()
    });
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config(&dir));

    let req = get("/api/corporate-data-params?corporateId=1&factoryId=2&month=2024-01&structureId=7").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Report generated successfully"));
    let file_path = body["filePath"].as_str().unwrap();
    assert!(file_path.starts_with("/reports/report-"), "{file_path}");
    assert!(file_path.ends_with(".pdf"));

    let written = files_in(&dir);
    assert_eq!(written.len(), 1);
    assert!(file_path.ends_with(written[0].file_name().unwrap().to_str().unwrap()));

    assert_eq!(
        *source.last_report_filter.lock().unwrap(),
        Some(ReportFilter {
            company_id: 1,
            factory_id: 2,
            month: "2024-01".into(),
            structure_id: Some(7),
        })
    );

    let documents = renderer.documents.lock().unwrap();
    assert!(documents[0].contains("Ravi Kumar"));
    assert!(documents[0].contains("A4 landscape"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[actix_web::test]
async fn repeated_reports_get_distinct_files_with_identical_tables() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource {
        report: vec![sample_row()],
        ..FakeSource::default()
    });
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config(&dir));

    let uri = "/api/corporate-data-params?corporateId=1&factoryId=2&month=2024-01";
    let first: Value = test::call_and_read_body_json(&app, get(uri).to_request()).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second: Value = test::call_and_read_body_json(&app, get(uri).to_request()).await;

    assert_ne!(first["filePath"], second["filePath"]);
    assert_eq!(files_in(&dir).len(), 2);

    let documents = renderer.documents.lock().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0], documents[1]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[actix_web::test]
async fn malformed_line_items_fail_the_whole_report() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource {
        report: vec![
            sample_row(),
            ReportRow {
                earning_details: Some("[{\"title\": \"BASIC\"".into()),
                ..sample_row()
            },
        ],
        ..FakeSource::default()
    });
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config(&dir));

    let req = get("/api/corporate-data-params?corporateId=1&factoryId=2&month=2024-01").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"success": false, "message": "Internal Server Error"}));
    assert!(files_in(&dir).is_empty());
}

#[actix_web::test]
async fn database_faults_are_generic_500s() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource {
        fail: true,
        ..FakeSource::default()
    });
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config(&dir));

    for uri in [
        "/api/corporates",
        "/api/factories?corporateName=Acme",
        "/api/corporate-data-params?corporateId=1&factoryId=2&month=2024-01",
    ] {
        let resp = test::call_service(&app, get(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"success": false, "message": "Internal Server Error"}), "{uri}");
    }
}

#[actix_web::test]
async fn render_failures_are_generic_500s() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource {
        report: vec![sample_row()],
        ..FakeSource::default()
    });
    let renderer = Arc::new(FakeRenderer {
        fail: true,
        ..FakeRenderer::default()
    });
    let app = test_app!(source, renderer, test_config(&dir));

    let req = get("/api/corporate-data-params?corporateId=1&factoryId=2&month=2024-01").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], json!("Internal Server Error"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[actix_web::test]
async fn failed_render_leaves_no_file_behind() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource {
        report: vec![sample_row()],
        ..FakeSource::default()
    });
    let renderer = Arc::new(FakeRenderer {
        fail_after_write: true,
        ..FakeRenderer::default()
    });
    let app = test_app!(source, renderer, test_config(&dir));

    let req = get("/api/corporate-data-params?corporateId=1&factoryId=2&month=2024-01").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let left = files_in(&dir);
    assert!(left.is_empty(), "failed report left {left:?}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[actix_web::test]
async fn generated_report_is_served_at_its_file_path() {
    let dir = scratch_dir();
    std::fs::create_dir_all(&dir).unwrap();
    let source = Arc::new(FakeSource {
        report: vec![sample_row()],
        ..FakeSource::default()
    });
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config(&dir));

    let req = get("/api/corporate-data-params?corporateId=1&factoryId=2&month=2024-01").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let file_path = body["filePath"].as_str().unwrap();

    let resp = test::call_service(&app, get(file_path).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = test::read_body(resp).await;
    assert_eq!(&bytes[..], b"%PDF-1.4\n");

    let resp = test::call_service(&app, get("/reports/missing.pdf").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let _ = std::fs::remove_dir_all(&dir);
}

#[actix_web::test]
async fn report_requests_beyond_the_per_minute_limit_are_throttled() {
    let dir = scratch_dir();
    let source = Arc::new(FakeSource {
        report: vec![sample_row()],
        ..FakeSource::default()
    });
    let renderer = Arc::new(FakeRenderer::default());
    let app = test_app!(source, renderer, test_config_with(&dir, &[("RATE_REPORT_PER_MIN", "1")]));

    let uri = "/api/corporate-data-params?corporateId=1&factoryId=2&month=2024-01";
    let first = test::call_service(&app, get(uri).to_request()).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = test::call_service(&app, get(uri).to_request()).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(renderer.documents.lock().unwrap().len(), 1);

    // Lookups are not limited.
    let lookup = test::call_service(&app, get("/api/corporates").to_request()).await;
    assert_eq!(lookup.status(), StatusCode::OK);

    let _ = std::fs::remove_dir_all(&dir);
}
