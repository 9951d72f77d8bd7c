use super::*;
use axum::{
    body::{self, Body},
    http::Request,
};
use shared::protocol::RegionContent;
use table::Dataset;
use tower::ServiceExt;

const LAUNCHES_CSV: &str = "\
Launch Site,class,Payload Mass (kg),Booster Version Category
CCAFS LC-40,0,0,v1.0
CCAFS LC-40,1,2000,v1.1
VAFB SLC-4E,1,9600,FT
KSC LC-39A,1,5300,B4
";

const SALES_CSV: &str = "\
Year,Month,Recession,Automobile_Sales,Vehicle_Type,Advertising_Expenditure,unemployment_rate
1980,Jan,1,100,Supperminicar,1000,5.0
1981,Feb,0,300,Sports,2000,3.0
";

fn test_app() -> Router {
    let launches = Dataset::from_csv_reader(LAUNCHES_CSV.as_bytes())
        .and_then(|dataset| dataset.conform(launch_records::SCHEMA))
        .expect("launches");
    let sales = Dataset::from_csv_reader(SALES_CSV.as_bytes())
        .and_then(|dataset| dataset.conform(automobile_sales::SCHEMA))
        .expect("sales");
    let catalog = Catalog::new(vec![
        launch_records::dashboard(Arc::new(launches)),
        automobile_sales::dashboard(Arc::new(sales)),
    ]);
    build_router(Arc::new(AppState { catalog }))
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

fn update_request(dashboard: &str, payload: serde_json::Value) -> Request<Body> {
    let payload = payload.to_string();
    Request::post(format!("/api/dashboards/{dashboard}/update"))
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .expect("request")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let request = Request::get("/healthz").body(Body::empty()).expect("request");
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"ok");
}

#[tokio::test]
async fn lists_both_dashboards() {
    let request = Request::get("/api/dashboards")
        .body(Body::empty())
        .expect("request");
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let summaries: Vec<DashboardSummary> =
        serde_json::from_slice(&body_bytes(response).await).expect("json");
    let ids: Vec<&str> = summaries.iter().map(|summary| summary.id.as_str()).collect();
    assert_eq!(ids, [launch_records::ID, automobile_sales::ID]);
}

#[tokio::test]
async fn layout_includes_initial_regions() {
    let request = Request::get(format!("/api/dashboards/{}", launch_records::ID))
        .body(Body::empty())
        .expect("request");
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let layout: DashboardLayout =
        serde_json::from_slice(&body_bytes(response).await).expect("json");
    assert_eq!(layout.controls.len(), 2);
    assert_eq!(layout.outputs.len(), 2);
    assert_eq!(layout.initial.len(), 2);
}

#[tokio::test]
async fn slider_update_returns_only_the_scatter() {
    let request = update_request(
        launch_records::ID,
        serde_json::json!({
            "changed": launch_records::PAYLOAD,
            "controls": {
                (launch_records::SITE): "ALL",
                (launch_records::PAYLOAD): [0, 10000],
            }
        }),
    );
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let update: ViewUpdate = serde_json::from_slice(&body_bytes(response).await).expect("json");
    assert_eq!(update.regions.len(), 1);
    assert_eq!(update.regions[0].output.as_str(), launch_records::PAYLOAD_SCATTER);
    let RegionContent::Figure(figure) = &update.regions[0].content else {
        panic!("expected a figure");
    };
    // the 0 kg launch sits on the lower bound
    assert_eq!(figure.point_count(), 3);
}

#[tokio::test]
async fn report_change_toggles_year_control() {
    let request = update_request(
        automobile_sales::ID,
        serde_json::json!({
            "changed": automobile_sales::REPORT,
            "controls": {
                (automobile_sales::REPORT): automobile_sales::RECESSION,
                (automobile_sales::YEAR): null,
            }
        }),
    );
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let update: ViewUpdate = serde_json::from_slice(&body_bytes(response).await).expect("json");
    assert_eq!(update.regions[0].content, RegionContent::Disabled(true));
    assert!(matches!(
        update.regions[1].content,
        RegionContent::ChartGrid(_)
    ));
}

#[tokio::test]
async fn unknown_dashboard_is_not_found() {
    let request = Request::get("/api/dashboards/weather")
        .body(Body::empty())
        .expect("request");
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ApiError = serde_json::from_slice(&body_bytes(response).await).expect("json");
    assert_eq!(error.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn unknown_control_is_rejected() {
    let request = update_request(
        launch_records::ID,
        serde_json::json!({ "changed": "no-such-control", "controls": {} }),
    );
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_update_is_rejected() {
    let padding = "x".repeat(MAX_REQUEST_BYTES);
    let request = update_request(
        launch_records::ID,
        serde_json::json!({
            "changed": launch_records::SITE,
            "controls": { (launch_records::SITE): padding },
        }),
    );
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn pages_render_html() {
    let app = test_app();
    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let index = String::from_utf8(body_bytes(response).await).expect("utf8");
    assert!(index.contains("/dashboards/automobile-sales"));

    let request = Request::get("/dashboards/launch-records")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let page = String::from_utf8(body_bytes(response).await).expect("utf8");
    assert!(page.contains("SpaceX Launch Records Dashboard"));
}
