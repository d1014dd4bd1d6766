mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use tower::ServiceExt;

use chartleague::models::SongPick;

use common::{Fixture, ADMIN_TOKEN};

async fn json_body(resp: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// An empty `body` sends no payload and no content type.
fn settle_request(chart_id: uuid::Uuid, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/api/admin/charts/{chart_id}/settle"));
    if !body.is_empty() {
        builder = builder.header("content-type", "application/json");
    }
    if let Some(token) = token {
        builder = builder.header("x-admin-secret", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Fixture with one closed Hot 100 round, its chart loaded and two slates.
async fn seeded() -> (Fixture, chartleague::models::ChartRound) {
    let fx = Fixture::new();
    let chart = common::hot_100();
    fx.store.insert_chart(chart.clone()).await;
    fx.source
        .insert(&chart.chart_key, common::round_date(), common::hot_100_feed("2024-05-04"));
    fx.store
        .submit_slate(common::slate(
            &chart,
            "alice",
            vec![SongPick::new("A", "X"), SongPick::new("B", "Y")],
        ))
        .await;
    fx.store
        .submit_slate(common::slate(
            &chart,
            "bob",
            vec![SongPick::new("Jack Harlow", "Lovin On Me")],
        ))
        .await;
    (fx, chart)
}

#[tokio::test]
async fn test_health_check() {
    let fx = Fixture::new();
    let resp = fx.router(Some(ADMIN_TOKEN)).oneshot(get("/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fx = Fixture::new();
    let resp = fx.router(Some(ADMIN_TOKEN)).oneshot(get("/metrics")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_list_and_get_charts() {
    let (fx, chart) = seeded().await;
    let app = fx.router(Some(ADMIN_TOKEN));

    let resp = app.clone().oneshot(get("/api/charts")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["kind"], "rank_feed");

    let resp = app
        .clone()
        .oneshot(get(&format!("/api/charts/{}", chart.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["data"]["round_date"], "2024-05-04");

    let resp = app
        .oneshot(get(&format!("/api/charts/{}", uuid::Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = json_body(resp).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_settle_requires_token() {
    let (fx, chart) = seeded().await;
    let app = fx.router(Some(ADMIN_TOKEN));

    let resp = app
        .clone()
        .oneshot(settle_request(chart.id, None, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .oneshot(settle_request(chart.id, Some("wrong"), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(fx.store.slate_count(chart.id).await, 2);
    assert_eq!(fx.store.result_count().await, 0);
}

#[tokio::test]
async fn test_settle_refused_when_no_token_configured() {
    let (fx, chart) = seeded().await;

    let resp = fx
        .router(None)
        .oneshot(settle_request(chart.id, Some(ADMIN_TOKEN), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(fx.store.slate_count(chart.id).await, 2);
}

#[tokio::test]
async fn test_settle_then_conflict() {
    let (fx, chart) = seeded().await;
    let app = fx.router(Some(ADMIN_TOKEN));

    let resp = app
        .clone()
        .oneshot(settle_request(chart.id, Some(ADMIN_TOKEN), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["leaderboard"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"]["leaderboard"][0]["username"], "alice");
    assert_eq!(fx.store.slate_count(chart.id).await, 0);

    let resp = app
        .oneshot(settle_request(
            chart.id,
            Some(ADMIN_TOKEN),
            r#"{"round_date":"2024-05-04"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let json = json_body(resp).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("already settled"));
}

#[tokio::test]
async fn test_settle_with_bearer_token() {
    let (fx, chart) = seeded().await;

    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/admin/charts/{}/settle", chart.id))
        .header("authorization", format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let resp = fx.router(Some(ADMIN_TOKEN)).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_settle_error_statuses() {
    let (fx, chart) = seeded().await;
    let app = fx.router(Some(ADMIN_TOKEN));

    let resp = app
        .clone()
        .oneshot(settle_request(
            chart.id,
            Some(ADMIN_TOKEN),
            r#"{"round_date":"2024-04-27"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .clone()
        .oneshot(settle_request(chart.id, Some(ADMIN_TOKEN), "{not json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .clone()
        .oneshot(settle_request(
            chart.id,
            Some(ADMIN_TOKEN),
            r#"{"round_date":"next week"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert!(json["error"].as_str().unwrap().starts_with("invalid body"));

    let resp = app
        .oneshot(settle_request(uuid::Uuid::new_v4(), Some(ADMIN_TOKEN), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert_eq!(fx.store.slate_count(chart.id).await, 2);
}

#[tokio::test]
async fn test_unpublished_chart_is_bad_gateway() {
    let fx = Fixture::new();
    let chart = common::hot_100();
    fx.store.insert_chart(chart.clone()).await;

    let resp = fx
        .router(Some(ADMIN_TOKEN))
        .oneshot(settle_request(chart.id, Some(ADMIN_TOKEN), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_results_endpoints() {
    let (fx, chart) = seeded().await;
    let app = fx.router(Some(ADMIN_TOKEN));

    let resp = app
        .clone()
        .oneshot(settle_request(chart.id, Some(ADMIN_TOKEN), ""))
        .await
        .unwrap();
    let settled = json_body(resp).await;
    let result_id = settled["data"]["id"].as_str().unwrap().to_string();

    let resp = app.clone().oneshot(get("/api/results")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["data"][0]["id"], result_id.as_str());
    assert_eq!(json["data"][0]["entries"], 2);

    let resp = app
        .clone()
        .oneshot(get(&format!("/api/results/{result_id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["data"]["chart_name"], "Billboard Hot 100");
    assert_eq!(json["data"]["leaderboard"].as_array().unwrap().len(), 2);

    let resp = app
        .clone()
        .oneshot(get(&format!("/api/results/{result_id}/entries/bob")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["data"]["username"], "bob");
    assert_eq!(json["data"]["breakdown"][0]["chart_rank"], 2);
    assert_eq!(json["data"]["breakdown"][0]["lead_single"], false);

    let resp = app
        .oneshot(get(&format!("/api/results/{result_id}/entries/mallory")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
