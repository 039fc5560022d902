//! Integration tests for greenbite-est HTTP endpoints

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use greenbite_common::config::{MatchingConfig, ScoringPolicy};
use greenbite_common::data::{recipe_table_from_reader, reference_table_from_reader};
use greenbite_est::{build_router, AppState, Pipeline};

const EMISSIONS_CSV: &str = "\
Food product,Land Use Change,Feed,Farm,Processing,Transport,Packaging,Retail,Total from Land to Retail,Total Global Average GHG Emissions per kg
Beef (beef herd),16.28,1.9,39.4,1.3,0.3,0.2,0.2,59.58,99.48
Beef (beef herd),1.0,1.0,1.0,1.0,1.0,1.0,1.0,7.0,7.0
Cheese,4.5,2.35,13.1,0.74,0.1,0.17,0.33,21.2,23.88
Rice,-0.02,0,3.55,0.07,0.09,0.1,0.06,3.85,4.45
Tomatoes,0.37,0,0.74,0.01,0.16,0.15,0.02,1.45,2.09
";

const RECIPES_CSV: &str = "\
title,NER
Cheeseburger,\"[\"\"hamburger\"\", \"\"cheese\"\"]\"
Chicken Biryani,\"[\"\"chicken\"\", \"\"rice\"\"]\"
Tomato Rice,\"[\"\"tomato\"\", \"\"rice\"\"]\"
";

fn pipeline(with_reference: bool, with_recipes: bool) -> Pipeline {
    let reference = with_reference
        .then(|| reference_table_from_reader(EMISSIONS_CSV.as_bytes()).unwrap())
        .map(Arc::new);
    let recipes = with_recipes
        .then(|| recipe_table_from_reader(RECIPES_CSV.as_bytes()).unwrap())
        .map(Arc::new);
    Pipeline::new(reference, recipes, MatchingConfig::default(), ScoringPolicy::Step)
}

fn create_test_app() -> axum::Router {
    build_router(AppState::new(pipeline(true, true)))
}

async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, uri, body.to_string()).await
}

async fn send(app: axum::Router, uri: &str, raw: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(raw))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = create_test_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "greenbite-est");
    assert_eq!(json["datasets"]["emissions_rows"], 5);
    assert_eq!(json["datasets"]["recipe_rows"], 3);
}

#[tokio::test]
async fn test_health_reports_degraded() {
    let app = build_router(AppState::new(pipeline(false, true)));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["datasets"]["emissions_rows"], Value::Null);
}

#[tokio::test]
async fn test_search_finds_misspelled_dish() {
    let (status, json) = post_json(create_test_app(), "/search", json!({"dish": "chiken biryani"})).await;

    assert_eq!(status, StatusCode::OK);
    let recipes = json["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0]["title"], "Chicken Biryani");
    assert_eq!(recipes[0]["ingredients"], json!(["chicken", "rice"]));
}

#[tokio::test]
async fn test_search_no_match_is_empty_list() {
    let (status, json) = post_json(create_test_app(), "/search", json!({"dish": "zzzz qqqq"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"recipes": []}));
}

#[tokio::test]
async fn test_search_missing_dish_is_400() {
    let (status, json) = post_json(create_test_app(), "/search", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
    assert_eq!(json["error"]["message"], "No dish name provided");

    let (status, _) = post_json(create_test_app(), "/search", json!({"dish": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let (status, json) = send(create_test_app(), "/search", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_search_without_recipes_is_500() {
    let app = build_router(AppState::new(pipeline(true, false)));
    let (status, json) = post_json(app, "/search", json!({"dish": "cheeseburger"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["code"], "REFERENCE_DATA_UNAVAILABLE");
}

#[tokio::test]
async fn test_emissions_scenario() {
    let (status, json) = post_json(
        create_test_app(),
        "/emissions",
        json!({"ingredients": ["hamburger", "cheese", "lettuce"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // First "Beef (beef herd)" row wins over the duplicate
    assert_eq!(json["breakdown"]["Total from Land to Retail"], 80.78);
    assert_eq!(json["breakdown"]["Farm"], 52.5);
    assert!(json["breakdown"].get("Total Global Average GHG Emissions per kg").is_none());
    assert_eq!(json["total_emissions"], 80.78);
    assert_eq!(json["sustainability_score"], 1.0);
    assert_eq!(json["emissions_equivalence"]["car_distance"], 363.5);
    assert_eq!(json["emissions_equivalence"]["smartphone_charges"], 9855);
    assert_eq!(json["emissions_equivalence"]["plastic_bags"], 1616);
    assert_eq!(json["emissions_equivalence"]["led_bulb_hours"], 808);

    let lettuce = &json["matches"]["lettuce"];
    assert_eq!(lettuce["matched_product"], Value::Null);
    assert_eq!(lettuce["method"]["kind"], "unmatched");
    assert_eq!(lettuce["categories"]["Total from Land to Retail"], 0.0);
    assert_eq!(json["matches"]["hamburger"]["matched_product"], "Beef (beef herd)");
}

#[tokio::test]
async fn test_emissions_low_impact_dish() {
    let (status, json) =
        post_json(create_test_app(), "/emissions", json!({"ingredients": ["tomato"]})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_emissions"], 1.45);
    assert_eq!(json["sustainability_score"], 4.5);
}

#[tokio::test]
async fn test_emissions_invalid_lists_are_400() {
    for body in [json!({"ingredients": []}), json!({"ingredients": "beef"}), json!({})] {
        let (status, json) = post_json(create_test_app(), "/emissions", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["message"], "No valid ingredients provided");
    }
}

#[tokio::test]
async fn test_emissions_without_reference_is_500() {
    let app = build_router(AppState::new(pipeline(false, true)));
    let (status, json) = post_json(app, "/emissions", json!({"ingredients": ["beef"]})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["code"], "REFERENCE_DATA_UNAVAILABLE");
}

#[tokio::test]
async fn test_cors_headers_present() {
    let response = create_test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
