use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn router() -> Router {
    let openapi = api_ingress::ApiIngress::default();
    care_guidance::api::rest::routes::register_routes(Router::new(), &openapi)
}

async fn send(req: Request<Body>) -> (StatusCode, Value) {
    let resp = router().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn resources_catalog_is_fixed() {
    let expected = json!({
        "articles": [
            { "id": 1, "title": "Heart Health Tips", "url": "https://example.com/heart-health" },
            { "id": 2, "title": "Preventing Diabetes", "url": "https://example.com/diabetes-prevention" }
        ],
        "videos": [
            { "id": 1, "title": "Healthy Living", "url": "https://youtube.com/examplevideo" }
        ],
        "infographics": []
    });

    for uri in ["/api/resources/", "/api/resources", "/api/resources/"] {
        let (status, body) = send(get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, expected);
    }
}

#[tokio::test]
async fn symptom_checker_flags_chest_pain() {
    let (status, body) = send(post_json(
        "/api/symptom-checker/",
        r#"{"symptoms": "Sudden CHEST pain and sweating"}"#,
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "potential_conditions": ["Heart Attack"],
            "confidence": [90],
            "next_steps": "Seek emergency care immediately."
        })
    );
}

#[tokio::test]
async fn symptom_checker_defaults_to_common_cold() {
    for raw in [
        r#"{"symptoms": "runny nose"}"#,
        r#"{}"#,
        r#"{"symptoms": 42}"#,
        r#"{"symptoms": null, "other": "chest pain"}"#,
    ] {
        let (status, body) = send(post_json("/api/symptom-checker", raw)).await;
        assert_eq!(status, StatusCode::OK, "{raw}");
        assert_eq!(body["potential_conditions"], json!(["Common Cold"]), "{raw}");
        assert_eq!(body["confidence"], json!([50]));
        assert_eq!(body["next_steps"], "Rest and stay hydrated.");
    }
}

#[tokio::test]
async fn non_object_bodies_are_422() {
    for uri in ["/api/symptom-checker/", "/api/lifestyle/log"] {
        for raw in [r#"["chest pain"]"#, r#""chest pain""#, "not json"] {
            let (status, body) = send(post_json(uri, raw)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri} {raw}");
            assert_eq!(body["status"], 422);
        }
    }
}

#[tokio::test]
async fn lifestyle_log_echoes_input() {
    let entry = json!({ "sleep_hours": 7.5, "diet": ["oats", "salad"], "stress": { "level": "low" } });
    let (status, body) = send(post_json("/api/lifestyle/log", &entry.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Lifestyle data logged", "data": entry }));

    let (status, body) = send(post_json("/api/lifestyle/log", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Lifestyle data logged", "data": {} }));
}

#[tokio::test]
async fn lifestyle_progress_needs_integer_user_id() {
    let (status, body) = send(get("/api/lifestyle/progress?user_id=3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "user_id": 3, "progress": "You have maintained a consistent activity level." })
    );

    for uri in ["/api/lifestyle/progress", "/api/lifestyle/progress?user_id=x"] {
        let (status, _) = send(get(uri)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
    }
}

#[tokio::test]
async fn prevention_plan_is_fixed_but_requires_user_id() {
    let (status, body) = send(get("/api/prevention/?user_id=11")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "recommendations": [
                "Increase fiber intake",
                "Schedule a colonoscopy screening",
                "Consider a cardiology consultation"
            ],
            "reminders": [ { "message": "Book your annual check-up", "date": "2025-03-15" } ]
        })
    );

    let (status, other) = send(get("/api/prevention?user_id=12")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(other, body);

    let (status, _) = send(get("/api/prevention/")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn openapi_document_lists_guidance_paths() {
    let ingress = api_ingress::ApiIngress::default();
    let _ = care_guidance::api::rest::routes::register_routes(Router::new(), &ingress);
    let doc = serde_json::to_value(ingress.openapi_document()).unwrap();
    for pointer in [
        "/paths/~1api~1resources~1/get",
        "/paths/~1api~1symptom-checker~1/post",
        "/paths/~1api~1lifestyle~1log/post",
        "/paths/~1api~1lifestyle~1progress/get",
        "/paths/~1api~1prevention~1/get",
    ] {
        assert!(doc.pointer(pointer).is_some(), "{pointer}");
    }
}
