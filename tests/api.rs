use std::collections::HashSet;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use trivia_api::db::queries::categories::create_category;
use trivia_api::db::queries::questions::create_question;
use trivia_api::db::{establish_in_memory, NewQuestion, SqliteStore};
use trivia_api::server::app::{build_router, AppState};

/// Two categories, Science (1) and Art (2); even-numbered questions are Science.
async fn app_with(questions: usize) -> Router {
    let pool = establish_in_memory().await.unwrap();
    let science = create_category(&pool, "Science").await.unwrap();
    let art = create_category(&pool, "Art").await.unwrap();
    for n in 0..questions {
        let (label, category) = if n % 2 == 0 {
            ("Science", science)
        } else {
            ("Art", art)
        };
        create_question(
            &pool,
            &NewQuestion {
                question: format!("{label} question {n}?"),
                answer: format!("Answer {n}"),
                category,
                difficulty: 1 + (n as i64 % 5),
            },
        )
        .await
        .unwrap();
    }
    build_router(AppState::new(SqliteStore::new(pool)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn ids(body: &Value) -> Vec<i64> {
    body["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn seeded_category_and_double_delete() {
    let pool = establish_in_memory().await.unwrap();
    let science = create_category(&pool, "Science").await.unwrap();
    create_question(
        &pool,
        &NewQuestion {
            question: "Q?".into(),
            answer: "A".into(),
            category: science,
            difficulty: 1,
        },
    )
    .await
    .unwrap();
    let app = build_router(AppState::new(SqliteStore::new(pool)));

    let (status, body) = send(&app, get("/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "categories": {"1": "Science"}}));

    let (status, body) = send(&app, delete("/questions/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, delete("/questions/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "error": 404, "message": "resource not found"})
    );
}

#[tokio::test]
async fn questions_are_paginated_by_ten() {
    let app = app_with(25).await;

    let (status, body) = send(&app, get("/questions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(ids(&body), (1..=10).collect::<Vec<_>>());
    assert_eq!(body["total_questions"], 25);
    assert_eq!(body["categories"], json!({"1": "Science", "2": "Art"}));

    let (_, body) = send(&app, get("/questions?page=3")).await;
    assert_eq!(ids(&body), (21..=25).collect::<Vec<_>>());
    assert_eq!(body["total_questions"], 25);

    let (status, body) = send(&app, get("/questions?page=4")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn page_parameter_edge_cases() {
    let app = app_with(12).await;

    let (status, body) = send(&app, get("/questions?page=abc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body).first(), Some(&1));

    let (status, body) = send(&app, get("/questions?page=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "bad request");
}

#[tokio::test]
async fn empty_store_lists_nothing() {
    let app = app_with(0).await;
    let (status, _) = send(&app, get("/questions")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_question_leaves_listing() {
    let app = app_with(3).await;
    let (status, body) = send(&app, delete("/questions/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "deleted": 2}));

    let (_, body) = send(&app, get("/questions")).await;
    assert_eq!(ids(&body), [1, 3]);
    assert_eq!(body["total_questions"], 2);

    let (status, _) = send(&app, delete("/questions/not-a-number")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_question_is_listed() {
    let app = app_with(2).await;
    let (status, body) = send(
        &app,
        post_json(
            "/questions",
            json!({
                "question": "What is the largest planet?",
                "answer": "Jupiter",
                "category": "1",
                "difficulty": 2
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let created = body["created"].as_i64().unwrap();
    assert!(created > 2);
    assert_eq!(body["total_questions"], 3);

    let (_, listing) = send(&app, get("/questions")).await;
    assert!(ids(&listing).contains(&created));
    let question = listing["questions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|q| q["id"] == created)
        .unwrap();
    assert_eq!(
        *question,
        json!({
            "id": created,
            "question": "What is the largest planet?",
            "answer": "Jupiter",
            "category": 1,
            "difficulty": 2
        })
    );
}

#[tokio::test]
async fn invalid_creations_are_refused() {
    let app = app_with(0).await;

    let (status, body) = send(
        &app,
        post_json("/questions", json!({"question": "No answer?", "category": 1, "difficulty": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], 422);

    let (status, _) = send(
        &app,
        post_json(
            "/questions",
            json!({"question": "Q?", "answer": "A", "category": 42, "difficulty": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        post_json(
            "/questions",
            json!({"question": "Q?", "answer": "A", "category": 1, "difficulty": 9}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/questions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"question\": "))
        .unwrap();
    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn search_matches_case_insensitively() {
    let app = app_with(25).await;

    let (status, body) = send(&app, post_json("/search", json!({"searchTerm": "SCIENCE"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], 13);
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 10);
    assert!(questions
        .iter()
        .all(|q| q["question"].as_str().unwrap().starts_with("Science")));

    let (_, body) = send(
        &app,
        post_json("/search?page=2", json!({"searchTerm": "science"})),
    )
    .await;
    assert_eq!(body["questions"].as_array().unwrap().len(), 3);

    let (status, body) = send(&app, post_json("/search", json!({"searchTerm": "nebula"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], 0);
    assert!(body["questions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn search_requires_a_term() {
    let app = app_with(3).await;
    for payload in [json!({}), json!({"searchTerm": ""}), json!({"searchTerm": "  "})] {
        let (status, body) = send(&app, post_json("/search", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], 400);
    }
}

#[tokio::test]
async fn questions_filtered_by_category() {
    let app = app_with(6).await;

    let (status, body) = send(&app, get("/categories/2/questions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), [2, 4, 6]);
    assert_eq!(body["total_questions"], 3);
    assert_eq!(body["current_category"], "Art");
    assert!(body["questions"]
        .as_array()
        .unwrap()
        .iter()
        .all(|q| q["category"] == 2));

    let (status, body) = send(&app, get("/categories/99/questions")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, get("/categories/2/questions?page=2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quiz_exhausts_category_without_repeats() {
    let app = app_with(9).await;
    let mut previous: Vec<i64> = Vec::new();

    loop {
        let (status, body) = send(
            &app,
            post_json(
                "/quizes",
                json!({
                    "previous_questions": previous,
                    "quiz_category": {"id": 1, "type": "Science"}
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["previousQuestion"], json!(previous));

        let Some(question) = body.get("question") else {
            break;
        };
        let id = question["id"].as_i64().unwrap();
        assert_eq!(question["category"], 1);
        assert!(!previous.contains(&id));
        previous.push(id);
    }

    let served: HashSet<i64> = previous.iter().copied().collect();
    assert_eq!(served, HashSet::from([1, 3, 5, 7, 9]));
}

#[tokio::test]
async fn quiz_over_all_categories_honours_exclusions() {
    let app = app_with(3).await;
    let (status, body) = send(
        &app,
        post_json(
            "/quizes",
            json!({"previous_questions": [1, 2], "quiz_category": {"id": "0", "type": "click"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"]["id"], 3);

    let (_, body) = send(
        &app,
        post_json(
            "/quizes",
            json!({"previous_questions": [1, 2, 3], "quiz_category": {"id": 0}}),
        ),
    )
    .await;
    assert_eq!(body, json!({"success": true, "previousQuestion": [1, 2, 3]}));
}

#[tokio::test]
async fn quiz_accepts_long_exclusion_lists() {
    let app = app_with(3).await;
    let mut previous: Vec<i64> = (1000..41_000).collect();
    previous.push(2);
    let (status, body) = send(
        &app,
        post_json(
            "/quizes",
            json!({"previous_questions": previous, "quiz_category": {"id": 0}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["question"]["id"].as_i64().unwrap();
    assert!(id == 1 || id == 3);

    previous.extend([1, 3]);
    let (status, body) = send(
        &app,
        post_json(
            "/quizes",
            json!({"previous_questions": previous, "quiz_category": {"id": 0}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("question").is_none());
}

#[tokio::test]
async fn quiz_rejects_bad_requests() {
    let app = app_with(3).await;

    let (status, _) = send(
        &app,
        post_json("/quizes", json!({"quiz_category": {"id": 77}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, post_json("/quizes", json!({"previous_questions": []}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "unprocessable");
}

#[tokio::test]
async fn unknown_routes_and_methods_answer_json() {
    let app = app_with(0).await;

    let (status, body) = send(&app, delete("/categories")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], 405);

    let (status, body) = send(&app, get("/books")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "resource not found");
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let app = app_with(0).await;
    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/questions")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(preflight).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("DELETE"));
    let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("content-type") && allowed.contains("authorization"));
}

#[tokio::test]
async fn metrics_are_exposed() {
    let app = app_with(1).await;
    send(
        &app,
        post_json("/quizes", json!({"quiz_category": {"id": 0}})),
    )
    .await;

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("quiz_questions_served_total"));
}
