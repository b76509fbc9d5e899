use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::{deserialize_default_from_null, deserialize_number_from_string};

use crate::{db::Question, server::app::AppState, telemetry::QUIZ_QUESTION_CNTR};

use super::{ApiResponse, Store};

/// `quiz_category.id` that draws from every category.
const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    previous_questions: Vec<i64>,
    quiz_category: QuizCategory,
}

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Serialize)]
struct QuizBody {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<Question>,
    #[serde(rename = "previousQuestion")]
    previous_questions: Vec<i64>,
}

async fn next_question(
    State(store): State<Store>,
    body: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResponse<QuizBody> {
    let Json(request) = body?;
    let category = match request.quiz_category.id {
        ALL_CATEGORIES => None,
        id => Some(store.get_category(id).await?.id),
    };

    let candidates = store
        .quiz_pool(category, &request.previous_questions)
        .await?;
    let question = candidates.choose(&mut rand::thread_rng()).cloned();

    match &question {
        Some(question) => {
            QUIZ_QUESTION_CNTR
                .with_label_values(&[question.category.to_string().as_str()])
                .inc();
        }
        None => tracing::info!(?category, "Quiz pool exhausted"),
    }

    Ok(Json(QuizBody {
        success: true,
        question,
        previous_questions: request.previous_questions,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizes", post(next_question))
        .with_state(state)
}
