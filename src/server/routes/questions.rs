use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::{
    db::{queries::questions::DIFFICULTIES, NewQuestion, Question},
    server::{
        app::AppState,
        error::ApiError,
        pagination::{Page, PageQuery},
    },
};

use super::{category_map, ApiResponse, Store};

// select inputs post numbers as strings, both are accepted
#[derive(Deserialize)]
struct CreateQuestion {
    question: String,
    answer: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    category: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    difficulty: i64,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm", default)]
    search_term: Option<String>,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CreatedBody {
    success: bool,
    created: i64,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct DeletedBody {
    success: bool,
    deleted: i64,
}

impl TryFrom<CreateQuestion> for NewQuestion {
    type Error = ApiError;

    fn try_from(value: CreateQuestion) -> Result<Self, Self::Error> {
        let question = value.question.trim();
        let answer = value.answer.trim();
        if question.is_empty() || answer.is_empty() {
            return Err(ApiError::Unprocessable(
                "Question and answer must not be blank".to_owned(),
            ));
        }
        if !DIFFICULTIES.contains(&value.difficulty) {
            return Err(ApiError::Unprocessable(format!(
                "Difficulty {} is outside {DIFFICULTIES:?}",
                value.difficulty
            )));
        }
        Ok(NewQuestion {
            question: question.to_owned(),
            answer: answer.to_owned(),
            category: value.category,
            difficulty: value.difficulty,
        })
    }
}

async fn list_questions(
    State(store): State<Store>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<QuestionsPage> {
    let Query(query) = query?;
    let questions = store.list_questions().await?;
    let page = Page::of(&questions, &query)?.non_empty()?;
    let categories = store.list_categories().await?;

    Ok(Json(QuestionsPage {
        success: true,
        questions: page.items,
        total_questions: page.total,
        categories: category_map(categories),
    }))
}

async fn create_question(
    State(store): State<Store>,
    query: Result<Query<PageQuery>, QueryRejection>,
    body: Result<Json<CreateQuestion>, JsonRejection>,
) -> ApiResponse<CreatedBody> {
    let Query(query) = query?;
    let Json(body) = body?;
    let new = NewQuestion::try_from(body)?;
    let id = store.create_question(new).await?;
    tracing::info!(id, "Created question");

    let questions = store.list_questions().await?;
    let page = Page::of(&questions, &query)?;
    Ok(Json(CreatedBody {
        success: true,
        created: id,
        questions: page.items,
        total_questions: page.total,
    }))
}

async fn delete_question(
    State(store): State<Store>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResponse<DeletedBody> {
    let Path(id) = path?;
    store.delete_question(id).await?;
    tracing::info!(id, "Deleted question");
    Ok(Json(DeletedBody {
        success: true,
        deleted: id,
    }))
}

async fn search_questions(
    State(store): State<Store>,
    query: Result<Query<PageQuery>, QueryRejection>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> ApiResponse<SearchResults> {
    let Query(query) = query?;
    let Json(body) = body?;
    let term = body.search_term.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(ApiError::BadRequest("searchTerm is required".to_owned()));
    }

    let questions = store.search_questions(term).await?;
    let page = Page::of(&questions, &query)?.within_bounds()?;
    Ok(Json(SearchResults {
        success: true,
        questions: page.items,
        total_questions: page.total,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/search", post(search_questions))
        .with_state(state)
}
