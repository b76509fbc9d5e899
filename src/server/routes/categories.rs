use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{
    db::Question,
    server::{
        app::AppState,
        pagination::{Page, PageQuery},
    },
};

use super::{category_map, ApiResponse, Store};

#[derive(Serialize)]
struct CategoriesBody {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestionsBody {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: String,
}

async fn get_categories(State(store): State<Store>) -> ApiResponse<CategoriesBody> {
    let categories = store.list_categories().await?;
    Ok(Json(CategoriesBody {
        success: true,
        categories: category_map(categories),
    }))
}

async fn questions_for_category(
    State(store): State<Store>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<CategoryQuestionsBody> {
    let Path(id) = path?;
    let Query(query) = query?;
    let category = store.get_category(id).await?;
    let questions = store.questions_for_category(category.id).await?;
    let page = Page::of(&questions, &query)?.within_bounds()?;

    Ok(Json(CategoryQuestionsBody {
        success: true,
        questions: page.items,
        total_questions: page.total,
        current_category: category.kind,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
        .with_state(state)
}
