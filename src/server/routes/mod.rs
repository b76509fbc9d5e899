mod categories;
mod questions;
mod quizzes;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;

use crate::db::{Category, TriviaStore};

use super::error::ApiError;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

pub type ApiResponse<T> = Result<Json<T>, ApiError>;

pub type Store = Arc<dyn TriviaStore>;

/// `{id: type}` as clients expect it, ordered by id.
fn category_map(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}
