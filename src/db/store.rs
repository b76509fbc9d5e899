use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::SqlitePool;

use super::queries::{categories, questions};
use super::{Category, NewQuestion, Question};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    #[error("rejected by store: {0}")]
    Rejected(sqlx::Error),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        let rejected = match &error {
            sqlx::Error::Database(e) => !matches!(e.kind(), ErrorKind::Other),
            _ => false,
        };
        if rejected {
            StoreError::Rejected(error)
        } else {
            StoreError::Database(error)
        }
    }
}

/// Data access operations the request handlers depend on.
#[async_trait]
pub trait TriviaStore: Send + Sync + 'static {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn get_category(&self, id: i64) -> Result<Category, StoreError>;

    async fn list_questions(&self) -> Result<Vec<Question>, StoreError>;

    /// Case-insensitive substring match over question text.
    async fn search_questions(&self, term: &str) -> Result<Vec<Question>, StoreError>;

    async fn questions_for_category(&self, category: i64) -> Result<Vec<Question>, StoreError>;

    async fn create_question(&self, new: NewQuestion) -> Result<i64, StoreError>;

    async fn delete_question(&self, id: i64) -> Result<(), StoreError>;

    /// Questions of `category` (all categories for `None`) whose id is not in `exclude`.
    async fn quiz_pool(
        &self,
        category: Option<i64>,
        exclude: &[i64],
    ) -> Result<Vec<Question>, StoreError>;
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TriviaStore for SqliteStore {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(categories::get_all_categories(&self.pool).await?)
    }

    async fn get_category(&self, id: i64) -> Result<Category, StoreError> {
        categories::get_category(&self.pool, id)
            .await?
            .ok_or(StoreError::NotFound {
                resource: "category",
                id,
            })
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StoreError> {
        Ok(questions::get_all_questions(&self.pool).await?)
    }

    async fn search_questions(&self, term: &str) -> Result<Vec<Question>, StoreError> {
        Ok(questions::search_questions(&self.pool, term).await?)
    }

    async fn questions_for_category(&self, category: i64) -> Result<Vec<Question>, StoreError> {
        Ok(questions::get_questions_for_category(&self.pool, category).await?)
    }

    async fn create_question(&self, new: NewQuestion) -> Result<i64, StoreError> {
        Ok(questions::create_question(&self.pool, &new).await?)
    }

    async fn delete_question(&self, id: i64) -> Result<(), StoreError> {
        match questions::delete_question(&self.pool, id).await? {
            0 => Err(StoreError::NotFound {
                resource: "question",
                id,
            }),
            _ => Ok(()),
        }
    }

    async fn quiz_pool(
        &self,
        category: Option<i64>,
        exclude: &[i64],
    ) -> Result<Vec<Question>, StoreError> {
        Ok(questions::get_quiz_candidates(&self.pool, category, exclude).await?)
    }
}
