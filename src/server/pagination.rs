use serde::Deserialize;

use super::deserializers::deserialize_lenient_page;
use super::error::ApiError;

pub const QUESTIONS_PER_PAGE: usize = 10;

/// `?page=` query parameter. Missing or non-numeric values mean page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "deserialize_lenient_page")]
    page: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> Result<usize, ApiError> {
        match self.page {
            None => Ok(1),
            Some(page) if page >= 1 => usize::try_from(page)
                .map_err(|_| ApiError::BadRequest(format!("Page {page} is out of range"))),
            Some(page) => Err(ApiError::BadRequest(format!(
                "Page must be a positive integer, got {page}"
            ))),
        }
    }
}

/// Items `[(page - 1) * size, page * size)` of `items`, empty when out of range.
pub fn paginate<T: Clone>(items: &[T], page: usize, size: usize) -> Vec<T> {
    let start = page.saturating_sub(1).saturating_mul(size);
    items.iter().skip(start).take(size).cloned().collect()
}

/// A page of a listing together with the size of the whole listing.
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T: Clone> Page<T> {
    pub fn of(items: &[T], query: &PageQuery) -> Result<Self, ApiError> {
        let page = query.page()?;
        Ok(Page {
            items: paginate(items, page, QUESTIONS_PER_PAGE),
            total: items.len(),
        })
    }

    /// Fails when the page holds nothing.
    pub fn non_empty(self) -> Result<Self, ApiError> {
        if self.items.is_empty() {
            return Err(ApiError::NotFound("Requested page is empty".to_owned()));
        }
        Ok(self)
    }

    /// Fails when the page lies past the end of a listing that has items.
    pub fn within_bounds(self) -> Result<Self, ApiError> {
        if self.items.is_empty() && self.total > 0 {
            return Err(ApiError::NotFound("Requested page is past the end".to_owned()));
        }
        Ok(self)
    }
}
