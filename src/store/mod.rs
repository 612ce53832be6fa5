//! Storage collaborators for articles.

mod memory;
mod postgres;
pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::StoreError;
use crate::models::{Article, ArticleStatus, NewArticle};
use std::sync::Arc;

pub type SharedStore = Arc<dyn ArticleStore>;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArticleFilter {
    pub status: Option<ArticleStatus>,
}

impl ArticleFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn status(status: ArticleStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        self.status.map_or(true, |status| article.status == status)
    }
}

/// A window over the id-ordered rows. `limit: None` returns everything
/// after `offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: i64,
}

impl Page {
    /// A requested limit of 0 means no limit.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: if limit > 0 { Some(limit) } else { None },
            offset: offset.max(0),
        }
    }
}

pub trait ArticleStore: Send + Sync {
    fn insert_one(&self, article: NewArticle) -> Result<i32, StoreError>;

    /// Inserts every article or none of them.
    fn insert_many(&self, articles: Vec<NewArticle>) -> Result<usize, StoreError>;

    fn count(&self, filter: &ArticleFilter) -> Result<i64, StoreError>;

    fn find_page(&self, filter: &ArticleFilter, page: Page) -> Result<Vec<Article>, StoreError>;

    fn find_by_id(&self, id: i32) -> Result<Option<Article>, StoreError>;

    /// Persists the editable fields and refreshes `updated_at` on `article`.
    fn save(&self, article: &mut Article) -> Result<(), StoreError>;

    fn delete(&self, article: &Article) -> Result<(), StoreError>;
}
