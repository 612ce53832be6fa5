use super::{ArticleFilter, ArticleStore, Page};
use crate::error::StoreError;
use crate::models::{Article, NewArticle};
use chrono::Utc;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Rows {
    last_id: i32,
    articles: BTreeMap<i32, Article>,
}

impl Rows {
    fn insert(&mut self, article: NewArticle) -> i32 {
        self.last_id += 1;
        let id = self.last_id;
        self.articles.insert(id, article.into_article(id));
        id
    }
}

/// In-process store with sequential ids, used when no database is
/// configured and as the stand-in collaborator in tests.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Rows>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<MutexGuard<'_, Rows>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_owned()))
    }
}

impl ArticleStore for MemoryStore {
    fn insert_one(&self, article: NewArticle) -> Result<i32, StoreError> {
        Ok(self.rows()?.insert(article))
    }

    fn insert_many(&self, articles: Vec<NewArticle>) -> Result<usize, StoreError> {
        let mut rows = self.rows()?;
        let count = articles.len();
        for article in articles {
            rows.insert(article);
        }
        Ok(count)
    }

    fn count(&self, filter: &ArticleFilter) -> Result<i64, StoreError> {
        let rows = self.rows()?;
        let count = rows.articles.values().filter(|a| filter.matches(a)).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    fn find_page(&self, filter: &ArticleFilter, page: Page) -> Result<Vec<Article>, StoreError> {
        let rows = self.rows()?;
        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let limit = page
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(rows
            .articles
            .values()
            .filter(|a| filter.matches(a))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: i32) -> Result<Option<Article>, StoreError> {
        Ok(self.rows()?.articles.get(&id).cloned())
    }

    fn save(&self, article: &mut Article) -> Result<(), StoreError> {
        let mut rows = self.rows()?;
        let stored = rows
            .articles
            .get_mut(&article.id)
            .ok_or(StoreError::NotFound)?;
        article.touch(Utc::now().naive_utc());
        *stored = article.clone();
        Ok(())
    }

    fn delete(&self, article: &Article) -> Result<(), StoreError> {
        self.rows()?
            .articles
            .remove(&article.id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleFields, ArticleStatus};

    fn new_article(status: ArticleStatus) -> NewArticle {
        let fields = ArticleFields {
            title: "A".repeat(20),
            content: "B".repeat(200),
            category: "tech".to_owned(),
            status,
        };
        NewArticle::new(fields, Utc::now().naive_utc())
    }

    #[test]
    fn test_ids_are_sequential_and_not_reused() {
        let store = MemoryStore::new();
        let first = store.insert_one(new_article(ArticleStatus::Draft)).unwrap();
        let second = store.insert_one(new_article(ArticleStatus::Draft)).unwrap();
        assert_eq!((first, second), (1, 2));

        let article = store.find_by_id(second).unwrap().unwrap();
        store.delete(&article).unwrap();
        let third = store.insert_one(new_article(ArticleStatus::Draft)).unwrap();
        assert_eq!(third, 3);
    }

    #[test]
    fn test_pages_are_disjoint_and_ordered() {
        let store = MemoryStore::new();
        let articles = (0..5).map(|_| new_article(ArticleStatus::Publish)).collect();
        assert_eq!(store.insert_many(articles).unwrap(), 5);

        let filter = ArticleFilter::all();
        let first = store.find_page(&filter, Page::new(2, 0)).unwrap();
        let second = store.find_page(&filter, Page::new(2, 2)).unwrap();
        let ids: Vec<i32> = first.iter().chain(second.iter()).map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(store.count(&filter).unwrap(), 5);
        assert_eq!(store.find_page(&filter, Page::new(0, 3)).unwrap().len(), 2);
    }

    #[test]
    fn test_status_filter() {
        let store = MemoryStore::new();
        store.insert_one(new_article(ArticleStatus::Draft)).unwrap();
        store.insert_one(new_article(ArticleStatus::Trash)).unwrap();
        store.insert_one(new_article(ArticleStatus::Draft)).unwrap();

        let filter = ArticleFilter::status(ArticleStatus::Draft);
        assert_eq!(store.count(&filter).unwrap(), 2);
        let page = store.find_page(&filter, Page::new(10, 1)).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 3);
    }

    #[test]
    fn test_save_refreshes_updated_at() {
        let store = MemoryStore::new();
        let id = store.insert_one(new_article(ArticleStatus::Draft)).unwrap();
        let mut article = store.find_by_id(id).unwrap().unwrap();
        let before = article.updated_at;
        article.status = ArticleStatus::Publish;
        store.save(&mut article).unwrap();

        let stored = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(stored.status, ArticleStatus::Publish);
        assert!(stored.updated_at > before);
        assert_eq!(stored.created_at, article.created_at);
    }

    #[test]
    fn test_missing_rows() {
        let store = MemoryStore::new();
        let id = store.insert_one(new_article(ArticleStatus::Draft)).unwrap();
        let mut article = store.find_by_id(id).unwrap().unwrap();
        store.delete(&article).unwrap();

        assert!(store.find_by_id(id).unwrap().is_none());
        assert!(matches!(store.save(&mut article), Err(StoreError::NotFound)));
        assert!(matches!(store.delete(&article), Err(StoreError::NotFound)));
    }
}
