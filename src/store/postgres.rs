use super::{ArticleFilter, ArticleStore, Page};
use crate::db::DbPool;
use crate::error::StoreError;
use crate::models::{Article, NewArticle};
use crate::schema::articles;
use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;

/// Articles kept in the `articles` table of a PostgreSQL database.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(filter: &ArticleFilter) -> articles::BoxedQuery<'static, Pg> {
    let mut query = articles::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(articles::status.eq(status));
    }
    query
}

pub(crate) fn insert_one(conn: &PgConnection, article: &NewArticle) -> QueryResult<i32> {
    diesel::insert_into(articles::table)
        .values(article)
        .returning(articles::id)
        .get_result(conn)
}

// PostgreSQL accepts at most 65535 bind parameters per statement and every
// inserted row binds one per column.
const BIND_PARAMETER_LIMIT: usize = 65_535;
const ARTICLE_COLUMNS: usize = 6;
pub(crate) const ROWS_PER_INSERT: usize = BIND_PARAMETER_LIMIT / ARTICLE_COLUMNS;

pub(crate) fn insert_many(conn: &PgConnection, new_articles: &[NewArticle]) -> QueryResult<usize> {
    conn.transaction(|| {
        let mut inserted = 0;
        for chunk in new_articles.chunks(ROWS_PER_INSERT) {
            inserted += diesel::insert_into(articles::table)
                .values(chunk)
                .execute(conn)?;
        }
        Ok(inserted)
    })
}

pub(crate) fn count(conn: &PgConnection, filter: &ArticleFilter) -> QueryResult<i64> {
    filtered(filter).count().get_result(conn)
}

pub(crate) fn find_page(
    conn: &PgConnection,
    filter: &ArticleFilter,
    page: Page,
) -> QueryResult<Vec<Article>> {
    let mut query = filtered(filter)
        .order(articles::id.asc())
        .offset(page.offset);
    if let Some(limit) = page.limit {
        query = query.limit(limit);
    }
    query.load::<Article>(conn)
}

pub(crate) fn find_by_id(conn: &PgConnection, id: i32) -> QueryResult<Option<Article>> {
    articles::table.find(id).first::<Article>(conn).optional()
}

pub(crate) fn save(conn: &PgConnection, article: &Article) -> QueryResult<usize> {
    diesel::update(articles::table.find(article.id))
        .set((
            articles::title.eq(&article.title),
            articles::content.eq(&article.content),
            articles::category.eq(&article.category),
            articles::status.eq(article.status),
            articles::updated_at.eq(article.updated_at),
        ))
        .execute(conn)
}

pub(crate) fn delete(conn: &PgConnection, id: i32) -> QueryResult<usize> {
    diesel::delete(articles::table.find(id)).execute(conn)
}

fn affected_one(rows: usize) -> Result<(), StoreError> {
    if rows == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

impl ArticleStore for PgStore {
    fn insert_one(&self, article: NewArticle) -> Result<i32, StoreError> {
        let conn = self.pool.get()?;
        Ok(insert_one(&conn, &article)?)
    }

    fn insert_many(&self, articles: Vec<NewArticle>) -> Result<usize, StoreError> {
        let conn = self.pool.get()?;
        Ok(insert_many(&conn, &articles)?)
    }

    fn count(&self, filter: &ArticleFilter) -> Result<i64, StoreError> {
        let conn = self.pool.get()?;
        Ok(count(&conn, filter)?)
    }

    fn find_page(&self, filter: &ArticleFilter, page: Page) -> Result<Vec<Article>, StoreError> {
        let conn = self.pool.get()?;
        Ok(find_page(&conn, filter, page)?)
    }

    fn find_by_id(&self, id: i32) -> Result<Option<Article>, StoreError> {
        let conn = self.pool.get()?;
        Ok(find_by_id(&conn, id)?)
    }

    fn save(&self, article: &mut Article) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        article.touch(Utc::now().naive_utc());
        affected_one(save(&conn, article)?)
    }

    fn delete(&self, article: &Article) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        affected_one(delete(&conn, article.id)?)
    }
}
