use crate::schema::articles;
use chrono::{Duration, NaiveDateTime};
use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;

#[derive(
    Serialize, Deserialize, AsExpression, FromSqlRow, Clone, Copy, Debug, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "lowercase")]
#[sql_type = "Text"]
pub enum ArticleStatus {
    Publish,
    Draft,
    Trash,
}

impl ArticleStatus {
    pub const NAMES: [&'static str; 3] = ["publish", "draft", "trash"];

    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Publish => "publish",
            ArticleStatus::Draft => "draft",
            ArticleStatus::Trash => "trash",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("unknown article status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ArticleStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" => Ok(ArticleStatus::Publish),
            "draft" => Ok(ArticleStatus::Draft),
            "trash" => Ok(ArticleStatus::Trash),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

impl ToSql<Text, Pg> for ArticleStatus {
    fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> serialize::Result {
        <str as ToSql<Text, Pg>>::to_sql(self.as_str(), out)
    }
}

impl FromSql<Text, Pg> for ArticleStatus {
    fn from_sql(bytes: Option<&[u8]>) -> deserialize::Result<Self> {
        let value = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        Ok(value.parse()?)
    }
}

#[derive(Serialize, Deserialize, Queryable, Clone, Debug, PartialEq)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub category: String,
    pub status: ArticleStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// The four client-editable fields of an article, already validated.
#[derive(Clone, Debug, PartialEq)]
pub struct ArticleFields {
    pub title: String,
    pub content: String,
    pub category: String,
    pub status: ArticleStatus,
}

#[derive(Insertable, Clone, Debug, PartialEq)]
#[table_name = "articles"]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub category: String,
    pub status: ArticleStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewArticle {
    pub fn new(fields: ArticleFields, now: NaiveDateTime) -> Self {
        Self {
            title: fields.title,
            content: fields.content,
            category: fields.category,
            status: fields.status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_article(self, id: i32) -> Article {
        Article {
            id,
            title: self.title,
            content: self.content,
            category: self.category,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Article {
    /// Replaces every editable field; `id` and `created_at` are kept.
    pub fn apply(&mut self, fields: ArticleFields) {
        self.title = fields.title;
        self.content = fields.content;
        self.category = fields.category;
        self.status = fields.status;
    }

    /// Moves `updated_at` forward to `now`, or one microsecond past its
    /// previous value when the clock has not advanced.
    pub fn touch(&mut self, now: NaiveDateTime) {
        let next = self.updated_at + Duration::microseconds(1);
        self.updated_at = if now > next { now } else { next };
    }
}
