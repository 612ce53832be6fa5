//! Request bodies before validation.

use crate::error::ApiError;
use crate::models::{ArticleFields, ArticleStatus};
use crate::validation::{self, FieldSource, ValidationReport, ARTICLE_SCHEMA, STATUS_SCHEMA};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Article-shaped request body. Missing or `null` fields stay `None` so
/// they are reported as "required" by the validator instead of failing
/// deserialization.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ArticleDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct StatusPatch {
    pub status: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum Payload {
    Single(ArticleDraft),
    Batch(Vec<ArticleDraft>),
}

impl FieldSource for ArticleDraft {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => self.title.as_deref(),
            "content" => self.content.as_deref(),
            "category" => self.category.as_deref(),
            "status" => self.status.as_deref(),
            _ => None,
        }
    }
}

impl FieldSource for StatusPatch {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "status" => self.status.as_deref(),
            _ => None,
        }
    }
}

impl ArticleDraft {
    pub fn validate(self) -> Result<ArticleFields, ValidationReport> {
        validation::validate(&self, ARTICLE_SCHEMA)?;
        let status = validation::parse_status(self.status.as_deref())?;
        Ok(ArticleFields {
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            status,
        })
    }
}

impl StatusPatch {
    pub fn validate(self) -> Result<ArticleStatus, ValidationReport> {
        validation::validate(&self, STATUS_SCHEMA)?;
        validation::parse_status(self.status.as_deref())
    }
}

fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or_else(|| bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

fn non_empty(bytes: &[u8]) -> Result<&[u8], ApiError> {
    let body = trim(bytes);
    if body.is_empty() {
        return Err(ApiError::EmptyBody);
    }
    Ok(body)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(ApiError::MalformedPayload)
}

// Derived struct deserializers also accept arrays positionally; request
// bodies must be objects.
fn from_object<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    match value {
        Value::Object(_) => serde_json::from_value(value).map_err(ApiError::MalformedPayload),
        other => Err(ApiError::MalformedPayload(serde_json::Error::custom(
            format!("expected a JSON object, found {}", other),
        ))),
    }
}

/// Decides between a single article and a batch by the first
/// non-whitespace byte, then deserializes accordingly.
pub fn parse_payload(bytes: &[u8]) -> Result<Payload, ApiError> {
    let body = non_empty(bytes)?;
    if body.starts_with(b"[") {
        decode::<Vec<Value>>(body)?
            .into_iter()
            .map(from_object)
            .collect::<Result<Vec<_>, _>>()
            .map(Payload::Batch)
    } else {
        from_object(decode(body)?).map(Payload::Single)
    }
}

pub fn parse_single(bytes: &[u8]) -> Result<ArticleDraft, ApiError> {
    from_object(decode(non_empty(bytes)?)?)
}

pub fn parse_status_patch(bytes: &[u8]) -> Result<StatusPatch, ApiError> {
    from_object(decode(non_empty(bytes)?)?)
}
