mod article;
mod draft;
pub use article::{Article, ArticleFields, ArticleStatus, NewArticle, UnknownStatus};
pub use draft::{parse_payload, parse_single, parse_status_patch, ArticleDraft, Payload, StatusPatch};
