mod path;
pub use path::{ArticleId, Paging};
