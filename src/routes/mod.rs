use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};
pub mod articles;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new<M: Into<String>>(message: M) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Liveness {
    pub service: String,
    pub version: String,
}

/// Liveness check. Never touches the store.
#[get("/")]
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(Liveness {
        service: env!("CARGO_PKG_NAME").to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}

/// Registers every route. Routes are matched in registration order.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness)
        .service(articles::create_article)
        .service(articles::list_articles_by_status)
        .service(articles::list_articles)
        .service(articles::get_article)
        .service(articles::update_article)
        .service(articles::patch_article_status)
        .service(articles::delete_article);
}
