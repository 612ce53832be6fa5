use super::{MessageResponse, PageResponse};
use crate::error::{ApiError, StoreError};
use crate::extractors::{ArticleId, Paging};
use crate::models::{
    parse_payload, parse_single, parse_status_patch, Article, ArticleStatus, NewArticle, Payload,
};
use crate::store::{ArticleFilter, Page, SharedStore};
use actix_web::error::BlockingError;
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use chrono::Utc;
use log::{debug, info};

/// Runs a store call on the blocking pool, mapping failures to a 500 with
/// `context` as the client-facing message.
async fn run_blocking<F, T>(context: &'static str, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f).await.map_err(|e| match e {
        BlockingError::Error(source) => ApiError::storage(context, source),
        BlockingError::Canceled => ApiError::storage(context, StoreError::Canceled),
    })
}

async fn find_article(store: SharedStore, id: i32) -> Result<Article, ApiError> {
    run_blocking("Failed to fetch article", move || store.find_by_id(id))
        .await?
        .ok_or(ApiError::NotFound)
}

async fn list_page(
    store: SharedStore,
    filter: ArticleFilter,
    page: Page,
) -> Result<HttpResponse, ApiError> {
    let (count_context, fetch_context) = match filter.status {
        Some(_) => (
            "Failed to count articles by status",
            "Failed to fetch articles by status",
        ),
        None => ("Failed to count articles", "Failed to fetch articles"),
    };
    let counter = store.clone();
    let total = run_blocking(count_context, move || counter.count(&filter)).await?;
    let data = run_blocking(fetch_context, move || store.find_page(&filter, page)).await?;
    Ok(HttpResponse::Ok().json(PageResponse { data, total }))
}

#[post("/article")]
pub async fn create_article(
    store: web::Data<SharedStore>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let store = store.get_ref().clone();
    let now = Utc::now().naive_utc();
    match parse_payload(&body)? {
        Payload::Single(draft) => {
            let article = NewArticle::new(draft.validate()?, now);
            let id =
                run_blocking("Failed to save article", move || store.insert_one(article)).await?;
            info!("created article {}", id);
            Ok(HttpResponse::Created().json(MessageResponse::new("Article created successfully")))
        }
        Payload::Batch(drafts) => {
            if drafts.is_empty() {
                return Err(ApiError::EmptyBatch);
            }
            // the first invalid draft rejects the whole batch before any write
            let articles = drafts
                .into_iter()
                .enumerate()
                .map(|(index, draft)| {
                    draft
                        .validate()
                        .map(|fields| NewArticle::new(fields, now))
                        .map_err(|report| report.at_index(index))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let count =
                run_blocking("Failed to save article", move || store.insert_many(articles))
                    .await?;
            info!("created {} articles", count);
            Ok(HttpResponse::Created().json(MessageResponse::new(format!(
                "{} articles created successfully",
                count
            ))))
        }
    }
}

#[get("/article/{limit:[0-9]+}/{offset:[0-9]+}")]
pub async fn list_articles(
    store: web::Data<SharedStore>,
    paging: Paging,
) -> Result<HttpResponse, ApiError> {
    list_page(store.get_ref().clone(), ArticleFilter::all(), paging.page).await
}

#[get("/article/status/{status}/{limit:[0-9]+}/{offset:[0-9]+}")]
pub async fn list_articles_by_status(
    store: web::Data<SharedStore>,
    paging: Paging,
) -> Result<HttpResponse, ApiError> {
    let status = match paging.status.as_deref().unwrap_or_default().parse::<ArticleStatus>() {
        Ok(status) => status,
        Err(e) => {
            debug!("{}, no article can match", e);
            return Ok(HttpResponse::Ok().json(PageResponse::<Article> {
                data: Vec::new(),
                total: 0,
            }));
        }
    };
    list_page(
        store.get_ref().clone(),
        ArticleFilter::status(status),
        paging.page,
    )
    .await
}

#[get("/article/{id:[0-9]+}")]
pub async fn get_article(
    store: web::Data<SharedStore>,
    ArticleId(id): ArticleId,
) -> Result<HttpResponse, ApiError> {
    let article = find_article(store.get_ref().clone(), id).await?;
    Ok(HttpResponse::Ok().json(article))
}

#[put("/article/{id:[0-9]+}")]
pub async fn update_article(
    store: web::Data<SharedStore>,
    ArticleId(id): ArticleId,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let store = store.get_ref().clone();
    let mut article = find_article(store.clone(), id).await?;
    let fields = parse_single(&body)?.validate()?;
    article.apply(fields);
    run_blocking("Failed to update article", move || store.save(&mut article)).await?;
    info!("updated article {}", id);
    Ok(HttpResponse::Ok().json(MessageResponse::new("Article updated successfully")))
}

#[patch("/article/{id:[0-9]+}/status")]
pub async fn patch_article_status(
    store: web::Data<SharedStore>,
    ArticleId(id): ArticleId,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let store = store.get_ref().clone();
    let mut article = find_article(store.clone(), id).await?;
    article.status = parse_status_patch(&body)?.validate()?;
    run_blocking("Failed to update article status", move || {
        store.save(&mut article)
    })
    .await?;
    info!("updated status of article {}", id);
    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "Article status updated successfully",
    )))
}

#[delete("/article/{id:[0-9]+}")]
pub async fn delete_article(
    store: web::Data<SharedStore>,
    ArticleId(id): ArticleId,
) -> Result<HttpResponse, ApiError> {
    let store = store.get_ref().clone();
    let article = find_article(store.clone(), id).await?;
    run_blocking("Failed to delete article", move || store.delete(&article)).await?;
    info!("deleted article {}", id);
    Ok(HttpResponse::Ok().json(MessageResponse::new("Article deleted successfully")))
}
