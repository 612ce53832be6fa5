//! Numeric path segment extractors.
//!
//! By default a segment that does not parse as an integer (for example one
//! that overflows) is read as 0. With `strict_path_params` enabled in the
//! app's `Config` it is rejected with 400 instead.

use crate::config::Config;
use crate::error::ApiError;
use crate::store::Page;
use actix_web::{dev, web::Data, Error, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use std::str::FromStr;

fn is_strict(req: &HttpRequest) -> bool {
    req.app_data::<Data<Config>>()
        .map_or(false, |config| config.strict_path_params)
}

fn segment<T>(req: &HttpRequest, name: &'static str) -> Result<T, ApiError>
where
    T: FromStr + Default,
{
    let raw = req.match_info().get(name).unwrap_or_default();
    match raw.parse() {
        Ok(value) => Ok(value),
        Err(_) if is_strict(req) => Err(ApiError::InvalidPathParameter {
            name,
            value: raw.to_owned(),
        }),
        Err(_) => {
            log::debug!("path segment {}={:?} read as default", name, raw);
            Ok(T::default())
        }
    }
}

/// The `{id}` segment of an article route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArticleId(pub i32);

impl FromRequest for ArticleId {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;
    type Config = ();

    fn from_request(req: &HttpRequest, _payload: &mut dev::Payload) -> Self::Future {
        ready(segment(req, "id").map(ArticleId).map_err(Error::from))
    }
}

/// The `{limit}/{offset}` segments of a listing route, plus its `{status}`
/// segment when the route has one.
#[derive(Clone, Debug, PartialEq)]
pub struct Paging {
    pub page: Page,
    pub status: Option<String>,
}

impl FromRequest for Paging {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;
    type Config = ();

    fn from_request(req: &HttpRequest, _payload: &mut dev::Payload) -> Self::Future {
        let paging = || -> Result<Paging, ApiError> {
            let limit = segment::<i64>(req, "limit")?;
            let offset = segment::<i64>(req, "offset")?;
            Ok(Paging {
                page: Page::new(limit, offset),
                status: req.match_info().get("status").map(str::to_owned),
            })
        };
        ready(paging().map_err(Error::from))
    }
}
