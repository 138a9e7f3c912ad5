//! Rate lookup routes.
//!
//! Two path shapes are served:
//!
//! - `GET /<YYYY-MM-DD>`: every retained rate for the date, as `{code: rate}`
//! - `GET /<YYYY-MM-DD>/<CCY>`: one rate, as `{"currency": code, "rate": rate}`
//!
//! Currency codes are matched case-insensitively. Anything else is a 400.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use eurofx_common::{Currency, RateDate};
use rust_decimal::Decimal;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::state::AppState;

/// A request path that matched the route grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateQuery {
    /// All rates for a date.
    Day { date: RateDate },
    /// One currency's rate for a date.
    Single { date: RateDate, currency: Currency },
}

/// Per-request failures, answered with a bare status code.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    #[error("Path does not match /<date> or /<date>/<currency>")]
    BadRequest,

    #[error("No rate stored for the requested date or currency")]
    NotFound,

    #[error("Only GET is supported")]
    MethodNotAllowed,
}

impl QueryError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            QueryError::BadRequest => StatusCode::BAD_REQUEST,
            QueryError::NotFound => StatusCode::NOT_FOUND,
            QueryError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

/// Parse a request path into a query.
///
/// A single trailing slash is tolerated.
pub fn parse_path(path: &str) -> Result<RateQuery, QueryError> {
    let rest = path.strip_prefix('/').ok_or(QueryError::BadRequest)?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);

    let segments: Vec<&str> = rest.split('/').collect();
    match segments.as_slice() {
        [date] => Ok(RateQuery::Day {
            date: RateDate::parse(date).map_err(|_| QueryError::BadRequest)?,
        }),
        [date, currency] => Ok(RateQuery::Single {
            date: RateDate::parse(date).map_err(|_| QueryError::BadRequest)?,
            currency: Currency::parse(currency).map_err(|_| QueryError::BadRequest)?,
        }),
        _ => Err(QueryError::BadRequest),
    }
}

/// Build the HTTP application.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .fallback(serve_rates)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn serve_rates(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response, QueryError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(QueryError::MethodNotAllowed);
    }

    let query = match parse_path(uri.path()) {
        Ok(query) => query,
        Err(e) => {
            debug!(path = %uri.path(), "Rejected malformed path");
            return Err(e);
        }
    };

    match query {
        RateQuery::Day { date } => {
            let rates = state.store.lookup(&date).ok_or(QueryError::NotFound)?;
            let body: BTreeMap<&str, Decimal> = rates
                .iter()
                .map(|ex| (ex.currency.code(), ex.rate))
                .collect();
            Ok(Json(body).into_response())
        }
        RateQuery::Single { date, currency } => {
            let rate = state
                .store
                .lookup_one(&date, &currency)
                .ok_or(QueryError::NotFound)?;
            Ok(Json(rate).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> RateDate {
        RateDate::parse(s).unwrap()
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(
            parse_path("/2024-01-15"),
            Ok(RateQuery::Day {
                date: date("2024-01-15")
            })
        );
        assert_eq!(
            parse_path("/2024-01-15/"),
            Ok(RateQuery::Day {
                date: date("2024-01-15")
            })
        );
    }

    #[test]
    fn test_parse_single() {
        let expected = Ok(RateQuery::Single {
            date: date("2024-01-15"),
            currency: Currency::usd(),
        });

        assert_eq!(parse_path("/2024-01-15/USD"), expected);
        assert_eq!(parse_path("/2024-01-15/usd"), expected);
        assert_eq!(parse_path("/2024-01-15/USD/"), expected);
    }

    #[test]
    fn test_parse_malformed() {
        for path in [
            "",
            "/",
            "//",
            "2024-01-15",
            "/2024-1-15",
            "/not-a-date",
            "/2024-01-15/US",
            "/2024-01-15/USDX",
            "/2024-01-15/U5D",
            "/2024-01-15//",
            "/2024-01-15/USD/extra",
            "/USD/2024-01-15",
        ] {
            assert_eq!(parse_path(path), Err(QueryError::BadRequest), "{path:?}");
        }
    }

    #[test]
    fn test_error_status() {
        assert_eq!(QueryError::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(QueryError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            QueryError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
