//! HTTP surface: every path goes through one fallback handler that hands the
//! request to the [`Service`], which resolves the route itself.

use super::telemetry::{increment_request_errors, increment_requests, record_request_duration};
use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use remotecmd::{Error, Request, Service, Verb};
use std::collections::BTreeMap;
use tokio::time::Instant;
use tower_http::trace::TraceLayer;

pub fn router(service: Service) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(service)
        .layer(TraceLayer::new_for_http())
}

async fn dispatch(
    State(service): State<Service>,
    method: Method,
    uri: Uri,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<String, HttpError> {
    increment_requests();
    let start = Instant::now();

    let request = Request {
        verb: Verb::parse(method.as_str()),
        params,
    };
    let result = service.handle(uri.path(), request).await;

    record_request_duration(start.elapsed().as_secs_f64() * 1000.0);
    result.map_err(HttpError::from)
}

/// Maps a service [`Error`] onto an HTTP response.
#[derive(Debug)]
pub struct HttpError(pub Error);

impl From<Error> for HttpError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self.0 {
            Error::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Error::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Error::UnknownOperation { .. } => StatusCode::NOT_FOUND,
            Error::ServiceShutdown => StatusCode::SERVICE_UNAVAILABLE,
            Error::Handler { .. }
            | Error::AuthorityUnavailable
            | Error::DuplicateOperation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        increment_request_errors(status.as_u16());

        if self.0.is_client_error() {
            tracing::debug!(%status, "Rejected request: {}", self.0);
        } else {
            tracing::error!(%status, "Request failed: {}", self.0);
        }

        let mut response = (status, format!("{}\n", self.0)).into_response();
        if status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET"));
        }
        response
    }
}
