//! Mapping of engine failures onto HTTP responses.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use seatline_core::engine::RegistrationError;
use seatline_sdk::objects::ErrorBody;
use std::time::Duration;

const INTERNAL_MESSAGE: &str = "internal server error, please try again later";

/// Errors returned by every API handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("request body too large")]
    PayloadTooLarge,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Registration(e) => match e {
                RegistrationError::InvalidInput(_)
                | RegistrationError::DuplicateRegistration
                | RegistrationError::EventAtCapacity
                | RegistrationError::AlreadyCancelled => StatusCode::BAD_REQUEST,
                RegistrationError::EventNotFound | RegistrationError::RegistrationNotFound => {
                    StatusCode::NOT_FOUND
                }
                RegistrationError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                RegistrationError::CancellationInconsistent { .. }
                | RegistrationError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Registration(e) => e.code(),
            ApiError::MalformedBody(_) => "InvalidInput",
            ApiError::PayloadTooLarge => "PayloadTooLarge",
        }
    }
}

/// Whole seconds, rounded up, never zero.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            error: self.code().to_string(),
            message,
        };

        let mut response = (status, Json(body)).into_response();
        if let ApiError::Registration(RegistrationError::RateLimited { retry_after, .. }) = &self {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(retry_after_secs(*retry_after)),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatline_core::engine::ValidationError;
    use seatline_core::rate_limit::RateLimitReason;
    use seatline_core::store::StoreError;

    #[test]
    fn client_errors_map_to_4xx() {
        let cases = [
            (
                RegistrationError::from(ValidationError::new("email", "is invalid")),
                StatusCode::BAD_REQUEST,
            ),
            (RegistrationError::DuplicateRegistration, StatusCode::BAD_REQUEST),
            (RegistrationError::EventAtCapacity, StatusCode::BAD_REQUEST),
            (RegistrationError::AlreadyCancelled, StatusCode::BAD_REQUEST),
            (RegistrationError::EventNotFound, StatusCode::NOT_FOUND),
            (RegistrationError::RegistrationNotFound, StatusCode::NOT_FOUND),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn store_errors_do_not_leak_details() {
        let error = ApiError::from(RegistrationError::StoreUnavailable(StoreError::Unavailable(
            "connection refused to 10.0.0.5".to_string(),
        )));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let error = ApiError::from(RegistrationError::RateLimited {
            reason: RateLimitReason::TooManyFromIp,
            retry_after: Duration::from_millis(1500),
        });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "2");
    }

    #[test]
    fn retry_after_is_at_least_one_second() {
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
        assert_eq!(retry_after_secs(Duration::from_secs(3600)), 3600);
    }
}
