//! Rejection taxonomy for the public HTTP surface.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use types::ErrorBody;

/// Coarse class of a rejection, used for logging and status mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionKind {
    MalformedRequest,
    AuthenticationFailure,
    SessionInvalid,
    AntiCheat,
    RateLimited,
    Internal,
}

impl RejectionKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::MalformedRequest | Self::SessionInvalid => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailure | Self::AntiCheat => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedRequest => "malformed_request",
            Self::AuthenticationFailure => "authentication_failure",
            Self::SessionInvalid => "session_invalid",
            Self::AntiCheat => "anti_cheat",
            Self::RateLimited => "rate_limited",
            Self::Internal => "internal",
        }
    }
}

/// Terminal outcome of a request that did not succeed.
///
/// The `Display` text is exactly what the client receives in `{"error": ...}`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("Missing signature data.")]
    MissingSignatureData,

    #[error("Replay detected.")]
    Replay,

    #[error("Invalid message format.")]
    InvalidMessageFormat,

    #[error("Signature expired.")]
    SignatureExpired,

    #[error("Invalid signature.")]
    InvalidSignature,

    #[error("Invalid hits count.")]
    InvalidHitsCount,

    #[error("Hits must be positive.")]
    NonPositiveHits,

    #[error("Invalid player address.")]
    InvalidPlayerAddress,

    #[error("Invalid session.")]
    InvalidSession,

    #[error("Anticheat radar triggered! Too many hits for the time.")]
    AntiCheat,

    #[error("Invalid request body.")]
    InvalidBody,

    #[error("Too many requests to leaderboard. Please try again later.")]
    RateLimited,

    #[error("Internal server error.")]
    Internal,
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::MissingSignatureData
            | Self::InvalidMessageFormat
            | Self::InvalidHitsCount
            | Self::NonPositiveHits
            | Self::InvalidPlayerAddress
            | Self::InvalidBody => RejectionKind::MalformedRequest,
            Self::Replay | Self::SignatureExpired | Self::InvalidSignature => {
                RejectionKind::AuthenticationFailure
            }
            Self::InvalidSession => RejectionKind::SessionInvalid,
            Self::AntiCheat => RejectionKind::AntiCheat,
            Self::RateLimited => RejectionKind::RateLimited,
            Self::Internal => RejectionKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind().status()
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for Rejection {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
        Rejection::InvalidBody
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_kind() {
        assert_eq!(Rejection::MissingSignatureData.status(), StatusCode::BAD_REQUEST);
        assert_eq!(Rejection::Replay.status(), StatusCode::FORBIDDEN);
        assert_eq!(Rejection::SignatureExpired.status(), StatusCode::FORBIDDEN);
        assert_eq!(Rejection::InvalidSession.status(), StatusCode::BAD_REQUEST);
        assert_eq!(Rejection::AntiCheat.status(), StatusCode::FORBIDDEN);
        assert_eq!(Rejection::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(Rejection::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn messages_are_client_facing() {
        assert_eq!(Rejection::Replay.to_string(), "Replay detected.");
        assert_eq!(
            Rejection::AntiCheat.to_string(),
            "Anticheat radar triggered! Too many hits for the time."
        );
        assert_eq!(Rejection::InvalidSession.kind(), RejectionKind::SessionInvalid);
    }
}
