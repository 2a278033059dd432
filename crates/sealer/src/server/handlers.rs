//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    ErrorResponse, HealthResponse, OpenRequest, OpenResponse, SealRequest, SealResponse,
};
use common::ServiceError;
use tracing::warn;

use super::state::AppState;

/// `POST /seal` — seal an envelope into an opaque header.
///
/// The body carries the envelope in its transport shape (`dek`/`iv` as
/// base64 strings). On success the response holds the sealed header, the
/// only artefact the caller needs to persist.
pub async fn seal(State(state): State<AppState>, Json(req): Json<SealRequest>) -> Response {
    let envelope = match req.into_envelope() {
        Ok(envelope) => envelope,
        Err(e) => return error_response(e),
    };

    match state.cipher.seal(&envelope).await {
        Ok(header) => (StatusCode::OK, Json(SealResponse { header })).into_response(),
        Err(e) => {
            warn!(code = e.code(), "seal failed");
            error_response(e)
        }
    }
}

/// `POST /open` — recover the key material from a sealed header.
///
/// The caller identity is read from the configured request header (set by
/// the upstream authentication layer) and checked against the envelope's
/// authorized-user list before anything is released.
pub async fn open(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<OpenRequest>,
) -> Response {
    let caller = match headers.get(state.caller_header_name.as_str()) {
        Some(v) => match v.to_str() {
            Ok(s) => s.to_owned(),
            Err(_) => {
                return error_response(ServiceError::Validation(format!(
                    "{} header contains non-ASCII characters",
                    state.caller_header_name
                )));
            }
        },
        None => {
            return error_response(ServiceError::Validation(format!(
                "missing {} header",
                state.caller_header_name
            )));
        }
    };

    match state.cipher.open(&req.header, &caller).await {
        Ok(dek) => (StatusCode::OK, Json(OpenResponse::from(dek))).into_response(),
        Err(e) => {
            warn!(code = e.code(), "open failed");
            error_response(e)
        }
    }
}

/// `GET /health` — liveness check.
///
/// The service is stateless, so readiness reduces to the process being up;
/// the body names the active KMS backend.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        kms_backend: state.kms_backend.as_ref().clone(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

/// Map a [`ServiceError`] onto its HTTP status and JSON error body.
///
/// The body carries only the classified code and the error's own display
/// text — KMS detail never reaches the caller.
fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::new(err.code(), err.to_string());
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::router;
    use super::super::state::test_state;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use common::protocol::{ErrorResponse, HealthResponse, OpenResponse, SealResponse};
    use serde_json::json;

    const CALLER_HEADER: HeaderName = HeaderName::from_static("x-caller-identity");

    fn test_server() -> TestServer {
        TestServer::new(router::build(test_state())).unwrap()
    }

    #[tokio::test]
    async fn seal_then_open_round_trip() {
        let server = test_server();

        let sealed = server
            .post("/seal")
            .json(&json!({
                "dek": "ZGVr",
                "iv": "aXY",
                "authorized_users": ["user1", "user2"],
            }))
            .await;
        sealed.assert_status(StatusCode::OK);
        let header = sealed.json::<SealResponse>().header;

        let opened = server
            .post("/open")
            .add_header(CALLER_HEADER, HeaderValue::from_static("user2"))
            .json(&json!({ "header": header }))
            .await;
        opened.assert_status(StatusCode::OK);
        let body = opened.json::<OpenResponse>();
        assert_eq!(body.dek, "ZGVr");
        assert_eq!(body.iv, "aXY");
    }

    #[tokio::test]
    async fn open_returns_403_for_unauthorized_caller() {
        let server = test_server();

        let sealed = server
            .post("/seal")
            .json(&json!({
                "dek": "ZGVr",
                "iv": "aXY",
                "authorized_users": ["user1"],
            }))
            .await;
        let header = sealed.json::<SealResponse>().header;

        let opened = server
            .post("/open")
            .add_header(CALLER_HEADER, HeaderValue::from_static("intruder"))
            .json(&json!({ "header": header }))
            .await;
        opened.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(opened.json::<ErrorResponse>().code, "unauthorized");
    }

    #[tokio::test]
    async fn open_requires_caller_header() {
        let server = test_server();
        let resp = server
            .post("/open")
            .json(&json!({ "header": "aGVhZGVy" }))
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(resp.json::<ErrorResponse>().code, "validation_error");
    }

    #[tokio::test]
    async fn open_rejects_malformed_header() {
        let server = test_server();
        let resp = server
            .post("/open")
            .add_header(CALLER_HEADER, HeaderValue::from_static("user1"))
            .json(&json!({ "header": "not base64!" }))
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(resp.json::<ErrorResponse>().code, "decode_failure");
    }

    #[tokio::test]
    async fn open_rejects_forged_header_blob() {
        // Valid base64, but not a blob this KMS ever produced.
        let server = test_server();
        let resp = server
            .post("/open")
            .add_header(CALLER_HEADER, HeaderValue::from_static("user1"))
            .json(&json!({ "header": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA" }))
            .await;
        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.json::<ErrorResponse>().code, "decryption_failed");
    }

    #[tokio::test]
    async fn seal_rejects_bad_base64_dek() {
        let server = test_server();
        let resp = server
            .post("/seal")
            .json(&json!({
                "dek": "not base64!",
                "iv": "aXY",
                "authorized_users": ["user1"],
            }))
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(resp.json::<ErrorResponse>().code, "validation_error");
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let server = test_server();
        let resp = server.get("/health").await;
        resp.assert_status(StatusCode::OK);
        let body = resp.json::<HealthResponse>();
        assert_eq!(body.status, "ok");
        assert_eq!(body.kms_backend, "local");
    }
}
