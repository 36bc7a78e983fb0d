//! Axum server setup and router configuration.

use crate::api;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        // Add state to all routes
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    store: &'static str,
}

/// Returns 503 when the store cannot be reached.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.backend_name();
    let (code, status) = match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            tracing::warn!(store, error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };
    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store,
        }),
    )
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, Response, header};
    use seatline_core::config::CacheConfig;
    use seatline_core::entities::event::Event;
    use seatline_core::rate_limit::RateLimitPolicy;
    use seatline_core::store::memory::Fault;
    use seatline_core::store::{EventStore, MemoryStore};
    use seatline_sdk::objects::{
        CancelResponse, ClearCacheResponse, ErrorBody, EventResponse, RegistrationResponse,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use time::macros::datetime;
    use tower::ServiceExt;

    fn event(id: &str, capacity: i32) -> Event {
        Event {
            id: id.to_string(),
            name: "Launch Night".to_string(),
            description: String::new(),
            starts_at: datetime!(2026-11-01 18:00 UTC),
            ends_at: datetime!(2026-11-01 21:00 UTC),
            location: "Lagos".to_string(),
            capacity,
            active: true,
        }
    }

    async fn app_with(policy: RateLimitPolicy) -> (Router, MemoryStore) {
        let store = MemoryStore::new();
        store.upsert_event(event("launch", 1)).await.unwrap();
        store.upsert_event(event("open-day", 0)).await.unwrap();
        let state = AppState::new(
            Arc::new(store.clone()),
            &CacheConfig::default(),
            policy,
            None,
        );
        (build_router(state), store)
    }

    async fn app() -> (Router, MemoryStore) {
        app_with(RateLimitPolicy::default()).await
    }

    fn registration_body(email: &str) -> Value {
        json!({
            "event_id": "launch",
            "name": "Ada Obi",
            "gender": "female",
            "profession": "Engineer",
            "phone_number": "08012345678",
            "email": email,
            "location_preference": "lagos",
        })
    }

    fn post(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
        router.clone().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn capacity_one_register_cancel_register() {
        let (router, _) = app().await;

        let response = send(&router, post("/events/register", &registration_body("a@example.com"))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let first: RegistrationResponse = json_body(response).await;
        assert!(first.ticket_number.starts_with("TKT-"));

        let response = send(&router, post("/events/register", &registration_body("b@example.com"))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorBody = json_body(response).await;
        assert_eq!(error.error, "EventAtCapacity");

        let detail: EventResponse = json_body(send(&router, get("/events/launch")).await).await;
        assert_eq!(detail.registration_count, 1);
        assert_eq!(detail.spots_left, Some(0));

        let cancel = json!({ "ticket_number": first.ticket_number.to_ascii_lowercase() });
        let response = send(&router, post("/events/cancel", &cancel)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cancelled: CancelResponse = json_body(response).await;
        assert_eq!(cancelled.ticket_number, first.ticket_number);
        assert_eq!(cancelled.event_id, "launch");

        let response = send(&router, post("/events/cancel", &cancel)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&router, post("/events/register", &registration_body("b@example.com"))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn list_reflects_registrations() {
        let (router, _) = app().await;
        let before: Vec<EventResponse> = json_body(send(&router, get("/events")).await).await;
        assert_eq!(before.len(), 2);
        assert!(before.iter().all(|e| e.registration_count == 0));

        let mut body = registration_body("a@example.com");
        body["event_id"] = json!("open-day");
        let response = send(&router, post("/events/register", &body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let after: Vec<EventResponse> = json_body(send(&router, get("/events")).await).await;
        let open_day = after.iter().find(|e| e.id == "open-day").unwrap();
        assert_eq!(open_day.registration_count, 1);
        assert_eq!(open_day.spots_left, None);
    }

    #[tokio::test]
    async fn client_errors() {
        let (router, _) = app().await;

        let response = send(&router, get("/events/missing")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let mut body = registration_body("a@example.com");
        body["event_id"] = json!("missing");
        let response = send(&router, post("/events/register", &body)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let mut body = registration_body("a@example.com");
        body["phone_number"] = json!("12");
        let response = send(&router, post("/events/register", &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorBody = json_body(response).await;
        assert_eq!(error.error, "InvalidInput");

        let response = send(&router, post("/events/cancel", &json!({}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let malformed = Request::builder()
            .method("POST")
            .uri("/events/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        assert_eq!(send(&router, malformed).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (router, _) = app().await;
        let body = registration_body("a@example.com");
        assert_eq!(send(&router, post("/events/register", &body)).await.status(), StatusCode::CREATED);
        let response = send(&router, post("/events/register", &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorBody = json_body(response).await;
        assert_eq!(error.error, "DuplicateRegistration");
    }

    #[tokio::test]
    async fn oversized_cancel_body_is_rejected() {
        let (router, _) = app().await;
        let body = json!({ "email": format!("{}@example.com", "a".repeat(3000)) });
        let response = send(&router, post("/events/cancel", &body)).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let error: ErrorBody = json_body(response).await;
        assert_eq!(error.error, "PayloadTooLarge");
    }

    #[tokio::test]
    async fn registration_is_rate_limited_per_ip() {
        let (router, _) = app_with(RateLimitPolicy {
            per_ip_per_hour: 2,
            per_email_per_day: 10,
        })
        .await;
        for email in ["a@example.com", "b@example.com"] {
            let response = send(&router, post("/events/register", &registration_body(email))).await;
            assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        }
        let response = send(&router, post("/events/register", &registration_body("c@example.com"))).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        let error: ErrorBody = json_body(response).await;
        assert_eq!(error.error, "RateLimited");
    }

    #[tokio::test]
    async fn clear_cache_drops_event_views() {
        let (router, _) = app().await;
        send(&router, get("/events")).await;
        send(&router, get("/events/launch")).await;

        let response = send(&router, post("/events/clear-cache", &json!({ "all": true }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cleared: ClearCacheResponse = json_body(response).await;
        assert_eq!(cleared.cleared, 2);

        let response = send(&router, post("/events/clear-cache", &json!({}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_store_state() {
        let (router, store) = app().await;
        let response = send(&router, get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = json_body(response).await;
        assert_eq!(body["store"], "memory");
        assert_eq!(body["status"], "healthy");

        store.set_fault(Some(Fault::Unavailable)).await;
        let response = send(&router, get("/health")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let events: Vec<EventResponse> = json_body(send(&router, get("/events")).await).await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn event_detail_is_not_found_while_store_is_down() {
        let (router, store) = app().await;
        store.set_fault(Some(Fault::Unavailable)).await;

        let response = send(&router, get("/events/launch")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error: ErrorBody = json_body(response).await;
        assert_eq!(error.error, "EventNotFound");
    }
}
