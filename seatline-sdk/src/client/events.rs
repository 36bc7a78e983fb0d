//! Events API client (marketing site frontend → seatline server).

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::{
    CancelRequest, CancelResponse, ClearCacheRequest, ClearCacheResponse, EventResponse,
    RegisterRequest, RegistrationResponse,
};

/// Typed HTTP client for the `/events` endpoints.
#[derive(Debug, Clone)]
pub struct EventsClient {
    http: Client,
    base_url: Url,
}

impl EventsClient {
    /// Create a new `EventsClient` rooted at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /events` – list active events with registration counts.
    pub async fn list_events(&self) -> Result<Vec<EventResponse>, ClientError> {
        let url = self.base_url.join("/events")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /events/{id}` – a single event with its registration count.
    pub async fn get_event(&self, event_id: &str) -> Result<EventResponse, ClientError> {
        let url = self
            .base_url
            .join(&format!("/events/{}", urlencoding::encode(event_id)))?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /events/register` – register an attendee.
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegistrationResponse, ClientError> {
        let url = self.base_url.join("/events/register")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }

    /// `POST /events/cancel` – cancel by ticket number or email.
    pub async fn cancel(&self, request: &CancelRequest) -> Result<CancelResponse, ClientError> {
        let url = self.base_url.join("/events/cancel")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }

    /// `POST /events/clear-cache` – drop cached event views.
    pub async fn clear_cache(
        &self,
        request: &ClearCacheRequest,
    ) -> Result<ClearCacheResponse, ClientError> {
        let url = self.base_url.join("/events/clear-cache")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }
}
