use super::{Notification, Notifier, NotifyError};
use async_trait::async_trait;
use serde::Serialize;
use url::Url;

/// Posts notifications as JSON to a mail relay.
#[derive(Debug, Clone)]
pub struct HttpRelayNotifier {
    http_client: reqwest::Client,
    url: Url,
    sender: String,
}

#[derive(Serialize)]
struct Envelope<'a> {
    from: &'a str,
    #[serde(flatten)]
    notification: &'a Notification,
}

impl HttpRelayNotifier {
    pub fn new(url: Url, sender: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            url,
            sender,
        }
    }
}

#[async_trait]
impl Notifier for HttpRelayNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let envelope = Envelope {
            from: &self.sender,
            notification,
        };
        let response = self
            .http_client
            .post(self.url.clone())
            .json(&envelope)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::DeliveryFailed {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn name(&self) -> &'static str {
        "http-relay"
    }
}
