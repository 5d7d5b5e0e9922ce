use crate::domain::booking::{BookingConfirmation, BookingRequest, BookingStatus};
use crate::domain::ports::BookingGateway;
use crate::utils::error::{Result, SafariError};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Talks to the order service over its JSON contract.
#[derive(Debug, Clone)]
pub struct HttpBookingGateway {
    client: Client,
    base_url: String,
}

impl HttpBookingGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Pulls `{"error": "..."}` out of a failed response, else the status text.
async fn rejection(response: reqwest::Response) -> SafariError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Booking failed")
                .to_string()
        });

    SafariError::BookingRejected {
        status: status.as_u16(),
        message,
    }
}

#[async_trait::async_trait]
impl BookingGateway for HttpBookingGateway {
    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingConfirmation> {
        let url = self.endpoint("booking");
        tracing::debug!("Submitting booking to: {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        tracing::debug!("Booking response status: {}", response.status());

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let confirmation: BookingConfirmation = response.json().await?;
        Ok(confirmation)
    }

    async fn booking_status(&self, booking_code: &str) -> Result<BookingStatus> {
        let url = self.endpoint(&format!("booking/{}", booking_code));
        tracing::debug!("Fetching booking status from: {}", url);

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SafariError::BookingNotFound {
                booking_code: booking_code.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        Ok(response.json().await?)
    }
}
