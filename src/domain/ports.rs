use crate::core::pricing::PricingConfig;
use crate::domain::booking::{BookingConfirmation, BookingRequest, BookingStatus, ServiceCatalog};
use crate::domain::model::{Cart, CartEvent};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Synchronous key-value persistence, the browser's `localStorage` in spirit.
pub trait Storage: Send + Sync {
    /// `Ok(None)` when the key has never been written.
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Receives cart changes after they have been persisted.
pub trait CartObserver: Send + Sync {
    fn on_cart_changed(&self, event: &CartEvent, cart: &Cart);
}

impl<F> CartObserver for F
where
    F: Fn(&CartEvent, &Cart) + Send + Sync,
{
    fn on_cart_changed(&self, event: &CartEvent, cart: &Cart) {
        self(event, cart)
    }
}

/// The order service that accepts booking requests.
#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingConfirmation>;
    async fn booking_status(&self, booking_code: &str) -> Result<BookingStatus>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
    fn storage_path(&self) -> &str;
    fn cart_key(&self) -> &str;
    fn pricing(&self) -> &PricingConfig;
    fn catalog(&self) -> &ServiceCatalog;
}
