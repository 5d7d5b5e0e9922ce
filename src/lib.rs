pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{HttpBookingGateway, LocalStorage, MemoryStorage};
pub use core::cart_store::CartStore;
pub use core::checkout::{BookingDraft, BookingForm, SubmitControl};
pub use core::pricing::{BookingQuote, CartSummary, PricingCalculator, PricingConfig};
pub use domain::booking::{
    BookingConfirmation, BookingRequest, BookingSelection, BookingStatus, CardDetails, Payment,
    PaymentMethod, PricingMode, ServiceCatalog, ServiceOffering,
};
pub use domain::model::{Cart, CartEvent, CartLineItem, Product, ProductId};
pub use utils::error::{Result, SafariError};
