// Adapters layer: concrete implementations of the domain ports (storage, http).

pub mod http;
pub mod storage;

pub use http::HttpBookingGateway;
pub use storage::{LocalStorage, MemoryStorage};
