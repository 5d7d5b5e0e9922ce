pub mod card;
pub mod cart_store;
pub mod checkout;
pub mod pricing;

pub use crate::domain::model::{Cart, CartEvent, CartLineItem, Product, ProductId};
pub use crate::domain::ports::{BookingGateway, CartObserver, ConfigProvider, Storage};
pub use crate::utils::error::Result;
