use crate::utils::error::{Result, SafariError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a service's unit price scales with the party size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricingMode {
    PerPerson,
    FlatPerBooking,
}

/// A bookable experience (guided walk, homestay, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub pricing_mode: PricingMode,
}

impl ServiceOffering {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        pricing_mode: PricingMode,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            pricing_mode,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog {
    services: Vec<ServiceOffering>,
}

impl ServiceCatalog {
    pub fn new(services: Vec<ServiceOffering>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &[ServiceOffering] {
        &self.services
    }

    pub fn get(&self, id: &str) -> Option<&ServiceOffering> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Display name for an id, falling back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|s| s.name.as_str()).unwrap_or(id)
    }

    /// Builds a selection from service ids; an unknown id is an input error.
    pub fn select<I, S>(&self, ids: I, num_visitors: u32) -> Result<BookingSelection>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = BookingSelection::new(num_visitors);
        for id in ids {
            let id = id.as_ref();
            let offering = self.get(id).ok_or_else(|| {
                SafariError::validation("services", format!("Unknown service: {}", id))
            })?;
            selection.select(offering.clone());
        }
        Ok(selection)
    }
}

/// The services ticked on the booking form plus the visitor count.
/// Lives only as long as the form session; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingSelection {
    services: Vec<ServiceOffering>,
    num_visitors: u32,
}

impl BookingSelection {
    pub fn new(num_visitors: u32) -> Self {
        Self {
            services: Vec::new(),
            num_visitors,
        }
    }

    pub fn services(&self) -> &[ServiceOffering] {
        &self.services
    }

    pub fn service_ids(&self) -> Vec<String> {
        self.services.iter().map(|s| s.id.clone()).collect()
    }

    pub fn num_visitors(&self) -> u32 {
        self.num_visitors
    }

    pub fn set_num_visitors(&mut self, num_visitors: u32) {
        self.num_visitors = num_visitors;
    }

    /// Same as typing into the visitors field: junk counts as zero.
    pub fn set_num_visitors_from_input(&mut self, input: &str) {
        self.num_visitors = crate::utils::validation::parse_count(input);
    }

    /// Set semantics: selecting an id twice replaces the earlier entry.
    pub fn select(&mut self, offering: ServiceOffering) {
        match self.services.iter_mut().find(|s| s.id == offering.id) {
            Some(existing) => *existing = offering,
            None => self.services.push(offering),
        }
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        let before = self.services.len();
        self.services.retain(|s| s.id != id);
        before != self.services.len()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.services.iter().any(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Mpesa,
    Card,
    Paypal,
}

impl PaymentMethod {
    /// Which payment panel the form shows for this method.
    pub fn section(&self) -> &'static str {
        match self {
            PaymentMethod::Mpesa => "mpesaPaymentInfo",
            PaymentMethod::Card => "cardPaymentForm",
            PaymentMethod::Paypal => "paypalPaymentInfo",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Card => "card",
            PaymentMethod::Paypal => "paypal",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = SafariError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mpesa" => Ok(PaymentMethod::Mpesa),
            "card" => Ok(PaymentMethod::Card),
            "paypal" => Ok(PaymentMethod::Paypal),
            other => Err(SafariError::validation(
                "paymentMethod",
                format!("Unsupported payment method: {}", other),
            )),
        }
    }
}

/// Raw card fields as typed by the tourist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardDetails {
    #[serde(rename = "cardNumber")]
    pub number: String,
    #[serde(rename = "cardExpiry")]
    pub expiry: String,
    #[serde(rename = "cardCVC")]
    pub cvc: String,
    #[serde(rename = "cardName")]
    pub name: String,
}

/// Payment choice as it goes on the wire: the method tag plus, for cards only,
/// the card fields alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "paymentMethod", rename_all = "lowercase")]
pub enum Payment {
    Mpesa,
    Card(CardDetails),
    Paypal,
}

impl Payment {
    pub fn method(&self) -> PaymentMethod {
        match self {
            Payment::Mpesa => PaymentMethod::Mpesa,
            Payment::Card(_) => PaymentMethod::Card,
            Payment::Paypal => PaymentMethod::Paypal,
        }
    }

    /// Card details are dropped unless the method is `card`.
    pub fn from_method(method: PaymentMethod, card: Option<CardDetails>) -> Self {
        match method {
            PaymentMethod::Mpesa => Payment::Mpesa,
            PaymentMethod::Card => Payment::Card(card.unwrap_or_default()),
            PaymentMethod::Paypal => Payment::Paypal,
        }
    }
}

/// Body of `POST {base}/booking`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub tourist_name: String,
    pub tourist_email: String,
    pub tourist_phone: String,
    pub arrival_date: NaiveDate,
    pub num_visitors: u32,
    pub services: Vec<String>,
    pub special_requests: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(flatten)]
    pub payment: Payment,
}

impl BookingRequest {
    /// "Guided Walk, Homestay" style listing for confirmations.
    pub fn services_summary(&self, catalog: &ServiceCatalog) -> String {
        self.services
            .iter()
            .map(|id| catalog.display_name(id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_code: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `GET {base}/booking/{code}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingStatus {
    pub booking_code: String,
    pub tourist_name: String,
    pub arrival_date: String,
    pub num_visitors: u32,
    pub requested_services: Vec<String>,
    pub status: String,
    pub payment_status: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub confirmed_services: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::new(vec![
            ServiceOffering::new("guided_walk", "Guided Walk", dec!(2000), PricingMode::PerPerson),
            ServiceOffering::new("homestay", "Homestay", dec!(1500), PricingMode::FlatPerBooking),
        ])
    }

    fn request(payment: Payment) -> BookingRequest {
        BookingRequest {
            tourist_name: "Jane Doe".to_string(),
            tourist_email: "jane@example.com".to_string(),
            tourist_phone: "+254700000000".to_string(),
            arrival_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            num_visitors: 3,
            services: vec!["guided_walk".to_string(), "homestay".to_string()],
            special_requests: String::new(),
            total_amount: dec!(7875),
            payment,
        }
    }

    #[test]
    fn test_pricing_mode_wire_names() {
        assert_eq!(
            serde_json::to_value(PricingMode::PerPerson).unwrap(),
            serde_json::json!("per-person")
        );
        assert_eq!(
            serde_json::to_value(PricingMode::FlatPerBooking).unwrap(),
            serde_json::json!("flat-per-booking")
        );
    }

    #[test]
    fn test_catalog_select_rejects_unknown_service() {
        let err = catalog().select(["guided_walk", "balloon"], 2).unwrap_err();
        assert!(err.to_string().contains("balloon"));
    }

    #[test]
    fn test_selection_has_set_semantics() {
        let mut selection = catalog().select(["guided_walk", "guided_walk"], 2).unwrap();
        assert_eq!(selection.services().len(), 1);

        assert!(selection.deselect("guided_walk"));
        assert!(!selection.deselect("guided_walk"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_visitor_input_parsing() {
        let mut selection = BookingSelection::new(0);
        selection.set_num_visitors_from_input("4");
        assert_eq!(selection.num_visitors(), 4);
        selection.set_num_visitors_from_input("");
        assert_eq!(selection.num_visitors(), 0);
    }

    #[test]
    fn test_payment_method_parsing_and_sections() {
        assert_eq!("MPESA".parse::<PaymentMethod>().unwrap(), PaymentMethod::Mpesa);
        assert_eq!(PaymentMethod::Card.section(), "cardPaymentForm");
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_mpesa_request_has_no_card_fields() {
        let json = serde_json::to_value(request(Payment::Mpesa)).unwrap();

        assert_eq!(json["paymentMethod"], "mpesa");
        assert_eq!(json["touristName"], "Jane Doe");
        assert_eq!(json["arrivalDate"], "2026-12-01");
        assert_eq!(json["numVisitors"], 3);
        assert_eq!(json["totalAmount"].as_f64(), Some(7875.0));
        assert!(json.get("cardNumber").is_none());
    }

    #[test]
    fn test_card_request_carries_card_fields() {
        let card = CardDetails {
            number: "4111111111111111".to_string(),
            expiry: "12/28".to_string(),
            cvc: "123".to_string(),
            name: "Jane Doe".to_string(),
        };
        let json = serde_json::to_value(request(Payment::Card(card))).unwrap();

        assert_eq!(json["paymentMethod"], "card");
        assert_eq!(json["cardNumber"], "4111111111111111");
        assert_eq!(json["cardExpiry"], "12/28");
        assert_eq!(json["cardCVC"], "123");
        assert_eq!(json["cardName"], "Jane Doe");
    }

    #[test]
    fn test_payment_from_method_drops_card_for_other_methods() {
        let card = Some(CardDetails::default());
        assert_eq!(Payment::from_method(PaymentMethod::Paypal, card), Payment::Paypal);
    }

    #[test]
    fn test_services_summary_uses_display_names() {
        let mut req = request(Payment::Mpesa);
        req.services.push("rhino_sanctuary".to_string());
        assert_eq!(
            req.services_summary(&catalog()),
            "Guided Walk, Homestay, rhino_sanctuary"
        );
    }

    #[test]
    fn test_booking_status_deserializes() {
        let raw = serde_json::json!({
            "booking_code": "V20261201-AB12CD34",
            "tourist_name": "Jane Doe",
            "arrival_date": "2026-12-01",
            "num_visitors": 3,
            "requested_services": ["guided_walk"],
            "status": "pending",
            "payment_status": "{\"method\": \"mpesa\", \"status\": \"pending\"}",
            "total_amount": 7875.0,
            "confirmed_services": null,
            "created_at": "2026-10-18 10:00:00"
        });

        let status: BookingStatus = serde_json::from_value(raw).unwrap();
        assert_eq!(status.total_amount, dec!(7875));
        assert!(status.confirmed_services.is_none());
    }
}
