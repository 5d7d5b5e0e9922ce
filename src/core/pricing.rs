use crate::domain::booking::{BookingSelection, PricingMode, ServiceOffering};
use crate::domain::model::Cart;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Tunable pricing constants. Defaults match the marketplace and booking form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Subtotals at or above this ship for free.
    #[serde(with = "rust_decimal::serde::float")]
    pub free_shipping_threshold: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub flat_shipping_fee: Decimal,
    /// Fraction of the booking subtotal, e.g. `0.05`.
    #[serde(with = "rust_decimal::serde::float")]
    pub service_fee_rate: Decimal,
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: dec!(10000),
            flat_shipping_fee: dec!(500),
            service_fee_rate: dec!(0.05),
            currency: "KES".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub item_count: u64,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookingQuote {
    pub subtotal: Decimal,
    pub service_fee: Decimal,
    pub total: Decimal,
}

/// Stateless money math shared by the cart and the booking form.
///
/// Prices and visitor counts are assumed non-negative; callers validate input
/// before it reaches here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingCalculator {
    config: PricingConfig,
}

impl PricingCalculator {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn shipping_cost(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.config.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.config.flat_shipping_fee
        }
    }

    pub fn cart_total(&self, subtotal: Decimal, shipping: Decimal) -> Decimal {
        subtotal + shipping
    }

    pub fn booking_subtotal(&self, services: &[ServiceOffering], num_visitors: u32) -> Decimal {
        let visitors = Decimal::from(num_visitors);
        services
            .iter()
            .map(|service| match service.pricing_mode {
                PricingMode::FlatPerBooking => service.price,
                PricingMode::PerPerson => service.price * visitors,
            })
            .sum()
    }

    pub fn service_fee(&self, subtotal: Decimal) -> Decimal {
        subtotal * self.config.service_fee_rate
    }

    pub fn booking_total(&self, subtotal: Decimal, service_fee: Decimal) -> Decimal {
        subtotal + service_fee
    }

    pub fn cart_summary(&self, cart: &Cart) -> CartSummary {
        let subtotal = cart.total();
        let shipping = self.shipping_cost(subtotal);
        CartSummary {
            item_count: cart.item_count(),
            subtotal,
            shipping,
            total: self.cart_total(subtotal, shipping),
        }
    }

    pub fn booking_quote(&self, selection: &BookingSelection) -> BookingQuote {
        let subtotal = self.booking_subtotal(selection.services(), selection.num_visitors());
        let service_fee = self.service_fee(subtotal);
        BookingQuote {
            subtotal,
            service_fee,
            total: self.booking_total(subtotal, service_fee),
        }
    }

    /// Display form only, e.g. `KES 7,875` or `KES 12.5`. Never parse this back.
    pub fn format_amount(&self, amount: Decimal) -> String {
        format!("{} {}", self.config.currency, group_thousands(amount))
    }
}

fn group_thousands(amount: Decimal) -> String {
    let rounded = amount.round_dp(2).normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.insert(0, '-');
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Product;

    fn calculator() -> PricingCalculator {
        PricingCalculator::default()
    }

    #[test]
    fn test_shipping_threshold() {
        let calc = calculator();
        assert_eq!(calc.shipping_cost(dec!(9999)), dec!(500));
        assert_eq!(calc.shipping_cost(dec!(10000)), dec!(0));
        assert_eq!(calc.shipping_cost(dec!(0)), dec!(500));
        assert_eq!(calc.shipping_cost(dec!(9999.99)), dec!(500));
    }

    #[test]
    fn test_custom_shipping_constants() {
        let calc = PricingCalculator::new(PricingConfig {
            free_shipping_threshold: dec!(5000),
            flat_shipping_fee: dec!(250),
            ..PricingConfig::default()
        });
        assert_eq!(calc.shipping_cost(dec!(4999)), dec!(250));
        assert_eq!(calc.shipping_cost(dec!(5000)), dec!(0));
    }

    #[test]
    fn test_cart_summary_scenario() {
        let mut cart = Cart::new();
        let product = Product::new(1, "Beaded Bracelet", dec!(1000), "", "Jewelry");
        for _ in 0..3 {
            cart.add_product(&product);
        }

        let summary = calculator().cart_summary(&cart);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal, dec!(3000));
        assert_eq!(summary.shipping, dec!(500));
        assert_eq!(summary.total, dec!(3500));
    }

    #[test]
    fn test_booking_quote_scenario() {
        let mut selection = BookingSelection::new(3);
        selection.select(ServiceOffering::new(
            "guided_walk",
            "Guided Walk",
            dec!(2000),
            PricingMode::PerPerson,
        ));
        selection.select(ServiceOffering::new(
            "homestay",
            "Homestay",
            dec!(1500),
            PricingMode::FlatPerBooking,
        ));

        let quote = calculator().booking_quote(&selection);
        assert_eq!(quote.subtotal, dec!(7500));
        assert_eq!(quote.service_fee, dec!(375));
        assert_eq!(quote.total, dec!(7875));
    }

    #[test]
    fn test_per_person_with_zero_visitors() {
        let services = vec![
            ServiceOffering::new("guided_walk", "Guided Walk", dec!(2000), PricingMode::PerPerson),
            ServiceOffering::new("homestay", "Homestay", dec!(1500), PricingMode::FlatPerBooking),
        ];
        assert_eq!(calculator().booking_subtotal(&services, 0), dec!(1500));
    }

    #[test]
    fn test_empty_selection_quote_is_zero() {
        let quote = calculator().booking_quote(&BookingSelection::new(4));
        assert_eq!(quote.total, dec!(0));
    }

    #[test]
    fn test_format_amount() {
        let calc = calculator();
        assert_eq!(calc.format_amount(dec!(3500)), "KES 3,500");
        assert_eq!(calc.format_amount(dec!(7875.00)), "KES 7,875");
        assert_eq!(calc.format_amount(dec!(12.5)), "KES 12.5");
        assert_eq!(calc.format_amount(dec!(1234567.891)), "KES 1,234,567.89");
        assert_eq!(calc.format_amount(dec!(0)), "KES 0");
        assert_eq!(calc.format_amount(dec!(-1500)), "KES -1,500");
    }
}
