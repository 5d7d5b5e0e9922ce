//! Card field formatting (as the tourist types) and the submit-time checks.

use crate::domain::booking::CardDetails;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

pub const MIN_CARD_NUMBER_DIGITS: usize = 13;
pub const MAX_CARD_NUMBER_DIGITS: usize = 16;
pub const MIN_CVC_DIGITS: usize = 3;
pub const MAX_CVC_DIGITS: usize = 4;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardValidationError {
    #[error("Please enter a valid card number")]
    CardNumber,
    #[error("Please enter a valid expiry date (MM/YY)")]
    Expiry,
    #[error("Please enter a valid CVC")]
    Cvc,
    #[error("Please enter cardholder name")]
    Name,
}

impl CardValidationError {
    /// Form field that failed.
    pub fn field(&self) -> &'static str {
        match self {
            CardValidationError::CardNumber => "cardNumber",
            CardValidationError::Expiry => "cardExpiry",
            CardValidationError::Cvc => "cardCVC",
            CardValidationError::Name => "cardName",
        }
    }
}

fn expiry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{2}/\d{2}$").expect("static expiry pattern"))
}

fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Keeps at most 16 digits and groups them in fours: `4111 1111 1111 1111`.
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = digits(input)
        .chars()
        .take(MAX_CARD_NUMBER_DIGITS)
        .collect();
    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `1228` becomes `12/28`; the slash appears as soon as the month is complete.
pub fn format_expiry(input: &str) -> String {
    let digits: String = digits(input).chars().take(4).collect();
    if digits.len() >= 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}

pub fn sanitize_cvc(input: &str) -> String {
    digits(input).chars().take(MAX_CVC_DIGITS).collect()
}

/// Month part of an `MM/YY` value is 01 through 12.
pub fn expiry_month_valid(expiry: &str) -> bool {
    expiry
        .get(..2)
        .and_then(|month| month.parse::<u8>().ok())
        .is_some_and(|month| (1..=12).contains(&month))
}

/// Runs the checks in form order and reports only the first failure.
pub fn validate_card(card: &CardDetails) -> Result<(), CardValidationError> {
    let number: String = card.number.chars().filter(|c| !c.is_whitespace()).collect();
    if number.len() < MIN_CARD_NUMBER_DIGITS {
        return Err(CardValidationError::CardNumber);
    }

    let expiry = card.expiry.trim();
    if !expiry_pattern().is_match(expiry) || !expiry_month_valid(expiry) {
        return Err(CardValidationError::Expiry);
    }

    if card.cvc.trim().len() < MIN_CVC_DIGITS {
        return Err(CardValidationError::Cvc);
    }

    if card.name.trim().is_empty() {
        return Err(CardValidationError::Name);
    }

    Ok(())
}

/// Card number as sent to the order service: whitespace stripped.
pub fn normalize_card(card: &CardDetails) -> CardDetails {
    CardDetails {
        number: card.number.chars().filter(|c| !c.is_whitespace()).collect(),
        expiry: card.expiry.trim().to_string(),
        cvc: card.cvc.trim().to_string(),
        name: card.name.trim().to_string(),
    }
}
