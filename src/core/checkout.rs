use crate::core::card::{normalize_card, validate_card};
use crate::core::pricing::{BookingQuote, PricingCalculator};
use crate::domain::booking::{
    BookingConfirmation, BookingRequest, BookingSelection, BookingStatus, CardDetails, Payment,
    PaymentMethod,
};
use crate::domain::ports::BookingGateway;
use crate::utils::error::{Result, SafariError};
use crate::utils::validation::validate_email;
use chrono::{Local, NaiveDate};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Everything the tourist filled in on the booking form.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub tourist_name: String,
    pub tourist_email: String,
    pub tourist_phone: String,
    pub arrival_date: NaiveDate,
    pub selection: BookingSelection,
    pub special_requests: String,
    pub payment_method: PaymentMethod,
    pub card: Option<CardDetails>,
}

impl BookingDraft {
    /// Field checks in form order; the first failure is reported.
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if self.tourist_name.trim().is_empty() {
            return Err(SafariError::validation(
                "touristName",
                "Please enter your full name",
            ));
        }
        validate_email("touristEmail", &self.tourist_email)?;
        if self.tourist_phone.trim().is_empty() {
            return Err(SafariError::validation(
                "touristPhone",
                "Please enter a phone number",
            ));
        }
        if self.arrival_date < today {
            return Err(SafariError::validation(
                "arrivalDate",
                "Arrival date cannot be in the past",
            ));
        }
        if self.selection.num_visitors() == 0 {
            return Err(SafariError::validation(
                "numVisitors",
                "Please enter at least one visitor",
            ));
        }
        if self.selection.is_empty() {
            return Err(SafariError::validation(
                "services",
                "Please select at least one service",
            ));
        }
        Ok(())
    }
}

/// Shared view of whether the submit button is usable.
#[derive(Debug, Clone)]
pub struct SubmitControl {
    enabled: Arc<AtomicBool>,
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl SubmitControl {
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn try_disable(&self) -> Option<SubmitGuard> {
        self.enabled
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| SubmitGuard {
                control: self.clone(),
            })
    }
}

/// Re-enables the control when dropped, whichever way the submission ended.
struct SubmitGuard {
    control: SubmitControl,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.control.enabled.store(true, Ordering::SeqCst);
    }
}

/// Booking form logic: live quote, validation, and submission to the order service.
pub struct BookingForm<G: BookingGateway> {
    gateway: G,
    pricing: PricingCalculator,
    control: SubmitControl,
}

impl<G: BookingGateway> BookingForm<G> {
    pub fn new(gateway: G, pricing: PricingCalculator) -> Self {
        Self {
            gateway,
            pricing,
            control: SubmitControl::default(),
        }
    }

    pub fn pricing(&self) -> &PricingCalculator {
        &self.pricing
    }

    pub fn submit_control(&self) -> SubmitControl {
        self.control.clone()
    }

    pub fn quote(&self, selection: &BookingSelection) -> BookingQuote {
        self.pricing.booking_quote(selection)
    }

    /// Validates the draft and builds the wire request. The total is taken
    /// from the quote as a number.
    pub fn build_request(&self, draft: &BookingDraft, today: NaiveDate) -> Result<BookingRequest> {
        draft.validate(today)?;

        let card = match draft.payment_method {
            PaymentMethod::Card => {
                let card = draft.card.clone().unwrap_or_default();
                validate_card(&card)?;
                Some(normalize_card(&card))
            }
            _ => None,
        };

        let quote = self.quote(&draft.selection);

        Ok(BookingRequest {
            tourist_name: draft.tourist_name.trim().to_string(),
            tourist_email: draft.tourist_email.trim().to_string(),
            tourist_phone: draft.tourist_phone.trim().to_string(),
            arrival_date: draft.arrival_date,
            num_visitors: draft.selection.num_visitors(),
            services: draft.selection.service_ids(),
            special_requests: draft.special_requests.clone(),
            total_amount: quote.total,
            payment: Payment::from_method(draft.payment_method, card),
        })
    }

    pub async fn submit(&self, draft: &BookingDraft) -> Result<BookingConfirmation> {
        self.submit_on(draft, Local::now().date_naive()).await
    }

    /// Same as [`submit`](Self::submit) with an explicit "today" for the arrival-date check.
    pub async fn submit_on(
        &self,
        draft: &BookingDraft,
        today: NaiveDate,
    ) -> Result<BookingConfirmation> {
        let request = self.build_request(draft, today)?;
        self.send(&request).await
    }

    /// Submits a request produced by [`build_request`](Self::build_request).
    pub async fn send(&self, request: &BookingRequest) -> Result<BookingConfirmation> {
        let _guard = self
            .control
            .try_disable()
            .ok_or(SafariError::SubmissionInProgress)?;

        tracing::info!(
            "Submitting booking for {} visitor(s), {} service(s), total {}",
            request.num_visitors,
            request.services.len(),
            self.pricing.format_amount(request.total_amount)
        );

        match self.gateway.create_booking(request).await {
            Ok(confirmation) => {
                tracing::info!("✅ Booking accepted: {}", confirmation.booking_code);
                Ok(confirmation)
            }
            Err(e) => {
                tracing::error!("❌ Booking error: {}", e);
                Err(e)
            }
        }
    }

    pub async fn booking_status(&self, booking_code: &str) -> Result<BookingStatus> {
        let code = booking_code.trim();
        if code.is_empty() {
            return Err(SafariError::validation(
                "bookingCode",
                "Please enter a booking code",
            ));
        }
        self.gateway.booking_status(code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::CardValidationError;
    use crate::domain::booking::{PricingMode, ServiceOffering};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    /// Records requests and checks the submit control while "in flight".
    struct RecordingGateway {
        requests: Arc<Mutex<Vec<BookingRequest>>>,
        control: Arc<Mutex<Option<SubmitControl>>>,
        enabled_during_call: Arc<Mutex<Option<bool>>>,
        fail: bool,
    }

    impl RecordingGateway {
        fn new(fail: bool) -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                control: Arc::new(Mutex::new(None)),
                enabled_during_call: Arc::new(Mutex::new(None)),
                fail,
            }
        }
    }

    #[async_trait::async_trait]
    impl BookingGateway for RecordingGateway {
        async fn create_booking(&self, request: &BookingRequest) -> Result<BookingConfirmation> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(control) = self.control.lock().unwrap().as_ref() {
                *self.enabled_during_call.lock().unwrap() = Some(control.is_enabled());
            }
            if self.fail {
                return Err(SafariError::BookingRejected {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(BookingConfirmation {
                booking_code: "V20261201-TEST0001".to_string(),
                message: None,
            })
        }

        async fn booking_status(&self, booking_code: &str) -> Result<BookingStatus> {
            Err(SafariError::BookingNotFound {
                booking_code: booking_code.to_string(),
            })
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn draft(payment_method: PaymentMethod, card: Option<CardDetails>) -> BookingDraft {
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

        BookingDraft {
            tourist_name: "Jane Doe".to_string(),
            tourist_email: "jane@example.com".to_string(),
            tourist_phone: "+254700000000".to_string(),
            arrival_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            selection,
            special_requests: "Vegetarian meals".to_string(),
            payment_method,
            card,
        }
    }

    fn form(gateway: RecordingGateway) -> BookingForm<RecordingGateway> {
        BookingForm::new(gateway, PricingCalculator::default())
    }

    #[test]
    fn test_build_request_carries_numeric_total() {
        let form = form(RecordingGateway::new(false));
        let request = form
            .build_request(&draft(PaymentMethod::Mpesa, None), today())
            .unwrap();

        assert_eq!(request.total_amount, dec!(7875));
        assert_eq!(request.services, vec!["guided_walk", "homestay"]);
        assert_eq!(request.payment, Payment::Mpesa);
    }

    #[test]
    fn test_card_fields_ignored_for_paypal() {
        let form = form(RecordingGateway::new(false));
        let request = form
            .build_request(
                &draft(PaymentMethod::Paypal, Some(CardDetails::default())),
                today(),
            )
            .unwrap();

        assert_eq!(request.payment, Payment::Paypal);
    }

    #[test]
    fn test_invalid_card_blocks_request() {
        let form = form(RecordingGateway::new(false));
        let card = CardDetails {
            number: "4111 1111 1111 1111".to_string(),
            expiry: "13/28".to_string(),
            cvc: "1".to_string(),
            name: String::new(),
        };

        let err = form
            .build_request(&draft(PaymentMethod::Card, Some(card)), today())
            .unwrap_err();
        assert!(matches!(
            err,
            SafariError::CardError(CardValidationError::Expiry)
        ));
    }

    #[test]
    fn test_card_number_whitespace_stripped() {
        let form = form(RecordingGateway::new(false));
        let card = CardDetails {
            number: "4111 1111 1111 1111".to_string(),
            expiry: "12/28".to_string(),
            cvc: "123".to_string(),
            name: "Jane Doe".to_string(),
        };

        let request = form
            .build_request(&draft(PaymentMethod::Card, Some(card)), today())
            .unwrap();
        match request.payment {
            Payment::Card(card) => assert_eq!(card.number, "4111111111111111"),
            other => panic!("expected card payment, got {:?}", other),
        }
    }

    #[test]
    fn test_draft_validation_order() {
        let mut d = draft(PaymentMethod::Mpesa, None);
        d.tourist_email = "not-an-email".to_string();
        d.selection.set_num_visitors(0);
        let err = d.validate(today()).unwrap_err();
        assert!(matches!(err, SafariError::ValidationError { ref field, .. } if field == "touristEmail"));

        let mut d = draft(PaymentMethod::Mpesa, None);
        d.arrival_date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let err = d.validate(today()).unwrap_err();
        assert!(matches!(err, SafariError::ValidationError { ref field, .. } if field == "arrivalDate"));

        let mut d = draft(PaymentMethod::Mpesa, None);
        d.selection.deselect("guided_walk");
        d.selection.deselect("homestay");
        let err = d.validate(today()).unwrap_err();
        assert!(matches!(err, SafariError::ValidationError { ref field, .. } if field == "services"));
    }

    #[tokio::test]
    async fn test_submit_disables_control_during_call_and_restores_after() {
        let gateway = RecordingGateway::new(false);
        let control_slot = Arc::clone(&gateway.control);
        let observed = Arc::clone(&gateway.enabled_during_call);
        let form = form(gateway);
        *control_slot.lock().unwrap() = Some(form.submit_control());

        let confirmation = form
            .submit_on(&draft(PaymentMethod::Mpesa, None), today())
            .await
            .unwrap();

        assert_eq!(confirmation.booking_code, "V20261201-TEST0001");
        assert_eq!(*observed.lock().unwrap(), Some(false));
        assert!(form.submit_control().is_enabled());
    }

    #[tokio::test]
    async fn test_failed_submit_reenables_control() {
        let gateway = RecordingGateway::new(true);
        let requests = Arc::clone(&gateway.requests);
        let form = form(gateway);

        let err = form
            .submit_on(&draft(PaymentMethod::Mpesa, None), today())
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(requests.lock().unwrap().len(), 1);
        assert!(form.submit_control().is_enabled());
    }

    #[tokio::test]
    async fn test_validation_failure_never_reaches_gateway() {
        let gateway = RecordingGateway::new(false);
        let requests = Arc::clone(&gateway.requests);
        let form = form(gateway);

        let result = form
            .submit_on(&draft(PaymentMethod::Card, None), today())
            .await;

        assert!(matches!(
            result,
            Err(SafariError::CardError(CardValidationError::CardNumber))
        ));
        assert!(requests.lock().unwrap().is_empty());
        assert!(form.submit_control().is_enabled());
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_in_flight() {
        let form = form(RecordingGateway::new(false));
        let control = form.submit_control();
        let guard = control.try_disable().unwrap();

        let result = form
            .submit_on(&draft(PaymentMethod::Mpesa, None), today())
            .await;
        assert!(matches!(result, Err(SafariError::SubmissionInProgress)));

        drop(guard);
        assert!(control.is_enabled());
    }

    #[tokio::test]
    async fn test_send_submits_the_built_request_unchanged() {
        let gateway = RecordingGateway::new(false);
        let requests = Arc::clone(&gateway.requests);
        let form = form(gateway);

        let request = form
            .build_request(&draft(PaymentMethod::Mpesa, None), today())
            .unwrap();
        form.send(&request).await.unwrap();

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], request);
        assert_eq!(sent[0].total_amount, dec!(7875));
    }

    #[tokio::test]
    async fn test_booking_status_requires_code() {
        let form = form(RecordingGateway::new(false));
        assert!(matches!(
            form.booking_status("  ").await,
            Err(SafariError::ValidationError { .. })
        ));
        assert!(matches!(
            form.booking_status("V1").await,
            Err(SafariError::BookingNotFound { .. })
        ));
    }
}
