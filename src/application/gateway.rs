use crate::application::availability::{Actor, AvailabilityPolicy, allow_all};
use crate::application::scripts::{CustomerProfile, PayPageRequest, ScriptParams};
use crate::config::{GATEWAY_ID, GatewaySettings};
use crate::domain::charge::{ChargeRequest, ChargeResult, ChargeType};
use crate::domain::checkout::{CardField, CardSource, CheckoutSession, FormSubmission, field_error_message};
use crate::domain::order::Order;
use crate::domain::ports::{OrderStoreBox, PaymentProcessorBox};
use crate::error::{GatewayError, Result};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

pub const DEFAULT_RETURN_URL_BASE: &str = "/checkout/order-received";

/// Result of one checkout submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The order is paid; send the customer to `redirect`.
    Success { redirect: String },
    /// Nothing was written to the order; re-render checkout with `message`.
    Failure { message: String },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success { .. })
    }

    pub fn redirect(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Success { redirect } => Some(redirect),
            SubmissionOutcome::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Success { .. } => None,
            SubmissionOutcome::Failure { message } => Some(message),
        }
    }
}

/// Reasons a submission never reaches the processor.
#[derive(Debug, Clone, PartialEq)]
enum Blocked {
    FieldErrors,
    FormErrors,
    MissingCard,
    SavedCardsDisabled,
    AlreadyPaid,
    InvalidTotal(String),
}

impl Blocked {
    /// Field errors already produced their own notices.
    fn needs_notice(&self) -> bool {
        !matches!(self, Blocked::FieldErrors)
    }
}

impl fmt::Display for Blocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blocked::FieldErrors => f.write_str("Please correct the card details and try again."),
            Blocked::FormErrors => f.write_str("Your card details could not be verified. Please try again."),
            Blocked::MissingCard => f.write_str("Please enter your card details."),
            Blocked::SavedCardsDisabled => f.write_str("Saved cards are not accepted. Please enter a new card."),
            Blocked::AlreadyPaid => f.write_str("This order has already been paid."),
            Blocked::InvalidTotal(_) => f.write_str("This order total cannot be charged."),
        }
    }
}

/// The card gateway: validates the checkout form, charges the order once and
/// records the outcome on it.
///
/// Settings, storage, the processor and the availability rule are all injected
/// at construction; the gateway holds no other state between submissions.
pub struct PaymentGateway {
    settings: GatewaySettings,
    order_store: OrderStoreBox,
    processor: PaymentProcessorBox,
    availability: AvailabilityPolicy,
    return_url_base: String,
}

impl PaymentGateway {
    /// Creates a gateway offered to every actor, redirecting to
    /// [`DEFAULT_RETURN_URL_BASE`].
    pub fn new(
        settings: GatewaySettings,
        order_store: OrderStoreBox,
        processor: PaymentProcessorBox,
    ) -> Self {
        Self {
            settings,
            order_store,
            processor,
            availability: allow_all(),
            return_url_base: DEFAULT_RETURN_URL_BASE.to_string(),
        }
    }

    pub fn with_availability(mut self, policy: AvailabilityPolicy) -> Self {
        self.availability = policy;
        self
    }

    pub fn with_return_url_base(mut self, base: impl Into<String>) -> Self {
        self.return_url_base = base.into();
        self
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Configured and usable, and the injected policy accepts `actor`.
    pub fn is_available_for(&self, actor: &Actor) -> bool {
        self.settings.is_available() && (self.availability)(actor)
    }

    /// Appends this gateway to the host's payment method ids when it is
    /// available for `actor`.
    pub fn offered_methods(&self, mut methods: Vec<String>, actor: &Actor) -> Vec<String> {
        if self.is_available_for(actor) {
            methods.push(GATEWAY_ID.to_string());
        }
        methods
    }

    /// Adds one error notice per card field the client script flagged.
    pub fn validate_fields(&self, form: &FormSubmission, session: &mut CheckoutSession) {
        for field in CardField::ALL {
            if let Some(category) = form.field_error(field) {
                session.add_error(field_error_message(field, category));
            }
        }
    }

    /// Handles one checkout submission for `order_id`.
    ///
    /// At most one charge is attempted. The order is only written when the
    /// processor reports success. `Err` means the order could not be loaded
    /// or stored; every payment problem is a [`SubmissionOutcome::Failure`].
    pub async fn submit(
        &self,
        order_id: u64,
        form: &FormSubmission,
        session: &mut CheckoutSession,
    ) -> Result<SubmissionOutcome> {
        self.validate_fields(form, session);

        let mut order = self
            .order_store
            .get(order_id)
            .await?
            .ok_or(GatewayError::OrderNotFound(order_id))?;

        let request = match self.build_charge_request(&order, form) {
            Ok(request) => request,
            Err(blocked) => {
                warn!(order_id, reason = ?blocked, "submission blocked before charging");
                let message = blocked.to_string();
                session.reload_checkout = false;
                if blocked.needs_notice() {
                    session.add_error(message.clone());
                }
                return Ok(SubmissionOutcome::Failure { message });
            }
        };

        debug!(
            order_id,
            amount = request.amount,
            currency = %request.currency,
            capture = request.capture,
            "sending charge"
        );

        match self.processor.create_charge(&request).await {
            ChargeResult::Success {
                transaction_id,
                fee,
            } => {
                info!(order_id, %transaction_id, ?fee, "charge succeeded");
                order.mark_paid(transaction_id, request.capture, fee);
                let redirect = self.return_url(&order);
                self.order_store.store(order).await?;
                Ok(SubmissionOutcome::Success { redirect })
            }
            ChargeResult::Failure(failure) => {
                warn!(order_id, category = %failure.category, "charge failed: {}", failure.message);
                // Keep the page from refreshing so the notice is seen.
                session.reload_checkout = false;
                let message = format!("Error: {}", failure);
                session.add_error(message.clone());
                Ok(SubmissionOutcome::Failure { message })
            }
        }
    }

    /// Order confirmation URL for `order`.
    pub fn return_url(&self, order: &Order) -> String {
        format!(
            "{}/{}/?key={}",
            self.return_url_base.trim_end_matches('/'),
            order.id,
            order.order_key
        )
    }

    /// Parameters for the card form script. Billing details are included only
    /// when `pay_page` names an existing order with a matching key.
    pub async fn script_params(
        &self,
        customer: Option<&CustomerProfile>,
        pay_page: Option<&PayPageRequest>,
    ) -> Result<ScriptParams> {
        let order = match pay_page {
            Some(request) => self
                .order_store
                .get(request.order_id)
                .await?
                .filter(|order| order.order_key == request.order_key),
            None => None,
        };
        Ok(ScriptParams::build(&self.settings, customer, order.as_ref()))
    }

    /// Every order in the backing store.
    pub async fn orders(&self) -> Result<Vec<Order>> {
        self.order_store.get_all().await
    }

    fn build_charge_request(
        &self,
        order: &Order,
        form: &FormSubmission,
    ) -> std::result::Result<ChargeRequest, Blocked> {
        if !order.needs_payment() {
            return Err(Blocked::AlreadyPaid);
        }
        if form.form_errors {
            return Err(Blocked::FormErrors);
        }
        if form.has_field_errors() {
            return Err(Blocked::FieldErrors);
        }

        let source = form.card_source.clone().ok_or(Blocked::MissingCard)?;
        if matches!(source, CardSource::Saved { .. }) && !self.settings.saved_cards {
            return Err(Blocked::SavedCardsDisabled);
        }

        let amount = order
            .amount_minor()
            .map_err(|e| Blocked::InvalidTotal(e.to_string()))?;

        let mut metadata = BTreeMap::new();
        metadata.insert("order_id".to_string(), order.id.to_string());
        metadata.insert("order_key".to_string(), order.order_key.clone());

        Ok(ChargeRequest {
            amount,
            currency: order.currency.to_lowercase(),
            source,
            capture: self.settings.charge_type == ChargeType::Capture,
            description: format!("Order #{}", order.id),
            metadata,
            billing: form.pay_page.then(|| order.billing.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryOrderStore;
    use crate::infrastructure::simulated::SimulatedProcessor;
    use crate::domain::order::OrderStatus;
    use crate::domain::ports::OrderStore;
    use rust_decimal_macros::dec;

    async fn gateway_with(order: Order, settings: GatewaySettings) -> (PaymentGateway, SimulatedProcessor) {
        let store = InMemoryOrderStore::new();
        store.store(order).await.unwrap();
        let processor = SimulatedProcessor::new();
        let gateway = PaymentGateway::new(settings, Box::new(store), Box::new(processor.clone()));
        (gateway, processor)
    }

    #[tokio::test]
    async fn test_authorize_only_records_hold() {
        let settings = GatewaySettings {
            charge_type: ChargeType::Authorize,
            ..GatewaySettings::default()
        };
        let (gateway, processor) =
            gateway_with(Order::new(10, "wc_order_10", dec!(10.00), "USD"), settings).await;

        let mut session = CheckoutSession::new();
        let outcome = gateway
            .submit(10, &FormSubmission::with_token("tok_visa"), &mut session)
            .await
            .unwrap();

        assert!(outcome.is_success());
        let requests = processor.requests().await;
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].capture);

        let order = gateway.orders().await.unwrap().pop().unwrap();
        assert_eq!(order.payment.capture, Some(false));
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_request_carries_amount_and_metadata() {
        let (gateway, processor) = gateway_with(
            Order::new(11, "wc_order_11", dec!(42.50), "EUR"),
            GatewaySettings::default(),
        )
        .await;

        let mut session = CheckoutSession::new();
        gateway
            .submit(11, &FormSubmission::with_token("tok_visa"), &mut session)
            .await
            .unwrap();

        let request = processor.requests().await.pop().unwrap();
        assert_eq!(request.amount, 4250);
        assert_eq!(request.currency, "eur");
        assert_eq!(request.description, "Order #11");
        assert_eq!(request.metadata["order_key"], "wc_order_11");
        assert_eq!(request.billing, None);
    }

    #[tokio::test]
    async fn test_pay_page_attaches_billing() {
        let mut order = Order::new(12, "wc_order_12", dec!(5.00), "USD");
        order.billing.postcode = "90210".to_string();
        let (gateway, processor) = gateway_with(order, GatewaySettings::default()).await;

        let form = FormSubmission {
            pay_page: true,
            ..FormSubmission::with_token("tok_visa")
        };
        gateway
            .submit(12, &form, &mut CheckoutSession::new())
            .await
            .unwrap();

        let request = processor.requests().await.pop().unwrap();
        assert_eq!(request.billing.unwrap().postcode, "90210");
    }

    #[tokio::test]
    async fn test_saved_card_rejected_when_disabled() {
        let settings = GatewaySettings {
            saved_cards: false,
            ..GatewaySettings::default()
        };
        let (gateway, processor) =
            gateway_with(Order::new(13, "wc_order_13", dec!(5.00), "USD"), settings).await;

        let form = FormSubmission {
            card_source: Some(CardSource::Saved {
                customer_id: "cus_1".to_string(),
                card_id: "card_1".to_string(),
            }),
            ..FormSubmission::default()
        };
        let mut session = CheckoutSession::new();
        let outcome = gateway.submit(13, &form, &mut session).await.unwrap();

        assert!(!outcome.is_success());
        assert!(processor.requests().await.is_empty());
        assert_eq!(session.errors().count(), 1);
    }

    #[tokio::test]
    async fn test_missing_card_blocks() {
        let (gateway, processor) = gateway_with(
            Order::new(14, "wc_order_14", dec!(5.00), "USD"),
            GatewaySettings::default(),
        )
        .await;

        let mut session = CheckoutSession::new();
        let outcome = gateway
            .submit(14, &FormSubmission::default(), &mut session)
            .await
            .unwrap();

        assert_eq!(outcome.message(), Some("Please enter your card details."));
        assert!(processor.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_total_is_refused() {
        let (gateway, processor) = gateway_with(
            Order::new(17, "wc_order_17", dec!(1000000000000000000000000000), "USD"),
            GatewaySettings::default(),
        )
        .await;

        let mut session = CheckoutSession {
            reload_checkout: true,
            ..CheckoutSession::new()
        };
        let outcome = gateway
            .submit(17, &FormSubmission::with_token("tok_visa"), &mut session)
            .await
            .unwrap();

        assert_eq!(outcome.message(), Some("This order total cannot be charged."));
        assert!(processor.requests().await.is_empty());
        assert!(!session.reload_checkout);
    }

    #[tokio::test]
    async fn test_paid_order_is_not_charged_again() {
        let mut order = Order::new(15, "wc_order_15", dec!(5.00), "USD");
        order.status = OrderStatus::Processing;
        let (gateway, processor) = gateway_with(order, GatewaySettings::default()).await;

        let outcome = gateway
            .submit(15, &FormSubmission::with_token("tok_visa"), &mut CheckoutSession::new())
            .await
            .unwrap();

        assert_eq!(outcome.redirect(), None);
        assert!(processor.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_order_is_an_error() {
        let (gateway, _) = gateway_with(
            Order::new(16, "wc_order_16", dec!(5.00), "USD"),
            GatewaySettings::default(),
        )
        .await;

        let result = gateway
            .submit(999, &FormSubmission::with_token("tok_visa"), &mut CheckoutSession::new())
            .await;
        assert!(matches!(result, Err(GatewayError::OrderNotFound(999))));
    }

    #[tokio::test]
    async fn test_return_url_uses_base() {
        let (gateway, _) = gateway_with(
            Order::new(17, "wc_order_17", dec!(5.00), "USD"),
            GatewaySettings::default(),
        )
        .await;
        let gateway = gateway.with_return_url_base("https://shop.test/checkout/order-received/");
        let order = Order::new(17, "wc_order_17", dec!(5.00), "USD");

        assert_eq!(
            gateway.return_url(&order),
            "https://shop.test/checkout/order-received/17/?key=wc_order_17"
        );
    }
}
