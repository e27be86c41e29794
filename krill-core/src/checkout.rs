//! Checkout flow
//!
//! Builds the order payload from the session, computes the amounts the
//! checkout page shows, and drives order placement through the gateway
//! behind an [`ActionFlow`] guard. Before an order exists the amounts
//! come from the cart and the store's tax configuration; once an order
//! id is known the server's order record is the source of truth.

use crate::flow::{ActionFlow, FlowError};
use crate::pricing::{format_amount, line_total};
use crate::session::service::{SessionError, SessionService};
use crate::session::state::StoreSession;
use crate::traits::{BotVerifier, GatewayError, OrderGateway, VerifierError};
use serde::{Deserialize, Serialize};
use shared::models::cart::SelectedCustomization;
use shared::models::order::{Order, OrderStatus, OrderType};
use shared::models::store::TaxInfo;
use shared::response::PlacedOrder;
use shared::types::{Language, LocalizedText};
use thiserror::Error;

/// Per-transaction service fee for online payments
pub fn service_fee(currency: &str) -> f64 {
    if currency.eq_ignore_ascii_case("eur") {
        0.25
    } else {
        0.30
    }
}

/// Checkout flow errors
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Non-in-store orders need a deliverable email address
    #[error("Email address required")]
    EmailRequired,

    #[error("Donation amount cannot be negative")]
    NegativeDonation,

    /// Bot verification did not produce a token; the action aborts
    /// silently (no popup) but must not stay in flight
    #[error(transparent)]
    Verification(#[from] VerifierError),

    /// The server answered and refused the order
    #[error("Order rejected: {0}")]
    Rejected(String),

    /// Transport failure before an answer
    #[error("Order submission failed: {0}")]
    Submit(String),

    #[error(transparent)]
    Busy(#[from] FlowError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl CheckoutError {
    /// Translation key of the popup for this failure, `None` when the
    /// failure is silent (re-entrant trigger, verification abort)
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            CheckoutError::EmailRequired => Some("checkout.emailRequired"),
            CheckoutError::NegativeDonation => Some("donation.errorNegativeAmount"),
            CheckoutError::Rejected(_)
            | CheckoutError::Submit(_)
            | CheckoutError::Session(_) => Some("cart.orderFailed"),
            CheckoutError::Verification(_) | CheckoutError::Busy(_) => None,
        }
    }
}

/// Amounts displayed on the checkout page
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSummary {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub service_fee: f64,
    pub donation: f64,
}

impl CheckoutSummary {
    /// Amounts before the order reaches the server: derived from the
    /// cart subtotal and the store's tax configuration
    pub fn from_cart(session: &StoreSession, tax_info: &TaxInfo) -> Self {
        let subtotal = session.sub_total;
        let tax = subtotal * tax_info.tax_rate;
        let total = if tax_info.tax_included {
            subtotal
        } else {
            subtotal + tax
        };
        Self {
            subtotal,
            tax,
            total,
            service_fee: 0.0,
            donation: 0.0,
        }
    }

    /// Amounts once an order exists: the server record is truth and
    /// the subtotal is back-computed from it
    pub fn from_order(order: &Order, tax_info: &TaxInfo) -> Self {
        let tax = order.tax_amount;
        let total = order.total_amount;
        let subtotal = if tax_info.tax_included {
            total
        } else {
            total - tax
        };
        Self {
            subtotal,
            tax,
            total,
            service_fee: order.service_fee_surcharge.unwrap_or(0.0),
            donation: order.donation_surcharge.unwrap_or(0.0),
        }
    }

    /// Final amount charged, surcharges included
    pub fn grand_total(&self) -> f64 {
        self.total + self.service_fee + self.donation
    }
}

/// One line of the order payload; `price` is the unit price with
/// customization surcharges folded in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLine {
    pub id: String,
    pub name: LocalizedText,
    pub quantity: u32,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_customizations: Vec<SelectedCustomization>,
}

/// The `order_info` payload submitted to the order and payment
/// endpoints; amounts are pre-formatted 2-decimal strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub lang: Language,
    pub store_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub order_items: Vec<DraftLine>,
    pub total_amount: String,
    pub tax_amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation_surcharge: Option<String>,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
}

impl OrderDraft {
    /// Build the payload from the current session snapshot
    pub fn build(
        lang: Language,
        store_id: &str,
        session: &StoreSession,
        tax_info: &TaxInfo,
        notes: &str,
    ) -> Self {
        let summary = CheckoutSummary::from_cart(session, tax_info);
        let order_items = session
            .cart_items
            .iter()
            .map(|line| DraftLine {
                id: line.id.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                price: line_total(line.price, 1, &line.selected_customizations),
                selected_customizations: line.selected_customizations.clone(),
            })
            .collect();

        Self {
            lang,
            store_id: store_id.to_string(),
            order_id: session.order_id.clone(),
            order_type: session.order_type,
            table_code: session.table_code.clone(),
            email: None,
            order_items,
            total_amount: format_amount(summary.total),
            tax_amount: format_amount(summary.tax),
            donation_surcharge: None,
            notes: notes.to_string(),
            return_url: None,
        }
    }

    /// Attach the buyer's email; required (and validated) for every
    /// mode except in-store
    pub fn with_email(mut self, email: &str) -> Result<Self, CheckoutError> {
        if self.order_type == OrderType::InStore {
            self.email = None;
            return Ok(self);
        }
        if email.is_empty() || !email.contains('@') {
            return Err(CheckoutError::EmailRequired);
        }
        self.email = Some(email.to_string());
        Ok(self)
    }

    /// Attach a voluntary donation surcharge
    pub fn with_donation(mut self, amount: f64) -> Result<Self, CheckoutError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(CheckoutError::NegativeDonation);
        }
        self.donation_surcharge = Some(format_amount(amount));
        Ok(self)
    }

    /// Where the payment provider should send the browser back to
    pub fn with_return_url(mut self, url: &str) -> Self {
        self.return_url = Some(url.to_string());
        self
    }
}

/// Relative endpoint for the redirect-based payment submit
pub fn payment_endpoint(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::InStore => "orders_new/pay",
        _ => "orders_new/order-pay",
    }
}

/// Hidden form fields of the payment submit
///
/// Every mode carries the JSON-encoded `order_info`; modes paying
/// ahead also carry the bot verification token.
pub fn payment_fields(
    draft: &OrderDraft,
    verification_token: &str,
) -> Result<Vec<(String, String)>, serde_json::Error> {
    let mut fields = vec![("order_info".to_string(), serde_json::to_string(draft)?)];
    if draft.order_type != OrderType::InStore {
        fields.push(("recaptcha_token".to_string(), verification_token.to_string()));
    }
    Ok(fields)
}

/// Place the order upstream
///
/// Acquires the flow guard (rejecting a re-entrant trigger), obtains a
/// bot verification token, submits, and on success clears the cart and
/// records the pending order against the session. Every failure path
/// settles the guard, so the processing state can never stay stuck.
pub async fn place_order(
    service: &SessionService,
    store_id: &str,
    flow: &ActionFlow,
    verifier: &dyn BotVerifier,
    gateway: &dyn OrderGateway,
    draft: &OrderDraft,
) -> Result<PlacedOrder, CheckoutError> {
    let guard = flow.begin()?;

    let token = match verifier.token("place_order").await {
        Ok(token) => token,
        Err(e) => {
            guard.fail(e.to_string());
            return Err(e.into());
        }
    };

    match gateway.place_order(draft, &token).await {
        Ok(placed) => {
            service.clear_cart(store_id)?;
            service.set_order_status(store_id, Some(OrderStatus::Pending))?;
            service.set_order_id(store_id, Some(&placed.id))?;
            service.set_order_number(store_id, Some(&placed.order_number))?;
            tracing::info!(
                store_id = %store_id,
                order_number = %placed.order_number,
                "Order placed"
            );
            guard.succeed();
            Ok(placed)
        }
        Err(GatewayError::Rejected(message)) => {
            tracing::warn!(store_id = %store_id, error = %message, "Order rejected");
            guard.fail(message.clone());
            Err(CheckoutError::Rejected(message))
        }
        Err(GatewayError::Unavailable(message)) => {
            guard.fail(message.clone());
            Err(CheckoutError::Submit(message))
        }
    }
}

/// Whether leaving the checkout page needs a confirmation popup
///
/// Blocked once the order is paid, or pending for a mode where the
/// mail-based handoff replaces the in-store cashier.
pub fn should_block_navigation(status: Option<&OrderStatus>, order_type: OrderType) -> bool {
    match status {
        Some(OrderStatus::Completed) => true,
        Some(OrderStatus::Pending) => order_type != OrderType::InStore,
        _ => false,
    }
}

/// Confirmed navigation away from a blocked checkout: drop the table
/// binding, reset the mode and empty the cart
pub fn abandon_order(service: &SessionService, store_id: &str) -> Result<(), SessionError> {
    service.clear_table(store_id)?;
    service.set_order_type(store_id, OrderType::NotSelected)?;
    service.clear_cart(store_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowState;
    use crate::session::persistence::MemoryBackend;
    use async_trait::async_trait;
    use shared::models::cart::{CartLine, SelectedOption};
    use shared::types::LocalizedText;

    struct FixedGateway {
        result: Result<PlacedOrder, GatewayError>,
    }

    #[async_trait]
    impl OrderGateway for FixedGateway {
        async fn place_order(
            &self,
            _draft: &OrderDraft,
            _token: &str,
        ) -> Result<PlacedOrder, GatewayError> {
            match &self.result {
                Ok(placed) => Ok(placed.clone()),
                Err(GatewayError::Rejected(m)) => Err(GatewayError::Rejected(m.clone())),
                Err(GatewayError::Unavailable(m)) => Err(GatewayError::Unavailable(m.clone())),
            }
        }
    }

    struct OkVerifier;

    #[async_trait]
    impl BotVerifier for OkVerifier {
        async fn token(&self, _action: &str) -> Result<String, VerifierError> {
            Ok("tok".to_string())
        }
    }

    struct DownVerifier;

    #[async_trait]
    impl BotVerifier for DownVerifier {
        async fn token(&self, _action: &str) -> Result<String, VerifierError> {
            Err(VerifierError::Unavailable("not loaded".to_string()))
        }
    }

    fn session_with_cart() -> (SessionService, StoreSession) {
        let svc = SessionService::in_memory(MemoryBackend::shared());
        svc.select_store("s1").unwrap();
        let line = CartLine::new("a", LocalizedText::en("Tea"), 5.0)
            .with_quantity(2)
            .with_customizations(vec![SelectedCustomization {
                index: 0,
                name: LocalizedText::en("Size"),
                selected_options: vec![SelectedOption {
                    index: 0,
                    name: LocalizedText::en("Large"),
                    price: Some(1.0),
                }],
            }]);
        svc.add_to_cart("s1", &line).unwrap();
        let session = svc.store_session("s1").unwrap();
        (svc, session)
    }

    fn tax(rate: f64, included: bool) -> TaxInfo {
        TaxInfo {
            tax_rate: rate,
            tax_included: included,
        }
    }

    // ==================== Summary math ====================

    #[test]
    fn test_summary_tax_excluded() {
        let (_, session) = session_with_cart();
        // (5.00 + 1.00) * 2 = 12.00
        let summary = CheckoutSummary::from_cart(&session, &tax(0.1, false));
        assert_eq!(summary.subtotal, 12.0);
        assert!((summary.tax - 1.2).abs() < 1e-9);
        assert!((summary.total - 13.2).abs() < 1e-9);
    }

    #[test]
    fn test_summary_tax_included() {
        let (_, session) = session_with_cart();
        let summary = CheckoutSummary::from_cart(&session, &tax(0.21, true));
        assert_eq!(summary.subtotal, 12.0);
        assert_eq!(summary.total, 12.0);
    }

    #[test]
    fn test_summary_from_order_record() {
        let order = Order {
            total_amount: 26.4,
            tax_amount: 2.4,
            service_fee_surcharge: Some(0.3),
            donation_surcharge: Some(1.0),
            ..Order::default()
        };
        let summary = CheckoutSummary::from_order(&order, &tax(0.1, false));
        assert!((summary.subtotal - 24.0).abs() < 1e-9);
        assert!((summary.grand_total() - 27.7).abs() < 1e-9);
    }

    #[test]
    fn test_service_fee_by_currency() {
        assert_eq!(service_fee("eur"), 0.25);
        assert_eq!(service_fee("EUR"), 0.25);
        assert_eq!(service_fee("usd"), 0.30);
        assert_eq!(service_fee(""), 0.30);
    }

    // ==================== Draft building ====================

    #[test]
    fn test_draft_uses_unit_prices_with_customizations() {
        let (_, session) = session_with_cart();
        let draft = OrderDraft::build(Language::En, "s1", &session, &tax(0.1, false), "no ice");

        assert_eq!(draft.order_items.len(), 1);
        let line = &draft.order_items[0];
        assert_eq!(line.quantity, 2);
        assert_eq!(line.price, 6.0);
        assert_eq!(draft.total_amount, "13.20");
        assert_eq!(draft.tax_amount, "1.20");
        assert_eq!(draft.notes, "no ice");
        assert!(draft.email.is_none());
    }

    #[test]
    fn test_email_required_outside_in_store() {
        let (svc, _) = session_with_cart();
        svc.set_order_type("s1", OrderType::Pickup).unwrap();
        let session = svc.store_session("s1").unwrap();
        let draft = OrderDraft::build(Language::En, "s1", &session, &tax(0.0, false), "");

        assert!(matches!(
            draft.clone().with_email(""),
            Err(CheckoutError::EmailRequired)
        ));
        assert!(matches!(
            draft.clone().with_email("nobody"),
            Err(CheckoutError::EmailRequired)
        ));
        let draft = draft.with_email("a@b.c").unwrap();
        assert_eq!(draft.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_email_ignored_for_in_store() {
        let (svc, _) = session_with_cart();
        svc.set_order_type("s1", OrderType::InStore).unwrap();
        let session = svc.store_session("s1").unwrap();
        let draft = OrderDraft::build(Language::En, "s1", &session, &tax(0.0, false), "")
            .with_email("")
            .unwrap();
        assert!(draft.email.is_none());
    }

    #[test]
    fn test_donation_validation() {
        let (_, session) = session_with_cart();
        let draft = OrderDraft::build(Language::En, "s1", &session, &tax(0.0, false), "");

        assert!(matches!(
            draft.clone().with_donation(-1.0),
            Err(CheckoutError::NegativeDonation)
        ));
        assert!(matches!(
            draft.clone().with_donation(f64::NAN),
            Err(CheckoutError::NegativeDonation)
        ));
        let draft = draft.with_donation(2.5).unwrap();
        assert_eq!(draft.donation_surcharge.as_deref(), Some("2.50"));
    }

    // ==================== Payment form ====================

    #[test]
    fn test_payment_form_selection() {
        let (svc, _) = session_with_cart();

        svc.set_order_type("s1", OrderType::InStore).unwrap();
        let session = svc.store_session("s1").unwrap();
        let draft = OrderDraft::build(Language::En, "s1", &session, &tax(0.0, false), "");
        assert_eq!(payment_endpoint(draft.order_type), "orders_new/pay");
        let fields = payment_fields(&draft, "tok").unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0, "order_info");

        svc.set_order_type("s1", OrderType::Pickup).unwrap();
        let session = svc.store_session("s1").unwrap();
        let draft = OrderDraft::build(Language::En, "s1", &session, &tax(0.0, false), "");
        assert_eq!(payment_endpoint(draft.order_type), "orders_new/order-pay");
        let fields = payment_fields(&draft, "tok").unwrap();
        assert_eq!(fields[1], ("recaptcha_token".to_string(), "tok".to_string()));
    }

    // ==================== Placement ====================

    #[tokio::test]
    async fn test_place_order_success_updates_session() {
        let (svc, session) = session_with_cart();
        let flow = ActionFlow::new();
        let draft = OrderDraft::build(Language::En, "s1", &session, &tax(0.1, false), "");
        let gateway = FixedGateway {
            result: Ok(PlacedOrder {
                id: "o1".to_string(),
                order_number: "17".to_string(),
            }),
        };

        let placed = place_order(&svc, "s1", &flow, &OkVerifier, &gateway, &draft)
            .await
            .unwrap();
        assert_eq!(placed.order_number, "17");

        let session = svc.store_session("s1").unwrap();
        assert!(session.cart_items.is_empty());
        assert_eq!(session.order_status, Some(OrderStatus::Pending));
        assert_eq!(session.order_id.as_deref(), Some("o1"));
        assert_eq!(session.order_number.as_deref(), Some("17"));
        assert_eq!(flow.state(), FlowState::Succeeded);
    }

    #[tokio::test]
    async fn test_rejection_keeps_cart_and_releases_flow() {
        let (svc, session) = session_with_cart();
        let flow = ActionFlow::new();
        let draft = OrderDraft::build(Language::En, "s1", &session, &tax(0.0, false), "");
        let gateway = FixedGateway {
            result: Err(GatewayError::Rejected("Store is closed".to_string())),
        };

        let err = place_order(&svc, "s1", &flow, &OkVerifier, &gateway, &draft)
            .await
            .unwrap_err();
        assert_eq!(err.message_key(), Some("cart.orderFailed"));

        let session = svc.store_session("s1").unwrap();
        assert_eq!(session.cart_items.len(), 1);
        assert!(session.order_id.is_none());
        assert!(!flow.is_in_flight());
    }

    #[tokio::test]
    async fn test_verifier_down_aborts_without_stuck_flag() {
        let (svc, session) = session_with_cart();
        let flow = ActionFlow::new();
        let draft = OrderDraft::build(Language::En, "s1", &session, &tax(0.0, false), "");
        let gateway = FixedGateway {
            result: Ok(PlacedOrder::default()),
        };

        let err = place_order(&svc, "s1", &flow, &DownVerifier, &gateway, &draft)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Verification(_)));
        assert_eq!(err.message_key(), None);
        assert!(!flow.is_in_flight());

        // The next attempt is not blocked
        assert!(flow.begin().is_ok());
    }

    #[tokio::test]
    async fn test_reentrant_placement_rejected() {
        let (svc, session) = session_with_cart();
        let flow = ActionFlow::new();
        let draft = OrderDraft::build(Language::En, "s1", &session, &tax(0.0, false), "");
        let gateway = FixedGateway {
            result: Ok(PlacedOrder::default()),
        };

        let _held = flow.begin().unwrap();
        let err = place_order(&svc, "s1", &flow, &OkVerifier, &gateway, &draft)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Busy(FlowError::Busy)));
    }

    // ==================== Navigation ====================

    #[test]
    fn test_navigation_block_rule() {
        use OrderStatus::*;
        assert!(should_block_navigation(Some(&Completed), OrderType::Pickup));
        assert!(should_block_navigation(Some(&Completed), OrderType::InStore));
        assert!(should_block_navigation(Some(&Pending), OrderType::Pickup));
        assert!(!should_block_navigation(Some(&Pending), OrderType::InStore));
        assert!(!should_block_navigation(None, OrderType::Pickup));
        assert!(!should_block_navigation(
            Some(&Other("Refunded".to_string())),
            OrderType::Pickup
        ));
    }

    #[test]
    fn test_abandon_order_resets_table_mode_and_cart() {
        let (svc, _) = session_with_cart();
        svc.set_order_type("s1", OrderType::InStore).unwrap();
        svc.set_table("s1", "12", "T12").unwrap();
        svc.set_order_id("s1", Some("o1")).unwrap();

        abandon_order(&svc, "s1").unwrap();

        let session = svc.store_session("s1").unwrap();
        assert!(session.cart_items.is_empty());
        assert_eq!(session.order_type, OrderType::NotSelected);
        assert!(!session.has_table());
        // The order reference itself survives; the server still knows it
        assert_eq!(session.order_id.as_deref(), Some("o1"));
    }
}
