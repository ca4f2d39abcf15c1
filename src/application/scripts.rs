//! Client-side scripts the checkout page loads, and the parameters handed to
//! the card form script.

use crate::config::GatewaySettings;
use crate::domain::order::Order;
use serde::Serialize;

pub const PROCESSOR_JS_URL: &str = "https://js.stripe.com/v2/";
pub const FORM_SCRIPT_HANDLE: &str = "cardgate_js";
pub const FORM_SCRIPT_VERSION: &str = "1.36";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptAsset {
    pub handle: &'static str,
    pub src: String,
    pub deps: Vec<&'static str>,
    pub version: &'static str,
    pub in_footer: bool,
}

/// Processor library first, then the form script depending on it.
pub fn client_scripts(assets_base: &str) -> Vec<ScriptAsset> {
    vec![
        ScriptAsset {
            handle: "stripe",
            src: PROCESSOR_JS_URL.to_string(),
            deps: vec![],
            version: "2.0",
            in_footer: true,
        },
        ScriptAsset {
            handle: FORM_SCRIPT_HANDLE,
            src: format!("{}/assets/js/cardgate.min.js", assets_base.trim_end_matches('/')),
            deps: vec!["stripe", "wc-credit-card-form"],
            version: FORM_SCRIPT_VERSION,
            in_footer: true,
        },
    ]
}

/// Saved processor customer data for the signed-in user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerProfile {
    pub customer_id: String,
    pub cards: Vec<String>,
}

/// Identifies the order on the pay page, as taken from the request.
#[derive(Debug, Clone, PartialEq)]
pub struct PayPageRequest {
    pub order_id: u64,
    pub order_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptParams {
    pub publishable_key: String,
    pub saved_cards_enabled: bool,
    /// Render the name-on-card and ZIP inputs.
    pub additional_fields: bool,
    pub has_card: bool,
    #[serde(flatten)]
    pub billing: Option<BillingParams>,
}

/// Billing details the processor needs when tokenizing on the pay page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BillingParams {
    pub billing_name: String,
    pub billing_address_1: String,
    pub billing_address_2: String,
    pub billing_city: String,
    pub billing_state: String,
    pub billing_postcode: String,
    pub billing_country: String,
}

impl From<&Order> for BillingParams {
    fn from(order: &Order) -> Self {
        let b = &order.billing;
        Self {
            billing_name: b.full_name(),
            billing_address_1: b.address_1.clone(),
            billing_address_2: b.address_2.clone(),
            billing_city: b.city.clone(),
            billing_state: b.state.clone(),
            billing_postcode: b.postcode.clone(),
            billing_country: b.country.clone(),
        }
    }
}

impl ScriptParams {
    /// `pay_page_order` must already be checked against the request's order key.
    pub fn build(
        settings: &GatewaySettings,
        customer: Option<&CustomerProfile>,
        pay_page_order: Option<&Order>,
    ) -> Self {
        Self {
            publishable_key: settings.credentials().publishable_key.clone(),
            saved_cards_enabled: settings.saved_cards,
            additional_fields: settings.additional_fields,
            has_card: customer.is_some_and(|c| !c.cards.is_empty()),
            billing: pay_page_order.map(BillingParams::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_client_scripts_order() {
        let scripts = client_scripts("https://shop.test/plugins/cardgate/");
        assert_eq!(scripts[0].src, PROCESSOR_JS_URL);
        assert_eq!(
            scripts[1].src,
            "https://shop.test/plugins/cardgate/assets/js/cardgate.min.js"
        );
        assert!(scripts[1].deps.contains(&"stripe"));
    }

    #[test]
    fn test_params_without_pay_page() {
        let mut settings = GatewaySettings::default();
        settings.live_credentials.publishable_key = "pk_live_1".to_string();
        let customer = CustomerProfile {
            customer_id: "cus_1".to_string(),
            cards: vec!["card_1".to_string()],
        };

        let params = ScriptParams::build(&settings, Some(&customer), None);
        let json = serde_json::to_value(&params).unwrap();

        assert_eq!(json["publishableKey"], "pk_live_1");
        assert_eq!(json["savedCardsEnabled"], true);
        assert_eq!(json["additionalFields"], false);
        assert_eq!(json["hasCard"], true);
        assert!(json.get("billing_name").is_none());
    }

    #[test]
    fn test_params_expose_additional_fields() {
        let settings = GatewaySettings {
            additional_fields: true,
            ..GatewaySettings::default()
        };

        let json = serde_json::to_value(ScriptParams::build(&settings, None, None)).unwrap();
        assert_eq!(json["additionalFields"], true);
    }

    #[test]
    fn test_params_with_pay_page_billing() {
        let mut order = Order::new(5, "wc_order_5", dec!(12.00), "USD");
        order.billing.first_name = "Ada".to_string();
        order.billing.last_name = "Lovelace".to_string();
        order.billing.city = "London".to_string();

        let params = ScriptParams::build(&GatewaySettings::default(), None, Some(&order));
        let json = serde_json::to_value(&params).unwrap();

        assert_eq!(json["hasCard"], false);
        assert_eq!(json["billing_name"], "Ada Lovelace");
        assert_eq!(json["billing_city"], "London");
    }
}
