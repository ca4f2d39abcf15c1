//! Card form state submitted with a checkout request, and the notices the
//! checkout page shows back to the customer.

use serde::Serialize;

/// The card fields that the client-side form validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Number,
    Expiry,
    Cvc,
}

impl CardField {
    pub const ALL: [CardField; 3] = [CardField::Number, CardField::Expiry, CardField::Cvc];

    /// Form input name carrying this field's error marker.
    pub fn input_name(&self) -> &'static str {
        match self {
            CardField::Number => "card-number",
            CardField::Expiry => "card-expiry",
            CardField::Cvc => "card-cvc",
        }
    }

    /// Customer-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            CardField::Number => "Credit Card Number",
            CardField::Expiry => "Credit Card Expiration",
            CardField::Cvc => "Credit Card CVC",
        }
    }
}

/// Where the funds come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardSource {
    /// Single-use token created by the processor's client library.
    Token(String),
    /// A card previously saved on a processor customer.
    Saved { customer_id: String, card_id: String },
}

/// Card data posted with one checkout submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSubmission {
    pub card_source: Option<CardSource>,
    pub number_error: Option<String>,
    pub expiry_error: Option<String>,
    pub cvc_error: Option<String>,
    /// Set by the client script when it refused to tokenize the card.
    pub form_errors: bool,
    /// Submitted from the order pay page rather than the checkout.
    pub pay_page: bool,
}

impl FormSubmission {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            card_source: Some(CardSource::Token(token.into())),
            ..Default::default()
        }
    }

    /// Error marker attached to `field`, if it is non-empty.
    pub fn field_error(&self, field: CardField) -> Option<&str> {
        let marker = match field {
            CardField::Number => &self.number_error,
            CardField::Expiry => &self.expiry_error,
            CardField::Cvc => &self.cvc_error,
        };
        marker.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    pub fn set_field_error(&mut self, field: CardField, category: impl Into<String>) {
        let category = Some(category.into());
        match field {
            CardField::Number => self.number_error = category,
            CardField::Expiry => self.expiry_error = category,
            CardField::Cvc => self.cvc_error = category,
        }
    }

    pub fn has_field_errors(&self) -> bool {
        CardField::ALL.iter().any(|f| self.field_error(*f).is_some())
    }
}

/// Message text for a field rejected by client-side validation.
pub fn field_error_message(field: CardField, category: &str) -> String {
    let label = field.label();
    match category {
        "undefined" => format!("The {} field is required.", label),
        "invalid" => format!("The {} you entered is invalid.", label),
        "incomplete" => format!("The {} you entered is incomplete.", label),
        "expired" => format!("The {} you entered has expired.", label),
        other => format!("The {} was rejected ({}).", label, other),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Per-request checkout state shared with the host page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutSession {
    /// When set, the checkout page refreshes instead of rendering notices.
    pub reload_checkout: bool,
    pub notices: Vec<Notice>,
}

impl CheckoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.notices.push(Notice::error(message));
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.message.as_str())
    }
}
