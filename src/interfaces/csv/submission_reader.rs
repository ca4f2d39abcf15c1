use crate::application::availability::Actor;
use crate::domain::checkout::{CardSource, FormSubmission};
use crate::error::{GatewayError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct SubmissionRecord {
    order_id: u64,
    #[serde(default)]
    user_id: Option<u64>,
    #[serde(default)]
    card_token: Option<String>,
    #[serde(default)]
    customer_id: Option<String>,
    #[serde(default)]
    saved_card: Option<String>,
    #[serde(default)]
    card_number_error: Option<String>,
    #[serde(default)]
    card_expiry_error: Option<String>,
    #[serde(default)]
    card_cvc_error: Option<String>,
    #[serde(default)]
    form_errors: Option<bool>,
    #[serde(default)]
    pay_page: Option<bool>,
}

/// A checkout submission as posted by the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub order_id: u64,
    pub actor: Actor,
    pub form: FormSubmission,
}

impl TryFrom<SubmissionRecord> for Submission {
    type Error = GatewayError;

    fn try_from(r: SubmissionRecord) -> Result<Self> {
        // A selected saved card wins over a fresh token.
        let card_source = match (r.saved_card, r.customer_id, r.card_token) {
            (Some(card_id), Some(customer_id), _) => Some(CardSource::Saved {
                customer_id,
                card_id,
            }),
            (Some(card_id), None, _) => {
                return Err(GatewayError::ValidationError(format!(
                    "order {}: saved card {} has no customer id",
                    r.order_id, card_id
                )));
            }
            (None, _, Some(token)) => Some(CardSource::Token(token)),
            (None, _, None) => None,
        };

        Ok(Submission {
            order_id: r.order_id,
            actor: Actor { user_id: r.user_id },
            form: FormSubmission {
                card_source,
                number_error: r.card_number_error,
                expiry_error: r.card_expiry_error,
                cvc_error: r.card_cvc_error,
                form_errors: r.form_errors.unwrap_or(false),
                pay_page: r.pay_page.unwrap_or(false),
            },
        })
    }
}

/// Reads checkout submissions from a CSV source.
pub struct SubmissionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> SubmissionReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn submissions(self) -> impl Iterator<Item = Result<Submission>> {
        self.reader
            .into_deserialize::<SubmissionRecord>()
            .map(|result| result.map_err(GatewayError::from).and_then(Submission::try_from))
    }
}
