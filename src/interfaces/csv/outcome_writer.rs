use crate::application::gateway::SubmissionOutcome;
use crate::domain::checkout::CheckoutSession;
use crate::domain::order::Order;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct OutcomeRecord<'a> {
    order_id: u64,
    result: &'static str,
    redirect: &'a str,
    notices: String,
}

#[derive(Debug, Serialize)]
struct OrderStateRecord<'a> {
    id: u64,
    status: &'static str,
    transaction_id: &'a str,
    capture: &'static str,
    fee: &'a str,
}

/// Writes submission outcomes as CSV, one row per submission.
///
/// Every error notice of the submission is joined into the `notices` column.
pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_outcome(
        &mut self,
        order_id: u64,
        outcome: &SubmissionOutcome,
        session: &CheckoutSession,
    ) -> Result<()> {
        self.writer.serialize(OutcomeRecord {
            order_id,
            result: if outcome.is_success() {
                "success"
            } else {
                "failure"
            },
            redirect: outcome.redirect().unwrap_or(""),
            notices: session.errors().collect::<Vec<_>>().join(" | "),
        })?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the payment state of orders as CSV.
pub fn write_orders<W: Write>(sink: W, orders: &[Order]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    for order in orders {
        writer.serialize(OrderStateRecord {
            id: order.id,
            status: order.status.as_str(),
            transaction_id: order.payment.transaction_id.as_deref().unwrap_or(""),
            capture: match order.payment.capture {
                Some(true) => "true",
                Some(false) => "false",
                None => "",
            },
            fee: order.payment.processor_fee.as_deref().unwrap_or(""),
        })?;
    }
    writer.flush()?;
    Ok(())
}
