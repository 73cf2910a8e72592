use ordertrack_core::{resolve_order_price, ApplicationError, OrderNotes, ResolvedPrice};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commands::{parse_json, read_input, render_payload, CommandResult};

#[derive(Debug, Deserialize)]
struct PriceInput {
    #[serde(default, alias = "paymentAmount")]
    payment_amount: Option<Decimal>,
    /// Object or encoded string; validated by [`OrderNotes::from_value`].
    #[serde(default)]
    notes: Option<Value>,
}

#[derive(Debug, Serialize)]
struct PriceOutput {
    command: &'static str,
    status: &'static str,
    #[serde(flatten)]
    price: ResolvedPrice,
}

pub fn run(input: &str) -> CommandResult {
    match resolve(input) {
        Ok(Some(price)) => {
            render_payload("price", &PriceOutput { command: "price", status: "ok", price }, false)
        }
        Ok(None) => CommandResult::success(
            "price",
            "no positive amount in payment_amount or notes price fields",
        ),
        Err(error) => CommandResult::from_error("price", &error),
    }
}

fn resolve(input: &str) -> Result<Option<ResolvedPrice>, ApplicationError> {
    let raw = read_input(input)?;
    let request: PriceInput = parse_json(input, &raw)?;
    let notes = request.notes.map(OrderNotes::from_value).transpose()?;

    Ok(resolve_order_price(request.payment_amount, notes.as_ref()))
}
