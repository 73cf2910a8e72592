use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::notes::OrderNotes;

/// Where an order price was read from, in lookup priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    PaymentAmount,
    NotesTotalPrice,
    NotesCalculatedPrice,
    NotesEstimatedPrice,
    NotesPrice,
}

impl PriceSource {
    pub const PRIORITY: [PriceSource; 5] = [
        PriceSource::PaymentAmount,
        PriceSource::NotesTotalPrice,
        PriceSource::NotesCalculatedPrice,
        PriceSource::NotesEstimatedPrice,
        PriceSource::NotesPrice,
    ];

    fn read(self, payment_amount: Option<Decimal>, notes: Option<&OrderNotes>) -> Option<Decimal> {
        match self {
            Self::PaymentAmount => payment_amount,
            Self::NotesTotalPrice => notes.and_then(|notes| notes.total_price),
            Self::NotesCalculatedPrice => notes.and_then(|notes| notes.calculated_price),
            Self::NotesEstimatedPrice => notes.and_then(|notes| notes.estimated_price),
            Self::NotesPrice => notes.and_then(|notes| notes.price),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCandidate {
    pub source: PriceSource,
    pub amount: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    pub amount: Decimal,
    pub source: PriceSource,
    /// Sources consulted before `source`, with whatever value they held.
    pub skipped: Vec<PriceCandidate>,
}

/// Walks [`PriceSource::PRIORITY`] and returns the first strictly positive
/// amount. Zero and negative values are treated as unset.
pub fn resolve_order_price(
    payment_amount: Option<Decimal>,
    notes: Option<&OrderNotes>,
) -> Option<ResolvedPrice> {
    let mut skipped = Vec::new();

    for source in PriceSource::PRIORITY {
        let amount = source.read(payment_amount, notes);
        match amount {
            Some(value) if value > Decimal::ZERO => {
                return Some(ResolvedPrice { amount: value, source, skipped });
            }
            _ => skipped.push(PriceCandidate { source, amount }),
        }
    }

    None
}
