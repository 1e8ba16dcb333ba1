//! Input validation for ledger appends.
//!
//! Every check here runs before the channel head is locked, so a rejected
//! payload never touches the chain.

use uc_types::{ActorRef, BatchId};

use crate::error::LedgerError;
use crate::records::{EconomicEvent, EconomicTx, PaymentMethod, QualityTx};

/// Maximum allowed difference between a sale's `amount` and
/// `unitsSold × salePricePerUnit`, in currency units.
pub const SALE_AMOUNT_TOLERANCE: f64 = 0.01;

/// Highest value on the quality score scale.
pub const MAX_QUALITY_SCORE: u8 = 100;

pub(crate) fn validate_submitter(submitted_by: &ActorRef) -> Result<(), LedgerError> {
    if submitted_by.id.is_blank() {
        return Err(LedgerError::invalid("submittedBy", "actor id must not be empty"));
    }
    Ok(())
}

pub(crate) fn validate_economic(tx: &EconomicTx) -> Result<(), LedgerError> {
    batch(tx.batch_id.as_ref())?;
    non_blank("product", &tx.product)?;
    non_blank("currency", &tx.currency)?;
    non_negative("amount", tx.amount)?;
    if let Some(quantity) = tx.quantity {
        non_negative("quantity", quantity)?;
    }
    if let Some(unit) = &tx.unit {
        non_blank("unit", unit)?;
    }
    if let Some(id) = &tx.from_actor_id {
        non_blank("fromActorId", id.as_str())?;
    }
    if let Some(id) = &tx.to_actor_id {
        non_blank("toActorId", id.as_str())?;
    }
    if let Some(order) = &tx.order_id {
        non_blank("orderId", order)?;
    }
    if let PaymentMethod::Other(name) = &tx.payment_method {
        non_blank("paymentMethod", name)?;
    }

    match &tx.event {
        EconomicEvent::Register {
            variety,
            farming_method,
        } => {
            non_blank("event.variety", variety)?;
            non_blank("event.farmingMethod", farming_method)?;
        }
        EconomicEvent::Pickup { vehicle_rc } => non_blank("event.vehicleRc", vehicle_rc)?,
        EconomicEvent::Dropoff | EconomicEvent::Receive => {}
        EconomicEvent::Sale {
            units_sold,
            sale_price_per_unit,
        } => {
            non_negative("event.unitsSold", *units_sold)?;
            non_negative("event.salePricePerUnit", *sale_price_per_unit)?;
            if let Some(quantity) = tx.quantity {
                if *units_sold > quantity {
                    return Err(LedgerError::invalid(
                        "event.unitsSold",
                        format!("{units_sold} exceeds quantity {quantity}"),
                    ));
                }
            }
            let expected = units_sold * sale_price_per_unit;
            if (tx.amount - expected).abs() > SALE_AMOUNT_TOLERANCE {
                return Err(LedgerError::invalid(
                    "amount",
                    format!("{} does not equal units sold × unit price ({expected})", tx.amount),
                ));
            }
        }
    }
    Ok(())
}

pub(crate) fn validate_quality(tx: &QualityTx) -> Result<(), LedgerError> {
    batch(tx.batch_id.as_ref())?;
    if tx.actor.id.is_blank() {
        return Err(LedgerError::invalid("actor", "actor id must not be empty"));
    }
    if tx.quality_score > MAX_QUALITY_SCORE {
        return Err(LedgerError::invalid(
            "qualityScore",
            format!("{} is outside 0..={MAX_QUALITY_SCORE}", tx.quality_score),
        ));
    }
    finite("moistureLevel", tx.moisture_level)?;
    if !(0.0..=100.0).contains(&tx.moisture_level) {
        return Err(LedgerError::invalid(
            "moistureLevel",
            format!("{} is not a percentage", tx.moisture_level),
        ));
    }
    finite("temperature", tx.temperature)?;
    Ok(())
}

fn batch(batch_id: Option<&BatchId>) -> Result<(), LedgerError> {
    match batch_id {
        Some(id) if id.is_blank() => Err(LedgerError::invalid("batchId", "must not be empty")),
        _ => Ok(()),
    }
}

fn non_blank(field: &str, value: &str) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        return Err(LedgerError::invalid(field, "must not be empty"));
    }
    Ok(())
}

fn finite(field: &str, value: f64) -> Result<(), LedgerError> {
    if !value.is_finite() {
        return Err(LedgerError::invalid(field, format!("{value} is not a finite number")));
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<(), LedgerError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(LedgerError::invalid(field, format!("{value} is negative")));
    }
    Ok(())
}
