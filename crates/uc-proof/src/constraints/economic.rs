use crate::claim::{round_to, Checklist, Claim, ClaimDetail, Violation};
use crate::config::EconomicBounds;
use crate::payload::{EconomicPayload, ProofType};

pub const NON_NEGATIVE: &str = "non_negative";
pub const QUANTITY_WITHIN_STOCK: &str = "quantity_within_stock";
pub const PAYMENT_RECONCILED: &str = "payment_reconciled";

pub fn evaluate(payload: &EconomicPayload, bounds: &EconomicBounds) -> (Claim, Option<Violation>) {
    let mut checks = Checklist::new(ProofType::Economic);

    let amounts = [
        ("paymentAmount", payload.payment_amount),
        ("unitPrice", payload.unit_price),
        ("soldQuantity", payload.sold_quantity),
        ("totalQuantity", payload.total_quantity),
    ];
    checks.record(
        NON_NEGATIVE,
        match amounts.iter().find(|(_, v)| *v < 0.0) {
            Some((name, value)) => Err(format!("{name} is negative ({value})")),
            None => Ok(()),
        },
    );

    checks.record(
        QUANTITY_WITHIN_STOCK,
        if payload.sold_quantity > payload.total_quantity {
            Err(format!(
                "sold {} exceeds stock {}",
                payload.sold_quantity, payload.total_quantity
            ))
        } else {
            Ok(())
        },
    );

    let expected = payload.sold_quantity * payload.unit_price;
    let difference = (payload.payment_amount - expected).abs();
    checks.record(
        PAYMENT_RECONCILED,
        if difference > bounds.tolerance {
            Err(format!(
                "payment {} differs from {} × {} = {expected} by {difference}",
                payload.payment_amount, payload.sold_quantity, payload.unit_price
            ))
        } else {
            Ok(())
        },
    );

    let sell_through = if payload.total_quantity > 0.0 {
        round_to(payload.sold_quantity / payload.total_quantity, 4)
    } else {
        0.0
    };
    checks.finish(ClaimDetail::Economic { sell_through })
}
