//! Wire shape of `GET /api/orders/{number}` responses.

use serde::Deserialize;

use crate::domain::ports::{AccrualLookup, PendingStatus};
use crate::domain::{AccrualUpdate, OrderNumber, Points};

#[derive(Debug, Deserialize)]
pub(super) struct AccrualResponseDto {
    pub(super) order: String,
    pub(super) status: String,
    #[serde(default)]
    pub(super) accrual: Option<f64>,
}

impl AccrualResponseDto {
    /// Classify the body for `requested`. Errors are decode messages.
    pub(super) fn into_lookup(self, requested: &OrderNumber) -> Result<AccrualLookup, String> {
        if self.order.trim() != requested.as_str() {
            return Err(format!(
                "response for order {} does not match requested order {requested}",
                self.order
            ));
        }

        match self.status.as_str() {
            "REGISTERED" => Ok(AccrualLookup::Pending {
                status: PendingStatus::Registered,
            }),
            "PROCESSING" => Ok(AccrualLookup::Pending {
                status: PendingStatus::Processing,
            }),
            "INVALID" => Ok(AccrualLookup::Terminal(AccrualUpdate::invalid(
                requested.clone(),
            ))),
            "PROCESSED" => {
                let accrual = match self.accrual {
                    None => Points::ZERO,
                    Some(value) if value < 0.0 => {
                        return Err(format!("negative accrual {value}"));
                    }
                    Some(value) => Points::try_from_decimal(value)
                        .map_err(|err| format!("unusable accrual {value}: {err}"))?,
                };
                Ok(AccrualLookup::Terminal(AccrualUpdate::processed(
                    requested.clone(),
                    accrual,
                )))
            }
            other => Err(format!("unknown accrual status {other}")),
        }
    }
}
