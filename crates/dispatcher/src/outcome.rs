use tradeengine_core::OrderId;

/// `simulated` covers resting orders (NEW/PARTIALLY_FILLED) the venue has
/// accepted but not yet fully worked; `executed` is a full, immediate fill.
/// The distilled contract names both without drawing this line, so it is
/// drawn here: whichever the reference adapter reports back for a given
/// order type decides which of the two a caller sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Executed,
    Simulated,
    RejectedByRisk,
    RejectedByValidation,
    Filtered,
    Failed,
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub status: DispatchStatus,
    pub order_id: Option<OrderId>,
    pub reason: Option<String>,
}

impl DispatchOutcome {
    pub fn filtered() -> Self {
        Self { status: DispatchStatus::Filtered, order_id: None, reason: None }
    }

    pub fn rejected_by_validation(reason: impl Into<String>) -> Self {
        Self { status: DispatchStatus::RejectedByValidation, order_id: None, reason: Some(reason.into()) }
    }

    pub fn rejected_by_risk(reason: impl Into<String>) -> Self {
        Self { status: DispatchStatus::RejectedByRisk, order_id: None, reason: Some(reason.into()) }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self { status: DispatchStatus::Failed, order_id: None, reason: Some(reason.into()) }
    }
}
