use serde::{Deserialize, Serialize};

/// Daily rollup of the returns pipeline. One row per calendar day,
/// fully recomputable from the ledger at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMetricDto {
    /// Day in format "YYYY-MM-DD"
    pub day: String,

    /// Requests submitted that day
    #[serde(rename = "totalRequests")]
    pub total_requests: i64,

    /// Requests approved by validation that day
    #[serde(rename = "approvedCount")]
    pub approved_count: i64,

    /// Requests rejected by validation that day
    #[serde(rename = "rejectedCount")]
    pub rejected_count: i64,

    /// Requests completed that day
    #[serde(rename = "completedCount")]
    pub completed_count: i64,

    /// Requests cancelled that day
    #[serde(rename = "cancelledCount")]
    pub cancelled_count: i64,

    // Counts by inspection result among requests inspected that day
    #[serde(rename = "defectiveCount")]
    pub defective_count: i64,
    #[serde(rename = "damagedCount")]
    pub damaged_count: i64,
    #[serde(rename = "noFaultCount")]
    pub no_fault_count: i64,
    #[serde(rename = "wrongItemCount")]
    pub wrong_item_count: i64,

    /// Sum of refunds completed that day, in cents
    #[serde(rename = "refundedCents")]
    pub refunded_cents: i64,

    /// Mean hours from submission to the validation verdict, over requests
    /// decided that day
    #[serde(rename = "avgValidationHours")]
    pub avg_validation_hours: Option<f64>,

    /// Mean hours from warehouse receipt to the inspection verdict, over
    /// requests inspected that day
    #[serde(rename = "avgInspectionHours")]
    pub avg_inspection_hours: Option<f64>,

    /// Mean hours from submission to close, over requests closed that day
    #[serde(rename = "avgCycleHours")]
    pub avg_cycle_hours: Option<f64>,

    /// When this row was last recomputed
    #[serde(rename = "computedAt")]
    pub computed_at: String,
}
