//! Fee model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fee charged to the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    pub id: i64,
    #[serde(deserialize_with = "super::deserialize_amount")]
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
}

/// Sum of unpaid fees
pub fn outstanding_total(fees: &[Fee]) -> f64 {
    fees.iter().filter(|fee| !fee.is_paid).map(|fee| fee.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outstanding_total_ignores_paid_fees() {
        let fees: Vec<Fee> = serde_json::from_value(json!([
            {"id": 1, "amount": "100.00", "is_paid": false, "due_date": "2024-09-01"},
            {"id": 2, "amount": 50.5, "is_paid": true, "paid_date": "2024-02-01"},
            {"id": 3, "amount": "25.25"}
        ]))
        .unwrap();
        assert_eq!(outstanding_total(&fees), 125.25);
        assert_eq!(fees[0].due_date, NaiveDate::from_ymd_opt(2024, 9, 1));
    }
}
