//! Portfolio Summary Wire Type
//!
//! The dashboard payload. Field names are part of the wire contract
//! consumed by existing clients, so the serde casing here must not
//! change.

use serde::{Deserialize, Serialize};

use core_kernel::Money;

use crate::trend::TrendPoint;

/// Everything the portfolio dashboard shows, for one owner at one instant
///
/// All amounts are rounded to two decimals when the summary is built;
/// the engine keeps full precision internally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    /// Distinct borrowers holding at least one loan
    pub total_borrowers: usize,
    /// Loans in any status
    pub total_loans: usize,
    /// Σ outstanding over non-terminal loans
    pub total_outstanding_amount: Money,
    /// Σ `total_paid` over all loans
    pub total_paid_amount: Money,
    /// Cash on hand per the balance decomposition
    pub current_balance: Money,
    /// Active loans falling due within the next seven days
    pub loans_due_in_next_7_days: usize,
    /// Σ outstanding over active loans already past due
    pub overdue_amount: Money,
    /// Σ outstanding over active loans due within the next seven days
    pub due_this_week_amount: Money,
    /// Σ amounts received today
    pub collected_today: Money,
    /// Interest collected per day, oldest first
    pub profit_trend: Vec<TrendPoint>,
    /// Stored base capital figure
    pub working_capital: Money,
    /// Interest still expected from active loans
    pub estimated_profit: Money,
    /// Interest collected minus expenses and realized losses
    pub profit_made: Money,
    /// Working capital plus realized profit
    pub money_in_business: Money,
    /// Operating outflows, excluding disbursements and withdrawals
    pub expenses: Money,
    /// Principal and interest written off on defaulted loans
    pub losses: Money,
}
