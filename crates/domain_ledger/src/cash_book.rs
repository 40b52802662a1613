//! Append-only cash book
//!
//! This module provides the per-business cash book: the single source
//! of truth for the cash balance. Balances are recomputed from the
//! entry set on every query rather than maintained as running totals,
//! so they cannot drift from the entries that justify them.

use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;

use core_kernel::{BusinessId, EntryId, Money};

use crate::entry::{CashMovements, EntryCategory, EntryType, LedgerEntry};
use crate::error::LedgerError;

/// The cash book for a single business
///
/// # Invariants
///
/// - Entries are append-only; nothing is ever updated or deleted
/// - `current_balance` is always `Σ inflow − Σ outflow`, derived fresh
/// - Every entry belongs to this book's owner
#[derive(Debug, Clone)]
pub struct CashBook {
    /// Business this book belongs to
    owner: BusinessId,
    /// Base working-capital figure, adjusted by capital operations
    working_capital: Money,
    /// Cash movements, in insertion order
    entries: Vec<LedgerEntry>,
}

impl CashBook {
    /// Creates an empty cash book for a business
    pub fn new(owner: BusinessId) -> Self {
        Self {
            owner,
            working_capital: Money::ZERO,
            entries: Vec::new(),
        }
    }

    /// Rebuilds a book from stored state
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::OwnerMismatch`] if any entry belongs to a
    /// different business.
    pub fn from_parts(
        owner: BusinessId,
        working_capital: Money,
        entries: Vec<LedgerEntry>,
    ) -> Result<Self, LedgerError> {
        for entry in &entries {
            if entry.owner != owner {
                return Err(LedgerError::OwnerMismatch {
                    expected: owner.to_string(),
                    got: entry.owner.to_string(),
                });
            }
        }
        Ok(Self {
            owner,
            working_capital,
            entries,
        })
    }

    pub fn owner(&self) -> BusinessId {
        self.owner
    }

    /// The stored base capital figure
    pub fn working_capital(&self) -> Money {
        self.working_capital
    }

    /// All recorded entries, oldest first
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Appends an already-built entry
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::OwnerMismatch`] if the entry belongs to a
    /// different business.
    pub fn append(&mut self, entry: LedgerEntry) -> Result<EntryId, LedgerError> {
        if entry.owner != self.owner {
            return Err(LedgerError::OwnerMismatch {
                expected: self.owner.to_string(),
                got: entry.owner.to_string(),
            });
        }

        let id = entry.id;
        self.entries.push(entry);
        Ok(id)
    }

    /// Records a cash movement
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if `amount` is not
    /// strictly positive.
    pub fn record_entry(
        &mut self,
        entry_type: EntryType,
        category: EntryCategory,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<EntryId, LedgerError> {
        let entry = LedgerEntry::new(self.owner, entry_type, category, amount, occurred_at)?;
        self.append(entry)
    }

    /// Current cash balance: `Σ inflow − Σ outflow` over all entries
    pub fn current_balance(&self) -> Money {
        self.entries.iter().map(|e| e.signed_amount()).sum()
    }

    /// Cash balance considering only entries up to `cutoff` inclusive
    pub fn balance_as_of(&self, cutoff: DateTime<Utc>) -> Money {
        self.entries
            .iter()
            .filter(|e| e.occurred_at <= cutoff)
            .map(|e| e.signed_amount())
            .sum()
    }

    /// Sum of entry amounts matching a direction and category
    pub fn sum_of(&self, entry_type: EntryType, category: EntryCategory) -> Money {
        self.entries
            .iter()
            .filter(|e| e.entry_type == entry_type && e.category == category)
            .map(|e| e.amount)
            .sum()
    }

    /// Sum of outflow amounts whose category is not in `excluded`
    pub fn outflow_excluding(&self, excluded: &[EntryCategory]) -> Money {
        self.entries
            .iter()
            .filter(|e| e.entry_type == EntryType::Outflow && !excluded.contains(&e.category))
            .map(|e| e.amount)
            .sum()
    }

    /// Adds working capital to the business
    ///
    /// Appends an inflow/capital_injection entry and raises the stored
    /// working-capital figure. The minimum injection is 0.01.
    pub fn inject_capital(
        &mut self,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<EntryId, LedgerError> {
        if amount < Money::new(dec!(0.01)) {
            return Err(LedgerError::InvalidAmount {
                amount: amount.amount(),
            });
        }

        let entry = CashMovements::capital_injection(self.owner, amount, occurred_at)?;
        let id = self.append(entry)?;
        self.working_capital = self.working_capital + amount;
        Ok(id)
    }

    /// Moves the working-capital figure to `new_total`, recording the
    /// difference as a capital movement
    ///
    /// A raise appends an inflow/capital_injection for the difference;
    /// a cut appends an outflow/capital_withdrawal for its absolute
    /// value; setting the same total records nothing.
    pub fn adjust_working_capital(
        &mut self,
        new_total: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<EntryId>, LedgerError> {
        if new_total.is_negative() {
            return Err(LedgerError::InvalidAmount {
                amount: new_total.amount(),
            });
        }

        let diff = new_total - self.working_capital;
        let recorded = if diff.is_zero() {
            None
        } else if diff.is_positive() {
            let entry = CashMovements::capital_injection(self.owner, diff, occurred_at)?;
            Some(self.append(entry)?)
        } else {
            let entry = CashMovements::capital_withdrawal(self.owner, diff.abs(), occurred_at)?;
            Some(self.append(entry)?)
        };

        self.working_capital = new_total;
        Ok(recorded)
    }

    /// Records an operating expense
    pub fn record_expense(
        &mut self,
        amount: Money,
        description: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<EntryId, LedgerError> {
        let entry = CashMovements::expense(self.owner, amount, description, occurred_at)?;
        self.append(entry)
    }
}
