//! Double-entry validation for journal lines.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::journal::JournalLineInput;

/// Largest difference between total debits and credits still accepted (0.0001).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Fractional digits a stored amount keeps.
pub const AMOUNT_SCALE: u32 = 4;

/// Largest line amount the journal stores (999,999,999,999,999.9999).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_313_682_943, 2_328_306_436, 0, false, 4);

/// Returns true if `amount` fits the stored precision without rounding.
#[must_use]
pub fn amount_in_range(amount: Decimal) -> bool {
    amount <= MAX_AMOUNT && amount.normalize().scale() <= AMOUNT_SCALE
}

/// Debit and credit totals of a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTotals {
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
}

impl LineTotals {
    /// Absolute difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        (self.debit - self.credit).abs()
    }

    /// Returns true if the totals balance within [`BALANCE_TOLERANCE`].
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.difference() <= BALANCE_TOLERANCE
    }
}

/// Validates the double-entry invariant and returns the line totals.
///
/// Lines must number at least two and carry no negative amount. Every
/// amount must fit within [`MAX_AMOUNT`] at [`AMOUNT_SCALE`] digits, and
/// debits and credits must agree within [`BALANCE_TOLERANCE`].
///
/// # Errors
///
/// `InsufficientLines`, `NegativeAmount`, `AmountOutOfRange` or `Unbalanced`.
pub fn validate_lines(lines: &[JournalLineInput]) -> Result<LineTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines(lines.len()));
    }

    let mut totals = LineTotals {
        debit: Decimal::ZERO,
        credit: Decimal::ZERO,
    };
    for (index, line) in lines.iter().enumerate() {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line: index });
        }
        if !amount_in_range(line.debit) || !amount_in_range(line.credit) {
            return Err(LedgerError::AmountOutOfRange { line: index });
        }
        let out_of_range = || LedgerError::AmountOutOfRange { line: index };
        totals.debit = totals.debit.checked_add(line.debit).ok_or_else(out_of_range)?;
        totals.credit = totals.credit.checked_add(line.credit).ok_or_else(out_of_range)?;
    }

    if !totals.is_balanced() {
        return Err(LedgerError::Unbalanced {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}
