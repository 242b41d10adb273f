//! Property-based tests for the double-entry invariant.

use lekha_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::LedgerError;
use super::journal::JournalLineInput;
use super::validation::{BALANCE_TOLERANCE, validate_lines};

/// Strategy to generate a positive amount with 4 decimal places (0.0001 to 1,000,000).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000i64).prop_map(|units| Decimal::new(units, 4))
}

/// Strategy to split a total into between 1 and 4 non-negative parts.
fn split(total: Decimal) -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(1u32..100, 1..5).prop_map(move |weights| {
        let sum: u32 = weights.iter().sum();
        let mut parts: Vec<Decimal> = weights
            .iter()
            .map(|w| {
                (total * Decimal::from(*w) / Decimal::from(sum))
                    .round_dp_with_strategy(4, RoundingStrategy::ToZero)
            })
            .collect();
        // push the rounding remainder onto the last part
        let allocated: Decimal = parts.iter().sum();
        if let Some(last) = parts.last_mut() {
            *last += total - allocated;
        }
        parts
    })
}

/// Strategy to generate a balanced set of lines.
fn balanced_lines() -> impl Strategy<Value = Vec<JournalLineInput>> {
    positive_amount()
        .prop_flat_map(|total| (split(total), split(total)))
        .prop_map(|(debits, credits)| {
            debits
                .into_iter()
                .map(|d| JournalLineInput::debit(AccountId::new(), d))
                .chain(
                    credits
                        .into_iter()
                        .map(|c| JournalLineInput::credit(AccountId::new(), c)),
                )
                .collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Lines whose debits equal their credits are accepted with exact totals.
    #[test]
    fn prop_balanced_lines_accepted(lines in balanced_lines()) {
        let debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let totals = validate_lines(&lines);
        prop_assert!(totals.is_ok(), "balanced lines rejected: {:?}", totals);
        let totals = totals.unwrap();
        prop_assert_eq!(totals.debit, debit);
        prop_assert_eq!(totals.credit, debit);
    }

    /// Moving one line by more than the tolerance breaks the balance.
    #[test]
    fn prop_perturbed_lines_rejected(
        lines in balanced_lines(),
        delta in positive_amount(),
        index in any::<prop::sample::Index>(),
    ) {
        let mut lines = lines;
        let i = index.index(lines.len());
        lines[i].debit += BALANCE_TOLERANCE + delta;

        let result = validate_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::Unbalanced { .. })),
            "perturbed lines accepted: {:?}",
            result
        );
    }

    /// A difference no larger than the tolerance is absorbed.
    #[test]
    fn prop_difference_within_tolerance_accepted(lines in balanced_lines()) {
        let mut lines = lines;
        lines[0].debit += BALANCE_TOLERANCE;
        prop_assert!(validate_lines(&lines).is_ok());
    }

    /// Any negative amount is rejected, and the first offending line is reported.
    #[test]
    fn prop_negative_amount_rejected(
        lines in balanced_lines(),
        amount in positive_amount(),
        index in any::<prop::sample::Index>(),
        on_credit in any::<bool>(),
    ) {
        let mut lines = lines;
        let i = index.index(lines.len());
        if on_credit {
            lines[i].credit = -amount;
        } else {
            lines[i].debit = -amount;
        }

        let result = validate_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::NegativeAmount { line }) if line == i),
            "expected negative amount at line {}, got {:?}",
            i,
            result
        );
    }

    /// Fewer than two lines are rejected whatever the amounts.
    #[test]
    fn prop_fewer_than_two_lines_rejected(amount in positive_amount(), debit in any::<bool>()) {
        let line = if debit {
            JournalLineInput::debit(AccountId::new(), amount)
        } else {
            JournalLineInput::credit(AccountId::new(), amount)
        };

        prop_assert!(matches!(
            validate_lines(&[line]),
            Err(LedgerError::InsufficientLines(1))
        ));
        prop_assert!(matches!(
            validate_lines(&[]),
            Err(LedgerError::InsufficientLines(0))
        ));
    }
}
