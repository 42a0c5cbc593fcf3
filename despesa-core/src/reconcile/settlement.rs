use rust_decimal::Decimal;

use crate::error::AppError;
use crate::models::accountability::NewExpenseItem;

/// Outcome of reconciling a paid request against actual spend.
///
/// At most one of `amount_to_return` and `amount_to_bill` is non-zero;
/// both are zero when the request was exactly reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub total_spent: Decimal,
    pub amount_to_return: Decimal,
    pub amount_to_bill: Decimal,
}

/// Computes the settlement for a request of `requested` against the
/// given total spend.
pub fn settle(requested: Decimal, total_spent: Decimal) -> Settlement {
    Settlement {
        total_spent,
        amount_to_return: (requested - total_spent).max(Decimal::ZERO),
        amount_to_bill: (total_spent - requested).max(Decimal::ZERO),
    }
}

/// Sums the submitted item amounts.
pub fn total_spent(items: &[NewExpenseItem]) -> Decimal {
    items.iter().map(|item| item.amount).sum()
}

/// Validates submitted expense items, collecting every failure with the
/// index of the offending item.
///
/// `receipts_required` is the per-kind policy: reimbursement flows
/// demand a receipt reference on every item, the other kinds accept
/// items without one.
pub fn validate_items(items: &[NewExpenseItem], receipts_required: bool) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::Validation(vec![
            "items must not be empty".to_string(),
        ]));
    }

    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
        if item.category.trim().is_empty() {
            errors.push(format!("item {}: category must not be empty", index));
        }
        if item.description.trim().is_empty() {
            errors.push(format!("item {}: description must not be empty", index));
        }
        if item.amount <= Decimal::ZERO {
            errors.push(format!("item {}: amount must be positive", index));
        }
        if receipts_required
            && item
                .receipt_ref
                .as_deref()
                .map_or(true, |r| r.trim().is_empty())
        {
            errors.push(format!("item {}: receipt reference is required", index));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item(category: &str, amount: Decimal) -> NewExpenseItem {
        NewExpenseItem {
            category: category.to_string(),
            description: format!("{} expense", category),
            amount,
            expense_date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            receipt_ref: None,
        }
    }

    #[test]
    fn test_underspent_advance_returns_the_difference() {
        // 1000 requested, 600 + 250 spent
        let items = vec![
            item("Hotel", Decimal::new(60_000, 2)),
            item("Táxi", Decimal::new(25_000, 2)),
        ];
        let settlement = settle(Decimal::new(100_000, 2), total_spent(&items));
        assert_eq!(settlement.total_spent, Decimal::new(85_000, 2));
        assert_eq!(settlement.amount_to_return, Decimal::new(15_000, 2));
        assert_eq!(settlement.amount_to_bill, Decimal::ZERO);
    }

    #[test]
    fn test_overspent_advance_bills_the_difference() {
        let items = vec![item("Hotel", Decimal::new(120_000, 2))];
        let settlement = settle(Decimal::new(100_000, 2), total_spent(&items));
        assert_eq!(settlement.amount_to_return, Decimal::ZERO);
        assert_eq!(settlement.amount_to_bill, Decimal::new(20_000, 2));
    }

    #[test]
    fn test_exact_reconciliation_owes_nothing_either_way() {
        let settlement = settle(Decimal::new(100_000, 2), Decimal::new(100_000, 2));
        assert_eq!(settlement.amount_to_return, Decimal::ZERO);
        assert_eq!(settlement.amount_to_bill, Decimal::ZERO);
    }

    #[test]
    fn test_settlement_invariants_hold() {
        let requested = Decimal::new(100_000, 2);
        for spent in [
            Decimal::ZERO,
            Decimal::new(85_000, 2),
            Decimal::new(100_000, 2),
            Decimal::new(120_000, 2),
        ] {
            let s = settle(requested, spent);
            // Never both positive.
            assert_eq!(s.amount_to_return * s.amount_to_bill, Decimal::ZERO);
            assert_eq!(s.amount_to_return - s.amount_to_bill, requested - spent);
        }
    }

    #[test]
    fn test_empty_items_are_rejected() {
        let err = validate_items(&[], false).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_item_errors_name_the_index() {
        let items = vec![
            item("Hotel", Decimal::new(60_000, 2)),
            item("", Decimal::ZERO),
        ];
        let err = validate_items(&items, false).unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().all(|e| e.starts_with("item 1:")));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_receipt_policy_is_enforced_per_flag() {
        let items = vec![item("Hotel", Decimal::new(60_000, 2))];
        assert!(validate_items(&items, false).is_ok());

        let err = validate_items(&items, true).unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert!(errors[0].contains("receipt"));
                assert!(errors[0].starts_with("item 0:"));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }
}
