use crate::schema::ClassifiedTransaction;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A user's decision about where one transaction belongs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ClassificationOverride {
    pub transaction_id: Uuid,

    #[schemars(
        description = "Target category. None removes the transaction from the statement until it is classified again."
    )]
    pub category_id: Option<Uuid>,
}

impl ClassificationOverride {
    pub fn assign(transaction_id: Uuid, category_id: Uuid) -> Self {
        Self {
            transaction_id,
            category_id: Some(category_id),
        }
    }

    pub fn clear(transaction_id: Uuid) -> Self {
        Self {
            transaction_id,
            category_id: None,
        }
    }

    pub fn apply_to(&self, transaction: &mut ClassifiedTransaction) {
        transaction.dre_category_id = self.category_id;
        transaction.is_classified = self.category_id.is_some();
        transaction.manually_classified = self.category_id.is_some();
    }
}

/// Applies overrides to a copy of `transactions`; the input is left as is.
///
/// When several overrides target the same transaction the last one wins.
/// Overrides for unknown transaction ids are ignored.
pub fn apply_overrides(
    transactions: &[ClassifiedTransaction],
    overrides: &[ClassificationOverride],
) -> Vec<ClassifiedTransaction> {
    let latest: HashMap<Uuid, &ClassificationOverride> = overrides
        .iter()
        .map(|o| (o.transaction_id, o))
        .collect();

    transactions
        .iter()
        .cloned()
        .map(|mut transaction| {
            if let Some(o) = latest.get(&transaction.id) {
                o.apply_to(&mut transaction);
            }
            transaction
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TransactionType;
    use chrono::NaiveDate;

    fn tx(description: &str) -> ClassifiedTransaction {
        ClassifiedTransaction::new(
            "acme",
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            TransactionType::Debit,
            description,
            50.0,
        )
    }

    #[test]
    fn test_assign_and_clear() {
        let category = Uuid::new_v4();
        let a = tx("Padaria");
        let b = tx("Estacionamento").with_category(Uuid::new_v4());
        let original = vec![a.clone(), b.clone()];

        let result = apply_overrides(
            &original,
            &[
                ClassificationOverride::assign(a.id, category),
                ClassificationOverride::clear(b.id),
            ],
        );

        assert_eq!(result[0].dre_category_id, Some(category));
        assert!(result[0].is_classified);
        assert!(result[0].manually_classified);
        assert!(result[1].dre_category_id.is_none());
        assert!(!result[1].is_classified);

        // inputs untouched
        assert_eq!(original[0], a);
        assert_eq!(original[1], b);
    }

    #[test]
    fn test_last_override_wins() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let a = tx("Uber");

        let result = apply_overrides(
            std::slice::from_ref(&a),
            &[
                ClassificationOverride::assign(a.id, first),
                ClassificationOverride::assign(a.id, second),
            ],
        );
        assert_eq!(result[0].dre_category_id, Some(second));
    }

    #[test]
    fn test_unknown_transaction_is_ignored() {
        let a = tx("Uber");
        let result = apply_overrides(
            std::slice::from_ref(&a),
            &[ClassificationOverride::assign(Uuid::new_v4(), Uuid::new_v4())],
        );
        assert_eq!(result[0], a);
    }
}
