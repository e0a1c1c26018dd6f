use crate::classifier::{ClassificationResult, TransactionClassifier};
use crate::schema::{ClassificationRule, ClassifiedTransaction, DreCategory, TransactionType};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

/// One line of a raw bank/ledger export. Positive amounts are money in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankStatementRow {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default)]
pub struct StatementImport {
    pub transactions: Vec<ClassifiedTransaction>,
    pub classifications: Vec<ClassificationResult>,
    pub classified_count: usize,
    pub unclassified_count: usize,
}

/// Writes a classifier verdict onto `transaction`.
///
/// A match below `min_confidence` leaves the transaction unclassified.
pub fn apply_classification(
    transaction: &mut ClassifiedTransaction,
    result: &ClassificationResult,
    min_confidence: f64,
) {
    match result.category_id {
        Some(category_id) if result.confidence >= min_confidence => {
            transaction.dre_category_id = Some(category_id);
            transaction.is_classified = true;
        }
        _ => {
            transaction.dre_category_id = None;
            transaction.is_classified = false;
        }
    }
}

pub fn import_statement(
    company_id: &str,
    rows: &[BankStatementRow],
    rules: &[ClassificationRule],
    categories: &[DreCategory],
    min_confidence: f64,
) -> StatementImport {
    let classifier = TransactionClassifier::new(rules, categories);
    let mut import = StatementImport::default();

    for row in rows {
        let transaction_type = if row.amount >= 0.0 {
            TransactionType::Credit
        } else {
            TransactionType::Debit
        };

        let mut transaction = ClassifiedTransaction::new(
            company_id,
            row.date,
            transaction_type,
            row.description.clone(),
            row.amount.abs(),
        );

        let result = classifier.classify(&transaction);
        apply_classification(&mut transaction, &result, min_confidence);

        if transaction.is_classified {
            import.classified_count += 1;
        } else {
            import.unclassified_count += 1;
        }
        import.transactions.push(transaction);
        import.classifications.push(result);
    }

    debug!(
        "Imported {} rows for {}: {} classified, {} left for review",
        rows.len(),
        company_id,
        import.classified_count,
        import.unclassified_count
    );

    import
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{default_categories, DreCategoryType};

    fn row(day: u32, description: &str, amount: f64) -> BankStatementRow {
        BankStatementRow {
            date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            description: description.to_string(),
            amount,
        }
    }

    #[test]
    fn test_import_sets_type_and_magnitude() {
        let categories = default_categories("acme");
        let rows = vec![
            row(1, "Venda loja física", 1_500.0),
            row(2, "Conta de energia", -320.4),
        ];

        let import = import_statement("acme", &rows, &[], &categories, 0.0);

        assert_eq!(import.transactions.len(), 2);
        assert_eq!(import.transactions[0].transaction_type, TransactionType::Credit);
        assert_eq!(import.transactions[0].value, 1_500.0);
        assert_eq!(import.transactions[1].transaction_type, TransactionType::Debit);
        assert_eq!(import.transactions[1].value, 320.4);
        assert_eq!(import.classified_count, 2);

        let geral = categories
            .iter()
            .find(|c| c.category_type == DreCategoryType::DespesaGeral)
            .unwrap();
        assert_eq!(import.transactions[1].dre_category_id, Some(geral.id));
        assert!(import.transactions[1].is_classified);
    }

    #[test]
    fn test_min_confidence_leaves_weak_matches_for_review() {
        let categories = default_categories("acme");
        let rows = vec![row(3, "Pagamento de aluguel do escritório", -2_000.0)];

        let import = import_statement("acme", &rows, &[], &categories, 0.8);

        assert_eq!(import.unclassified_count, 1);
        assert!(!import.transactions[0].is_classified);
        assert!(import.transactions[0].dre_category_id.is_none());
        assert!(import.classifications[0].is_match());
    }

    #[test]
    fn test_unmatched_rows_are_unclassified() {
        let categories = default_categories("acme");
        let import = import_statement("acme", &[row(4, "TED 998877", 10.0)], &[], &categories, 0.0);
        assert_eq!(import.unclassified_count, 1);
        assert!(!import.transactions[0].contributes());
    }
}
