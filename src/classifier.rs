use crate::keywords::normalized_default_keywords;
use crate::schema::{ClassificationRule, ClassifiedTransaction, DreCategory, DreCategoryType};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

pub const RULE_CONFIDENCE: f64 = 0.95;
pub const KEYWORD_BASE_CONFIDENCE: f64 = 0.5;
pub const KEYWORD_MAX_CONFIDENCE: f64 = 0.85;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    /// In `[0, 1]`; zero exactly when nothing matched.
    pub confidence: f64,
    /// Set only when a tenant rule produced the match.
    pub matched_rule_id: Option<Uuid>,
}

impl ClassificationResult {
    pub fn unmatched() -> Self {
        Self {
            category_id: None,
            category_name: None,
            confidence: 0.0,
            matched_rule_id: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.category_id.is_some()
    }
}

fn non_alphanumeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("invalid non-alphanumeric regex"))
}

/// Lowercases, strips diacritics, collapses every non-alphanumeric run into one space and trims.
///
/// Text is decomposed first, so precomposed and combining-mark spellings of the
/// same word normalize identically.
pub fn normalize_description(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter_map(fold_diacritic)
        .collect();

    non_alphanumeric_re()
        .replace_all(&folded, " ")
        .trim()
        .to_string()
}

fn fold_diacritic(c: char) -> Option<char> {
    let folded = match c {
        '\u{0300}'..='\u{036f}' => return None,
        // stroked letters have no canonical decomposition
        'ł' => 'l',
        'đ' | 'ð' => 'd',
        'ø' => 'o',
        'ħ' => 'h',
        'ı' => 'i',
        other => other,
    };
    Some(folded)
}

struct PreparedRule<'a> {
    rule: &'a ClassificationRule,
    keywords: Vec<String>,
}

/// Classifier bound to one tenant's rules and taxonomy.
///
/// Rules are filtered, sorted and normalized once, so a batch pays that cost a single time.
pub struct TransactionClassifier<'a> {
    rules: Vec<PreparedRule<'a>>,
    categories: &'a [DreCategory],
}

impl<'a> TransactionClassifier<'a> {
    pub fn new(rules: &'a [ClassificationRule], categories: &'a [DreCategory]) -> Self {
        let mut prepared: Vec<PreparedRule<'a>> = rules
            .iter()
            .filter(|r| r.is_active)
            .map(|rule| PreparedRule {
                rule,
                keywords: rule
                    .keywords
                    .iter()
                    .map(|k| normalize_description(k))
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();

        // Stable: equal priorities keep their input order.
        prepared.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));

        Self {
            rules: prepared,
            categories,
        }
    }

    pub fn classify(&self, transaction: &ClassifiedTransaction) -> ClassificationResult {
        let description = normalize_description(&transaction.description);
        if description.is_empty() {
            return ClassificationResult::unmatched();
        }

        if let Some(result) = self.match_rules(transaction, &description) {
            return result;
        }

        self.match_default_keywords(&description)
            .unwrap_or_else(ClassificationResult::unmatched)
    }

    fn match_rules(
        &self,
        transaction: &ClassifiedTransaction,
        description: &str,
    ) -> Option<ClassificationResult> {
        let prepared = self
            .rules
            .iter()
            .filter(|p| p.rule.transaction_type == transaction.transaction_type)
            .find(|p| p.keywords.iter().any(|k| description.contains(k.as_str())))?;

        debug!(
            "Transaction '{}' matched rule '{}'",
            transaction.description, prepared.rule.name
        );

        Some(ClassificationResult {
            category_id: Some(prepared.rule.category_id),
            category_name: self
                .categories
                .iter()
                .find(|c| c.id == prepared.rule.category_id)
                .map(|c| c.name.clone()),
            confidence: RULE_CONFIDENCE,
            matched_rule_id: Some(prepared.rule.id),
        })
    }

    fn match_default_keywords(&self, description: &str) -> Option<ClassificationResult> {
        let mut best: Option<(DreCategoryType, f64)> = None;

        for group in normalized_default_keywords() {
            for keyword in &group.keywords {
                if !description.contains(keyword.as_str()) {
                    continue;
                }
                let score = keyword.len() as f64 / description.len() as f64;
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((group.category_type, score));
                }
            }
        }

        let (category_type, score) = best?;
        let category = self
            .categories
            .iter()
            .find(|c| c.is_active && c.category_type == category_type)?;

        Some(ClassificationResult {
            category_id: Some(category.id),
            category_name: Some(category.name.clone()),
            confidence: (KEYWORD_BASE_CONFIDENCE + score).min(KEYWORD_MAX_CONFIDENCE),
            matched_rule_id: None,
        })
    }
}

pub fn classify(
    transaction: &ClassifiedTransaction,
    rules: &[ClassificationRule],
    categories: &[DreCategory],
) -> ClassificationResult {
    TransactionClassifier::new(rules, categories).classify(transaction)
}

pub fn classify_batch(
    transactions: &[ClassifiedTransaction],
    rules: &[ClassificationRule],
    categories: &[DreCategory],
) -> Vec<ClassificationResult> {
    let classifier = TransactionClassifier::new(rules, categories);
    transactions.iter().map(|t| classifier.classify(t)).collect()
}
