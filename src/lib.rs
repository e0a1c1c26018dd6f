//! # DRE Engine
//!
//! A library for turning categorized financial facts into an income statement
//! (DRE, *Demonstração de Resultado do Exercício*), projecting it forward and
//! estimating what the business is worth.
//!
//! ## Core Concepts
//!
//! - **Category**: a bucket of the statement taxonomy, typed by [`DreCategoryType`]
//! - **Manual Entry**: a user-entered amount for a (period, category, description)
//! - **Classified Transaction**: an imported ledger line bound to a category by the
//!   [`classifier`] or by a user override
//! - **Statement**: the waterfall from gross revenue down to net profit, with margins
//! - **Forecast**: linear trends over past statements, projected month by month
//! - **Valuation**: EV/EBITDA multiple minus net debt
//!
//! ## Example
//!
//! ```rust,ignore
//! use dre_engine::*;
//!
//! let categories = default_categories("acme");
//! let period = DrePeriod::from_label("acme", "2024-03")?;
//! let receita = categories
//!     .iter()
//!     .find(|c| c.category_type == DreCategoryType::ReceitaBruta)
//!     .unwrap();
//!
//! let input = DreInput {
//!     period: period.clone(),
//!     categories: categories.clone(),
//!     entries: vec![DreEntry::new(period.id, receita.id, "Vendas", 120_000.0)],
//!     transactions: vec![],
//! };
//!
//! let report = process_dre(&input)?;
//! println!("{}", report.to_markdown());
//! ```

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod ingestion;
pub mod keywords;
pub mod overrides;
pub mod report;
pub mod schema;
pub mod service;
pub mod store;
pub mod utils;
pub mod valuation;
pub mod verify;

pub use classifier::{
    classify, classify_batch, normalize_description, ClassificationResult, TransactionClassifier,
};
pub use config::DreSettings;
pub use engine::{calculate_dre, safe_percent, CategoryTotals, DreReport};
pub use error::{DreError, Result};
pub use forecast::{
    forecast_dre, linear_regression, ForecastPeriod, ForecastResult, LinearRegression, Trend,
};
pub use ingestion::{import_statement, BankStatementRow, StatementImport};
pub use overrides::{apply_overrides, ClassificationOverride};
pub use report::{DreLine, LineKind};
pub use schema::*;
pub use service::{DreService, ValuationSummary};
pub use store::{
    CategoryProvider, DreStore, EntryStore, InMemoryDreStore, PeriodStore, RuleStore,
    TransactionStore,
};
pub use valuation::{calculate_valuation, estimate_multiple, ValuationInput, ValuationResult};
pub use verify::verify_waterfall;

use log::{debug, info};

pub struct DreProcessor;

impl DreProcessor {
    pub fn process(input: &DreInput) -> Result<DreReport> {
        input.period.validate()?;

        info!(
            "Processing DRE for {} period '{}'",
            input.period.company_id, input.period.name
        );
        debug!(
            "Input contains {} categories, {} entries and {} transactions",
            input.categories.len(),
            input.entries.len(),
            input.transactions.len()
        );

        Ok(calculate_dre(
            &input.period,
            &input.entries,
            &input.categories,
            &input.transactions,
        ))
    }

    pub fn process_with_verification(input: &DreInput, tolerance: f64) -> Result<DreReport> {
        let report = Self::process(input)?;

        verify_waterfall(&report, tolerance)?;

        Ok(report)
    }
}

pub fn process_dre(input: &DreInput) -> Result<DreReport> {
    DreProcessor::process(input)
}

pub fn process_with_verification(input: &DreInput, tolerance: f64) -> Result<DreReport> {
    DreProcessor::process_with_verification(input, tolerance)
}
