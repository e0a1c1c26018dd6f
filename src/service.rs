use crate::classifier::TransactionClassifier;
use crate::config::DreSettings;
use crate::engine::{calculate_dre, DreReport};
use crate::error::{DreError, Result};
use crate::forecast::{forecast_dre, ForecastResult};
use crate::ingestion::{apply_classification, import_statement, BankStatementRow, StatementImport};
use crate::overrides::{apply_overrides, ClassificationOverride};
use crate::store::{
    CategoryProvider, DreStore, EntryStore, PeriodStore, RuleStore, TransactionStore,
};
use crate::valuation::{calculate_valuation, estimate_multiple, ValuationInput, ValuationResult};
use crate::verify::verify_waterfall;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub ebitda: f64,
    pub growth_rate: f64,
    pub multiplo: f64,
    pub valuation: ValuationResult,
}

/// Runs the statement pipeline against a store.
pub struct DreService<S: DreStore> {
    store: S,
    settings: DreSettings,
}

impl<S: DreStore> DreService<S> {
    pub fn new(store: S, settings: DreSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { store, settings })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn settings(&self) -> &DreSettings {
        &self.settings
    }

    pub fn build_report(&self, period_id: Uuid) -> Result<DreReport> {
        let period = self.store.period(period_id)?;
        let categories = self.store.categories(&period.company_id)?;
        let entries = self.store.entries_for_period(period_id)?;
        let transactions = self.store.transactions_for_period(&period)?;

        let report = calculate_dre(&period, &entries, &categories, &transactions);
        verify_waterfall(&report, self.settings.verification_tolerance)?;

        info!(
            "Built DRE for '{}': net revenue {:.2}, net profit {:.2}",
            period.name, report.receita_liquida, report.lucro_liquido
        );
        Ok(report)
    }

    /// Imports raw statement rows for a tenant, classifying each one.
    pub fn import_statement(
        &mut self,
        company_id: &str,
        rows: &[BankStatementRow],
    ) -> Result<StatementImport> {
        let rules = self.store.active_rules(company_id)?;
        let categories = self.store.active_categories(company_id)?;

        let import = import_statement(
            company_id,
            rows,
            &rules,
            &categories,
            self.settings.min_import_confidence,
        );
        self.store.save_transactions(import.transactions.clone())?;
        Ok(import)
    }

    /// Re-runs the classifier over a period's transactions.
    ///
    /// Transactions a user classified by hand keep their category.
    /// Returns how many transactions end up classified.
    pub fn reclassify_period(&mut self, period_id: Uuid) -> Result<usize> {
        let period = self.store.period(period_id)?;
        let rules = self.store.active_rules(&period.company_id)?;
        let categories = self.store.active_categories(&period.company_id)?;
        let mut transactions = self.store.transactions_for_period(&period)?;

        let classifier = TransactionClassifier::new(&rules, &categories);
        for transaction in transactions.iter_mut().filter(|t| !t.manually_classified) {
            let result = classifier.classify(transaction);
            apply_classification(transaction, &result, self.settings.min_import_confidence);
        }

        let classified = transactions.iter().filter(|t| t.contributes()).count();
        debug!(
            "Reclassified {} transactions in '{}', {} classified",
            transactions.len(),
            period.name,
            classified
        );

        self.store.save_transactions(transactions)?;
        Ok(classified)
    }

    pub fn override_classifications(
        &mut self,
        period_id: Uuid,
        overrides: &[ClassificationOverride],
    ) -> Result<()> {
        let period = self.store.period(period_id)?;
        let transactions = self.store.transactions_for_period(&period)?;

        if let Some(missing) = overrides
            .iter()
            .find(|o| !transactions.iter().any(|t| t.id == o.transaction_id))
        {
            return Err(DreError::TransactionNotFound(missing.transaction_id));
        }

        let updated = apply_overrides(&transactions, overrides);
        self.store.save_transactions(updated)
    }

    /// Builds the statement of each period and projects forward from them.
    ///
    /// Periods are ordered by start date regardless of the order given.
    pub fn forecast(
        &self,
        period_ids: &[Uuid],
        months_ahead: Option<u32>,
    ) -> Result<ForecastResult> {
        let history = self.history(period_ids)?;
        let months = months_ahead.unwrap_or(self.settings.forecast_months);

        let forecast = forecast_dre(&history, months);
        info!(
            "Forecast {} months from {} periods: trend {:?}, growth {}%",
            months,
            history.len(),
            forecast.trend,
            forecast.growth_rate
        );
        Ok(forecast)
    }

    /// Values the business on the EBITDA of `period_id`.
    ///
    /// The multiple comes from the configured sector, adjusted by the growth
    /// rate of `history_ids`. Debt and cash come from settings.
    pub fn valuation(&self, period_id: Uuid, history_ids: &[Uuid]) -> Result<ValuationSummary> {
        let report = self.build_report(period_id)?;
        let growth_rate = forecast_dre(&self.history(history_ids)?, 0).growth_rate;
        let sector = self.settings.sector.as_deref().unwrap_or("");
        let multiplo = estimate_multiple(sector, growth_rate);

        let valuation = calculate_valuation(&ValuationInput {
            ebitda: report.ebitda,
            multiplo,
            divida_bruta: self.settings.divida_bruta,
            caixa: self.settings.caixa,
        });

        Ok(ValuationSummary {
            ebitda: report.ebitda,
            growth_rate,
            multiplo,
            valuation,
        })
    }

    fn history(&self, period_ids: &[Uuid]) -> Result<Vec<DreReport>> {
        let mut history = period_ids
            .iter()
            .map(|id| self.build_report(*id))
            .collect::<Result<Vec<_>>>()?;
        history.sort_by_key(|r| r.period.start_date);
        Ok(history)
    }
}
