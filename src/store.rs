//! Boundary to the persistence collaborators.
//!
//! Real deployments back these traits with a remote data store; the in-memory
//! implementation here carries the same semantics for tests and embedding.

use crate::error::{DreError, Result};
use crate::schema::{ClassificationRule, ClassifiedTransaction, DreCategory, DreEntry, DrePeriod};
use log::debug;
use std::collections::BTreeMap;
use uuid::Uuid;

pub trait CategoryProvider {
    /// Every category of a tenant, retired ones included, ordered by display order.
    ///
    /// Statements are built from this list so amounts already booked against a
    /// deactivated category keep counting.
    fn categories(&self, company_id: &str) -> Result<Vec<DreCategory>>;

    /// Active categories of a tenant, ordered by display order.
    fn active_categories(&self, company_id: &str) -> Result<Vec<DreCategory>> {
        Ok(self
            .categories(company_id)?
            .into_iter()
            .filter(|c| c.is_active)
            .collect())
    }
}

pub trait PeriodStore {
    fn period(&self, period_id: Uuid) -> Result<DrePeriod>;

    /// A tenant's periods, oldest first.
    fn periods(&self, company_id: &str) -> Result<Vec<DrePeriod>>;

    fn save_period(&mut self, period: DrePeriod) -> Result<DrePeriod>;

    fn close_period(&mut self, period_id: Uuid) -> Result<()>;

    /// Removes the period and every manual entry in it. Returns the number of entries removed.
    fn delete_period(&mut self, period_id: Uuid) -> Result<usize>;
}

pub trait EntryStore {
    fn entries_for_period(&self, period_id: Uuid) -> Result<Vec<DreEntry>>;

    /// Inserts the entry, or overwrites value and notes of the entry already
    /// holding the same (period, category, description).
    fn upsert_entry(&mut self, entry: DreEntry) -> Result<DreEntry>;

    fn delete_entry(&mut self, entry_id: Uuid) -> Result<()>;

    fn delete_entries_for_period(&mut self, period_id: Uuid) -> Result<usize>;
}

pub trait TransactionStore {
    /// Transactions of the period's tenant dated inside the period.
    fn transactions_for_period(&self, period: &DrePeriod) -> Result<Vec<ClassifiedTransaction>>;

    /// Inserts new transactions and replaces existing ones with the same id.
    fn save_transactions(&mut self, transactions: Vec<ClassifiedTransaction>) -> Result<()>;
}

pub trait RuleStore {
    fn active_rules(&self, company_id: &str) -> Result<Vec<ClassificationRule>>;
}

/// Everything [`crate::service::DreService`] needs from persistence.
pub trait DreStore: CategoryProvider + PeriodStore + EntryStore + TransactionStore + RuleStore {}

impl<T> DreStore for T where
    T: CategoryProvider + PeriodStore + EntryStore + TransactionStore + RuleStore
{
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDreStore {
    categories: Vec<DreCategory>,
    periods: BTreeMap<Uuid, DrePeriod>,
    entries: Vec<DreEntry>,
    transactions: Vec<ClassifiedTransaction>,
    rules: Vec<ClassificationRule>,
}

impl InMemoryDreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_categories(&mut self, categories: impl IntoIterator<Item = DreCategory>) {
        self.categories.extend(categories);
    }

    pub fn add_rule(&mut self, rule: ClassificationRule) {
        self.rules.push(rule);
    }

    /// Retires a category. Entries and transactions booked against it are kept.
    pub fn deactivate_category(&mut self, category_id: Uuid) -> Result<()> {
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or(DreError::CategoryNotFound(category_id))?;
        category.is_active = false;
        Ok(())
    }

    fn writable_period(&self, period_id: Uuid) -> Result<&DrePeriod> {
        let period = self
            .periods
            .get(&period_id)
            .ok_or(DreError::PeriodNotFound(period_id))?;
        if period.is_closed {
            return Err(DreError::PeriodClosed(period_id));
        }
        Ok(period)
    }
}

impl CategoryProvider for InMemoryDreStore {
    fn categories(&self, company_id: &str) -> Result<Vec<DreCategory>> {
        let mut categories: Vec<DreCategory> = self
            .categories
            .iter()
            .filter(|c| c.company_id == company_id)
            .cloned()
            .collect();
        categories.sort_by_key(|c| c.display_order);
        Ok(categories)
    }
}

impl PeriodStore for InMemoryDreStore {
    fn period(&self, period_id: Uuid) -> Result<DrePeriod> {
        self.periods
            .get(&period_id)
            .cloned()
            .ok_or(DreError::PeriodNotFound(period_id))
    }

    fn periods(&self, company_id: &str) -> Result<Vec<DrePeriod>> {
        let mut periods: Vec<DrePeriod> = self
            .periods
            .values()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect();
        periods.sort_by_key(|p| p.start_date);
        Ok(periods)
    }

    fn save_period(&mut self, period: DrePeriod) -> Result<DrePeriod> {
        period.validate()?;
        self.periods.insert(period.id, period.clone());
        Ok(period)
    }

    fn close_period(&mut self, period_id: Uuid) -> Result<()> {
        let period = self
            .periods
            .get_mut(&period_id)
            .ok_or(DreError::PeriodNotFound(period_id))?;
        period.is_closed = true;
        Ok(())
    }

    fn delete_period(&mut self, period_id: Uuid) -> Result<usize> {
        if self.periods.remove(&period_id).is_none() {
            return Err(DreError::PeriodNotFound(period_id));
        }
        let removed = self.delete_entries_for_period(period_id)?;
        debug!("Deleted period {} and {} entries", period_id, removed);
        Ok(removed)
    }
}

impl EntryStore for InMemoryDreStore {
    fn entries_for_period(&self, period_id: Uuid) -> Result<Vec<DreEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.period_id == period_id)
            .cloned()
            .collect())
    }

    fn upsert_entry(&mut self, entry: DreEntry) -> Result<DreEntry> {
        let company_id = &self.writable_period(entry.period_id)?.company_id;
        if !self
            .categories
            .iter()
            .any(|c| c.id == entry.category_id && &c.company_id == company_id)
        {
            return Err(DreError::CategoryNotFound(entry.category_id));
        }

        if let Some(existing) = self.entries.iter_mut().find(|e| e.same_slot(&entry)) {
            existing.value = entry.value;
            existing.notes = entry.notes;
            return Ok(existing.clone());
        }

        self.entries.push(entry.clone());
        Ok(entry)
    }

    fn delete_entry(&mut self, entry_id: Uuid) -> Result<()> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or(DreError::EntryNotFound(entry_id))?;
        self.writable_period(self.entries[idx].period_id)?;
        self.entries.remove(idx);
        Ok(())
    }

    fn delete_entries_for_period(&mut self, period_id: Uuid) -> Result<usize> {
        let before = self.entries.len();
        self.entries.retain(|e| e.period_id != period_id);
        Ok(before - self.entries.len())
    }
}

impl TransactionStore for InMemoryDreStore {
    fn transactions_for_period(&self, period: &DrePeriod) -> Result<Vec<ClassifiedTransaction>> {
        Ok(self
            .transactions
            .iter()
            .filter(|t| t.company_id == period.company_id && period.contains(t.date))
            .cloned()
            .collect())
    }

    fn save_transactions(&mut self, transactions: Vec<ClassifiedTransaction>) -> Result<()> {
        for transaction in transactions {
            match self.transactions.iter_mut().find(|t| t.id == transaction.id) {
                Some(existing) => *existing = transaction,
                None => self.transactions.push(transaction),
            }
        }
        Ok(())
    }
}

impl RuleStore for InMemoryDreStore {
    fn active_rules(&self, company_id: &str) -> Result<Vec<ClassificationRule>> {
        Ok(self
            .rules
            .iter()
            .filter(|r| r.company_id == company_id && r.is_active)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{default_categories, DreCategoryType, TransactionType};
    use chrono::NaiveDate;

    fn seeded() -> (InMemoryDreStore, DrePeriod, Uuid) {
        let mut store = InMemoryDreStore::new();
        let categories = default_categories("acme");
        let receita = categories
            .iter()
            .find(|c| c.category_type == DreCategoryType::ReceitaBruta)
            .unwrap()
            .id;
        store.add_categories(categories);
        let period = store
            .save_period(DrePeriod::from_label("acme", "2024-03").unwrap())
            .unwrap();
        (store, period, receita)
    }

    #[test]
    fn test_upsert_overwrites_same_slot() {
        let (mut store, period, receita) = seeded();

        let first = store
            .upsert_entry(DreEntry::new(period.id, receita, "Vendas balcão", 100.0))
            .unwrap();
        let second = store
            .upsert_entry(DreEntry::new(period.id, receita, "Vendas balcão", 250.0))
            .unwrap();
        store
            .upsert_entry(DreEntry::new(period.id, receita, "Vendas online", 40.0))
            .unwrap();

        assert_eq!(first.id, second.id);
        let entries = store.entries_for_period(period.id).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, 250.0);
    }

    #[test]
    fn test_upsert_validations() {
        let (mut store, period, receita) = seeded();

        let missing_period = store.upsert_entry(DreEntry::new(Uuid::new_v4(), receita, "x", 1.0));
        assert!(matches!(missing_period, Err(DreError::PeriodNotFound(_))));

        let missing_category =
            store.upsert_entry(DreEntry::new(period.id, Uuid::new_v4(), "x", 1.0));
        assert!(matches!(missing_category, Err(DreError::CategoryNotFound(_))));

        store.close_period(period.id).unwrap();
        let closed = store.upsert_entry(DreEntry::new(period.id, receita, "x", 1.0));
        assert!(matches!(closed, Err(DreError::PeriodClosed(_))));
    }

    #[test]
    fn test_delete_entry_and_cascade() {
        let (mut store, period, receita) = seeded();
        let a = store
            .upsert_entry(DreEntry::new(period.id, receita, "a", 1.0))
            .unwrap();
        store
            .upsert_entry(DreEntry::new(period.id, receita, "b", 2.0))
            .unwrap();
        store
            .upsert_entry(DreEntry::new(period.id, receita, "c", 3.0))
            .unwrap();

        store.delete_entry(a.id).unwrap();
        assert!(matches!(
            store.delete_entry(a.id),
            Err(DreError::EntryNotFound(_))
        ));

        assert_eq!(store.delete_period(period.id).unwrap(), 2);
        assert!(store.entries_for_period(period.id).unwrap().is_empty());
        assert!(matches!(
            store.period(period.id),
            Err(DreError::PeriodNotFound(_))
        ));
    }

    #[test]
    fn test_transactions_filtered_by_period_and_tenant() {
        let (mut store, period, _) = seeded();
        let inside = ClassifiedTransaction::new(
            "acme",
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            TransactionType::Credit,
            "Venda",
            10.0,
        );
        let outside = ClassifiedTransaction::new(
            "acme",
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            TransactionType::Credit,
            "Venda",
            10.0,
        );
        let other_tenant = ClassifiedTransaction::new(
            "globex",
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            TransactionType::Credit,
            "Venda",
            10.0,
        );
        store
            .save_transactions(vec![inside.clone(), outside, other_tenant])
            .unwrap();

        let found = store.transactions_for_period(&period).unwrap();
        assert_eq!(found, vec![inside.clone()]);

        let mut updated = inside;
        updated.value = 99.0;
        store.save_transactions(vec![updated]).unwrap();
        assert_eq!(store.transactions_for_period(&period).unwrap()[0].value, 99.0);
    }

    #[test]
    fn test_active_categories_and_rules() {
        let (mut store, _, receita) = seeded();
        let mut retired = DreCategory::new("acme", "Antiga", DreCategoryType::DespesaGeral, 1);
        retired.is_active = false;
        store.add_categories(vec![retired]);

        let mut rule = ClassificationRule::new(
            "acme",
            "off",
            TransactionType::Credit,
            vec!["x".to_string()],
            receita,
            1,
        );
        rule.is_active = false;
        store.add_rule(rule);

        let categories = store.active_categories("acme").unwrap();
        assert_eq!(categories.len(), DreCategoryType::ALL.len());
        assert_eq!(categories[0].category_type, DreCategoryType::ReceitaBruta);
        assert!(store.active_categories("globex").unwrap().is_empty());
        assert!(store.active_rules("acme").unwrap().is_empty());
    }

    #[test]
    fn test_upsert_rejects_other_tenant_category() {
        let (mut store, period, _) = seeded();
        let foreign = default_categories("globex");
        let foreign_receita = foreign[0].id;
        store.add_categories(foreign);

        let result = store.upsert_entry(DreEntry::new(period.id, foreign_receita, "x", 1.0));
        assert!(matches!(result, Err(DreError::CategoryNotFound(id)) if id == foreign_receita));
        assert!(store.entries_for_period(period.id).unwrap().is_empty());
    }

    #[test]
    fn test_deactivated_category_stays_listed() {
        let (mut store, _, receita) = seeded();
        store.deactivate_category(receita).unwrap();

        let all = store.categories("acme").unwrap();
        assert_eq!(all.len(), DreCategoryType::ALL.len());
        assert!(!all.iter().find(|c| c.id == receita).unwrap().is_active);

        let active = store.active_categories("acme").unwrap();
        assert!(active.iter().all(|c| c.id != receita));
        assert!(matches!(
            store.deactivate_category(Uuid::new_v4()),
            Err(DreError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn test_periods_oldest_first() {
        let (mut store, march, _) = seeded();
        let january = store
            .save_period(DrePeriod::from_label("acme", "2024-01").unwrap())
            .unwrap();
        let quarter = store
            .save_period(DrePeriod::from_label("acme", "2024-04:2024-06").unwrap())
            .unwrap();
        store
            .save_period(DrePeriod::from_label("globex", "2023-12").unwrap())
            .unwrap();

        let ids: Vec<Uuid> = store.periods("acme").unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![january.id, march.id, quarter.id]);
    }
}
