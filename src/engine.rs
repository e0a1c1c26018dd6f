use crate::schema::{ClassifiedTransaction, DreCategory, DreCategoryType, DreEntry, DrePeriod};
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// `100 * numerator / base`, or zero when the base is zero.
pub fn safe_percent(numerator: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        100.0 * numerator / base
    }
}

/// Per-type sums of manual entries and classified transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    totals: BTreeMap<DreCategoryType, f64>,
}

impl CategoryTotals {
    pub fn get(&self, category_type: DreCategoryType) -> f64 {
        self.totals.get(&category_type).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, category_type: DreCategoryType, value: f64) {
        *self.totals.entry(category_type).or_default() += value;
    }

    pub fn collect(
        entries: &[DreEntry],
        categories: &[DreCategory],
        transactions: &[ClassifiedTransaction],
    ) -> Self {
        let types_by_id: HashMap<Uuid, DreCategoryType> = categories
            .iter()
            .map(|c| (c.id, c.category_type))
            .collect();

        let mut totals = Self::default();

        for entry in entries {
            match types_by_id.get(&entry.category_id) {
                Some(category_type) => totals.add(*category_type, entry.value),
                None => warn!(
                    "Entry '{}' references unknown category {}; skipped",
                    entry.description, entry.category_id
                ),
            }
        }

        for transaction in transactions.iter().filter(|t| t.is_classified) {
            let Some(category_id) = transaction.dre_category_id else {
                continue;
            };
            match types_by_id.get(&category_id) {
                Some(category_type) => totals.add(*category_type, transaction.value),
                None => warn!(
                    "Transaction '{}' references unknown category {}; skipped",
                    transaction.description, category_id
                ),
            }
        }

        totals
    }
}

/// An income statement for one period. Derived on demand, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DreReport {
    pub period: DrePeriod,

    pub receita_bruta: f64,
    pub deducoes_receita: f64,
    pub receita_liquida: f64,
    pub custo_produtos: f64,
    pub lucro_bruto: f64,
    pub despesas_administrativas: f64,
    pub despesas_comerciais: f64,
    pub despesas_gerais: f64,
    pub total_despesas_operacionais: f64,
    pub ebitda: f64,
    pub depreciacao_amortizacao: f64,
    pub ebit: f64,
    pub receitas_financeiras: f64,
    pub despesas_financeiras: f64,
    pub resultado_financeiro: f64,
    pub lair: f64,
    pub imposto_renda: f64,
    pub csll: f64,
    pub lucro_liquido: f64,

    #[schemars(description = "Gross margin, percent of net revenue")]
    pub margem_bruta: f64,
    #[schemars(description = "EBITDA margin, percent of net revenue")]
    pub margem_ebitda: f64,
    #[schemars(description = "Operating (EBIT) margin, percent of net revenue")]
    pub margem_operacional: f64,
    #[schemars(description = "Net margin, percent of net revenue")]
    pub margem_liquida: f64,
}

impl DreReport {
    pub fn from_totals(period: DrePeriod, totals: &CategoryTotals) -> Self {
        let receita_bruta = totals.get(DreCategoryType::ReceitaBruta);
        let deducoes_receita = totals.get(DreCategoryType::DeducaoReceita);
        let receita_liquida = receita_bruta - deducoes_receita;

        let custo_produtos = totals.get(DreCategoryType::CustoProdutos);
        let lucro_bruto = receita_liquida - custo_produtos;

        let despesas_administrativas = totals.get(DreCategoryType::DespesaAdministrativa);
        let despesas_comerciais = totals.get(DreCategoryType::DespesaComercial);
        let despesas_gerais = totals.get(DreCategoryType::DespesaGeral);
        let total_despesas_operacionais =
            despesas_administrativas + despesas_comerciais + despesas_gerais;

        let ebitda = lucro_bruto - total_despesas_operacionais;
        let depreciacao_amortizacao = totals.get(DreCategoryType::DepreciacaoAmortizacao);
        let ebit = ebitda - depreciacao_amortizacao;

        let receitas_financeiras = totals.get(DreCategoryType::ReceitaFinanceira);
        let despesas_financeiras = totals.get(DreCategoryType::DespesaFinanceira);
        let resultado_financeiro = receitas_financeiras - despesas_financeiras;

        let lair = ebit + resultado_financeiro;
        let imposto_renda = totals.get(DreCategoryType::ImpostoRenda);
        let csll = totals.get(DreCategoryType::Csll);
        let lucro_liquido = lair - imposto_renda - csll;

        Self {
            period,
            receita_bruta,
            deducoes_receita,
            receita_liquida,
            custo_produtos,
            lucro_bruto,
            despesas_administrativas,
            despesas_comerciais,
            despesas_gerais,
            total_despesas_operacionais,
            ebitda,
            depreciacao_amortizacao,
            ebit,
            receitas_financeiras,
            despesas_financeiras,
            resultado_financeiro,
            lair,
            imposto_renda,
            csll,
            lucro_liquido,
            margem_bruta: safe_percent(lucro_bruto, receita_liquida),
            margem_ebitda: safe_percent(ebitda, receita_liquida),
            margem_operacional: safe_percent(ebit, receita_liquida),
            margem_liquida: safe_percent(lucro_liquido, receita_liquida),
        }
    }
}

/// Builds the statement for `period` from manual entries plus classified transactions.
pub fn calculate_dre(
    period: &DrePeriod,
    entries: &[DreEntry],
    categories: &[DreCategory],
    transactions: &[ClassifiedTransaction],
) -> DreReport {
    debug!(
        "Calculating DRE for period '{}' from {} entries and {} transactions",
        period.name,
        entries.len(),
        transactions.len()
    );

    let totals = CategoryTotals::collect(entries, categories, transactions);
    DreReport::from_totals(period.clone(), &totals)
}
