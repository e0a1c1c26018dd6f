use crate::error::{DreError, Result};
use crate::utils::{months_between, parse_period_string};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DreCategoryType {
    #[schemars(description = "Gross revenue from sales of goods and services")]
    ReceitaBruta,

    #[schemars(description = "Deductions from gross revenue: sales taxes, returns, discounts granted")]
    DeducaoReceita,

    #[schemars(description = "Cost of goods sold / services rendered")]
    CustoProdutos,

    #[schemars(description = "Administrative expenses: payroll of back office, accounting, software")]
    DespesaAdministrativa,

    #[schemars(description = "Commercial expenses: marketing, commissions, freight on sales")]
    DespesaComercial,

    #[schemars(description = "General expenses: rent, utilities, maintenance")]
    DespesaGeral,

    #[schemars(description = "Depreciation and amortization")]
    DepreciacaoAmortizacao,

    #[schemars(description = "Financial income: interest earned, yields on investments")]
    ReceitaFinanceira,

    #[schemars(description = "Financial expenses: interest paid, bank fees, IOF")]
    DespesaFinanceira,

    #[schemars(description = "Corporate income tax (IRPJ)")]
    ImpostoRenda,

    #[schemars(description = "Social contribution on net profit (CSLL)")]
    Csll,
}

impl DreCategoryType {
    /// Every category type, in waterfall order.
    pub const ALL: [DreCategoryType; 11] = [
        DreCategoryType::ReceitaBruta,
        DreCategoryType::DeducaoReceita,
        DreCategoryType::CustoProdutos,
        DreCategoryType::DespesaAdministrativa,
        DreCategoryType::DespesaComercial,
        DreCategoryType::DespesaGeral,
        DreCategoryType::DepreciacaoAmortizacao,
        DreCategoryType::ReceitaFinanceira,
        DreCategoryType::DespesaFinanceira,
        DreCategoryType::ImpostoRenda,
        DreCategoryType::Csll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DreCategoryType::ReceitaBruta => "receita_bruta",
            DreCategoryType::DeducaoReceita => "deducao_receita",
            DreCategoryType::CustoProdutos => "custo_produtos",
            DreCategoryType::DespesaAdministrativa => "despesa_administrativa",
            DreCategoryType::DespesaComercial => "despesa_comercial",
            DreCategoryType::DespesaGeral => "despesa_geral",
            DreCategoryType::DepreciacaoAmortizacao => "depreciacao_amortizacao",
            DreCategoryType::ReceitaFinanceira => "receita_financeira",
            DreCategoryType::DespesaFinanceira => "despesa_financeira",
            DreCategoryType::ImpostoRenda => "imposto_renda",
            DreCategoryType::Csll => "csll",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DreCategoryType::ReceitaBruta => "Receita Bruta",
            DreCategoryType::DeducaoReceita => "Deduções da Receita",
            DreCategoryType::CustoProdutos => "Custo dos Produtos Vendidos",
            DreCategoryType::DespesaAdministrativa => "Despesas Administrativas",
            DreCategoryType::DespesaComercial => "Despesas Comerciais",
            DreCategoryType::DespesaGeral => "Despesas Gerais",
            DreCategoryType::DepreciacaoAmortizacao => "Depreciação e Amortização",
            DreCategoryType::ReceitaFinanceira => "Receitas Financeiras",
            DreCategoryType::DespesaFinanceira => "Despesas Financeiras",
            DreCategoryType::ImpostoRenda => "Imposto de Renda",
            DreCategoryType::Csll => "CSLL",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct DreCategory {
    pub id: Uuid,
    pub company_id: String,
    pub name: String,

    #[serde(rename = "type")]
    #[schemars(description = "Which waterfall bucket amounts in this category are summed into")]
    pub category_type: DreCategoryType,

    pub display_order: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl DreCategory {
    pub fn new(
        company_id: impl Into<String>,
        name: impl Into<String>,
        category_type: DreCategoryType,
        display_order: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id: company_id.into(),
            name: name.into(),
            category_type,
            display_order,
            is_active: true,
        }
    }
}

/// The standard taxonomy seeded for a new tenant: one category per type, in waterfall order.
pub fn default_categories(company_id: &str) -> Vec<DreCategory> {
    DreCategoryType::ALL
        .iter()
        .enumerate()
        .map(|(idx, category_type)| {
            DreCategory::new(
                company_id,
                category_type.display_name(),
                *category_type,
                (idx as i32 + 1) * 10,
            )
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct DreEntry {
    pub id: Uuid,
    pub period_id: Uuid,
    pub category_id: Uuid,

    #[schemars(description = "Free-text line description. Together with period and category it identifies the entry")]
    pub description: String,

    #[schemars(description = "Signed amount in the tenant's currency")]
    pub value: f64,

    #[serde(default)]
    pub notes: Option<String>,
}

impl DreEntry {
    pub fn new(
        period_id: Uuid,
        category_id: Uuid,
        description: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            period_id,
            category_id,
            description: description.into(),
            value,
            notes: None,
        }
    }

    /// True when both entries address the same (period, category, description) slot.
    pub fn same_slot(&self, other: &DreEntry) -> bool {
        self.period_id == other.period_id
            && self.category_id == other.category_id
            && self.description == other.description
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ClassifiedTransaction {
    pub id: Uuid,
    pub company_id: String,
    pub date: NaiveDate,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    pub description: String,
    pub value: f64,

    #[serde(default)]
    pub dre_category_id: Option<Uuid>,

    #[serde(default)]
    #[schemars(description = "Only classified transactions with a category contribute to the statement")]
    pub is_classified: bool,

    #[serde(default)]
    #[schemars(description = "Set when the category was chosen by a user; automatic reclassification leaves it alone")]
    pub manually_classified: bool,
}

impl ClassifiedTransaction {
    pub fn new(
        company_id: impl Into<String>,
        date: NaiveDate,
        transaction_type: TransactionType,
        description: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id: company_id.into(),
            date,
            transaction_type,
            description: description.into(),
            value,
            dre_category_id: None,
            is_classified: false,
            manually_classified: false,
        }
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.dre_category_id = Some(category_id);
        self.is_classified = true;
        self
    }

    pub fn contributes(&self) -> bool {
        self.is_classified && self.dre_category_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ClassificationRule {
    pub id: Uuid,
    pub company_id: String,
    pub name: String,
    pub transaction_type: TransactionType,

    #[schemars(description = "A rule matches when any keyword appears in the normalized transaction description")]
    pub keywords: Vec<String>,

    pub category_id: Uuid,

    #[schemars(description = "Higher priority rules are evaluated first")]
    pub priority: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ClassificationRule {
    pub fn new(
        company_id: impl Into<String>,
        name: impl Into<String>,
        transaction_type: TransactionType,
        keywords: Vec<String>,
        category_id: Uuid,
        priority: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id: company_id.into(),
            name: name.into(),
            transaction_type,
            keywords,
            category_id,
            priority,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Month,
    Quarter,
    Year,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct DrePeriod {
    pub id: Uuid,
    pub company_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(rename = "type")]
    pub period_type: PeriodType,

    #[serde(default)]
    pub is_closed: bool,
}

impl DrePeriod {
    pub fn new(
        company_id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        period_type: PeriodType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id: company_id.into(),
            name: name.into(),
            start_date,
            end_date,
            period_type,
            is_closed: false,
        }
    }

    /// Builds a period from `YYYY-MM` or `YYYY-MM:YYYY-MM`.
    ///
    /// The period type is inferred from the number of months covered:
    /// 1 is a month, 3 a quarter, 12 a year, anything else is custom.
    pub fn from_label(company_id: impl Into<String>, label: &str) -> Result<Self> {
        let (start, end) = parse_period_string(label)?;
        let months = months_between(start, end) + 1;
        let period_type = match months {
            1 => PeriodType::Month,
            3 => PeriodType::Quarter,
            12 => PeriodType::Year,
            _ => PeriodType::Custom,
        };

        let period = Self::new(company_id, label.trim(), start, end, period_type);
        period.validate()?;
        Ok(period)
    }

    pub fn validate(&self) -> Result<()> {
        if self.end_date < self.start_date {
            return Err(DreError::InvalidPeriod {
                name: self.name.clone(),
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Everything the statement builder needs for one period.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DreInput {
    pub period: DrePeriod,

    #[schemars(description = "The tenant's category taxonomy")]
    pub categories: Vec<DreCategory>,

    #[serde(default)]
    pub entries: Vec<DreEntry>,

    #[serde(default)]
    pub transactions: Vec<ClassifiedTransaction>,
}

impl DreInput {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DreInput)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

fn default_true() -> bool {
    true
}
