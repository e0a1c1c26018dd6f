use crate::classifier::normalize_description;
use crate::utils::round_to;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MULTIPLE: f64 = 8.0;

/// Growth (percent) above which the multiple earns a premium.
pub const GROWTH_PREMIUM_THRESHOLD: f64 = 10.0;

/// EV/EBITDA multiples by sector. Keys are normalized and have no spaces.
pub const SECTOR_MULTIPLES: &[(&str, f64)] = &[
    ("saas", 20.0),
    ("software", 18.0),
    ("tecnologia", 15.0),
    ("saude", 12.0),
    ("educacao", 10.0),
    ("ecommerce", 10.0),
    ("financeiro", 10.0),
    ("servicos", 8.0),
    ("agronegocio", 8.0),
    ("industria", 7.0),
    ("alimentacao", 7.0),
    ("logistica", 7.0),
    ("consultoria", 7.0),
    ("varejo", 6.0),
    ("construcao", 6.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValuationInput {
    pub ebitda: f64,
    #[schemars(description = "EV/EBITDA multiple")]
    pub multiplo: f64,
    pub divida_bruta: f64,
    pub caixa: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValuationResult {
    pub enterprise_value: f64,
    pub divida_liquida: f64,
    pub equity_value: f64,
}

pub fn calculate_valuation(input: &ValuationInput) -> ValuationResult {
    let enterprise_value = input.ebitda * input.multiplo;
    let divida_liquida = input.divida_bruta - input.caixa;
    ValuationResult {
        enterprise_value,
        divida_liquida,
        equity_value: enterprise_value - divida_liquida,
    }
}

pub fn sector_multiple(sector: &str) -> Option<f64> {
    let key = normalize_description(sector).replace(' ', "");
    SECTOR_MULTIPLES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, multiple)| *multiple)
}

/// Sector base multiple plus 0.1x per growth point above 10%, one decimal.
pub fn estimate_multiple(sector: &str, growth_rate: f64) -> f64 {
    let base = sector_multiple(sector).unwrap_or(DEFAULT_MULTIPLE);
    let premium = ((growth_rate - GROWTH_PREMIUM_THRESHOLD) / 10.0).max(0.0);
    round_to(base + premium, 1)
}
