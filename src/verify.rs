use crate::engine::{safe_percent, DreReport};
use crate::error::{DreError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallCheck {
    pub line: &'static str,
    pub expected: f64,
    pub actual: f64,
}

impl WaterfallCheck {
    fn new(line: &'static str, expected: f64, actual: f64) -> Self {
        Self {
            line,
            expected,
            actual,
        }
    }

    pub fn difference(&self) -> f64 {
        (self.expected - self.actual).abs()
    }
}

/// Re-derives every subtotal and margin of `report` from its input lines.
pub fn waterfall_checks(report: &DreReport) -> Vec<WaterfallCheck> {
    let r = report;
    vec![
        WaterfallCheck::new(
            "receita_liquida",
            r.receita_bruta - r.deducoes_receita,
            r.receita_liquida,
        ),
        WaterfallCheck::new(
            "lucro_bruto",
            r.receita_liquida - r.custo_produtos,
            r.lucro_bruto,
        ),
        WaterfallCheck::new(
            "total_despesas_operacionais",
            r.despesas_administrativas + r.despesas_comerciais + r.despesas_gerais,
            r.total_despesas_operacionais,
        ),
        WaterfallCheck::new(
            "ebitda",
            r.lucro_bruto - r.total_despesas_operacionais,
            r.ebitda,
        ),
        WaterfallCheck::new("ebit", r.ebitda - r.depreciacao_amortizacao, r.ebit),
        WaterfallCheck::new(
            "resultado_financeiro",
            r.receitas_financeiras - r.despesas_financeiras,
            r.resultado_financeiro,
        ),
        WaterfallCheck::new("lair", r.ebit + r.resultado_financeiro, r.lair),
        WaterfallCheck::new(
            "lucro_liquido",
            r.lair - r.imposto_renda - r.csll,
            r.lucro_liquido,
        ),
        WaterfallCheck::new(
            "margem_bruta",
            safe_percent(r.lucro_bruto, r.receita_liquida),
            r.margem_bruta,
        ),
        WaterfallCheck::new(
            "margem_ebitda",
            safe_percent(r.ebitda, r.receita_liquida),
            r.margem_ebitda,
        ),
        WaterfallCheck::new(
            "margem_operacional",
            safe_percent(r.ebit, r.receita_liquida),
            r.margem_operacional,
        ),
        WaterfallCheck::new(
            "margem_liquida",
            safe_percent(r.lucro_liquido, r.receita_liquida),
            r.margem_liquida,
        ),
    ]
}

pub fn verify_waterfall(report: &DreReport, tolerance: f64) -> Result<()> {
    for check in waterfall_checks(report) {
        // NaN differences fail too
        if !(check.difference() <= tolerance) {
            return Err(DreError::WaterfallViolation {
                line: check.line.to_string(),
                expected: check.expected,
                actual: check.actual,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CategoryTotals;
    use crate::schema::{DreCategoryType, DrePeriod};

    fn sample() -> DreReport {
        let mut totals = CategoryTotals::default();
        totals.add(DreCategoryType::ReceitaBruta, 10_000.0);
        totals.add(DreCategoryType::DeducaoReceita, 1_000.0);
        totals.add(DreCategoryType::DespesaGeral, 2_500.0);
        totals.add(DreCategoryType::Csll, 300.0);
        DreReport::from_totals(DrePeriod::from_label("acme", "2024-06").unwrap(), &totals)
    }

    #[test]
    fn test_built_report_verifies() {
        assert!(verify_waterfall(&sample(), 0.0).is_ok());
    }

    #[test]
    fn test_tampered_report_fails() {
        let mut report = sample();
        report.ebitda += 1.0;

        match verify_waterfall(&report, 0.01) {
            Err(DreError::WaterfallViolation { line, .. }) => assert_eq!(line, "ebitda"),
            other => panic!("expected violation, got {:?}", other),
        }
    }

    #[test]
    fn test_tolerance_absorbs_small_drift() {
        let mut report = sample();
        report.lucro_liquido += 0.004;
        assert!(verify_waterfall(&report, 0.01).is_ok());
        assert!(verify_waterfall(&report, 0.001).is_err());
    }
}
