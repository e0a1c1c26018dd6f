use crate::engine::DreReport;
use crate::utils::round_to;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Summed straight from category totals.
    Input,
    Subtotal,
    /// Bottom line of the statement.
    NetResult,
    Margin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DreLine {
    pub key: &'static str,
    pub label: &'static str,
    pub value: f64,
    pub kind: LineKind,
}

impl DreLine {
    fn new(key: &'static str, label: &'static str, value: f64, kind: LineKind) -> Self {
        Self {
            key,
            label,
            value,
            kind,
        }
    }
}

impl DreReport {
    /// The statement in display order, margins last.
    pub fn lines(&self) -> Vec<DreLine> {
        use LineKind::*;
        vec![
            DreLine::new("receita_bruta", "Receita Bruta", self.receita_bruta, Input),
            DreLine::new(
                "deducoes_receita",
                "(-) Deduções da Receita",
                self.deducoes_receita,
                Input,
            ),
            DreLine::new(
                "receita_liquida",
                "Receita Líquida",
                self.receita_liquida,
                Subtotal,
            ),
            DreLine::new(
                "custo_produtos",
                "(-) Custo dos Produtos Vendidos",
                self.custo_produtos,
                Input,
            ),
            DreLine::new("lucro_bruto", "Lucro Bruto", self.lucro_bruto, Subtotal),
            DreLine::new(
                "despesas_administrativas",
                "(-) Despesas Administrativas",
                self.despesas_administrativas,
                Input,
            ),
            DreLine::new(
                "despesas_comerciais",
                "(-) Despesas Comerciais",
                self.despesas_comerciais,
                Input,
            ),
            DreLine::new(
                "despesas_gerais",
                "(-) Despesas Gerais",
                self.despesas_gerais,
                Input,
            ),
            DreLine::new(
                "total_despesas_operacionais",
                "Total Despesas Operacionais",
                self.total_despesas_operacionais,
                Subtotal,
            ),
            DreLine::new("ebitda", "EBITDA", self.ebitda, Subtotal),
            DreLine::new(
                "depreciacao_amortizacao",
                "(-) Depreciação e Amortização",
                self.depreciacao_amortizacao,
                Input,
            ),
            DreLine::new("ebit", "EBIT", self.ebit, Subtotal),
            DreLine::new(
                "receitas_financeiras",
                "(+) Receitas Financeiras",
                self.receitas_financeiras,
                Input,
            ),
            DreLine::new(
                "despesas_financeiras",
                "(-) Despesas Financeiras",
                self.despesas_financeiras,
                Input,
            ),
            DreLine::new(
                "resultado_financeiro",
                "Resultado Financeiro",
                self.resultado_financeiro,
                Subtotal,
            ),
            DreLine::new("lair", "Lucro Antes do IR (LAIR)", self.lair, Subtotal),
            DreLine::new(
                "imposto_renda",
                "(-) Imposto de Renda",
                self.imposto_renda,
                Input,
            ),
            DreLine::new("csll", "(-) CSLL", self.csll, Input),
            DreLine::new(
                "lucro_liquido",
                "Lucro Líquido",
                self.lucro_liquido,
                NetResult,
            ),
            DreLine::new(
                "margem_bruta",
                "Margem Bruta (%)",
                self.margem_bruta,
                Margin,
            ),
            DreLine::new(
                "margem_ebitda",
                "Margem EBITDA (%)",
                self.margem_ebitda,
                Margin,
            ),
            DreLine::new(
                "margem_operacional",
                "Margem Operacional (%)",
                self.margem_operacional,
                Margin,
            ),
            DreLine::new(
                "margem_liquida",
                "Margem Líquida (%)",
                self.margem_liquida,
                Margin,
            ),
        ]
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Key,Label,Value,Kind\n");

        for line in self.lines() {
            output.push_str(&format!(
                "{},{},{:.2},{}\n",
                line.key,
                line.label,
                round_to(line.value, 2),
                kind_name(line.kind)
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# DRE - {}\n\n", self.period.name));
        output.push_str(&format!(
            "**Período:** {} a {}\n\n",
            self.period.start_date.format("%d/%m/%Y"),
            self.period.end_date.format("%d/%m/%Y")
        ));

        output.push_str("| Linha | Valor |\n");
        output.push_str("|---|---:|\n");
        for line in self.lines() {
            let value = round_to(line.value, 2);
            match line.kind {
                LineKind::Input => {
                    output.push_str(&format!("| {} | {:.2} |\n", line.label, value))
                }
                LineKind::Subtotal | LineKind::NetResult => {
                    output.push_str(&format!("| **{}** | **{:.2}** |\n", line.label, value))
                }
                LineKind::Margin => {
                    output.push_str(&format!("| _{}_ | _{:.2}%_ |\n", line.label, value))
                }
            }
        }
        output.push('\n');

        output
    }
}

fn kind_name(kind: LineKind) -> &'static str {
    match kind {
        LineKind::Input => "input",
        LineKind::Subtotal => "subtotal",
        LineKind::NetResult => "result",
        LineKind::Margin => "margin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CategoryTotals;
    use crate::schema::{DreCategoryType, DrePeriod};

    fn sample() -> DreReport {
        let mut totals = CategoryTotals::default();
        totals.add(DreCategoryType::ReceitaBruta, 12_000.0);
        totals.add(DreCategoryType::CustoProdutos, 4_000.0);
        totals.add(DreCategoryType::DespesaComercial, 1_000.555);
        DreReport::from_totals(DrePeriod::from_label("acme", "2024-06").unwrap(), &totals)
    }

    #[test]
    fn test_lines_order_and_kinds() {
        let lines = sample().lines();
        assert_eq!(lines.len(), 23);
        assert_eq!(lines[0].key, "receita_bruta");
        assert_eq!(lines[18].key, "lucro_liquido");
        assert_eq!(lines[18].kind, LineKind::NetResult);
        assert!(lines[19..].iter().all(|l| l.kind == LineKind::Margin));
    }

    #[test]
    fn test_to_csv() {
        let csv = sample().to_csv();
        assert!(csv.starts_with("Key,Label,Value,Kind\n"));
        assert!(csv.contains("receita_bruta,Receita Bruta,12000.00,input"));
        assert!(csv.contains("lucro_bruto,Lucro Bruto,8000.00,subtotal"));
        assert_eq!(csv.lines().count(), 24);
    }

    #[test]
    fn test_to_markdown() {
        let md = sample().to_markdown();
        assert!(md.contains("# DRE - 2024-06"));
        assert!(md.contains("01/06/2024 a 30/06/2024"));
        assert!(md.contains("| **Lucro Bruto** | **8000.00** |"));
        assert!(md.contains("Margem Bruta (%)"));
    }

    #[test]
    fn test_to_json() {
        let report = sample();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"margem_ebitda\""));
        let parsed: DreReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.period, report.period);
        assert_eq!(parsed.receita_bruta, 12_000.0);
    }
}
