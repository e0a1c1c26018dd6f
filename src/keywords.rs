use crate::classifier::normalize_description;
use crate::schema::DreCategoryType;
use std::sync::OnceLock;

/// Built-in keyword heuristics, consulted after tenant rules.
///
/// Iteration order is fixed: groups in waterfall order, keywords in listed order.
pub const DEFAULT_KEYWORDS: &[(DreCategoryType, &[&str])] = &[
    (
        DreCategoryType::ReceitaBruta,
        &[
            "venda",
            "vendas",
            "faturamento",
            "receita de serviço",
            "prestação de serviço",
            "recebimento de cliente",
            "pix recebido",
            "mensalidade",
        ],
    ),
    (
        DreCategoryType::DeducaoReceita,
        &[
            "simples nacional",
            "icms",
            "cofins",
            "issqn",
            "devolução",
            "desconto concedido",
            "estorno de venda",
        ],
    ),
    (
        DreCategoryType::CustoProdutos,
        &[
            "fornecedor",
            "mercadoria",
            "matéria prima",
            "matéria-prima",
            "insumo",
            "compra de estoque",
            "frete de compra",
        ],
    ),
    (
        DreCategoryType::DespesaAdministrativa,
        &[
            "salário",
            "folha de pagamento",
            "pró-labore",
            "pro labore",
            "contabilidade",
            "contador",
            "honorários",
            "software",
            "material de escritório",
            "inss",
            "fgts",
        ],
    ),
    (
        DreCategoryType::DespesaComercial,
        &[
            "marketing",
            "publicidade",
            "propaganda",
            "anúncio",
            "comissão",
            "google ads",
            "facebook ads",
            "meta ads",
            "brinde",
        ],
    ),
    (
        DreCategoryType::DespesaGeral,
        &[
            "aluguel",
            "energia",
            "luz",
            "água",
            "internet",
            "telefone",
            "condomínio",
            "manutenção",
            "limpeza",
            "seguro",
        ],
    ),
    (
        DreCategoryType::DepreciacaoAmortizacao,
        &["depreciação", "amortização"],
    ),
    (
        DreCategoryType::ReceitaFinanceira,
        &[
            "rendimento",
            "juros recebidos",
            "aplicação financeira",
            "resgate de aplicação",
            "cashback",
        ],
    ),
    (
        DreCategoryType::DespesaFinanceira,
        &[
            "tarifa bancária",
            "tarifa",
            "juros",
            "iof",
            "multa",
            "taxa de cartão",
            "empréstimo",
        ],
    ),
    (
        DreCategoryType::ImpostoRenda,
        &["irpj", "imposto de renda"],
    ),
    (
        DreCategoryType::Csll,
        &["csll", "contribuição social"],
    ),
];

#[derive(Debug)]
pub struct KeywordGroup {
    pub category_type: DreCategoryType,
    pub keywords: Vec<String>,
}

/// [`DEFAULT_KEYWORDS`] with every keyword already normalized.
pub fn normalized_default_keywords() -> &'static [KeywordGroup] {
    static GROUPS: OnceLock<Vec<KeywordGroup>> = OnceLock::new();
    GROUPS.get_or_init(|| {
        DEFAULT_KEYWORDS
            .iter()
            .map(|(category_type, keywords)| KeywordGroup {
                category_type: *category_type,
                keywords: keywords
                    .iter()
                    .map(|k| normalize_description(k))
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_keywords() {
        for category_type in DreCategoryType::ALL {
            assert!(
                DEFAULT_KEYWORDS
                    .iter()
                    .any(|(t, k)| *t == category_type && !k.is_empty()),
                "missing keywords for {:?}",
                category_type
            );
        }
    }

    #[test]
    fn test_normalized_keywords_are_ascii() {
        for group in normalized_default_keywords() {
            for keyword in &group.keywords {
                assert!(keyword.is_ascii(), "{} is not normalized", keyword);
                assert_eq!(keyword, &normalize_description(keyword));
            }
        }
    }

    #[test]
    fn test_order_matches_source_table() {
        let groups = normalized_default_keywords();
        assert_eq!(groups.len(), DEFAULT_KEYWORDS.len());
        assert_eq!(groups[0].category_type, DreCategoryType::ReceitaBruta);
        assert_eq!(groups[0].keywords[0], "venda");
        assert!(groups
            .iter()
            .any(|g| g.keywords.iter().any(|k| k == "materia prima")));
    }
}
