use chrono::NaiveDate;
use dre_engine::*;

fn main() -> dre_engine::Result<()> {
    println!("📊 DRE Workflow Demo\n");

    let mut store = InMemoryDreStore::new();
    store.add_categories(default_categories("cafe-aurora"));
    let settings = DreSettings {
        forecast_months: 3,
        sector: Some("alimentação".to_string()),
        divida_bruta: 80_000.0,
        caixa: 25_000.0,
        ..DreSettings::default()
    };
    let mut service = DreService::new(store, settings)?;

    let receita = service
        .store()
        .active_categories("cafe-aurora")?
        .into_iter()
        .find(|c| c.category_type == DreCategoryType::ReceitaBruta)
        .map(|c| c.id)
        .ok_or_else(|| DreError::InvalidSettings("taxonomy has no gross revenue".to_string()))?;

    let mut period_ids = Vec::new();
    for (month, sales) in [(1u32, 30_000.0), (2, 31_500.0), (3, 34_000.0), (4, 35_200.0)] {
        let period = service
            .store_mut()
            .save_period(DrePeriod::from_label("cafe-aurora", &format!("2024-{:02}", month))?)?;
        service
            .store_mut()
            .upsert_entry(DreEntry::new(period.id, receita, "Vendas balcão", sales))?;

        let date = |day| NaiveDate::from_ymd_opt(2024, month, day).unwrap_or(period.start_date);
        let rows = vec![
            BankStatementRow {
                date: date(5),
                description: "Fornecedor café em grãos".to_string(),
                amount: -(sales * 0.3),
            },
            BankStatementRow {
                date: date(8),
                description: "Aluguel do salão".to_string(),
                amount: -6_000.0,
            },
            BankStatementRow {
                date: date(10),
                description: "Folha de pagamento".to_string(),
                amount: -9_000.0,
            },
            BankStatementRow {
                date: date(28),
                description: "Tarifa bancária".to_string(),
                amount: -120.0,
            },
        ];
        let import = service.import_statement("cafe-aurora", &rows)?;
        println!(
            "{}: imported {} rows ({} classified, {} unclassified)",
            period.name,
            import.transactions.len(),
            import.classified_count,
            import.unclassified_count
        );

        period_ids.push(period.id);
    }

    let latest = service.build_report(period_ids[period_ids.len() - 1])?;
    println!("\n{}", latest.to_markdown());

    let forecast = service.forecast(&period_ids, None)?;
    println!(
        "Forecast: trend {:?}, growth {:.1}%/yr, confidence {:.2}",
        forecast.trend, forecast.growth_rate, forecast.confidence
    );
    for p in &forecast.periods {
        println!(
            "  {}  receita {:>12.2}  ebitda {:>12.2}  margem {:>6.2}%",
            p.periodo, p.receita_liquida, p.ebitda, p.margem_ebitda
        );
    }

    let summary = service.valuation(latest.period.id, &period_ids)?;
    println!(
        "\nValuation: EBITDA {:.2} x {:.1} = EV {:.2}, equity {:.2}",
        summary.ebitda,
        summary.multiplo,
        summary.valuation.enterprise_value,
        summary.valuation.equity_value
    );

    Ok(())
}
