//! CLI rendering for conversion results and overviews

use crate::asset::{AssetClass, Mode};
use crate::engine::{ConversionRequest, Equivalent, ValuationEngine};
use crate::format::number_format;
use crate::overview;
use crate::ui;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run_convert(engine: &ValuationEngine, request: ConversionRequest) -> Result<()> {
    let results = engine.convert(&request).await?;

    println!(
        "{}\n",
        ui::style_text(
            &format!(
                "{} {} ({} region)",
                number_format(request.value, 2),
                request.asset,
                request.region
            ),
            ui::StyleType::Title
        )
    );

    if results.is_empty() {
        println!(
            "{}",
            ui::style_text("No price data available for any target asset.", ui::StyleType::Error)
        );
        return Ok(());
    }

    println!("{}", display_as_table(engine, &results));

    if results.iter().any(|e| e.stale) {
        println!(
            "\n{}",
            ui::style_text(
                "Some prices exceeded their refresh interval and may be outdated.",
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}

fn display_as_table(engine: &ValuationEngine, results: &[Equivalent]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell("Value"),
        ui::header_cell("Equivalent"),
        ui::header_cell("Freshness"),
    ]);

    for equivalent in results {
        let decimals = engine
            .registry()
            .class_of(&equivalent.asset)
            .unwrap_or(AssetClass::Fiat)
            .display_decimals();
        table.add_row(vec![
            Cell::new(&equivalent.asset),
            ui::value_cell(&number_format(equivalent.value, decimals)),
            Cell::new(&equivalent.equiv),
            ui::freshness_cell(equivalent.stale),
        ]);
    }

    table.to_string()
}

pub async fn run_overview(engine: &ValuationEngine, asset: &str, mode: Mode) -> Result<()> {
    let overview = overview::generate(engine, asset, mode).await;

    println!(
        "{}\n",
        ui::style_text(&format!("{asset} ({mode} term)"), ui::StyleType::Title)
    );
    println!("{}\n", overview.summary);
    for bullet in &overview.bullets {
        println!("  • {bullet}");
    }
    println!(
        "\nConfidence: {}",
        ui::style_text(&overview.confidence.to_string(), ui::StyleType::Success)
    );

    if let (Some(first), Some(last)) = (overview.chart_data.first(), overview.chart_data.last()) {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "Simulated series: {} points, {} ({}) to {} ({})",
                    overview.chart_data.len(),
                    number_format(first.value, 2),
                    first.date,
                    number_format(last.value, 2),
                    last.date
                ),
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}
