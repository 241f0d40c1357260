//! `forecast`: the selected segment, its recent history, one card per model
//! and the detailed per-period table.

use crate::export::export_forecast_to_dir;
use crate::fetch::load_artifacts;
use crate::{FilterArgs, SourceArgs};
use anyhow::Context;
use fcp_core::{ForecastArtifact, ModelMetrics, Period, SegmentKey};
use fcp_data::{forecast_table, model_kpis, Dashboard, ForecastTable};
use fcp_utils::numbers::format_currency;
use fcp_utils::periods::{format_period, months_between};
use std::fmt::Write;
use std::path::Path;

pub async fn run_forecast(
    source: &SourceArgs,
    filters: &FilterArgs,
    horizon: Option<usize>,
    export_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let loaded = load_artifacts(&source.source()).await?;
    let artifact = loaded.forecasts.as_ref();
    let mut dashboard = Dashboard::new(loaded.store.records(), artifact);
    filters.apply(&mut dashboard);
    print!("{}", render_forecast(&dashboard, artifact, horizon));

    if let Some(dir) = export_dir {
        let selection = dashboard.forecast();
        let selected = selection
            .available()
            .context("no forecast to export for the selected filters")?;
        let path = export_forecast_to_dir(&forecast_table(selected, horizon), artifact, dir)?;
        println!("{}", path.display());
    }
    Ok(())
}

/// Human label of a segment key, e.g. "Geral" or "Região: Norte".
fn segment_label(key: &str) -> String {
    let Ok(segment) = key.parse::<SegmentKey>() else {
        return key.to_string();
    };
    if segment.is_general() {
        return "Geral".to_string();
    }
    let mut parts = Vec::new();
    if let Some(year) = segment.year {
        parts.push(format!("Ano: {}", year));
    }
    let named = [
        ("Região", &segment.region),
        ("Categoria", &segment.category),
        ("Subcategoria", &segment.subcategory),
        ("Produto", &segment.product),
    ];
    for (label, value) in named {
        if let Some(value) = value {
            parts.push(format!("{}: {}", label, value));
        }
    }
    parts.join(" \u{2022} ")
}

fn label_of<'a>(artifact: Option<&'a ForecastArtifact>, model: &'a str) -> &'a str {
    artifact.map(|a| a.model_label(model)).unwrap_or(model)
}

fn render_table(
    out: &mut String,
    table: &ForecastTable,
    artifact: Option<&ForecastArtifact>,
    last_observed: Option<Period>,
) {
    let _ = writeln!(out, "\nPrevisões detalhadas:");
    let mut header = format!("  {:<10} {:>5}", "Período", "+m");
    for model in &table.models {
        let _ = write!(header, " {:>38}", label_of(artifact, model));
    }
    let _ = writeln!(out, "{}", header);
    for row in &table.rows {
        let ahead = last_observed
            .map(|last| format!("+{}", months_between(last, row.period)))
            .unwrap_or_else(|| "-".to_string());
        let mut line = format!("  {:<10} {:>5}", format_period(&row.period), ahead);
        for model in &table.models {
            let cell = match row.cell(model) {
                Some(cell) => format!(
                    "{} [{} - {}]",
                    format_currency(cell.value),
                    format_currency(cell.lower),
                    format_currency(cell.upper)
                ),
                None => "-".to_string(),
            };
            let _ = write!(line, " {:>38}", cell);
        }
        let _ = writeln!(out, "{}", line);
    }
}

fn metric(value: Option<f64>) -> String {
    match value {
        Some(v) if v > 0.0 => format_currency(v),
        _ => "-".to_string(),
    }
}

fn mape(metrics: &ModelMetrics) -> String {
    match metrics.mape {
        Some(v) if v > 0.0 => format!("{:.1}%", v * 100.0),
        _ => "-".to_string(),
    }
}

/// Text report of the forecast view. `artifact` only supplies model labels.
pub fn render_forecast(
    dashboard: &Dashboard<'_>,
    artifact: Option<&ForecastArtifact>,
    horizon: Option<usize>,
) -> String {
    let selection = dashboard.forecast();
    let mut out = String::new();
    let Some(selected) = selection.available() else {
        let _ = writeln!(out, "Previsão indisponível para a seleção atual.");
        return out;
    };

    let _ = writeln!(
        out,
        "Segmento: {} ({})",
        segment_label(&selected.segment_key),
        selected.segment_key
    );
    let _ = writeln!(out, "\nHistórico recente:");
    for point in &selected.historical_tail {
        let _ = writeln!(
            out,
            "  {:<10} {:>16}",
            format_period(&point.period),
            format_currency(point.mean)
        );
    }

    let kpis = model_kpis(selected, horizon);
    if kpis.is_empty() {
        let _ = writeln!(out, "\nNenhum modelo de previsão disponível.");
        return out;
    }
    let _ = writeln!(out, "\nModelos:");
    for card in kpis {
        let label = label_of(artifact, &card.model);
        let sign = if card.variation_pct >= 0.0 { "+" } else { "" };
        let _ = writeln!(
            out,
            "  {} ({} meses): {} ({}{:.1}% vs. atual) | MAE {} | RMSE {} | MAPE {}",
            label,
            card.forecast_months,
            format_currency(card.final_value),
            sign,
            card.variation_pct,
            metric(card.metrics.mae),
            metric(card.metrics.rmse),
            mape(&card.metrics)
        );
    }

    let last_observed = selected.historical_tail.last().map(|point| point.period);
    render_table(&mut out, &forecast_table(selected, horizon), artifact, last_observed);
    out
}
