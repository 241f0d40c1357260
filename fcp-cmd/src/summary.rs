//! `summary`: headline KPIs, the regional and category breakdowns and the
//! mean price per period.

use crate::fetch::load_artifacts;
use crate::{FilterArgs, SourceArgs};
use fcp_core::geo::RegionBoundaries;
use fcp_data::{evolution, headline, Dashboard, GroupedStatistics};
use fcp_utils::numbers::{format_currency, format_percent};
use fcp_utils::periods::format_period;
use std::fmt::Write;

pub async fn run_summary(source: &SourceArgs, filters: &FilterArgs) -> anyhow::Result<()> {
    let loaded = load_artifacts(&source.source()).await?;
    let mut dashboard = Dashboard::new(loaded.store.records(), None);
    filters.apply(&mut dashboard);
    print!("{}", render_summary(&dashboard, loaded.boundaries.as_ref()));
    Ok(())
}

/// Text report of the interactively filtered subset. With `boundaries` the
/// regional breakdown also lists the municipalities of each region.
pub fn render_summary(dashboard: &Dashboard<'_>, boundaries: Option<&RegionBoundaries>) -> String {
    let stats = dashboard.aggregations();
    let mut out = String::new();
    let _ = writeln!(out, "Filtros: {}", dashboard.filters().summary());
    for (dimension, value) in dashboard.interactive().active() {
        let _ = writeln!(out, "Filtro ativo: {} = {}", dimension.label(), value);
    }
    let _ = writeln!(out);

    if stats.total_count == 0 {
        let _ = writeln!(out, "Nenhum registro encontrado para os filtros selecionados.");
        return out;
    }
    render_kpis(&mut out, &stats);
    render_breakdowns(&mut out, &stats, boundaries);
    render_evolution(&mut out, &stats);
    out
}

fn render_kpis(out: &mut String, stats: &GroupedStatistics) {
    let kpis = headline(stats);
    let _ = writeln!(
        out,
        "Preço médio: {} (mín {} | máx {})",
        format_currency(kpis.mean_price),
        format_currency(kpis.min_price),
        format_currency(kpis.max_price)
    );
    let _ = writeln!(
        out,
        "Registros: {} ({} produtos diferentes)",
        kpis.total_count, kpis.product_count
    );
    let variation = kpis
        .variation
        .map(|v| format_percent(v, 1))
        .unwrap_or_else(|| "-".to_string());
    match kpis.period_span {
        Some((first, last)) => {
            let _ = writeln!(
                out,
                "Variação no período: {} ({} a {})",
                variation,
                format_period(&first),
                format_period(&last)
            );
        }
        None => {
            let _ = writeln!(out, "Variação no período: {}", variation);
        }
    }
    let _ = writeln!(
        out,
        "Categorias: {} ({})",
        kpis.category_count,
        kpis.top_categories.join(", ")
    );
}

fn municipalities(boundaries: Option<&RegionBoundaries>, region: &str) -> String {
    match boundaries.map(|b| b.get(region)) {
        Some(Some(boundary)) => format!("{:>5} municípios", boundary.municipality_count),
        Some(None) => format!("{:>5} municípios", "-"),
        None => String::new(),
    }
}

fn render_breakdowns(
    out: &mut String,
    stats: &GroupedStatistics,
    boundaries: Option<&RegionBoundaries>,
) {
    let mut regions: Vec<_> = stats.by_region.iter().collect();
    regions.sort_by(|a, b| b.1.mean.total_cmp(&a.1.mean));
    let _ = writeln!(out, "\nPor região:");
    for (region, group) in regions {
        let line = format!(
            "  {:<24} {:>16} {:>8} {}",
            region,
            format_currency(group.mean),
            group.count,
            municipalities(boundaries, region)
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }

    let _ = writeln!(out, "\nPor categoria:");
    for (category, group) in &stats.by_category {
        let _ = writeln!(
            out,
            "  {:<24} {:>16} {:>8} {:>4} produtos",
            category,
            format_currency(group.mean),
            group.count,
            group.distinct_product_count
        );
    }
}

fn render_evolution(out: &mut String, stats: &GroupedStatistics) {
    let _ = writeln!(out, "\nEvolução mensal:");
    for point in evolution(stats) {
        let change = point
            .change
            .map(|c| format_percent(c, 1))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {:<10} {:>16} {:>8} {:>8}",
            format_period(&point.period),
            format_currency(point.mean),
            point.count,
            change
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use fcp_data::ChartClick;

    #[test]
    fn summary_lists_kpis_and_breakdowns() {
        let store = fixtures::store();
        let dashboard = Dashboard::new(store.records(), None);
        let text = render_summary(&dashboard, None);
        assert!(text.contains("Registros: 3 (2 produtos diferentes)"));
        assert!(text.contains("Por região:"));
        assert!(text.contains("Norte"));
        assert!(text.contains("LENHA"));
        assert!(text.contains("Jan/2023 a Fev/2023"));
    }

    #[test]
    fn summary_of_empty_selection() {
        let store = fixtures::store();
        let mut dashboard = Dashboard::new(store.records(), None);
        dashboard.click(&ChartClick::Year(1999));
        let text = render_summary(&dashboard, None);
        assert!(text.contains("Filtro ativo: Ano = 1999"));
        assert!(text.contains("Nenhum registro"));
    }

    #[test]
    fn summary_joins_region_boundaries() {
        let store = fixtures::store();
        let dashboard = Dashboard::new(store.records(), None);
        let boundaries = RegionBoundaries::from_geojson(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"regiao": "Norte", "num_municipios": 42},
                 "geometry": null}
            ]}"#,
        )
        .unwrap();
        let text = render_summary(&dashboard, Some(&boundaries));
        let norte = text.lines().find(|l| l.trim_start().starts_with("Norte")).unwrap();
        assert!(norte.ends_with("42 municípios"));
        let sul = text.lines().find(|l| l.trim_start().starts_with("Sul")).unwrap();
        assert!(sul.ends_with("- municípios"));

        let plain = render_summary(&dashboard, None);
        assert!(!plain.contains("municípios"));
    }

    #[test]
    fn summary_lists_monthly_evolution() {
        let store = fixtures::store();
        let dashboard = Dashboard::new(store.records(), None);
        let text = render_summary(&dashboard, None);
        let evolution = &text[text.find("Evolução mensal:").unwrap()..];
        let lines: Vec<&str> = evolution.lines().skip(1).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Jan/2023") && lines[0].contains("R$ 100,00"));
        // (120 + 50.5) / 2 = 85.25 against 100
        assert!(lines[1].contains("Fev/2023") && lines[1].contains("R$ 85,25"));
        assert!(lines[1].ends_with("-14.8%"));
    }
}
