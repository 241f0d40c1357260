//! `catalog`: dataset totals and the options each filter control offers.

use crate::fetch::load_artifacts;
use crate::{FilterArgs, SourceArgs};
use fcp_core::DimensionCatalog;
use fcp_data::{available_products, available_subcategories, DeclarativeFilterState};
use fcp_utils::numbers::format_currency;
use fcp_utils::periods::format_period;
use std::fmt::Write;

pub async fn run_catalog(source: &SourceArgs, filters: &FilterArgs) -> anyhow::Result<()> {
    let loaded = load_artifacts(&source.source()).await?;
    print!(
        "{}",
        render_catalog(loaded.store.catalog(), &filters.declarative())
    );
    Ok(())
}

fn list<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    let joined = values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

pub fn render_catalog(catalog: &DimensionCatalog, filters: &DeclarativeFilterState) -> String {
    let stats = &catalog.stats;
    let mut out = String::new();
    let _ = writeln!(out, "Registros: {}", stats.total_registros);
    if let (Some(start), Some(end)) = (stats.periodo_inicio, stats.periodo_fim) {
        let _ = writeln!(
            out,
            "Período: {} a {}",
            format_period(&start),
            format_period(&end)
        );
    }
    let _ = writeln!(
        out,
        "{} anos, {} regiões, {} categorias, {} produtos",
        stats.total_anos, stats.total_regioes, stats.total_categorias, stats.total_produtos
    );

    let _ = writeln!(out, "\nAnos: {}", list(&catalog.years));
    let _ = writeln!(out, "Regiões: {}", list(catalog.selectable_regions()));
    let _ = writeln!(out, "Categorias: {}", list(&catalog.categories));
    let _ = writeln!(
        out,
        "Subcategorias: {}",
        list(available_subcategories(catalog, filters))
    );
    let _ = writeln!(out, "Produtos: {}", list(available_products(catalog, filters)));

    if !catalog.latest_category_means.is_empty() {
        let latest = catalog
            .latest_period
            .map(|p| format_period(&p))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "\nPreço médio por categoria em {}:", latest);
        for (category, mean) in &catalog.latest_category_means {
            let _ = writeln!(out, "  {:<24} {:>16}", category, format_currency(*mean));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn catalog_without_selection() {
        let store = fixtures::store();
        let text = render_catalog(store.catalog(), &DeclarativeFilterState::default());
        assert!(text.contains("Registros: 3"));
        assert!(text.contains("Período: Jan/2023 a Fev/2023"));
        assert!(text.contains("Regiões: Norte, Sul\n"));
        assert!(text.contains("Subcategorias: -"));
        assert!(text.contains("Produtos: -"));
    }

    #[test]
    fn catalog_dependent_options() {
        let store = fixtures::store();
        let mut filters = DeclarativeFilterState::default();
        filters.select_category(Some("TORAS"));
        let text = render_catalog(store.catalog(), &filters);
        assert!(text.contains("Subcategorias: Pinus"));
        assert!(text.contains("Produtos: -"));

        filters.select_subcategory(Some("Pinus"));
        let text = render_catalog(store.catalog(), &filters);
        assert!(text.contains("Produtos: Tora"));
    }
}
