//! `products`: ranking of every product in the selection.

use crate::fetch::load_artifacts;
use crate::{FilterArgs, SourceArgs, TableArgs};
use fcp_data::{Dashboard, ProductRow, ProductTable, DEFAULT_PRODUCT_SORT};
use fcp_utils::numbers::format_currency;
use std::fmt::Write;

pub async fn run_products(
    source: &SourceArgs,
    filters: &FilterArgs,
    table: &TableArgs,
) -> anyhow::Result<()> {
    let loaded = load_artifacts(&source.source()).await?;
    let mut dashboard = Dashboard::new(loaded.store.records(), None);
    filters.apply(&mut dashboard);
    print!("{}", render_products(&dashboard.products(), table));
    Ok(())
}

impl TableArgs {
    /// Product rows to display; mean price descending unless asked otherwise.
    pub fn product_rows<'t>(&self, table: &'t ProductTable) -> Vec<&'t ProductRow> {
        let field = self.field(DEFAULT_PRODUCT_SORT);
        table.view(&self.search, field, self.order(field))
    }
}

pub fn render_products(table: &ProductTable, args: &TableArgs) -> String {
    let mut out = String::new();
    if table.is_empty() {
        let _ = writeln!(out, "Sem dados para exibir.");
        return out;
    }
    let rows = args.product_rows(table);
    let _ = writeln!(out, "Ranking de produtos ({} produtos)\n", rows.len());
    for row in rows {
        let _ = writeln!(
            out,
            "{:<32} {:<12} {:<16} {:>8} {:>16} {:>16} {:>16} {:>6} obs.",
            row.product,
            row.category,
            row.subcategory,
            row.unit.as_deref().unwrap_or("-"),
            format_currency(row.mean),
            format_currency(row.min),
            format_currency(row.max),
            row.count
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use fcp_data::SortField;

    #[test]
    fn products_ranked_by_mean() {
        let store = fixtures::store();
        let dashboard = Dashboard::new(store.records(), None);
        let text = render_products(&dashboard.products(), &TableArgs::default());
        assert!(text.contains("Ranking de produtos (2 produtos)"));
        // Tora averages 110 over two records, Lenha 50.5
        assert!(text.find("Tora").unwrap() < text.find("Lenha").unwrap());
        assert!(text.contains("R$ 110,00"));
        assert!(text.contains("R$ 100,00"));
    }

    #[test]
    fn products_search_and_sort() {
        let store = fixtures::store();
        let dashboard = Dashboard::new(store.records(), None);
        let table = dashboard.products();

        let args = TableArgs {
            sort: Some(SortField::Product),
            ..TableArgs::default()
        };
        let names: Vec<&str> = args
            .product_rows(&table)
            .iter()
            .map(|row| row.product.as_str())
            .collect();
        assert_eq!(names, vec!["Lenha", "Tora"]);

        let args = TableArgs {
            search: "pinus".to_string(),
            ..TableArgs::default()
        };
        let rows = args.product_rows(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 2);
    }

    #[test]
    fn products_of_empty_selection() {
        let store = fixtures::store();
        let mut dashboard = Dashboard::new(store.records(), None);
        dashboard.filters_mut().select_region(Some("Oeste"));
        let text = render_products(&dashboard.products(), &TableArgs::default());
        assert!(text.contains("Sem dados"));
    }
}
