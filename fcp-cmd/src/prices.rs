//! `prices`: current-price table of the declaratively filtered subset.

use crate::fetch::load_artifacts;
use crate::{FilterArgs, SourceArgs, TableArgs};
use fcp_data::{CurrentPriceRow, CurrentPriceTable, Dashboard, SortField};
use fcp_utils::numbers::{format_currency, format_percent};
use fcp_utils::periods::format_period_full;
use std::fmt::Write;

pub async fn run_prices(
    source: &SourceArgs,
    filters: &FilterArgs,
    table: &TableArgs,
) -> anyhow::Result<()> {
    let loaded = load_artifacts(&source.source()).await?;
    let mut dashboard = Dashboard::new(loaded.store.records(), None);
    filters.apply(&mut dashboard);
    print!("{}", render_prices(&dashboard.current_prices(), table));
    Ok(())
}

/// Column the price table is sorted by when none is requested.
pub const DEFAULT_PRICE_SORT: SortField = SortField::Category;

impl TableArgs {
    /// Price rows to display, searched and sorted.
    pub fn price_rows<'t>(&self, table: &'t CurrentPriceTable) -> Vec<&'t CurrentPriceRow> {
        let field = self.field(DEFAULT_PRICE_SORT);
        table.view(&self.search, field, self.order(field))
    }
}

pub fn render_prices(table: &CurrentPriceTable, args: &TableArgs) -> String {
    let mut out = String::new();
    let Some(latest) = table.latest_period else {
        let _ = writeln!(out, "Nenhum preço disponível para os filtros selecionados.");
        return out;
    };
    let _ = writeln!(out, "Preços atuais - {}", format_period_full(&latest));
    if let Some(previous) = table.previous_period {
        let _ = writeln!(out, "Comparado com {}", format_period_full(&previous));
    }

    let rows = args.price_rows(table);
    let _ = writeln!(out, "{} produtos\n", rows.len());
    for row in rows {
        let variation = row
            .variation
            .map(|v| format_percent(v, 1))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<32} {:<12} {:<16} {:>8} {:>16} {:>8} {:>3} reg. {:>4} obs.",
            row.product,
            row.category,
            row.subcategory,
            row.unit.as_deref().unwrap_or("-"),
            format_currency(row.mean),
            variation,
            row.region_count,
            row.record_count
        );
    }
    out
}
