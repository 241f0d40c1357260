//! Search and sort shared by the tabular views (current prices, product ranking).

use fcp_core::FcpError;
use std::cmp::Ordering;
use std::str::FromStr;

/// Column a table is sorted by. Tables without a given column treat every
/// row as equal on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    Product,
    #[default]
    Category,
    Subcategory,
    Unit,
    Mean,
    Min,
    Max,
    Variation,
    Regions,
    Records,
}

impl SortField {
    /// Order applied when a column is first selected: descending for the
    /// price and variation columns.
    pub fn default_order(&self) -> SortOrder {
        match self {
            SortField::Mean | SortField::Variation => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }
}

impl FromStr for SortField {
    type Err = FcpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "product" | "produto" => Ok(SortField::Product),
            "category" | "categoria" => Ok(SortField::Category),
            "subcategory" | "subcategoria" => Ok(SortField::Subcategory),
            "unit" | "unidade" => Ok(SortField::Unit),
            "mean" | "preco" => Ok(SortField::Mean),
            "min" => Ok(SortField::Min),
            "max" => Ok(SortField::Max),
            "variation" | "variacao" => Ok(SortField::Variation),
            "regions" | "regioes" => Ok(SortField::Regions),
            "records" | "registros" => Ok(SortField::Records),
            _ => Err(FcpError::InvalidFormat(format!("unknown sort field: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = FcpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(FcpError::InvalidFormat(format!("unknown sort order: {}", s))),
        }
    }
}

/// A row of a searchable, sortable table.
pub trait TableRow {
    /// Product, category and subcategory, the fields the search box looks at.
    fn search_fields(&self) -> [&str; 3];

    /// Ascending comparison on one column.
    fn compare_by(&self, other: &Self, field: SortField) -> Ordering;

    fn matches_search(&self, term: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(term))
    }
}

/// Case-insensitive text order, ties broken by the raw text.
pub(crate) fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Rows matching `search` (case-insensitive; blank matches everything),
/// sorted by `field`. The sort is stable.
pub fn sorted_view<'r, R: TableRow>(
    rows: &'r [R],
    search: &str,
    field: SortField,
    order: SortOrder,
) -> Vec<&'r R> {
    let term = search.trim().to_lowercase();
    let mut view: Vec<&R> = rows
        .iter()
        .filter(|row| term.is_empty() || row.matches_search(&term))
        .collect();
    view.sort_by(|a, b| {
        let ordering = a.compare_by(b, field);
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
    view
}
