//! Command implementations for the FCP CLI.
//!
//! Every subcommand loads the published artifacts, replays the requested
//! filter selections on a [`Dashboard`] session and prints one of its views.

use clap::{Args, Subcommand};
use fcp_data::{ChartClick, Dashboard, DeclarativeFilterState, SortField, SortOrder};
use std::path::PathBuf;

pub mod catalog;
pub mod export;
pub mod fetch;
pub mod forecast;
pub mod prices;
pub mod products;
pub mod summary;

use fetch::ArtifactSource;

/// Directory used when neither `--data-dir` nor `--base-url` is given.
const DEFAULT_DATA_DIR: &str = "data";

/// Where to load the artifacts from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Directory holding detailed.json, aggregated.json, forecasts.json and
    /// regioes.geojson. Takes precedence over --base-url.
    #[arg(long, env = "FCP_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Base URL the artifacts are published under
    #[arg(long, env = "FCP_BASE_URL")]
    pub base_url: Option<String>,
}

impl SourceArgs {
    pub fn source(&self) -> ArtifactSource {
        match (&self.data_dir, &self.base_url) {
            (Some(dir), _) => ArtifactSource::Directory(dir.clone()),
            (None, Some(url)) => ArtifactSource::BaseUrl(url.clone()),
            (None, None) => ArtifactSource::Directory(PathBuf::from(DEFAULT_DATA_DIR)),
        }
    }
}

/// Dropdown selections and chart clicks to replay before rendering.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Keep only these years (repeatable)
    #[arg(long)]
    pub year: Vec<i32>,

    /// Keep only these regions (repeatable)
    #[arg(long)]
    pub region: Vec<String>,

    /// Keep only these categories (repeatable)
    #[arg(long)]
    pub category: Vec<String>,

    /// Keep only these subcategories (repeatable)
    #[arg(long)]
    pub subcategory: Vec<String>,

    /// Keep only these products (repeatable)
    #[arg(long)]
    pub product: Vec<String>,

    /// Region clicked on the regional chart
    #[arg(long)]
    pub click_region: Option<String>,

    /// Category clicked on the category chart
    #[arg(long)]
    pub click_category: Option<String>,

    /// Subcategory clicked on the treemap
    #[arg(long)]
    pub click_subcategory: Option<String>,

    /// Year clicked on the time series
    #[arg(long)]
    pub click_year: Option<i32>,
}

impl FilterArgs {
    pub fn declarative(&self) -> DeclarativeFilterState {
        DeclarativeFilterState {
            years: self.year.iter().copied().collect(),
            regions: self.region.iter().cloned().collect(),
            categories: self.category.iter().cloned().collect(),
            subcategories: self.subcategory.iter().cloned().collect(),
            products: self.product.iter().cloned().collect(),
        }
    }

    /// Clicks in the order a user would make them: category before
    /// subcategory, since a category click resets the subcategory.
    pub fn clicks(&self) -> Vec<ChartClick> {
        let mut clicks = Vec::new();
        if let Some(region) = &self.click_region {
            clicks.push(ChartClick::Region(region.clone()));
        }
        if let Some(category) = &self.click_category {
            clicks.push(ChartClick::Category(category.clone()));
        }
        if let Some(subcategory) = &self.click_subcategory {
            clicks.push(ChartClick::Subcategory(subcategory.clone()));
        }
        if let Some(year) = self.click_year {
            clicks.push(ChartClick::Year(year));
        }
        clicks
    }

    /// Replay the selections on a session.
    pub fn apply(&self, dashboard: &mut Dashboard<'_>) {
        *dashboard.filters_mut() = self.declarative();
        for click in self.clicks() {
            dashboard.click(&click);
        }
    }
}

/// Ordering and search of a table view.
#[derive(Args, Debug, Clone, Default)]
pub struct TableArgs {
    /// Column to sort by (produto, categoria, subcategoria, unidade, preco, min, max, variacao, regioes, registros)
    #[arg(long)]
    pub sort: Option<SortField>,

    /// Sort descending (default for preco and variacao)
    #[arg(long, conflicts_with = "asc")]
    pub desc: bool,

    /// Sort ascending (default for every other column)
    #[arg(long)]
    pub asc: bool,

    /// Case-insensitive search on product, category and subcategory
    #[arg(long, default_value = "")]
    pub search: String,
}

impl TableArgs {
    /// Requested column, or `default` when none was given.
    pub fn field(&self, default: SortField) -> SortField {
        self.sort.unwrap_or(default)
    }

    /// Requested order, or the column's own default order.
    pub fn order(&self, field: SortField) -> SortOrder {
        if self.desc {
            SortOrder::Descending
        } else if self.asc {
            SortOrder::Ascending
        } else {
            field.default_order()
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Headline KPIs, regional and category breakdowns and the monthly evolution
    Summary {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Forecast for the current selection
    Forecast {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Forecast months to consider (defaults to the whole published horizon)
        #[arg(long)]
        horizon: Option<usize>,

        /// Also write the detailed forecast table as CSV into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Latest prices per product compared with the previous period
    Prices {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        table: TableArgs,
    },

    /// Product ranking of the selection (mean, min, max and record count)
    Products {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        table: TableArgs,
    },

    /// Write the current-price table as CSV
    Export {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        table: TableArgs,

        /// Directory the CSV file is written to
        #[arg(short = 'o', long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Dataset totals and the options offered by each filter
    Catalog {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Summary { source, filters } => summary::run_summary(&source, &filters).await,
        Command::Forecast {
            source,
            filters,
            horizon,
            export_dir,
        } => forecast::run_forecast(&source, &filters, horizon, export_dir.as_deref()).await,
        Command::Prices {
            source,
            filters,
            table,
        } => prices::run_prices(&source, &filters, &table).await,
        Command::Products {
            source,
            filters,
            table,
        } => products::run_products(&source, &filters, &table).await,
        Command::Export {
            source,
            filters,
            table,
            out_dir,
        } => export::run_export(&source, &filters, &table, &out_dir).await,
        Command::Catalog { source, filters } => catalog::run_catalog(&source, &filters).await,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use fcp_store::RecordStore;

    pub const DETAILED_JSON: &str = r#"[
        {"ano": 2023, "mes": 1, "periodo": "2023-01", "regiao": "Norte", "categoria": "TORAS",
         "subcategoria": "Pinus", "produto": "Tora", "unidade": "m3", "preco": 100.0},
        {"ano": 2023, "mes": 2, "periodo": "2023-02", "regiao": "Norte", "categoria": "TORAS",
         "subcategoria": "Pinus", "produto": "Tora", "unidade": "m3", "preco": 120.0},
        {"ano": 2023, "mes": 2, "periodo": "2023-02", "regiao": "Sul", "categoria": "LENHA",
         "subcategoria": "Eucalipto", "produto": "Lenha", "unidade": "st", "preco": 50.5}
    ]"#;

    pub const AGGREGATED_JSON: &str = r#"{
        "anos": [2023],
        "regioes": ["Norte", "Sul", "Média Estado"],
        "categorias": ["LENHA", "TORAS"],
        "subcategorias": {"LENHA": ["Eucalipto"], "TORAS": ["Pinus"]},
        "produtos": {"LENHA": {"Eucalipto": ["Lenha"]}, "TORAS": {"Pinus": ["Tora"]}},
        "stats": {"total_registros": 3, "periodo_inicio": "2023-01", "periodo_fim": "2023-02",
                  "total_anos": 1, "total_regioes": 2, "total_categorias": 2, "total_produtos": 2},
        "ultimo_periodo": "2023-02"
    }"#;

    pub const FORECASTS_JSON: &str = r#"{
        "meta": {"target_period": "2023-04", "models": {"naive": {"label": "Persistencia"}}},
        "series": {
            "ano=*|regiao=*|categoria=*|subcategoria=*|produto=*": {
                "models": {
                    "naive": {
                        "forecast": [
                            {"period": "2023-03", "value": 90.0, "lower": 80.0, "upper": 100.0},
                            {"period": "2023-04", "value": 99.0, "lower": 85.0, "upper": 110.0}
                        ],
                        "metrics": {"mae": null, "rmse": null, "mape": null}
                    }
                }
            }
        }
    }"#;

    pub fn store() -> RecordStore {
        RecordStore::from_json(DETAILED_JSON, AGGREGATED_JSON).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct SourceOnly {
        #[command(flatten)]
        source: SourceArgs,
    }

    #[derive(Parser)]
    struct TableOnly {
        #[command(flatten)]
        table: TableArgs,
    }

    #[test]
    fn data_dir_and_base_url_together() {
        let cli = SourceOnly::try_parse_from([
            "fcp",
            "--data-dir",
            "/srv/precos",
            "--base-url",
            "https://example.org/data",
        ])
        .unwrap();
        assert_eq!(
            cli.source.source(),
            ArtifactSource::Directory(PathBuf::from("/srv/precos"))
        );
    }

    #[test]
    fn table_order_defaults_per_column() {
        let parse = |args: &[&str]| {
            let mut argv = vec!["fcp"];
            argv.extend_from_slice(args);
            TableOnly::try_parse_from(argv).unwrap().table
        };

        let table = parse(&["--sort", "preco"]);
        let field = table.field(SortField::Category);
        assert_eq!(field, SortField::Mean);
        assert_eq!(table.order(field), SortOrder::Descending);

        let table = parse(&["--sort", "variacao", "--asc"]);
        assert_eq!(table.order(table.field(SortField::Category)), SortOrder::Ascending);

        let table = parse(&["--sort", "produto"]);
        assert_eq!(table.order(table.field(SortField::Category)), SortOrder::Ascending);

        let table = parse(&[]);
        assert_eq!(table.field(SortField::Mean), SortField::Mean);
        assert_eq!(table.order(SortField::Mean), SortOrder::Descending);

        assert!(TableOnly::try_parse_from(["fcp", "--asc", "--desc"]).is_err());
        assert!(TableOnly::try_parse_from(["fcp", "--sort", "cor"]).is_err());
    }

    #[test]
    fn source_defaults_to_data_dir() {
        assert_eq!(
            SourceArgs::default().source(),
            ArtifactSource::Directory(PathBuf::from("data"))
        );
        let args = SourceArgs {
            data_dir: None,
            base_url: Some("https://example.org/data".to_string()),
        };
        assert_eq!(
            args.source(),
            ArtifactSource::BaseUrl("https://example.org/data".to_string())
        );
    }

    #[test]
    fn filter_args_replay_on_dashboard() {
        let store = fixtures::store();
        let mut dashboard = Dashboard::new(store.records(), None);
        let args = FilterArgs {
            region: vec!["Norte".to_string()],
            click_year: Some(2023),
            ..FilterArgs::default()
        };
        args.apply(&mut dashboard);
        assert_eq!(dashboard.filters().single_region(), Some("Norte"));
        assert_eq!(dashboard.interactive().year, Some(2023));
        assert_eq!(dashboard.aggregations().total_count, 2);
    }

    #[test]
    fn clicks_keep_subcategory_after_category() {
        let args = FilterArgs {
            click_category: Some("TORAS".to_string()),
            click_subcategory: Some("Pinus".to_string()),
            ..FilterArgs::default()
        };
        let store = fixtures::store();
        let mut dashboard = Dashboard::new(store.records(), None);
        args.apply(&mut dashboard);
        assert_eq!(dashboard.interactive().subcategory.as_deref(), Some("Pinus"));
    }
}
