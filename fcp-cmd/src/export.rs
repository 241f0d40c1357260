//! `export`: the current-price table as a spreadsheet-friendly CSV file, and
//! the detailed forecast table written by `forecast --export-dir`.
//!
//! Price layout: UTF-8 byte order mark, a title line, an export-date line and
//! a blank line, then a `;`-delimited table with decimal commas. The forecast
//! file is the byte order mark followed directly by its table.

use crate::fetch::load_artifacts;
use crate::{FilterArgs, SourceArgs, TableArgs};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use fcp_core::{ForecastArtifact, Period};
use fcp_data::{CurrentPriceRow, CurrentPriceTable, Dashboard, ForecastTable};
use fcp_utils::numbers::{format_currency, format_decimal_comma};
use fcp_utils::periods::{format_date_br, format_date_iso, format_period_full};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

const BOM: &str = "\u{feff}";

/// File name of the forecast export.
pub const FORECAST_FILE_NAME: &str = "previsoes_florestais.csv";

const HEADERS: [&str; 11] = [
    "Produto",
    "Categoria",
    "Subcategoria",
    "Unidade",
    "Preço Médio (R$)",
    "Preço Mín (R$)",
    "Preço Máx (R$)",
    "Preço Anterior (R$)",
    "Variação (%)",
    "Regiões",
    "Registros",
];

pub async fn run_export(
    source: &SourceArgs,
    filters: &FilterArgs,
    table: &TableArgs,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let loaded = load_artifacts(&source.source()).await?;
    let mut dashboard = Dashboard::new(loaded.store.records(), None);
    filters.apply(&mut dashboard);
    let prices = dashboard.current_prices();
    let today = Local::now().date_naive();
    let path = export_to_dir(&prices, table, out_dir, today)?;
    println!("{}", path.display());
    Ok(())
}

/// `precos_florestais_<latest period>_<YYYY-MM-DD>.csv`
pub fn export_file_name(latest: Period, today: NaiveDate) -> String {
    format!("precos_florestais_{}_{}.csv", latest, format_date_iso(&today))
}

/// Write the table into `out_dir` and return the file path.
pub fn export_to_dir(
    table: &CurrentPriceTable,
    args: &TableArgs,
    out_dir: &Path,
    today: NaiveDate,
) -> anyhow::Result<PathBuf> {
    let latest = table
        .latest_period
        .context("no prices to export for the selected filters")?;
    let path = out_dir.join(export_file_name(latest, today));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let rows = args.price_rows(table);
    write_csv(file, latest, &rows, today)?;
    info!("Export complete. Wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}

fn row_fields(row: &CurrentPriceRow) -> [String; 11] {
    let previous = row
        .previous_mean
        .filter(|prev| *prev != 0.0)
        .map(|prev| format_decimal_comma(prev, 2))
        .unwrap_or_default();
    let variation = row
        .variation
        .map(|v| format_decimal_comma(v * 100.0, 2))
        .unwrap_or_default();
    [
        row.product.clone(),
        row.category.clone(),
        row.subcategory.clone(),
        row.unit.clone().unwrap_or_else(|| "-".to_string()),
        format_decimal_comma(row.mean, 2),
        format_decimal_comma(row.min, 2),
        format_decimal_comma(row.max, 2),
        previous,
        variation,
        row.region_count.to_string(),
        row.record_count.to_string(),
    ]
}

/// Write the preamble and the table to `writer`.
pub fn write_csv<W: Write>(
    mut writer: W,
    latest: Period,
    rows: &[&CurrentPriceRow],
    today: NaiveDate,
) -> anyhow::Result<()> {
    write!(writer, "{}", BOM)?;
    writeln!(writer, "Preços Florestais - {}", format_period_full(&latest))?;
    writeln!(writer, "Exportado em: {}", format_date_br(&today))?;
    writeln!(writer)?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(writer);
    wtr.write_record(HEADERS)?;
    for row in rows {
        wtr.write_record(row_fields(row))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the forecast table into `out_dir` and return the file path.
pub fn export_forecast_to_dir(
    table: &ForecastTable,
    artifact: Option<&ForecastArtifact>,
    out_dir: &Path,
) -> anyhow::Result<PathBuf> {
    if table.is_empty() {
        anyhow::bail!("no forecast values to export for the selected filters");
    }
    let path = out_dir.join(FORECAST_FILE_NAME);
    let file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_forecast_csv(file, table, artifact)?;
    info!("Export complete. Wrote {} forecast periods to {}", table.rows.len(), path.display());
    Ok(path)
}

/// Write the forecast table: a period column, then a value and a 95%
/// interval column per model. Models without a value for a period leave both
/// cells blank.
pub fn write_forecast_csv<W: Write>(
    mut writer: W,
    table: &ForecastTable,
    artifact: Option<&ForecastArtifact>,
) -> anyhow::Result<()> {
    write!(writer, "{}", BOM)?;
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(writer);

    let mut header = vec!["Período".to_string()];
    for model in &table.models {
        let label = artifact
            .map(|a| a.model_label(model))
            .unwrap_or(model.as_str());
        header.push(label.to_string());
        header.push(format!("IC 95% {}", label));
    }
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.period.to_string()];
        for model in &table.models {
            match row.cell(model) {
                Some(cell) => {
                    record.push(format_decimal_comma(cell.value, 2));
                    record.push(format!(
                        "{} - {}",
                        format_currency(cell.lower),
                        format_currency(cell.upper)
                    ));
                }
                None => record.extend([String::new(), String::new()]),
            }
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    #[test]
    fn file_name_is_stamped() {
        let latest = Period::new(2023, 2).unwrap();
        assert_eq!(
            export_file_name(latest, today()),
            "precos_florestais_2023-02_2025-03-07.csv"
        );
    }

    #[test]
    fn csv_layout() {
        let store = fixtures::store();
        let dashboard = Dashboard::new(store.records(), None);
        let table = dashboard.current_prices();
        let rows = TableArgs::default().price_rows(&table);
        let mut buffer = Vec::new();
        write_csv(&mut buffer, Period::new(2023, 2).unwrap(), &rows, today()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "\u{feff}Preços Florestais - Fevereiro de 2023");
        assert_eq!(lines[1], "Exportado em: 07/03/2025");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], HEADERS.join(";"));
        assert_eq!(lines[4], "Lenha;LENHA;Eucalipto;st;50,50;50,50;50,50;;;1;1");
        assert_eq!(lines[5], "Tora;TORAS;Pinus;m3;120,00;120,00;120,00;100,00;20,00;1;1");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = fixtures::store();
        let dashboard = Dashboard::new(store.records(), None);
        let path = export_to_dir(
            &dashboard.current_prices(),
            &TableArgs::default(),
            dir.path(),
            today(),
        )
        .unwrap();
        assert!(path.ends_with("precos_florestais_2023-02_2025-03-07.csv"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(BOM.as_bytes()));
    }

    #[test]
    fn export_without_prices_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = export_to_dir(
            &CurrentPriceTable::default(),
            &TableArgs::default(),
            dir.path(),
            today(),
        );
        assert!(result.is_err());
    }

    fn fixture_forecast() -> (ForecastTable, ForecastArtifact) {
        let artifact = fcp_store::loader::parse_forecasts(fixtures::FORECASTS_JSON).unwrap();
        let store = fixtures::store();
        let table = {
            let dashboard = Dashboard::new(store.records(), Some(&artifact));
            let selection = dashboard.forecast();
            let table = fcp_data::forecast_table(selection.available().unwrap(), None);
            table
        };
        (table, artifact)
    }

    #[test]
    fn forecast_csv_layout() {
        let (table, artifact) = fixture_forecast();
        let mut buffer = Vec::new();
        write_forecast_csv(&mut buffer, &table, Some(&artifact)).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "\u{feff}Período;Persistencia;IC 95% Persistencia");
        assert_eq!(lines[1], "2023-03;90,00;R$ 80,00 - R$ 100,00");
        assert_eq!(lines[2], "2023-04;99,00;R$ 85,00 - R$ 110,00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn forecast_export_writes_file() {
        let (table, artifact) = fixture_forecast();
        let dir = tempfile::tempdir().unwrap();
        let path = export_forecast_to_dir(&table, Some(&artifact), dir.path()).unwrap();
        assert!(path.ends_with(FORECAST_FILE_NAME));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(BOM.as_bytes()));

        let empty = export_forecast_to_dir(&ForecastTable::default(), None, dir.path());
        assert!(empty.is_err());
    }
}
