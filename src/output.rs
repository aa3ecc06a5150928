//! Rendering key records as table, JSON or CSV.
//!
//! Column order is fixed. The account columns are only emitted on request
//! since most single-account audits leave them blank.
//!
//! # Usage
//!
//! ```bash
//! ratkiez scan --format csv --output keys.csv
//! ratkiez scan --org --account-columns
//! ```

use crate::audit::KeyRecord;
use crate::utils::format::join_policies;
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::io::Write;

const BASE_HEADERS: [&str; 6] = [
    "USERNAME",
    "KEY-ID",
    "CREATION-DATE",
    "LAST-USED-DATE",
    "POLICIES",
    "PROFILE",
];
const ACCOUNT_HEADERS: [&str; 2] = ["ACCOUNT-ID", "ACCOUNT-NAME"];

const TABLE_POLICY_SEPARATOR: &str = ", ";
const CSV_POLICY_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

fn headers(account_columns: bool) -> Vec<&'static str> {
    let mut headers = BASE_HEADERS.to_vec();
    if account_columns {
        headers.extend(ACCOUNT_HEADERS);
    }
    headers
}

fn row(record: &KeyRecord, policy_separator: &str, account_columns: bool) -> Vec<String> {
    let mut cells = vec![
        record.user.clone(),
        record.key_id.clone(),
        record.creation_date.clone(),
        record.last_used_date.clone(),
        join_policies(&record.policies, policy_separator),
        record.profile.clone(),
    ];
    if account_columns {
        cells.push(record.account_id.clone());
        cells.push(record.account_name.clone());
    }
    cells
}

/// Write `records` to `writer` in the requested format.
///
/// JSON always carries every field; `account_columns` only affects table
/// and CSV output.
pub fn render<W: Write>(
    records: &[KeyRecord],
    format: OutputFormat,
    account_columns: bool,
    mut writer: W,
) -> Result<()> {
    match format {
        OutputFormat::Table => write_table(records, account_columns, &mut writer)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, records)
                .context("Failed to write JSON output")?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => write_csv(records, account_columns, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

fn write_csv<W: Write>(records: &[KeyRecord], account_columns: bool, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(headers(account_columns))?;
    for record in records {
        csv_writer.write_record(row(record, CSV_POLICY_SEPARATOR, account_columns))?;
    }
    csv_writer.flush().context("Failed to write CSV output")?;
    Ok(())
}

fn write_table<W: Write>(records: &[KeyRecord], account_columns: bool, writer: &mut W) -> Result<()> {
    let headers = headers(account_columns);
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| row(r, TABLE_POLICY_SEPARATOR, account_columns))
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    write_table_line(writer, &header_cells, &widths)?;
    for cells in &rows {
        write_table_line(writer, cells, &widths)?;
    }
    Ok(())
}

fn write_table_line<W: Write>(writer: &mut W, cells: &[String], widths: &[usize]) -> Result<()> {
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i == last {
            line.push_str(cell);
        } else {
            line.push_str(&format!("{:<width$}  ", cell, width = width));
        }
    }
    writeln!(writer, "{}", line.trim_end())?;
    Ok(())
}
