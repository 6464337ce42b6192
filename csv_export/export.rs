use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use echowork_seed::sql_tuples::parse_inserts;
use echowork_seed::utils::read_input;
use echowork_seed::{Result, SeedError};

pub const COLUMN_ORDER: &[&str] = &[
    "name",
    "slug",
    "description",
    "ville",
    "adresse",
    "tel",
    "activite",
    "categoryId",
    "createdAt",
    "updatedAt",
    "imageUrl",
];

// column order of the generated script when a statement omits its column list
const COMPANY_COLUMNS_DEFAULT: &[&str] = &[
    "name",
    "slug",
    "description",
    "ville",
    "adresse",
    "tel",
    "activite",
    "categoryId",
    "createdAt",
    "updatedAt",
];

const COMPANY_TABLE: &str = "Company";

pub type Record = HashMap<String, String>;

/// One record per `"Company"` tuple, keyed by the statement's column names.
/// Tuples with fewer values than columns are skipped.
pub fn extract_records(sql: &str) -> (Vec<Record>, Vec<String>) {
    let mut records = Vec::new();
    let mut extra_columns: Vec<String> = Vec::new();

    for stmt in parse_inserts(sql) {
        if !stmt.table.eq_ignore_ascii_case(COMPANY_TABLE) {
            continue;
        }
        let columns: Vec<String> = if stmt.columns.is_empty() {
            COMPANY_COLUMNS_DEFAULT.iter().map(|c| c.to_string()).collect()
        } else {
            stmt.columns.clone()
        };
        let before = records.len();
        for tuple in &stmt.tuples {
            if tuple.values.len() < columns.len() {
                continue;
            }
            let record = columns
                .iter()
                .zip(&tuple.values)
                .map(|(col, value)| (col.clone(), value.plain().to_string()))
                .collect();
            records.push(record);
        }
        // columns only reach the header through a kept row
        if records.len() == before {
            continue;
        }
        for col in &columns {
            if !COLUMN_ORDER.contains(&col.as_str()) && !extra_columns.contains(col) {
                extra_columns.push(col.clone());
            }
        }
    }
    (records, extra_columns)
}

/// Export the company rows of `input` to `output`. Fails without creating
/// `output` when the script holds no company rows.
pub fn export_file(input: &Path, output: &Path) -> Result<(Vec<Record>, Vec<String>)> {
    let sql = read_input(input)?;
    let (records, extra_columns) = extract_records(&sql);
    if records.is_empty() {
        return Err(SeedError::ZeroMatches(input.to_path_buf()));
    }
    let file = File::create(output).map_err(|source| SeedError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    write_csv(BufWriter::new(file), &records, &extra_columns)?;
    Ok((records, extra_columns))
}

pub fn header(extra_columns: &[String]) -> Vec<String> {
    COLUMN_ORDER
        .iter()
        .map(|c| c.to_string())
        .chain(extra_columns.iter().cloned())
        .collect()
}

pub fn write_csv<W: Write>(writer: W, records: &[Record], extra_columns: &[String]) -> Result<()> {
    let header = header(extra_columns);
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&header)?;
    for record in records {
        out.write_record(
            header
                .iter()
                .map(|col| record.get(col).map(String::as_str).unwrap_or("")),
        )?;
    }
    out.flush()?;
    Ok(())
}
