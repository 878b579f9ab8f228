//! Policy PDF table extraction.
//!
//! Supplementary input: housing policy reports sometimes carry tabular
//! data worth eyeballing next to the index numbers. This path is
//! deliberately lenient — any failure yields an empty collection instead of
//! an error, unlike every load-bearing stage.
//!
//! `pdf_extract` gives us plain text, so tables are reconstructed
//! heuristically: a block of consecutive lines that all split into the same
//! number of columns (on runs of spaces) is treated as one table.

use std::path::Path;

use tracing::{info, warn};

/// A table pulled out of a PDF, headers normalized to
/// lower-case, underscore-separated labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfTable {
    /// 1-based position of the table within the document.
    pub number: usize,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Extract all recognizable tables from a PDF.
///
/// Never fails: extraction or parse problems are logged and an empty
/// collection is returned.
pub fn extract_tables(path: &Path) -> Vec<PdfTable> {
    let text = match pdf_extract::extract_text(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("PDF extraction failed for {}: {e}", path.display());
            return Vec::new();
        }
    };

    let tables = tables_from_text(&text);
    info!(
        "extracted {} table(s) from {}",
        tables.len(),
        path.display()
    );
    tables
}

/// Reconstruct tables from extracted text.
fn tables_from_text(text: &str) -> Vec<PdfTable> {
    let mut tables = Vec::new();

    for block in text.split("\n\n") {
        let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
        // Header plus at least one data row.
        if lines.len() < 2 {
            continue;
        }

        let split: Vec<Vec<String>> = lines.iter().map(|l| split_columns(l)).collect();
        let width = split[0].len();
        if width < 2 || split.iter().any(|row| row.len() != width) {
            continue;
        }

        let headers: Vec<String> = split[0].iter().map(|h| normalize_header(h)).collect();
        let rows = split[1..].to_vec();
        let (headers, rows) = drop_empty(headers, rows);
        if headers.is_empty() || rows.is_empty() {
            continue;
        }

        tables.push(PdfTable {
            number: tables.len() + 1,
            headers,
            rows,
        });
    }

    tables
}

/// Split a line on runs of two or more spaces.
fn split_columns(line: &str) -> Vec<String> {
    line.trim()
        .split("  ")
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lower-case a header label and join its words with underscores.
fn normalize_header(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Drop fully-empty rows and fully-empty columns.
fn drop_empty(
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> (Vec<String>, Vec<Vec<String>>) {
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    let keep: Vec<usize> = (0..headers.len())
        .filter(|&col| {
            !headers[col].is_empty()
                || rows
                    .iter()
                    .any(|row| row.get(col).map_or(false, |c| !c.trim().is_empty()))
        })
        .collect();

    let headers = keep.iter().map(|&col| headers[col].clone()).collect();
    let rows = rows
        .into_iter()
        .map(|row| {
            keep.iter()
                .map(|&col| row.get(col).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    (headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_file_yields_empty_not_error() {
        let tables = extract_tables(&PathBuf::from("no/such/report.pdf"));
        assert!(tables.is_empty());
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Median  Rent "), "median_rent");
        assert_eq!(normalize_header("Units Permitted"), "units_permitted");
    }

    #[test]
    fn test_tables_from_text() {
        let text = "\
Housing Policy Overview

County  Units Permitted  Median Rent
Fresno  1200  1550
Kern  830  1310

Some trailing prose that is not a table.
";
        let tables = tables_from_text(text);
        assert_eq!(tables.len(), 1);

        let table = &tables[0];
        assert_eq!(table.number, 1);
        assert_eq!(table.headers, vec!["county", "units_permitted", "median_rent"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["Fresno", "1200", "1550"]);
    }

    #[test]
    fn test_ragged_blocks_are_not_tables() {
        let text = "\
County  Units
Fresno  1200  extra  cells
";
        assert!(tables_from_text(text).is_empty());
    }

    #[test]
    fn test_drop_empty_rows() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let rows = vec![
            vec!["1".to_string(), "2".to_string()],
            vec!["  ".to_string(), "".to_string()],
        ];
        let (headers, rows) = drop_empty(headers, rows);
        assert_eq!(headers.len(), 2);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_drop_empty_columns() {
        let headers = vec!["a".to_string(), String::new()];
        let rows = vec![vec!["1".to_string(), String::new()]];
        let (headers, rows) = drop_empty(headers, rows);
        assert_eq!(headers, vec!["a"]);
        assert_eq!(rows, vec![vec!["1".to_string()]]);
    }
}
