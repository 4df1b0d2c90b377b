use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;
use ndarray::Array2;

use crate::error::{Result, TraceError};

/* Header:
 * metadata fields parsed from "#name: value" lines.
 * Unordered; a repeated key overwrites the earlier value.
 */
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Header {
    fields: HashMap<String, String>,
}

impl Header {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// like get, but a missing field is a hard error
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| TraceError::MissingField(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_string(), value.to_string());
    }
}

/* TableKey:
 * column description rows collected after a "#Key" marker.
 * Row 0 holds column names, row 1 units; the last row determines
 * how many data columns the file is expected to have.
 */
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TableKey {
    rows: Vec<Vec<String>>,
}

impl TableKey {
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// number of dependent data columns (last key row minus the time column)
    pub fn data_columns(&self) -> Option<usize> {
        self.rows.last().map(|r| r.len().saturating_sub(1))
    }

    /// axis label for a column, "name (unit)" when both rows are present
    pub fn label(&self, col: usize) -> String {
        let name = self.rows.first().and_then(|r| r.get(col));
        let unit = self.rows.get(1).and_then(|r| r.get(col));
        match (name, unit) {
            (Some(n), Some(u)) => format!("{} ({})", n, u),
            (Some(n), None) => n.clone(),
            _ => String::new(),
        }
    }

    fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

// what the parser expects to see next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseMode {
    AwaitingData,
    KeyBlock,
    Data,
}

/* DataFile:
 * one parsed trace file: numeric matrix, column key and header.
 * Column 0 of the matrix is the independent variable (time or
 * frequency); the remaining columns are the recorded traces.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct DataFile {
    pub data: Array2<f64>,
    pub key: TableKey,
    pub header: Header,
    /// non-numeric tokens dropped from data lines
    pub skipped_tokens: usize,
}

impl DataFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Self::parse(reader)
    }

    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut header = Header::default();
        let mut key = TableKey::default();
        let mut rows: Vec<(usize, Vec<f64>)> = Vec::new();
        let mut skipped_tokens = 0;
        let mut mode = ParseMode::AwaitingData;

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end();
            if line.trim().is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('#') {
                if comment.starts_with("Key") {
                    mode = ParseMode::KeyBlock;
                } else if let Some((name, value)) = comment.split_once(':') {
                    mode = ParseMode::AwaitingData;
                    header.insert(name.trim(), value.trim());
                } else if mode == ParseMode::KeyBlock {
                    // first token is the comment marker itself
                    let row: Vec<String> = line
                        .split_whitespace()
                        .skip(1)
                        .map(str::to_string)
                        .collect();
                    key.push_row(row);
                }
                // any other comment line carries no information
            } else {
                mode = ParseMode::Data;
                let tokens = line.split_whitespace().count();
                let row: Vec<f64> = line
                    .split_whitespace()
                    .filter_map(|t| t.parse().ok())
                    .collect();
                skipped_tokens += tokens - row.len();
                rows.push((lineno + 1, row));
            }
        }

        if skipped_tokens > 0 {
            warn!("dropped {} non-numeric data tokens", skipped_tokens);
        }

        let data = matrix_from_rows(rows)?;
        Ok(Self {
            data,
            key,
            header,
            skipped_tokens,
        })
    }
}

/// assemble data rows into a rectangular matrix; the first row sets the width
fn matrix_from_rows(rows: Vec<(usize, Vec<f64>)>) -> Result<Array2<f64>> {
    let ncols = rows.first().map_or(0, |(_, r)| r.len());
    let mut flat = Vec::with_capacity(rows.len() * ncols);
    let nrows = rows.len();
    for (lineno, row) in rows {
        if row.len() != ncols {
            return Err(TraceError::RaggedRow {
                line: lineno,
                expected: ncols,
                got: row.len(),
            });
        }
        flat.extend(row);
    }
    // shape is consistent once every row matched ncols
    Ok(Array2::from_shape_vec((nrows, ncols), flat).expect("row lengths already checked"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TRACES: &str = "\
# recording of one EOD burst
#Species: Apteronotus leptorhynchus
#EOD Rate: 840Hz
#Key
# t     V-1   V-2
# s     mV    mV
0.000   1.25  -0.5
0.001   1.50  -0.25

0.002   1.75  0.0
";

    #[test]
    fn test_parse_traces() {
        let df = DataFile::parse(TRACES.as_bytes()).unwrap();
        assert_eq!(df.header.get("Species"), Some("Apteronotus leptorhynchus"));
        assert_eq!(df.header.get("EOD Rate"), Some("840Hz"));
        assert_eq!(df.key.rows().len(), 2);
        assert_eq!(df.key.rows()[0], vec!["t", "V-1", "V-2"]);
        assert_eq!(df.key.rows()[1], vec!["s", "mV", "mV"]);
        assert_eq!(df.key.data_columns(), Some(2));
        // blank line is skipped, so three data rows
        assert_eq!(df.data.dim(), (3, 3));
        assert_relative_eq!(df.data[[1, 1]], 1.5);
        assert_relative_eq!(df.data[[2, 2]], 0.0);
        assert_eq!(df.skipped_tokens, 0);
    }

    #[test]
    fn test_key_block_and_single_data_row() {
        let input = "#Key\n# t V\n# s mV\n0.0 1.0\n";
        let df = DataFile::parse(input.as_bytes()).unwrap();
        assert_eq!(df.key.rows().len(), 2);
        assert_eq!(df.data.dim(), (1, 2));
    }

    #[test]
    fn test_header_line_ends_key_block() {
        let input = "#Key\n# t V\n#Comment: something\n# not a key row\n0.0 1.0\n";
        let df = DataFile::parse(input.as_bytes()).unwrap();
        assert_eq!(df.key.rows().len(), 1);
        assert_eq!(df.header.get("Comment"), Some("something"));
    }

    #[test]
    fn test_duplicate_header_key_last_wins() {
        let input = "#Species: a\n#Species: b\n0.0\n";
        let df = DataFile::parse(input.as_bytes()).unwrap();
        assert_eq!(df.header.get("Species"), Some("b"));
        assert_eq!(df.header.len(), 1);
    }

    #[test]
    fn test_non_numeric_tokens_are_counted() {
        let input = "0.0 nan? 1.0\n0.5 x 2.0\n";
        let df = DataFile::parse(input.as_bytes()).unwrap();
        assert_eq!(df.data.dim(), (2, 2));
        assert_eq!(df.skipped_tokens, 2);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let input = "0.0 1.0\n0.5\n";
        let err = DataFile::parse(input.as_bytes()).unwrap_err();
        match err {
            TraceError::RaggedRow {
                line,
                expected,
                got,
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_parse_is_deterministic() {
        let a = DataFile::parse(TRACES.as_bytes()).unwrap();
        let b = DataFile::parse(TRACES.as_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input() {
        let df = DataFile::parse("".as_bytes()).unwrap();
        assert!(df.header.is_empty());
        assert!(df.key.is_empty());
        assert_eq!(df.data.nrows(), 0);
    }

    #[test]
    fn test_label() {
        let df = DataFile::parse(TRACES.as_bytes()).unwrap();
        assert_eq!(df.key.label(0), "t (s)");
        assert_eq!(df.key.label(1), "V-1 (mV)");
        assert_eq!(df.key.label(9), "");
    }
}
