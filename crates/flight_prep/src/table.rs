//! Untyped CSV table used by the normalizer
//!
//! Every column is kept as text so that columns the normalizer does not know
//! about pass through unchanged.

use crate::errors::NormalizeError;
use csv::{ReaderBuilder, Writer};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self, NormalizeError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Parse CSV with a header row. Short rows are padded with empty cells.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, NormalizeError> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let mut row: Vec<String> = record?.iter().map(str::to_string).collect();
            if row.len() < columns.len() {
                row.resize(columns.len(), String::new());
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), NormalizeError> {
        let file = std::fs::File::create(path.as_ref())?;
        self.to_writer(file)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), NormalizeError> {
        let mut writer = Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        let width = self.columns.len();
        for row in &self.rows {
            writer.write_record(row.iter().take(width))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Non-empty cell value
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: String) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            *cell = value;
        }
    }

    /// Replace a column's values, appending the column if it does not exist
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        let idx = match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.columns.push(name.to_string());
                let width = self.columns.len();
                for row in &mut self.rows {
                    row.resize(width, String::new());
                }
                width - 1
            }
        };

        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_rows_padded() {
        let table = Table::from_reader("a,b,c\n1,2\n".as_bytes()).unwrap();
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
        assert_eq!(table.cell(0, 2), None);
    }

    #[test]
    fn test_set_column_appends_then_overwrites() {
        let mut table = Table::from_reader("a\n1\n2\n".as_bytes()).unwrap();

        table.set_column("b", vec!["x".into(), "y".into()]);
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.rows[1], vec!["2", "y"]);

        table.set_column("b", vec!["z".into(), "w".into()]);
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.rows[0], vec!["1", "z"]);
    }

    #[test]
    fn test_write_quotes_embedded_commas() {
        let table = Table {
            columns: vec!["airline".into(), "price".into()],
            rows: vec![vec!["Air India, Ltd".into(), "10.0".into()]],
        };
        let mut out = Vec::new();
        table.to_writer(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "airline,price\n\"Air India, Ltd\",10.0\n"
        );
    }
}
