//! In-memory table with unique, ordered column names.
//!
//! Every operation borrows the table and returns a new one, so an earlier
//! stage's view is never altered by a later stage.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::io::Write;

use super::Value;
use crate::error::{SchemaError, SchemaResult};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Borrowed view of one row, addressable by column name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> RowView<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

impl Table {
    /// Empty table with the given columns.
    ///
    /// Callers building from untrusted names should use [`Table::from_rows`],
    /// which checks uniqueness.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table, checking column uniqueness and row widths.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> SchemaResult<Self> {
        let mut seen = HashSet::new();
        for (i, name) in columns.iter().enumerate() {
            if name.is_empty() {
                return Err(SchemaError::EmptyHeader(i));
            }
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(SchemaError::RowWidth {
                    row: i,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }

    pub(crate) fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Position of a column, or `ColumnNotFound`.
    pub fn column_index(&self, name: &str) -> SchemaResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| SchemaError::ColumnNotFound {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        self.rows.get(index).map(|values| RowView {
            columns: &self.columns,
            values,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |values| RowView {
            columns: &self.columns,
            values,
        })
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> SchemaResult<impl Iterator<Item = &Value>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> SchemaResult<Table> {
        let indices = names
            .iter()
            .map(|n| self.column_index(n))
            .collect::<SchemaResult<Vec<_>>>()?;
        let columns = names.iter().map(|n| n.to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Table::from_rows(columns, rows)
    }

    /// Remove the named columns. Every name must exist.
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> SchemaResult<Table> {
        let mut drop = HashSet::new();
        for name in names {
            drop.insert(self.column_index(name.as_ref())?);
        }
        let keep: Vec<usize> = (0..self.columns.len()).filter(|i| !drop.contains(i)).collect();
        Ok(Table {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| keep.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        })
    }

    /// Rename columns. Every source name must exist and the result must
    /// stay unique.
    pub fn rename_columns(&self, mapping: &[(&str, &str)]) -> SchemaResult<Table> {
        let mut columns = self.columns.clone();
        for (from, to) in mapping {
            let idx = self.column_index(from)?;
            columns[idx] = to.to_string();
        }
        Table::from_rows(columns, self.rows.clone())
    }

    /// Add a column computed per row, or overwrite it if it exists.
    pub fn with_column<F>(&self, name: &str, f: F) -> Table
    where
        F: Fn(RowView<'_>) -> Value,
    {
        let existing = self.columns.iter().position(|c| c == name);
        let mut columns = self.columns.clone();
        if existing.is_none() {
            columns.push(name.to_string());
        }
        let rows = self
            .rows
            .iter()
            .map(|values| {
                let v = f(RowView {
                    columns: &self.columns,
                    values,
                });
                let mut row = values.clone();
                match existing {
                    Some(i) => row[i] = v,
                    None => row.push(v),
                }
                row
            })
            .collect();
        Table { columns, rows }
    }

    /// Keep rows matching the predicate.
    pub fn filter<F>(&self, predicate: F) -> Table
    where
        F: Fn(RowView<'_>) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|values| {
                    predicate(RowView {
                        columns: &self.columns,
                        values,
                    })
                })
                .cloned()
                .collect(),
        }
    }

    /// Stable sort by one column. Nulls go last in either direction.
    pub fn sort_by(&self, column: &str, descending: bool) -> SchemaResult<Table> {
        let idx = self.column_index(column)?;
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| match (a[idx].is_null(), b[idx].is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = a[idx].compare(&b[idx]);
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
        });
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    pub fn tail(&self, n: usize) -> Table {
        let skip = self.rows.len().saturating_sub(n);
        Table {
            columns: self.columns.clone(),
            rows: self.rows[skip..].to_vec(),
        }
    }

    /// Union two tables, alternating rows: `a[0], b[0], a[1], b[1], ...`.
    ///
    /// The result has every column of `a` followed by any column only `b`
    /// has; cells a side lacks are null. Leftover rows of the longer table
    /// are appended in order.
    pub fn interleave(a: &Table, b: &Table) -> Table {
        let mut columns = a.columns.clone();
        for c in &b.columns {
            if !columns.contains(c) {
                columns.push(c.clone());
            }
        }
        let project = |t: &Table, row: &[Value]| -> Vec<Value> {
            columns
                .iter()
                .map(|c| match t.columns.iter().position(|tc| tc == c) {
                    Some(i) => row[i].clone(),
                    None => Value::Null,
                })
                .collect()
        };

        let mut rows = Vec::with_capacity(a.rows.len() + b.rows.len());
        let longest = a.rows.len().max(b.rows.len());
        for i in 0..longest {
            if let Some(row) = a.rows.get(i) {
                rows.push(project(a, row));
            }
            if let Some(row) = b.rows.get(i) {
                rows.push(project(b, row));
            }
        }
        Table { columns, rows }
    }

    /// Write as CSV with a single header line.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|v| v.to_string()))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Serializes as an array of `{column: value}` objects, columns in order.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in self.iter() {
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (c, v) in self.columns.iter().zip(self.values) {
            map.serialize_entry(c, v)?;
        }
        map.end()
    }
}
