use std::{
    collections::{HashMap, HashSet},
    io::Read,
    path::PathBuf,
};

use ordered_float::OrderedFloat;
use shared::domain::Datum;
use thiserror::Error;

mod source;

pub use source::DatasetSource;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("missing column '{0}'")]
    MissingColumn(String),
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("column '{column}' holds {actual:?} values, expected {expected:?}")]
    ColumnKind {
        column: String,
        expected: ColumnKind,
        actual: ColumnKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<String>),
    /// Missing cells are NaN.
    Number(Vec<f64>),
}

impl Column {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Text(_) => ColumnKind::Text,
            Self::Number(_) => ColumnKind::Number,
        }
    }

    fn infer(cells: Vec<String>) -> Self {
        let mut numbers = Vec::with_capacity(cells.len());
        let mut any_value = false;
        for cell in &cells {
            let cell = cell.trim();
            if cell.is_empty() {
                numbers.push(f64::NAN);
                continue;
            }
            match cell.parse::<f64>() {
                Ok(value) => {
                    any_value = true;
                    numbers.push(value);
                }
                Err(_) => return Self::Text(cells),
            }
        }
        if any_value {
            Self::Number(numbers)
        } else {
            Self::Text(cells)
        }
    }

    fn key_at(&self, row: usize) -> Option<GroupKey> {
        match self {
            Self::Text(cells) if cells[row].is_empty() => None,
            Self::Text(cells) => Some(GroupKey::Text(cells[row].clone())),
            Self::Number(values) if values[row].is_nan() => None,
            Self::Number(values) => Some(GroupKey::Number(OrderedFloat(values[row]))),
        }
    }

    /// Present (non-missing) numeric value. Text cells never have one.
    fn number_at(&self, row: usize) -> Option<f64> {
        match self {
            Self::Number(values) if !values[row].is_nan() => Some(values[row]),
            _ => None,
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Text(cells) => cells.len(),
            Self::Number(values) => values.len(),
        }
    }

    fn is_present(&self, row: usize) -> bool {
        match self {
            Self::Text(cells) => !cells[row].is_empty(),
            Self::Number(values) => !values[row].is_nan(),
        }
    }
}

/// Required column in a dashboard's dataset.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
        }
    }

    pub const fn number(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Number,
        }
    }
}

/// Key of one group, ordered the way grouped output is sorted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Number(OrderedFloat<f64>),
    Text(String),
}

impl From<GroupKey> for Datum {
    fn from(key: GroupKey) -> Self {
        match key {
            GroupKey::Number(value) => Datum::Number(value.into_inner()),
            GroupKey::Text(value) => Datum::Text(value),
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value.into_inner()),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Sum of present values; zero for a group without any.
    Sum,
    /// Mean of present values; NaN for a group without any.
    Mean,
    /// Number of present values.
    Count,
}

impl Aggregate {
    fn apply(self, values: &[f64], present: usize) -> f64 {
        match self {
            Self::Sum => values.iter().sum(),
            Self::Mean if values.is_empty() => f64::NAN,
            Self::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Self::Count => present as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: GroupKey,
    pub value: f64,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: GroupKey,
    pub values: Vec<f64>,
    pub rows: usize,
}

/// Immutable, column-oriented table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Column>,
    len: usize,
}

impl Dataset {
    /// Reads a CSV with a header row. Columns with an empty header, such as a
    /// serialized row index, are dropped.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let headers = reader.headers()?.clone();

        let kept: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.trim().is_empty())
            .map(|(index, name)| (index, name.to_string()))
            .collect();

        let mut seen = HashSet::new();
        for (_, name) in &kept {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); kept.len()];
        let mut len = 0;
        for record in reader.records() {
            let record = record?;
            for (slot, (index, _)) in cells.iter_mut().zip(&kept) {
                slot.push(record.get(*index).unwrap_or_default().to_string());
            }
            len += 1;
        }

        Ok(Self {
            names: kept.into_iter().map(|(_, name)| name).collect(),
            columns: cells.into_iter().map(Column::infer).collect(),
            len,
        })
    }

    /// Builds a table from named columns, which must all have the same length.
    pub fn from_columns(columns: Vec<(&str, Column)>) -> Result<Self, TableError> {
        let len = columns.first().map_or(0, |(_, column)| column.len());
        let mut names = Vec::with_capacity(columns.len());
        let mut cells = Vec::with_capacity(columns.len());
        for (name, column) in columns {
            if column.len() != len {
                return Err(TableError::ColumnLength {
                    column: name.to_string(),
                    expected: len,
                    actual: column.len(),
                });
            }
            if names.iter().any(|existing| existing == name) {
                return Err(TableError::DuplicateColumn(name.to_string()));
            }
            names.push(name.to_string());
            cells.push(column);
        }
        Ok(Self {
            names,
            columns: cells,
            len,
        })
    }

    /// Checks the required columns, coercing a column with no values at all to
    /// the expected kind.
    pub fn conform(mut self, schema: &[ColumnSpec]) -> Result<Self, TableError> {
        for spec in schema {
            let index = self
                .index_of(spec.name)
                .ok_or_else(|| TableError::MissingColumn(spec.name.to_string()))?;
            let column = &mut self.columns[index];
            if column.kind() == spec.kind {
                continue;
            }
            match column {
                Column::Text(cells)
                    if spec.kind == ColumnKind::Number
                        && cells.iter().all(|cell| cell.trim().is_empty()) =>
                {
                    *column = Column::Number(vec![f64::NAN; cells.len()]);
                }
                _ => {
                    return Err(TableError::ColumnKind {
                        column: spec.name.to_string(),
                        expected: spec.kind,
                        actual: column.kind(),
                    })
                }
            }
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index_of(name).map(|index| &self.columns[index])
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }

    pub fn rows(&self) -> Rows<'_> {
        Rows {
            dataset: self,
            indices: (0..self.len).collect(),
        }
    }

    /// Distinct values of a column in order of first appearance.
    pub fn distinct(&self, column: &str) -> Vec<GroupKey> {
        self.rows().distinct(column)
    }
}

/// A filtered view over a dataset's rows.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> Rows<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub(crate) fn indices(&self) -> &[usize] {
        &self.indices
    }

    fn keep(self, column: &str, predicate: impl Fn(&Column, usize) -> bool) -> Self {
        let Some(found) = self.dataset.column(column) else {
            return Self {
                dataset: self.dataset,
                indices: Vec::new(),
            };
        };
        Self {
            dataset: self.dataset,
            indices: self
                .indices
                .into_iter()
                .filter(|row| predicate(found, *row))
                .collect(),
        }
    }

    pub fn where_text_eq(self, column: &str, value: &str) -> Self {
        self.keep(column, |found, row| match found {
            Column::Text(cells) => cells[row] == value,
            Column::Number(_) => false,
        })
    }

    pub fn where_number_eq(self, column: &str, value: f64) -> Self {
        self.keep(column, |found, row| found.number_at(row) == Some(value))
    }

    /// Rows with `low < value < high`; both bounds are excluded.
    pub fn where_between_exclusive(self, column: &str, low: f64, high: f64) -> Self {
        self.keep(column, |found, row| {
            found
                .number_at(row)
                .is_some_and(|value| value > low && value < high)
        })
    }

    /// Distinct non-missing values in order of first appearance.
    pub fn distinct(&self, column: &str) -> Vec<GroupKey> {
        let Some(found) = self.dataset.column(column) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for row in &self.indices {
            if let Some(key) = found.key_at(*row) {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Splits the rows by a column's value, partitions in order of first
    /// appearance. Rows with a missing key are dropped.
    pub fn partition_by(&self, column: &str) -> Vec<(GroupKey, Rows<'a>)> {
        let Some(found) = self.dataset.column(column) else {
            return Vec::new();
        };
        let mut slots: HashMap<GroupKey, usize> = HashMap::new();
        let mut parts: Vec<(GroupKey, Rows<'a>)> = Vec::new();
        for row in &self.indices {
            let Some(key) = found.key_at(*row) else {
                continue;
            };
            let slot = *slots.entry(key.clone()).or_insert_with(|| {
                parts.push((
                    key,
                    Rows {
                        dataset: self.dataset,
                        indices: Vec::new(),
                    },
                ));
                parts.len() - 1
            });
            parts[slot].1.indices.push(*row);
        }
        parts
    }

    /// Per-row values of a numeric column; missing cells stay NaN.
    pub fn numbers(&self, column: &str) -> Vec<f64> {
        match self.dataset.column(column) {
            Some(Column::Number(values)) => self.indices.iter().map(|row| values[*row]).collect(),
            _ => vec![f64::NAN; self.indices.len()],
        }
    }

    /// Per-row values of any column as figure data.
    pub fn data(&self, column: &str) -> Vec<Datum> {
        match self.dataset.column(column) {
            Some(Column::Text(cells)) => self
                .indices
                .iter()
                .map(|row| Datum::Text(cells[*row].clone()))
                .collect(),
            Some(Column::Number(values)) => self
                .indices
                .iter()
                .map(|row| Datum::Number(values[*row]))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Groups by `key` and aggregates `value`, groups sorted by key.
    pub fn group_by(&self, key: &str, value: &str, aggregate: Aggregate) -> Vec<Group> {
        self.group_by_many(key, &[(value, aggregate)])
            .into_iter()
            .map(|group| Group {
                key: group.key,
                value: group.values[0],
                rows: group.rows,
            })
            .collect()
    }

    /// Groups by `key` and computes one aggregate per `(column, aggregate)`
    /// pair. Rows with a missing key are dropped, an empty row set yields no
    /// groups.
    pub fn group_by_many(&self, key: &str, values: &[(&str, Aggregate)]) -> Vec<GroupRow> {
        let Some(key_column) = self.dataset.column(key) else {
            return Vec::new();
        };
        let value_columns: Vec<Option<&Column>> = values
            .iter()
            .map(|(name, _)| self.dataset.column(name))
            .collect();

        let mut buckets: HashMap<GroupKey, Vec<usize>> = HashMap::new();
        for row in &self.indices {
            if let Some(group) = key_column.key_at(*row) {
                buckets.entry(group).or_default().push(*row);
            }
        }

        let mut groups: Vec<GroupRow> = buckets
            .into_iter()
            .map(|(group, rows)| {
                let aggregated = values
                    .iter()
                    .zip(&value_columns)
                    .map(|((_, aggregate), column)| match column {
                        Some(column) => {
                            let present: Vec<f64> =
                                rows.iter().filter_map(|row| column.number_at(*row)).collect();
                            let present_count =
                                rows.iter().filter(|row| column.is_present(**row)).count();
                            aggregate.apply(&present, present_count)
                        }
                        None => f64::NAN,
                    })
                    .collect();
                GroupRow {
                    key: group,
                    values: aggregated,
                    rows: rows.len(),
                }
            })
            .collect();
        groups.sort_by(|a, b| a.key.cmp(&b.key));
        groups
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
