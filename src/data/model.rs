use std::fmt;

use serde::Serialize;

use crate::error::MalformedInputError;

// ---------------------------------------------------------------------------
// ColumnData – a whole column as a tagged union
// ---------------------------------------------------------------------------

/// The values of one column. A column is numeric when every non-empty cell
/// parses as a number (empty cells become NaN), otherwise categorical.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }
}

/// The inferred type of a column, exposed to the UI shell for selector
/// population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – one named column
// ---------------------------------------------------------------------------

/// A named column with its inferred type and row-aligned values.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Column {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the values as numbers, if this is a numeric column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Categorical(_) => None,
        }
    }

    /// Borrow the values as text, if this is a categorical column.
    pub fn as_categorical(&self) -> Option<&[String]> {
        match &self.data {
            ColumnData::Categorical(v) => Some(v),
            ColumnData::Numeric(_) => None,
        }
    }
}

/// Schema entry for one column: name plus inferred type.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table: an ordered sequence of equally long, uniquely
/// named columns. Immutable after load; replaced wholesale when a new file
/// is uploaded.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Build a dataset from loaded columns, enforcing the invariants:
    /// unique names, equal lengths, at least one column and one row.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, MalformedInputError> {
        let Some(first) = columns.first() else {
            return Err(MalformedInputError::NoColumns);
        };
        let rows = first.len();
        if rows == 0 {
            return Err(MalformedInputError::NoRows);
        }

        for (i, col) in columns.iter().enumerate() {
            if col.len() != rows {
                return Err(MalformedInputError::ColumnLength {
                    name: col.name().to_string(),
                    got: col.len(),
                    expected: rows,
                });
            }
            if columns[..i].iter().any(|c| c.name() == col.name()) {
                return Err(MalformedInputError::DuplicateColumn(col.name().to_string()));
            }
        }

        Ok(Dataset { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// All column names, in dataset order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name())
    }

    /// The numeric columns, in dataset order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    /// Name + inferred type per column, for the UI shell's selectors.
    pub fn schema(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .map(|c| ColumnSummary {
                name: c.name().to_string(),
                kind: c.kind(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(name: &str, values: &[f64]) -> Column {
        Column::new(name, ColumnData::Numeric(values.to_vec()))
    }

    fn categorical(name: &str, values: &[&str]) -> Column {
        Column::new(
            name,
            ColumnData::Categorical(values.iter().map(|s| s.to_string()).collect()),
        )
    }

    #[test]
    fn from_columns_counts_rows() {
        let ds = Dataset::from_columns(vec![
            numeric("a", &[1.0, 2.0, 3.0]),
            categorical("b", &["x", "y", "z"]),
        ])
        .unwrap();
        assert_eq!(ds.column_count(), 2);
        assert_eq!(ds.row_count(), 3);
    }

    #[test]
    fn rejects_unequal_lengths() {
        let err = Dataset::from_columns(vec![
            numeric("a", &[1.0, 2.0]),
            numeric("b", &[1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, MalformedInputError::ColumnLength { .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Dataset::from_columns(vec![
            numeric("a", &[1.0]),
            numeric("a", &[2.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, MalformedInputError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn rejects_empty_table() {
        assert!(matches!(
            Dataset::from_columns(vec![]),
            Err(MalformedInputError::NoColumns)
        ));
        assert!(matches!(
            Dataset::from_columns(vec![numeric("a", &[])]),
            Err(MalformedInputError::NoRows)
        ));
    }

    #[test]
    fn lookup_and_schema() {
        let ds = Dataset::from_columns(vec![
            numeric("value", &[1.0]),
            categorical("label", &["x"]),
        ])
        .unwrap();

        assert!(ds.column("value").is_some_and(|c| c.is_numeric()));
        assert!(ds.column("missing").is_none());
        assert_eq!(
            ds.numeric_columns().map(|c| c.name()).collect::<Vec<_>>(),
            ["value"]
        );

        let schema = ds.schema();
        assert_eq!(schema[1].kind, ColumnKind::Categorical);
    }
}
