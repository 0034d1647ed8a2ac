use csv::Trim;

use crate::error::MalformedInputError;

use super::model::{Column, ColumnData, ColumnKind, Dataset};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse an uploaded CSV byte stream into a [`Dataset`].
///
/// Expected layout: a header row with column names, then one record per
/// data row:
///
/// ```text
/// city,population,area
/// Lyon,522969,47.87
/// Nantes,320732,65.19
/// ```
///
/// A column is inferred numeric when every non-empty cell parses as a
/// number; empty cells in a numeric column load as NaN. Anything else makes
/// the column categorical. Fields are trimmed of surrounding whitespace.
pub fn load_csv(bytes: &[u8]) -> Result<Dataset, MalformedInputError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(MalformedInputError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new().trim(Trim::All).from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(MalformedInputError::NoColumns);
    }

    // Collect all records up front; the reader rejects rows whose field
    // count differs from the header.
    let mut records = Vec::new();
    for result in reader.records() {
        records.push(result?);
    }
    if records.is_empty() {
        return Err(MalformedInputError::NoRows);
    }

    let columns = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&str> = records
                .iter()
                .map(|rec| rec.get(idx).unwrap_or(""))
                .collect();
            build_column(name, &cells)
        })
        .collect();

    Dataset::from_columns(columns)
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

/// Numeric iff every non-empty cell parses as `f64`.
fn infer_kind(cells: &[&str]) -> ColumnKind {
    for cell in cells {
        if !cell.is_empty() && cell.parse::<f64>().is_err() {
            return ColumnKind::Categorical;
        }
    }
    ColumnKind::Numeric
}

fn build_column(name: &str, cells: &[&str]) -> Column {
    match infer_kind(cells) {
        ColumnKind::Numeric => {
            let values = cells.iter().map(|c| parse_numeric_cell(c)).collect();
            Column::new(name, ColumnData::Numeric(values))
        }
        ColumnKind::Categorical => {
            let values = cells.iter().map(|c| c.to_string()).collect();
            Column::new(name, ColumnData::Categorical(values))
        }
    }
}

fn parse_numeric_cell(cell: &str) -> f64 {
    if cell.is_empty() {
        return f64::NAN;
    }
    cell.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_basic_table() {
        let ds = load_csv(b"a,b,c\n1,x,0.5\n2,y,1.5\n3,z,2.5\n").unwrap();
        assert_eq!(ds.column_count(), 3);
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_names().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn infers_numeric_and_categorical() {
        let ds = load_csv(b"n,s\n1,1\n2.5,two\n-3e2,3\n").unwrap();
        assert_eq!(ds.column("n").unwrap().kind(), ColumnKind::Numeric);
        // One non-numeric value forces the whole column categorical.
        assert_eq!(ds.column("s").unwrap().kind(), ColumnKind::Categorical);
    }

    #[test]
    fn empty_cells_become_nan_in_numeric_columns() {
        let ds = load_csv(b"n\n1\n\n3\n").unwrap();
        let values = ds.column("n").unwrap().as_numeric().unwrap();
        assert_eq!(values.len(), 3);
        assert!(values[1].is_nan());
    }

    #[test]
    fn trims_whitespace_around_fields() {
        let ds = load_csv(b"a, b\n 1 , hello \n").unwrap();
        assert_eq!(ds.column_names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(ds.column("a").unwrap().as_numeric().unwrap()[0], 1.0);
        assert_eq!(ds.column("b").unwrap().as_categorical().unwrap()[0], "hello");
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(matches!(load_csv(b""), Err(MalformedInputError::Empty)));
        assert!(matches!(load_csv(b"  \n "), Err(MalformedInputError::Empty)));
    }

    #[test]
    fn header_without_rows_is_malformed() {
        assert!(matches!(
            load_csv(b"a,b\n"),
            Err(MalformedInputError::NoRows)
        ));
    }

    #[test]
    fn ragged_rows_are_malformed() {
        assert!(matches!(
            load_csv(b"a,b\n1,2\n3\n"),
            Err(MalformedInputError::Csv(_))
        ));
    }

    #[test]
    fn duplicate_headers_are_malformed() {
        assert!(matches!(
            load_csv(b"a,a\n1,2\n"),
            Err(MalformedInputError::DuplicateColumn(name)) if name == "a"
        ));
    }

    #[test]
    fn quoted_fields_keep_delimiters() {
        let ds = load_csv(b"a,b\n\"1,5\",2\n").unwrap();
        // "1,5" does not parse as a number, so the column is categorical.
        assert_eq!(ds.column("a").unwrap().kind(), ColumnKind::Categorical);
        assert_eq!(ds.column("a").unwrap().as_categorical().unwrap()[0], "1,5");
    }
}
