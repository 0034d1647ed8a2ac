use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::ColorScheme;
use crate::data::model::{Column, Dataset};
use crate::error::InvalidSelectionError;

// ---------------------------------------------------------------------------
// PlotKind
// ---------------------------------------------------------------------------

/// The six supported chart geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    Line,
    Bar,
    Scatter,
    Histogram,
    Box,
    CorrelationMatrix,
}

impl PlotKind {
    /// All supported kinds, in the order the UI shell lists them.
    pub const ALL: [PlotKind; 6] = [
        PlotKind::Line,
        PlotKind::Bar,
        PlotKind::Scatter,
        PlotKind::Histogram,
        PlotKind::Box,
        PlotKind::CorrelationMatrix,
    ];

    /// How many columns this kind accepts.
    pub fn selection_rule(&self) -> SelectionRule {
        match self {
            // x + at least one y
            PlotKind::Line => SelectionRule { min: 2, max: None },
            // category + value
            PlotKind::Bar => SelectionRule { min: 2, max: Some(2) },
            PlotKind::Scatter => SelectionRule { min: 2, max: Some(2) },
            PlotKind::Histogram => SelectionRule { min: 1, max: Some(1) },
            PlotKind::Box => SelectionRule { min: 1, max: None },
            // Empty selection defaults to all numeric columns.
            PlotKind::CorrelationMatrix => SelectionRule { min: 0, max: None },
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlotKind::Line => "Line Plot",
            PlotKind::Bar => "Bar Plot",
            PlotKind::Scatter => "Scatter Plot",
            PlotKind::Histogram => "Histogram",
            PlotKind::Box => "Box Plot",
            PlotKind::CorrelationMatrix => "Correlation Matrix",
        };
        f.write_str(name)
    }
}

impl FromStr for PlotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "line" | "lineplot" => Ok(PlotKind::Line),
            "bar" | "barplot" => Ok(PlotKind::Bar),
            "scatter" | "scatterplot" => Ok(PlotKind::Scatter),
            "histogram" => Ok(PlotKind::Histogram),
            "box" | "boxplot" => Ok(PlotKind::Box),
            "correlationmatrix" => Ok(PlotKind::CorrelationMatrix),
            _ => Err(format!("unknown plot kind '{s}'")),
        }
    }
}

/// Accepted column-selection arity for a plot kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRule {
    pub min: usize,
    pub max: Option<usize>,
}

impl SelectionRule {
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    /// Human description used in error messages: "exactly 2", "at least 1".
    pub fn describe(&self) -> String {
        match self.max {
            Some(max) if max == self.min => format!("exactly {max}"),
            Some(max) => format!("between {} and {max}", self.min),
            None => format!("at least {}", self.min),
        }
    }
}

// ---------------------------------------------------------------------------
// PlotRequest
// ---------------------------------------------------------------------------

/// One render action as the UI shell submits it: a plot kind, the selected
/// column names (order matters: x before y where the kind distinguishes
/// them), and a color-scheme name. Constructed fresh per action, never
/// mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotRequest {
    pub kind: PlotKind,
    pub columns: Vec<String>,
    pub scheme: String,
}

impl PlotRequest {
    pub fn new<I, S>(kind: PlotKind, columns: I, scheme: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PlotRequest {
            kind,
            columns: columns.into_iter().map(Into::into).collect(),
            scheme: scheme.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation: PlotRequest + Dataset → ValidatedRequest
// ---------------------------------------------------------------------------

/// A request that passed validation, with column names resolved to borrowed
/// values and the scheme name resolved to a [`ColorScheme`]. Rendering
/// consumes this; it cannot be constructed around a schema mismatch.
pub struct ValidatedRequest<'a> {
    pub(crate) scheme: ColorScheme,
    pub(crate) spec: PlotSpec<'a>,
}

impl std::fmt::Debug for ValidatedRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedRequest")
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

pub(crate) struct NumericColumn<'a> {
    pub name: &'a str,
    pub values: &'a [f64],
}

pub(crate) struct CategoricalColumn<'a> {
    pub name: &'a str,
    pub values: &'a [String],
}

/// The x axis of a line plot: numeric values, or categories plotted by row
/// position.
pub(crate) enum XColumn<'a> {
    Numeric(NumericColumn<'a>),
    Categorical(CategoricalColumn<'a>),
}

impl XColumn<'_> {
    pub fn name(&self) -> &str {
        match self {
            XColumn::Numeric(c) => c.name,
            XColumn::Categorical(c) => c.name,
        }
    }
}

pub(crate) enum PlotSpec<'a> {
    Line {
        x: XColumn<'a>,
        ys: Vec<NumericColumn<'a>>,
    },
    Bar {
        categories: CategoricalColumn<'a>,
        values: NumericColumn<'a>,
    },
    Scatter {
        x: NumericColumn<'a>,
        y: NumericColumn<'a>,
    },
    Histogram {
        values: NumericColumn<'a>,
    },
    Box {
        columns: Vec<NumericColumn<'a>>,
    },
    Correlation {
        columns: Vec<NumericColumn<'a>>,
    },
}

/// Check a request against the dataset schema and the kind's rule table.
///
/// Runs before any rendering attempt. The scheme name is checked first, so
/// an unknown scheme fails for every kind regardless of column selection;
/// then the arity table, then per-column existence and type roles.
pub fn validate<'a>(
    dataset: &'a Dataset,
    request: &PlotRequest,
) -> Result<ValidatedRequest<'a>, InvalidSelectionError> {
    let scheme: ColorScheme = request.scheme.parse()?;

    let rule = request.kind.selection_rule();
    if !rule.accepts(request.columns.len()) {
        return Err(InvalidSelectionError::ColumnCount {
            kind: request.kind,
            expected: rule.describe(),
            got: request.columns.len(),
        });
    }

    let spec = match request.kind {
        PlotKind::Line => {
            let x = lookup(dataset, &request.columns[0])?;
            let x = match x.as_numeric() {
                Some(values) => XColumn::Numeric(NumericColumn {
                    name: x.name(),
                    values,
                }),
                None => XColumn::Categorical(CategoricalColumn {
                    name: x.name(),
                    values: x.as_categorical().unwrap_or(&[]),
                }),
            };
            let ys = request.columns[1..]
                .iter()
                .map(|name| require_numeric(dataset, name, request.kind, "y-axis"))
                .collect::<Result<Vec<_>, _>>()?;
            PlotSpec::Line { x, ys }
        }
        PlotKind::Bar => PlotSpec::Bar {
            categories: require_categorical(dataset, &request.columns[0], request.kind, "x-axis")?,
            values: require_numeric(dataset, &request.columns[1], request.kind, "y-axis")?,
        },
        PlotKind::Scatter => PlotSpec::Scatter {
            x: require_numeric(dataset, &request.columns[0], request.kind, "x-axis")?,
            y: require_numeric(dataset, &request.columns[1], request.kind, "y-axis")?,
        },
        PlotKind::Histogram => PlotSpec::Histogram {
            values: require_numeric(dataset, &request.columns[0], request.kind, "the value axis")?,
        },
        PlotKind::Box => {
            let columns = request
                .columns
                .iter()
                .map(|name| require_numeric(dataset, name, request.kind, "a value column"))
                .collect::<Result<Vec<_>, _>>()?;
            PlotSpec::Box { columns }
        }
        PlotKind::CorrelationMatrix => {
            let columns = if request.columns.is_empty() {
                // Default: all numeric columns, in dataset order.
                dataset
                    .numeric_columns()
                    .map(|c| NumericColumn {
                        name: c.name(),
                        values: c.as_numeric().unwrap_or(&[]),
                    })
                    .collect::<Vec<_>>()
            } else {
                request
                    .columns
                    .iter()
                    .map(|name| require_numeric(dataset, name, request.kind, "a matrix column"))
                    .collect::<Result<Vec<_>, _>>()?
            };
            if columns.len() < 2 {
                return Err(InvalidSelectionError::NotEnoughNumericColumns {
                    kind: request.kind,
                    min: 2,
                    got: columns.len(),
                });
            }
            PlotSpec::Correlation { columns }
        }
    };

    Ok(ValidatedRequest { scheme, spec })
}

fn lookup<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Column, InvalidSelectionError> {
    dataset
        .column(name)
        .ok_or_else(|| InvalidSelectionError::UnknownColumn {
            name: name.to_string(),
        })
}

fn require_numeric<'a>(
    dataset: &'a Dataset,
    name: &str,
    kind: PlotKind,
    role: &'static str,
) -> Result<NumericColumn<'a>, InvalidSelectionError> {
    let column = lookup(dataset, name)?;
    match column.as_numeric() {
        Some(values) => Ok(NumericColumn {
            name: column.name(),
            values,
        }),
        None => Err(InvalidSelectionError::NumericRequired {
            kind,
            role,
            name: name.to_string(),
        }),
    }
}

fn require_categorical<'a>(
    dataset: &'a Dataset,
    name: &str,
    kind: PlotKind,
    role: &'static str,
) -> Result<CategoricalColumn<'a>, InvalidSelectionError> {
    let column = lookup(dataset, name)?;
    match column.as_categorical() {
        Some(values) => Ok(CategoricalColumn {
            name: column.name(),
            values,
        }),
        None => Err(InvalidSelectionError::CategoricalRequired {
            kind,
            role,
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv;

    fn dataset() -> Dataset {
        load_csv(b"city,population,area,score\nLyon,522969,47.87,3\nNantes,320732,65.19,4\nLille,236234,34.83,2\n")
            .unwrap()
    }

    fn request(kind: PlotKind, columns: &[&str]) -> PlotRequest {
        PlotRequest::new(kind, columns.iter().copied(), "viridis")
    }

    #[test]
    fn scatter_requires_exactly_two_columns() {
        let ds = dataset();
        for columns in [&["population"][..], &["population", "area", "score"][..]] {
            let err = validate(&ds, &request(PlotKind::Scatter, columns)).unwrap_err();
            assert!(matches!(
                err,
                InvalidSelectionError::ColumnCount { kind: PlotKind::Scatter, .. }
            ));
        }
        assert!(validate(&ds, &request(PlotKind::Scatter, &["population", "area"])).is_ok());
    }

    #[test]
    fn scatter_rejects_categorical_columns() {
        let ds = dataset();
        let err = validate(&ds, &request(PlotKind::Scatter, &["city", "area"])).unwrap_err();
        assert!(matches!(
            err,
            InvalidSelectionError::NumericRequired { name, .. } if name == "city"
        ));
    }

    #[test]
    fn unknown_scheme_fails_for_every_kind() {
        let ds = dataset();
        for kind in PlotKind::ALL {
            let req = PlotRequest::new(kind, ["population", "area"], "rainbow");
            let err = validate(&ds, &req).unwrap_err();
            assert!(
                matches!(err, InvalidSelectionError::UnknownColorScheme { ref name } if name == "rainbow"),
                "{kind} accepted an unknown scheme"
            );
        }
    }

    #[test]
    fn unknown_column_is_named_in_the_error() {
        let ds = dataset();
        let err = validate(&ds, &request(PlotKind::Histogram, &["altitude"])).unwrap_err();
        assert!(matches!(
            err,
            InvalidSelectionError::UnknownColumn { name } if name == "altitude"
        ));
    }

    #[test]
    fn bar_wants_categorical_then_numeric() {
        let ds = dataset();
        assert!(validate(&ds, &request(PlotKind::Bar, &["city", "population"])).is_ok());

        let err = validate(&ds, &request(PlotKind::Bar, &["population", "area"])).unwrap_err();
        assert!(matches!(err, InvalidSelectionError::CategoricalRequired { .. }));

        let err = validate(&ds, &request(PlotKind::Bar, &["city", "city"])).unwrap_err();
        assert!(matches!(err, InvalidSelectionError::NumericRequired { .. }));
    }

    #[test]
    fn line_accepts_categorical_x_and_multiple_numeric_ys() {
        let ds = dataset();
        assert!(validate(&ds, &request(PlotKind::Line, &["city", "population", "area"])).is_ok());

        let err = validate(&ds, &request(PlotKind::Line, &["area", "city"])).unwrap_err();
        assert!(matches!(
            err,
            InvalidSelectionError::NumericRequired { name, .. } if name == "city"
        ));
    }

    #[test]
    fn correlation_defaults_to_all_numeric_columns() {
        let ds = dataset();
        let validated = validate(&ds, &request(PlotKind::CorrelationMatrix, &[])).unwrap();
        match validated.spec {
            PlotSpec::Correlation { columns } => {
                let names: Vec<_> = columns.iter().map(|c| c.name).collect();
                assert_eq!(names, ["population", "area", "score"]);
            }
            _ => panic!("expected a correlation spec"),
        }
    }

    #[test]
    fn correlation_needs_two_numeric_columns() {
        let ds = load_csv(b"city,population\nLyon,522969\nNantes,320732\n").unwrap();
        let err = validate(&ds, &request(PlotKind::CorrelationMatrix, &[])).unwrap_err();
        assert!(matches!(
            err,
            InvalidSelectionError::NotEnoughNumericColumns { min: 2, got: 1, .. }
        ));
    }

    #[test]
    fn selection_rules_describe_their_arity() {
        assert_eq!(PlotKind::Scatter.selection_rule().describe(), "exactly 2");
        assert_eq!(PlotKind::Box.selection_rule().describe(), "at least 1");
        assert!(PlotKind::Histogram.selection_rule().accepts(1));
        assert!(!PlotKind::Histogram.selection_rule().accepts(2));
    }

    #[test]
    fn request_round_trips_through_serde() {
        let req = request(PlotKind::CorrelationMatrix, &["population", "area"]);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"correlation_matrix\""));
        let back: PlotRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, req.kind);
        assert_eq!(back.columns, req.columns);
        assert_eq!(back.scheme, req.scheme);
    }
}
