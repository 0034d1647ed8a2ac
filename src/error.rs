use thiserror::Error;

use crate::plot::request::PlotKind;

// ---------------------------------------------------------------------------
// MalformedInputError – the upload could not be turned into a Dataset
// ---------------------------------------------------------------------------

/// Errors raised while parsing an uploaded CSV byte stream.
#[derive(Debug, Error)]
pub enum MalformedInputError {
    /// The upload was empty (or contained only whitespace).
    #[error("empty input")]
    Empty,

    /// The CSV reader rejected the input (includes inconsistent row lengths).
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Header row present but contains no column names.
    #[error("no columns found")]
    NoColumns,

    /// Header row present but no data rows followed.
    #[error("no data rows found")]
    NoRows,

    /// Column names must be unique within a dataset.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// Columns ended up with different lengths.
    #[error("column '{name}' has {got} values, expected {expected}")]
    ColumnLength {
        name: String,
        got: usize,
        expected: usize,
    },
}

// ---------------------------------------------------------------------------
// InvalidSelectionError – request does not match the dataset schema
// ---------------------------------------------------------------------------

/// Errors raised while validating a [`PlotRequest`](crate::plot::PlotRequest)
/// against a dataset. Each variant names the offending field so the caller
/// can correct the selection.
#[derive(Debug, Error)]
pub enum InvalidSelectionError {
    #[error("unknown color scheme '{name}', expected one of: viridis, magma, plasma, inferno, cividis")]
    UnknownColorScheme { name: String },

    #[error("{kind} expects {expected} column selection(s), got {got}")]
    ColumnCount {
        kind: PlotKind,
        expected: String,
        got: usize,
    },

    #[error("no column named '{name}' in the dataset")]
    UnknownColumn { name: String },

    #[error("column '{name}' must be numeric to serve as {role} for {kind}")]
    NumericRequired {
        kind: PlotKind,
        role: &'static str,
        name: String,
    },

    #[error("column '{name}' must be categorical to serve as {role} for {kind}")]
    CategoricalRequired {
        kind: PlotKind,
        role: &'static str,
        name: String,
    },

    #[error("{kind} needs at least {min} numeric columns, found {got}")]
    NotEnoughNumericColumns {
        kind: PlotKind,
        min: usize,
        got: usize,
    },
}

// ---------------------------------------------------------------------------
// RenderError – validation passed but the chart could not be produced
// ---------------------------------------------------------------------------

/// Unexpected failures during chart generation.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A selected column contains no finite values to plot.
    #[error("column '{name}' has no finite values to plot")]
    DegenerateColumn { name: String },

    /// The drawing backend reported a failure.
    #[error("drawing failed: {0}")]
    Backend(String),

    /// Encoding the rendered bitmap as PNG failed.
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

// ---------------------------------------------------------------------------
// ChartError – umbrella for the session-level entry points
// ---------------------------------------------------------------------------

/// Any error a load-or-render pass can surface. All variants are local to a
/// single request; the caller may correct the input and retry.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("no dataset loaded")]
    NoDataset,

    #[error(transparent)]
    MalformedInput(#[from] MalformedInputError),

    #[error(transparent)]
    InvalidSelection(#[from] InvalidSelectionError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result alias for operations returning [`ChartError`].
pub type ChartResult<T> = Result<T, ChartError>;
