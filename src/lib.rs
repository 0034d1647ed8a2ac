//! Core of an interactive dataset-plotting tool.
//!
//! A thin UI shell feeds this crate an uploaded CSV and a plot selection;
//! the crate parses the CSV into a typed [`Dataset`], validates the
//! selection against the table schema, renders the chart, and returns
//! PNG bytes ready for download.
//!
//! ```no_run
//! use csvplot::{PlotKind, PlotRequest, Session};
//!
//! let mut session = Session::new();
//! session.load_dataset(b"city,population,area\nLyon,522969,47.87\n")?;
//!
//! let request = PlotRequest::new(PlotKind::Scatter, ["population", "area"], "viridis");
//! let chart = session.render(&request)?;
//! std::fs::write("plot.png", chart.png_bytes())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod color;
pub mod data;
pub mod error;
pub mod plot;
pub mod session;

pub use color::ColorScheme;
pub use data::loader::load_csv;
pub use data::model::{Column, ColumnData, ColumnKind, ColumnSummary, Dataset};
pub use error::{
    ChartError, ChartResult, InvalidSelectionError, MalformedInputError, RenderError,
};
pub use plot::{render, render_with, PlotKind, PlotRequest, RenderOptions, RenderedChart};
pub use session::Session;
