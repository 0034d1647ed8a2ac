/// Plot layer: request validation and chart rendering.
///
/// Architecture:
/// ```text
///   PlotRequest + Dataset
///        │
///        ▼
///   ┌──────────┐
///   │ request   │  rule table + validate → ValidatedRequest
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  render   │ ───▶ │  stats    │  Pearson matrix, binning
///   └──────────┘      └──────────┘
///        │
///        ▼
///   RenderedChart (PNG bytes + dimensions)
/// ```
pub mod render;
pub mod request;
pub mod stats;

pub use render::{render, render_with, RenderOptions, RenderedChart};
pub use request::{validate, PlotKind, PlotRequest, SelectionRule, ValidatedRequest};
