use crate::data::loader;
use crate::data::model::Dataset;
use crate::error::{ChartError, MalformedInputError};
use crate::plot::{self, PlotRequest, RenderOptions, RenderedChart};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Per-session context: the current dataset and the latest rendered chart,
/// passed explicitly to the UI shell instead of living in ambient globals.
/// One session serves one user; every action runs to completion before the
/// next, so no synchronization is involved.
#[derive(Default)]
pub struct Session {
    /// Loaded dataset (None until the first successful upload).
    dataset: Option<Dataset>,

    /// Most recently rendered chart, kept until the next render or upload.
    last_chart: Option<RenderedChart>,

    /// Status / error message for the UI shell to display.
    status: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Ingest a newly uploaded CSV. Replaces the previous dataset and drops
    /// the stale chart; on failure the previous dataset stays in place.
    pub fn load_dataset(&mut self, bytes: &[u8]) -> Result<&Dataset, MalformedInputError> {
        match loader::load_csv(bytes) {
            Ok(dataset) => {
                log::info!(
                    "Loaded dataset: {} rows, {} columns ({:?})",
                    dataset.row_count(),
                    dataset.column_count(),
                    dataset.column_names().collect::<Vec<_>>()
                );
                self.last_chart = None;
                self.status = None;
                Ok(self.dataset.insert(dataset))
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.status = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Render a chart from the current dataset at the default resolution.
    pub fn render(&mut self, request: &PlotRequest) -> Result<&RenderedChart, ChartError> {
        self.render_with(request, &RenderOptions::default())
    }

    /// [`Session::render`] with explicit output geometry. The chart is kept
    /// as `last_chart` until the next render or upload.
    pub fn render_with(
        &mut self,
        request: &PlotRequest,
        options: &RenderOptions,
    ) -> Result<&RenderedChart, ChartError> {
        let result = match &self.dataset {
            Some(dataset) => plot::render_with(dataset, request, options),
            None => Err(ChartError::NoDataset),
        };
        match result {
            Ok(chart) => {
                log::info!(
                    "Rendered {} ({}x{}, {} bytes)",
                    request.kind,
                    chart.width(),
                    chart.height(),
                    chart.png_bytes().len()
                );
                self.status = None;
                Ok(self.last_chart.insert(chart))
            }
            Err(e) => {
                log::error!("Failed to render {}: {e}", request.kind);
                self.status = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn last_chart(&self) -> Option<&RenderedChart> {
        self.last_chart.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Hand the latest chart to the download path, leaving the session
    /// without one until the next render.
    pub fn take_chart(&mut self) -> Option<RenderedChart> {
        self.last_chart.take()
    }

    /// Discard all session state, as when the session ends.
    pub fn clear(&mut self) {
        self.dataset = None;
        self.last_chart = None;
        self.status = None;
    }
}
