//! Error taxonomy for the fetch → normalize → merge → statistic → render pipeline.

/// Errors raised by the pipeline stages.
///
/// Unknown state names and non-numeric values are deliberately absent: those
/// coerce to missing values and never fail a stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Transport-level failure (DNS, connect, TLS, body read).
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    /// The URL could not be parsed.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parsed fine but does not have the expected shape.
    #[error("unexpected JSON shape: {0}")]
    JsonShape(String),

    /// A required CSV column is absent after header trimming.
    #[error("missing column '{0}'")]
    MissingColumn(String),

    /// The inner join produced no rows.
    #[error("no states present in both datasets")]
    EmptyMerge,

    /// Too few points, or no variance, for a meaningful correlation.
    #[error("degenerate sample (n = {n}): {reason}")]
    DegenerateSample { n: usize, reason: String },

    #[error("render error: {0}")]
    Render(String),
}

impl From<image::ImageError> for PipelineError {
    fn from(e: image::ImageError) -> Self {
        PipelineError::Render(e.to_string())
    }
}

/// Alias for Result with [`PipelineError`]
pub type Result<T> = std::result::Result<T, PipelineError>;
