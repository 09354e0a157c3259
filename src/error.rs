use thiserror::Error;

/// Failures local to one capture cycle.
///
/// None of these may escape the capture loop: the daemon logs the failure,
/// drops whatever work the cycle had in flight, and moves on to the next
/// frame.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Frame unavailable. The cycle is skipped.
    #[error("frame capture failed: {0:#}")]
    Capture(anyhow::Error),

    /// Detector invocation failed. Treated as zero detections.
    #[error("detector '{backend}' failed: {cause:#}")]
    Detector {
        backend: &'static str,
        cause: anyhow::Error,
    },

    /// Connect/write/shutdown error on the upload socket after retries.
    /// The frame's report is dropped.
    #[error("upload to {dest} failed: {cause:#}")]
    Upload {
        dest: String,
        cause: anyhow::Error,
    },
}
