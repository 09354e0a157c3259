use anyhow::Result;

use crate::detect::result::Detection;

/// What the detector scans for. Selected once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectMode {
    People,
    Faces,
}

/// Detector backend trait.
///
/// Implementations receive the greyscale plane of the current frame and
/// return axis-aligned rectangles where a target was found. Rectangles are
/// consumed within the cycle that produced them and must never be cached
/// across frames.
pub trait Detector: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Returns true when the backend can scan for `mode` targets.
    fn supports(&self, mode: DetectMode) -> bool;

    /// Run detection on one greyscale frame.
    fn detect(&mut self, luma: &[u8], width: u32, height: u32) -> Result<Vec<Detection>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
