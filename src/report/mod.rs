//! Detection report pipeline.
//!
//! For each rectangle the detector produced, in order: draw the highlight
//! outline (when enabled) and emit a console line (when enabled). After all
//! rectangles, deliver the frame to the sink exactly once if the cycle had
//! any detections. Annotation mutates the frame in place, so it always
//! precedes delivery.

mod worker;

pub use worker::{ReportJob, ReportWorkerPool};

use crate::detect::Detection;
use crate::error::CycleError;
use crate::frame::Frame;

/// Highlight outline colour (green) and stroke width.
pub const HIGHLIGHT_COLOR: [u8; 3] = [0, 255, 0];
pub const HIGHLIGHT_THICKNESS: u32 = 2;

/// Where frames go after a cycle with detections.
///
/// The production sink is [`TcpUploader`](crate::transport::TcpUploader);
/// tests substitute counting sinks.
pub trait FrameSink: Send {
    fn deliver(&mut self, frame: &Frame) -> Result<(), CycleError>;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn deliver(&mut self, frame: &Frame) -> Result<(), CycleError> {
        (**self).deliver(frame)
    }
}

/// Per-cycle report settings, resolved once at startup.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportOptions {
    pub highlight: bool,
    pub console: bool,
}

/// Runs the annotate/log/deliver sequence for one cycle's detections.
pub struct ReportPipeline<S> {
    options: ReportOptions,
    sink: Option<S>,
}

impl<S: FrameSink> ReportPipeline<S> {
    /// A pipeline with `sink: None` annotates and logs but never delivers
    /// (upload disabled).
    pub fn new(options: ReportOptions, sink: Option<S>) -> Self {
        Self { options, sink }
    }

    /// Process one cycle's detections against its frame.
    ///
    /// Delivery happens at most once per cycle, only when `detections` is
    /// non-empty, and only after every rectangle has been annotated.
    pub fn process(
        &mut self,
        detections: &[Detection],
        frame: &mut Frame,
    ) -> Result<(), CycleError> {
        for det in detections {
            if self.options.highlight {
                frame.draw_outline(det, HIGHLIGHT_COLOR, HIGHLIGHT_THICKNESS);
            }
            if self.options.console {
                println!("Detected at ({}, {}), w: {} h: {}", det.x, det.y, det.w, det.h);
            }
        }

        if detections.is_empty() {
            return Ok(());
        }
        match &mut self.sink {
            Some(sink) => sink.deliver(frame),
            None => Ok(()),
        }
    }
}
