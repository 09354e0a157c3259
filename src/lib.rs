//! watchpost - camera sentry
//!
//! Watches a camera feed, runs a face or pedestrian detector on a debounced
//! schedule, and reports detections: highlight boxes drawn on the frame,
//! console lines, and a JPEG upload to a remote collector over a single-use
//! TCP connection (the receiver reads until the connection closes; there is
//! no framing).
//!
//! # Module structure
//!
//! - `capture`: frame sources (V4L2 webcam, synthetic stub)
//! - `detect`: detector backends behind the [`Detector`] trait
//! - `gate`: debounce gate bounding detector invocation frequency
//! - `report`: annotate/log/deliver pipeline and the bounded worker pool
//! - `transport`: the close-delimited TCP uploader
//! - `config`: layered startup configuration, immutable afterwards
//!
//! Failures during a cycle (capture, detection, upload) are local to that
//! cycle: the daemon logs them and keeps the loop running.

pub mod capture;
pub mod config;
pub mod detect;
pub mod error;
pub mod frame;
pub mod gate;
pub mod report;
pub mod transport;
pub mod ui;

pub use capture::{CameraConfig, CameraSource, CameraStats};
pub use config::{CameraSettings, WatchConfig};
#[cfg(feature = "backend-opencv")]
pub use detect::{FaceCascadeBackend, HogPeopleBackend};
pub use detect::{select_backend, DetectMode, Detection, Detector, StubBackend};
pub use error::CycleError;
pub use frame::Frame;
pub use gate::DetectionGate;
pub use report::{
    FrameSink, ReportJob, ReportOptions, ReportPipeline, ReportWorkerPool, HIGHLIGHT_COLOR,
    HIGHLIGHT_THICKNESS,
};
pub use transport::{TcpUploader, UploadConfig};
