//! Frame capture sources.
//!
//! A capture source opens a device, yields one [`Frame`](crate::frame::Frame)
//! per call, and releases the device when dropped. Two backends sit behind
//! one wrapper:
//! - `stub://` synthetic source (always available; deterministic frames for
//!   tests and dry runs)
//! - local V4L2 webcam (feature: capture-v4l2)
//!
//! A capture failure is local to one cycle: the caller logs it and retries
//! on the next iteration rather than tearing the loop down.

mod camera;

pub use camera::{CameraConfig, CameraSource, CameraStats};
