//! Detector collaborators.
//!
//! Detection itself is delegated to external implementations behind the
//! [`Detector`] trait. Two production backends ship behind the
//! `backend-opencv` feature (a trained face cascade and a HOG pedestrian
//! descriptor); the always-available stub backend hashes frames and is what
//! tests and feature-less builds run against.

use anyhow::{anyhow, Result};

mod backend;
mod backends;
mod result;

pub use backend::{DetectMode, Detector};
#[cfg(feature = "backend-opencv")]
pub use backends::{FaceCascadeBackend, HogPeopleBackend};
pub use backends::StubBackend;
pub use result::Detection;

/// Select the detector backend for the configured mode.
///
/// With `backend-opencv` enabled this loads the cascade model (faces mode)
/// or the default people descriptor; otherwise the stub backend stands in
/// for either mode.
pub fn select_backend(mode: DetectMode, cascade_path: &str) -> Result<Box<dyn Detector>> {
    #[cfg(feature = "backend-opencv")]
    let backend: Box<dyn Detector> = match mode {
        DetectMode::Faces => Box::new(FaceCascadeBackend::load(cascade_path)?),
        DetectMode::People => Box::new(HogPeopleBackend::new()?),
    };

    #[cfg(not(feature = "backend-opencv"))]
    let backend: Box<dyn Detector> = {
        let _ = cascade_path;
        Box::new(StubBackend::new())
    };

    if !backend.supports(mode) {
        return Err(anyhow!(
            "backend '{}' does not support {:?} mode",
            backend.name(),
            mode
        ));
    }
    log::info!("detector backend: {} ({:?} mode)", backend.name(), mode);
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_yields_a_backend_for_both_modes() {
        for mode in [DetectMode::People, DetectMode::Faces] {
            let backend = select_backend(mode, "haarcascade_frontalface_default.xml");
            #[cfg(not(feature = "backend-opencv"))]
            assert_eq!(backend.unwrap().name(), "stub");
            #[cfg(feature = "backend-opencv")]
            let _ = backend;
        }
    }
}
