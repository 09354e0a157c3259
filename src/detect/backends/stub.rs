use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::detect::backend::{DetectMode, Detector};
use crate::detect::result::Detection;

/// Stub backend for testing and feature-less builds.
///
/// Hashes the greyscale plane and reports one full-frame detection whenever
/// the scene changed since the previous invocation.
pub struct StubBackend {
    last_hash: Option<[u8; 32]>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self { last_hash: None }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn supports(&self, _mode: DetectMode) -> bool {
        true
    }

    fn detect(&mut self, luma: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        let current_hash: [u8; 32] = Sha256::digest(luma).into();

        let changed = self.last_hash.is_some_and(|prev| prev != current_hash);
        self.last_hash = Some(current_hash);

        if changed {
            Ok(vec![Detection::full_frame(width, height)])
        } else {
            Ok(vec![])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_on_scene_change() {
        let mut backend = StubBackend::new();

        let r1 = backend.detect(b"scene-a", 10, 10).unwrap();
        assert!(r1.is_empty());

        let r2 = backend.detect(b"scene-b", 10, 10).unwrap();
        assert_eq!(r2, vec![Detection::full_frame(10, 10)]);

        let r3 = backend.detect(b"scene-b", 10, 10).unwrap();
        assert!(r3.is_empty());
    }

    #[test]
    fn stub_supports_both_modes() {
        let backend = StubBackend::new();
        assert!(backend.supports(DetectMode::People));
        assert!(backend.supports(DetectMode::Faces));
    }
}
