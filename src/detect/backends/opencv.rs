//! OpenCV detector backends.
//!
//! Two production detectors behind the `backend-opencv` feature: a trained
//! Haar cascade for faces and the default HOG pedestrian descriptor. Both
//! scan the greyscale plane multi-scale and return pixel rectangles.

use anyhow::{Context, Result};
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::{CascadeClassifier, HOGDescriptor};
use opencv::prelude::*;

use crate::detect::backend::{DetectMode, Detector};
use crate::detect::result::Detection;

const CASCADE_SCALE_FACTOR: f64 = 1.2;
const CASCADE_MIN_NEIGHBORS: i32 = 5;
const CASCADE_MIN_SIZE: i32 = 30;

const HOG_WIN_STRIDE: i32 = 4;
const HOG_PADDING: i32 = 8;
const HOG_SCALE: f64 = 1.05;

fn luma_mat(luma: &[u8], width: u32, height: u32) -> Result<Mat> {
    let mat = Mat::new_rows_cols_with_data(height as i32, width as i32, luma)
        .context("wrap luma plane as mat")?;
    mat.try_clone().context("copy luma mat")
}

fn to_detection(rect: Rect) -> Detection {
    Detection {
        x: rect.x.max(0) as u32,
        y: rect.y.max(0) as u32,
        w: rect.width.max(0) as u32,
        h: rect.height.max(0) as u32,
    }
}

/// Trained face classifier (multi-scale sliding-window cascade scan).
pub struct FaceCascadeBackend {
    classifier: CascadeClassifier,
}

impl FaceCascadeBackend {
    /// Load the cascade model from the externally supplied file path.
    pub fn load(cascade_path: &str) -> Result<Self> {
        let classifier = CascadeClassifier::new(cascade_path)
            .with_context(|| format!("load cascade model {}", cascade_path))?;
        Ok(Self { classifier })
    }
}

impl Detector for FaceCascadeBackend {
    fn name(&self) -> &'static str {
        "face-cascade"
    }

    fn supports(&self, mode: DetectMode) -> bool {
        mode == DetectMode::Faces
    }

    fn detect(&mut self, luma: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        let mat = luma_mat(luma, width, height)?;
        let mut rects = Vector::<Rect>::new();
        self.classifier
            .detect_multi_scale(
                &mat,
                &mut rects,
                CASCADE_SCALE_FACTOR,
                CASCADE_MIN_NEIGHBORS,
                0,
                Size::new(CASCADE_MIN_SIZE, CASCADE_MIN_SIZE),
                Size::default(),
            )
            .context("cascade detect_multi_scale")?;
        Ok(rects.iter().map(to_detection).collect())
    }
}

/// Pedestrian descriptor with the default people detector.
pub struct HogPeopleBackend {
    hog: HOGDescriptor,
}

impl HogPeopleBackend {
    pub fn new() -> Result<Self> {
        let mut hog = HOGDescriptor::default().context("create hog descriptor")?;
        hog.set_svm_detector(&HOGDescriptor::get_default_people_detector()?)
            .context("set default people detector")?;
        Ok(Self { hog })
    }
}

impl Detector for HogPeopleBackend {
    fn name(&self) -> &'static str {
        "hog-people"
    }

    fn supports(&self, mode: DetectMode) -> bool {
        mode == DetectMode::People
    }

    fn detect(&mut self, luma: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        let mat = luma_mat(luma, width, height)?;
        let mut rects = Vector::<Rect>::new();
        let mut weights = Vector::<f64>::new();
        self.hog
            .detect_multi_scale_weights(
                &mat,
                &mut rects,
                &mut weights,
                0.0,
                Size::new(HOG_WIN_STRIDE, HOG_WIN_STRIDE),
                Size::new(HOG_PADDING, HOG_PADDING),
                HOG_SCALE,
                2.0,
                false,
            )
            .context("hog detect_multi_scale")?;
        // Confidence weights are discarded; only the rectangles are reported.
        Ok(rects.iter().map(to_detection).collect())
    }
}
