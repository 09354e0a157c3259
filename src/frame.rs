//! Captured frame buffer.
//!
//! A `Frame` is one RGB24 image from a capture source. The report pipeline
//! mutates it in place when highlighting is enabled, so annotation must
//! happen before the frame is encoded for upload.

use anyhow::{anyhow, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::detect::Detection;

const BYTES_PER_PIXEL: usize = 3;

/// JPEG quality used for uploaded frames.
const JPEG_QUALITY: u8 = 90;

/// One captured image as an owned RGB24 pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Wrap a raw RGB24 buffer. The buffer length must match the dimensions.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(anyhow!(
                "frame buffer is {} bytes, expected {} for {}x{} rgb24",
                data.len(),
                expected,
                width,
                height
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Solid-colour frame. Used by tests and the synthetic capture source.
    pub fn solid(rgb: [u8; 3], width: u32, height: u32) -> Self {
        let pixel_count = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixel_count * BYTES_PER_PIXEL);
        for _ in 0..pixel_count {
            data.extend_from_slice(&rgb);
        }
        Self {
            data,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Greyscale plane for detector input (BT.601 luma weights).
    pub fn to_luma(&self) -> Vec<u8> {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|px| {
                let r = px[0] as u32;
                let g = px[1] as u32;
                let b = px[2] as u32;
                ((77 * r + 150 * g + 29 * b) >> 8) as u8
            })
            .collect()
    }

    /// Draw a hollow rectangle outline in place, clamped to the frame bounds.
    pub fn draw_outline(&mut self, det: &Detection, color: [u8; 3], thickness: u32) {
        let x1 = det.x.min(self.width);
        let y1 = det.y.min(self.height);
        let x2 = det.x.saturating_add(det.w).min(self.width);
        let y2 = det.y.saturating_add(det.h).min(self.height);
        if x1 >= x2 || y1 >= y2 {
            return;
        }

        for t in 0..thickness {
            // Top and bottom edges.
            for x in x1..x2 {
                if y1 + t < y2 {
                    self.put_pixel(x, y1 + t, color);
                }
                if y2 > t + 1 && y2 - t - 1 >= y1 {
                    self.put_pixel(x, y2 - t - 1, color);
                }
            }
            // Left and right edges.
            for y in y1..y2 {
                if x1 + t < x2 {
                    self.put_pixel(x1 + t, y, color);
                }
                if x2 > t + 1 && x2 - t - 1 >= x1 {
                    self.put_pixel(x2 - t - 1, y, color);
                }
            }
        }
    }

    fn put_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&color);
    }

    /// Encode the frame as a JPEG byte buffer.
    pub fn encode_jpeg(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
        encoder
            .encode(&self.data, self.width, self.height, ExtendedColorType::Rgb8)
            .context("encode frame as jpeg")?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_buffer() {
        assert!(Frame::new(vec![0u8; 10], 4, 4).is_err());
        assert!(Frame::new(vec![0u8; 48], 4, 4).is_ok());
    }

    #[test]
    fn outline_touches_only_the_rectangle_border() {
        let mut frame = Frame::solid([0, 0, 0], 16, 16);
        let det = Detection {
            x: 4,
            y: 4,
            w: 8,
            h: 8,
        };
        frame.draw_outline(&det, [0, 255, 0], 1);

        // Border pixel painted, interior untouched.
        let border = (4 * 16 + 4) * BYTES_PER_PIXEL;
        assert_eq!(&frame.as_bytes()[border..border + 3], &[0, 255, 0]);
        let interior = (8 * 16 + 8) * BYTES_PER_PIXEL;
        assert_eq!(&frame.as_bytes()[interior..interior + 3], &[0, 0, 0]);
    }

    #[test]
    fn outline_clamps_to_frame_bounds() {
        let mut frame = Frame::solid([0, 0, 0], 8, 8);
        let det = Detection {
            x: 6,
            y: 6,
            w: 100,
            h: 100,
        };
        // Must not panic on out-of-range coordinates.
        frame.draw_outline(&det, [255, 0, 0], 2);
    }

    #[test]
    fn jpeg_encoding_is_deterministic() {
        let frame = Frame::solid([10, 120, 200], 64, 48);
        let a = frame.encode_jpeg().unwrap();
        let b = frame.encode_jpeg().unwrap();
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn luma_plane_has_one_byte_per_pixel() {
        let frame = Frame::solid([255, 255, 255], 10, 5);
        let luma = frame.to_luma();
        assert_eq!(luma.len(), 50);
        // White stays near-white under the BT.601 weights.
        assert!(luma[0] >= 250);
    }
}
