//! Multi-scale exhaustive sliding-window search.

use crate::error::{Error, Result};
use crate::features::ImageView;
use crate::model::CascadeModel;
use crate::tree::{score_patch, PatchScore};
use crate::types::{Detection, Patch};

/// Fraction of the patch extent used as the window step at each scale.
const SHIFT_FACTOR: f32 = 0.1;

/// Tunable search parameters.
#[derive(Debug, Clone, Copy)]
pub struct DetectParams {
    /// Pyramid growth ratio between consecutive scales.
    pub scale_factor: f32,
    /// Smallest patch height searched, in pixels.
    pub min_height: f32,
    /// Cap on the number of emitted detections. The cap is checked before
    /// each patch is scored, so one detection past the cap can be emitted
    /// before the search halts (at most `max_detections + 1` results).
    pub max_detections: usize,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.2,
            min_height: 50.0,
            max_detections: 256,
        }
    }
}

/// Sliding-window runner for one cascade model.
///
/// Owns the model; holds no per-call state. Detection is a pure function
/// of the model, the pixel buffer, and the parameters, and the output
/// order is deterministic: scale ascending, then row, then column.
pub struct Detector {
    model: CascadeModel,
    params: DetectParams,
}

impl Detector {
    pub fn new(model: CascadeModel) -> Self {
        Self {
            model,
            params: DetectParams::default(),
        }
    }

    pub fn with_params(model: CascadeModel, params: DetectParams) -> Self {
        Self { model, params }
    }

    pub fn model(&self) -> &CascadeModel {
        &self.model
    }

    pub fn params(&self) -> &DetectParams {
        &self.params
    }

    /// Search the buffer at every scale and position and return the raw
    /// detections, unmerged, in scan order.
    ///
    /// An empty vector is a normal "nothing found" result. The call fails
    /// with [`Error::BufferShape`] only when the buffer could never be
    /// searched because both dimensions stay below `min_height`.
    pub fn detect(&self, image: &ImageView<'_>) -> Result<Vec<Detection>> {
        let width = image.width() as i32;
        let height = image.height() as i32;
        let max_size = width.min(height) as f32;

        if max_size < self.params.min_height {
            return Err(Error::BufferShape {
                width: image.width(),
                height: image.height(),
                stride: image.stride(),
                reason: "image smaller than the minimum search height",
            });
        }

        let mut detections = Vec::new();
        let mut scale = self.params.min_height;

        while scale <= max_size {
            let patch_h = scale as i32;
            let patch_w = (scale * self.model.wh_ratio()) as i32;

            let v_step = (SHIFT_FACTOR * patch_h as f32).max(1.0) as i32;
            let h_step = (SHIFT_FACTOR * patch_w as f32).max(1.0) as i32;

            // Inclusive ranges chosen so every patch lies fully inside the
            // buffer; the evaluator relies on this.
            let max_row = height - patch_h - 1;
            let max_col = width - patch_w - 1;

            let mut row = 0;
            while row <= max_row {
                let mut col = 0;
                while col <= max_col {
                    if detections.len() > self.params.max_detections {
                        return Ok(detections);
                    }

                    let patch = Patch::new(col, row, patch_w, patch_h);
                    if let PatchScore::Accepted(conf) = score_patch(&self.model, image, patch) {
                        if conf > 0.0 {
                            detections.push(Detection::new(col, row, patch_w, patch_h, conf));
                        }
                    }

                    col += h_step;
                }
                row += v_step;
            }

            scale *= self.params.scale_factor;
        }

        Ok(detections)
    }
}
