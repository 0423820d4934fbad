//! # quick-face
//!
//! Pure Rust runtime for pico-style attentional-cascade object detection.
//!
//! This crate provides:
//! - **Model loading**: the compact little-endian binary format for
//!   pretrained decision-tree cascades
//! - **Patch scoring**: normalized pixel-pair feature tests, depth-first
//!   tree descent, and early-rejecting cascade evaluation
//! - **Multi-scale search**: an exhaustive sliding-window sweep over a
//!   grayscale buffer, emitting raw detections under a cap
//!
//! There is no training, no detection merging, and no parallel scoring:
//! one frame is a single synchronous pass over an in-memory buffer. The
//! model and the pixel buffer are both read-only during a call, so one
//! model can serve concurrent detections from independent threads.
//!
//! ## Algorithm Overview
//!
//! 1. Grow a geometric scale pyramid from `min_height` up to the image size
//! 2. At each scale, slide a `wh_ratio`-shaped window in 10% steps
//! 3. For each window, evaluate the tree cascade:
//!    - each tree compares pixel pairs at patch-normalized positions and
//!      descends to a leaf confidence
//!    - confidences accumulate; dropping below a stage threshold rejects
//!      the window immediately
//! 4. Windows that pass every stage with positive confidence become
//!    detections, in deterministic scale/row/column order
//!
//! ## Quick Start
//!
//! ```rust
//! use quick_face::{CascadeModel, Detector, GrayImage};
//!
//! // Load a trained cascade
//! // let model = CascadeModel::load("cascade.bin").unwrap();
//!
//! // Or build a toy model for development: one depth-1 tree whose single
//! // feature test compares a pixel to itself, accepting every patch.
//! let model = CascadeModel::new(
//!     1.0,                          // patch width/height ratio
//!     1,                            // tree depth
//!     1,                            // tree count
//!     vec![0, 0, 0, 0, 0, 0, 0, 0], // one node + padding
//!     vec![0.0, 1.0],               // leaf confidences
//!     vec![-10.0],                  // stage threshold
//! )
//! .unwrap();
//!
//! let image = GrayImage::from_fn(320, 240, |x, y| ((x + y) % 256) as u8);
//!
//! let detector = Detector::new(model);
//! let detections = detector.detect(&image.view()).unwrap();
//! for det in &detections {
//!     println!("{}x{} at ({}, {}): {:.2}", det.w, det.h, det.x, det.y, det.conf);
//! }
//! ```
//!
//! ## Bring Your Own Buffer
//!
//! Detection reads any single-channel 8-bit buffer through [`ImageView`],
//! which carries an explicit row stride so padded rows work unchanged:
//!
//! ```rust
//! use quick_face::ImageView;
//!
//! let pixels = vec![0u8; 256 * 240];
//! let view = ImageView::new(&pixels, 250, 240, 256).unwrap();
//! ```
//!
//! [`luma_from_rgba`] converts a 4-channel buffer with the reference
//! integer weighting `(2R + 5G + B) / 8`.

mod detector;
mod error;
mod features;
mod model;
mod tree;
mod types;

pub use detector::{DetectParams, Detector};
pub use error::{Error, Result};
pub use features::{luma_from_rgba, GrayImage, ImageView};
pub use model::CascadeModel;
pub use tree::{score_patch, PatchScore};
pub use types::{Detection, Patch};
