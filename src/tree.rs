//! Tree descent and early-rejecting cascade scoring.
//!
//! Every tree has a fixed depth, so descent is a loop rather than a node
//! walk: the child of node `n` is `2n + 1` or `2n + 2`, and after
//! `tree_depth` comparisons the index lands in the leaf range. The same
//! per-tree offset addresses both the node and leaf arrays thanks to the
//! padding entry in the node block.

use crate::features::{sample_offset, ImageView};
use crate::model::CascadeModel;
use crate::types::Patch;

/// Outcome of scoring one patch against the full cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatchScore {
    /// Every stage threshold was met. The confidence may still be
    /// non-positive; the sliding-window search applies the strict
    /// `conf > 0` test before emitting a detection.
    Accepted(f32),
    /// Cumulative confidence fell below a stage threshold.
    Rejected,
}

/// Descend one tree for one patch and return its leaf confidence.
///
/// `tree_offset` is the tree's index times `2^tree_depth`, valid for both
/// the node and leaf arrays. The patch must lie fully inside the image.
pub(crate) fn eval_tree(
    model: &CascadeModel,
    tree_offset: usize,
    image: &ImageView<'_>,
    patch: Patch,
) -> f32 {
    let bin_tests = model.bin_tests();
    let mut node = 0usize;

    for _ in 0..model.tree_depth() {
        let base = (tree_offset + node) * 4;
        let test = &bin_tests[base..base + 4];

        let row_a = patch.y + sample_offset(test[0], patch.h);
        let col_a = patch.x + sample_offset(test[1], patch.w);
        let row_b = patch.y + sample_offset(test[2], patch.h);
        let col_b = patch.x + sample_offset(test[3], patch.w);

        node = if image.at(row_a, col_a) <= image.at(row_b, col_b) {
            node * 2 + 2
        } else {
            node * 2 + 1
        };
    }

    let leaf = node - (model.leaf_stride() - 1);
    model.leafs()[tree_offset + leaf]
}

/// Score one patch against every tree, rejecting as soon as the cumulative
/// confidence drops below a stage threshold. Most non-object patches fall
/// out within the first few trees, which is what makes the exhaustive
/// window sweep affordable.
pub fn score_patch(model: &CascadeModel, image: &ImageView<'_>, patch: Patch) -> PatchScore {
    let stride = model.leaf_stride();
    let mut confidence = 0.0f32;

    for (tree, &threshold) in model.thresholds().iter().enumerate() {
        confidence += eval_tree(model, tree * stride, image, patch);
        if confidence < threshold {
            return PatchScore::Rejected;
        }
    }

    PatchScore::Accepted(confidence)
}
