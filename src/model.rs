//! Cascade model storage and its binary wire format.
//!
//! A model is a forest of fixed-depth binary decision trees stored flat:
//! per-node feature tests as signed bytes, per-leaf confidences, and one
//! rejection threshold per tree. Each tree's node block is padded by four
//! zero bytes so node and leaf arrays share the same per-tree stride of
//! `2^depth` entries, letting one offset index both.
//!
//! All multi-byte fields are little-endian. The format carries no magic
//! number or checksum; parsing validates lengths and declared dimensions
//! only.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};

// Deeper trees would need gigabyte node blocks per tree; treat them as a
// corrupt header rather than attempting the allocation.
const MAX_TREE_DEPTH: i32 = 24;

/// An immutable pretrained attentional-cascade classifier.
///
/// Owns the flat tree-forest data for the lifetime of the detector. The
/// stored layout mirrors the wire format, so serialization is a direct
/// write-out and scoring indexes the arrays without any pointer chasing.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeModel {
    /// Reserved by the format; parsed and re-emitted, never read by scoring.
    row_scale: f32,
    /// Width/height ratio of every searched patch.
    wh_ratio: f32,
    tree_depth: u32,
    tree_count: u32,
    /// 4 signed bytes per node `(dy_a, dx_a, dy_b, dx_b)`, 4 padding entries
    /// per tree. Length `tree_count * 2^tree_depth * 4`.
    bin_tests: Vec<i8>,
    /// Leaf confidences, `2^tree_depth` per tree.
    leafs: Vec<f32>,
    /// Early-rejection threshold per tree.
    thresholds: Vec<f32>,
}

/// Little-endian cursor over the raw model bytes.
struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::Truncated {
                offset: self.offset,
                needed: n - self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    fn read_f32(&mut self) -> Result<f32> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl CascadeModel {
    /// Build a model from already-decoded parts, validating the flat-array
    /// invariants. `row_scale` is fixed at 1.0; it is not consumed by
    /// scoring.
    pub fn new(
        wh_ratio: f32,
        tree_depth: u32,
        tree_count: u32,
        bin_tests: Vec<i8>,
        leafs: Vec<f32>,
        thresholds: Vec<f32>,
    ) -> Result<Self> {
        if tree_depth == 0 || tree_depth > MAX_TREE_DEPTH as u32 {
            return Err(Error::InvalidModel(format!(
                "tree depth {tree_depth} out of range 1..={MAX_TREE_DEPTH}"
            )));
        }
        if tree_count == 0 {
            return Err(Error::InvalidModel("tree count must be positive".into()));
        }
        if !(wh_ratio > 0.0) {
            return Err(Error::InvalidModel(format!(
                "width/height ratio must be positive, got {wh_ratio}"
            )));
        }

        let stride = 1usize << tree_depth;
        let count = tree_count as usize;
        if bin_tests.len() != count * stride * 4 {
            return Err(Error::InvalidModel(format!(
                "expected {} feature-test bytes, got {}",
                count * stride * 4,
                bin_tests.len()
            )));
        }
        if leafs.len() != count * stride {
            return Err(Error::InvalidModel(format!(
                "expected {} leaf values, got {}",
                count * stride,
                leafs.len()
            )));
        }
        if thresholds.len() != count {
            return Err(Error::InvalidModel(format!(
                "expected {count} thresholds, got {}",
                thresholds.len()
            )));
        }

        Ok(Self {
            row_scale: 1.0,
            wh_ratio,
            tree_depth,
            tree_count,
            bin_tests,
            leafs,
            thresholds,
        })
    }

    /// Parse a model from its binary representation.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut cur = ByteCursor::new(data);

        let row_scale = cur.read_f32()?;
        let wh_ratio = cur.read_f32()?;
        let tree_depth = cur.read_i32()?;
        let tree_count = cur.read_i32()?;

        if tree_depth <= 0 || tree_depth > MAX_TREE_DEPTH {
            return Err(Error::InvalidModel(format!(
                "tree depth {tree_depth} out of range 1..={MAX_TREE_DEPTH}"
            )));
        }
        if tree_count <= 0 {
            return Err(Error::InvalidModel(format!(
                "tree count must be positive, got {tree_count}"
            )));
        }
        if !(wh_ratio > 0.0) {
            return Err(Error::InvalidModel(format!(
                "width/height ratio must be positive, got {wh_ratio}"
            )));
        }

        let stride = 1usize << tree_depth as u32;
        let count = tree_count as usize;

        // Per tree: 2^d * 4 node bytes (last 4 are padding), 2^d leaf
        // floats, one threshold float. Checking the total up front keeps
        // the allocations below honest for hostile headers.
        let needed = count as u64 * (stride as u64 * 8 + 4);
        if (cur.remaining() as u64) < needed {
            return Err(Error::Truncated {
                offset: cur.offset,
                needed: (needed - cur.remaining() as u64) as usize,
            });
        }

        let mut bin_tests = Vec::with_capacity(count * stride * 4);
        let mut leafs = Vec::with_capacity(count * stride);
        let mut thresholds = Vec::with_capacity(count);

        for _ in 0..count {
            // 2^d - 1 real nodes followed by the 4-byte alignment pad.
            let node_block = cur.take(stride * 4)?;
            bin_tests.extend(node_block.iter().map(|&b| b as i8));

            for _ in 0..stride {
                leafs.push(cur.read_f32()?);
            }
            thresholds.push(cur.read_f32()?);
        }

        Ok(Self {
            row_scale,
            wh_ratio,
            tree_depth: tree_depth as u32,
            tree_count: tree_count as u32,
            bin_tests,
            leafs,
            thresholds,
        })
    }

    /// Serialize to the binary wire format. Inverse of [`from_bytes`].
    ///
    /// [`from_bytes`]: CascadeModel::from_bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let stride = self.leaf_stride();
        let mut out = Vec::with_capacity(16 + self.tree_count as usize * (stride * 8 + 4));

        out.extend_from_slice(&self.row_scale.to_le_bytes());
        out.extend_from_slice(&self.wh_ratio.to_le_bytes());
        out.extend_from_slice(&(self.tree_depth as i32).to_le_bytes());
        out.extend_from_slice(&(self.tree_count as i32).to_le_bytes());

        for tree in 0..self.tree_count as usize {
            let nodes = &self.bin_tests[tree * stride * 4..(tree + 1) * stride * 4];
            out.extend(nodes.iter().map(|&b| b as u8));

            for &leaf in &self.leafs[tree * stride..(tree + 1) * stride] {
                out.extend_from_slice(&leaf.to_le_bytes());
            }
            out.extend_from_slice(&self.thresholds[tree].to_le_bytes());
        }

        out
    }

    /// Load a model from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Save the model to a file in the binary wire format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&self.to_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Comparison levels per tree.
    pub fn tree_depth(&self) -> u32 {
        self.tree_depth
    }

    /// Number of trees in the cascade.
    pub fn tree_count(&self) -> u32 {
        self.tree_count
    }

    /// Width/height ratio applied to every searched patch.
    pub fn wh_ratio(&self) -> f32 {
        self.wh_ratio
    }

    /// Node/leaf entries per tree (`2^tree_depth`).
    pub(crate) fn leaf_stride(&self) -> usize {
        1usize << self.tree_depth
    }

    pub(crate) fn bin_tests(&self) -> &[i8] {
        &self.bin_tests
    }

    pub(crate) fn leafs(&self) -> &[f32] {
        &self.leafs
    }

    pub(crate) fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }
}
