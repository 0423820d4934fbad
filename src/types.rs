use serde::Serialize;

/// A single raw detection: the top-left corner and extent of the matched
/// patch, in pixel coordinates of the searched buffer, plus the accumulated
/// cascade confidence. Emitted confidences are always strictly positive.
///
/// Detections are not merged or de-duplicated; overlapping hits at nearby
/// positions and scales are expected and left to the caller to group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub conf: f32,
}

impl Detection {
    pub const fn new(x: i32, y: i32, w: i32, h: i32, conf: f32) -> Self {
        Self { x, y, w, h, conf }
    }
}

/// A candidate rectangular region being scored at one scale and position.
/// The sliding-window search guarantees every patch it builds lies fully
/// inside the pixel buffer, so the evaluator does no bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Patch {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_serializes_as_flat_record() {
        let det = Detection::new(10, 20, 30, 40, 1.5);
        let json = serde_json::to_value(det).unwrap();
        assert_eq!(json["x"], 10);
        assert_eq!(json["y"], 20);
        assert_eq!(json["w"], 30);
        assert_eq!(json["h"], 40);
        assert!((json["conf"].as_f64().unwrap() - 1.5).abs() < 1e-9);
    }
}
