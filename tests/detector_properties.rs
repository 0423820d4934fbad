//! Integration properties of the detector over synthetic cascades.

use quick_face::{
    score_patch, CascadeModel, DetectParams, Detector, GrayImage, ImageView, Patch, PatchScore,
};

/// Depth-1 single-tree cascade built through the wire format, so every test
/// also exercises serialization and parsing.
fn depth1_cascade(nodes: [i8; 4], leaves: [f32; 2], threshold: f32) -> CascadeModel {
    let mut bin_tests = nodes.to_vec();
    bin_tests.extend_from_slice(&[0, 0, 0, 0]);
    let model = CascadeModel::new(1.0, 1, 1, bin_tests, leaves.to_vec(), vec![threshold]).unwrap();

    CascadeModel::from_bytes(&model.to_bytes()).unwrap()
}

/// Gradient test image: pixel[x, y] = (x + y) % 256.
fn gradient_image(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| ((x + y) % 256) as u8)
}

#[test]
fn serialized_and_parsed_model_detects_identically() {
    let model = depth1_cascade([0, -64, 0, 64], [-0.5, 2.0], -1.0);
    let reparsed = CascadeModel::from_bytes(&model.to_bytes()).unwrap();

    let image = gradient_image(140, 120);
    let a = Detector::new(model).detect(&image.view()).unwrap();
    let b = Detector::new(reparsed).detect(&image.view()).unwrap();

    assert_eq!(a, b);
}

#[test]
fn repeated_detection_is_deterministic() {
    let model = depth1_cascade([0, 0, 0, 0], [0.0, 1.0], -10.0);
    let detector = Detector::new(model);
    let image = gradient_image(160, 130);

    let first = detector.detect(&image.view()).unwrap();
    let second = detector.detect(&image.view()).unwrap();
    let third = detector.detect(&image.view()).unwrap();

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[test]
fn always_true_scenario_counts_every_visited_position() {
    // Self-comparison node: the tree always takes the true branch, so the
    // confidence is leaf 1 everywhere and every searched position fires.
    let model = depth1_cascade([0, 0, 0, 0], [-9.0, 0.75], 0.5);
    let detector = Detector::new(model);
    let image = gradient_image(110, 95);

    let detections = detector.detect(&image.view()).unwrap();

    // Rebuild the visit count from the documented loop arithmetic.
    let (width, height) = (110i32, 95i32);
    let mut expected = 0usize;
    let mut scale = 50.0f32;
    while scale <= width.min(height) as f32 {
        let patch_h = scale as i32;
        let patch_w = scale as i32; // wh_ratio is 1.0
        let v_step = (0.1 * patch_h as f32).max(1.0) as i32;
        let h_step = (0.1 * patch_w as f32).max(1.0) as i32;
        let max_row = height - patch_h - 1;
        let max_col = width - patch_w - 1;
        if max_row >= 0 && max_col >= 0 {
            expected += ((max_row / v_step + 1) * (max_col / h_step + 1)) as usize;
        }
        scale *= 1.2;
    }

    assert!(expected > 0);
    assert_eq!(detections.len(), expected);
    assert!(detections.iter().all(|d| (d.conf - 0.75).abs() < 1e-6));
}

#[test]
fn zero_buffer_with_positive_threshold_yields_nothing() {
    let model = depth1_cascade([0, 0, 0, 0], [0.0, 0.0], 0.25);
    let detector = Detector::new(model);
    let image = GrayImage::from_fn(200, 150, |_, _| 0);

    assert!(detector.detect(&image.view()).unwrap().is_empty());
}

#[test]
fn rejected_patches_are_never_emitted() {
    // Left-vs-right luminance test over an image split into a bright left
    // half and dark right half: windows straddling the split reject.
    let model = depth1_cascade([0, -128, 0, 127], [-1.0, 1.0], 0.0);
    let image = GrayImage::from_fn(150, 100, |x, _| if x < 75 { 200 } else { 20 });
    let view = image.view();

    let detector = Detector::new(model);
    let detections = detector.detect(&view).unwrap();
    assert!(!detections.is_empty());

    for det in &detections {
        let patch = Patch::new(det.x, det.y, det.w, det.h);
        match score_patch(detector.model(), &view, patch) {
            PatchScore::Accepted(conf) => {
                assert!(conf > 0.0);
                assert!((conf - det.conf).abs() < 1e-6);
            }
            PatchScore::Rejected => panic!("emitted detection re-scores as rejected: {det:?}"),
        }
    }

    // And the straddling windows really exist and really reject.
    let straddling = Patch::new(40, 0, 70, 70);
    assert_eq!(score_patch(detector.model(), &view, straddling), PatchScore::Rejected);
    assert!(!detections.iter().any(|d| d.x == 40 && d.y == 0 && d.w == 70));
}

#[test]
fn cap_is_enforced_within_the_documented_off_by_one() {
    let params = DetectParams {
        min_height: 8.0,
        max_detections: 64,
        ..DetectParams::default()
    };
    let model = depth1_cascade([0, 0, 0, 0], [0.0, 1.0], -10.0);
    let detector = Detector::with_params(model, params);
    let image = gradient_image(128, 128);

    let detections = detector.detect(&image.view()).unwrap();
    assert!(detections.len() <= params.max_detections + 1);
    assert_eq!(detections.len(), params.max_detections + 1);
}

#[test]
fn padded_rows_detect_the_same_as_compact_rows() {
    let (width, height, stride) = (96u32, 80u32, 112u32);

    // Same pixels twice: once compact, once behind a padded stride with
    // sentinel bytes in the padding that must never be read.
    let compact = GrayImage::from_fn(width, height, |x, y| ((7 * x + 3 * y) % 256) as u8);
    let mut padded = vec![0xABu8; (stride * height) as usize];
    for y in 0..height {
        for x in 0..width {
            padded[(y * stride + x) as usize] = compact.as_raw()[(y * width + x) as usize];
        }
    }
    let padded_view = ImageView::new(&padded, width, height, stride).unwrap();

    let model = depth1_cascade([0, -100, 0, 100], [-0.5, 1.5], -2.0);
    let detector = Detector::new(model);

    let a = detector.detect(&compact.view()).unwrap();
    let b = detector.detect(&padded_view).unwrap();
    assert_eq!(a, b);
}

#[test]
fn detections_scale_with_min_height() {
    // Lowering min_height adds smaller scales in front; the coarse scales
    // and their ordering are unchanged.
    let model = depth1_cascade([0, 0, 0, 0], [0.0, 1.0], -10.0);
    let image = gradient_image(100, 100);

    let coarse = Detector::with_params(
        depth1_cascade([0, 0, 0, 0], [0.0, 1.0], -10.0),
        DetectParams {
            min_height: 60.0,
            ..DetectParams::default()
        },
    )
    .detect(&image.view())
    .unwrap();

    let fine = Detector::with_params(
        model,
        DetectParams {
            min_height: 50.0,
            max_detections: 100_000,
            ..DetectParams::default()
        },
    )
    .detect(&image.view())
    .unwrap();

    assert!(fine.len() > coarse.len());
    for det in &coarse {
        assert!(fine.contains(det));
    }
}
