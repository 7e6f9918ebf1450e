//! Integration tests for the complete scan pipeline
//!
//! These tests drive the public API end to end with synthetic images encoded
//! in memory:
//! - Coverage percentages and ordering of detected colors
//! - Background removal and its low-foreground fallback
//! - Paint ranking and per-brand limits
//! - Error taxonomy for bad input and bad reference data
//! - Background sessions and cancellation

use image::{ImageFormat, Rgba, RgbaImage};
use paint_scan::color::conversion::array_to_lab;
use paint_scan::color::ColorConverter;
use paint_scan::paints::PaintEntry;
use paint_scan::{
    CancelToken, OfflineEngine, PaintDatabase, PaintType, ScanConfig, ScanError, ScanMode, ScanProvider,
    ScanRequest, ScanResult, ScanSession,
};
use std::io::Cursor;
use std::sync::Arc;

// ============================================================================
// Fixtures
// ============================================================================

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const RED: Rgba<u8> = Rgba([200, 20, 30, 255]);

fn encode(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encoding");
    bytes
}

/// 120x80 white frame with a 40x30 red block in the middle
fn blob_on_white() -> Vec<u8> {
    encode(&RgbaImage::from_fn(120, 80, |x, y| {
        if (40..80).contains(&x) && (25..55).contains(&y) {
            RED
        } else {
            WHITE
        }
    }))
}

/// Smooth two-axis gradient, larger than the analysis grid
fn gradient() -> Vec<u8> {
    encode(&RgbaImage::from_fn(300, 200, |x, y| {
        let r = (x * 255 / 299) as u8;
        let g = (y * 255 / 199) as u8;
        Rgba([r, g, 255 - r / 2, 255])
    }))
}

fn solid(color: [u8; 3]) -> Vec<u8> {
    encode(&RgbaImage::from_pixel(32, 32, Rgba([color[0], color[1], color[2], 255])))
}

fn scan(image: Vec<u8>, config: ScanConfig) -> paint_scan::Result<ScanResult> {
    OfflineEngine::default().scan(&ScanRequest::new(image, "fixture.png").with_config(config), &CancelToken::new())
}

fn inspiration() -> ScanConfig {
    ScanConfig::for_mode(ScanMode::Inspiration)
}

// ============================================================================
// Detected Colors
// ============================================================================

#[test]
fn test_percentages_sum_to_hundred() {
    let result = scan(gradient(), inspiration().with_num_colors(8)).unwrap();

    assert!(!result.detected_colors.is_empty());
    assert!(result.detected_colors.len() <= 8);
    let sum: f32 = result.detected_colors.iter().map(|c| c.percentage).sum();
    assert!((sum - 100.0).abs() <= 0.5, "sum = {}", sum);
    assert!(result.detected_colors.iter().all(|c| c.percentage > 0.0));
}

#[test]
fn test_colors_sorted_and_distinct() {
    let result = scan(gradient(), inspiration().with_num_colors(12)).unwrap();
    let converter = ColorConverter::new();
    let merge_threshold = inspiration().quantizer.merge_threshold;

    for pair in result.detected_colors.windows(2) {
        assert!(pair[0].percentage >= pair[1].percentage);
    }
    for (i, a) in result.detected_colors.iter().enumerate() {
        for b in &result.detected_colors[i + 1..] {
            let distance = converter.delta_e(array_to_lab(a.lab), array_to_lab(b.lab));
            assert!(distance >= merge_threshold, "{} vs {}: {}", a.hex, b.hex, distance);
        }
    }
}

#[test]
fn test_detected_colors_are_deterministic() {
    let first = scan(gradient(), inspiration()).unwrap();
    let second = scan(gradient(), inspiration()).unwrap();

    assert_eq!(first.detected_colors, second.detected_colors);
    assert_ne!(first.id, second.id);
}

#[test]
fn test_single_color_request() {
    let result = scan(gradient(), inspiration().with_num_colors(1)).unwrap();

    assert_eq!(result.detected_colors.len(), 1);
    assert_eq!(result.detected_colors[0].percentage, 100.0);
    assert_eq!(result.metadata.color_count, 1);
}

#[test]
fn test_solid_image_yields_one_color() {
    let result = scan(solid([40, 120, 60]), inspiration()).unwrap();

    assert_eq!(result.detected_colors.len(), 1);
    let color = &result.detected_colors[0];
    assert_eq!(color.percentage, 100.0);
    for (got, want) in color.rgb.iter().zip([40u8, 120, 60]) {
        assert!((*got as i16 - want as i16).abs() <= 1);
    }
    assert!(!color.family.is_empty());
}

// ============================================================================
// Background Removal
// ============================================================================

#[test]
fn test_miniature_mode_removes_white_border() {
    let result = scan(blob_on_white(), ScanConfig::for_mode(ScanMode::Miniature)).unwrap();

    assert!(result.metadata.background_removed);
    assert!(!result.metadata.low_foreground);
    assert_eq!(result.detected_colors.len(), 1);
    let color = &result.detected_colors[0];
    assert_eq!(color.percentage, 100.0);
    for (got, want) in color.rgb.iter().zip([200u8, 20, 30]) {
        assert!((*got as i16 - want as i16).abs() <= 1);
    }
}

#[test]
fn test_inspiration_mode_keeps_background() {
    let result = scan(blob_on_white(), inspiration()).unwrap();

    assert!(!result.metadata.background_removed);
    assert_eq!(result.detected_colors.len(), 2);
    assert_eq!(result.detected_colors[0].percentage, 87.5);
    assert_eq!(result.detected_colors[1].percentage, 12.5);
}

#[test]
fn test_uniform_image_falls_back_to_full_frame() {
    let result = scan(solid([90, 110, 70]), ScanConfig::for_mode(ScanMode::Miniature)).unwrap();

    assert!(result.metadata.low_foreground);
    assert!(!result.metadata.background_removed);
    assert_eq!(result.detected_colors.len(), 1);
    assert_eq!(result.detected_colors[0].percentage, 100.0);
}

#[test]
fn test_zero_minimum_foreground_still_detects_colors() {
    let mut config = ScanConfig::for_mode(ScanMode::Miniature);
    config.foreground.min_foreground_fraction = 0.0;
    assert!(config.validate().is_ok());

    let result = scan(solid([90, 110, 70]), config).unwrap();

    assert!(result.metadata.low_foreground);
    assert_eq!(result.detected_colors.len(), 1);
    assert_eq!(result.detected_colors[0].percentage, 100.0);
}

// ============================================================================
// Paint Matching
// ============================================================================

fn red_database() -> Arc<PaintDatabase> {
    Arc::new(
        PaintDatabase::from_entries(vec![
            PaintEntry::new("Duo", "Almost Red", PaintType::Layer, "#FE0101"),
            PaintEntry::new("Duo", "Exact Red", PaintType::Base, "#FF0000"),
            PaintEntry::new("Trio", "Green", PaintType::Base, "#00FF00"),
            PaintEntry::new("Trio", "Blue", PaintType::Base, "#0000FF"),
            PaintEntry::new("Trio", "Black", PaintType::Base, "#000000"),
        ])
        .unwrap(),
    )
}

#[test]
fn test_exact_paint_ranks_first() {
    let request = ScanRequest::new(solid([255, 0, 0]), "red.png").with_config(inspiration());
    let result = OfflineEngine::new(red_database()).scan(&request, &CancelToken::new()).unwrap();

    let duo = &result.recommended_paints[0].brands["Duo"];
    assert_eq!(duo[0].paint.name, "Exact Red");
    assert_eq!(duo[0].distance, 0.0);
    assert_eq!(duo[1].paint.name, "Almost Red");
    assert!(duo[1].distance > 0.0);
}

#[test]
fn test_match_count_bounded_by_brand_size() {
    let config = inspiration().with_num_paint_matches(3);
    let request = ScanRequest::new(solid([255, 0, 0]), "red.png").with_config(config);
    let result = OfflineEngine::new(red_database()).scan(&request, &CancelToken::new()).unwrap();

    let brands = &result.recommended_paints[0].brands;
    assert_eq!(brands["Duo"].len(), 2);
    assert_eq!(brands["Trio"].len(), 3);
    assert_eq!(result.metadata.paint_count, 5);
}

#[test]
fn test_builtin_brands_all_matched() {
    let result = scan(blob_on_white(), inspiration().with_num_paint_matches(4)).unwrap();

    assert_eq!(result.recommended_paints.len(), result.detected_colors.len());
    for (color, matches) in result.detected_colors.iter().zip(&result.recommended_paints) {
        assert_eq!(matches.color_hex, color.hex);
        let brands: Vec<&str> = matches.brands.keys().map(String::as_str).collect();
        assert_eq!(brands, vec!["Army Painter", "Citadel", "Vallejo"]);
        for paints in matches.brands.values() {
            assert_eq!(paints.len(), 4);
            for pair in paints.windows(2) {
                assert!(pair[0].distance <= pair[1].distance);
            }
        }
    }
}

#[test]
fn test_recipes_attached_on_request() {
    let result = scan(blob_on_white(), inspiration().with_recipes(true)).unwrap();

    for color in &result.detected_colors {
        let recipe = color.paint_recipe.as_ref().expect("recipe");
        assert_eq!(recipe.len(), 3);
        assert!(recipe.values().all(|r| r.base.is_some() && r.wash.is_some()));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[test]
fn test_empty_bytes_fail_to_decode() {
    let err = scan(Vec::new(), inspiration()).unwrap_err();
    assert!(matches!(err, ScanError::Decode { .. }));
    assert!(err.is_user_visible());
}

#[test]
fn test_fully_transparent_image_fails_to_decode() {
    let transparent = encode(&RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 0])));
    assert!(matches!(scan(transparent, inspiration()), Err(ScanError::Decode { .. })));
}

#[test]
fn test_empty_database_distinct_from_decode_error() {
    let engine = OfflineEngine::new(Arc::new(PaintDatabase::default()));
    let request = ScanRequest::new(solid([10, 10, 10]), "dark.png");
    let err = engine.scan(&request, &CancelToken::new()).unwrap_err();

    assert!(matches!(err, ScanError::EmptyDatabase));
    assert!(!err.is_recoverable());
}

#[test]
fn test_out_of_range_color_count() {
    for n in [0, 13] {
        let err = scan(solid([10, 10, 10]), inspiration().with_num_colors(n)).unwrap_err();
        assert!(matches!(err, ScanError::InvalidParameter { .. }));
    }
}

// ============================================================================
// JSON Contract
// ============================================================================

#[test]
fn test_result_json_shape() {
    let request = ScanRequest::new(blob_on_white(), "file:///photos/mini.jpg").with_config(ScanConfig::default());
    let result = OfflineEngine::default().scan(&request, &CancelToken::new()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

    for key in ["id", "mode", "timestamp", "sourceImage", "detectedColors", "recommendedPaints", "metadata"] {
        assert!(value.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(value["mode"], "miniature");
    assert_eq!(value["sourceImage"], "file:///photos/mini.jpg");
    let color = &value["detectedColors"][0];
    for key in ["hex", "rgb", "lab", "percentage", "family"] {
        assert!(color.get(key).is_some(), "missing {}", key);
    }
    assert!(value["metadata"]["backgroundRemoved"].as_bool().unwrap());
}

// ============================================================================
// Background Sessions
// ============================================================================

#[tokio::test]
async fn test_session_run_completes() {
    let session = ScanSession::<OfflineEngine>::default();
    let result = session
        .run(ScanRequest::new(blob_on_white(), "async.png").with_config(inspiration()))
        .await
        .unwrap();
    assert_eq!(result.detected_colors.len(), 2);
}

#[tokio::test]
async fn test_session_supersedes_previous_scan() {
    let session = ScanSession::<OfflineEngine>::default();
    let stale = session.submit(ScanRequest::new(gradient(), "stale.png").with_config(inspiration()));
    let fresh = session.submit(ScanRequest::new(blob_on_white(), "fresh.png").with_config(inspiration()));

    // The stale scan either finished before being superseded or was cancelled
    match stale.await.unwrap() {
        Ok(_) | Err(ScanError::Cancelled) => {}
        Err(other) => panic!("unexpected error: {:?}", other),
    }
    let fresh = fresh.await.unwrap().unwrap();
    assert_eq!(fresh.source_image, "fresh.png");
}
