mod common;

use doser_core::calibration::{
    bg_drop_top_edge, build_background, calibrate, remove_bg_drop, top_border, BackgroundConfig,
    BackgroundImage, CalibrationConfig, CropBox,
};
use doser_core::error::DoserError;
use doser_core::frame::{rescale_sample, Frame};
use ndarray::Array2;

use common::{background_frame, BRIGHT, DARK, FRAME_HEIGHT, NOZZLE_DIAMETER};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[test]
fn test_calibrate_synthetic_nozzle() {
    let frame = Frame::new(background_frame(), 16);
    let cal = calibrate(&frame, &CalibrationConfig::default()).unwrap();

    assert_eq!(cal.nozzle_diameter, NOZZLE_DIAMETER);
    // margin = round(40 * 0.02) = 1, offset = round(40 * 0.15) = 6,
    // height = round(40 * 2.0) = 80
    assert_eq!(
        cal.crop,
        CropBox {
            left: 9,
            top: 7,
            right: 50,
            bottom: 86,
        }
    );
    assert_eq!(cal.crop.width(), 41);
    assert_eq!(cal.crop.height(), 79);
}

#[test]
fn test_calibrate_clamps_to_frame() {
    let frame = Frame::new(background_frame(), 16);
    let config = CalibrationConfig {
        crop_height_coefficient: 10.0,
        crop_width_coefficient: 1.0,
        ..CalibrationConfig::default()
    };
    let cal = calibrate(&frame, &config).unwrap();
    assert_eq!(cal.crop.left, 0);
    assert_eq!(cal.crop.right, 60);
    assert_eq!(cal.crop.bottom, FRAME_HEIGHT);
}

#[test]
fn test_calibrate_row_without_foreground() {
    let frame = Frame::new(Array2::from_elem((20, 20), BRIGHT), 16);
    let err = calibrate(&frame, &CalibrationConfig::default()).unwrap_err();
    assert!(matches!(err, DoserError::NoForegroundOnRow { row: 1 }));
}

#[test]
fn test_calibrate_row_outside_frame() {
    let frame = Frame::new(background_frame(), 16);
    let config = CalibrationConfig {
        nozzle_row: 500,
        ..CalibrationConfig::default()
    };
    assert!(matches!(
        calibrate(&frame, &config),
        Err(DoserError::InvalidCrop(_))
    ));
}

#[test]
fn test_crop_box_validation() {
    let empty = CropBox {
        left: 5,
        top: 0,
        right: 5,
        bottom: 3,
    };
    assert!(empty.validated(10, 10).is_err());

    let too_wide = CropBox {
        left: 0,
        top: 0,
        right: 11,
        bottom: 3,
    };
    assert!(too_wide.validated(10, 10).is_err());

    let data = Array2::from_shape_fn((4, 5), |(r, c)| (r * 5 + c) as u16);
    let crop = CropBox {
        left: 1,
        top: 2,
        right: 3,
        bottom: 4,
    };
    let cropped = crop.apply(&data).unwrap();
    assert_eq!(cropped.dim(), (2, 2));
    assert_eq!(cropped[[0, 0]], 11);
    assert_eq!(cropped[[1, 1]], 17);
}

// ---------------------------------------------------------------------------
// Background model
// ---------------------------------------------------------------------------

#[test]
fn test_background_is_per_pixel_median() {
    let crop = CropBox {
        left: 0,
        top: 0,
        right: 2,
        bottom: 2,
    };
    let frames: Vec<Frame> = [100u16, 4000, 300]
        .iter()
        .map(|&v| Frame::new(Array2::from_elem((2, 2), v), 12))
        .collect();
    let bg = build_background(&frames, &crop, 12, &BackgroundConfig::default()).unwrap();
    let expected = rescale_sample(300.0, 12);
    assert!(bg.data.iter().all(|&v| v == expected));
}

#[test]
fn test_background_even_count_averages_middle_pair() {
    let crop = CropBox {
        left: 0,
        top: 0,
        right: 1,
        bottom: 1,
    };
    let frames: Vec<Frame> = [10u16, 20, 30, 40]
        .iter()
        .map(|&v| Frame::new(Array2::from_elem((1, 1), v), 12))
        .collect();
    let bg = build_background(&frames, &crop, 12, &BackgroundConfig::default()).unwrap();
    assert_eq!(bg.data[[0, 0]], rescale_sample(25.0, 12));
}

#[test]
fn test_background_crops_frames() {
    let frames = vec![Frame::new(background_frame(), 12); 3];
    let crop = CropBox {
        left: 9,
        top: 7,
        right: 50,
        bottom: 86,
    };
    let bg = build_background(&frames, &crop, 12, &BackgroundConfig::default()).unwrap();
    assert_eq!((bg.height(), bg.width()), (79, 41));
    // Nozzle rows 7..10 of the frame are the first three crop rows.
    assert_eq!(bg.data[[0, 1]], rescale_sample(DARK as f64, 12));
    assert_eq!(bg.data[[3, 1]], rescale_sample(BRIGHT as f64, 12));
    assert_eq!(top_border(&bg), 3);
}

#[test]
fn test_background_needs_frames() {
    let crop = CropBox {
        left: 0,
        top: 0,
        right: 1,
        bottom: 1,
    };
    assert!(matches!(
        build_background(&[], &crop, 12, &BackgroundConfig::default()),
        Err(DoserError::EmptySequence)
    ));
}

#[test]
fn test_drop_removal_masks_resting_drop() {
    let mut data = Array2::from_elem((10, 3), 60_000u16);
    for row in 6..10 {
        for col in 0..3 {
            data[[row, col]] = 10_000;
        }
    }
    let mut bg = BackgroundImage::new(data);
    assert_eq!(bg_drop_top_edge(&bg), vec![5, 5, 5]);

    remove_bg_drop(&mut bg);
    assert!(bg.data.iter().all(|&v| v == 60_000));
}

#[test]
fn test_drop_removal_through_build() {
    let mut data = Array2::from_elem((10, 3), 3000u16);
    for row in 6..10 {
        for col in 0..3 {
            data[[row, col]] = 500;
        }
    }
    let frames = vec![Frame::new(data, 12)];
    let crop = CropBox {
        left: 0,
        top: 0,
        right: 3,
        bottom: 10,
    };
    let config = BackgroundConfig { drop_removal: true };
    let bg = build_background(&frames, &crop, 12, &config).unwrap();
    let bright = rescale_sample(3000.0, 12);
    assert!(bg.data.iter().all(|&v| v == bright));
}

#[test]
fn test_drop_removal_leaves_edgeless_columns() {
    // A bright strip in columns 0..3: only columns 2 and 3 see an edge.
    let mut data = Array2::from_elem((12, 12), 50_000u16);
    for row in 0..12 {
        for col in 0..3 {
            data[[row, col]] = 60_000;
        }
    }
    let mut bg = BackgroundImage::new(data.clone());
    let cutoffs = bg_drop_top_edge(&bg);
    assert_eq!(cutoffs, vec![12, 12, 0, 0, 12, 12, 12, 12, 12, 12, 12, 12]);

    remove_bg_drop(&mut bg);
    for col in (0..12).filter(|&c| c != 2 && c != 3) {
        assert_eq!(bg.data.column(col), data.column(col), "column {col}");
    }
    assert!(bg.data.column(3).iter().all(|&v| v == 60_000));
    assert_eq!(bg.data[[11, 10]], 50_000);
}
