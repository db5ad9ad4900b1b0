// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Flatpage document pipeline.

use serde::{Deserialize, Serialize};

use crate::error::FlatpageError;

/// A point in continuous image-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Four ordered corners delimiting a document region.
///
/// The order is always `[top_left, top_right, bottom_right, bottom_left]`
/// (clockwise in image coordinates). Nothing downstream reorders corners, so
/// whoever builds a `Quadrilateral` is responsible for the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    corners: [Point; 4],
}

impl Quadrilateral {
    pub const fn new(
        top_left: Point,
        top_right: Point,
        bottom_right: Point,
        bottom_left: Point,
    ) -> Self {
        Self {
            corners: [top_left, top_right, bottom_right, bottom_left],
        }
    }

    /// Build from an already-ordered corner array.
    pub const fn from_corners(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned rectangle `[0, width] x [0, height]`.
    pub const fn rectangle(width: f64, height: f64) -> Self {
        Self::new(
            Point::new(0.0, 0.0),
            Point::new(width, 0.0),
            Point::new(width, height),
            Point::new(0.0, height),
        )
    }

    /// Default crop region: the frame inset by `fraction` of each dimension.
    ///
    /// Used when detection finds nothing plausible.
    pub fn inset(width: u32, height: u32, fraction: f64) -> Self {
        let fraction = fraction.clamp(0.0, 0.49);
        let (w, h) = (width as f64, height as f64);
        let (dx, dy) = (w * fraction, h * fraction);
        Self::new(
            Point::new(dx, dy),
            Point::new(w - dx, dy),
            Point::new(w - dx, h - dy),
            Point::new(dx, h - dy),
        )
    }

    pub fn corners(&self) -> [Point; 4] {
        self.corners
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[3]
    }

    /// Polygon area via the shoelace formula.
    pub fn area(&self) -> f64 {
        let c = &self.corners;
        let mut twice_area = 0.0;
        for i in 0..4 {
            let j = (i + 1) % 4;
            twice_area += c[i].x * c[j].y - c[j].x * c[i].y;
        }
        twice_area.abs() / 2.0
    }

    /// Multiply every coordinate by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        Self::from_corners(
            self.corners
                .map(|p| Point::new(p.x * factor, p.y * factor)),
        )
    }

    /// Clamp every corner into `[0, width] x [0, height]`.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self::from_corners(
            self.corners
                .map(|p| Point::new(p.x.clamp(0.0, w), p.y.clamp(0.0, h))),
        )
    }

    /// True when every turn along the boundary has the same non-zero sign.
    ///
    /// Self-intersecting ("bow-tie") placements and collapsed corners fail.
    pub fn is_convex(&self) -> bool {
        let c = &self.corners;
        let mut sign = 0.0f64;
        for i in 0..4 {
            let a = c[i];
            let b = c[(i + 1) % 4];
            let d = c[(i + 2) % 4];
            let cross = (b.x - a.x) * (d.y - b.y) - (b.y - a.y) * (d.x - b.x);
            if cross.abs() < f64::EPSILON {
                return false;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height), portrait orientation.
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        let (w, h) = self.dimensions_mm();
        w as f64 / h.max(1) as f64
    }

    /// Page height in pixels for a page `width` pixels wide.
    pub fn height_for_width(&self, width: u32) -> u32 {
        ((width as f64 / self.aspect_ratio()).round() as u32).max(1)
    }
}

impl Default for PaperSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Quarter-turn page rotation, applied clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Upright,
    Clockwise90,
    Half,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match self {
            Self::Upright => 0,
            Self::Clockwise90 => 90,
            Self::Half => 180,
            Self::Clockwise270 => 270,
        }
    }

    /// Whether the output canvas swaps width and height.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Self::Clockwise90 | Self::Clockwise270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = FlatpageError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Self::Upright),
            90 => Ok(Self::Clockwise90),
            180 => Ok(Self::Half),
            270 => Ok(Self::Clockwise270),
            other => Err(FlatpageError::InvalidSettings(format!(
                "rotation must be 0, 90, 180 or 270 degrees, got {other}"
            ))),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Tone mode applied by the filter pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Colours untouched apart from brightness/contrast.
    #[default]
    Original,
    Grayscale,
    /// Pure black and white, cut at `ProcessorSettings::threshold`.
    Binary,
    /// Tone curve that whitens paper and deepens ink while keeping hue.
    Enhanced,
}

/// Tunable parameters for page composition and tone filtering.
///
/// An immutable value: every render takes the settings explicitly and keeps
/// nothing between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorSettings {
    /// Binary cut-off, 0..=255.
    pub threshold: u8,
    /// Unsharp strength in percent, 0..=100.
    pub sharpness: u8,
    /// -100..=100.
    pub brightness: i8,
    /// -100..=100.
    pub contrast: i8,
    pub rotation: Rotation,
    /// Page margin in percent, 0..=50.
    pub margin: u8,
    pub mode: FilterMode,
}

impl ProcessorSettings {
    pub const MAX_SHARPNESS: u8 = 100;
    pub const MAX_ADJUSTMENT: i8 = 100;
    pub const MAX_MARGIN: u8 = 50;

    /// Reject values outside their documented ranges.
    pub fn validate(&self) -> Result<(), FlatpageError> {
        if self.sharpness > Self::MAX_SHARPNESS {
            return Err(FlatpageError::InvalidSettings(format!(
                "sharpness must be within 0..=100, got {}",
                self.sharpness
            )));
        }
        for (name, value) in [("brightness", self.brightness), ("contrast", self.contrast)] {
            if !(-Self::MAX_ADJUSTMENT..=Self::MAX_ADJUSTMENT).contains(&value) {
                return Err(FlatpageError::InvalidSettings(format!(
                    "{name} must be within -100..=100, got {value}"
                )));
            }
        }
        if self.margin > Self::MAX_MARGIN {
            return Err(FlatpageError::InvalidSettings(format!(
                "margin must be within 0..=50, got {}",
                self.margin
            )));
        }
        Ok(())
    }

    /// Copy with every field pulled into its valid range.
    pub fn clamped(&self) -> Self {
        Self {
            sharpness: self.sharpness.min(Self::MAX_SHARPNESS),
            brightness: self
                .brightness
                .clamp(-Self::MAX_ADJUSTMENT, Self::MAX_ADJUSTMENT),
            contrast: self
                .contrast
                .clamp(-Self::MAX_ADJUSTMENT, Self::MAX_ADJUSTMENT),
            margin: self.margin.min(Self::MAX_MARGIN),
            ..*self
        }
    }
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            threshold: 128,
            sharpness: 0,
            brightness: 0,
            contrast: 0,
            rotation: Rotation::Upright,
            margin: 0,
            mode: FilterMode::Original,
        }
    }
}

/// Raster container produced by the encode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Quadrilateral {
        Quadrilateral::rectangle(side, side)
    }

    #[test]
    fn shoelace_area_of_rectangle() {
        let quad = Quadrilateral::rectangle(10.0, 5.0);
        assert!((quad.area() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn area_ignores_winding_direction() {
        let c = square(4.0).corners();
        let reversed = Quadrilateral::from_corners([c[0], c[3], c[2], c[1]]);
        assert!((reversed.area() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn inset_shrinks_frame_symmetrically() {
        let quad = Quadrilateral::inset(1000, 500, 0.1);
        assert_eq!(quad.top_left(), Point::new(100.0, 50.0));
        assert_eq!(quad.bottom_right(), Point::new(900.0, 450.0));
    }

    #[test]
    fn clamp_pulls_corners_into_frame() {
        let quad = Quadrilateral::new(
            Point::new(-5.0, -3.0),
            Point::new(120.0, 0.0),
            Point::new(110.0, 90.0),
            Point::new(0.0, 200.0),
        );
        let clamped = quad.clamp_to(100, 100);
        assert_eq!(clamped.top_left(), Point::new(0.0, 0.0));
        assert_eq!(clamped.top_right(), Point::new(100.0, 0.0));
        assert_eq!(clamped.bottom_left(), Point::new(0.0, 100.0));
    }

    #[test]
    fn convexity_rejects_bow_tie() {
        assert!(square(10.0).is_convex());
        let bow_tie = Quadrilateral::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        );
        assert!(!bow_tie.is_convex());
    }

    #[test]
    fn a4_height_follows_aspect_ratio() {
        assert_eq!(PaperSize::A4.height_for_width(1240), 1754);
        assert_eq!(PaperSize::A4.height_for_width(210), 297);
    }

    #[test]
    fn rotation_round_trips_through_degrees() {
        for degrees in [0u16, 90, 180, 270] {
            let rotation = Rotation::try_from(degrees).expect("valid rotation");
            assert_eq!(u16::from(rotation), degrees);
        }
        assert!(Rotation::try_from(45).is_err());
        assert!(Rotation::Clockwise90.swaps_dimensions());
        assert!(!Rotation::Half.swaps_dimensions());
    }

    #[test]
    fn settings_validation_flags_out_of_range() {
        assert!(ProcessorSettings::default().validate().is_ok());
        let bad = ProcessorSettings {
            sharpness: 150,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(FlatpageError::InvalidSettings(_))));
        let bad = ProcessorSettings {
            brightness: -120,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        assert!(bad.clamped().validate().is_ok());
        assert_eq!(bad.clamped().brightness, -100);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let json = r#"{ "mode": "binary", "rotation": 90, "threshold": 140 }"#;
        let settings: ProcessorSettings = serde_json::from_str(json).expect("parse");
        assert_eq!(settings.mode, FilterMode::Binary);
        assert_eq!(settings.rotation, Rotation::Clockwise90);
        assert_eq!(settings.threshold, 140);
        assert_eq!(settings.margin, 0);

        let bad = r#"{ "rotation": 45 }"#;
        assert!(serde_json::from_str::<ProcessorSettings>(bad).is_err());
    }

    #[test]
    fn output_format_from_extension() {
        assert_eq!(OutputFormat::from_extension("JPG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_extension("pdf"), None);
    }
}
