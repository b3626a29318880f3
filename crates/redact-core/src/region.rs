//! Redaction regions and page rectangles
//!
//! Coordinates are PDF points with the origin at the bottom-left of the page.
//! Regions are passed through as given; no Y flip is applied.

use serde::{Deserialize, Serialize};

/// A text region to black out, as reported by the caller's text matcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedactionRegion {
    /// Matched text. Informational only.
    #[serde(default)]
    pub text: String,
    /// Missing coordinates and extents read as zero.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Page size the caller measured against. Informational only.
    #[serde(rename = "pageWidth", default)]
    pub page_width: f64,
    #[serde(rename = "pageHeight", default)]
    pub page_height: f64,
}

impl RedactionRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            text: String::new(),
            x,
            y,
            width,
            height,
            page_width: 0.0,
            page_height: 0.0,
        }
    }

    /// Absolute rectangle from `(x, y)` to `(x + width, y + height)`.
    ///
    /// Negative extents are normalised, so the rectangle always has its
    /// lower-left corner first.
    pub fn rect(&self) -> PdfRect {
        PdfRect::from_corners(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Rectangle in page space, stored as lower-left / upper-right corners.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PdfRect {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl PdfRect {
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            llx: x1.min(x2),
            lly: y1.min(y2),
            urx: x1.max(x2),
            ury: y1.max(y2),
        }
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    pub fn to_array(self) -> [f32; 4] {
        [
            self.llx as f32,
            self.lly as f32,
            self.urx as f32,
            self.ury as f32,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_deserializes_caller_field_names() {
        let json = r#"{
            "text": "jane@example.com",
            "x": 72.0, "y": 700.5, "width": 120.0, "height": 14.0,
            "pageWidth": 612.0, "pageHeight": 792.0
        }"#;
        let region: RedactionRegion = serde_json::from_str(json).unwrap();
        assert_eq!(region.text, "jane@example.com");
        assert_eq!(region.page_width, 612.0);
        assert_eq!(region.page_height, 792.0);
    }

    #[test]
    fn test_informational_fields_are_optional() {
        let json = r#"{"x": 1, "y": 2, "width": 3, "height": 4}"#;
        let region: RedactionRegion = serde_json::from_str(json).unwrap();
        assert_eq!(region, RedactionRegion::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_missing_geometry_reads_as_zero() {
        let region: RedactionRegion = serde_json::from_str(r#"{"text": "x", "y": 9}"#).unwrap();
        assert_eq!(
            region,
            RedactionRegion {
                text: "x".to_string(),
                ..RedactionRegion::new(0.0, 9.0, 0.0, 0.0)
            }
        );
        assert!(region.rect().is_degenerate());
    }

    #[test]
    fn test_rect_spans_origin_plus_size() {
        let rect = RedactionRegion::new(100.0, 700.0, 200.0, 24.0).rect();
        assert_eq!(rect.to_array(), [100.0, 700.0, 300.0, 724.0]);
        assert_eq!(rect.width(), 200.0);
        assert_eq!(rect.height(), 24.0);
    }

    #[test]
    fn test_negative_extent_is_normalised() {
        let rect = RedactionRegion::new(100.0, 700.0, -40.0, -10.0).rect();
        assert_eq!(rect.to_array(), [60.0, 690.0, 100.0, 700.0]);
        assert!(!rect.is_degenerate());
    }

    #[test]
    fn test_zero_extent_is_degenerate() {
        let rect = RedactionRegion::new(10.0, 10.0, 0.0, 5.0).rect();
        assert!(rect.is_degenerate());
    }
}
