//! Watermark layout descriptions
//!
//! A description is a comma separated list of `key:value` pairs, e.g.
//! `"scale:0.6 rel, pos:c, off:0 0, rot:0, op:0.1"`. Keys may be shortened
//! to any unambiguous prefix.

use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Measurement unit for offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Points,
    Inches,
    Centimeters,
    Millimeters,
}

impl Unit {
    pub fn to_points(self, value: f64) -> f64 {
        match self {
            Unit::Points => value,
            Unit::Inches => value * 72.0,
            Unit::Centimeters => value * 72.0 / 2.54,
            Unit::Millimeters => value * 72.0 / 25.4,
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "po" | "pt" | "points" => Ok(Unit::Points),
            "in" | "inches" => Ok(Unit::Inches),
            "cm" => Ok(Unit::Centimeters),
            "mm" => Ok(Unit::Millimeters),
            other => Err(format!("unknown unit '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Scale factor applied to the image after fitting it to the page.
    #[default]
    Relative,
    /// Scale factor applied to the image's pixel size, one pixel per point.
    Absolute,
}

impl ScaleMode {
    pub fn code(self) -> &'static str {
        match self {
            ScaleMode::Relative => "rel",
            ScaleMode::Absolute => "abs",
        }
    }
}

/// Anchor of the watermark on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    TopLeft,
    TopCenter,
    TopRight,
    Left,
    #[default]
    Center,
    Right,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Position {
    pub fn code(self) -> &'static str {
        match self {
            Position::TopLeft => "tl",
            Position::TopCenter => "tc",
            Position::TopRight => "tr",
            Position::Left => "l",
            Position::Center => "c",
            Position::Right => "r",
            Position::BottomLeft => "bl",
            Position::BottomCenter => "bc",
            Position::BottomRight => "br",
        }
    }

    /// Horizontal and vertical alignment factors (0 = left/bottom, 1 = right/top).
    fn alignment(self) -> (f64, f64) {
        match self {
            Position::TopLeft => (0.0, 1.0),
            Position::TopCenter => (0.5, 1.0),
            Position::TopRight => (1.0, 1.0),
            Position::Left => (0.0, 0.5),
            Position::Center => (0.5, 0.5),
            Position::Right => (1.0, 0.5),
            Position::BottomLeft => (0.0, 0.0),
            Position::BottomCenter => (0.5, 0.0),
            Position::BottomRight => (1.0, 0.0),
        }
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tl" => Ok(Position::TopLeft),
            "tc" => Ok(Position::TopCenter),
            "tr" => Ok(Position::TopRight),
            "l" => Ok(Position::Left),
            "c" => Ok(Position::Center),
            "r" => Ok(Position::Right),
            "bl" => Ok(Position::BottomLeft),
            "bc" => Ok(Position::BottomCenter),
            "br" => Ok(Position::BottomRight),
            other => Err(format!("unknown position '{}'", other)),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Where a watermark lands on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Centre of the watermark in page space.
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    /// Counter-clockwise rotation about the centre, in degrees.
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkDescriptor {
    pub scale: f64,
    pub scale_mode: ScaleMode,
    pub position: Position,
    /// Offset from the anchor, in points.
    pub offset: (f64, f64),
    pub rotation: f64,
    pub opacity: f64,
}

impl Default for WatermarkDescriptor {
    fn default() -> Self {
        Self {
            scale: 0.5,
            scale_mode: ScaleMode::Relative,
            position: Position::Center,
            offset: (0.0, 0.0),
            rotation: 0.0,
            opacity: 1.0,
        }
    }
}

const KEYS: [&str; 5] = ["scale", "position", "offset", "rotation", "opacity"];

fn invalid(msg: impl Into<String>) -> EngineError {
    EngineError::InvalidDescription(msg.into())
}

/// Expand an abbreviated key to its full name.
fn expand_key(key: &str) -> Result<&'static str, EngineError> {
    let key = key.trim().to_ascii_lowercase();
    if key.is_empty() {
        return Err(invalid("missing key"));
    }
    let matches: Vec<&'static str> = KEYS.iter().copied().filter(|k| k.starts_with(&key)).collect();
    match matches.as_slice() {
        [single] => Ok(single),
        [] => Err(invalid(format!("unknown key '{}'", key))),
        _ => Err(invalid(format!("ambiguous key '{}'", key))),
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64, EngineError> {
    let number: f64 = value
        .trim()
        .parse()
        .map_err(|_| invalid(format!("{}: '{}' is not a number", key, value.trim())))?;
    if !number.is_finite() {
        return Err(invalid(format!("{}: '{}' is not finite", key, value.trim())));
    }
    Ok(number)
}

impl WatermarkDescriptor {
    /// Parse a description. Offsets are given in `unit` and stored in points.
    pub fn parse(description: &str, unit: Unit) -> Result<Self, EngineError> {
        let mut descriptor = Self::default();

        for part in description.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part
                .split_once(':')
                .ok_or_else(|| invalid(format!("'{}' is not a key:value pair", part)))?;
            let value = value.trim();

            match expand_key(key)? {
                "scale" => {
                    let mut tokens = value.split_whitespace();
                    let factor = parse_number("scale", tokens.next().unwrap_or(""))?;
                    let mode = match tokens.next() {
                        None | Some("rel") => ScaleMode::Relative,
                        Some("abs") => ScaleMode::Absolute,
                        Some(other) => {
                            return Err(invalid(format!("scale: unknown mode '{}'", other)))
                        }
                    };
                    if tokens.next().is_some() {
                        return Err(invalid(format!("scale: unexpected '{}'", value)));
                    }
                    let in_range = match mode {
                        ScaleMode::Relative => factor > 0.0 && factor <= 1.0,
                        ScaleMode::Absolute => factor > 0.0,
                    };
                    if !in_range {
                        return Err(invalid(format!(
                            "scale: {} out of range for {} scaling",
                            factor,
                            mode.code()
                        )));
                    }
                    descriptor.scale = factor;
                    descriptor.scale_mode = mode;
                }
                "position" => {
                    descriptor.position = value.parse().map_err(invalid)?;
                }
                "offset" => {
                    let tokens: Vec<&str> = value.split_whitespace().collect();
                    let [dx, dy] = tokens.as_slice() else {
                        return Err(invalid(format!("offset: expected 'dx dy', got '{}'", value)));
                    };
                    descriptor.offset = (
                        unit.to_points(parse_number("offset", dx)?),
                        unit.to_points(parse_number("offset", dy)?),
                    );
                }
                "rotation" => {
                    let degrees = parse_number("rotation", value)?;
                    if !(-180.0..=180.0).contains(&degrees) {
                        return Err(invalid(format!("rotation: {} not in -180..180", degrees)));
                    }
                    descriptor.rotation = degrees;
                }
                "opacity" => {
                    let opacity = parse_number("opacity", value)?;
                    if !(0.0..=1.0).contains(&opacity) {
                        return Err(invalid(format!("opacity: {} not in 0..1", opacity)));
                    }
                    descriptor.opacity = opacity;
                }
                other => return Err(invalid(format!("unknown key '{}'", other))),
            }
        }

        Ok(descriptor)
    }

    /// Size and centre of the watermark on a page with the given box.
    pub fn placement(&self, page_box: [f64; 4], image_size: (f64, f64)) -> Placement {
        let [llx, lly, urx, ury] = page_box;
        let (page_w, page_h) = (urx - llx, ury - lly);
        let (image_w, image_h) = (image_size.0.max(1.0), image_size.1.max(1.0));

        let factor = match self.scale_mode {
            ScaleMode::Relative => self.scale * (page_w / image_w).min(page_h / image_h),
            ScaleMode::Absolute => self.scale,
        };
        let (width, height) = (image_w * factor, image_h * factor);

        let (ax, ay) = self.position.alignment();
        let x = llx + (page_w - width) * ax + self.offset.0;
        let y = lly + (page_h - height) * ay + self.offset.1;

        Placement {
            center_x: x + width / 2.0,
            center_y: y + height / 2.0,
            width,
            height,
            rotation: self.rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_default_redaction_watermark() {
        let descriptor =
            WatermarkDescriptor::parse("scale:0.6 rel, pos:c, rot:0, op:0.1", Unit::Points)
                .unwrap();
        assert_eq!(
            descriptor,
            WatermarkDescriptor {
                scale: 0.6,
                scale_mode: ScaleMode::Relative,
                position: Position::Center,
                offset: (0.0, 0.0),
                rotation: 0.0,
                opacity: 0.1,
            }
        );
    }

    #[test]
    fn test_empty_description_uses_defaults() {
        let descriptor = WatermarkDescriptor::parse("", Unit::Points).unwrap();
        assert_eq!(descriptor, WatermarkDescriptor::default());
    }

    #[test]
    fn test_keys_accept_unambiguous_prefixes() {
        let descriptor =
            WatermarkDescriptor::parse("sc:2 abs, p:br, r:45, opa:0.5", Unit::Points).unwrap();
        assert_eq!(descriptor.scale, 2.0);
        assert_eq!(descriptor.scale_mode, ScaleMode::Absolute);
        assert_eq!(descriptor.position, Position::BottomRight);
        assert_eq!(descriptor.rotation, 45.0);
        assert_eq!(descriptor.opacity, 0.5);
    }

    #[test]
    fn test_ambiguous_key_is_rejected() {
        let err = WatermarkDescriptor::parse("o:1", Unit::Points).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_offset_converted_to_points() {
        let descriptor = WatermarkDescriptor::parse("off:1 -2", Unit::Inches).unwrap();
        assert_eq!(descriptor.offset, (72.0, -144.0));

        let descriptor = WatermarkDescriptor::parse("off:25.4 0", Unit::Millimeters).unwrap();
        assert!((descriptor.offset.0 - 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        for description in [
            "scale:0",
            "scale:1.5 rel",
            "scale:-1 abs",
            "scale:0.5 huge",
            "op:1.1",
            "rot:270",
            "pos:middle",
            "off:10",
            "colour:red",
            "scale",
        ] {
            assert!(
                WatermarkDescriptor::parse(description, Unit::Points).is_err(),
                "'{}' should be rejected",
                description
            );
        }
    }

    #[test]
    fn test_relative_placement_is_centered_and_fitted() {
        let descriptor =
            WatermarkDescriptor::parse("scale:0.5 rel, pos:c", Unit::Points).unwrap();
        // 100x50 image on a 600x800 page: fit factor 6, scaled by 0.5 -> 300x150.
        let placement = descriptor.placement([0.0, 0.0, 600.0, 800.0], (100.0, 50.0));
        assert_eq!(placement.width, 300.0);
        assert_eq!(placement.height, 150.0);
        assert_eq!(placement.center_x, 300.0);
        assert_eq!(placement.center_y, 400.0);
    }

    #[test]
    fn test_absolute_placement_at_corner_with_offset() {
        let descriptor =
            WatermarkDescriptor::parse("scale:1 abs, pos:bl, off:10 20", Unit::Points).unwrap();
        let placement = descriptor.placement([0.0, 0.0, 612.0, 792.0], (40.0, 30.0));
        assert_eq!(placement.width, 40.0);
        assert_eq!(placement.center_x, 10.0 + 20.0);
        assert_eq!(placement.center_y, 20.0 + 15.0);
    }

    #[test]
    fn test_placement_respects_page_origin() {
        let descriptor = WatermarkDescriptor::parse("pos:tr, scale:1 abs", Unit::Points).unwrap();
        let placement = descriptor.placement([100.0, 100.0, 300.0, 400.0], (20.0, 10.0));
        assert_eq!(placement.center_x, 300.0 - 10.0);
        assert_eq!(placement.center_y, 400.0 - 5.0);
    }
}
