//! Square annotations

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::EngineError;
use crate::region::PdfRect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    fn to_object(self) -> Object {
        Object::Array(vec![
            Object::Real(self.r),
            Object::Real(self.g),
            Object::Real(self.b),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Beveled,
    Inset,
    Underline,
}

impl BorderStyle {
    fn pdf_name(self) -> &'static str {
        match self {
            BorderStyle::Solid => "S",
            BorderStyle::Dashed => "D",
            BorderStyle::Beveled => "B",
            BorderStyle::Inset => "I",
            BorderStyle::Underline => "U",
        }
    }
}

/// A `/Square` annotation with optional fill.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareAnnotation {
    pub rect: PdfRect,
    pub contents: String,
    /// Unique annotation name (`/NM`).
    pub name: String,
    pub modified: DateTime<Utc>,
    pub flags: i64,
    /// Border colour (`/C`).
    pub color: Option<Rgb>,
    /// Fill colour (`/IC`).
    pub interior_color: Option<Rgb>,
    pub opacity: Option<f32>,
    pub border_width: f32,
    pub border_style: BorderStyle,
}

impl SquareAnnotation {
    /// Opaque black box with a 1pt solid border, named `redact{index}`.
    pub fn redaction(index: usize, rect: PdfRect) -> Self {
        Self {
            rect,
            contents: String::new(),
            name: format!("redact{}", index),
            modified: Utc::now(),
            flags: 0,
            color: Some(Rgb::BLACK),
            interior_color: Some(Rgb::BLACK),
            opacity: None,
            border_width: 1.0,
            border_style: BorderStyle::Solid,
        }
    }

    fn dictionary(&self, page_id: ObjectId, appearance_id: ObjectId) -> Dictionary {
        let mut annot = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Square",
            "Rect" => self.rect.to_array().iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
            "Contents" => Object::string_literal(self.contents.as_str()),
            "NM" => Object::string_literal(self.name.as_str()),
            "M" => Object::string_literal(pdf_date(&self.modified)),
            "F" => self.flags,
            "P" => page_id,
            "BS" => dictionary! {
                "Type" => "Border",
                "W" => Object::Real(self.border_width),
                "S" => self.border_style.pdf_name(),
            },
            "AP" => dictionary! { "N" => appearance_id },
        };
        if let Some(color) = self.color {
            annot.set("C", color.to_object());
        }
        if let Some(fill) = self.interior_color {
            annot.set("IC", fill.to_object());
        }
        if let Some(opacity) = self.opacity {
            annot.set("CA", Object::Real(opacity));
        }
        annot
    }

    /// Normal appearance: the rectangle filled and stroked in its own space.
    fn appearance(&self) -> Result<Stream, EngineError> {
        let width = self.rect.width() as f32;
        let height = self.rect.height() as f32;
        let inset = self.border_width / 2.0;
        let stroke = self.color.is_some() && self.border_width > 0.0;

        let mut operations = Vec::new();
        if let Some(fill) = self.interior_color {
            operations.push(Operation::new(
                "rg",
                vec![fill.r.into(), fill.g.into(), fill.b.into()],
            ));
        }
        if let Some(color) = self.color {
            operations.push(Operation::new(
                "RG",
                vec![color.r.into(), color.g.into(), color.b.into()],
            ));
        }
        operations.push(Operation::new("w", vec![self.border_width.into()]));
        operations.push(Operation::new(
            "re",
            vec![
                inset.into(),
                inset.into(),
                (width - self.border_width).max(0.0).into(),
                (height - self.border_width).max(0.0).into(),
            ],
        ));
        let paint = match (self.interior_color.is_some(), stroke) {
            (true, true) => "B",
            (true, false) => "f",
            (false, true) => "S",
            (false, false) => "n",
        };
        operations.push(Operation::new(paint, vec![]));

        let content = Content { operations }
            .encode()
            .map_err(|e| EngineError::OperationError(e.to_string()))?;

        Ok(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
            },
            content,
        ))
    }
}

/// PDF date string, e.g. `D:20240131094500Z`.
fn pdf_date(time: &DateTime<Utc>) -> String {
    time.format("D:%Y%m%d%H%M%SZ").to_string()
}

pub(super) fn add_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    annotation: &SquareAnnotation,
) -> Result<(), EngineError> {
    let appearance_id = doc.add_object(annotation.appearance()?);
    let annot_id = doc.add_object(annotation.dictionary(page_id, appearance_id));
    add_annotation_to_page(doc, page_id, annot_id)
}

fn add_annotation_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), EngineError> {
    let shared_annots = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| EngineError::OperationError(e.to_string()))?
        .get(b"Annots")
        .and_then(Object::as_reference)
        .ok();

    if let Some(annots_id) = shared_annots {
        if let Ok(Object::Array(ref mut arr)) = doc.get_object_mut(annots_id) {
            arr.push(Object::Reference(annot_id));
            return Ok(());
        }
    }

    let page = doc
        .get_object_mut(page_id)
        .map_err(|e| EngineError::OperationError(e.to_string()))?;

    if let Object::Dictionary(ref mut page_dict) = page {
        if let Ok(Object::Array(ref mut arr)) = page_dict.get_mut(b"Annots") {
            arr.push(Object::Reference(annot_id));
        } else {
            page_dict.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
        }
    }
    Ok(())
}
