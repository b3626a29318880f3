//! Stamping image watermarks onto pages

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::descriptor::WatermarkDescriptor;
use super::image::WatermarkImage;
use super::{media_box, resolve};
use crate::error::EngineError;

/// Key tagging the content streams added by a watermark run.
pub const STAMP_KEY: &str = "RedactStamp";

const IMAGE_NAME: &str = "WmIm0";
const STATE_NAME: &str = "WmGs0";

/// An image watermark ready to be applied.
#[derive(Debug, Clone)]
pub struct Watermark {
    pub descriptor: WatermarkDescriptor,
    pub image: WatermarkImage,
    /// Draw over the page content instead of beneath it.
    pub on_top: bool,
    /// Replace an existing watermark instead of failing.
    pub update: bool,
}

pub(super) fn apply(
    doc: &mut Document,
    pages: &[(u32, ObjectId)],
    watermark: &Watermark,
) -> Result<(), EngineError> {
    if !watermark.update
        && pages
            .iter()
            .any(|(_, page_id)| page_contents(doc, *page_id).iter().any(|c| is_stamp(doc, c)))
    {
        return Err(EngineError::AlreadyWatermarked);
    }

    let image_id = watermark.image.embed(doc)?;
    let opacity = watermark.descriptor.opacity as f32;
    let state_id = doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => Object::Real(opacity),
        "CA" => Object::Real(opacity),
    });

    let image_size = (
        watermark.image.width as f64,
        watermark.image.height as f64,
    );

    for (_, page_id) in pages {
        let page_id = *page_id;
        let placement = watermark
            .descriptor
            .placement(media_box(doc, page_id), image_size);

        let (sin, cos) = placement.rotation.to_radians().sin_cos();
        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new("gs", vec![Object::Name(STATE_NAME.into())]),
            Operation::new(
                "cm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    placement.center_x.into(),
                    placement.center_y.into(),
                ],
            ),
            Operation::new(
                "cm",
                vec![cos.into(), sin.into(), (-sin).into(), cos.into(), 0.into(), 0.into()],
            ),
            Operation::new(
                "cm",
                vec![
                    placement.width.into(),
                    0.into(),
                    0.into(),
                    placement.height.into(),
                    (-placement.width / 2.0).into(),
                    (-placement.height / 2.0).into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.into())]),
            Operation::new("Q", vec![]),
        ];
        let content = Content { operations }
            .encode()
            .map_err(|e| EngineError::OperationError(e.to_string()))?;
        let stamp_id = doc.add_object(tagged_stream("Watermark", content));

        let existing: Vec<Object> = page_contents(doc, page_id)
            .into_iter()
            .filter(|c| !is_stamp(doc, c))
            .collect();

        let contents = if watermark.on_top && !existing.is_empty() {
            // Isolate the page's graphics state from the watermark.
            let save_id = doc.add_object(tagged_stream("Wrap", b"q\n".to_vec()));
            let restore_id = doc.add_object(tagged_stream("Wrap", b"\nQ\n".to_vec()));
            let mut contents = Vec::with_capacity(existing.len() + 3);
            contents.push(Object::Reference(save_id));
            contents.extend(existing);
            contents.push(Object::Reference(restore_id));
            contents.push(Object::Reference(stamp_id));
            contents
        } else if watermark.on_top {
            vec![Object::Reference(stamp_id)]
        } else {
            let mut contents = Vec::with_capacity(existing.len() + 1);
            contents.push(Object::Reference(stamp_id));
            contents.extend(existing);
            contents
        };

        let resources = stamped_resources(doc, page_id, image_id, state_id);
        let page = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| EngineError::OperationError(e.to_string()))?;
        page.set("Contents", Object::Array(contents));
        page.set("Resources", Object::Dictionary(resources));
    }

    Ok(())
}

fn tagged_stream(kind: &str, content: Vec<u8>) -> Stream {
    let mut dict = Dictionary::new();
    dict.set(STAMP_KEY, Object::Name(kind.into()));
    Stream::new(dict, content)
}

/// The page's content streams as a flat list of objects.
fn page_contents(doc: &Document, page_id: ObjectId) -> Vec<Object> {
    let Ok(page) = doc.get_object(page_id).and_then(Object::as_dict) else {
        return Vec::new();
    };
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

fn is_stamp(doc: &Document, content: &Object) -> bool {
    match resolve(doc, content) {
        Object::Stream(stream) => stream.dict.has(STAMP_KEY.as_bytes()),
        _ => false,
    }
}

/// Copy of the page's effective resources with the watermark image and
/// graphics state registered.
fn stamped_resources(
    doc: &Document,
    page_id: ObjectId,
    image_id: ObjectId,
    state_id: ObjectId,
) -> Dictionary {
    let mut resources = match super::inherited(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };

    for (category, name, id) in [
        ("XObject", IMAGE_NAME, image_id),
        ("ExtGState", STATE_NAME, state_id),
    ] {
        let mut entries = match resources.get(category.as_bytes()).map(|o| resolve(doc, o)) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        entries.set(name, Object::Reference(id));
        resources.set(category, Object::Dictionary(entries));
    }

    resources
}
