use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::errors::AdapterResult;
use crate::models::content::ContentItem;
use crate::models::element::UiElement;
use crate::models::part::{BlobPart, Part};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// How model-generated images are handed to the UI
///   native sends decoded images, markdown embeds them as an inline `<img>` data uri
///   for renderers that only accept text
pub enum ImageRendering {
    #[default]
    Native,
    Markdown,
}

/// Convert one streamed content item into displayable elements, in part order
pub fn to_elements(
    content: Option<&ContentItem>,
    rendering: ImageRendering,
) -> AdapterResult<Vec<UiElement>> {
    let Some(content) = content else {
        return Ok(Vec::new());
    };

    let mut elements = Vec::with_capacity(content.parts.len());
    for part in &content.parts {
        if let Some(element) = part_to_element(part, rendering)? {
            elements.push(element);
        }
    }
    Ok(elements)
}

fn part_to_element(part: &Part, rendering: ImageRendering) -> AdapterResult<Option<UiElement>> {
    match part {
        Part::Text(text) if !text.text.is_empty() => Ok(Some(UiElement::Text(text.text.clone()))),
        Part::Blob(blob) if !blob.data.is_empty() => match rendering {
            ImageRendering::Native => {
                let image = image::load_from_memory(&blob.data)?;
                Ok(Some(UiElement::Image(image)))
            }
            ImageRendering::Markdown => Ok(Some(UiElement::Text(blob_to_markdown(blob)))),
        },
        _ => Ok(None),
    }
}

fn blob_to_markdown(blob: &BlobPart) -> String {
    format!(
        "<img src=\"data:{};base64,{}\">",
        blob.mime_type,
        STANDARD.encode(&blob.data)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::message::get_bytes_from_image;
    use crate::errors::AdapterError;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn png_bytes() -> (DynamicImage, Vec<u8>) {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(5, 4, Rgba([10, 20, 30, 255])));
        let bytes = get_bytes_from_image(&image, ImageFormat::Png).unwrap();
        (image, bytes)
    }

    #[test]
    fn test_missing_or_empty_content_yields_nothing() {
        assert!(to_elements(None, ImageRendering::Native).unwrap().is_empty());
        let empty = ContentItem::model();
        assert!(to_elements(Some(&empty), ImageRendering::Native)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parts_map_in_order_and_empty_text_is_dropped() {
        let (image, bytes) = png_bytes();
        let content = ContentItem::model()
            .with_text("")
            .with_text("hi")
            .with_blob(bytes, "image/png");

        let elements = to_elements(Some(&content), ImageRendering::Native).unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0], UiElement::Text("hi".into()));
        let decoded = elements[1].as_image().expect("Expected image element");
        assert_eq!(decoded.to_rgba8(), image.to_rgba8());
    }

    #[test]
    fn test_markdown_rendering_embeds_data_uri() {
        let content = ContentItem::model().with_blob(vec![1, 2, 3], "image/png");
        let elements = to_elements(Some(&content), ImageRendering::Markdown).unwrap();
        assert_eq!(
            elements,
            vec![UiElement::Text(
                "<img src=\"data:image/png;base64,AQID\">".into()
            )]
        );
    }

    #[test]
    fn test_empty_blob_yields_nothing() {
        let content = ContentItem::model().with_blob(Vec::new(), "image/png");
        assert!(to_elements(Some(&content), ImageRendering::Native)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_undecodable_blob_is_an_error() {
        let content = ContentItem::model().with_blob(b"not an image".to_vec(), "image/png");
        assert!(matches!(
            to_elements(Some(&content), ImageRendering::Native),
            Err(AdapterError::DecodeImage(_))
        ));
    }
}
