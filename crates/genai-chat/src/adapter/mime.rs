use std::path::Path;

use image::ImageFormat;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess a MIME type from the file extension, falling back to octet-stream
pub fn from_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(from_extension)
        .unwrap_or(OCTET_STREAM)
}

pub fn from_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/vnd.microsoft.icon",
        "mp3" => "audio/mpeg",
        "wav" => "audio/x-wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "zip" => "application/zip",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "xml" => "application/xml",
        "py" => "text/x-python",
        _ => return None,
    };
    Some(mime)
}

/// Canonical MIME type for an in-memory image format
pub fn from_image_format(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/vnd.microsoft.icon",
        ImageFormat::Avif => "image/avif",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(from_path(Path::new("/tmp/gradio/x.png")), "image/png");
        assert_eq!(from_path(Path::new("/tmp/photo.JPG")), "image/jpeg");
        assert_eq!(from_path(Path::new("/tmp/notes.pdf")), "application/pdf");
        assert_eq!(from_path(Path::new("/tmp/blob.unknownext")), OCTET_STREAM);
        assert_eq!(from_path(Path::new("/tmp/no_extension")), OCTET_STREAM);
    }

    #[test]
    fn test_from_image_format_uses_canonical_names() {
        assert_eq!(from_image_format(ImageFormat::Jpeg), "image/jpeg");
        assert_eq!(from_image_format(ImageFormat::WebP), "image/webp");
        assert_eq!(from_image_format(ImageFormat::Png), "image/png");
    }
}
