use image::codecs::jpeg::JpegEncoder;
use std::io::Cursor;

/// Convert a URL to a sanitized filename
pub fn sanitize_filename(url: &str) -> String {
    // Remove protocol and replace invalid filename characters
    let mut name = url.replace("http://", "").replace("https://", "");
    name = name.replace(['/', ':', '?', '&', '=', '#', '%', '\\', '*', '"', '<', '>', '|'], "_");
    let name = name.trim_end_matches('_');

    // Limit filename length
    let name: String = name.chars().take(100).collect();
    if name.is_empty() {
        "index".to_string()
    } else {
        name
    }
}

/// Re-encode a PNG screenshot as JPEG at `quality` (0-100)
pub fn png_to_jpeg(png: &[u8], quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(png)?;
    // JPEG has no alpha channel
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut jpeg = Cursor::new(Vec::new());
    // The encoder rejects 0
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)?;
    Ok(jpeg.into_inner())
}
