//! Content type detection for local files handed to the provider.

pub const FALLBACK_MIME: &str = "application/octet-stream";

/// `(offset, magic bytes, mime)`; RIFF containers are matched separately.
const SIGNATURES: &[(usize, &[u8], &str)] = &[
    (0, b"\xFF\xD8\xFF", "image/jpeg"),
    (0, b"\x89PNG\r\n\x1A\n", "image/png"),
    (0, b"GIF87a", "image/gif"),
    (0, b"GIF89a", "image/gif"),
    (4, b"ftypavif", "image/avif"),
];

pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }

    SIGNATURES
        .iter()
        .find(|(offset, magic, _)| bytes.get(*offset..*offset + magic.len()) == Some(*magic))
        .map(|(_, _, mime)| *mime)
        .unwrap_or_else(|| {
            tracing::warn!(
                "Unrecognized image format (first bytes: {:02X?}), falling back to {}",
                &bytes[..bytes.len().min(8)],
                FALLBACK_MIME
            );
            FALLBACK_MIME
        })
}

pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}
