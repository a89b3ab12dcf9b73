//! Declared content-type handling.

pub const VIDEO_MP4: &str = "video/mp4";
pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_PNG: &str = "image/png";

pub const THUMBNAIL_MEDIA_TYPES: [&str; 2] = [IMAGE_JPEG, IMAGE_PNG];

/// Reduces a Content-Type header value to its bare `type/subtype`, lowercased.
///
/// Returns `None` when nothing resembling a media type is present.
pub fn normalize(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim();
    let (kind, subtype) = essence.split_once('/')?;
    if kind.is_empty() || subtype.is_empty() || subtype.contains('/') {
        return None;
    }
    Some(essence.to_ascii_lowercase())
}

/// File extension used for an accepted media type's stored object.
pub fn extension(media_type: &str) -> Option<&str> {
    media_type.split_once('/').map(|(_, subtype)| subtype)
}
