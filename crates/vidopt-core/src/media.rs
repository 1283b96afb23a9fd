//! Media type helpers.

/// Video MIME types accepted by the upload field by default.
pub const ACCEPTED_VIDEO_TYPES: [&str; 6] = [
    "video/mp4",
    "video/webm",
    "video/ogg",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-matroska",
];

/// True when the declared media type belongs to the video category.
pub fn is_video(media_type: &str) -> bool {
    media_type.starts_with("video/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video() {
        assert!(is_video("video/mp4"));
        assert!(is_video("video/quicktime"));
        assert!(!is_video("image/png"));
        assert!(!is_video("application/octet-stream"));
        assert!(!is_video("audio/video"));
    }

    #[test]
    fn test_accepted_types_are_video() {
        for mime in ACCEPTED_VIDEO_TYPES {
            assert!(is_video(mime));
        }
    }
}
