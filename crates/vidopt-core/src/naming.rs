//! Stored-name policy.
//!
//! Derives the final stored file name from the client-supplied name, the
//! preserve-vs-randomize policy, and (when a transcode occurred) the target
//! container extension. Stored names never contain path separators.

use std::path::Path;

use uuid::Uuid;

use crate::policy::TargetFormat;

const MAX_NAME_LEN: usize = 255;

/// Resolve the stored file name for one uploaded file.
///
/// With `preserve_filenames` the sanitized original base name is kept; a
/// transcode strips any existing extension and appends the container
/// extension. Without it a fresh time-ordered unique token is used, with the
/// original extension (lowercased) or the container extension.
pub fn resolve_stored_name(
    original_name: &str,
    preserve_filenames: bool,
    transcode_format: Option<TargetFormat>,
) -> String {
    let sanitized = sanitize_filename(original_name);
    let (stem, extension) = split_name(&sanitized);

    if preserve_filenames {
        return match transcode_format {
            Some(format) => format!("{}.{}", stem, format.extension()),
            None => sanitized,
        };
    }

    let token = Uuid::now_v7();
    let extension = match transcode_format {
        Some(format) => Some(format.extension().to_string()),
        None => extension.map(|e| e.to_ascii_lowercase()),
    };

    match extension {
        Some(ext) => format!("{}.{}", token, ext),
        None => token.to_string(),
    }
}

/// Join a destination directory and a resolved filename with exactly one
/// separator, trimming leading/trailing `/` from each segment.
pub fn join_stored_path(directory: Option<&str>, filename: &str) -> String {
    let filename = filename.trim_matches('/');
    match directory.map(|d| d.trim_matches('/')) {
        Some(dir) if !dir.is_empty() => format!("{}/{}", dir, filename),
        _ => filename.to_string(),
    }
}

/// Strip client-supplied directory components and unsafe characters.
fn sanitize_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    if base.contains("..") {
        return "file".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX_NAME_LEN)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim_matches(['.', '_']).is_empty() {
        "file".to_string()
    } else {
        s
    }
}

/// Split a sanitized name into (stem, extension).
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserve_keeps_original_name() {
        assert_eq!(resolve_stored_name("clip.MOV", true, None), "clip.MOV");
    }

    #[test]
    fn test_preserve_with_transcode_swaps_extension() {
        assert_eq!(
            resolve_stored_name("clip.MOV", true, Some(TargetFormat::Webm)),
            "clip.webm"
        );
        assert_eq!(
            resolve_stored_name("holiday.video.avi", true, Some(TargetFormat::Mp4)),
            "holiday.video.mp4"
        );
    }

    #[test]
    fn test_randomized_name_with_transcode() {
        let name = resolve_stored_name("clip.MOV", false, Some(TargetFormat::Webm));
        assert!(name.ends_with(".webm"));
        assert!(!name.starts_with("clip"));
        let stem = name.strip_suffix(".webm").unwrap();
        assert!(Uuid::parse_str(stem).is_ok());
    }

    #[test]
    fn test_randomized_name_keeps_lowercased_extension() {
        let name = resolve_stored_name("clip.MOV", false, None);
        assert!(name.ends_with(".mov"));
    }

    #[test]
    fn test_randomized_names_are_unique() {
        let a = resolve_stored_name("a.mp4", false, None);
        let b = resolve_stored_name("a.mp4", false, None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_sanitize_strips_directories() {
        let name = resolve_stored_name("../../etc/passwd", true, None);
        assert!(!name.contains('/'));
        assert!(!name.contains(".."));
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(
            resolve_stored_name("my clip (1).mp4", true, None),
            "my_clip__1_.mp4"
        );
    }

    #[test]
    fn test_join_stored_path_trims_slashes() {
        assert_eq!(join_stored_path(Some("videos/"), "a.mp4"), "videos/a.mp4");
        assert_eq!(join_stored_path(Some("/videos"), "a.mp4"), "videos/a.mp4");
        assert_eq!(
            join_stored_path(Some("/uploads/videos/"), "/a.mp4"),
            "uploads/videos/a.mp4"
        );
        assert_eq!(join_stored_path(None, "a.mp4"), "a.mp4");
        assert_eq!(join_stored_path(Some(""), "a.mp4"), "a.mp4");
    }
}
