//! Name based classification used by the directory walk.

/// Extensions treated as photos (lowercase).
pub const PHOTO_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "heic", "heif", "webp", "bmp", "tiff", "tif", "raw", "cr2",
    "nef", "arw", "dng",
];

/// Path segments that mark system-owned storage (lowercase).
pub const RESERVED_SEGMENTS: &[&str] = &[".android_secure", "android/data", "android/obb", "lost+found"];

/// What a directory entry turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    File,
    Directory,
    /// Confirmation failed; resolved by [`accept_unconfirmed`].
    Unknown,
}

/// Whether the name carries a photo extension (case-insensitive).
pub fn has_photo_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            PHOTO_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

/// Whether the path runs through a system-reserved location.
pub fn is_reserved_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase().replace('\\', "/");
    RESERVED_SEGMENTS.iter().any(|segment| lower.contains(segment))
}

/// Policy for photo-named entries whose stat failed: keep them unless they
/// live under a reserved location.
pub fn accept_unconfirmed(path: &str) -> bool {
    !is_reserved_path(path)
}

/// Join a child name onto a directory path with `/`.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }
}
