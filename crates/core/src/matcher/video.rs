//! File type checks by extension.

const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "wmv", "m4v", "webm", "ts", "m2ts", "mpg", "mpeg", "flv",
    "divx", "ogm", "vob", "3gp",
];

const ARCHIVE_EXTENSIONS: &[&str] = &["rar", "zip", "7z"];

/// Lowercase extension of a path, without the dot. Empty if none.
pub fn file_extension(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

/// Whether the file has a video extension.
pub fn is_video_file(path: &str) -> bool {
    let ext = file_extension(path);
    VIDEO_EXTENSIONS.contains(&ext.as_str())
}

/// Whether the file is a compressed archive.
pub fn is_archive_file(path: &str) -> bool {
    let ext = file_extension(path);
    ARCHIVE_EXTENSIONS.contains(&ext.as_str())
}
