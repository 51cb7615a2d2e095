//! The file selection capability and its labels.

use async_trait::async_trait;

/// One entry of a selection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOption {
    pub label: String,
    pub is_cancel: bool,
}

impl SelectionOption {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            is_cancel: false,
        }
    }

    pub fn cancel(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            is_cancel: true,
        }
    }
}

/// What the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Index into the presented options.
    Chosen(usize),
    Cancelled,
}

/// Presents a list of options and yields exactly one selection.
///
/// Implemented by the UI layer. The resolver calls it at most once per
/// link request.
#[async_trait]
pub trait Selector: Send + Sync {
    async fn present(&self, header: &str, options: &[SelectionOption]) -> Selection;
}

const SIZE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

/// Human-readable size in binary units, rounded to two decimals at most.
///
/// `1073741824` is `"1 GB"` and `1500` is `"1.46 KB"`.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}
