//! Episode recognition in filenames.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static EPISODE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*s(\d{1,4})\s*e(\d{1,4})\s*$").expect("valid episode code regex")
});

/// Parse a code like "S02E05" into (season, episode).
pub fn parse_episode_code(code: &str) -> Option<(u32, u32)> {
    let caps = EPISODE_CODE.captures(code)?;
    let season = caps.get(1)?.as_str().parse().ok()?;
    let episode = caps.get(2)?.as_str().parse().ok()?;
    Some((season, episode))
}

/// Whether a filename refers to the given episode code.
///
/// Structured codes match the common `S02E05`, `S02.E05` and `2x05` forms
/// with or without leading zeros. A code that does not parse falls back to
/// a case-insensitive substring check.
pub fn episode_code_matches_filename(code: &str, filename: &str) -> bool {
    let Some((season, episode)) = parse_episode_code(code) else {
        let code = code.trim().to_lowercase();
        return !code.is_empty() && filename.to_lowercase().contains(&code);
    };

    let pattern = format!(
        r"(?i)(?:^|[^a-z0-9])s0*{season}[ ._-]?e0*{episode}(?:[^0-9]|$)|(?:^|[^0-9])0*{season}x0*{episode}(?:[^0-9]|$)"
    );
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(filename),
        Err(_) => false,
    }
}

/// Anime filenames carry the show title and the absolute episode number.
///
/// Both are literal case-insensitive substring checks, and both must hold.
pub fn anime_episode_matches(title: &str, absolute_number: u32, filename: &str) -> bool {
    let filename = filename.to_lowercase();
    let title = title.trim().to_lowercase();
    !title.is_empty()
        && filename.contains(&title)
        && filename.contains(&absolute_number.to_string())
}
