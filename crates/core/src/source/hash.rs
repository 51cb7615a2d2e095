//! Content hash derivation for candidate releases.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::CandidateRelease;

static BTIH: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)xt=urn:btih:([a-z0-9]+)").ok());

/// Extract the info hash from a magnet URL.
///
/// Accepts both hex (40 chars) and base32 (32 chars) encodings. The result is
/// always lowercase hex.
pub fn extract_hash_from_url(url: &str) -> Option<String> {
    let re = BTIH.as_ref()?;
    let raw = re.captures(url)?.get(1)?.as_str();

    match raw.len() {
        40 if raw.chars().all(|c| c.is_ascii_hexdigit()) => Some(raw.to_lowercase()),
        32 => base32_to_hex(raw),
        _ => None,
    }
}

/// Fill in `candidate.hash` from its URL when no hash is present.
///
/// An explicit hash is never overwritten. Returns the hash the candidate ends
/// up with, if any.
pub fn normalize_hash(candidate: &mut CandidateRelease) -> Option<&str> {
    let missing = candidate.hash.as_deref().map_or(true, str::is_empty);
    if missing {
        if let Some(hash) = extract_hash_from_url(&candidate.url) {
            candidate.hash = Some(hash);
        }
    }
    candidate.hash.as_deref().filter(|h| !h.is_empty())
}

/// Normalize every candidate and collect their hashes.
///
/// The list is lowercase, deduplicated and keeps first-seen order. Candidates
/// without a derivable hash are skipped.
pub fn collect_hashes(candidates: &mut [CandidateRelease]) -> Vec<String> {
    let mut hashes: Vec<String> = Vec::new();

    for candidate in candidates.iter_mut() {
        if let Some(hash) = normalize_hash(candidate) {
            let hash = hash.to_lowercase();
            if !hashes.contains(&hash) {
                hashes.push(hash);
            }
        }
    }

    hashes
}

fn base32_to_hex(encoded: &str) -> Option<String> {
    let mut bits: u64 = 0;
    let mut bit_count = 0u32;
    let mut out = String::with_capacity(40);

    for c in encoded.chars() {
        let value = match c.to_ascii_uppercase() {
            c @ 'A'..='Z' => c as u64 - 'A' as u64,
            c @ '2'..='7' => c as u64 - '2' as u64 + 26,
            _ => return None,
        };
        bits = (bits << 5) | value;
        bit_count += 5;

        if bit_count >= 8 {
            bit_count -= 8;
            let byte = (bits >> bit_count) & 0xff;
            out.push_str(&format!("{:02x}", byte));
        }
    }

    (out.len() == 40).then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "c12fe1c06bba254a9dc9f519b335aa7c1367a88a";

    #[test]
    fn test_extract_hex_hash() {
        let url = format!("magnet:?xt=urn:btih:{}&dn=Some.Show", HEX.to_uppercase());
        assert_eq!(extract_hash_from_url(&url).as_deref(), Some(HEX));
    }

    #[test]
    fn test_extract_base32_hash() {
        // Same hash as HEX, base32 encoded.
        let url = "magnet:?xt=urn:btih:YEX6DQDLXISUVHOJ6UM3GNNKPQJWPKEK&dn=x";
        assert_eq!(extract_hash_from_url(url).as_deref(), Some(HEX));
    }

    #[test]
    fn test_extract_no_hash() {
        assert!(extract_hash_from_url("https://example.com/file.torrent").is_none());
        assert!(extract_hash_from_url("magnet:?xt=urn:btih:tooshort").is_none());
        assert!(extract_hash_from_url("").is_none());
    }

    #[test]
    fn test_normalize_keeps_explicit_hash() {
        let url = format!("magnet:?xt=urn:btih:{}", HEX);
        let mut candidate = CandidateRelease::new("t", url).with_hash("explicit");

        assert_eq!(normalize_hash(&mut candidate), Some("explicit"));
        assert_eq!(candidate.hash.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_normalize_from_url() {
        let url = format!("magnet:?xt=urn:btih:{}", HEX);
        let mut candidate = CandidateRelease::new("t", url);

        assert_eq!(normalize_hash(&mut candidate), Some(HEX));
        assert_eq!(candidate.hash.as_deref(), Some(HEX));
    }

    #[test]
    fn test_normalize_unparsable_url() {
        let mut candidate = CandidateRelease::new("t", "not a magnet");
        assert!(normalize_hash(&mut candidate).is_none());
        assert!(candidate.hash.is_none());
    }

    #[test]
    fn test_collect_hashes_dedup_and_order() {
        let mut candidates = vec![
            CandidateRelease::new("a", "x").with_hash("BBB"),
            CandidateRelease::new("b", format!("magnet:?xt=urn:btih:{}", HEX)),
            CandidateRelease::new("c", "x").with_hash("bbb"),
            CandidateRelease::new("d", "no hash here"),
            CandidateRelease::new("e", format!("magnet:?xt=urn:btih:{}&tr=x", HEX)),
        ];

        let hashes = collect_hashes(&mut candidates);
        assert_eq!(hashes, vec!["bbb".to_string(), HEX.to_string()]);
        assert!(candidates[3].hash.is_none());
        assert_eq!(candidates[4].hash.as_deref(), Some(HEX));
    }
}
