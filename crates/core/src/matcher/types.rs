//! Types describing what is being looked for and what matched.

use serde::{Deserialize, Serialize};

/// The media a set of releases should satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaTarget {
    Movie {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        year: Option<u32>,
    },
    StandardEpisode {
        /// Show title.
        title: String,
        /// Structured code, e.g. "S02E05".
        episode_code: String,
    },
    AnimeEpisode {
        /// Show title.
        title: String,
        episode_code: String,
        /// Episode number counted across all seasons.
        absolute_number: u32,
    },
}

impl MediaTarget {
    pub fn is_movie(&self) -> bool {
        matches!(self, MediaTarget::Movie { .. })
    }

    pub fn is_episode(&self) -> bool {
        !self.is_movie()
    }

    /// Code used to recognise the episode in filenames.
    ///
    /// Anime releases are numbered absolutely, so the absolute number is used.
    pub fn episode_code(&self) -> Option<String> {
        match self {
            MediaTarget::Movie { .. } => None,
            MediaTarget::StandardEpisode { episode_code, .. } => Some(episode_code.clone()),
            MediaTarget::AnimeEpisode {
                absolute_number, ..
            } => Some(absolute_number.to_string()),
        }
    }
}

/// A resolution request: the target plus an optional free-text override.
///
/// When `query` is set the user searched by hand, so group selection is left
/// open unless the release has a single cached group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceQuery {
    pub target: MediaTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl SourceQuery {
    pub fn movie(title: impl Into<String>, year: Option<u32>) -> Self {
        Self {
            target: MediaTarget::Movie {
                title: title.into(),
                year,
            },
            query: None,
        }
    }

    pub fn episode(title: impl Into<String>, episode_code: impl Into<String>) -> Self {
        Self {
            target: MediaTarget::StandardEpisode {
                title: title.into(),
                episode_code: episode_code.into(),
            },
            query: None,
        }
    }

    pub fn anime_episode(
        title: impl Into<String>,
        episode_code: impl Into<String>,
        absolute_number: u32,
    ) -> Self {
        Self {
            target: MediaTarget::AnimeEpisode {
                title: title.into(),
                episode_code: episode_code.into(),
                absolute_number,
            },
            query: None,
        }
    }

    /// Set a free-text query override. Blank text is ignored.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.trim().is_empty()).then_some(query);
        self
    }

    pub fn has_free_text(&self) -> bool {
        self.query.is_some()
    }
}

/// A cached file that satisfied the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    pub group: usize,
    pub file_id: String,
    pub filename: String,
    pub filesize: u64,
}

/// Matching decision for one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Nothing usable; the release is dropped.
    NoMatch,
    /// A group was chosen without file-level matching.
    SingleGroup { group: usize },
    /// Exactly one matching file; `group` is the group holding it.
    SingleFile { group: usize, file: MatchedFile },
    /// Several matching files, possibly across groups; one must be picked.
    ///
    /// `group` is the first group with a match. Each file carries its own group.
    MultiFile { group: usize, files: Vec<MatchedFile> },
    /// No group chosen; every video file of every group is a candidate.
    AnyGroup,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchOutcome::NoMatch)
    }

    /// The chosen group, if one was resolved.
    pub fn group(&self) -> Option<usize> {
        match self {
            MatchOutcome::SingleGroup { group }
            | MatchOutcome::SingleFile { group, .. }
            | MatchOutcome::MultiFile { group, .. } => Some(*group),
            MatchOutcome::NoMatch | MatchOutcome::AnyGroup => None,
        }
    }

    /// Whether fetching links will ask for a choice.
    pub fn needs_disambiguation(&self) -> bool {
        matches!(self, MatchOutcome::MultiFile { .. } | MatchOutcome::AnyGroup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_code_per_variant() {
        assert_eq!(SourceQuery::movie("Heat", Some(1995)).target.episode_code(), None);
        assert_eq!(
            SourceQuery::episode("Show", "S02E05").target.episode_code(),
            Some("S02E05".to_string())
        );
        assert_eq!(
            SourceQuery::anime_episode("One Piece", "S01E10", 1010)
                .target
                .episode_code(),
            Some("1010".to_string())
        );
    }

    #[test]
    fn test_blank_query_ignored() {
        assert!(!SourceQuery::movie("Heat", None).with_query("  ").has_free_text());
        assert!(SourceQuery::movie("Heat", None).with_query("heat 1995").has_free_text());
    }

    #[test]
    fn test_target_serde_tagged() {
        let json = r#"{"kind": "anime_episode", "title": "Naruto", "episode_code": "S01E01", "absolute_number": 1}"#;
        let target: MediaTarget = serde_json::from_str(json).unwrap();
        assert!(target.is_episode());
        assert_eq!(target.episode_code(), Some("1".to_string()));
    }

    #[test]
    fn test_outcome_group() {
        assert_eq!(MatchOutcome::SingleGroup { group: 3 }.group(), Some(3));
        assert_eq!(MatchOutcome::AnyGroup.group(), None);
        assert!(MatchOutcome::AnyGroup.needs_disambiguation());
        assert!(!MatchOutcome::NoMatch.is_match());
    }
}
