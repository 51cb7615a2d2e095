//! Group selection for a single release.

use super::episode::{anime_episode_matches, episode_code_matches_filename};
use super::types::{MatchOutcome, MatchedFile, MediaTarget, SourceQuery};
use super::video::is_video_file;
use crate::provider::FileGroup;

/// Choose a group from the groups with matching files, in index order.
///
/// Falls back to the first group holding any video file when nothing matched.
pub fn select_group(matched_groups: &[usize], first_video_group: Option<usize>) -> Option<usize> {
    matched_groups.iter().min().copied().or(first_video_group)
}

/// Decide which group and files of a cached release satisfy the query.
pub fn match_groups(query: &SourceQuery, groups: &[FileGroup]) -> MatchOutcome {
    if groups.is_empty() {
        return MatchOutcome::NoMatch;
    }

    let mut group = if query.has_free_text() { None } else { Some(0) };
    let mut matched: Vec<MatchedFile> = Vec::new();

    if query.target.is_episode() {
        let scan = scan_episode(&query.target, groups);
        if scan.files.is_empty() {
            return MatchOutcome::NoMatch;
        }
        group = select_group(&scan.groups, scan.first_video_group);
        matched = scan.files;
    } else if !groups.iter().any(|g| g.video_files().next().is_some()) {
        return MatchOutcome::NoMatch;
    }

    if query.has_free_text() && groups.len() < 2 {
        group = Some(0);
    }

    let Some(group) = group else {
        return MatchOutcome::AnyGroup;
    };

    // Matches from every group stay selectable, not only the chosen group's.
    match matched.len() {
        0 => MatchOutcome::SingleGroup { group },
        1 => {
            let file = matched.remove(0);
            MatchOutcome::SingleFile {
                group: file.group,
                file,
            }
        }
        _ => MatchOutcome::MultiFile {
            group,
            files: matched,
        },
    }
}

struct EpisodeScan {
    groups: Vec<usize>,
    files: Vec<MatchedFile>,
    first_video_group: Option<usize>,
}

fn scan_episode(target: &MediaTarget, groups: &[FileGroup]) -> EpisodeScan {
    let mut scan = EpisodeScan {
        groups: Vec::new(),
        files: Vec::new(),
        first_video_group: None,
    };

    for (index, group) in groups.iter().enumerate() {
        for file in &group.files {
            if !is_video_file(&file.filename) {
                continue;
            }
            if scan.first_video_group.is_none() {
                scan.first_video_group = Some(index);
            }
            if !file_matches(target, &file.filename) {
                continue;
            }
            if !scan.groups.contains(&index) {
                scan.groups.push(index);
            }
            let duplicate = scan
                .files
                .iter()
                .any(|f| f.group == index && f.filename == file.filename);
            if !duplicate {
                scan.files.push(MatchedFile {
                    group: index,
                    file_id: file.id.clone(),
                    filename: file.filename.clone(),
                    filesize: file.filesize,
                });
            }
        }
    }

    scan
}

fn file_matches(target: &MediaTarget, filename: &str) -> bool {
    match target {
        MediaTarget::Movie { .. } => false,
        MediaTarget::StandardEpisode { episode_code, .. } => {
            episode_code_matches_filename(episode_code, filename)
        }
        MediaTarget::AnimeEpisode {
            title,
            absolute_number,
            ..
        } => anime_episode_matches(title, *absolute_number, filename),
    }
}
