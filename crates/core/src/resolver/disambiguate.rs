//! The link pipeline behind each stream link result.
//!
//! Runs lazily: asks the user to pick a file when the match left more than
//! one option, then unlocks the chosen group and narrows the links.

use std::sync::Arc;

use tracing::{debug, info};

use super::selection::{format_size, Selection, SelectionOption, Selector};
use super::types::{LinkOutcome, ResolveError};
use crate::config::ResolverConfig;
use crate::matcher::{is_archive_file, is_video_file, MatchOutcome, MatchedFile};
use crate::metrics;
use crate::provider::{DebridProvider, FileGroup, UnlockedLink};

pub(super) struct LinkRequest {
    pub provider: Arc<dyn DebridProvider>,
    pub selector: Arc<dyn Selector>,
    pub config: ResolverConfig,
    pub source_url: String,
    pub groups: Vec<FileGroup>,
    pub outcome: MatchOutcome,
    pub is_movie: bool,
}

impl LinkRequest {
    pub async fn run(&self) -> Result<LinkOutcome, ResolveError> {
        let result = self.fetch_links().await;
        let label = match &result {
            Ok(LinkOutcome::Links(_)) => "success",
            Ok(LinkOutcome::Cancelled) => "cancelled",
            Err(_) => "failed",
        };
        metrics::LINK_UNLOCKS.with_label_values(&[label]).inc();
        result
    }

    async fn fetch_links(&self) -> Result<LinkOutcome, ResolveError> {
        let links = match &self.outcome {
            MatchOutcome::NoMatch => return Err(ResolveError::NoLinks),
            MatchOutcome::SingleGroup { group } => self.unlock_group(*group).await?,
            MatchOutcome::SingleFile { group, file } => {
                let links = self.unlock_group(*group).await?;
                narrow_links(links, &file.filename, None)
            }
            MatchOutcome::MultiFile { files, .. } => {
                let labels = files.iter().map(|f| f.filename.clone()).collect();
                let Some(index) = self.choose(labels).await else {
                    return Ok(LinkOutcome::Cancelled);
                };
                let chosen = &files[index];
                info!("Selected {} from group {}", chosen.filename, chosen.group);
                let links = self.unlock_group(chosen.group).await?;
                narrow_links(links, &chosen.filename, None)
            }
            MatchOutcome::AnyGroup => {
                let files = all_video_files(&self.groups);
                let labels = files
                    .iter()
                    .map(|f| format!("{} - {}", f.filename, format_size(f.filesize)))
                    .collect();
                let Some(index) = self.choose(labels).await else {
                    return Ok(LinkOutcome::Cancelled);
                };
                let chosen = &files[index];
                info!("Selected {} from group {}", chosen.filename, chosen.group);
                let links = self.unlock_group(chosen.group).await?;
                narrow_links(links, &chosen.filename, Some(chosen.filesize))
            }
        };

        if links.is_empty() {
            return Err(ResolveError::NoLinks);
        }
        Ok(LinkOutcome::Links(links))
    }

    /// Present `labels` plus a cancel entry. `None` when cancelled.
    async fn choose(&self, labels: Vec<String>) -> Option<usize> {
        let count = labels.len();
        let mut options: Vec<SelectionOption> =
            labels.into_iter().map(SelectionOption::new).collect();
        options.push(SelectionOption::cancel(self.config.cancel_label.clone()));

        let selection = self
            .selector
            .present(&self.config.selection_header, &options)
            .await;

        let chosen = match selection {
            Selection::Chosen(index) if index < count => Some(index),
            _ => None,
        };
        let outcome = if chosen.is_some() { "chosen" } else { "cancelled" };
        metrics::DISAMBIGUATION_PROMPTS
            .with_label_values(&[outcome])
            .inc();
        chosen
    }

    async fn unlock_group(&self, group: usize) -> Result<Vec<UnlockedLink>, ResolveError> {
        let file_ids = self
            .groups
            .get(group)
            .map(FileGroup::file_ids)
            .ok_or_else(|| ResolveError::Internal(format!("no file group {}", group)))?;

        let links = self.provider.unlock(&self.source_url, &file_ids).await?;

        if self.is_movie && needs_full_unlock(&links) {
            debug!(
                "Single non-video link for {}, requesting all files",
                self.source_url
            );
            return self
                .provider
                .unlock(&self.source_url, &[])
                .await
                .map_err(ResolveError::from);
        }
        Ok(links)
    }
}

/// A lone archive or non-video link usually means the real files are bundled.
fn needs_full_unlock(links: &[UnlockedLink]) -> bool {
    match links {
        [only] => is_archive_file(&only.filename) || !is_video_file(&only.filename),
        _ => false,
    }
}

fn all_video_files(groups: &[FileGroup]) -> Vec<MatchedFile> {
    groups
        .iter()
        .enumerate()
        .flat_map(|(index, group)| {
            group.video_files().map(move |file| MatchedFile {
                group: index,
                file_id: file.id.clone(),
                filename: file.filename.clone(),
                filesize: file.filesize,
            })
        })
        .collect()
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Keep the links for `filename` (and `filesize`, when given).
///
/// Falls back to every link when none can be re-matched.
fn narrow_links(
    links: Vec<UnlockedLink>,
    filename: &str,
    filesize: Option<u64>,
) -> Vec<UnlockedLink> {
    let wanted = base_name(filename);
    let matching: Vec<UnlockedLink> = links
        .iter()
        .filter(|link| base_name(&link.filename) == wanted)
        .filter(|link| filesize.map_or(true, |size| link.filesize == size))
        .cloned()
        .collect();

    if matching.is_empty() {
        debug!("No link re-matched {}, keeping all {}", filename, links.len());
        links
    } else {
        matching
    }
}
