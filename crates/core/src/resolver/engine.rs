//! The resolver: availability lookup, matching and result construction.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::deferred::DeferredLinks;
use super::disambiguate::LinkRequest;
use super::selection::Selector;
use super::types::{SourceKind, StreamLinkResult};
use crate::config::ResolverConfig;
use crate::matcher::{match_groups, MatchOutcome, SourceQuery};
use crate::metrics;
use crate::provider::{AvailabilityRecord, DebridProvider, FileGroup};
use crate::source::{collect_hashes, CandidateRelease};

/// Turns candidate releases into cached stream link results.
pub struct DebridResolver {
    provider: Arc<dyn DebridProvider>,
    selector: Arc<dyn Selector>,
    config: ResolverConfig,
}

impl DebridResolver {
    pub fn new(
        provider: Arc<dyn DebridProvider>,
        selector: Arc<dyn Selector>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            provider,
            selector,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Query which hashes are cached.
    ///
    /// Never fails: an unconfigured provider or an empty hash list yields an
    /// empty record without a network call, and API errors degrade to an
    /// empty record.
    pub async fn availability(&self, hashes: &[String]) -> AvailabilityRecord {
        if hashes.is_empty() {
            return AvailabilityRecord::new();
        }
        if !self.provider.is_configured().await {
            debug!("{} not configured, skipping availability", self.provider.name());
            return AvailabilityRecord::new();
        }

        let record = match self.provider.instant_availability(hashes).await {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "Availability lookup on {} failed, treating all as uncached: {}",
                    self.provider.name(),
                    e
                );
                AvailabilityRecord::new()
            }
        };

        metrics::AVAILABILITY_HITS
            .with_label_values(&[])
            .observe(record.cached_count() as f64);
        record
    }

    /// Resolve candidates against the provider cache.
    ///
    /// Matched candidates are stamped in place as cached. One result is
    /// returned per matched candidate, in input order. No links are unlocked
    /// here; see [`StreamLinkResult::links`].
    pub async fn resolve(
        &self,
        candidates: &mut [CandidateRelease],
        query: &SourceQuery,
    ) -> Vec<StreamLinkResult> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let hashes = collect_hashes(candidates);
        let record = self.availability(&hashes).await;
        if record.is_empty() {
            debug!("No cached releases among {} hashes", hashes.len());
            return Vec::new();
        }

        let mut results = Vec::new();
        for candidate in candidates.iter_mut() {
            let Some(hash) = candidate.cache_key() else {
                continue;
            };
            let groups = record.groups(&hash);
            if groups.is_empty() {
                continue;
            }

            let outcome = match_groups(query, groups);
            if !outcome.is_match() {
                debug!("No matching files in cached release {}", candidate.title);
                continue;
            }

            candidate.is_cached = true;
            candidate.cached_service = Some(self.config.service_label.clone());

            let result = self.build_result(candidate, &hash, groups.to_vec(), outcome, query);
            results.push(result);
        }

        info!(
            "Resolved {} stream links from {} candidates ({} cached)",
            results.len(),
            candidates.len(),
            record.cached_count()
        );
        metrics::STREAM_LINKS_RESOLVED.inc_by(results.len() as u64);
        results
    }

    fn build_result(
        &self,
        candidate: &CandidateRelease,
        hash: &str,
        groups: Vec<FileGroup>,
        outcome: MatchOutcome,
        query: &SourceQuery,
    ) -> StreamLinkResult {
        let request = Arc::new(LinkRequest {
            provider: self.provider.clone(),
            selector: self.selector.clone(),
            config: self.config.clone(),
            source_url: candidate.url.clone(),
            groups,
            outcome,
            is_movie: query.target.is_movie(),
        });

        let links = DeferredLinks::new(move || {
            let request = request.clone();
            async move { request.run().await }
        });

        StreamLinkResult {
            id: format!("{}-{}", self.config.service_label, hash),
            title: candidate.title.clone(),
            size: candidate.size,
            quality: candidate.quality.clone(),
            kind: SourceKind::CachedTorrent,
            is_package: candidate.is_package,
            service: self.config.service_label.clone(),
            provider: candidate.provider.clone(),
            url: candidate.url.clone(),
            hash: hash.to_string(),
            links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::resolver::LinkOutcome;
    use crate::testing::{fixtures, MockDebridProvider, ScriptedSelector};

    fn resolver(
        provider: Arc<MockDebridProvider>,
        selector: Arc<ScriptedSelector>,
    ) -> DebridResolver {
        DebridResolver::new(provider, selector, ResolverConfig::default())
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let provider = Arc::new(MockDebridProvider::new());
        let r = resolver(provider.clone(), Arc::new(ScriptedSelector::cancelling()));

        let results = r.resolve(&mut [], &SourceQuery::movie("Heat", None)).await;
        assert!(results.is_empty());
        assert_eq!(provider.availability_calls().await.len(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_makes_no_calls() {
        let provider = Arc::new(MockDebridProvider::new());
        provider.set_configured(false);
        let r = resolver(provider.clone(), Arc::new(ScriptedSelector::cancelling()));

        let mut candidates = vec![fixtures::candidate("Heat", fixtures::HASH_A)];
        let results = r.resolve(&mut candidates, &SourceQuery::movie("Heat", None)).await;
        assert!(results.is_empty());
        assert!(provider.availability_calls().await.is_empty());
        assert!(!candidates[0].is_cached);
    }

    #[tokio::test]
    async fn test_candidates_without_hash_are_not_queried() {
        let provider = Arc::new(MockDebridProvider::new());
        let r = resolver(provider.clone(), Arc::new(ScriptedSelector::cancelling()));

        let mut candidates = vec![CandidateRelease::new(
            "Heat",
            "https://example.com/heat.torrent",
        )];
        let results = r.resolve(&mut candidates, &SourceQuery::movie("Heat", None)).await;
        assert!(results.is_empty());
        assert!(provider.availability_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_availability_error_degrades_to_empty() {
        let provider = Arc::new(MockDebridProvider::new());
        provider.fail_availability(ApiError::Timeout).await;
        let r = resolver(provider.clone(), Arc::new(ScriptedSelector::cancelling()));

        let mut candidates = vec![fixtures::candidate("Heat", fixtures::HASH_A)];
        let results = r.resolve(&mut candidates, &SourceQuery::movie("Heat", None)).await;
        assert!(results.is_empty());
        assert_eq!(provider.availability_calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_hashes_queried_once() {
        let provider = Arc::new(MockDebridProvider::new());
        let r = resolver(provider.clone(), Arc::new(ScriptedSelector::cancelling()));

        let mut candidates = vec![
            fixtures::candidate("Heat 1080p", fixtures::HASH_A),
            fixtures::candidate("Heat 1080p (mirror)", fixtures::HASH_A),
        ];
        r.resolve(&mut candidates, &SourceQuery::movie("Heat", None)).await;
        assert_eq!(
            provider.availability_calls().await,
            vec![vec![fixtures::HASH_A.to_string()]]
        );
    }

    #[tokio::test]
    async fn test_movie_result_fields_and_stamping() {
        let provider = Arc::new(MockDebridProvider::new());
        provider
            .set_cached(fixtures::HASH_A, vec![fixtures::group(&[("1", "Heat.1995.mkv", 2_000)])])
            .await;
        provider
            .push_links(vec![fixtures::unlocked_link("Heat.1995.mkv", 2_000)])
            .await;
        let r = resolver(provider.clone(), Arc::new(ScriptedSelector::cancelling()));

        let mut candidates = vec![
            fixtures::candidate("Heat", fixtures::HASH_A).with_quality("1080p"),
            fixtures::candidate("Heat", fixtures::HASH_B),
        ];
        let results = r.resolve(&mut candidates, &SourceQuery::movie("Heat", Some(1995))).await;

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.id, format!("RD-{}", fixtures::HASH_A));
        assert_eq!(result.kind, SourceKind::CachedTorrent);
        assert_eq!(result.service, "RD");
        assert_eq!(result.quality, "1080p");
        assert!(candidates[0].is_cached);
        assert_eq!(candidates[0].cached_service.as_deref(), Some("RD"));
        assert!(!candidates[1].is_cached);

        assert!(provider.unlock_calls().await.is_empty());
        let outcome = result.links.fetch().await.unwrap();
        assert_eq!(outcome.links().len(), 1);
        assert_eq!(provider.unlock_calls().await, vec![vec!["1".to_string()]]);
    }

    #[tokio::test]
    async fn test_movie_archive_retries_with_all_files() {
        let provider = Arc::new(MockDebridProvider::new());
        provider
            .set_cached(
                fixtures::HASH_A,
                vec![
                    fixtures::group(&[("1", "Heat.rar", 2_000)]),
                    fixtures::group(&[("2", "Heat.mkv", 2_000)]),
                ],
            )
            .await;
        provider.push_links(vec![fixtures::unlocked_link("Heat.rar", 2_000)]).await;
        provider
            .push_links(vec![
                fixtures::unlocked_link("Heat.rar", 2_000),
                fixtures::unlocked_link("Heat.mkv", 2_000),
            ])
            .await;
        let r = resolver(provider.clone(), Arc::new(ScriptedSelector::cancelling()));

        let mut candidates = vec![fixtures::candidate("Heat", fixtures::HASH_A)];
        let results = r.resolve(&mut candidates, &SourceQuery::movie("Heat", None)).await;
        let outcome = results[0].links.fetch().await.unwrap();

        assert_eq!(outcome.links().len(), 2);
        assert_eq!(
            provider.unlock_calls().await,
            vec![vec!["1".to_string()], Vec::<String>::new()]
        );
    }

    #[tokio::test]
    async fn test_movie_free_text_presents_every_video_file() {
        let provider = Arc::new(MockDebridProvider::new());
        provider
            .set_cached(
                fixtures::HASH_A,
                vec![
                    fixtures::group(&[
                        ("1", "Heat.720p.mkv", 1_073_741_824),
                        ("9", "Heat.nfo", 10),
                    ]),
                    fixtures::group(&[("2", "Heat.1080p.mkv", 1_610_612_736)]),
                ],
            )
            .await;
        provider
            .push_links(vec![fixtures::unlocked_link("Heat.1080p.mkv", 1_610_612_736)])
            .await;
        let selector = Arc::new(ScriptedSelector::choosing(1));
        let r = resolver(provider.clone(), selector.clone());

        let mut candidates = vec![fixtures::candidate("Heat", fixtures::HASH_A)];
        let query = SourceQuery::movie("Heat", None).with_query("heat 1995");
        let results = r.resolve(&mut candidates, &query).await;
        let outcome = results[0].links.fetch().await.unwrap();

        let prompts = selector.prompts().await;
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].header, "Select a file");
        assert_eq!(
            prompts[0].labels(),
            vec!["Heat.720p.mkv - 1 GB", "Heat.1080p.mkv - 1.5 GB", "Cancel"]
        );
        assert!(prompts[0].options[2].is_cancel);
        assert_eq!(provider.unlock_calls().await, vec![vec!["2".to_string()]]);
        assert_eq!(outcome.links()[0].filename, "Heat.1080p.mkv");
    }

    #[tokio::test]
    async fn test_cancel_completes_without_unlock() {
        let provider = Arc::new(MockDebridProvider::new());
        provider
            .set_cached(
                fixtures::HASH_A,
                vec![
                    fixtures::group(&[("1", "a.mkv", 1)]),
                    fixtures::group(&[("2", "b.mkv", 1)]),
                ],
            )
            .await;
        let r = resolver(provider.clone(), Arc::new(ScriptedSelector::cancelling()));

        let mut candidates = vec![fixtures::candidate("Heat", fixtures::HASH_A)];
        let query = SourceQuery::movie("Heat", None).with_query("heat");
        let results = r.resolve(&mut candidates, &query).await;

        assert_eq!(results[0].links.fetch().await, Ok(LinkOutcome::Cancelled));
        assert!(provider.unlock_calls().await.is_empty());
    }
}
