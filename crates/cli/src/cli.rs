//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use debridlink_core::{MagnetStatusFilter, SourceQuery};

/// debridlink - resolve torrent releases against a debrid cache
#[derive(Parser, Debug)]
#[command(
    name = "debridlink",
    version,
    about = "Resolve torrent releases against a debrid cache",
    after_help = "EXAMPLES:\n\
                  debridlink resolve -i releases.json --movie \"Heat\" --year 1995\n\
                  debridlink resolve -i releases.json --episode S02E05 --title \"Show\" --play 1\n\
                  debridlink magnet-status --status ready"
)]
pub struct Cli {
    /// Path to config file (defaults to $DEBRIDLINK_CONFIG or config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve candidate releases to cached stream links
    Resolve(ResolveCmd),

    /// Show AllDebrid magnet status
    MagnetStatus(MagnetStatusCmd),
}

/// Resolve candidates read from a JSON file
#[derive(Args, Debug)]
pub struct ResolveCmd {
    /// JSON file holding an array of candidate releases
    #[arg(long = "candidates", short = 'i')]
    pub candidates: PathBuf,

    /// Movie title
    #[arg(long, conflicts_with = "episode")]
    pub movie: Option<String>,

    /// Movie release year
    #[arg(long, requires = "movie")]
    pub year: Option<u32>,

    /// Episode code, e.g. S02E05
    #[arg(long, requires = "title")]
    pub episode: Option<String>,

    /// Show title
    #[arg(long)]
    pub title: Option<String>,

    /// Match by show title and absolute episode number
    #[arg(long, requires_all = ["episode", "absolute"])]
    pub anime: bool,

    /// Absolute episode number
    #[arg(long)]
    pub absolute: Option<u32>,

    /// Free-text query the candidates were found with
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Fetch links for the result at this position (1-based)
    #[arg(long, short = 'p')]
    pub play: Option<usize>,

    /// Print metrics after resolving
    #[arg(long)]
    pub metrics: bool,
}

impl ResolveCmd {
    /// Build the query from the flags. `None` when no target was given.
    pub fn source_query(&self) -> Option<SourceQuery> {
        let query = match (&self.movie, &self.episode) {
            (Some(title), _) => SourceQuery::movie(title.clone(), self.year),
            (None, Some(code)) => {
                let title = self.title.clone().unwrap_or_default();
                match (self.anime, self.absolute) {
                    (true, Some(absolute)) => {
                        SourceQuery::anime_episode(title, code.clone(), absolute)
                    }
                    _ => SourceQuery::episode(title, code.clone()),
                }
            }
            (None, None) => return None,
        };

        Some(match &self.query {
            Some(text) => query.with_query(text.clone()),
            None => query,
        })
    }
}

/// Query AllDebrid magnet status
#[derive(Args, Debug)]
pub struct MagnetStatusCmd {
    /// Magnet id
    #[arg(long)]
    pub id: Option<String>,

    /// Filter by status (active, ready, expired, error)
    #[arg(long)]
    pub status: Option<MagnetStatusFilter>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use debridlink_core::MediaTarget;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("debridlink").chain(args.iter().copied()))
    }

    fn resolve(args: &[&str]) -> ResolveCmd {
        match parse(args).unwrap().command {
            Command::Resolve(cmd) => cmd,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_movie_query() {
        let cmd = resolve(&["resolve", "-i", "c.json", "--movie", "Heat", "--year", "1995"]);
        let query = cmd.source_query().unwrap();
        assert_eq!(
            query.target,
            MediaTarget::Movie {
                title: "Heat".to_string(),
                year: Some(1995)
            }
        );
        assert!(query.query.is_none());
    }

    #[test]
    fn test_episode_query_with_text() {
        let cmd = resolve(&[
            "resolve", "-i", "c.json", "--episode", "S02E05", "--title", "Show", "-q", "show s02",
        ]);
        let query = cmd.source_query().unwrap();
        assert_eq!(query.target.episode_code(), Some("S02E05".to_string()));
        assert_eq!(query.query.as_deref(), Some("show s02"));
    }

    #[test]
    fn test_anime_query() {
        let cmd = resolve(&[
            "resolve", "-i", "c.json", "--episode", "S21E118", "--title", "One Piece", "--anime",
            "--absolute", "1010",
        ]);
        let query = cmd.source_query().unwrap();
        assert_eq!(query.target.episode_code(), Some("1010".to_string()));
    }

    #[test]
    fn test_anime_requires_absolute() {
        assert!(parse(&[
            "resolve", "-i", "c.json", "--episode", "S01E01", "--title", "X", "--anime",
        ])
        .is_err());
    }

    #[test]
    fn test_movie_and_episode_conflict() {
        assert!(parse(&[
            "resolve", "-i", "c.json", "--movie", "Heat", "--episode", "S01E01", "--title", "X",
        ])
        .is_err());
    }

    #[test]
    fn test_no_target() {
        let cmd = resolve(&["resolve", "-i", "c.json"]);
        assert!(cmd.source_query().is_none());
    }

    #[test]
    fn test_magnet_status() {
        match parse(&["magnet-status", "--status", "ready"]).unwrap().command {
            Command::MagnetStatus(cmd) => {
                assert_eq!(cmd.status, Some(MagnetStatusFilter::Ready));
                assert!(cmd.id.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(parse(&["magnet-status", "--status", "paused"]).is_err());
    }
}
