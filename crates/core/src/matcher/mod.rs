//! Matching cached file groups against a movie or episode.
//!
//! Pure functions only: given what the provider has cached for one release,
//! decide which group (and which files within it) satisfy the request.

mod episode;
mod selection;
mod types;
mod video;

pub use episode::{anime_episode_matches, episode_code_matches_filename, parse_episode_code};
pub use selection::{match_groups, select_group};
pub use types::*;
pub use video::{file_extension, is_archive_file, is_video_file};
