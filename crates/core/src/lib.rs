pub mod api;
pub mod config;
pub mod matcher;
pub mod metrics;
pub mod provider;
pub mod resolver;
pub mod source;
pub mod testing;

pub use api::{
    ApiClient, ApiError, AuthContext, CredentialRefresher, HttpTransport, ReqwestTransport,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AllDebridConfig, Config, ConfigError,
    RealDebridConfig, ResolverConfig, SanitizedConfig,
};
pub use matcher::{MatchOutcome, MediaTarget, SourceQuery};
pub use provider::{
    AllDebridClient, AvailabilityRecord, DebridProvider, MagnetStatusFilter, RealDebridProvider,
    UnlockedLink,
};
pub use resolver::{
    DebridResolver, DeferredLinks, LinkOutcome, ResolveError, Selection, SelectionOption,
    Selector, StreamLinkResult,
};
pub use source::{collect_hashes, normalize_hash, CandidateRelease};
