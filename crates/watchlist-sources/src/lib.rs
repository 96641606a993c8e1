pub mod error;
pub mod factory;
pub mod google;
pub mod overseerr;
pub mod tmdb;
pub mod traits;

pub use error::SourceError;
pub use factory::{Collaborators, SourceFactory};
pub use google::GoogleWatchlistScraper;
pub use overseerr::OverseerrClient;
pub use tmdb::{release_year, TmdbClient};
pub use traits::{LookupQuery, LookupResult, MediaRequester, MetadataLookup, TitleSource};
