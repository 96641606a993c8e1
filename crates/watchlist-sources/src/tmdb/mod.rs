pub mod api;
pub mod client;

pub use api::{release_year, SearchResponse, SearchResult, POSTER_BASE_URL};
pub use client::{create_tmdb_client, TmdbClient, TMDB_API_BASE};
