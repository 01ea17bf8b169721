pub mod tmdb;

pub use tmdb::{enrich_entries, MetadataProvider, TmdbClient};
