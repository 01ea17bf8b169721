pub mod media;
pub mod review;
pub mod user;
pub mod watch_entry;

pub use media::{Genre, GenreCatalog, MediaSummary, TmdbDetails, TmdbGenreList, TmdbSearchResponse};
pub use review::Review;
pub use user::{FollowedUser, PublicUser, Role, SessionIdentity, User, UserProfile};
pub use watch_entry::{MediaKind, WatchEntry, WatchItem, WatchStatus};
