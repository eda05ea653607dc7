//! Client-side state machine for a paginated, filterable catalog collection.
//!
//! [`CatalogStore`] owns the filter, sort and collection partitions. A fetch snapshots the first
//! two plus the current page, queries an injected [`CatalogQueryPort`], and folds the outcome back
//! into [`CollectionState`].

pub mod collection;
pub mod criteria;
pub mod error;
pub mod http;
pub mod port;
pub mod settings;
pub mod store;

pub use collection::{page_count_for, CollectionState, FetchStatus};
pub use criteria::{CriteriaSnapshot, FilterState, SelectedFilters, SortState};
pub use error::{CatalogHttpError, SettingsError};
pub use http::HttpCatalogPort;
pub use port::{CatalogEnvelope, CatalogQueryPort, MissingCatalogQueryPort};
pub use settings::{load_settings, CatalogSettings, ResolutionPolicy};
pub use store::{
    CatalogEvent, CatalogState, CatalogStore, FetchOutcome, PendingFetch, RequestId,
};

/// Items per catalog page. Used for the page-count derivation and as the request page limit.
pub const PAGE_SIZE: u64 = 16;
