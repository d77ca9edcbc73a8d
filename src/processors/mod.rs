pub mod builder;
pub mod fetcher;

pub use builder::{AmyBuilder, BuildReport};
pub use fetcher::{FetchSummary, Fetcher};
