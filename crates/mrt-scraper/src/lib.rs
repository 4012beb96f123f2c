pub mod client;
pub mod crawl;
pub mod detail;
pub mod error;
pub mod fields;
pub mod listing;
pub mod media;
pub mod page;
pub mod pagination;
pub mod price;
pub(crate) mod rate_limit;
pub mod rules;
pub mod structured;
pub mod title;

pub use client::{Fetch, FlareSolverrClient, HtmlClient};
pub use crawl::{CrawlOptions, CrawlSummary, Crawler, RecordSink};
pub use detail::extract_detail;
pub use error::ScraperError;
pub use fields::{resolve_chain, FieldContext};
pub use listing::extract_listing;
pub use media::infer_media;
pub use page::RawPage;
pub use pagination::{next_page, PaginationState};
pub use price::parse_price;
pub use rate_limit::RequestDelay;
pub use rules::validate_rules;
pub use structured::{extract_structured, StructuredProduct};
pub use title::{normalize_title, NormalizedTitle};
