pub mod error;
pub mod extractor;
pub mod fan_out;
pub mod fetcher;
pub mod layout;
pub mod registry;
pub mod sites;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{Result, ScrapeError};
pub use extractor::{ArticleExtractor, SiteExtractor};
pub use fan_out::scrape_all;
pub use fetcher::{HttpPageFetcher, PageFetcher, USER_AGENT};
pub use layout::{ExtractedPage, SiteLayout, NO_BODY, NO_HEADING};
pub use registry::SourceRegistry;
