pub mod browser;
pub mod browser_manager;
pub mod http;
pub mod listing;
pub mod page;

pub use browser::BrowserListing;
pub use http::HttpListing;
pub use listing::ListingDocument;
pub use page::{ListingPage, ListingSource};
