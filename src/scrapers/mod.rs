pub mod browser;
pub mod detail;
pub mod http;
pub mod listing;
pub mod selectors;
pub mod storefront;
pub mod traits;
pub mod types;

pub use browser::ChromePageLoader;
pub use http::HttpPageLoader;
pub use listing::{CategoryCounter, ListingLink, ListingWalker};
pub use storefront::Storefront;
pub use traits::{DetailSource, ListingSource, PageLoader, ReviewSource};
