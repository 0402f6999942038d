pub mod filter;

pub use filter::{ListingFilter, SortOrder};
