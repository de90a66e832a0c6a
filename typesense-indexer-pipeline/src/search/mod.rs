//! Search path: query planning, the remote call and result formatting.

mod formatter;
mod links;
mod planner;
mod service;

pub use formatter::{DisplayResult, ResultFormatter, HIGHLIGHT_TAGS};
pub use links::{ItemLinkBuilder, LinkBuilder};
pub use planner::{QueryPlanner, DEFAULT_PER_PAGE, WILDCARD_QUERY};
pub use service::{SearchPayload, SearchService};
