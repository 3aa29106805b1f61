//! Analysis Engine
//!
//! Pipeline: `parser` (or `store`) builds counter snapshots → `link` and
//! `anomaly` classify each one into a finished record → `filter` serves
//! queries over the collection. `worker` drives reloads on a single
//! background writer.

pub mod anomaly;
pub mod filter;
pub mod link;
pub mod parser;
pub mod snapshot;
pub mod store;
pub mod worker;
