pub mod ids;

pub use ids::{DEFAULT_TOC_ID, NodeId, TocId};
