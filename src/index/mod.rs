pub mod build;
pub mod concurrent;
pub mod inverted;
pub mod types;
pub mod writer;

pub use build::{build, build_concurrent, BuildSummary, TextFilter};
pub use concurrent::ConcurrentIndex;
pub use inverted::InvertedIndex;
pub use types::*;
pub use writer::QueryResults;
