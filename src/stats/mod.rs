//! Statistical primitives shared across the association pipeline.

pub mod fisher;
pub mod pearson;
pub mod rng;

pub use fisher::fisher_exact;
pub use pearson::pearson;
pub use rng::XorShiftRng;
