//! Weighting applied to endpoints before selection.

pub mod warmup;

pub use warmup::{WarmupEngine, WarmupWindow};
