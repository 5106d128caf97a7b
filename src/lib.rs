pub mod barrier;
pub mod error;
pub mod input;
pub mod merge;
pub mod pool;
pub mod sort;

pub use error::*;
pub use sort::*;
