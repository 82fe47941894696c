//! Token counting adapters.

mod approximate;

pub use approximate::ApproximateTokenCounter;
