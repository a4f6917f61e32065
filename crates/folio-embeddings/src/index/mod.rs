//! In-memory nearest-neighbour index over version embeddings.

pub mod flat;
pub mod similarity;

pub use flat::FlatIndex;
