//! Index Layer (spec.md §4.4): multi-index candidate generation ahead of
//! the Pattern Matcher.

pub mod bloom_index;
pub mod index_layer;
pub mod inverted_index;
pub mod length_index;
pub mod ngram_index;
pub mod rolling_hash;

pub use index_layer::IndexLayer;

pub mod prelude {
    pub use crate::bloom_index::BloomIndex;
    pub use crate::index_layer::IndexLayer;
    pub use crate::inverted_index::InvertedIndex;
    pub use crate::length_index::LengthIndex;
    pub use crate::ngram_index::{NGramHit, NGramIndex};
    pub use crate::rolling_hash;
}
