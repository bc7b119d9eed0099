//! MPQ table structures (hash, block)

mod block;
mod hash;

pub use block::{BlockEntry, BlockTable};
pub use hash::{HashEntry, HashTable};
