pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::MemoryRowStore;
pub use r#trait::{ConcurrencyToken, ConditionalWrite, RowRange, RowStore, StoreResult, StoredRow};

#[cfg(test)]
mod tests;
