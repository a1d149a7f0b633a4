pub mod row_store;

pub use row_store::{
    ConcurrencyToken, ConditionalWrite, MemoryRowStore, RowRange, RowStore, StoreResult, StoredRow,
};
