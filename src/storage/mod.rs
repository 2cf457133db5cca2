//! Storage implementations for different backends

#[cfg(feature = "in-memory")]
pub mod in_memory;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod sql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "in-memory")]
pub use in_memory::InMemorySearchableRepository;
#[cfg(feature = "mysql")]
pub use mysql::MysqlSearchableRepository;
pub use sql::{
    BinaryCollation, ColumnOrderRegistry, ColumnOrderStrategy, Dialect, PlainColumn, SqlMapping,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSearchableRepository;
