//! Record values and SQL text generation.
//!
//! This crate turns loosely-typed field/value mappings into SQL along two
//! paths:
//!
//! - **Parameterized** ([`build_insert`], [`build_update`], [`build_delete`],
//!   [`build_select`]): SQL with `:name` placeholders plus the [`Record`] to
//!   bind. Values never appear in the text.
//! - **Literal** ([`generate_insert_sql`], [`generate_update_sql`],
//!   [`generate_delete_sql`], [`generate_select_sql`]): a self-contained
//!   script with every value inlined by [`format_value`], for logs and
//!   replay.
//!
//! [`TableSpec`] describes a table to create, either structurally or as a
//! raw script.
//!
//! Nothing in this crate performs I/O.
//!
//! # Identifiers are trusted
//!
//! Table and field names are written into the SQL exactly as given. They
//! are never quoted, escaped or validated; only values are protected. Pass
//! only names fixed in code or checked by the caller.
//!
//! # Example
//!
//! ```
//! use recordsql_core::*;
//!
//! let data = Record::new().with("Name", "O'Brien").with("Age", 30);
//!
//! let stmt = build_insert("Users", &data).unwrap();
//! assert_eq!(stmt.sql, "INSERT INTO Users (Name, Age) VALUES (:Name, :Age)");
//!
//! let script = generate_insert_sql("Users", &data).unwrap();
//! assert_eq!(script, "INSERT INTO Users (Name, Age) VALUES (N'O''Brien', 30)");
//!
//! // Unconditional writes are refused.
//! let err = build_delete("Users", &Record::new()).unwrap_err();
//! assert!(err.is_warning());
//! ```

mod error;
mod literal;
mod record;
mod statement;
mod table;
mod value;

pub use error::{Result, StatementError};
pub use literal::{
    format_value, generate_delete_sql, generate_insert_sql, generate_select_sql,
    generate_update_sql, quote_text,
};
pub use record::Record;
pub use statement::{StatementText, build_delete, build_insert, build_select, build_update};
pub use table::{ColumnDef, ColumnType, TableDefinition, TableSpec, generate_create_table_sql};
pub use value::{DATETIME_FORMAT, Value};
