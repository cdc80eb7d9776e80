//! `querydrop-source`: one connection, one query, one [`ResultSet`].
//!
//! | Scheme                          | Driver     |
//! |---------------------------------|------------|
//! | `sqlite:`                       | `rusqlite` |
//! | `postgres://`, `postgresql://`  | `postgres` |
//!
//! [`ResultSet`]: querydrop_core::ResultSet

pub mod connection;
pub mod error;
mod pg;
mod sqlite;

pub use connection::{connect, fetch_once, Backend, Connection};
pub use error::{Result, SourceError};
