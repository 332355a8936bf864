mod db;
pub mod models;
mod revoked;
mod sessions;
mod tables;
mod users;

pub use db::{Database, DatabaseError};
