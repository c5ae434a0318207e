//! Core logic for the `bookstamp` CLI: version record handling, the
//! HTML table append routine, and the Bookstack page API client.

pub mod bookstack;
pub mod config;
pub mod stamp;
pub mod table;
pub mod version;
