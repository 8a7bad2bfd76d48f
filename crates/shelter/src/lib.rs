//! Animal shelter catalog with the favorites, sponsorship, comparison, comment and
//! adoption-application ledgers layered on top of it.

pub mod catalog;
pub mod config;
pub mod error;
pub mod telemetry;
