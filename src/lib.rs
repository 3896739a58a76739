//! Household appliance digital twin.
//!
//! Projects a day of appliance routines onto a per-minute mode grid, rejects
//! routine sets that conflict or overrun the power ceiling, and recommends
//! cheaper start times under time-of-use tariffs.

pub mod config;
pub mod error;
pub mod io;
pub mod model;
/// State matrix, tariff and optimizer.
pub mod sim;
