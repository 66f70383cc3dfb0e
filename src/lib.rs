//! School vaccination drive service.
//!
//! Registers students, schedules vaccination drives under lead-time and
//! calendar-exclusivity rules, records which students were vaccinated in
//! which drive, and derives dashboard and report views from that ledger.

pub mod config;
pub mod error;
pub mod portal;
pub mod telemetry;
