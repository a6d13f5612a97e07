//! Despertar - CPU wakeup attribution engine
//!
//! This library correlates two independently-timed streams, "the CPU woke up
//! at T for reason R" and "subsystem S did work at T' for uids U", into a
//! best-effort mapping from each wakeup to the subsystems and uids that caused
//! it, using a bounded time window and bounded-retention histories.

pub mod activity_history;
pub mod attribution_table;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod reason_parser;
pub mod replay;
pub mod subsystem;
pub mod timeline;
pub mod wakeup_log;
