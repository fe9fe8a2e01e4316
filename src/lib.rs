/*
 * Cloakwatch - Decloak Alert Relay
 * File Path: src/lib.rs
 * Responsibility: Shared library modules
 */

pub mod alert;
pub mod config;
pub mod dedup;
pub mod filter;
pub mod init;
pub mod listener;
pub mod matcher;
pub mod monitor;
pub mod processor;
pub mod watch;

pub use alert::{Notifier, WebhookPayload, WebhookSink};
pub use config::Config;
pub use monitor::Monitor;
pub use processor::{EventProcessor, Outcome};
