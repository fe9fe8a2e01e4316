/*
 * Cloakwatch - Decloak Alert Relay
 * File Path: src/matcher.rs
 * Responsibility: Recognise decloak lines and derive their dedup key.
 */

use crate::config::{IgnoreConfig, UntimestampedPolicy};
use crate::filter::should_ignore;
use once_cell::sync::Lazy;
use regex::Regex;

pub const DECLOAK_PATTERN: &str = "Your cloak deactivates";

static DECLOAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&regex::escape(DECLOAK_PATTERN)).expect("valid decloak regex"));
static TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[ ([^\]]+) \]").expect("valid timestamp regex"));

/// A decloak line found in a log, with its leading timestamp if it had one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerLine {
    pub line: String,
    pub timestamp: Option<String>,
}

impl TriggerLine {
    /// Key for `DedupState`. `None` means the detection is never deduplicated.
    pub fn dedup_key(&self, policy: UntimestampedPolicy) -> Option<String> {
        match (&self.timestamp, policy) {
            (Some(ts), _) => Some(ts.clone()),
            (None, UntimestampedPolicy::DedupByLine) => Some(self.line.trim().to_string()),
            (None, UntimestampedPolicy::AlwaysNotify) => None,
        }
    }
}

/// `None` when the line is not a decloak line. Otherwise the inner text of a
/// leading `[ ... ]` token, if any.
pub fn match_event(line: &str) -> Option<Option<String>> {
    if !DECLOAK_RE.is_match(line) {
        return None;
    }
    Some(extract_timestamp(line))
}

pub fn extract_timestamp(line: &str) -> Option<String> {
    TIMESTAMP_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Newest unfiltered decloak line, scanning from the end of the file.
pub fn find_latest_trigger<S: AsRef<str>>(lines: &[S], ignore: &IgnoreConfig) -> Option<TriggerLine> {
    for line in lines.iter().rev() {
        let line: &str = line.as_ref();
        if should_ignore(line, ignore) {
            continue;
        }
        if let Some(timestamp) = match_event(line) {
            return Some(TriggerLine {
                line: line.to_string(),
                timestamp,
            });
        }
    }
    None
}
