/*
 * Cloakwatch - Decloak Alert Relay
 * File Path: src/listener.rs
 * Responsibility: Find the character a game log belongs to.
 */

use once_cell::sync::Lazy;
use regex::Regex;

static LISTENER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Listener: (.+)").expect("valid listener regex"));

/// First `Listener: <name>` in file order. The header sits near the top of
/// each log, so later declarations never override it. A blank first
/// declaration leaves the file unresolved.
pub fn resolve_listener<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    let name = lines
        .iter()
        .find_map(|line| LISTENER_RE.captures(AsRef::<str>::as_ref(line)).and_then(|caps| caps.get(1)))?
        .as_str()
        .trim();
    if name.is_empty() { None } else { Some(name.to_string()) }
}
