/*
 * Cloakwatch - Decloak Alert Relay
 * File Path: src/filter.rs
 * Responsibility: Line filter. Drops log lines that mention ignored structures.
 */

use crate::config::IgnoreConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreCategory {
    MobileObservatory,
    Stargates,
    Wormholes,
    Stations,
    Citadels,
}

impl IgnoreCategory {
    pub const ALL: [IgnoreCategory; 5] = [
        IgnoreCategory::MobileObservatory,
        IgnoreCategory::Stargates,
        IgnoreCategory::Wormholes,
        IgnoreCategory::Stations,
        IgnoreCategory::Citadels,
    ];

    /// Case-sensitive substrings that put a line in this category.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            IgnoreCategory::MobileObservatory => &["Mobile Observatory"],
            IgnoreCategory::Stargates => &["Stargate"],
            IgnoreCategory::Wormholes => &["Wormhole"],
            IgnoreCategory::Stations => &["Station"],
            IgnoreCategory::Citadels => &["Astrahus", "Fortizar", "Keepstar"],
        }
    }

    pub fn is_enabled(self, ignore: &IgnoreConfig) -> bool {
        match self {
            IgnoreCategory::MobileObservatory => ignore.mobile_observatory,
            IgnoreCategory::Stargates => ignore.stargates,
            IgnoreCategory::Wormholes => ignore.wormholes,
            IgnoreCategory::Stations => ignore.stations,
            IgnoreCategory::Citadels => ignore.citadels,
        }
    }
}

pub fn should_ignore(line: &str, ignore: &IgnoreConfig) -> bool {
    IgnoreCategory::ALL
        .iter()
        .filter(|category| category.is_enabled(ignore))
        .flat_map(|category| category.keywords())
        .any(|keyword| line.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIGGER: &str = "[ 2024.01.01 10:00:00 ] (notify) Your cloak deactivates due to a pulse from a Mobile Observatory.";

    #[test]
    fn test_nothing_enabled_ignores_nothing() {
        let ignore = IgnoreConfig::default();
        assert!(!should_ignore(TRIGGER, &ignore));
        assert!(!should_ignore("Station Stargate Wormhole Keepstar", &ignore));
    }

    #[test]
    fn test_enabled_category_ignores_trigger_lines() {
        let ignore = IgnoreConfig { mobile_observatory: true, ..Default::default() };
        assert!(should_ignore(TRIGGER, &ignore));
        assert!(!should_ignore("[ 2024.01.01 10:00:00 ] Your cloak deactivates", &ignore));
    }

    #[test]
    fn test_each_category_matches_its_keywords() {
        for category in IgnoreCategory::ALL {
            let mut ignore = IgnoreConfig::default();
            match category {
                IgnoreCategory::MobileObservatory => ignore.mobile_observatory = true,
                IgnoreCategory::Stargates => ignore.stargates = true,
                IgnoreCategory::Wormholes => ignore.wormholes = true,
                IgnoreCategory::Stations => ignore.stations = true,
                IgnoreCategory::Citadels => ignore.citadels = true,
            }
            for keyword in category.keywords() {
                let line = format!("near the {} Your cloak deactivates", keyword);
                assert!(should_ignore(&line, &ignore), "{:?} should match {}", category, keyword);
            }
        }
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let ignore = IgnoreConfig { stations: true, wormholes: true, ..Default::default() };
        assert!(!should_ignore("station wormhole", &ignore));
        assert!(should_ignore("Jita IV - Moon 4 Station", &ignore));
    }

    #[test]
    fn test_citadel_names() {
        let ignore = IgnoreConfig { citadels: true, ..Default::default() };
        assert!(should_ignore("undocking from Palatine Keepstar", &ignore));
        assert!(should_ignore("Fortizar nearby", &ignore));
        assert!(!should_ignore("Raitaru nearby", &ignore));
    }
}
