//! Mapping from catalog system names to emulator core codes

/// Core used when a system name is not in [`SYSTEM_CORES`]
pub const DEFAULT_CORE: &str = "nes";

/// Catalog system name to runtime core code, matched case-insensitively
pub const SYSTEM_CORES: &[(&str, &str)] = &[
    ("nes", "nes"),
    ("snes", "snes"),
    ("n64", "n64"),
    ("gba", "gba"),
    ("gbc", "gbc"),
    ("gb", "gb"),
    ("genesis", "segaMD"),
    ("sega", "segaMD"),
    ("segacd", "segaCD"),
    ("sega32x", "sega32x"),
    ("psx", "psx"),
    ("ps1", "psx"),
    ("nds", "nds"),
    ("arcade", "arcade"),
    ("mame", "arcade"),
    ("pce", "pce"),
    ("pcengine", "pce"),
];

/// Look up the core code for a system name
pub fn core_for_system(system: &str) -> &'static str {
    let system = system.trim();
    SYSTEM_CORES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(system))
        .map_or(DEFAULT_CORE, |&(_, core)| core)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_systems() {
        assert_eq!(core_for_system("genesis"), "segaMD");
        assert_eq!(core_for_system("ps1"), "psx");
        assert_eq!(core_for_system("MAME"), "arcade");
        assert_eq!(core_for_system("PCEngine"), "pce");
        assert_eq!(core_for_system("SegaCD"), "segaCD");
    }

    #[test]
    fn test_unknown_falls_back() {
        assert_eq!(core_for_system("dreamcast"), DEFAULT_CORE);
        assert_eq!(core_for_system(""), DEFAULT_CORE);
    }

    #[test]
    fn test_table_has_no_duplicate_names() {
        for (i, (name, _)) in SYSTEM_CORES.iter().enumerate() {
            assert!(
                SYSTEM_CORES[i + 1..]
                    .iter()
                    .all(|(other, _)| !other.eq_ignore_ascii_case(name))
            );
        }
    }
}
