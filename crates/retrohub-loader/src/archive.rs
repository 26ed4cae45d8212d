//! ROM extraction from downloaded archives
//!
//! Archives are scanned in central-directory order and the first entry with
//! a ROM extension wins. Nothing is sorted, so an archive holding several
//! ROM images yields whichever the packer wrote first.

use crate::error::ArchiveError;
use bytes::Bytes;
use std::io::{Cursor, Read};

/// File extensions recognized as ROM images (compared case-insensitively)
pub const ROM_EXTENSIONS: &[&str] = &[
    "nes", "sfc", "n64", "gba", "gbc", "gb", "md", "smd", "iso", "bin", "rom",
];

/// Local file header magic that every ZIP archive starts with
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// A ROM image pulled out of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRom {
    /// Entry name inside the archive
    pub name: String,
    pub bytes: Bytes,
}

/// True when `name` ends in one of [`ROM_EXTENSIONS`]
pub fn is_rom_file(name: &str) -> bool {
    if name.ends_with('/') {
        return false;
    }
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        ROM_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
    })
}

/// True when the payload starts with the ZIP local header magic
pub fn is_zip(payload: &[u8]) -> bool {
    payload.starts_with(ZIP_MAGIC)
}

/// Decompress the first ROM entry of a ZIP archive
///
/// The entry may inflate to at most `limit` bytes. The size declared in the
/// archive is checked first, then the read itself is capped since headers
/// can lie.
pub fn extract_rom(payload: &[u8], limit: u64) -> Result<ExtractedRom, ArchiveError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(payload))?;
    let entries = archive.len();

    for index in 0..entries {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() || !is_rom_file(entry.name()) {
            continue;
        }

        let name = entry.name().to_string();
        let declared = entry.size();
        if declared > limit {
            return Err(ArchiveError::TooLarge {
                name,
                size: declared,
                limit,
            });
        }

        let mut data = Vec::with_capacity(declared.min(limit) as usize);
        entry
            .by_ref()
            .take(limit.saturating_add(1))
            .read_to_end(&mut data)
            .map_err(|source| ArchiveError::Read {
                name: name.clone(),
                source,
            })?;
        if data.len() as u64 > limit {
            return Err(ArchiveError::TooLarge {
                name,
                size: data.len() as u64,
                limit,
            });
        }

        tracing::debug!(entry = %name, size = data.len(), "extracted ROM from archive");
        return Ok(ExtractedRom {
            name,
            bytes: Bytes::from(data),
        });
    }

    Err(ArchiveError::NoRomFound { entries })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const LIMIT: u64 = 1024 * 1024;

    /// Build a deflated archive with the given entries, in order
    pub(crate) fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_rom_extensions() {
        for name in ["game.nes", "GAME.NES", "dir/Zelda.Sfc", "a.gb", "b.gbc", "disc.iso"] {
            assert!(is_rom_file(name), "{name} should be a ROM");
        }
        for name in ["save.srm", "readme.txt", "nes", "roms.nes/", "game.nes.txt", "game.nes.bak"] {
            assert!(!is_rom_file(name), "{name} should not be a ROM");
        }
    }

    #[test]
    fn test_first_rom_entry_wins() {
        let zip = build_zip(&[
            ("save.srm", "battery"),
            ("game.nes", "NES\u{1a} first"),
            ("other.gb", "second"),
        ]);

        let rom = extract_rom(&zip, LIMIT).unwrap();
        assert_eq!(rom.name, "game.nes");
        assert_eq!(&rom.bytes[..], b"NES\x1a first");
    }

    #[test]
    fn test_archive_order_not_alphabetical() {
        let zip = build_zip(&[("z-last.sfc", "snes"), ("a-first.nes", "nes")]);
        assert_eq!(extract_rom(&zip, LIMIT).unwrap().name, "z-last.sfc");
    }

    #[test]
    fn test_directories_skipped() {
        let zip = build_zip(&[("roms.nes/", ""), ("roms.nes/mario.nes", "mario")]);
        let rom = extract_rom(&zip, LIMIT).unwrap();
        assert_eq!(rom.name, "roms.nes/mario.nes");
    }

    #[test]
    fn test_no_rom_found() {
        let zip = build_zip(&[("readme.txt", "hi"), ("cover.png", "png")]);
        assert!(matches!(
            extract_rom(&zip, LIMIT),
            Err(ArchiveError::NoRomFound { entries: 2 })
        ));
    }

    #[test]
    fn test_inflated_size_is_capped() {
        let zeros = "0".repeat(64 * 1024);
        let zip = build_zip(&[("bomb.nes", zeros.as_str())]);
        assert!(zip.len() < 4096, "fixture should compress well");

        match extract_rom(&zip, 1000) {
            Err(ArchiveError::TooLarge { name, size, limit }) => {
                assert_eq!(name, "bomb.nes");
                assert_eq!(limit, 1000);
                assert!(size > 1000);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
        assert_eq!(extract_rom(&zip, 64 * 1024).unwrap().bytes.len(), 64 * 1024);
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(
            extract_rom(b"this is not a zip file", LIMIT),
            Err(ArchiveError::Malformed(_))
        ));
    }

    #[test]
    fn test_zip_magic() {
        assert!(is_zip(&build_zip(&[("a.nes", "x")])));
        assert!(!is_zip(b"NES\x1a"));
        assert!(!is_zip(b"PK"));
    }
}
