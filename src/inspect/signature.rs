// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Produces libmagic-style descriptions of files, e.g. `ELF 64-bit LSB shared object, x86-64`.

use std::fs;
use std::io::Read;
use std::path::Path;

use super::elf::{Elf, ElfType};
use super::{InspectError, InspectResult};

const AR_MAGIC: &[u8] = b"!<arch>\n";
const LIBTOOL_MARKER: &str = "a libtool library file";

/// How much of a file is sampled to decide between text and data.
const SAMPLE_SIZE: u64 = 8192;

/// Describe the file at `path` without following symlinks.
///
/// # Errors
/// Returns an error if the file metadata or contents cannot be read.
pub fn describe(path: &Path) -> InspectResult<String> {
    let metadata = fs::symlink_metadata(path).map_err(|e| InspectError::OpenFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    if metadata.file_type().is_symlink() {
        let target = fs::read_link(path).map_err(|e| InspectError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        return Ok(format!("symbolic link to {}", target.display()));
    }
    if metadata.is_dir() {
        return Ok("directory".to_string());
    }
    if metadata.len() == 0 {
        return Ok("empty".to_string());
    }

    let sample = read_sample(path)?;
    if sample.starts_with(&super::elf::ELF_MAGIC) {
        return Ok(match Elf::from_path(path) {
            Ok(elf) => describe_elf(&elf),
            Err(_) => "ELF, corrupted".to_string(),
        });
    }
    if sample.starts_with(AR_MAGIC) {
        return Ok("current ar archive".to_string());
    }
    Ok(describe_text(&sample))
}

fn read_sample(path: &Path) -> InspectResult<Vec<u8>> {
    let file = fs::File::open(path).map_err(|e| InspectError::OpenFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut sample = Vec::new();
    file.take(SAMPLE_SIZE)
        .read_to_end(&mut sample)
        .map_err(|e| InspectError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(sample)
}

fn describe_elf(elf: &Elf) -> String {
    let kind = match elf.kind() {
        ElfType::None => "no file type",
        ElfType::Relocatable => "relocatable",
        ElfType::Executable => "executable",
        ElfType::SharedObject => "shared object",
        ElfType::PieExecutable => "pie executable",
        ElfType::Core => "core file",
    };
    format!(
        "ELF {}-bit {} {}, {}, version 1 (SYSV)",
        elf.class().bits(),
        if elf.little_endian() { "LSB" } else { "MSB" },
        kind,
        machine_name(elf.machine()),
    )
}

fn machine_name(machine: u16) -> &'static str {
    use goblin::elf::header::{EM_386, EM_AARCH64, EM_ARM, EM_PPC64, EM_RISCV, EM_X86_64};
    match machine {
        EM_X86_64 => "x86-64",
        EM_386 => "Intel 80386",
        EM_AARCH64 => "ARM aarch64",
        EM_ARM => "ARM",
        EM_PPC64 => "64-bit PowerPC or cisco 7500",
        EM_RISCV => "UCB RISC-V",
        _ => "unknown arch",
    }
}

fn describe_text(sample: &[u8]) -> String {
    let is_text_byte = |b: &u8| b.is_ascii_graphic() || matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c);
    let encoding = if sample.iter().all(is_text_byte) {
        "ASCII text"
    } else {
        match std::str::from_utf8(sample) {
            Ok(text) if !text.chars().any(|c| c.is_control() && !c.is_whitespace()) => {
                "Unicode text, UTF-8 text"
            }
            _ => return "data".to_string(),
        }
    };
    let first_line = sample.split(|b| *b == b'\n').next().unwrap_or_default();
    if first_line.starts_with(b"#") && String::from_utf8_lossy(first_line).contains(LIBTOOL_MARKER) {
        return format!("libtool library file, {encoding}");
    }
    encoding.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_ascii_text() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "System.map-6.6.7", b"ffffffff81000000 T _text\n");
        assert_eq!(describe(&path).unwrap(), "ASCII text");
    }

    #[test]
    fn test_libtool_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "libz.la",
            b"# libz.la - a libtool library file\n# Generated by libtool\ndlname='libz.so.1'\n",
        );
        assert_eq!(describe(&path).unwrap(), "libtool library file, ASCII text");
    }

    #[test]
    fn test_ar_archive() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "libz.a", b"!<arch>\n/               0           0     0     0       4         `\n");
        assert_eq!(describe(&path).unwrap(), "current ar archive");
    }

    #[test]
    fn test_symlink_not_followed() {
        let dir = TempDir::new().unwrap();
        write(&dir, "libz.so.1", b"text\n");
        let link = dir.path().join("libz.so");
        symlink("libz.so.1", &link).unwrap();
        assert_eq!(describe(&link).unwrap(), "symbolic link to libz.so.1");
    }

    #[test]
    fn test_directory_and_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(describe(dir.path()).unwrap(), "directory");
        let path = write(&dir, "empty", b"");
        assert_eq!(describe(&path).unwrap(), "empty");
    }

    #[test]
    fn test_binary_data() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "blob", &[0x00, 0xff, 0xfe, 0x01]);
        assert_eq!(describe(&path).unwrap(), "data");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            describe(Path::new("/nonexistent/file")),
            Err(InspectError::OpenFailed { .. })
        ));
    }

    #[test]
    fn test_shared_object_fixture() {
        let path = std::path::PathBuf::from(env!("OUT_DIR")).join("fixtures/libhello.so.1");
        if !path.exists() {
            eprintln!("Skipping test: fixture {} not found (requires gcc)", path.display());
            return;
        }
        let signature = describe(&path).unwrap();
        assert!(
            signature.contains("-bit LSB shared object,"),
            "unexpected signature: {signature}"
        );
    }
}
