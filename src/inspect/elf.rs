// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Parses ELF files to extract the dynamic section (`NEEDED`, `RPATH`, `RUNPATH`, `SONAME`),
//! the GNU build-id note and the kernel module `vermagic`. Uses the `goblin` crate for ELF parsing.

use goblin::elf::Elf as GoblinElf;
use path_clean::PathClean;
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{InspectError, InspectResult};

// ELF magic bytes: 0x7f followed by ASCII "ELF"
// Defined in the ELF specification: e_ident[EI_MAG0..EI_MAG3]
pub(crate) const ELF_MAGIC: [u8; 4] = [0x7f, 0x45, 0x4c, 0x46];

/// Smallest possible ELF header (32-bit class).
const MIN_ELF_SIZE: u64 = 52;

/// ELF object type (wrapper around `goblin::elf::header::e_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElfType {
    None,
    Relocatable,
    Executable,
    SharedObject,
    PieExecutable,
    Core,
}

/// ELF class, i.e. the word size of the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElfClass {
    Elf32,
    Elf64,
}

impl ElfClass {
    #[must_use]
    pub fn bits(self) -> u8 {
        match self {
            Self::Elf32 => 32,
            Self::Elf64 => 64,
        }
    }
}

/// Parsed ELF file information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Elf {
    class: ElfClass,
    little_endian: bool,
    machine: u16,
    kind: ElfType,
    dependencies: Vec<String>,
    rpath: Vec<String>,
    runpath: Vec<String>,
    soname: Option<String>,
    build_id: Option<String>,
    vermagic: Option<String>,
}

impl Elf {
    /// Check whether the file starts with the ELF magic bytes.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub(crate) fn has_magic(path: &Path) -> InspectResult<bool> {
        let mut file = fs::File::open(path).map_err(|e| InspectError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut magic = [0u8; 4];
        match file.read_exact(&mut magic) {
            Ok(()) => Ok(magic == ELF_MAGIC),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(InspectError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Parse an ELF file from a path.
    ///
    /// # Errors
    /// Returns an error if the file is not an ELF file or cannot be parsed.
    pub fn from_path(path: &Path) -> InspectResult<Self> {
        let bytes = Self::read(path)?;
        Self::parse(path, &bytes)
    }

    #[must_use]
    pub fn class(&self) -> ElfClass {
        self.class
    }

    #[must_use]
    pub fn little_endian(&self) -> bool {
        self.little_endian
    }

    #[must_use]
    pub fn machine(&self) -> u16 {
        self.machine
    }

    /// Get the ELF file type (executable, shared object, etc.).
    #[must_use]
    pub fn kind(&self) -> ElfType {
        self.kind
    }

    /// Get the list of dynamic dependencies (`DT_NEEDED` entries).
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Get the RPATH entries from the ELF file.
    #[must_use]
    pub fn rpath(&self) -> &[String] {
        &self.rpath
    }

    /// Get the RUNPATH entries from the ELF file.
    #[must_use]
    pub fn runpath(&self) -> &[String] {
        &self.runpath
    }

    /// Get the `DT_SONAME` entry, if any.
    #[must_use]
    pub fn soname(&self) -> Option<&str> {
        self.soname.as_deref()
    }

    /// Get the hex encoded `NT_GNU_BUILD_ID` note, if any.
    #[must_use]
    pub fn build_id(&self) -> Option<&str> {
        self.build_id.as_deref()
    }

    /// Get the raw `vermagic` value of the `.modinfo` section (kernel modules only).
    #[must_use]
    pub fn vermagic(&self) -> Option<&str> {
        self.vermagic.as_deref()
    }

    /// Normalize RPATH and RUNPATH entries into absolute directory paths.
    ///
    /// `$ORIGIN` (or `${ORIGIN}`) is replaced with `origin`, the directory holding the binary.
    /// Relative entries without `$ORIGIN` depend on the working directory of the process and
    /// are dropped. Both lists are kept (in `RPATH`, `RUNPATH` order) as both end up in the
    /// library search path of the package.
    #[must_use]
    pub(crate) fn normalize_paths(&self, origin: &Path) -> Vec<PathBuf> {
        self.rpath
            .iter()
            .chain(self.runpath.iter())
            .filter_map(|path| Self::normalize_path(origin, path))
            .collect()
    }

    fn normalize_path(origin: &Path, path: &str) -> Option<PathBuf> {
        // The patterns $ORIGIN and ${ORIGIN} are mutually exclusive (different chars after $).
        let resolved = if path.contains("${ORIGIN}") {
            path.replace("${ORIGIN}", &origin.to_string_lossy())
        } else if path.contains("$ORIGIN") {
            path.replace("$ORIGIN", &origin.to_string_lossy())
        } else {
            path.to_string()
        };

        if resolved.starts_with('/') {
            return Some(PathBuf::from(resolved).clean());
        }
        None
    }

    /// Reads the entire file at path into bytes if the file is an ELF file.
    fn read(path: &Path) -> InspectResult<Vec<u8>> {
        let metadata = fs::metadata(path).map_err(|e| InspectError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        if metadata.len() < MIN_ELF_SIZE {
            return Err(InspectError::FileTooSmall {
                path: path.to_path_buf(),
            });
        }
        if !Self::has_magic(path)? {
            return Err(InspectError::NotElfFile {
                path: path.to_path_buf(),
            });
        }
        // goblin requires the full file, but we've at least filtered out non-ELF files
        fs::read(path).map_err(|e| InspectError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn parse(path: &Path, bytes: &[u8]) -> InspectResult<Self> {
        let elf = GoblinElf::parse(bytes).map_err(|e| InspectError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut dependencies = Vec::new();
        let mut rpath = Vec::new();
        let mut runpath = Vec::new();
        let mut soname = None;
        let mut pie = false;

        if let Some(dynamic) = &elf.dynamic {
            pie = dynamic.info.flags_1 & goblin::elf::dynamic::DF_1_PIE != 0;
            for dyn_entry in &dynamic.dyns {
                let Ok(strtab_idx) = usize::try_from(dyn_entry.d_val) else {
                    continue;
                };
                match dyn_entry.d_tag {
                    goblin::elf::dynamic::DT_NEEDED => {
                        if let Some(dep_name) = elf.dynstrtab.get_at(strtab_idx) {
                            dependencies.push(dep_name.to_string());
                        }
                    }
                    goblin::elf::dynamic::DT_SONAME => {
                        soname = elf.dynstrtab.get_at(strtab_idx).map(str::to_string);
                    }
                    goblin::elf::dynamic::DT_RPATH => {
                        if let Some(rpath_str) = elf.dynstrtab.get_at(strtab_idx) {
                            rpath.extend(split_search_path(rpath_str));
                        }
                    }
                    goblin::elf::dynamic::DT_RUNPATH => {
                        if let Some(runpath_str) = elf.dynstrtab.get_at(strtab_idx) {
                            runpath.extend(split_search_path(runpath_str));
                        }
                    }
                    _ => {}
                }
            }
        }

        let kind = match elf.header.e_type {
            goblin::elf::header::ET_NONE => ElfType::None,
            goblin::elf::header::ET_REL => ElfType::Relocatable,
            goblin::elf::header::ET_EXEC => ElfType::Executable,
            goblin::elf::header::ET_DYN if pie => ElfType::PieExecutable,
            goblin::elf::header::ET_DYN => ElfType::SharedObject,
            goblin::elf::header::ET_CORE => ElfType::Core,
            _ => {
                return Err(InspectError::UnknownElfType {
                    path: path.to_path_buf(),
                });
            }
        };

        Ok(Self {
            class: if elf.is_64 {
                ElfClass::Elf64
            } else {
                ElfClass::Elf32
            },
            little_endian: elf.little_endian,
            machine: elf.header.e_machine,
            kind,
            dependencies,
            rpath,
            runpath,
            soname,
            build_id: Self::parse_build_id(&elf, bytes),
            vermagic: Self::parse_vermagic(&elf, bytes),
        })
    }

    /// Find the `NT_GNU_BUILD_ID` note, looking at note sections first and program headers second.
    /// Relocatable objects (kernel modules) only carry sections.
    fn parse_build_id(elf: &GoblinElf, bytes: &[u8]) -> Option<String> {
        let from_notes = |notes: goblin::elf::note::NoteIterator| {
            notes.filter_map(Result::ok).find_map(|note| {
                (note.n_type == goblin::elf::note::NT_GNU_BUILD_ID && note.name == "GNU")
                    .then(|| hex_encode(note.desc))
            })
        };
        elf.iter_note_sections(bytes, None)
            .and_then(from_notes)
            .or_else(|| elf.iter_note_headers(bytes).and_then(from_notes))
            .filter(|id| !id.is_empty())
    }

    /// Extract `vermagic=` from the NUL separated `key=value` strings of the `.modinfo` section.
    fn parse_vermagic(elf: &GoblinElf, bytes: &[u8]) -> Option<String> {
        let section = elf
            .section_headers
            .iter()
            .find(|sh| elf.shdr_strtab.get_at(sh.sh_name) == Some(".modinfo"))?;
        let start = usize::try_from(section.sh_offset).ok()?;
        let end = start.checked_add(usize::try_from(section.sh_size).ok()?)?;
        let data = bytes.get(start..end)?;
        data.split(|b| *b == 0)
            .filter_map(|entry| std::str::from_utf8(entry).ok())
            .find_map(|entry| entry.strip_prefix("vermagic="))
            .map(|value| value.trim().to_string())
    }
}

fn split_search_path(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(':')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::new(), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_fixtures_dir() -> PathBuf {
        PathBuf::from(env!("OUT_DIR")).join("fixtures")
    }

    fn load_fixture(name: &str) -> Option<Elf> {
        let path = get_fixtures_dir().join(name);
        if !path.exists() {
            eprintln!("Skipping test: fixture {} not found (requires gcc)", path.display());
            return None;
        }
        Some(Elf::from_path(&path).expect("Should parse ELF fixture"))
    }

    #[test]
    fn test_normalize_path_absolute() {
        let origin = Path::new("/usr/bin");
        assert_eq!(
            Elf::normalize_path(origin, "/usr/lib/../lib64"),
            Some(PathBuf::from("/usr/lib64"))
        );
    }

    #[test]
    fn test_normalize_path_origin() {
        let origin = Path::new("/usr/bin");
        assert_eq!(
            Elf::normalize_path(origin, "$ORIGIN/../lib"),
            Some(PathBuf::from("/usr/lib"))
        );
        assert_eq!(
            Elf::normalize_path(origin, "${ORIGIN}/plugins"),
            Some(PathBuf::from("/usr/bin/plugins"))
        );
    }

    #[test]
    fn test_normalize_path_relative_dropped() {
        let origin = Path::new("/usr/bin");
        assert_eq!(Elf::normalize_path(origin, "../lib"), None);
        assert_eq!(Elf::normalize_path(origin, "../$ORIGIN/lib"), None);
    }

    #[test]
    fn test_split_search_path_skips_empty() {
        let parts: Vec<String> = split_search_path("/a::/b:").collect();
        assert_eq!(parts, vec!["/a".to_string(), "/b".to_string()]);
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0x0a, 0xff, 0x00]), "0aff00");
    }

    #[test]
    fn test_not_elf_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text");
        fs::write(&path, "x".repeat(128)).unwrap();
        assert!(matches!(
            Elf::from_path(&path),
            Err(InspectError::NotElfFile { .. })
        ));
        let small = dir.path().join("small");
        fs::write(&small, "tiny").unwrap();
        assert!(matches!(
            Elf::from_path(&small),
            Err(InspectError::FileTooSmall { .. })
        ));
    }

    #[test]
    fn test_shared_object_fixture() {
        let Some(elf) = load_fixture("libhello.so.1") else {
            return;
        };
        assert_eq!(elf.kind(), ElfType::SharedObject);
        assert_eq!(elf.soname(), Some("libhello.so.1"));
        assert!(elf.build_id().is_some());
        assert!(elf.vermagic().is_none());
    }

    #[test]
    fn test_executable_fixture() {
        let Some(elf) = load_fixture("hello") else {
            return;
        };
        assert!(matches!(
            elf.kind(),
            ElfType::Executable | ElfType::PieExecutable
        ));
        assert!(elf.dependencies().iter().any(|d| d == "libhello.so.1"));
        assert_eq!(elf.rpath(), ["/opt/hello/lib".to_string()]);
        assert_eq!(elf.soname(), None);
        assert_eq!(
            elf.normalize_paths(Path::new("/usr/bin")),
            vec![PathBuf::from("/opt/hello/lib")]
        );
    }

    #[test]
    fn test_relocatable_fixture() {
        let Some(elf) = load_fixture("hello.o") else {
            return;
        };
        assert_eq!(elf.kind(), ElfType::Relocatable);
        assert!(elf.dependencies().is_empty());
    }
}
