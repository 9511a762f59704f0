// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Scripted introspector for unit tests. Answers are keyed by package path and matched
//! against the tail of the queried path, so they work for any staging root.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::inspect::{
    describe, DynamicInfo, InspectError, InspectResult, Introspector, StripMode, Toolchain,
    Vermagic,
};

type Answers<T> = Vec<(PathBuf, T)>;

#[derive(Debug, Default)]
pub(crate) struct FakeIntrospector {
    signatures: Answers<String>,
    dynamic: Answers<DynamicInfo>,
    build_ids: Answers<String>,
    vermagic: Answers<String>,
    requires: Answers<Vec<String>>,
    requires_private: Answers<Vec<String>>,
    fail_strip: bool,
    stripped: Mutex<Vec<PathBuf>>,
    debug_extractions: AtomicUsize,
}

fn key(pretty: &str) -> PathBuf {
    PathBuf::from(pretty.trim_start_matches('/'))
}

fn lookup<'a, T>(answers: &'a Answers<T>, path: &Path) -> Option<&'a T> {
    answers
        .iter()
        .find(|(key, _)| path.ends_with(key))
        .map(|(_, answer)| answer)
}

impl FakeIntrospector {
    pub(crate) fn with_signature(mut self, pretty: &str, signature: &str) -> Self {
        self.signatures.push((key(pretty), signature.to_string()));
        self
    }

    pub(crate) fn with_dynamic(mut self, pretty: &str, info: DynamicInfo) -> Self {
        self.dynamic.push((key(pretty), info));
        self
    }

    pub(crate) fn with_build_id(mut self, pretty: &str, build_id: &str) -> Self {
        self.build_ids.push((key(pretty), build_id.to_string()));
        self
    }

    pub(crate) fn with_vermagic(mut self, pretty: &str, raw: &str) -> Self {
        self.vermagic.push((key(pretty), raw.to_string()));
        self
    }

    pub(crate) fn with_requires(mut self, pretty: &str, lines: &[&str]) -> Self {
        self.requires
            .push((key(pretty), lines.iter().map(|l| (*l).to_string()).collect()));
        self
    }

    pub(crate) fn with_requires_private(mut self, pretty: &str, lines: &[&str]) -> Self {
        self.requires_private
            .push((key(pretty), lines.iter().map(|l| (*l).to_string()).collect()));
        self
    }

    pub(crate) fn failing_strip(mut self) -> Self {
        self.fail_strip = true;
        self
    }

    pub(crate) fn stripped(&self) -> Vec<PathBuf> {
        self.stripped.lock().unwrap().clone()
    }

    pub(crate) fn debug_extractions(&self) -> usize {
        self.debug_extractions.load(Ordering::SeqCst)
    }
}

impl Introspector for FakeIntrospector {
    fn signature(&self, path: &Path) -> InspectResult<String> {
        match lookup(&self.signatures, path) {
            Some(signature) if path.exists() => Ok(signature.clone()),
            _ => describe(path),
        }
    }

    fn dynamic_info(&self, path: &Path, _origin: &Path) -> InspectResult<DynamicInfo> {
        lookup(&self.dynamic, path)
            .cloned()
            .ok_or_else(|| InspectError::NotElfFile {
                path: path.to_path_buf(),
            })
    }

    fn build_id(&self, path: &Path) -> InspectResult<Option<String>> {
        Ok(lookup(&self.build_ids, path).cloned())
    }

    fn vermagic(&self, path: &Path) -> InspectResult<Option<Vermagic>> {
        Ok(lookup(&self.vermagic, path).and_then(|raw| Vermagic::parse(raw)))
    }

    fn pkgconfig_requires(&self, path: &Path, _search_paths: &[PathBuf]) -> InspectResult<Vec<String>> {
        Ok(lookup(&self.requires, path).cloned().unwrap_or_default())
    }

    fn pkgconfig_requires_private(
        &self,
        path: &Path,
        _search_paths: &[PathBuf],
    ) -> InspectResult<Vec<String>> {
        Ok(lookup(&self.requires_private, path)
            .cloned()
            .unwrap_or_default())
    }

    fn strip(&self, path: &Path, _mode: StripMode, _toolchain: Toolchain) -> InspectResult<()> {
        if self.fail_strip {
            return Err(InspectError::CommandExited {
                command: "strip".to_string(),
                path: path.to_path_buf(),
                code: 1,
                stderr: "file format not recognized".to_string(),
            });
        }
        self.stripped.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn extract_debug(&self, _path: &Path, _debug_path: &Path) -> InspectResult<()> {
        self.debug_extractions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn add_debug_link(&self, _path: &Path, _debug_path: &Path) -> InspectResult<()> {
        Ok(())
    }
}
