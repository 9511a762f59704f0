// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Build script to generate ELF test fixtures for the `package_examiner` crate.
//!
//! The fixtures are written to `$OUT_DIR/fixtures`:
//! - `libhello.so.1`: shared object with `SONAME` `libhello.so.1` and a build-id
//! - `hello`: executable that needs `libhello.so.1` and carries an `RPATH`
//! - `hello.o`: relocatable object
//!
//! If `gcc` is not available the script emits a warning and skips the fixtures.
//! Tests gracefully skip when fixtures are missing.

use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Check if a command is available in PATH.
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let fixtures_dir = Path::new(&out_dir).join("fixtures");
    fs::create_dir_all(&fixtures_dir).expect("Failed to create fixtures directory");

    if !command_exists("gcc") {
        println!("cargo:warning=gcc is missing. ELF test fixtures will not be generated.");
        return;
    }
    generate_elf_fixtures(&fixtures_dir);
}

/// Run gcc with the given arguments, returning whether it succeeded.
fn gcc(args: &[&str]) -> bool {
    Command::new("gcc")
        .args(args)
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn generate_elf_fixtures(fixtures_dir: &Path) {
    let lib_source = fixtures_dir.join("libhello.c");
    let bin_source = fixtures_dir.join("hello.c");
    let lib_path = fixtures_dir.join("libhello.so.1");
    let bin_path = fixtures_dir.join("hello");
    let obj_path = fixtures_dir.join("hello.o");

    fs::write(
        &lib_source,
        r#"#include <stdio.h>

void hello_from_lib() {
    printf("Hello from shared library!\n");
}
"#,
    )
    .expect("Failed to write libhello.c");
    fs::write(
        &bin_source,
        r#"#include <stdio.h>

void hello_from_lib();

int main() {
    printf("Hello from binary!\n");
    hello_from_lib();
    return 0;
}
"#,
    )
    .expect("Failed to write hello.c");

    let lib = lib_path.to_string_lossy().to_string();
    if !gcc(&[
        "-shared",
        "-fPIC",
        "-Wl,-soname,libhello.so.1",
        "-Wl,--build-id",
        "-o",
        &lib,
        &lib_source.to_string_lossy(),
    ]) {
        println!("cargo:warning=Failed to compile libhello.so.1, skipping ELF fixtures");
        return;
    }

    if !gcc(&[
        "-o",
        &bin_path.to_string_lossy(),
        &bin_source.to_string_lossy(),
        &lib,
        "-Wl,--disable-new-dtags",
        "-Wl,-rpath,/opt/hello/lib",
    ]) {
        println!("cargo:warning=Failed to compile hello, skipping executable fixture");
    }

    if !gcc(&[
        "-c",
        "-o",
        &obj_path.to_string_lossy(),
        &bin_source.to_string_lossy(),
    ]) {
        println!("cargo:warning=Failed to compile hello.o, skipping relocatable fixture");
    }
}
