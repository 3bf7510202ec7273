//! This build script copies the `memory.x` file from the crate root into a directory where
//! the linker can always find it at build time, and records the build time as the initial
//! wall clock for the watch.

use chrono::{Local, Utc};
use std::{env, fs::File, io::Write, path::PathBuf};

fn main() {
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());

    // The linker script is only needed for the firmware image.
    if env::var_os("CARGO_FEATURE_NRF52832").is_some() {
        File::create(out.join("memory.x"))
            .unwrap()
            .write_all(include_bytes!("memory.x"))
            .unwrap();
        println!("cargo:rustc-link-search={}", out.display());
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Create rs file with current UTC time and the local offset of the build machine
    File::create(out.join("utc.rs"))
        .unwrap()
        .write_fmt(format_args!(
            "pub const UTC_EPOCH: i64 = {:?};\npub const UTC_OFFSET_SECS: i32 = {:?};\n",
            Utc::now().timestamp(),
            Local::now().offset().local_minus_utc(),
        ))
        .unwrap();

    // No `rerun-if-changed` here: the build time should be refreshed whenever any file in
    // the project changes.
}
