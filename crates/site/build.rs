//! Stylesheet versioning.
//!
//! `/static` is served with a year-long immutable cache, so the stylesheet link
//! carries `?v=<hash>` of its contents. Editing `main.css` changes the URL and
//! browsers fetch the new file.

use std::fmt::Write as _;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

const STYLESHEET: &str = "static/css/main.css";

fn main() {
    let Some(manifest_dir) = std::env::var_os("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=CARGO_MANIFEST_DIR is not set; stylesheet left unversioned");
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };
    let path = PathBuf::from(manifest_dir).join(STYLESHEET);
    println!("cargo:rerun-if-changed={}", path.display());

    let version = match std::fs::read(&path) {
        Ok(bytes) => short_digest(&bytes),
        Err(e) => {
            println!("cargo:warning=Cannot read {STYLESHEET}: {e}");
            String::new()
        }
    };
    println!("cargo:rustc-env=CSS_HASH={version}");
}

/// First four bytes of the SHA-256, as hex.
fn short_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .take(4)
        .fold(String::with_capacity(8), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}
