//! Build script for songpick.
//!
//! Seeds the user's local data directory with the configuration templates
//! shipped next to `Cargo.toml`, so a fresh install has a `config.example.toml`
//! and a `.env.example` in the place the binary reads its settings from.

use std::{env, fs, path::PathBuf};

const TEMPLATES: [&str; 2] = [".env.example", "config.example.toml"];

/// Copies every template found in the crate root to `<data_local_dir>/songpick/`.
///
/// Missing templates produce a cargo warning instead of failing the build.
/// Directory creation and write failures are returned as errors.
///
/// # Destination
///
/// - Linux: `~/.local/share/songpick/`
/// - macOS: `~/Library/Application Support/songpick/`
/// - Windows: `%LOCALAPPDATA%/songpick/`
fn main() -> Result<(), Box<dyn std::error::Error>> {
    for template in TEMPLATES {
        println!("cargo:rerun-if-changed={template}");
    }

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("songpick");
    fs::create_dir_all(&out_dir)?;

    for template in TEMPLATES {
        let source = manifest_dir.join(template);
        if source.is_file() {
            let contents = fs::read_to_string(&source)?;
            fs::write(out_dir.join(template), contents)?;
        } else {
            println!("cargo:warning={} not found at {}", template, source.display());
        }
    }

    Ok(())
}
