//! Write `manifest.json` for a model artifact directory.
//!
//! Records the SHA-256 of the feature order, codebook, and every condition
//! model so the engine refuses to load anything edited afterwards.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin seal_models -- <model_dir>
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;

use postpartum_risk::adapters::ArtifactManifest;

fn usage() -> &'static str {
    "Usage: seal_models <model_dir>"
}

fn parse_args() -> Result<PathBuf> {
    let mut args = std::env::args().skip(1);
    let dir = match args.next().as_deref() {
        None | Some("-h" | "--help") => bail!(usage()),
        Some(dir) => PathBuf::from(dir),
    };
    if args.next().is_some() {
        bail!(usage());
    }
    Ok(dir)
}

fn main() -> Result<()> {
    let model_dir = parse_args()?;
    if !model_dir.is_dir() {
        bail!("{model_dir:?} is not a directory");
    }

    let manifest = ArtifactManifest::seal(&model_dir, Utc::now())
        .with_context(|| format!("Failed to digest artifacts in {model_dir:?}"))?;
    let path = manifest
        .write(&model_dir)
        .context("Failed to write manifest.json")?;

    for (name, digest) in &manifest.files {
        println!("{digest}  {name}");
    }
    println!("Sealed manifest: {path:?}");
    Ok(())
}
