//! Crate and workspace discovery.
//!
//! - Workspace detection via `[workspace]` in Cargo.toml
//! - Member discovery via `cargo metadata`, with a directory scan fallback
//! - Package and library names read from the manifest

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{EnumcoverError, EnumcoverResult, IoResultExt};

/// Minimal subset of `cargo metadata` output we need.
#[derive(Debug, Deserialize)]
struct CargoMetadata {
    packages: Vec<CargoPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoPackage {
    manifest_path: String,
}

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    package: Option<ManifestPackage>,
    lib: Option<ManifestLib>,
    workspace: Option<toml::Value>,
}

#[derive(Debug, Deserialize)]
struct ManifestPackage {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ManifestLib {
    name: Option<String>,
}

/// Names a package is known by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Package name as written in Cargo.toml (`my-crate`).
    pub name: String,
    /// Library name used in paths (`my_crate`), if the package has a library.
    pub lib_name: Option<String>,
}

impl PackageInfo {
    /// Fallback for directories without a readable manifest.
    pub fn from_dir(root: &Path) -> Self {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            lib_name: root
                .join("src/lib.rs")
                .exists()
                .then(|| name.replace('-', "_")),
            name,
        }
    }
}

fn read_manifest(root: &Path) -> EnumcoverResult<Manifest> {
    let path = root.join("Cargo.toml");
    let text = fs::read_to_string(&path).with_path(&path)?;
    toml::from_str(&text).map_err(|e| EnumcoverError::workspace(&path, e.to_string()))
}

/// Read the package and library names of the crate at `root`.
pub fn read_package_info(root: &Path) -> EnumcoverResult<PackageInfo> {
    let manifest = read_manifest(root)?;
    let Some(package) = manifest.package else {
        return Err(EnumcoverError::workspace(
            root.join("Cargo.toml"),
            "manifest has no [package] section",
        ));
    };

    let has_lib = manifest.lib.is_some() || root.join("src/lib.rs").exists();
    let lib_name = has_lib.then(|| {
        manifest
            .lib
            .and_then(|l| l.name)
            .unwrap_or_else(|| package.name.clone())
            .replace('-', "_")
    });

    Ok(PackageInfo {
        name: package.name,
        lib_name,
    })
}

/// Detect if a root is a Cargo workspace.
pub fn is_workspace_root(root: &Path) -> bool {
    match read_manifest(root) {
        Ok(manifest) => manifest.workspace.is_some(),
        Err(e) => {
            debug!(path = %root.display(), error = %e, "no readable manifest, not a workspace");
            false
        }
    }
}

/// Find the crate root for a path: the nearest directory, starting at `path`
/// itself (or its parent for files), that holds a Cargo.toml.
///
/// Falls back to the canonical path when no manifest is found.
pub fn find_crate_root(path: &Path) -> Option<PathBuf> {
    let canonical = path.canonicalize().ok()?;
    let start = if canonical.is_file() {
        canonical.parent()?.to_path_buf()
    } else {
        canonical.clone()
    };

    let mut current = Some(start.as_path());
    while let Some(dir) = current {
        if dir.join("Cargo.toml").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    Some(start)
}

/// Try using `cargo metadata` for workspace discovery.
fn try_cargo_metadata(path: &Path) -> Option<CargoMetadata> {
    let output = std::process::Command::new("cargo")
        .args(["metadata", "--no-deps", "--format-version", "1"])
        .current_dir(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    serde_json::from_slice(&output.stdout).ok()
}

/// Find all crate roots in a workspace.
/// Prefers `cargo metadata` when available, falls back to a directory scan.
pub fn find_all_crates(root: &Path) -> EnumcoverResult<Vec<PathBuf>> {
    if let Some(meta) = try_cargo_metadata(root) {
        let mut crates: Vec<PathBuf> = meta
            .packages
            .iter()
            .filter_map(|pkg| Path::new(&pkg.manifest_path).parent().map(Path::to_path_buf))
            .collect();
        if !crates.is_empty() {
            crates.sort();
            return Ok(crates);
        }
    }

    let mut crates = Vec::new();
    if root.join("src").exists() && root.join("Cargo.toml").exists() {
        crates.push(root.to_path_buf());
    }

    let entries = fs::read_dir(root).with_path(root)?;
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        if matches!(name.to_str(), Some("target" | ".git" | "node_modules")) {
            continue;
        }
        if path.is_dir() && path.join("Cargo.toml").exists() {
            crates.push(path);
        }
    }

    if crates.is_empty() {
        warn!(path = %root.display(), "no crates found in workspace");
    }
    crates.sort();
    Ok(crates)
}
