//! Persistence of traction PID presets across sessions.
//!
//! The preset file is a JSON object keyed `"Mode1"`..`"Mode5"`, each value an
//! object with string fields `"P"`, `"I"` and `"D"`. Saves always rewrite the
//! whole file through a temp file and rename so a crash mid-write leaves
//! either the previous file or the new one on disk.
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::error::{NodeToolError, Result};
use crate::frame::{mode_key, PidTriple, TractionProfile, MODE_COUNT};

/// Saved gains keyed by mode name.
pub type PresetFile = BTreeMap<String, PidTriple>;

/// Default location of the preset file, relative to the working directory.
pub const DEFAULT_PRESET_PATH: &str = "pid_presets.json";

#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
}

impl PresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the preset file. A missing file yields an empty mapping.
    pub fn load(&self) -> Result<PresetFile> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No preset file at {}, starting empty", self.path.display());
                return Ok(PresetFile::new());
            }
            Err(e) => return Err(e.into()),
        };
        // Guard against any accidental leading NULs
        let start = data.iter().position(|&b| b != 0).unwrap_or(data.len());
        let presets: PresetFile =
            serde_json::from_slice(&data[start..]).map_err(|source| NodeToolError::CorruptPresetFile {
                path: self.path.clone(),
                source,
            })?;
        debug!("Loaded {} preset(s) from {}", presets.len(), self.path.display());
        Ok(presets)
    }

    /// Persist the full profile, replacing whatever was saved before.
    pub fn save(&self, profile: &TractionProfile) -> Result<()> {
        profile.check_complete()?;
        let presets: PresetFile = profile
            .keyed()
            .map(|(key, triple)| (key, triple.clone()))
            .collect();
        let content = serde_json::to_string_pretty(&presets).map_err(std::io::Error::from)?;
        write_atomic(&self.path, &content)?;
        debug!("Saved {} preset(s) to {}", presets.len(), self.path.display());
        Ok(())
    }
}

impl TractionProfile {
    /// Startup profile: saved gains where present, blanks elsewhere.
    pub fn from_presets(presets: &PresetFile) -> Self {
        let modes = (1..=MODE_COUNT)
            .map(|idx| presets.get(&mode_key(idx)).cloned().unwrap_or_default())
            .collect();
        TractionProfile::new(modes)
    }
}

/// Write `content` to a unique sibling temp file, fsync it, then rename it over `path`.
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(DEFAULT_PRESET_PATH);
    let mut counter = 0u32;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut tmp) => {
                let written = tmp
                    .write_all(content.as_bytes())
                    .and_then(|_| tmp.flush())
                    .and_then(|_| tmp.sync_all());
                if let Err(e) = written {
                    let _ = fs::remove_file(&candidate);
                    return Err(e);
                }
                break candidate;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
                continue;
            }
            Err(e) => return Err(e),
        }
    };
    trace!("Renaming {} over {}", tmp_path.display(), path.display());
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    // Persist the rename itself (best-effort)
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }
    remove_stale_temps(dir, base);
    Ok(())
}

/// Delete temp siblings left behind by interrupted saves (best-effort).
fn remove_stale_temps(dir: &Path, base: &str) {
    let prefix = format!(".{}.tmp-", base);
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.filter_map(|e| e.ok()) {
        if entry.file_name().to_string_lossy().starts_with(&prefix) {
            match fs::remove_file(entry.path()) {
                Ok(()) => debug!("Removed stale preset temp file {}", entry.path().display()),
                Err(e) => trace!("Could not remove {}: {}", entry.path().display(), e),
            }
        }
    }
}
