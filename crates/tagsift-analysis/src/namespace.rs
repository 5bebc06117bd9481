//! Output namespaces of report runs
//!
//! Each report owns `<root>/<report id>/`. A run first reserves its namespace
//! by creating the hidden staging directory `<root>/.<report id>.partial`,
//! writes every artifact there and finally renames it into place. Creating a
//! directory is atomic, so two concurrent runs for the same target cannot
//! both hold the reservation.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use crate::error::EngineError;

/// File-system-safe name of a report, derived from its target tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportId(String);

impl ReportId {
    /// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
    ///
    /// ```
    /// use tagsift_analysis::namespace::ReportId;
    ///
    /// assert_eq!(ReportId::from_target("FIC:101.PV").as_str(), "FIC_101.PV");
    /// assert_eq!(ReportId::from_target("TI 7/avg").as_str(), "TI_7_avg");
    /// assert_eq!(ReportId::from_target("..").as_str(), "__");
    /// ```
    #[must_use]
    pub fn from_target(target: &str) -> Self {
        let id = target
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect::<String>();
        // "", "." and ".." are not usable as a directory name
        if id.chars().all(|c| c == '.') {
            return Self("_".repeat(id.len().max(1)));
        }
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reserved, not yet committed report directory.
///
/// Dropping an uncommitted namespace removes its staging directory, so a
/// failed run leaves nothing behind.
#[derive(Debug)]
pub struct OutputNamespace {
    id: ReportId,
    staging_dir: PathBuf,
    final_dir: PathBuf,
    committed: bool,
}

impl OutputNamespace {
    /// Reserves `<root>/<id>`, creating `root` if needed.
    ///
    /// Fails with [`EngineError::NamespaceCollision`] if the report directory
    /// or its staging directory already exists.
    pub fn reserve(root: &Path, id: ReportId) -> Result<Self, EngineError> {
        fs::create_dir_all(root).map_err(EngineError::io(root))?;

        let final_dir = root.join(id.as_str());
        if final_dir.symlink_metadata().is_ok() {
            return Err(EngineError::NamespaceCollision { path: final_dir });
        }
        let staging_dir = root.join(format!(".{id}.partial"));
        match fs::create_dir(&staging_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(EngineError::NamespaceCollision { path: final_dir });
            }
            Err(e) => return Err(EngineError::io(&staging_dir)(e)),
        }
        log::debug!("reserved report namespace {}", final_dir.display());

        Ok(Self {
            id,
            staging_dir,
            final_dir,
            committed: false,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ReportId {
        &self.id
    }

    /// Directory artifacts are written to until [`OutputNamespace::commit`].
    #[must_use]
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    #[must_use]
    pub fn final_dir(&self) -> &Path {
        &self.final_dir
    }

    /// Moves the staging directory into place and returns the report path.
    pub fn commit(mut self) -> Result<PathBuf, EngineError> {
        if self.final_dir.symlink_metadata().is_ok() {
            return Err(EngineError::NamespaceCollision {
                path: self.final_dir.clone(),
            });
        }
        fs::rename(&self.staging_dir, &self.final_dir).map_err(EngineError::io(&self.final_dir))?;
        self.committed = true;
        Ok(self.final_dir.clone())
    }
}

impl Drop for OutputNamespace {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.staging_dir) {
            log::warn!(
                "failed to remove staging directory {}: {e}",
                self.staging_dir.display()
            );
        }
    }
}
