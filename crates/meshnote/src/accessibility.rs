//! Hand-off of the current annotations to an external accessibility script.

use std::fs;
use std::path::Path;
use std::process::{Command, ExitStatus};

use meshnote_core::{Mesh, MeshnoteError, Result};

use crate::persistence;

/// File the annotations are written to inside the target directory.
pub const ANNOTATIONS_FILE: &str = "annotations.json";

/// File the relationships are written to inside the target directory.
pub const RELATIONSHIPS_FILE: &str = "relationships.json";

/// Writes both documents into `dir`, then runs `executable` with `dir` as its
/// only argument.
///
/// The script is not started unless both writes succeeded. A non-zero exit
/// is reported as [`MeshnoteError::ScriptFailed`].
pub fn run_accessibility_script(
    mesh: &Mesh,
    dir: impl AsRef<Path>,
    executable: impl AsRef<Path>,
) -> Result<ExitStatus> {
    let dir = dir.as_ref();
    let executable = executable.as_ref();
    fs::create_dir_all(dir)?;
    persistence::save_annotations(dir.join(ANNOTATIONS_FILE), mesh)?;
    persistence::save_relationships(dir.join(RELATIONSHIPS_FILE), mesh.relationships())?;

    log::info!(
        "running accessibility script {} on {}",
        executable.display(),
        dir.display()
    );
    let status = Command::new(executable).arg(dir).status()?;
    if !status.success() {
        return Err(MeshnoteError::ScriptFailed {
            program: executable.display().to_string(),
            status: status.to_string(),
        });
    }
    Ok(status)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use meshnote_core::DVec3;

    fn mesh() -> Mesh {
        Mesh::new(vec![DVec3::ZERO, DVec3::X, DVec3::Y], vec![[0, 1, 2]]).unwrap()
    }

    #[test]
    fn test_script_runs_after_writes() {
        let dir = std::env::temp_dir().join(format!("meshnote-{}-script-ok", std::process::id()));
        let status = run_accessibility_script(&mesh(), &dir, "true").unwrap();
        assert!(status.success());
        assert!(dir.join(ANNOTATIONS_FILE).is_file());
        assert!(dir.join(RELATIONSHIPS_FILE).is_file());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_failing_script_is_an_error() {
        let dir = std::env::temp_dir().join(format!("meshnote-{}-script-fail", std::process::id()));
        let result = run_accessibility_script(&mesh(), &dir, "false");
        assert!(matches!(result, Err(MeshnoteError::ScriptFailed { .. })));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_unwritable_target_skips_script() {
        let file = std::env::temp_dir().join(format!("meshnote-{}-not-a-dir", std::process::id()));
        fs::write(&file, "").unwrap();
        // The script would fail; the write error must come first.
        let result = run_accessibility_script(&mesh(), &file, "false");
        assert!(matches!(result, Err(MeshnoteError::IoError(_))));
        fs::remove_file(file).ok();
    }
}
