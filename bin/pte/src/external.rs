//! Patch and decompiler collaborators backed by external programs

use patch_editor::editor::{DecompileFailure, Decompiler, PatchApplicationFailure, PatchApplier};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::{Builder, NamedTempFile};

/// Runs `<program> <class-file> <patch-file>`, expecting the patched class on stdout
pub struct CommandPatcher {
    program: PathBuf,
}

impl CommandPatcher {
    pub fn new(program: impl Into<PathBuf>) -> CommandPatcher {
        CommandPatcher {
            program: program.into(),
        }
    }
}

impl PatchApplier for CommandPatcher {
    fn apply(&self, class_bytes: &[u8], patch: &str) -> Result<Vec<u8>, PatchApplicationFailure> {
        let io_failure = |err: io::Error| PatchApplicationFailure::new(err.to_string());

        let class_file = scratch_file(".class", class_bytes).map_err(io_failure)?;
        let patch_file = scratch_file(".patch", patch.as_bytes()).map_err(io_failure)?;

        log::debug!("Running patcher {}", self.program.display());
        let output = Command::new(&self.program)
            .arg(class_file.path())
            .arg(patch_file.path())
            .output()
            .map_err(|err| {
                PatchApplicationFailure::new(format!(
                    "Could not run {}: {}",
                    self.program.display(),
                    err
                ))
            })?;

        if !output.status.success() {
            return Err(
                PatchApplicationFailure::new(format!("Patcher exited with {}", output.status))
                    .with_diagnostics(String::from_utf8_lossy(&output.stderr)),
            );
        }
        if output.stdout.is_empty() {
            return Err(PatchApplicationFailure::new("Patcher produced no class")
                .with_diagnostics(String::from_utf8_lossy(&output.stderr)));
        }
        Ok(output.stdout)
    }
}

/// Runs `<program> <class-file>`, expecting Java source on stdout
pub struct CommandDecompiler {
    program: PathBuf,
}

impl CommandDecompiler {
    pub fn new(program: impl Into<PathBuf>) -> CommandDecompiler {
        CommandDecompiler {
            program: program.into(),
        }
    }
}

impl Decompiler for CommandDecompiler {
    fn decompile(&self, class_bytes: &[u8]) -> Result<String, DecompileFailure> {
        let failure = |message: String| DecompileFailure { message };

        let class_file =
            scratch_file(".class", class_bytes).map_err(|err| failure(err.to_string()))?;

        log::debug!("Running decompiler {}", self.program.display());
        let output: Output = Command::new(&self.program)
            .arg(class_file.path())
            .output()
            .map_err(|err| failure(format!("Could not run {}: {}", self.program.display(), err)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(format!(
                "Decompiler exited with {}\n{}",
                output.status,
                stderr.trim_end()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Temporary file holding `contents`, removed once dropped
fn scratch_file(suffix: &str, contents: &[u8]) -> io::Result<NamedTempFile> {
    let mut file = Builder::new().prefix("pte-").suffix(suffix).tempfile()?;
    file.write_all(contents)?;
    file.flush()?;
    Ok(file)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn scratch_files_are_private_and_cleaned_up() {
        let first = scratch_file(".class", &[0xCA, 0xFE]).unwrap();
        let second = scratch_file(".class", &[0xCA, 0xFE]).unwrap();
        assert_ne!(first.path(), second.path());
        assert!(first.path().to_string_lossy().ends_with(".class"));
        assert_eq!(fs::read(first.path()).unwrap(), vec![0xCA, 0xFE]);

        let path = first.path().to_owned();
        drop(first);
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn patcher_output_and_failures() {
        // `cat <class> <patch>` echoes the class followed by the (empty) patch
        let patched = CommandPatcher::new("cat").apply(&[0xCA, 0xFE], "").unwrap();
        assert_eq!(patched, vec![0xCA, 0xFE]);

        let failure = CommandPatcher::new("false").apply(&[0xCA, 0xFE], "").unwrap_err();
        assert!(failure.message.starts_with("Patcher exited with"));

        let failure = CommandPatcher::new("/nonexistent/patcher")
            .apply(&[0xCA, 0xFE], "")
            .unwrap_err();
        assert!(failure.message.starts_with("Could not run"));
    }

    #[cfg(unix)]
    #[test]
    fn decompiler_output() {
        let java = CommandDecompiler::new("cat").decompile(b"class A {}").unwrap();
        assert_eq!(java, "class A {}");
        assert!(CommandDecompiler::new("false").decompile(b"").is_err());
    }
}
