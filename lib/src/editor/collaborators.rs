use super::{DecompileFailure, PatchApplicationFailure};

/// Applies patch scripts to classes
///
/// Implementations get the original, unpatched class every time, never the output of a previous
/// application.
pub trait PatchApplier: Send {
    /// Apply `patch` to the class in `class_bytes`, returning the bytes of the patched class
    fn apply(&self, class_bytes: &[u8], patch: &str) -> Result<Vec<u8>, PatchApplicationFailure>;
}

/// Turns classes back into Java source
pub trait Decompiler: Send {
    fn decompile(&self, class_bytes: &[u8]) -> Result<String, DecompileFailure>;
}

/// Patcher that ignores the patch and hands back the class unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityPatcher;

impl PatchApplier for IdentityPatcher {
    fn apply(&self, class_bytes: &[u8], _patch: &str) -> Result<Vec<u8>, PatchApplicationFailure> {
        Ok(class_bytes.to_vec())
    }
}

impl<F> PatchApplier for F
where
    F: Fn(&[u8], &str) -> Result<Vec<u8>, PatchApplicationFailure> + Send,
{
    fn apply(&self, class_bytes: &[u8], patch: &str) -> Result<Vec<u8>, PatchApplicationFailure> {
        self(class_bytes, patch)
    }
}
