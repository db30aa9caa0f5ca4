use crate::models::error::AudioError;

/// Authorization check consulted before a capture device may be opened.
///
/// The core never performs the permission *request* itself — whatever
/// consent flow the platform requires happens outside, and this gate
/// reports the result. `begin_capture` refuses with `PermissionDenied`
/// when the gate answers `Ok(false)`.
pub trait PermissionGate: Send + Sync {
    /// Whether the process may open a microphone stream right now.
    ///
    /// `Err` means the check itself could not run, which callers treat
    /// the same as a denial.
    fn microphone_allowed(&self) -> Result<bool, AudioError>;
}

/// Gate that always answers yes.
///
/// Default for embedders on platforms without a consent model, and the
/// usual choice in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionGate for AllowAll {
    fn microphone_allowed(&self) -> Result<bool, AudioError> {
        Ok(true)
    }
}
