//! Trait seams between the core and its collaborators: device backends,
//! permission gates, and event observers.

pub mod backend;
pub mod delegate;
pub mod device;
pub mod gate;

pub use backend::AudioBackend;
pub use delegate::RecorderDelegate;
pub use device::{CaptureDevice, PlaybackDevice};
pub use gate::{AllowAll, PermissionGate};
