//! Domain model (IDs, remote resources, errors, runner events).

pub mod errors;
pub mod events;
pub mod ids;
pub mod resource;

pub use errors::{ClientError, ManifestError, StepCause, StepContext, StepError, TaskError};
pub use events::{RunnerEvent, RunnerEventKind};
pub use ids::{IdMarker, RunId};
pub use resource::{ApiVersion, DeletePropagation, Manifest, ObjectKey, ResourceKind};
