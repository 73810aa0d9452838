pub mod clock;
pub mod error;
pub mod models;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result as CoreResult};
pub use models::alert_key::AlertKey;
pub use models::alert_record::AlertRecord;
pub use models::credential::Credential;
pub use models::namespace::{MAX_NAMESPACE_NAME_LENGTH, Namespace};
pub use models::permission_rule::PermissionRule;
pub use models::permission_templates::{NAMESPACE_PLACEHOLDER, PermissionTemplates};
pub use models::queue_classification::QueueClassification;
pub use models::queue_snapshot::QueueSnapshot;
pub use models::resource_kind::ResourceKind;
