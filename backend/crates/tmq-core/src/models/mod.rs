pub mod alert_key;
pub mod alert_record;
pub mod credential;
pub mod namespace;
pub mod permission_rule;
pub mod permission_templates;
pub mod queue_classification;
pub mod queue_snapshot;
pub mod resource_kind;
