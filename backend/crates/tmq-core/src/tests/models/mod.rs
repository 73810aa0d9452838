mod credential;
mod namespace;
mod permission_templates;
mod queue_classification;
mod queue_snapshot;
