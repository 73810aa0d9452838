use crate::{QueueClassification, ResourceKind};

use std::str::FromStr;

#[test]
fn test_queue_classification_as_str() {
    assert_eq!(QueueClassification::Healthy.as_str(), "healthy");
    assert_eq!(QueueClassification::Alert.as_str(), "alert");
    assert_eq!(QueueClassification::Delete.as_str(), "delete");
}

#[test]
fn test_queue_classification_from_str() {
    assert_eq!(
        QueueClassification::from_str("delete").unwrap(),
        QueueClassification::Delete
    );
    assert!(QueueClassification::from_str("purge").is_err());
}

#[test]
fn test_queue_classification_default() {
    assert_eq!(QueueClassification::default(), QueueClassification::Healthy);
}

#[test]
fn test_resource_kind_from_str() {
    assert_eq!(ResourceKind::from_str("queue").unwrap(), ResourceKind::Queue);
    assert_eq!(
        ResourceKind::from_str("exchange").unwrap(),
        ResourceKind::Exchange
    );
    assert!(ResourceKind::from_str("binding").is_err());
}
