use crate::{CoreError, CoreResult, Namespace, PermissionRule};

use std::panic::Location;

use error_location::ErrorLocation;
use regex::Regex;

pub const NAMESPACE_PLACEHOLDER: &str = "{{namespace}}";

/// Configure/write/read pattern templates with `{{namespace}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTemplates {
    configure: String,
    write: String,
    read: String,
}

impl PermissionTemplates {
    #[track_caller]
    pub fn new(
        configure: impl Into<String>,
        write: impl Into<String>,
        read: impl Into<String>,
    ) -> CoreResult<Self> {
        let templates = Self {
            configure: configure.into(),
            write: write.into(),
            read: read.into(),
        };

        for template in [&templates.configure, &templates.write, &templates.read] {
            Self::check_template(template)?;
        }

        Ok(templates)
    }

    #[track_caller]
    fn check_template(template: &str) -> CoreResult<()> {
        if !template.contains(NAMESPACE_PLACEHOLDER) {
            return Err(CoreError::Template {
                template: template.to_string(),
                message: format!("missing {NAMESPACE_PLACEHOLDER} placeholder"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        // Unanchored patterns match anywhere in a resource name.
        if !template.starts_with('^') {
            return Err(CoreError::Template {
                template: template.to_string(),
                message: "pattern must be anchored with '^'".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    /// Render the rule for one namespace. Pure; no broker access.
    #[track_caller]
    pub fn render(&self, namespace: &str) -> CoreResult<PermissionRule> {
        Namespace::validate_name(namespace)?;

        let rule = PermissionRule {
            configure: self.configure.replace(NAMESPACE_PLACEHOLDER, namespace),
            write: self.write.replace(NAMESPACE_PLACEHOLDER, namespace),
            read: self.read.replace(NAMESPACE_PLACEHOLDER, namespace),
        };

        for pattern in [&rule.configure, &rule.write, &rule.read] {
            Regex::new(pattern).map_err(|e| CoreError::Template {
                template: pattern.clone(),
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        Ok(rule)
    }
}
