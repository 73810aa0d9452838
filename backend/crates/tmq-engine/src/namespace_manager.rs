//! Rotate and reclaim state machine for a single namespace.
//!
//! Broker writes always happen before the store write. A failed broker call
//! therefore leaves `expires` untouched, and the namespace stays due (and
//! visible to monitoring) until a later tick gets through.

use crate::{EngineError, EngineResult, Metrics, NamespaceSettings, QueueReport};

use tmq_broker::BrokerAdmin;
use tmq_core::{Clock, Credential, Namespace, ResourceKind};
use tmq_db::{AlertStore, NamespaceStore};

use std::sync::Arc;

use log::{debug, info};

#[derive(Debug)]
pub enum RotationOutcome {
    /// The store now holds `namespace` and the broker holds `credential`.
    Rotated {
        namespace: Namespace,
        credential: Credential,
    },
    /// Another writer advanced the version first. Nothing was written to
    /// the store and the broker is left as is.
    Conflict,
    /// Already past its grace period; reclaim owns it now.
    Skipped,
}

impl RotationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rotated { .. } => "rotated",
            Self::Conflict => "conflict",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReclaimOutcome {
    Reclaimed,
    /// Not yet past the grace period; nothing was touched.
    StillLive,
    /// The record was renewed between read and delete; the renewal stands.
    Conflict,
}

impl ReclaimOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reclaimed => "reclaimed",
            Self::StillLive => "still_live",
            Self::Conflict => "conflict",
        }
    }
}

pub struct NamespaceManager {
    store: Arc<dyn NamespaceStore>,
    alerts: Arc<dyn AlertStore>,
    broker: Arc<dyn BrokerAdmin>,
    clock: Arc<dyn Clock>,
    settings: NamespaceSettings,
    metrics: Metrics,
}

impl NamespaceManager {
    pub fn new(
        store: Arc<dyn NamespaceStore>,
        alerts: Arc<dyn AlertStore>,
        broker: Arc<dyn BrokerAdmin>,
        clock: Arc<dyn Clock>,
        settings: NamespaceSettings,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            alerts,
            broker,
            clock,
            settings,
            metrics,
        }
    }

    pub fn settings(&self) -> &NamespaceSettings {
        &self.settings
    }

    /// Issue a fresh secret and permission set, then advance the record.
    ///
    /// `namespace` must be the record as read from the store; its
    /// `rotation_version` is the token for the conditional write.
    pub async fn rotate(&self, namespace: &Namespace) -> EngineResult<RotationOutcome> {
        self.ensure_managed(&namespace.name)?;

        let now = self.clock.now();
        if namespace.is_past_grace(now, self.settings.expiration_delay) {
            debug!("{} is past its grace period, leaving it to reclaim", namespace.name);
            self.metrics.rotation("skipped");
            return Ok(RotationOutcome::Skipped);
        }

        let rule = self.settings.templates.render(&namespace.name)?;
        let updated = namespace.rotated(now, self.settings.rotation_interval)?;
        let credential = Credential::generate(&namespace.name, updated.rotation_version);

        self.broker
            .put_user(&namespace.name, &credential.password, &self.settings.user_tags)
            .await?;
        self.broker
            .put_permissions(&self.settings.vhost, &namespace.name, &rule)
            .await?;

        if !self
            .store
            .compare_and_swap(namespace.rotation_version, &updated)
            .await?
        {
            info!(
                "Rotation of {} lost the race at version {}",
                namespace.name, namespace.rotation_version
            );
            self.metrics.rotation("conflict");
            return Ok(RotationOutcome::Conflict);
        }

        debug!(
            "Rotated {} to version {}, expires {}",
            updated.name, updated.rotation_version, updated.expires
        );
        self.metrics.rotation("rotated");

        Ok(RotationOutcome::Rotated {
            namespace: updated,
            credential,
        })
    }

    /// Tear down a namespace whose grace period has run out.
    pub async fn reclaim(&self, namespace: &Namespace) -> EngineResult<ReclaimOutcome> {
        self.ensure_managed(&namespace.name)?;

        let now = self.clock.now();
        if !namespace.is_past_grace(now, self.settings.expiration_delay) {
            self.metrics.reclaim("still_live");
            return Ok(ReclaimOutcome::StillLive);
        }

        self.purge_user(&namespace.name).await?;

        if !self
            .store
            .delete_if_version(&namespace.name, namespace.rotation_version)
            .await?
        {
            info!(
                "Reclaim of {} lost to a concurrent renewal at version {}",
                namespace.name, namespace.rotation_version
            );
            self.metrics.reclaim("conflict");
            return Ok(ReclaimOutcome::Conflict);
        }

        let cleared = self.alerts.delete_for_namespace(&namespace.name).await?;
        info!(
            "Reclaimed {} (expired {}, {} alert records cleared)",
            namespace.name, namespace.expires, cleared
        );
        self.metrics.reclaim("reclaimed");

        Ok(ReclaimOutcome::Reclaimed)
    }

    /// Remove a broker user and its permissions. Already-gone is success.
    pub async fn purge_user(&self, username: &str) -> EngineResult<()> {
        self.ensure_managed(username)?;

        self.broker
            .delete_permissions(&self.settings.vhost, username)
            .await?;
        self.broker.delete_user(username).await?;

        Ok(())
    }

    /// Delete a queue (messages included) or exchange the monitor flagged.
    pub async fn delete_resource(&self, report: &QueueReport) -> EngineResult<()> {
        self.ensure_managed(&report.namespace)?;

        match report.kind {
            ResourceKind::Queue => {
                self.broker
                    .delete_queue(&self.settings.vhost, &report.name)
                    .await?
            }
            ResourceKind::Exchange => {
                self.broker
                    .delete_exchange(&self.settings.vhost, &report.name)
                    .await?
            }
        }

        info!(
            "Deleted {} {} ({} messages{})",
            report.kind.as_str(),
            report.name,
            report.message_count,
            if report.orphaned { ", orphaned" } else { "" }
        );
        self.metrics.resource_deleted(report.kind);

        Ok(())
    }

    /// Never touch anything outside the managed prefix.
    fn ensure_managed(&self, name: &str) -> EngineResult<()> {
        if name.starts_with(&self.settings.prefix) && name != self.settings.admin_username {
            Ok(())
        } else {
            Err(EngineError::validation(format!(
                "{} is not a namespace managed under prefix {}",
                name, self.settings.prefix
            )))
        }
    }
}
