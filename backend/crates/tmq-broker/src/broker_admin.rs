use crate::{BrokerResult, ExchangeInfo, QueueInfo, UserInfo};

use tmq_core::PermissionRule;

use async_trait::async_trait;

/// Administrative operations against the shared broker.
///
/// Every mutation is idempotent: puts overwrite, and deleting something that
/// is already gone succeeds.
#[async_trait]
pub trait BrokerAdmin: Send + Sync {
    /// Create the user or overwrite its password and tags.
    async fn put_user(&self, username: &str, password: &str, tags: &[String])
    -> BrokerResult<()>;

    async fn delete_user(&self, username: &str) -> BrokerResult<()>;

    async fn list_users(&self) -> BrokerResult<Vec<UserInfo>>;

    async fn put_permissions(
        &self,
        vhost: &str,
        username: &str,
        rule: &PermissionRule,
    ) -> BrokerResult<()>;

    async fn delete_permissions(&self, vhost: &str, username: &str) -> BrokerResult<()>;

    async fn list_queues(&self, vhost: &str) -> BrokerResult<Vec<QueueInfo>>;

    /// Deletes the queue and every message in it.
    async fn delete_queue(&self, vhost: &str, name: &str) -> BrokerResult<()>;

    async fn list_exchanges(&self, vhost: &str) -> BrokerResult<Vec<ExchangeInfo>>;

    async fn delete_exchange(&self, vhost: &str, name: &str) -> BrokerResult<()>;
}
