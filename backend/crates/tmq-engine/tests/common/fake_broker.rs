use tmq_broker::{BrokerAdmin, BrokerError, BrokerResult, ExchangeInfo, QueueInfo, UserInfo};
use tmq_core::PermissionRule;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub password: String,
    pub tags: Vec<String>,
}

#[derive(Default)]
struct FakeState {
    users: BTreeMap<String, FakeUser>,
    permissions: HashMap<(String, String), PermissionRule>,
    queues: BTreeMap<String, u64>,
    exchanges: BTreeSet<String>,
    failing_ops: HashSet<&'static str>,
    failing_targets: HashSet<String>,
    delays: HashMap<&'static str, Duration>,
    calls: HashMap<&'static str, usize>,
}

/// In-process broker with the management API's semantics: puts overwrite,
/// deletes of missing things succeed. Failures and latency can be injected
/// per operation or per target name.
#[derive(Default)]
pub struct FakeBroker {
    state: Mutex<FakeState>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    // Inspection

    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.state()
            .users
            .get(username)
            .is_some_and(|u| u.password == password)
    }

    pub fn user(&self, username: &str) -> Option<FakeUser> {
        self.state().users.get(username).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.state().users.len()
    }

    pub fn permissions(&self, vhost: &str, username: &str) -> Option<PermissionRule> {
        self.state()
            .permissions
            .get(&(vhost.to_string(), username.to_string()))
            .cloned()
    }

    pub fn has_queue(&self, name: &str) -> bool {
        self.state().queues.contains_key(name)
    }

    pub fn has_exchange(&self, name: &str) -> bool {
        self.state().exchanges.contains(name)
    }

    pub fn calls(&self, operation: &'static str) -> usize {
        self.state().calls.get(operation).copied().unwrap_or(0)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    // Setup

    pub fn add_user(&self, username: &str, password: &str) {
        self.state().users.insert(
            username.to_string(),
            FakeUser {
                password: password.to_string(),
                tags: Vec::new(),
            },
        );
    }

    pub fn set_queue(&self, name: &str, messages: u64) {
        self.state().queues.insert(name.to_string(), messages);
    }

    pub fn remove_queue(&self, name: &str) {
        self.state().queues.remove(name);
    }

    pub fn add_exchange(&self, name: &str) {
        self.state().exchanges.insert(name.to_string());
    }

    // Fault injection

    pub fn fail(&self, operation: &'static str) {
        self.state().failing_ops.insert(operation);
    }

    pub fn heal(&self, operation: &'static str) {
        self.state().failing_ops.remove(operation);
    }

    /// Every mutating call naming `target` fails.
    pub fn fail_target(&self, target: &str) {
        self.state().failing_targets.insert(target.to_string());
    }

    pub fn delay(&self, operation: &'static str, by: Duration) {
        self.state().delays.insert(operation, by);
    }

    async fn call(&self, operation: &'static str, target: Option<&str>) -> BrokerResult<()> {
        let (delay, failing) = {
            let mut state = self.state();
            *state.calls.entry(operation).or_insert(0) += 1;
            let failing = state.failing_ops.contains(operation)
                || target.is_some_and(|t| state.failing_targets.contains(t));
            (state.delays.get(operation).copied(), failing)
        };

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if failing {
            return Err(BrokerError::transient(operation, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl BrokerAdmin for FakeBroker {
    async fn put_user(&self, username: &str, password: &str, tags: &[String]) -> BrokerResult<()> {
        self.call("put_user", Some(username)).await?;
        self.state().users.insert(
            username.to_string(),
            FakeUser {
                password: password.to_string(),
                tags: tags.to_vec(),
            },
        );
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> BrokerResult<()> {
        self.call("delete_user", Some(username)).await?;
        self.state().users.remove(username);
        Ok(())
    }

    async fn list_users(&self) -> BrokerResult<Vec<UserInfo>> {
        self.call("list_users", None).await?;
        Ok(self
            .state()
            .users
            .keys()
            .map(|name| UserInfo { name: name.clone() })
            .collect())
    }

    async fn put_permissions(
        &self,
        vhost: &str,
        username: &str,
        rule: &PermissionRule,
    ) -> BrokerResult<()> {
        self.call("put_permissions", Some(username)).await?;
        self.state()
            .permissions
            .insert((vhost.to_string(), username.to_string()), rule.clone());
        Ok(())
    }

    async fn delete_permissions(&self, vhost: &str, username: &str) -> BrokerResult<()> {
        self.call("delete_permissions", Some(username)).await?;
        self.state()
            .permissions
            .remove(&(vhost.to_string(), username.to_string()));
        Ok(())
    }

    async fn list_queues(&self, _vhost: &str) -> BrokerResult<Vec<QueueInfo>> {
        self.call("list_queues", None).await?;
        Ok(self
            .state()
            .queues
            .iter()
            .map(|(name, messages)| QueueInfo {
                name: name.clone(),
                messages: *messages,
                consumers: 0,
            })
            .collect())
    }

    async fn delete_queue(&self, _vhost: &str, name: &str) -> BrokerResult<()> {
        self.call("delete_queue", Some(name)).await?;
        self.state().queues.remove(name);
        Ok(())
    }

    async fn list_exchanges(&self, _vhost: &str) -> BrokerResult<Vec<ExchangeInfo>> {
        self.call("list_exchanges", None).await?;
        Ok(self
            .state()
            .exchanges
            .iter()
            .map(|name| ExchangeInfo {
                name: name.clone(),
                kind: String::from("topic"),
            })
            .collect())
    }

    async fn delete_exchange(&self, _vhost: &str, name: &str) -> BrokerResult<()> {
        self.call("delete_exchange", Some(name)).await?;
        self.state().exchanges.remove(name);
        Ok(())
    }
}
