use crate::{BrokerAdmin, BrokerError, BrokerResult, ExchangeInfo, QueueInfo, UserInfo};

use tmq_core::PermissionRule;

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use log::debug;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Broker admin client over the RabbitMQ management HTTP API.
///
/// Every call waits on a shared rate limiter before it is sent and is
/// bounded by the client-wide request timeout.
pub struct HttpBrokerAdmin {
    base_url: Url,
    username: String,
    password: String,
    client: ReqwestClient,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpBrokerAdmin {
    /// # Arguments
    /// * `base_url` - Management API root (e.g., "http://127.0.0.1:15672")
    /// * `request_timeout` - Upper bound for one request, body included
    /// * `max_requests_per_second` - Rate cap shared by all calls on this client
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
        request_timeout: Duration,
        max_requests_per_second: u32,
    ) -> BrokerResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| BrokerError::url(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BrokerError::url(format!("{} cannot be a base URL", base_url)));
        }

        let client = ReqwestClient::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BrokerError::from_reqwest("build client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(max_requests_per_second).unwrap_or(NonZeroU32::MIN),
        );

        Ok(Self {
            base_url,
            username: username.to_string(),
            password: password.to_string(),
            client,
            limiter: RateLimiter::direct(quota),
        })
    }

    /// `/api/<segments...>` with each segment percent-encoded, so a vhost of
    /// `/` becomes `%2F`.
    fn endpoint(&self, segments: &[&str]) -> BrokerResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| BrokerError::url(format!("{} cannot be a base URL", self.base_url)))?;
            path.pop_if_empty().push("api").extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
    }

    /// Send after the rate limiter admits the call, and map the status.
    async fn execute(&self, operation: &str, req: RequestBuilder) -> BrokerResult<Response> {
        self.limiter.until_ready().await;

        let response = req
            .send()
            .await
            .map_err(|e| BrokerError::from_reqwest(operation, e))?;
        let status = response.status();

        if status.is_success() {
            debug!("{} -> {}", operation, status);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            Err(BrokerError::transient(
                operation,
                format!("status {}: {}", status.as_u16(), body),
            ))
        } else {
            Err(BrokerError::rejected(operation, status.as_u16(), body))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, url: Url) -> BrokerResult<T> {
        let response = self.execute(operation, self.request(Method::GET, url)).await?;
        let body = response
            .text()
            .await
            .map_err(|e| BrokerError::from_reqwest(operation, e))?;

        Ok(serde_json::from_str(&body)?)
    }

    async fn put_json<B: Serialize + Sync>(
        &self,
        operation: &str,
        url: Url,
        body: &B,
    ) -> BrokerResult<()> {
        let req = self.request(Method::PUT, url).json(body);
        self.execute(operation, req).await?;
        Ok(())
    }

    /// DELETE where 404 means the target is already gone.
    async fn delete(&self, operation: &str, url: Url) -> BrokerResult<()> {
        match self.execute(operation, self.request(Method::DELETE, url)).await {
            Ok(_) => Ok(()),
            Err(BrokerError::Rejected { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                debug!("{} -> already gone", operation);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[derive(Serialize)]
struct PutUserRequest<'a> {
    password: &'a str,
    tags: String,
}

#[async_trait]
impl BrokerAdmin for HttpBrokerAdmin {
    async fn put_user(
        &self,
        username: &str,
        password: &str,
        tags: &[String],
    ) -> BrokerResult<()> {
        let url = self.endpoint(&["users", username])?;
        let body = PutUserRequest {
            password,
            tags: tags.join(","),
        };
        self.put_json(&format!("put user {}", username), url, &body)
            .await
    }

    async fn delete_user(&self, username: &str) -> BrokerResult<()> {
        let url = self.endpoint(&["users", username])?;
        self.delete(&format!("delete user {}", username), url).await
    }

    async fn list_users(&self) -> BrokerResult<Vec<UserInfo>> {
        let url = self.endpoint(&["users"])?;
        self.get_json("list users", url).await
    }

    async fn put_permissions(
        &self,
        vhost: &str,
        username: &str,
        rule: &PermissionRule,
    ) -> BrokerResult<()> {
        let url = self.endpoint(&["permissions", vhost, username])?;
        self.put_json(&format!("put permissions {}", username), url, rule)
            .await
    }

    async fn delete_permissions(&self, vhost: &str, username: &str) -> BrokerResult<()> {
        let url = self.endpoint(&["permissions", vhost, username])?;
        self.delete(&format!("delete permissions {}", username), url)
            .await
    }

    async fn list_queues(&self, vhost: &str) -> BrokerResult<Vec<QueueInfo>> {
        let url = self.endpoint(&["queues", vhost])?;
        self.get_json("list queues", url).await
    }

    async fn delete_queue(&self, vhost: &str, name: &str) -> BrokerResult<()> {
        let url = self.endpoint(&["queues", vhost, name])?;
        self.delete(&format!("delete queue {}", name), url).await
    }

    async fn list_exchanges(&self, vhost: &str) -> BrokerResult<Vec<ExchangeInfo>> {
        let url = self.endpoint(&["exchanges", vhost])?;
        self.get_json("list exchanges", url).await
    }

    async fn delete_exchange(&self, vhost: &str, name: &str) -> BrokerResult<()> {
        let url = self.endpoint(&["exchanges", vhost, name])?;
        self.delete(&format!("delete exchange {}", name), url).await
    }
}
