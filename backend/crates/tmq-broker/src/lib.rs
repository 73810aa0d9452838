pub mod broker_admin;
pub mod error;
pub mod http_broker_admin;
pub mod models;


pub use broker_admin::BrokerAdmin;
pub use error::{BrokerError, Result as BrokerResult};
pub use http_broker_admin::HttpBrokerAdmin;
pub use models::{ExchangeInfo, QueueInfo, UserInfo};
