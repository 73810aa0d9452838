use serde::{Deserialize, Deserializer};

/// Queue as reported by the management API.
///
/// `messages` is absent or null until the broker has collected stats for a
/// new queue; both read as zero.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueInfo {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub messages: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub consumers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExchangeInfo {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub name: String,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}
