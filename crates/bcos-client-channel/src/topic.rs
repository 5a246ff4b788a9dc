//! Topic payloads carried by AMOP and topic frames.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{ChannelError, Result};

/// Longest topic name in bytes; the length prefix is one byte and counts
/// itself.
pub const MAX_TOPIC_LEN: usize = 254;

/// A topic-addressed message.
///
/// Wire form: `u8 (topic_len + 1) || topic || data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMessage {
    topic: String,
    data: Bytes,
}

impl TopicMessage {
    pub fn new(topic: impl Into<String>, data: impl Into<Bytes>) -> Result<Self> {
        let topic = topic.into();
        validate_topic(&topic)?;
        Ok(Self {
            topic,
            data: data.into(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(1 + self.topic.len() + self.data.len());
        // validated in `new`, so this fits in a byte
        buf.put_u8((self.topic.len() + 1) as u8);
        buf.put_slice(self.topic.as_bytes());
        buf.put_slice(&self.data);
        buf.freeze()
    }

    pub fn decode(payload: &Bytes) -> Result<Self> {
        let prefix = *payload
            .first()
            .ok_or_else(|| ChannelError::InvalidTopic("empty payload".into()))?
            as usize;
        if prefix < 2 {
            return Err(ChannelError::InvalidTopic(format!(
                "length prefix {prefix} leaves no topic"
            )));
        }
        if payload.len() < prefix {
            return Err(ChannelError::InvalidTopic(format!(
                "length prefix {prefix} exceeds payload of {} bytes",
                payload.len()
            )));
        }
        let topic = std::str::from_utf8(&payload[1..prefix])
            .map_err(|e| ChannelError::InvalidTopic(e.to_string()))?
            .to_owned();
        Ok(Self {
            topic,
            data: payload.slice(prefix..),
        })
    }
}

fn validate_topic(topic: &str) -> Result<()> {
    if topic.is_empty() {
        return Err(ChannelError::InvalidTopic("topic is empty".into()));
    }
    if topic.len() > MAX_TOPIC_LEN {
        return Err(ChannelError::InvalidTopic(format!(
            "topic is {} bytes (max {MAX_TOPIC_LEN})",
            topic.len()
        )));
    }
    Ok(())
}

/// The set of topics a client listens on, sent as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicReport(Vec<String>);

impl TopicReport {
    pub fn new<I, S>(topics: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let topics: Vec<String> = topics.into_iter().map(Into::into).collect();
        for topic in &topics {
            validate_topic(topic)?;
        }
        Ok(Self(topics))
    }

    pub fn topics(&self) -> &[String] {
        &self.0
    }

    pub fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let report: TopicReport = serde_json::from_slice(payload)?;
        for topic in &report.0 {
            validate_topic(topic)?;
        }
        Ok(report)
    }
}
