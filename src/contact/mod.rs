//! Contact message model
//!
//! A `ContactMessage` is decoded from the request body, checked for the
//! required fields, stamped with server-observed metadata and then written
//! once to the append log.

pub mod store;

pub use store::MessageStore;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// A single contact form submission
///
/// Field order is the on-disk key order of the JSON Lines log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
    pub ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Reasons a submission is rejected before anything is persisted
///
/// The `Display` text is the client-facing error message.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Invalid JSON")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Missing required fields")]
    MissingFields,
}

impl ContactMessage {
    /// Decode a request body and check the client-supplied fields
    pub fn parse(body: &[u8]) -> Result<Self, SubmissionError> {
        let Submission(message) =
            serde_json::from_slice(body).map_err(SubmissionError::InvalidJson)?;
        if !message.has_required_fields() {
            return Err(SubmissionError::MissingFields);
        }
        Ok(message)
    }

    pub fn has_required_fields(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && !self.message.is_empty()
    }

    /// Overwrite timestamp, client address and user agent with server values
    ///
    /// Whatever the client sent for these fields is discarded. An empty
    /// user agent is dropped so it is omitted from the stored record.
    pub fn stamp(&mut self, at: DateTime<Utc>, ip: Option<IpAddr>, user_agent: Option<&str>) {
        self.ts = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        self.ip = ip.map(|ip| ip.to_string());
        self.user_agent = user_agent
            .filter(|ua| !ua.is_empty())
            .map(ToString::to_string);
    }

    /// Encode as one JSON Lines record, trailing newline included
    pub fn to_json_line(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Request-side decoding of a `ContactMessage`
///
/// Keys match case-insensitively and a repeated key keeps its last value.
/// `null`, whether for a field or for the whole body, leaves the field
/// empty. Any other non-string value for a known key is rejected.
struct Submission(ContactMessage);

impl<'de> Deserialize<'de> for Submission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_option(SubmissionVisitor)
    }
}

struct SubmissionVisitor;

impl<'de> Visitor<'de> for SubmissionVisitor {
    type Value = Submission;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a contact form object")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Submission(ContactMessage::default()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        self.visit_none()
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut message = ContactMessage::default();
        while let Some(key) = map.next_key::<String>()? {
            let slot = match key.to_ascii_lowercase().as_str() {
                "name" => &mut message.name,
                "email" => &mut message.email,
                "message" => &mut message.message,
                "ts" => &mut message.ts,
                "ip" => {
                    if let Some(ip) = map.next_value::<Option<String>>()? {
                        message.ip = Some(ip);
                    }
                    continue;
                }
                "user_agent" => {
                    if let Some(ua) = map.next_value::<Option<String>>()? {
                        message.user_agent = Some(ua);
                    }
                    continue;
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                    continue;
                }
            };
            if let Some(value) = map.next_value::<Option<String>>()? {
                *slot = value;
            }
        }
        Ok(Submission(message))
    }
}
