// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The identity ticket and its JSON envelope.
//!
//! ```json
//! {"UserId":"u1","Roles":["Editor"],"Data":{"tier":2},"Expire":"2026-10-20T08:00:00Z"}
//! ```

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A self-contained identity record.
///
/// `T` is the caller's payload shape. Providers carry it as an opaque
/// [`Value`] and let the caller pick the shape at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket<T = Value> {
    /// Authenticated principal
    #[serde(rename = "UserId")]
    pub subject: String,

    /// Role labels, original case preserved
    #[serde(rename = "Roles", default, deserialize_with = "null_as_empty")]
    pub roles: Vec<String>,

    /// Caller-defined data, never inspected here
    #[serde(rename = "Data")]
    pub payload: T,

    /// Valid while `now < expiry`
    #[serde(rename = "Expire")]
    pub expiry: DateTime<Utc>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<T> Ticket<T> {
    pub fn new(
        subject: impl Into<String>,
        roles: Vec<String>,
        payload: T,
        expiry: DateTime<Utc>,
    ) -> Self {
        Self {
            subject: subject.into(),
            roles,
            payload,
            expiry,
        }
    }

    /// Case-insensitive role membership.
    pub fn has_role(&self, role: &str) -> bool {
        let wanted = role.to_lowercase();
        self.roles.iter().any(|r| r.to_lowercase() == wanted)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl<T: Serialize> Ticket<T> {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl<T: DeserializeOwned> Ticket<T> {
    /// Parse an envelope into the requested payload shape.
    ///
    /// Malformed JSON, a missing field, a payload of the wrong shape, or a
    /// blank `UserId` all yield `None`.
    pub fn from_json(text: &str) -> Option<Self> {
        Self::from_slice(text.as_bytes())
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<Self>(bytes) {
            Ok(ticket) if !ticket.subject.trim().is_empty() => Some(ticket),
            Ok(_) => {
                tracing::debug!("ticket envelope has a blank subject");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "ticket envelope did not parse");
                None
            }
        }
    }
}

impl Ticket<Value> {
    /// Interpret the opaque payload as `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.payload.clone()).ok()
    }

    /// Interpret the whole ticket with a typed payload.
    pub fn into_typed<T: DeserializeOwned>(self) -> Option<Ticket<T>> {
        let payload = serde_json::from_value(self.payload).ok()?;
        Some(Ticket {
            subject: self.subject,
            roles: self.roles,
            payload,
            expiry: self.expiry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        tier: u32,
    }

    fn expiry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 20, 8, 0, 0).unwrap()
    }

    #[test]
    fn envelope_uses_wire_field_names() {
        let ticket = Ticket::new(
            "u1",
            vec!["Editor".to_string()],
            json!({"tier": 2}),
            expiry(),
        );
        let value: Value = serde_json::from_str(&ticket.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "UserId": "u1",
                "Roles": ["Editor"],
                "Data": {"tier": 2},
                "Expire": "2026-10-20T08:00:00Z"
            })
        );
    }

    #[test]
    fn from_json_reads_typed_payload() {
        let text = r#"{"UserId":"u1","Roles":["Editor"],"Data":{"tier":2},"Expire":"2026-10-20T08:00:00Z"}"#;
        let ticket = Ticket::<Profile>::from_json(text).unwrap();
        assert_eq!(ticket.subject, "u1");
        assert_eq!(ticket.payload, Profile { tier: 2 });
        assert_eq!(ticket.expiry, expiry());
    }

    #[test]
    fn null_roles_become_empty() {
        let text = r#"{"UserId":"u1","Roles":null,"Data":null,"Expire":"2026-10-20T08:00:00Z"}"#;
        let ticket = Ticket::<Option<Profile>>::from_json(text).unwrap();
        assert!(ticket.roles.is_empty());
        assert!(ticket.payload.is_none());
    }

    #[test]
    fn from_json_rejects_bad_input() {
        assert!(Ticket::<Value>::from_json("not json").is_none());
        assert!(Ticket::<Value>::from_json(r#"{"UserId":"u1"}"#).is_none());
        assert!(Ticket::<Value>::from_json(
            r#"{"UserId":"  ","Roles":[],"Data":1,"Expire":"2026-10-20T08:00:00Z"}"#
        )
        .is_none());
        assert!(Ticket::<Profile>::from_json(
            r#"{"UserId":"u1","Roles":[],"Data":"text","Expire":"2026-10-20T08:00:00Z"}"#
        )
        .is_none());
    }

    #[test]
    fn has_role_ignores_case_and_keeps_storage() {
        let ticket = Ticket::new("u1", vec!["Admin".to_string()], Value::Null, expiry());
        assert!(ticket.has_role("admin"));
        assert!(ticket.has_role("ADMIN"));
        assert!(!ticket.has_role("editor"));
        assert_eq!(ticket.roles, vec!["Admin".to_string()]);
    }

    #[test]
    fn has_role_is_false_without_roles() {
        let ticket = Ticket::new("u1", Vec::new(), Value::Null, expiry());
        assert!(!ticket.has_role("admin"));
    }

    #[test]
    fn expiry_is_exclusive() {
        let ticket = Ticket::new("u1", Vec::new(), Value::Null, expiry());
        assert!(!ticket.is_expired_at(expiry() - TimeDelta::seconds(1)));
        assert!(ticket.is_expired_at(expiry()));
        assert!(ticket.is_expired_at(expiry() + TimeDelta::seconds(1)));
    }

    #[test]
    fn payload_as_checks_shape() {
        let ticket = Ticket::new("u1", Vec::new(), json!({"tier": 2}), expiry());
        assert_eq!(ticket.payload_as::<Profile>(), Some(Profile { tier: 2 }));
        assert_eq!(ticket.payload_as::<String>(), None);

        let typed = ticket.into_typed::<Profile>().unwrap();
        assert_eq!(typed.payload.tier, 2);
    }
}
