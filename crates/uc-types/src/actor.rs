use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Role of a supply-chain participant, issued by the identity collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Farmer,
    Transporter,
    Retailer,
    Consumer,
    System,
}

impl ActorRole {
    pub const ALL: [ActorRole; 5] = [
        Self::Farmer,
        Self::Transporter,
        Self::Retailer,
        Self::Consumer,
        Self::System,
    ];

    /// Wire/display name (`FARMER`, `TRANSPORTER`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Farmer => "FARMER",
            Self::Transporter => "TRANSPORTER",
            Self::Retailer => "RETAILER",
            Self::Consumer => "CONSUMER",
            Self::System => "SYSTEM",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypeError::UnknownRole(s.to_string()))
    }
}

/// Stable actor identifier (a DID or account id from the identity service).
///
/// The core treats it as opaque.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An actor identifier paired with its role tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorRef {
    pub id: ActorId,
    pub role: ActorRole,
}

impl ActorRef {
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: ActorId::new(id),
            role,
        }
    }

    /// The system actor used for internally generated events.
    pub fn system() -> Self {
        Self::new("system", ActorRole::System)
    }
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("farmer".parse::<ActorRole>().unwrap(), ActorRole::Farmer);
        assert_eq!("RETAILER".parse::<ActorRole>().unwrap(), ActorRole::Retailer);
        assert_eq!(
            "miller".parse::<ActorRole>().unwrap_err(),
            TypeError::UnknownRole("miller".into())
        );
    }

    #[test]
    fn role_serializes_screaming_case() {
        let json = serde_json::to_string(&ActorRole::Transporter).unwrap();
        assert_eq!(json, "\"TRANSPORTER\"");
    }

    #[test]
    fn actor_ref_display() {
        let actor = ActorRef::new("did:uc:farmer-7", ActorRole::Farmer);
        assert_eq!(actor.to_string(), "FARMER:did:uc:farmer-7");
        assert_eq!(ActorRef::system().role, ActorRole::System);
    }

    #[test]
    fn blank_actor_id() {
        assert!(ActorId::new("  ").is_blank());
        assert!(!ActorId::new("a").is_blank());
    }
}
