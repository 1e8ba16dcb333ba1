use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// One of the two independent append-only ledger channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Payments and custody handoffs between actors.
    Economic,
    /// Quality-inspection events.
    Quality,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Economic, Channel::Quality];

    /// Stream name used by storage backends.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economic => "economic",
            Self::Quality => "quality",
        }
    }

    /// Prefix used when rendering record ids (`ECO-000001`).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Economic => "ECO",
            Self::Quality => "QLT",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "economic" => Ok(Self::Economic),
            "quality" => Ok(Self::Quality),
            _ => Err(TypeError::UnknownChannel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        for channel in Channel::ALL {
            assert_eq!(channel.to_string().parse::<Channel>().unwrap(), channel);
        }
        assert!("audit".parse::<Channel>().is_err());
    }
}
