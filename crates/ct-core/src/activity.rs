//! Activity events reported by the editor/terminal integration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{BranchName, ValidationError};

/// Kinds of interaction that count as engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Edit,
    Save,
    FileSwitch,
    Terminal,
    Debug,
    Build,
    Heartbeat,
}

impl ActivityKind {
    pub const ALL: [Self; 7] = [
        Self::Edit,
        Self::Save,
        Self::FileSwitch,
        Self::Terminal,
        Self::Debug,
        Self::Build,
        Self::Heartbeat,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Save => "save",
            Self::FileSwitch => "file_switch",
            Self::Terminal => "terminal",
            Self::Debug => "debug",
            Self::Build => "build",
            Self::Heartbeat => "heartbeat",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.as_str().replace('_', "-") == s)
            .ok_or_else(|| ValidationError::InvalidActivityKind {
                value: s.to_string(),
            })
    }
}

impl Serialize for ActivityKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One discrete interaction, attributed to the branch active when it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub timestamp_ms: i64,
    #[serde(default)]
    pub branch: BranchName,
}

impl ActivityEvent {
    pub const fn new(kind: ActivityKind, timestamp_ms: i64, branch: BranchName) -> Self {
        Self {
            kind,
            timestamp_ms,
            branch,
        }
    }
}
