// Step specifications - the individual messages that make up a signaling flow

//! # Step Specifications
//!
//! A flow is an ordered list of expected protocol messages. Each expected message
//! is a [`StepSpec`]: a text pattern, the protocol that carries it and the
//! direction it travels in.
//!
//! ## Direction Tags
//!
//! Logs mark direction with short raw tags (`U`, `D`, sometimes lower-case).
//! Matching compares those raw tags case-insensitively rather than their meaning,
//! so `DirectionTag` keeps the tag text and only maps it onto the semantic
//! [`Direction`] enum for display.
//!
//! ## Rust Learning Notes:
//!
//! ### Newtype Pattern
//! `DirectionTag(String)` wraps a plain string in its own type. The compiler then
//! keeps direction tags apart from protocol tags and message text, even though all
//! three are strings underneath.
//!
//! ### Serde Renames
//! `#[serde(rename = "...")]` keeps the Rust field names descriptive while the
//! JSON shape stays compact (`msg`, `protocol`, `dir`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic direction of a signaling message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// UE towards the network
    Uplink,
    /// Network towards the UE
    Downlink,
}

impl Direction {
    /// The canonical raw tag used in logs for this direction
    pub fn tag(&self) -> &'static str {
        match self {
            Direction::Uplink => "u",
            Direction::Downlink => "d",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Uplink => write!(f, "uplink"),
            Direction::Downlink => write!(f, "downlink"),
        }
    }
}

/// Raw direction tag exactly as it appears in a log or catalog entry
///
/// Two tags are considered equal for matching when their lower-cased text is
/// equal. `"D"` matches `"d"`, but `"downlink"` does not match `"d"` even though
/// both mean the same thing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectionTag(pub String);

impl DirectionTag {
    /// Create a tag from any string-like input
    ///
    /// ```rust
    /// # use protocol_analyzer::DirectionTag;
    /// let tag = DirectionTag::new("U");
    /// assert_eq!(tag.as_str(), "U");
    /// ```
    pub fn new<S: Into<String>>(tag: S) -> Self {
        DirectionTag(tag.into())
    }

    /// Get the raw tag text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Literal, case-insensitive tag comparison used by the step matcher
    pub fn matches(&self, other: &DirectionTag) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }

    /// Interpret the tag, if it is one of the known spellings
    pub fn direction(&self) -> Option<Direction> {
        match self.0.trim().to_lowercase().as_str() {
            "u" | "ul" | "uplink" => Some(Direction::Uplink),
            "d" | "dl" | "downlink" => Some(Direction::Downlink),
            _ => None,
        }
    }
}

impl From<&str> for DirectionTag {
    fn from(s: &str) -> Self {
        DirectionTag(s.to_string())
    }
}

impl From<String> for DirectionTag {
    fn from(s: String) -> Self {
        DirectionTag(s)
    }
}

impl From<Direction> for DirectionTag {
    fn from(direction: Direction) -> Self {
        DirectionTag(direction.tag().to_string())
    }
}

impl fmt::Display for DirectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One expected message within a flow
///
/// ## Examples:
///
/// **RRC setup request**: pattern `"rrcSetupRequest"`, protocol `"nrrrc"`, dir `"u"`
/// **NAS security mode**: pattern `"Security mode command"`, protocol `"nas"`, dir `"d"`
///
/// Patterns are matched token by token (see [`crate::engine::matcher`]), so a
/// multi-word pattern such as `"PDU session establishment request"` still
/// matches a log line with extra words in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Message text pattern, tokenized on whitespace
    #[serde(rename = "msg")]
    pub pattern: String,

    /// Protocol tag the message must be carried by (`nas`, `nrrrc`, `sip`, ...)
    #[serde(rename = "protocol")]
    pub protocol_tag: String,

    /// Raw direction tag the message must carry
    #[serde(rename = "dir")]
    pub direction: DirectionTag,
}

impl StepSpec {
    /// Create a new step specification
    ///
    /// ## Rust Learning Notes:
    ///
    /// ### Into<T> Parameters
    /// Accepting `Into<String>` / `Into<DirectionTag>` lets callers pass string
    /// literals, owned strings or an already-built [`Direction`].
    pub fn new<P, T, D>(pattern: P, protocol_tag: T, direction: D) -> Self
    where
        P: Into<String>,
        T: Into<String>,
        D: Into<DirectionTag>,
    {
        StepSpec {
            pattern: pattern.into(),
            protocol_tag: protocol_tag.into(),
            direction: direction.into(),
        }
    }

    /// Shorthand for an uplink step
    pub fn uplink<P: Into<String>, T: Into<String>>(pattern: P, protocol_tag: T) -> Self {
        Self::new(pattern, protocol_tag, Direction::Uplink)
    }

    /// Shorthand for a downlink step
    pub fn downlink<P: Into<String>, T: Into<String>>(pattern: P, protocol_tag: T) -> Self {
        Self::new(pattern, protocol_tag, Direction::Downlink)
    }
}

impl fmt::Display for StepSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}/{}]", self.pattern, self.protocol_tag, self.direction)
    }
}
