//! Command frame encoding for the node's serial configuration protocol.
//!
//! Every configuration change is sent as a single ASCII frame:
//!
//! ```text
//! <TRACTION|M1:P<v>,I<v>,D<v>|M2:...|M3:...|M4:...|M5:...>
//! <BRAKE|Profile:<name>>
//! <CONTROL|Mode:<Manual|Auto|Diagnostic>>
//! ```
//!
//! Field values are inserted verbatim. Blank PID fields are rendered as `0`.
//! Nothing inside a value is escaped, so callers must keep the framing
//! characters out of free text (see [`crate::validation`]).
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NodeToolError, Result};

/// Number of traction modes the node exposes.
pub const MODE_COUNT: usize = 5;

pub const FRAME_START: char = '<';
pub const FRAME_END: char = '>';
pub const FIELD_SEPARATOR: &str = "|";

/// Literal used on the wire for a blank PID field.
const BLANK_FIELD: &str = "0";

fn or_zero(value: &str) -> &str {
    if value.is_empty() {
        BLANK_FIELD
    } else {
        value
    }
}

/// Proportional / integral / derivative gains for one traction mode.
///
/// Values are opaque text; no numeric parsing happens anywhere in this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidTriple {
    #[serde(rename = "P", default)]
    pub p: String,
    #[serde(rename = "I", default)]
    pub i: String,
    #[serde(rename = "D", default)]
    pub d: String,
}

impl PidTriple {
    pub fn new(p: impl Into<String>, i: impl Into<String>, d: impl Into<String>) -> Self {
        Self {
            p: p.into(),
            i: i.into(),
            d: d.into(),
        }
    }

    /// Gains as they appear on the wire, blanks replaced by `0`.
    pub fn rendered(&self) -> (&str, &str, &str) {
        (or_zero(&self.p), or_zero(&self.i), or_zero(&self.d))
    }

    fn segment(&self, index: usize) -> String {
        let (p, i, d) = self.rendered();
        format!("M{index}:P{p},I{i},D{d}")
    }
}

/// PID gains for Mode1..Mode5, in that order.
///
/// Any length can be constructed; [`encode`] and the preset store insist on
/// exactly [`MODE_COUNT`] entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TractionProfile {
    modes: Vec<PidTriple>,
}

impl TractionProfile {
    pub fn new(modes: Vec<PidTriple>) -> Self {
        Self { modes }
    }

    pub fn modes(&self) -> &[PidTriple] {
        &self.modes
    }

    /// Replace the gains of a 1-based mode. Returns false when out of range.
    pub fn set_mode(&mut self, index: usize, triple: PidTriple) -> bool {
        match index.checked_sub(1).and_then(|i| self.modes.get_mut(i)) {
            Some(slot) => {
                *slot = triple;
                true
            }
            None => false,
        }
    }

    /// Fails with `MalformedProfile` unless there is one triple per mode.
    pub fn check_complete(&self) -> Result<()> {
        if self.modes.len() == MODE_COUNT {
            Ok(())
        } else {
            Err(NodeToolError::MalformedProfile {
                expected: MODE_COUNT,
                found: self.modes.len(),
            })
        }
    }

    /// Mode keys paired with their triples: `("Mode1", ..)` and so on.
    pub fn keyed(&self) -> impl Iterator<Item = (String, &PidTriple)> {
        self.modes
            .iter()
            .enumerate()
            .map(|(idx, triple)| (mode_key(idx + 1), triple))
    }
}

impl Default for TractionProfile {
    fn default() -> Self {
        Self {
            modes: vec![PidTriple::default(); MODE_COUNT],
        }
    }
}

/// Key used for a 1-based mode in the preset file.
pub fn mode_key(index: usize) -> String {
    format!("Mode{index}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerMode {
    Manual,
    Auto,
    Diagnostic,
}

impl ControllerMode {
    pub const ALL: [ControllerMode; 3] = [
        ControllerMode::Manual,
        ControllerMode::Auto,
        ControllerMode::Diagnostic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerMode::Manual => "Manual",
            ControllerMode::Auto => "Auto",
            ControllerMode::Diagnostic => "Diagnostic",
        }
    }
}

impl fmt::Display for ControllerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControllerMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown controller mode '{s}' (expected Manual, Auto or Diagnostic)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeDirection {
    Read,
    Write,
}

impl FromStr for NodeDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(NodeDirection::Read),
            "write" => Ok(NodeDirection::Write),
            _ => Err(format!("unknown direction '{s}' (expected Read or Write)")),
        }
    }
}

/// One operator configuration action, built by the caller and handed to [`encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigRequest {
    Traction(TractionProfile),
    Brake { profile: String },
    Control { mode: ControllerMode },
    /// Collected by the operator UI but without a defined wire format.
    CustomNode {
        node: String,
        direction: NodeDirection,
        data: String,
    },
}

impl ConfigRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigRequest::Traction(_) => "traction",
            ConfigRequest::Brake { .. } => "brake",
            ConfigRequest::Control { .. } => "control",
            ConfigRequest::CustomNode { .. } => "custom node",
        }
    }
}

/// A finished command frame. Produced fresh for each send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(String);

impl Frame {
    fn wrap(command: &str, body: &str) -> Self {
        Frame(format!("{FRAME_START}{command}{FIELD_SEPARATOR}{body}{FRAME_END}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode a request into its command frame. Pure; performs no IO.
pub fn encode(request: &ConfigRequest) -> Result<Frame> {
    match request {
        ConfigRequest::Traction(profile) => {
            profile.check_complete()?;
            let body = profile
                .modes()
                .iter()
                .enumerate()
                .map(|(idx, triple)| triple.segment(idx + 1))
                .collect::<Vec<_>>()
                .join(FIELD_SEPARATOR);
            Ok(Frame::wrap("TRACTION", &body))
        }
        ConfigRequest::Brake { profile } => Ok(Frame::wrap("BRAKE", &format!("Profile:{profile}"))),
        ConfigRequest::Control { mode } => Ok(Frame::wrap("CONTROL", &format!("Mode:{mode}"))),
        ConfigRequest::CustomNode { .. } => Err(NodeToolError::UnsupportedRequest(request.kind())),
    }
}
