//! Transaction processing phases.

use crate::error::{Error, Result};

/// Processing phases a transaction advances through.
///
/// `Begin` and `End` are sentinels: no rule can be registered in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Phase {
    /// Sentinel before any processing.
    #[default]
    Begin = 0,
    /// Phase 1: Connection established
    Connection = 1,
    /// Phase 2: Request headers
    RequestHeaders = 2,
    /// Phase 3: Request body
    RequestBody = 3,
    /// Phase 4: Response headers
    ResponseHeaders = 4,
    /// Phase 5: Response body
    ResponseBody = 5,
    /// Phase 6: Logging
    Logging = 6,
    /// Sentinel after all processing.
    End = 7,
}

/// Number of phase slots, sentinels included.
pub const PHASE_SLOTS: usize = Phase::End as usize + 1;

impl Phase {
    /// Get the phase number.
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Slot index for phase-indexed tables.
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    /// Get phase name.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Begin => "BEGIN",
            Phase::Connection => "CONNECTION",
            Phase::RequestHeaders => "REQUEST_HEADERS",
            Phase::RequestBody => "REQUEST_BODY",
            Phase::ResponseHeaders => "RESPONSE_HEADERS",
            Phase::ResponseBody => "RESPONSE_BODY",
            Phase::Logging => "LOGGING",
            Phase::End => "END",
        }
    }

    /// Create from phase number.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            0 => Some(Phase::Begin),
            1 => Some(Phase::Connection),
            2 => Some(Phase::RequestHeaders),
            3 => Some(Phase::RequestBody),
            4 => Some(Phase::ResponseHeaders),
            5 => Some(Phase::ResponseBody),
            6 => Some(Phase::Logging),
            7 => Some(Phase::End),
            _ => None,
        }
    }

    /// Get all rule-bearing phases in order.
    pub fn all() -> &'static [Phase] {
        &[
            Phase::Connection,
            Phase::RequestHeaders,
            Phase::RequestBody,
            Phase::ResponseHeaders,
            Phase::ResponseBody,
            Phase::Logging,
        ]
    }

    /// Whether rules may be registered in this phase (strictly between the sentinels).
    pub fn accepts_rules(&self) -> bool {
        *self > Phase::Begin && *self < Phase::End
    }
}

impl TryFrom<u8> for Phase {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Phase::from_number(value).ok_or(Error::InvalidPhase { value })
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
