use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sort key defining the single global order of all tickets
pub type Rank = i64;

/// Opaque handle for a persisted ticket. Values `<= 0` mean "no ticket".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(i64);

impl TicketId {
    pub const INVALID: TicketId = TicketId(0);

    pub fn new(number: i64) -> Self {
        TicketId(number)
    }

    pub fn number(self) -> i64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "TK-{}", self.0)
        } else {
            f.write_str("INVALID")
        }
    }
}

/// Board stage of a ticket. Ordered Todo < InProgress < Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    /// Every status, in column order
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    /// Stable persisted form
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "Todo",
            Status::InProgress => "InProgress",
            Status::Done => "Done",
        }
    }

    pub fn column_title(self) -> &'static str {
        match self {
            Status::Todo => "TODO",
            Status::InProgress => "IN PROGRESS",
            Status::Done => "DONE",
        }
    }

    /// The following stage, or `None` at Done
    pub fn next(self) -> Option<Status> {
        match self {
            Status::Todo => Some(Status::InProgress),
            Status::InProgress => Some(Status::Done),
            Status::Done => None,
        }
    }

    /// The preceding stage, or `None` at Todo
    pub fn previous(self) -> Option<Status> {
        match self {
            Status::Todo => None,
            Status::InProgress => Some(Status::Todo),
            Status::Done => Some(Status::InProgress),
        }
    }

    /// Column position of this status
    pub fn index(self) -> usize {
        match self {
            Status::Todo => 0,
            Status::InProgress => 1,
            Status::Done => 2,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ticket status: {0:?}")]
pub struct ParseStatusError(pub String);

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Todo" => Ok(Status::Todo),
            "InProgress" => Ok(Status::InProgress),
            "Done" => Ok(Status::Done),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A ticket as held in memory. An empty description means none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: TicketId,
    pub status: Status,
    pub title: String,
    pub description: String,
    pub rank: Rank,
}

impl Ticket {
    /// Text the list filter matches against
    pub fn filter_value(&self) -> String {
        format!("{} {}", self.title, self.id)
    }
}
