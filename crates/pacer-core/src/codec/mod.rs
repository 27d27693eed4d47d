//! Flat record codec for the shared activity and membership blobs.
//!
//! Encoding is total. Decoding is tolerant: a malformed row is skipped and
//! reported in [`Decoded::skipped`] while the rest of the collection is
//! still accepted. Nothing in this module returns an error.

mod activity;
mod flat;
mod roster;

#[cfg(test)]
mod tests;

use thiserror::Error;

pub use activity::{
    ACTIVITY_COLUMNS, MIN_ACTIVITY_COLUMNS, TIMESTAMP_FORMAT, decode_activities, encode_activities,
};
pub use roster::{MIN_ROSTER_COLUMNS, ROSTER_COLUMNS, decode_roster, encode_roster};

/// The result of a tolerant decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    /// Rows that were accepted, in input order.
    pub records: Vec<T>,
    /// Rows that were dropped, in input order.
    pub skipped: Vec<SkippedRow>,
}

impl<T> Decoded<T> {
    /// Returns `true` if every data row was accepted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// A row dropped during decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line on which the row starts.
    pub line: usize,
    /// Why the row was dropped.
    pub reason: SkipReason,
}

/// Why a row could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SkipReason {
    /// The row has fewer columns than the format requires.
    #[error("row has {found} columns, at least {required} required")]
    TooFewColumns {
        /// Columns present.
        found: usize,
        /// Minimum accepted.
        required: usize,
    },

    /// The referenced member is not in the supplied roster.
    #[error("unknown member: {name:?}")]
    UnknownMember {
        /// The member name found in the row.
        name: String,
    },

    /// More than one roster member carries the referenced name.
    #[error("ambiguous member: {name:?} matches several team members")]
    AmbiguousMember {
        /// The member name found in the row.
        name: String,
    },

    /// A timestamp column could not be parsed.
    #[error("invalid {column} timestamp: {value:?}")]
    InvalidTimestamp {
        /// Column name.
        column: &'static str,
        /// Raw field contents.
        value: String,
    },

    /// A required timestamp column is empty.
    #[error("missing {column} timestamp")]
    MissingTimestamp {
        /// Column name.
        column: &'static str,
    },

    /// A required text column is empty.
    #[error("empty {column} field")]
    EmptyField {
        /// Column name.
        column: &'static str,
    },
}
