//! Flat text encoding for the stored id sets.
//!
//! Each roster column holds decimal snowflakes joined by `;`. Snowflakes are
//! all digits, so the separator can never occur inside an id. An empty column
//! is the empty set, never a set holding one empty id.

use std::collections::BTreeSet;

use crate::domain::ids::{ParseIdError, PlayerId};

pub const SEPARATOR: &str = ";";

pub fn encode<'a>(ids: impl IntoIterator<Item = &'a PlayerId>) -> String {
    // Sorted so the same set always produces the same column value.
    let sorted: BTreeSet<&PlayerId> = ids.into_iter().collect();
    sorted
        .into_iter()
        .map(PlayerId::to_string)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

pub fn decode(raw: &str) -> Result<BTreeSet<PlayerId>, ParseIdError> {
    raw.split(SEPARATOR)
        .filter(|token| !token.is_empty())
        .map(str::parse::<PlayerId>)
        .collect()
}
