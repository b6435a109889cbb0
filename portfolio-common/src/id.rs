//! Typed string ids and the generator that mints new ones.
//!
//! Ids are opaque strings such as `post-17` or `teacher-1`. The marker type
//! keeps a post id from being passed where a student id is expected.
//! Generated ids have the shape `<prefix>-<unix millis>-<counter>`, where the
//! counter wraps and keeps ids minted within one millisecond apart.

use derive_where::derive_where;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Borrow,
    fmt::{Display, Formatter},
    marker::PhantomData,
};
use time::UtcDateTime;

pub const COUNTER_LENGTH: u32 = 12;

#[derive_where(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<Marker>(String, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into(), PhantomData)
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('-'))
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> From<&str> for Id<Marker> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<String> for Id<Marker> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<Marker> Borrow<str> for Id<Marker> {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive_where(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct IdGenerator<Marker> {
    next_counter: u16,
    phantom_data: PhantomData<Marker>,
}

impl<Marker> IdGenerator<Marker> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_counter: 0,
            phantom_data: PhantomData,
        }
    }

    pub fn generate_at(&mut self, prefix: &str, time: UtcDateTime) -> Id<Marker> {
        let counter = self.next_counter;
        self.next_counter = (self.next_counter + 1) % (1 << COUNTER_LENGTH);

        let millis = time.unix_timestamp_nanos() / 1_000_000;
        Id::new(format!("{prefix}-{millis}-{counter}"))
    }

    pub fn generate(&mut self, prefix: &str) -> Id<Marker> {
        self.generate_at(prefix, UtcDateTime::now())
    }
}
