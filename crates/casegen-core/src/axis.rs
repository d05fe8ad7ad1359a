//! Request axes and the total axis-to-value mapping.
//!
//! The six axes are fixed process-wide. They are an ordered enum rather than
//! a set of names so every walk over them visits the same order, which keeps
//! example collection and test output stable across runs.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// One independent facet of a request
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Axis {
    PathParameters,
    Headers,
    Cookies,
    Query,
    Body,
    FormData,
}

impl Axis {
    /// Every axis, in iteration order.
    pub const ALL: [Self; 6] = [
        Self::PathParameters,
        Self::Headers,
        Self::Cookies,
        Self::Query,
        Self::Body,
        Self::FormData,
    ];

    /// Position of this axis in [`Axis::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::PathParameters => 0,
            Self::Headers => 1,
            Self::Cookies => 2,
            Self::Query => 3,
            Self::Body => 4,
            Self::FormData => 5,
        }
    }

    /// Whether a fixed value for this axis must be a mapping.
    ///
    /// Only the body may hold an arbitrary JSON value.
    #[must_use]
    pub const fn requires_mapping(self) -> bool {
        !matches!(self, Self::Body)
    }

    /// The snake_case name, as used in endpoint and case documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A total mapping from every [`Axis`] to a `T`, stored in axis order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisMap<T> {
    slots: [T; 6],
}

impl<T> AxisMap<T> {
    /// Build a map by calling `f` once per axis, in axis order.
    pub fn from_fn(f: impl FnMut(Axis) -> T) -> Self {
        Self {
            slots: Axis::ALL.map(f),
        }
    }

    /// Build a map from a fallible function, stopping at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(Axis) -> Result<T, E>) -> Result<Self, E> {
        let [a, b, c, d, e, g] = Axis::ALL;
        Ok(Self {
            slots: [f(a)?, f(b)?, f(c)?, f(d)?, f(e)?, f(g)?],
        })
    }

    /// Value for one axis.
    #[must_use]
    pub fn get(&self, axis: Axis) -> &T {
        &self.slots[axis.index()]
    }

    /// Replace the value for one axis, returning the previous one.
    pub fn replace(&mut self, axis: Axis, value: T) -> T {
        std::mem::replace(&mut self.slots[axis.index()], value)
    }

    /// Iterate `(axis, value)` pairs in axis order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &T)> {
        Axis::ALL.into_iter().zip(self.slots.iter())
    }

    /// Transform every value, keeping axis positions.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> AxisMap<U> {
        AxisMap {
            slots: self.slots.map(f),
        }
    }

    /// Consume the map into its values, in axis order.
    pub fn into_array(self) -> [T; 6] {
        self.slots
    }
}
