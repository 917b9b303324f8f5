//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into SoA `Vec`s, but callers should prefer `.index()`.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Index of a road-network node.  Dense in `[0, node_count)`.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a stored road-network edge.
    pub struct EdgeId(u32);
}

typed_id! {
    /// 1-based position of a source within its category batch.
    ///
    /// The checkpoint log tags every record with this value; resume logic
    /// relies on it increasing strictly with the position in the source list.
    pub struct BatchIndex(u32);
}

impl BatchIndex {
    /// Batch index of the source at 0-based `position`.
    #[inline]
    pub fn from_position(position: usize) -> Self {
        BatchIndex(position as u32 + 1)
    }

    /// 0-based position of this batch index in the source list.
    #[inline]
    pub fn position(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }
}
