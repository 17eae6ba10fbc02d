//! Strongly typed component identifier.
//!
//! `ComponentId` is `Copy + Ord + Hash` so it works as a map key and as an
//! element of sorted collections.  The resolver relies on `Ord` for its
//! ascending-id tie-break.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel that is never handed out by a registry.
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }

            /// The id that follows `self`, or `None` on overflow into the sentinel.
            #[inline]
            pub fn next(self) -> Option<$name> {
                self.0.checked_add(1).map($name).filter(|id| id.is_valid())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Identifier of a component, unique within one simulation run.
    ///
    /// Assigned at registration time and immutable afterwards.
    pub struct ComponentId(u32);
}
