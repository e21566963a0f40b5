//! Strongly typed, zero-cost identifier wrappers.
//!
//! IDs are 0-based slots into the environment's `Vec`s.  Agents (and the
//! observation encodings) see the 1-based [`identity`](TargetId::identity)
//! instead, because action `0` is reserved for "do nothing".

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// 1-based identity as exposed to the learning agent.
            #[inline(always)]
            pub fn identity(self) -> u32 {
                self.0 + 1
            }

            /// Inverse of [`identity`](Self::identity).  `None` for identity 0.
            #[inline]
            pub fn from_identity(identity: u32) -> Option<Self> {
                identity.checked_sub(1).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.identity())
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a transport request (one pickup + one dropoff).
    pub struct TargetId(u32);
}

typed_id! {
    /// Index of a vehicle.
    pub struct DriverId(u32);
}
