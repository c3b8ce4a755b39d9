/// Shared helpers: slot pools, typed slot ids, hashing and lock access

pub mod slot_allocator;
pub mod hash;

pub use slot_allocator::SlotAllocator;
pub use hash::HashCombiner;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a shared subsystem, recovering the guard if a previous holder panicked
///
/// Contract violations panic; the state they leave behind is still the state
/// the driver sees, so poisoning carries no extra information here.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Define a typed dense slot id for a fixed-capacity pool
///
/// Id 0 is invalid; an id is valid iff it is nonzero and below the pool capacity.
macro_rules! slot_id {
    ($(#[$meta:meta])* $name:ident, capacity = $capacity:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(u32);

        impl $name {
            /// The reserved invalid id
            pub const INVALID: Self = Self(0);

            /// Exclusive upper bound of valid ids
            pub const CAPACITY: u32 = $capacity;

            /// Wrap a raw id
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Raw id value
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Nonzero and below the pool capacity
            pub const fn is_valid(self) -> bool {
                self.0 != 0 && self.0 < Self::CAPACITY
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use slot_id;
