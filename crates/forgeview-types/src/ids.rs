//! Typed identifiers for diagnostics and spans.
//!
//! Both ID types wrap the `u32` counters the build backend assigns during
//! lowering (1-based, monotonic within one build run). They're opaque on the
//! wire (plain JSON numbers) and only meaningful within the run that produced
//! them — a new build run restarts the counters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A diagnostic identifier, unique within one build run.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticId(u32);

/// A span identifier, unique within the owning diagnostic's span collection.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanId(u32);

// ── Shared behavior ─────────────────────────────────────────────────────────

macro_rules! impl_typed_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Wrap a raw backend-assigned counter value.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// The raw counter value.
            pub const fn raw(&self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $T {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($name, "({})"), self.0)
            }
        }
    };
}

impl_typed_id!(DiagnosticId, "DiagnosticId");
impl_typed_id!(SpanId, "SpanId");
