use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_MODEL: AtomicU32 = AtomicU32::new(0);

/// Identity of one [`crate::Model`] instance, unique within the process.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ModelId(u32);

impl ModelId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MODEL.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the inner u32 value.
    pub fn inner(self) -> u32 {
        self.0
    }
}

macro_rules! define_handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            model: ModelId,
            index: usize,
        }

        impl $name {
            pub(crate) fn new(model: ModelId, index: usize) -> Self {
                Self { model, index }
            }

            /// Model that registered this entry.
            pub fn model(self) -> ModelId {
                self.model
            }

            /// Registration order within the owning model.
            pub fn index(self) -> usize {
                self.index
            }
        }
    };
}

define_handle_type!(
    /// Untyped identity of a variable: owning model plus column index.
    VarId
);
define_handle_type!(
    /// Identity of a registered restriction: owning model plus row index.
    RestrictionId
);
