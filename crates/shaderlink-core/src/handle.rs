//! Strongly typed wrappers around host object ids.
//!
//! The host hands out bare integers for contexts, shaders and programs. Each
//! kind gets its own newtype so a shader id can never be passed where a
//! program id is expected. The raw value `0` is the null object.

use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// The null object
            pub const NULL: Self = Self(0);

            /// Wrap a raw id received from the host
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Raw id to pass back to the host
            pub const fn raw(self) -> u32 {
                self.0
            }

            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }

        impl From<$name> for u32 {
            fn from(handle: $name) -> u32 {
                handle.0
            }
        }
    };
}

define_handle!(
    /// A host drawing session bound to one surface
    ContextHandle,
    "context"
);
define_handle!(
    /// One shader object owned by the host
    ShaderHandle,
    "shader"
);
define_handle!(
    /// A program object owned by the host
    ProgramHandle,
    "program"
);
