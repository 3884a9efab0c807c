//! Typed field selectors.
//!
//! Each selector enum names the text fields of one record part and resolves
//! to a reference into it, so edits never go through string-keyed access.

/// Declares a `Copy` selector enum over the `String` fields of a struct.
///
/// ```ignore
/// text_fields! {
///     pub enum ProcessStepField for ProcessStep {
///         Date => date: "Process Step Date",
///     }
/// }
/// ```
macro_rules! text_fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident for $target:ty {
            $($variant:ident => $field:ident : $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Human-readable label used in validation messages.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Name of the backing field.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($field)),+
                }
            }

            pub fn get(self, target: &$target) -> &str {
                match self {
                    $($name::$variant => &target.$field),+
                }
            }

            #[allow(dead_code)]
            pub(crate) fn get_mut(self, target: &mut $target) -> &mut String {
                match self {
                    $($name::$variant => &mut target.$field),+
                }
            }
        }
    };
}

pub(crate) use text_fields;
