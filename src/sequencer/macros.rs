//! Macros for declaring trial state enums.

/// Generate a `State` trait implementation for simple enums.
///
/// # Example
///
/// ```
/// use trialflow::state_enum;
///
/// state_enum! {
///     pub enum TrialState {
///         InitTrial,
///         SearchDisplay,
///         Iti,
///         FinishTrial,
///     }
///     terminal: [FinishTrial]
///     abort_target: [Iti]
/// }
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(terminal: [$($terminal:ident),* $(,)?])?
        $(abort_target: [$($abort:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_terminal(&self) -> bool {
                match self {
                    $($(Self::$terminal => true,)*)?
                    _ => false,
                }
            }

            fn is_abort_target(&self) -> bool {
                match self {
                    $($(Self::$abort => true,)*)?
                    _ => false,
                }
            }
        }
    };
}
