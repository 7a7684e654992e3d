//! Macro for port error enums whose variants each carry a message.

/// Declare a port error enum plus one snake-case constructor per variant.
///
/// Every variant holds a single `message: String`; the constructor accepts
/// anything convertible into a `String`.
macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $display:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($display)]
                $variant {
                    /// Human-readable cause reported by the adapter.
                    message: String,
                },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                        Self::$variant { message: message.into() }
                    }
                }
            )*

            /// Adapter-supplied cause, whichever variant this is.
            #[must_use]
            pub fn message(&self) -> &str {
                match self {
                    $( Self::$variant { message } => message.as_str(), )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;
