//! Macro for implementing name conversions on closed enums
//!
//! Wire tags, pull states and key names are all closed sets of variants with
//! one canonical spelling each. This macro generates the table once: a
//! `name()` accessor, an `ALL` slice, `Display`, and a case-insensitive
//! `FromStr`.
//!
//! # Example
//!
//! ```rust
//! use notifier_domain::impl_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Signal {
//!     Green,
//!     Red,
//! }
//!
//! impl_name_conversions!(Signal {
//!     Green => "green",
//!     Red => "red",
//! });
//!
//! assert_eq!("RED".parse::<Signal>(), Ok(Signal::Red));
//! assert_eq!(Signal::Green.to_string(), "green");
//! ```

/// Implements `name()`, `ALL`, `Display` and `FromStr` for a closed enum
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their canonical names
///
/// Parsing ignores ASCII case; formatting always yields the canonical name.
#[macro_export]
macro_rules! impl_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Canonical name of the variant.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.name().eq_ignore_ascii_case(s))
                    .ok_or_else(|| format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestState {
        Pending,
        Done,
    }

    impl_name_conversions!(TestState {
        Pending => "pending",
        Done => "DONE",
    });

    #[test]
    fn test_display_uses_canonical_name() {
        assert_eq!(TestState::Pending.to_string(), "pending");
        assert_eq!(TestState::Done.to_string(), "DONE");
    }

    #[test]
    fn test_fromstr_ignores_case() {
        assert_eq!(TestState::from_str("PENDING").unwrap(), TestState::Pending);
        assert_eq!(TestState::from_str("done").unwrap(), TestState::Done);
        assert_eq!(TestState::from_str("DoNe").unwrap(), TestState::Done);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = TestState::from_str("merged");
        assert_eq!(result.unwrap_err(), "Invalid TestState: merged");
        assert!(TestState::from_str("").is_err());
    }

    #[test]
    fn test_all_lists_variants_in_order() {
        assert_eq!(TestState::ALL, &[TestState::Pending, TestState::Done]);
    }
}
