//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_string_id!` macro to create type-safe ID wrappers that
//! prevent accidentally mixing IDs from different entity types.
//!
//! The backend identifies products, markets, and cart lines with string
//! identifiers, but some callers and payloads carry them as numbers. Every
//! wrapper therefore normalizes to the string form: an ID built from `42_i64`
//! and one built from `"42"` are the same key.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` with `#[serde(transparent)]` (always a JSON string)
/// - `Deserialize` accepting either a JSON string or a JSON integer, so a
///   payload carrying `42` parses to the same key as one carrying `"42"`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>`, `From<&str>`, `From<i64>`, and `From<u64>` implementations
///
/// # Example
///
/// ```rust
/// # use mercato_core::define_string_id;
/// define_string_id!(UserId);
/// define_string_id!(SessionId);
///
/// let from_number = UserId::from(42_i64);
/// let from_string = UserId::from("42");
/// assert_eq!(from_number, from_string);
///
/// // These are different types, so this won't compile:
/// // let _: UserId = SessionId::new("42");
/// ```
#[macro_export]
macro_rules! define_string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything convertible to a string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the normalized string form of the ID.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id.to_string())
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                struct IdVisitor;

                impl ::serde::de::Visitor<'_> for IdVisitor {
                    type Value = $name;

                    fn expecting(
                        &self,
                        f: &mut ::core::fmt::Formatter<'_>,
                    ) -> ::core::fmt::Result {
                        f.write_str("a string or integer identifier")
                    }

                    fn visit_str<E>(self, v: &str) -> ::core::result::Result<Self::Value, E>
                    where
                        E: ::serde::de::Error,
                    {
                        Ok($name::from(v))
                    }

                    fn visit_string<E>(self, v: String) -> ::core::result::Result<Self::Value, E>
                    where
                        E: ::serde::de::Error,
                    {
                        Ok($name::from(v))
                    }

                    fn visit_i64<E>(self, v: i64) -> ::core::result::Result<Self::Value, E>
                    where
                        E: ::serde::de::Error,
                    {
                        Ok($name::from(v))
                    }

                    fn visit_u64<E>(self, v: u64) -> ::core::result::Result<Self::Value, E>
                    where
                        E: ::serde::de::Error,
                    {
                        Ok($name::from(v))
                    }
                }

                deserializer.deserialize_any(IdVisitor)
            }
        }
    };
}

define_string_id!(
    /// Stable product identifier, normalized to its string form.
    ProductId
);

define_string_id!(
    /// Identifier of the market a product was added from.
    MarketId
);

define_string_id!(
    /// Identifier of a line item in the remote cart service.
    ///
    /// Present on a local cart item only while that item is synchronized
    /// with the remote cart; purely local items carry no line ID.
    CartLineId
);
