//! Opaque identifiers shared by the stores.
//!
//! Generated identifiers are 24 lowercase hex characters drawn from 12 random
//! bytes. Parsing accepts any non-empty string without whitespace so callers
//! may round-trip identifiers minted elsewhere; the stores only ever compare
//! them for equality.

use std::fmt;

use rand::RngCore;

/// Random bytes behind a generated identifier.
const ID_BYTES: usize = 12;

pub(crate) fn random_hex(len: usize) -> String {
    let mut bytes = vec![0_u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Validation errors raised when parsing an opaque identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// The identifier was empty.
    #[error("identifier must not be empty")]
    Empty,
    /// The identifier contained whitespace.
    #[error("identifier must not contain whitespace")]
    ContainsWhitespace,
}

fn validate_id(raw: &str) -> Result<(), IdValidationError> {
    if raw.is_empty() {
        return Err(IdValidationError::Empty);
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(IdValidationError::ContainsWhitespace);
    }
    Ok(())
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap an externally supplied identifier.
            pub fn new(id: impl Into<String>) -> Result<Self, IdValidationError> {
                let raw = id.into();
                validate_id(&raw)?;
                Ok(Self(raw))
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(random_hex(ID_BYTES))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

opaque_id! {
    /// Stable user identifier, the Identity Store's primary key.
    UserId
}

opaque_id! {
    /// Post identifier, the Post Store's primary key.
    PostId
}

opaque_id! {
    /// Comment identifier, unique within its post.
    CommentId
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn random_ids_are_24_hex_characters() {
        let id = PostId::random();
        assert_eq!(id.as_str().len(), 24);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    fn random_ids_differ() {
        assert_ne!(UserId::random(), UserId::random());
    }

    #[rstest]
    #[case("", IdValidationError::Empty)]
    #[case("abc def", IdValidationError::ContainsWhitespace)]
    #[case(" abc", IdValidationError::ContainsWhitespace)]
    fn rejects_invalid_ids(#[case] raw: &str, #[case] expected: IdValidationError) {
        assert_eq!(CommentId::new(raw), Err(expected));
    }

    #[rstest]
    fn accepts_foreign_opaque_ids() {
        let id = UserId::new("user-42").expect("opaque id");
        assert_eq!(id.to_string(), "user-42");
    }
}
