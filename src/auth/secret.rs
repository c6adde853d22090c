//! auth::secret
//!
//! Wrapper for sensitive values (passwords, tokens, private key text).
//!
//! [`Secret`] prints as `[REDACTED]` through Debug, Display and Serialize,
//! is zeroized when dropped, and only yields its value through an explicit
//! [`Secret::expose`] call. Auth specs are built from the manifest once per
//! operation and dropped afterwards, so key material never outlives the
//! operation it authorizes.
//!
//! # Example
//!
//! ```
//! use gitform::auth::Secret;
//!
//! let password = Secret::new("hunter2".to_string());
//! assert_eq!(format!("{}", password), "[REDACTED]");
//! assert_eq!(format!("{:?}", password), "Secret(\"[REDACTED]\")");
//! assert_eq!(password.expose(), "hunter2");
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// The redaction placeholder used in all output.
pub const REDACTED: &str = "[REDACTED]";

/// A value that must never be printed, logged or persisted.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
    T: Zeroize,
{
    inner: T,
}

/// Convenience alias for secret strings.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
    T: Zeroize,
{
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Explicitly access the inner value.
    pub fn expose(&self) -> &T {
        &self.inner
    }
}

impl<T> Clone for Secret<T>
where
    T: Zeroize + Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Secret<T>
where
    T: Zeroize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&REDACTED).finish()
    }
}

impl<T> fmt::Display for Secret<T>
where
    T: Zeroize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> PartialEq for Secret<T>
where
    T: Zeroize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

impl<T> Serialize for Secret<T>
where
    T: Zeroize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(REDACTED)
    }
}

impl<'de, T> Deserialize<'de> for Secret<T>
where
    T: Deserialize<'de> + Zeroize,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Secret::new)
    }
}
