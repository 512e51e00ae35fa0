use crate::codec;
use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;

/// A short key issued for a stored link.
///
/// Keys are only built by [`codec::encode`] or validated by
/// [`ShortKey::parse`], so the inner string always uses the key alphabet.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ShortKey(SmolStr);

impl ShortKey {
    pub(crate) fn from_encoded(key: SmolStr) -> Self {
        Self(key)
    }

    /// Parses a key received from outside, e.g. the path of a redirect request.
    ///
    /// # Examples
    ///
    /// ```
    /// use lshort_core::ShortKey;
    ///
    /// assert!(ShortKey::parse("3Ab").is_ok());
    /// assert!(ShortKey::parse("l0l").is_err());
    /// ```
    pub fn parse(key: impl AsRef<str>) -> Result<Self, CodecError> {
        let key = key.as_ref();
        codec::decode(key)?;
        Ok(Self(SmolStr::new(key)))
    }

    /// Returns the sequence number this key was encoded from.
    pub fn sequence(&self) -> u64 {
        // the inner string was produced by `encode` or checked by `parse`
        let decoded = codec::decode(&self.0);
        debug_assert!(decoded.is_ok(), "short key {:?} does not decode", self.0);
        decoded.unwrap_or_default()
    }

    /// Returns the short key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }
}

impl AsRef<str> for ShortKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ShortKey> for String {
    fn from(key: ShortKey) -> Self {
        key.0.to_string()
    }
}

impl std::fmt::Debug for ShortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ShortKey").field(&self.0).finish()
    }
}

impl Display for ShortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ShortKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ShortKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = SmolStr::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
