//! Configuration types shared between the refresh engine and the binary.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

pub mod shared;

/// A secret string that can be serialized back out.
///
/// [`SecretString`] deliberately refuses to implement [`Serialize`]; config
/// values that must be forwarded to a client library need a wrapper that
/// exposes the secret on serialization while staying redacted in debug
/// output.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct SerializableSecretString(SecretString);

impl SerializableSecretString {
    /// Returns the wrapped secret value.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Serialize for SerializableSecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.expose_secret())
    }
}

impl From<String> for SerializableSecretString {
    fn from(value: String) -> Self {
        Self(SecretString::new(value))
    }
}

impl From<SecretString> for SerializableSecretString {
    fn from(value: SecretString) -> Self {
        Self(value)
    }
}
