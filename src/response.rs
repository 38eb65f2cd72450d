use serde::{Deserialize, Serialize};

/// Envelope every business endpoint wraps its payload in.
///
/// A missing `data` field decodes to `T::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct Response<T> {
    /// Status echoed in the body, normally 200
    #[serde(default)]
    pub status: u16,

    #[serde(default, rename = "statusMessage")]
    pub status_message: String,

    /// Response data payload
    #[serde(default)]
    pub data: T,
}

impl<T> Response<T> {
    /// Consume the envelope, keeping only the payload
    pub fn into_data(self) -> T {
        self.data
    }
}
