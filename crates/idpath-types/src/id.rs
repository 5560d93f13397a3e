use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IdError;

/// Largest payload an [`Id`] may carry. The length has to fit the single
/// prefix byte used by [`Address`](crate::Address).
pub const MAX_ID_LEN: usize = u8::MAX as usize;

const INVALID_TEXT: &str = "INVALID";

/// An immutable byte-sequence identifier of 0 to 255 bytes.
///
/// An `Id` is valid when it carries at least one byte; [`Id::INVALID`] is
/// the empty sentinel. Equality is byte-for-byte and ordering is
/// lexicographic with shorter ids first, so the invalid id sorts before
/// every valid one.
///
/// # Hashing
///
/// The hash only looks at the first four bytes (zero padded). Ids that
/// differ only past their fourth byte always collide.
///
/// # Text forms
///
/// - fancy: `{AB-CD-EF}`, braced upper-case hex pairs joined by `-`
/// - simple: `ABCDEF`, concatenated upper-case hex
///
/// Both forms parse back to the same id. Undelimited text that is not an
/// even-length hex run is taken as raw ASCII bytes, so `"abc"` is the
/// three-byte id `61 62 63`.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Id {
    bytes: Vec<u8>,
}

impl Id {
    /// The invalid (empty) id.
    pub const INVALID: Id = Id { bytes: Vec::new() };

    /// Wrap `bytes` as an id.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is longer than [`MAX_ID_LEN`]. Use
    /// [`try_new`](Self::try_new) for unchecked input.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        match Self::try_new(bytes) {
            Ok(id) => id,
            Err(e) => panic!("{e}"),
        }
    }

    /// Wrap `bytes` as an id, failing if they do not fit in one length byte.
    pub fn try_new(bytes: impl Into<Vec<u8>>) -> Result<Self, IdError> {
        let bytes = bytes.into();
        if bytes.len() > MAX_ID_LEN {
            return Err(IdError::TooLong {
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    /// Parse an id from its fancy, simple, or ASCII text form.
    ///
    /// Braced or `-` delimited text must consist of two-digit hex tokens.
    /// Empty text and `"INVALID"` yield [`Id::INVALID`].
    pub fn try_parse(text: &str) -> Result<Self, IdError> {
        if text.is_empty() || text == INVALID_TEXT {
            return Ok(Self::INVALID);
        }

        let braced = text.strip_prefix('{').and_then(|t| t.strip_suffix('}'));
        let inner = braced.unwrap_or(text);

        // Delimited text is always the fancy form; it never falls back to ASCII.
        if braced.is_some() || inner.contains('-') {
            let bytes = inner
                .split('-')
                .map(decode_pair)
                .collect::<Result<Vec<u8>, IdError>>()?;
            return Self::try_new(bytes);
        }

        if inner.len() % 2 == 0 && inner.bytes().all(|b| b.is_ascii_hexdigit()) {
            let bytes = hex::decode(inner).map_err(|_| IdError::InvalidHex {
                token: inner.to_string(),
            })?;
            return Self::try_new(bytes);
        }

        if !text.is_ascii() {
            return Err(IdError::NonAscii(text.to_string()));
        }
        Self::try_new(text.as_bytes())
    }

    /// Parse an id from text that is already known to be well formed.
    ///
    /// # Panics
    ///
    /// Panics on malformed text. Use [`try_parse`](Self::try_parse) for
    /// untrusted input.
    pub fn parse(text: &str) -> Self {
        match Self::try_parse(text) {
            Ok(id) => id,
            Err(e) => panic!("invalid id text {text:?}: {e}"),
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> u8 {
        // try_new keeps the length within u8.
        self.bytes.len() as u8
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The last payload byte, or 0 for the invalid id.
    pub fn last_byte(&self) -> u8 {
        self.bytes.last().copied().unwrap_or(0)
    }

    /// `{AB-CD-EF}`, or `INVALID`.
    pub fn to_string_fancy(&self) -> String {
        if !self.is_valid() {
            return INVALID_TEXT.to_string();
        }
        let pairs: Vec<String> = self.bytes.iter().map(|b| format!("{b:02X}")).collect();
        format!("{{{}}}", pairs.join("-"))
    }

    /// `ABCDEF`, or `INVALID`.
    pub fn to_string_simple(&self) -> String {
        if !self.is_valid() {
            return INVALID_TEXT.to_string();
        }
        hex::encode_upper(&self.bytes)
    }
}

fn decode_pair(token: &str) -> Result<u8, IdError> {
    if token.len() != 2 {
        return Err(IdError::MalformedToken {
            token: token.to_string(),
        });
    }
    let mut byte = [0u8; 1];
    hex::decode_to_slice(token, &mut byte).map_err(|_| IdError::InvalidHex {
        token: token.to_string(),
    })?;
    Ok(byte[0])
}

/// Hash of the first four bytes, zero padded, shared by ids and addresses.
pub(crate) fn hash_prefix<H: Hasher>(bytes: &[u8], state: &mut H) {
    let mut head = [0u8; 4];
    let n = bytes.len().min(head.len());
    head[..n].copy_from_slice(&bytes[..n]);
    state.write_u32(u32::from_le_bytes(head));
}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_prefix(&self.bytes, state);
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.to_string_fancy())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_fancy())
    }
}

impl FromStr for Id {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s)
    }
}

impl From<u8> for Id {
    fn from(byte: u8) -> Self {
        Self { bytes: vec![byte] }
    }
}

impl TryFrom<Vec<u8>> for Id {
    type Error = IdError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_new(bytes)
    }
}

impl TryFrom<&[u8]> for Id {
    type Error = IdError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::try_new(bytes)
    }
}

impl AsRef<[u8]> for Id {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_simple())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::try_parse(&text).map_err(serde::de::Error::custom)
    }
}
