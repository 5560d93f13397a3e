//! Flattened hierarchical addresses.
//!
//! An [`Address`] is an ordered chain of [`Id`]s stored as one byte buffer
//! where each id is preceded by its length:
//!
//! ```text
//! ids:     12      234       5678
//! buffer:  [2]12   [3]234    [4]5678
//! ```
//!
//! The flat buffer makes addresses cheap to store, compare and hash, and
//! lets a child address be built by appending to its parent.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IdError;
use crate::id::{hash_prefix, Id};

/// Separator between ids in the text form of an address.
pub const ID_SEPARATOR: char = ':';

/// An ordered sequence of ids flattened into a length-prefixed buffer.
///
/// # Invariants
///
/// - The buffer decodes as `(len, payload[len])*`, each `len` in `1..=255`.
/// - A zero length byte ends decoding. Valid constructions never emit one,
///   but [`Address::from_bytes`] accepts buffers that contain one.
/// - Equality is byte-for-byte on the buffer, so equal addresses decode to
///   equal id sequences.
#[derive(Clone, Default)]
pub struct Address {
    bytes: Vec<u8>,
    id_count: usize,
    /// Length of the decodable prefix of `bytes`.
    end: usize,
}

impl Address {
    /// The invalid (empty) address.
    pub const INVALID: Address = Address {
        bytes: Vec::new(),
        id_count: 0,
        end: 0,
    };

    /// Encode `ids` in order. Fails on the first invalid id.
    pub fn new(ids: &[Id]) -> Result<Self, IdError> {
        let size = ids.iter().map(|id| 1 + id.as_bytes().len()).sum();
        let mut bytes = Vec::with_capacity(size);
        for (index, id) in ids.iter().enumerate() {
            if !id.is_valid() {
                return Err(IdError::InvalidId { index });
            }
            bytes.push(id.len());
            bytes.extend_from_slice(id.as_bytes());
        }
        let end = bytes.len();
        Ok(Self {
            bytes,
            id_count: ids.len(),
            end,
        })
    }

    /// Wrap a raw buffer.
    ///
    /// Decoding is lenient: it stops without error at a zero length byte,
    /// at the end of the buffer, or at a length byte claiming more bytes
    /// than remain. The buffer is kept as given.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let (id_count, end) = scan(&bytes);
        Self {
            bytes,
            id_count,
            end,
        }
    }

    /// Parse `:`-separated id tokens. Empty text yields the invalid address.
    pub fn try_parse(text: &str) -> Result<Self, IdError> {
        if text.is_empty() {
            return Ok(Self::INVALID);
        }
        let mut ids = Vec::new();
        for (index, token) in text.split(ID_SEPARATOR).enumerate() {
            let id = Id::try_parse(token)?;
            if !id.is_valid() {
                return Err(IdError::InvalidId { index });
            }
            ids.push(id);
        }
        Self::new(&ids)
    }

    /// Parse text that is already known to be well formed.
    ///
    /// # Panics
    ///
    /// Panics on malformed text. Use [`try_parse`](Self::try_parse) for
    /// untrusted input.
    pub fn parse(text: &str) -> Self {
        match Self::try_parse(text) {
            Ok(address) => address,
            Err(e) => panic!("invalid address text {text:?}: {e}"),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.bytes.is_empty()
    }

    /// Number of decodable ids.
    pub fn id_count(&self) -> usize {
        self.id_count
    }

    /// The raw buffer, including any bytes past the decodable prefix.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// A new address with `id` encoded after the ids of `self`.
    ///
    /// Bytes past the decodable prefix of `self` are not carried over.
    pub fn append(&self, id: &Id) -> Result<Self, IdError> {
        if !id.is_valid() {
            return Err(IdError::InvalidId {
                index: self.id_count,
            });
        }
        let mut bytes = Vec::with_capacity(self.end + 1 + id.as_bytes().len());
        bytes.extend_from_slice(self.encoded());
        bytes.push(id.len());
        bytes.extend_from_slice(id.as_bytes());
        let end = bytes.len();
        Ok(Self {
            bytes,
            id_count: self.id_count + 1,
            end,
        })
    }

    /// Iterate the decoded ids in order. Call again to restart.
    pub fn ids(&self) -> Ids<'_> {
        Ids {
            buf: self.encoded(),
            pos: 0,
            remaining: self.id_count,
        }
    }

    pub fn to_ids(&self) -> Vec<Id> {
        self.ids().collect()
    }

    /// The id at `offset`, or [`Id::INVALID`] when out of range.
    pub fn id(&self, offset: usize) -> Id {
        self.ids().nth(offset).unwrap_or(Id::INVALID)
    }

    pub fn first_id(&self) -> Id {
        self.id(0)
    }

    pub fn last_id(&self) -> Id {
        match self.id_count {
            0 => Id::INVALID,
            n => self.id(n - 1),
        }
    }

    /// Last byte of the raw buffer, or 0 for the invalid address.
    pub fn last_byte(&self) -> u8 {
        self.bytes.last().copied().unwrap_or(0)
    }

    /// Returns `true` if the ids of `other` appear as a run inside `self`.
    ///
    /// Ids are matched whole: same length and same bytes. The scan walks
    /// the ids of `self` once, keeping a cursor into `other`:
    ///
    /// - an id of a different length than the one under the cursor is
    ///   skipped and the cursor stays put;
    /// - a byte mismatch resets the cursor to the start of `other` and
    ///   skips the rest of the current id, which is not retried as a new
    ///   starting point.
    ///
    /// The restart never backs up, so some runs are missed when `self`
    /// repeats an id (`[x, x, z]` does not contain `[x, z]`), and a run may
    /// straddle ids of other lengths (`[a, bb, c]` contains `[a, c]`).
    pub fn contains(&self, other: &Address) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }
        let haystack = self.encoded();
        let needle = other.encoded();
        if needle.is_empty() {
            return false;
        }

        let mut i = 0;
        let mut j = 0;
        while i < haystack.len() && j < needle.len() {
            let size = usize::from(haystack[i]);
            i += 1;
            if size != usize::from(needle[j]) {
                i += size;
                continue;
            }
            j += 1;
            for k in 0..size {
                if haystack[i] != needle[j] {
                    i += size - k;
                    j = 0;
                    break;
                }
                i += 1;
                j += 1;
            }
        }
        j == needle.len()
    }

    /// Returns `true` if the buffer of `self` is a byte prefix of the
    /// buffer of `full`. Id boundaries are not considered.
    pub fn is_partial_address(&self, full: &Address) -> bool {
        match (self.is_valid(), full.is_valid()) {
            (false, false) => true,
            (true, true) => full.bytes.starts_with(&self.bytes),
            _ => false,
        }
    }

    fn encoded(&self) -> &[u8] {
        &self.bytes[..self.end]
    }
}

/// Count the decodable ids of `bytes` and the length of that prefix.
fn scan(bytes: &[u8]) -> (usize, usize) {
    let mut pos = 0;
    let mut count = 0;
    while pos < bytes.len() {
        let size = usize::from(bytes[pos]);
        if size == 0 || pos + 1 + size > bytes.len() {
            break;
        }
        pos += 1 + size;
        count += 1;
    }
    (count, pos)
}

/// Iterator over the ids of an [`Address`].
#[derive(Clone, Debug)]
pub struct Ids<'a> {
    buf: &'a [u8],
    pos: usize,
    remaining: usize,
}

impl Iterator for Ids<'_> {
    type Item = Id;

    fn next(&mut self) -> Option<Id> {
        if self.remaining == 0 {
            return None;
        }
        let size = usize::from(self.buf[self.pos]);
        let start = self.pos + 1;
        self.pos = start + size;
        self.remaining -= 1;
        Some(Id::new(&self.buf[start..self.pos]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Ids<'_> {}

impl FusedIterator for Ids<'_> {}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_prefix(&self.bytes, state);
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, id) in self.ids().enumerate() {
            if n > 0 {
                write!(f, "{ID_SEPARATOR}")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.bytes)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<u8>::deserialize(deserializer).map(Self::from_bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    fn hash_of(address: &Address) -> u64 {
        let mut hasher = DefaultHasher::new();
        address.hash(&mut hasher);
        hasher.finish()
    }

    fn addr(tokens: &[&str]) -> Address {
        let ids: Vec<Id> = tokens.iter().map(|t| Id::parse(t)).collect();
        Address::new(&ids).unwrap()
    }

    #[test]
    fn encodes_length_prefixed_ids() {
        let ids = [Id::new([0x12]), Id::new([0x23, 0x40]), Id::new([0x56, 0x78, 0x9A])];
        let address = Address::new(&ids).unwrap();
        assert_eq!(
            address.as_bytes(),
            &[1, 0x12, 2, 0x23, 0x40, 3, 0x56, 0x78, 0x9A]
        );
        assert_eq!(address.id_count(), 3);
        assert!(address.is_valid());
    }

    #[test]
    fn equality_follows_buffer() {
        let id1 = Id::parse("abc");
        let id2 = Id::parse("abc");
        let id3 = Id::parse("cba");
        let a1 = Address::new(&[id1.clone(), id2.clone()]).unwrap();
        let a2 = Address::new(&[id1, id2.clone()]).unwrap();
        let a3 = Address::new(&[id2, id3]).unwrap();
        assert_eq!(a1, a2);
        assert_ne!(a1, a3);
        assert_eq!(Address::new(&[]).unwrap(), Address::INVALID);
    }

    #[test]
    fn id_boundaries_matter_for_equality() {
        let split = Address::new(&[Id::new([1]), Id::new([2])]).unwrap();
        let joined = Address::new(&[Id::new([1, 2])]).unwrap();
        assert_ne!(split, joined);
    }

    #[test]
    fn rejects_invalid_ids() {
        let err = Address::new(&[Id::from(1u8), Id::INVALID]).unwrap_err();
        assert_eq!(err, IdError::InvalidId { index: 1 });

        let base = addr(&["ab"]);
        assert_eq!(
            base.append(&Id::INVALID),
            Err(IdError::InvalidId { index: 1 })
        );
    }

    #[test]
    fn contains_runs() {
        let a1 = addr(&["ab", "cd", "ef"]);
        let a2 = addr(&["ab", "cd"]);
        assert!(a1.contains(&a2));
        assert!(!a2.contains(&a1));

        assert!(!a1.contains(&addr(&["cd", "ab"])));

        let a4 = addr(&["ab", "cd", "ef"]);
        assert!(a1.contains(&a4));
        assert!(a4.contains(&a1));

        assert!(!a1.contains(&addr(&["ab", "ef", "cd"])));
        assert!(a1.contains(&addr(&["cd", "ef"])));
        assert!(a1.contains(&addr(&["ef"])));
    }

    #[test]
    fn contains_scenario() {
        assert!(addr(&["ab", "cd"]).contains(&addr(&["ab"])));
        assert!(!addr(&["ab"]).contains(&addr(&["ab", "cd"])));
    }

    #[test]
    fn contains_requires_equal_lengths() {
        let haystack = Address::new(&[Id::new([1, 2]), Id::new([3])]).unwrap();
        let needle = Address::new(&[Id::new([1])]).unwrap();
        assert!(!haystack.contains(&needle));
    }

    #[test]
    fn contains_restarts_after_mismatch() {
        let (x, y, z) = (Id::from(1u8), Id::from(2u8), Id::from(3u8));
        let haystack = Address::new(&[x.clone(), y, x.clone(), z.clone()]).unwrap();
        let needle = Address::new(&[x, z]).unwrap();
        assert!(haystack.contains(&needle));
    }

    #[test]
    fn contains_misses_run_after_repeated_id() {
        // The mismatching id is skipped, not retried as a new start.
        let (x, z) = (Id::from(1u8), Id::from(3u8));
        let haystack = Address::new(&[x.clone(), x.clone(), z.clone()]).unwrap();
        let needle = Address::new(&[x, z]).unwrap();
        assert!(!haystack.contains(&needle));
    }

    #[test]
    fn contains_skips_ids_of_other_lengths() {
        let (ab, cd) = (Id::from(0xABu8), Id::from(0xCDu8));
        let haystack = Address::new(&[ab.clone(), Id::new([1, 2]), cd.clone()]).unwrap();
        let needle = Address::new(&[ab, cd]).unwrap();
        assert!(haystack.contains(&needle));
    }

    #[test]
    fn contains_with_invalid_is_false() {
        let a = addr(&["ab"]);
        assert!(!a.contains(&Address::INVALID));
        assert!(!Address::INVALID.contains(&a));
        assert!(!Address::INVALID.contains(&Address::INVALID));
    }

    #[test]
    fn append_extends_and_preserves() {
        let ids = [Id::parse("ab"), Id::parse("hello"), Id::new([0, 0, 1])];
        let mut address = Address::INVALID;
        for (n, id) in ids.iter().enumerate() {
            let next = address.append(id).unwrap();
            assert_eq!(next.id_count(), address.id_count() + 1);
            assert_eq!(&next.to_ids()[..n], &address.to_ids()[..]);
            assert_eq!(next.last_id(), *id);
            address = next;
        }
        assert_eq!(address, Address::new(&ids).unwrap());
    }

    #[test]
    fn append_leaves_original_untouched() {
        let base = addr(&["ab"]);
        let child = base.append(&Id::parse("cd")).unwrap();
        assert_eq!(base.id_count(), 1);
        assert_eq!(base, addr(&["ab"]));
        assert_eq!(child, addr(&["ab", "cd"]));
    }

    #[test]
    fn id_by_offset() {
        let address = addr(&["ab", "cd", "ef"]);
        assert_eq!(address.id(0), Id::parse("ab"));
        assert_eq!(address.id(1), Id::parse("cd"));
        assert_eq!(address.id(2), Id::parse("ef"));
        assert_eq!(address.id(3), Id::INVALID);
        assert_eq!(address.first_id(), Id::parse("ab"));
        assert_eq!(address.last_id(), Id::parse("ef"));
        assert_eq!(Address::INVALID.first_id(), Id::INVALID);
        assert_eq!(Address::INVALID.last_id(), Id::INVALID);
    }

    #[test]
    fn ids_iterator_is_restartable() {
        let address = addr(&["ab", "cd"]);
        let iter = address.ids();
        assert_eq!(iter.len(), 2);
        let first: Vec<Id> = iter.clone().collect();
        let second: Vec<Id> = address.ids().collect();
        assert_eq!(first, second);
        assert_eq!(iter.count(), 2);
    }

    #[test]
    fn last_byte_is_buffer_level() {
        assert_eq!(addr(&["ab", "cd"]).last_byte(), 0xCD);
        assert_eq!(Address::INVALID.last_byte(), 0);
    }

    #[test]
    fn partial_address_is_byte_prefix() {
        let full = addr(&["ab", "cd", "ef"]);
        assert!(addr(&["ab", "cd"]).is_partial_address(&full));
        assert!(full.is_partial_address(&full));
        assert!(!full.is_partial_address(&addr(&["ab", "cd"])));
        assert!(!addr(&["ac"]).is_partial_address(&full));

        let mid_id = Address::from_bytes(full.as_bytes()[..3].to_vec());
        assert!(mid_id.is_partial_address(&full));

        assert!(Address::INVALID.is_partial_address(&Address::INVALID));
        assert!(!Address::INVALID.is_partial_address(&full));
        assert!(!full.is_partial_address(&Address::INVALID));
    }

    #[test]
    fn from_bytes_stops_at_zero_length() {
        let address = Address::from_bytes(vec![1, 0xAB, 0, 1, 0xCD]);
        assert_eq!(address.id_count(), 1);
        assert_eq!(address.to_ids(), vec![Id::from(0xABu8)]);
        assert_eq!(address.as_bytes().len(), 5);

        let extended = address.append(&Id::from(0xEFu8)).unwrap();
        assert_eq!(extended.as_bytes(), &[1, 0xAB, 1, 0xEF]);
        assert_eq!(extended.id_count(), 2);
    }

    #[test]
    fn from_bytes_ignores_truncated_tail() {
        let address = Address::from_bytes(vec![1, 0xAB, 4, 1, 2]);
        assert_eq!(address.id_count(), 1);
        assert_eq!(address.id(1), Id::INVALID);
        assert!(address.is_valid());
    }

    #[test]
    fn text_roundtrip() {
        let address = addr(&["ab", "hello", "{01-02}"]);
        let text = address.to_string();
        assert_eq!(text, "{AB}:{68-65-6C-6C-6F}:{01-02}");
        assert_eq!(Address::parse(&text), address);
        assert_eq!(Address::parse("AB:CD"), addr(&["ab", "cd"]));
        assert_eq!(Address::parse(""), Address::INVALID);
        assert_eq!(Address::INVALID.to_string(), "");
    }

    #[test]
    fn text_rejects_empty_tokens() {
        assert_eq!(
            Address::try_parse("ab::cd"),
            Err(IdError::InvalidId { index: 1 })
        );
        assert!(Address::try_parse("ab:{XY}").unwrap_err().is_parse_error());
    }

    #[test]
    fn equal_addresses_hash_equal() {
        let a = addr(&["ab", "cd"]);
        let b = Address::from_bytes(vec![1, 0xAB, 1, 0xCD]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn hash_map_lookup() {
        let mut map = HashMap::new();
        for b in 0..=u8::MAX {
            let address = Address::new(&[Id::from(b), Id::from(b)]).unwrap();
            map.insert(address, b);
        }
        assert_eq!(map.len(), 256);
        for b in 0..=u8::MAX {
            let address = Address::new(&[Id::from(b), Id::from(b)]).unwrap();
            assert_eq!(map.get(&address), Some(&b));
        }
        assert_eq!(map.get(&Address::new(&[Id::from(1u8)]).unwrap()), None);
    }

    #[test]
    fn hash_only_sees_first_four_buffer_bytes() {
        let a = Address::new(&[Id::new([1, 2, 3, 4, 5])]).unwrap();
        let b = Address::new(&[Id::new([1, 2, 3, 9, 9])]).unwrap();
        assert_ne!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let map: HashMap<Address, &str> = [(a.clone(), "a"), (b.clone(), "b")].into();
        assert_eq!(map[&a], "a");
        assert_eq!(map[&b], "b");
    }

    #[test]
    fn serde_roundtrip() {
        let address = addr(&["ab", "cd"]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "[1,171,1,205]");
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, address);
        assert_eq!(parsed.id_count(), 2);
    }

    fn id_strategy() -> impl Strategy<Value = Id> {
        proptest::collection::vec(any::<u8>(), 1..=MAX_LEN_FOR_TESTS).prop_map(Id::new)
    }

    const MAX_LEN_FOR_TESTS: usize = 12;

    // Whole-id form of the containment scan: the needle cursor only moves
    // on equal-length ids and drops to zero on a mismatch.
    fn contains_by_ids(haystack: &[Id], needle: &[Id]) -> bool {
        if needle.is_empty() {
            return false;
        }
        let mut j = 0;
        for id in haystack {
            if j == needle.len() {
                break;
            }
            if id.len() != needle[j].len() {
                continue;
            }
            if *id == needle[j] {
                j += 1;
            } else {
                j = 0;
            }
        }
        j == needle.len()
    }

    fn small_alphabet() -> [Id; 3] {
        [Id::new([0xA]), Id::new([0xB]), Id::new([0xC, 0xC])]
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(ids in proptest::collection::vec(id_strategy(), 1..10)) {
            let address = Address::new(&ids).unwrap();
            prop_assert_eq!(address.id_count(), ids.len());
            prop_assert_eq!(address.to_ids(), ids.clone());
            prop_assert_eq!(Address::from_bytes(address.as_bytes().to_vec()), address.clone());
            prop_assert_eq!(Address::parse(&address.to_string()), address);
        }

        #[test]
        fn max_length_ids_roundtrip(payload in proptest::collection::vec(any::<u8>(), 255)) {
            let id = Id::new(payload);
            let address = Address::new(&[id.clone(), id.clone()]).unwrap();
            prop_assert_eq!(address.to_ids(), vec![id.clone(), id]);
        }

        #[test]
        fn contains_every_contiguous_run(
            set in proptest::collection::btree_set(proptest::collection::vec(any::<u8>(), 1..4), 1..8),
            a in any::<prop::sample::Index>(),
            b in any::<prop::sample::Index>(),
        ) {
            // Distinct ids: repeats can defeat the restart policy.
            let ids: Vec<Id> = set.into_iter().map(Id::new).collect();
            let (mut k, mut m) = (a.index(ids.len()), b.index(ids.len()));
            if k > m {
                std::mem::swap(&mut k, &mut m);
            }
            let address = Address::new(&ids).unwrap();
            let run = Address::new(&ids[k..=m]).unwrap();
            prop_assert!(address.contains(&address));
            prop_assert!(address.contains(&run));
            prop_assert_eq!(run.is_partial_address(&address), k == 0);
        }

        #[test]
        fn contains_with_repeated_ids(
            hay in proptest::collection::vec(0..3usize, 1..12),
            needle in proptest::collection::vec(0..3usize, 1..5),
        ) {
            let alphabet = small_alphabet();
            let hay: Vec<Id> = hay.into_iter().map(|n| alphabet[n].clone()).collect();
            let needle: Vec<Id> = needle.into_iter().map(|n| alphabet[n].clone()).collect();
            let address = Address::new(&hay).unwrap();
            let other = Address::new(&needle).unwrap();

            prop_assert!(address.contains(&address));
            prop_assert_eq!(address.contains(&other), contains_by_ids(&hay, &needle));
        }
    }
}
