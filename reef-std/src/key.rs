use crate::{StdError, StdResult};

/// A single element of a storage key, in raw bytes.
pub enum RawKey<'a> {
    Borrowed(&'a [u8]),
    Owned(Vec<u8>),
    Fixed1([u8; 1]),
    Fixed4([u8; 4]),
    Fixed8([u8; 8]),
    Fixed9([u8; 9]),
}

impl AsRef<[u8]> for RawKey<'_> {
    fn as_ref(&self) -> &[u8] {
        match self {
            RawKey::Borrowed(bytes) => bytes,
            RawKey::Owned(bytes) => bytes,
            RawKey::Fixed1(bytes) => bytes,
            RawKey::Fixed4(bytes) => bytes,
            RawKey::Fixed8(bytes) => bytes,
            RawKey::Fixed9(bytes) => bytes,
        }
    }
}

/// 2-byte big-endian length prefix, so nested keys can be split back apart.
pub fn encode_length(bytes: &impl AsRef<[u8]>) -> [u8; 2] {
    let len = bytes.as_ref().len();
    assert!(len <= u16::MAX as usize, "key element too long: {len}");
    (len as u16).to_be_bytes()
}

/// Combine a namespace and one or more key elements into a full byte path.
///
/// The namespace and all elements other than the last are prefixed with
/// their lengths, so we know where one element ends and the next starts:
///
/// ```plain
/// len(namespace) | namespace | len(elem1) | elem1 | elem2
/// ```
pub fn nested_namespaces_with_key(
    maybe_namespace: Option<&[u8]>,
    prefixes: &[RawKey],
    maybe_key: Option<&RawKey>,
) -> Vec<u8> {
    let mut size = 0;
    if let Some(namespace) = maybe_namespace {
        size += namespace.len() + 2;
    }
    for prefix in prefixes {
        size += prefix.as_ref().len() + 2;
    }
    if let Some(key) = maybe_key {
        size += key.as_ref().len();
    }

    let mut out = Vec::with_capacity(size);
    if let Some(namespace) = maybe_namespace {
        out.extend_from_slice(&encode_length(&namespace));
        out.extend_from_slice(namespace);
    }
    for prefix in prefixes {
        out.extend_from_slice(&encode_length(prefix));
        out.extend_from_slice(prefix.as_ref());
    }
    if let Some(key) = maybe_key {
        out.extend_from_slice(key.as_ref());
    }
    out
}

/// Split a raw key into `n` elements: the first `n - 1` are length-prefixed,
/// the last one is whatever remains.
pub fn split_key_elements(mut bytes: &[u8], n: u8) -> StdResult<Vec<&[u8]>> {
    let mut segments = Vec::with_capacity(n as usize);
    for _ in 0..n.saturating_sub(1) {
        if bytes.len() < 2 {
            return Err(StdError::invalid_key("missing length prefix"));
        }
        let len = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
        if bytes.len() < 2 + len {
            return Err(StdError::invalid_key("truncated key element"));
        }
        segments.push(&bytes[2..2 + len]);
        bytes = &bytes[2 + len..];
    }
    segments.push(bytes);
    Ok(segments)
}

/// A type that can be used as a key in a [`Map`](crate::Map) or
/// [`Set`](crate::Set).
///
/// Multi-element keys (tuples) support prefix iteration: `Prefix` is the
/// leading element(s), `Suffix` the rest.
pub trait PrimaryKey {
    type Output;
    type Prefix: PrimaryKey;
    type Suffix: PrimaryKey;

    const KEY_ELEMS: u8;

    fn raw_keys(&self) -> Vec<RawKey<'_>>;

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output>;

    /// Encode the key's elements into a single byte path, length-prefixing
    /// all elements but the last.
    fn joined_key(&self) -> Vec<u8> {
        let raw_keys = self.raw_keys();
        let (last, rest) = raw_keys.split_last().expect("key must not be empty");
        nested_namespaces_with_key(None, rest, Some(last))
    }

    /// Encode the key's elements as a prefix: every element length-prefixed,
    /// because more elements will follow.
    fn joined_prefix(&self) -> Vec<u8> {
        nested_namespaces_with_key(None, &self.raw_keys(), None)
    }

    fn from_slice(bytes: &[u8]) -> StdResult<Self::Output> {
        let segments = split_key_elements(bytes, Self::KEY_ELEMS)?;
        Self::from_segments(&segments)
    }
}

impl PrimaryKey for () {
    type Output = ();
    type Prefix = ();
    type Suffix = ();

    const KEY_ELEMS: u8 = 0;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        vec![]
    }

    fn from_segments(_segments: &[&[u8]]) -> StdResult<Self::Output> {
        Ok(())
    }
}

impl<T> PrimaryKey for &T
where
    T: PrimaryKey,
{
    type Output = T::Output;
    type Prefix = T::Prefix;
    type Suffix = T::Suffix;

    const KEY_ELEMS: u8 = T::KEY_ELEMS;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        (*self).raw_keys()
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        T::from_segments(segments)
    }
}

impl PrimaryKey for u8 {
    type Output = u8;
    type Prefix = ();
    type Suffix = ();

    const KEY_ELEMS: u8 = 1;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        vec![RawKey::Fixed1([*self])]
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        match segments {
            [[byte]] => Ok(*byte),
            _ => Err(StdError::invalid_key("expecting exactly 1 byte")),
        }
    }
}

impl PrimaryKey for u32 {
    type Output = u32;
    type Prefix = ();
    type Suffix = ();

    const KEY_ELEMS: u8 = 1;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        vec![RawKey::Fixed4(self.to_be_bytes())]
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        match segments {
            [bytes] => (*bytes)
                .try_into()
                .map(u32::from_be_bytes)
                .map_err(|_| StdError::invalid_key("expecting exactly 4 bytes")),
            _ => Err(StdError::invalid_key("expecting a single element")),
        }
    }
}

impl PrimaryKey for u64 {
    type Output = u64;
    type Prefix = ();
    type Suffix = ();

    const KEY_ELEMS: u8 = 1;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        vec![RawKey::Fixed8(self.to_be_bytes())]
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        match segments {
            [bytes] => (*bytes)
                .try_into()
                .map(u64::from_be_bytes)
                .map_err(|_| StdError::invalid_key("expecting exactly 8 bytes")),
            _ => Err(StdError::invalid_key("expecting a single element")),
        }
    }
}

impl PrimaryKey for String {
    type Output = String;
    type Prefix = ();
    type Suffix = ();

    const KEY_ELEMS: u8 = 1;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        vec![RawKey::Borrowed(self.as_bytes())]
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        match segments {
            [bytes] => String::from_utf8(bytes.to_vec())
                .map_err(|_| StdError::invalid_key("invalid utf-8")),
            _ => Err(StdError::invalid_key("expecting a single element")),
        }
    }
}

impl PrimaryKey for &str {
    type Output = String;
    type Prefix = ();
    type Suffix = ();

    const KEY_ELEMS: u8 = 1;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        vec![RawKey::Borrowed(self.as_bytes())]
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        String::from_segments(segments)
    }
}

impl<A, B> PrimaryKey for (A, B)
where
    A: PrimaryKey,
    B: PrimaryKey,
{
    type Output = (A::Output, B::Output);
    type Prefix = A;
    type Suffix = B;

    const KEY_ELEMS: u8 = A::KEY_ELEMS + B::KEY_ELEMS;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        let mut keys = self.0.raw_keys();
        keys.extend(self.1.raw_keys());
        keys
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        let (a, b) = segments.split_at(A::KEY_ELEMS as usize);
        Ok((A::from_segments(a)?, B::from_segments(b)?))
    }
}

impl<A, B, C> PrimaryKey for (A, B, C)
where
    A: PrimaryKey,
    B: PrimaryKey,
    C: PrimaryKey,
{
    type Output = (A::Output, B::Output, C::Output);
    type Prefix = A;
    type Suffix = (B, C);

    const KEY_ELEMS: u8 = A::KEY_ELEMS + B::KEY_ELEMS + C::KEY_ELEMS;

    fn raw_keys(&self) -> Vec<RawKey<'_>> {
        let mut keys = self.0.raw_keys();
        keys.extend(self.1.raw_keys());
        keys.extend(self.2.raw_keys());
        keys
    }

    fn from_segments(segments: &[&[u8]]) -> StdResult<Self::Output> {
        let (a, rest) = segments.split_at(A::KEY_ELEMS as usize);
        let (b, c) = rest.split_at(B::KEY_ELEMS as usize);
        Ok((
            A::from_segments(a)?,
            B::from_segments(b)?,
            C::from_segments(c)?,
        ))
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_keys_round_trip() {
        let key = (42_u64, "hello".to_string());
        let joined = key.joined_key();
        let decoded = <(u64, String)>::from_slice(&joined).unwrap();
        assert_eq!(decoded, (42, "hello".to_string()));
    }

    #[test]
    fn triple_keys_round_trip() {
        let key = (7_u32, 1_u8, 99_u64);
        let joined = key.joined_key();
        let decoded = <(u32, u8, u64)>::from_slice(&joined).unwrap();
        assert_eq!(decoded, (7, 1, 99));
    }

    #[test]
    fn length_prefixes_keep_elements_apart() {
        // Without length prefixes, ("ab", "c") and ("a", "bc") would collide.
        let a = ("ab", "c").joined_key();
        let b = ("a", "bc").joined_key();
        assert_ne!(a, b);
    }
}
