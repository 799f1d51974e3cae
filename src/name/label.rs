// Copyright 2021 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of the [`Label`] type.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::{Error, MAX_LABEL_LEN};

////////////////////////////////////////////////////////////////////////
// LABELS                                                             //
////////////////////////////////////////////////////////////////////////

/// A single label of a domain name.
///
/// `Label` wraps `[u8]` and can only be constructed when the slice is
/// at most 63 octets long. Following [RFC 4343], comparison, ordering,
/// and hashing fold ASCII case, while the octets themselves keep the
/// case they were written with. Case-sensitive comparison is available
/// through [`Label::octets`] or the case policy arguments of
/// [`LabelSequence`](super::LabelSequence).
///
/// [RFC 4343]: https://datatracker.ietf.org/doc/html/rfc4343
#[repr(transparent)]
pub struct Label {
    octets: [u8],
}

#[allow(clippy::len_without_is_empty)] // Following DNS terminology, we have is_null().
impl Label {
    /// Wraps a `&[u8]` as a `Label` without checking its length. Only
    /// for use within the `name` module, after the length is known to
    /// be valid.
    pub(super) fn from_unchecked(octets: &[u8]) -> &Self {
        unsafe { &*(octets as *const [u8] as *const Label) }
    }

    /// Returns whether this is the null (zero-length) label that ends
    /// every absolute name.
    pub fn is_null(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns the number of octets in the label.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns the null label.
    pub fn null() -> &'static Self {
        Self::from_unchecked(&[])
    }

    /// Returns the octets of the label.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// Compares two labels under the given case policy, using the
    /// canonical ordering of [RFC 4034 § 6.1] (left-justified octet
    /// strings, with case folded unless `case_sensitive`).
    ///
    /// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
    pub fn compare(&self, other: &Self, case_sensitive: bool) -> Ordering {
        let fold = |octet: &u8| {
            if case_sensitive {
                *octet
            } else {
                octet.to_ascii_lowercase()
            }
        };
        self.octets
            .iter()
            .map(fold)
            .zip(other.octets.iter().map(fold))
            .find_map(|(a, b)| Some(a.cmp(&b)).filter(|ordering| ordering.is_ne()))
            .unwrap_or_else(|| self.len().cmp(&other.len()))
    }
}

impl<'a> TryFrom<&'a [u8]> for &'a Label {
    type Error = Error;

    fn try_from(octets: &'a [u8]) -> Result<Self, Self::Error> {
        if octets.len() > MAX_LABEL_LEN {
            Err(Error::LabelTooLong)
        } else {
            Ok(Label::from_unchecked(octets))
        }
    }
}

/// Labels are displayed with the escapes of [RFC 4343 § 2.1]: `.` and
/// `\` are preceded by a backslash, other printable ASCII is written
/// as is, and every remaining octet becomes `\DDD` in zero-padded
/// decimal.
///
/// [RFC 4343 § 2.1]: https://datatracker.ietf.org/doc/html/rfc4343#section-2.1
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &octet in self.octets() {
            match octet {
                b'.' => f.write_str("\\.")?,
                b'\\' => f.write_str("\\\\")?,
                _ if octet.is_ascii_graphic() => write!(f, "{}", octet as char)?,
                _ => write!(f, "\\{:03}", octet)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.octets.eq_ignore_ascii_case(&other.octets)
    }
}

impl Eq for Label {}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other, false)
    }
}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with the case-insensitive PartialEq.
        for octet in self.octets.iter() {
            state.write_u8(octet.to_ascii_lowercase());
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn label(octets: &[u8]) -> &Label {
        octets.try_into().unwrap()
    }

    #[test]
    fn label_rejects_long_slice() {
        assert_eq!(<&Label>::try_from(&[b'x'; 64][..]), Err(Error::LabelTooLong));
        assert!(<&Label>::try_from(&[b'x'; 63][..]).is_ok());
    }

    #[test]
    fn label_eq_folds_case() {
        assert_eq!(label(b"Example"), label(b"eXAMPLE"));
        assert_ne!(label(b"example"), label(b"examples"));
    }

    #[test]
    fn label_compare_honors_case_policy() {
        assert_eq!(label(b"FOO").compare(label(b"foo"), false), Ordering::Equal);
        assert_eq!(label(b"FOO").compare(label(b"foo"), true), Ordering::Less);
        assert_eq!(label(b"foo").compare(label(b"foobar"), false), Ordering::Less);
        assert_eq!(label(b"z").compare(label(b"\x80"), false), Ordering::Less);
    }

    #[test]
    fn label_display_escapes() {
        assert_eq!(label(b"a.b\\c\x00").to_string(), "a\\.b\\\\c\\000");
    }

    #[test]
    fn null_label_is_null() {
        assert!(Label::null().is_null());
        assert!(!label(b"com").is_null());
    }
}
