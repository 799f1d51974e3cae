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

//! Domain names and views over their labels.

use std::alloc::{self, Layout};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;
use std::str::FromStr;

mod builder;
mod error;
mod label;
pub mod label_sequence;
mod wire;
pub use builder::NameBuilder;
pub use error::Error;
pub use label::Label;
pub use label_sequence::{LabelSequence, Labels, NameComparison, NameRelation, Suffixes};

/// The maximum number of labels in a domain name.
const MAX_N_LABELS: usize = 128;

/// The maximum length of the uncompressed on-the-wire representation of
/// a domain name.
const MAX_WIRE_LEN: usize = 255;

/// The maximum length of a label in a domain name (not including the
/// octet that provides the length).
const MAX_LABEL_LEN: usize = 63;

////////////////////////////////////////////////////////////////////////
// NAME STRUCTURE                                                     //
////////////////////////////////////////////////////////////////////////

/// An absolute domain name.
///
/// This is a dynamically sized type, used through `&Name` and
/// `Box<Name>`. Boxed names come from:
///
/// * the [`FromStr`] implementation (with [RFC 4343] escapes);
/// * a [`NameBuilder`];
/// * uncompressed wire data, through [`Name::try_from_uncompressed`];
/// * a DNS message, through [`Name::try_from_compressed`]; and
/// * an absolute [`LabelSequence`], through
///   [`LabelSequence::to_name`].
///
/// A `Name` stores, in one allocation, the number of labels, the offset
/// of each label within the wire representation, and the uncompressed
/// wire representation itself ([RFC 1035 § 3.1]). Only the last field
/// of a Rust structure may be unsized, so the offsets and the wire
/// representation share the `data` field. The offsets make label
/// access and [`LabelSequence`] windows constant-time.
///
/// Names compare, order, and hash without regard to ASCII case. The
/// ordering is the canonical one of [RFC 4034 § 6.1].
///
/// [RFC 1035 § 3.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.1
/// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
/// [RFC 4343]: https://datatracker.ietf.org/doc/html/rfc4343
#[repr(C)]
pub struct Name {
    n_labels: u8,
    data: [u8],
}

/// Private helpers to access unsized fields.
impl Name {
    /// Returns the offsets of the labels in the wire representation.
    fn label_offsets(&self) -> &[u8] {
        &self.data[0..self.label_count()]
    }
}

/// Private allocation/initialization helpers for use within this module.
impl Name {
    /// Converts a pointer to an initialized `Name` buffer and its size
    /// information into a fat `*const Name`.
    ///
    /// # Safety
    ///
    /// This is not unsafe in itself, but to dereference the result, the
    /// buffer must hold a valid `Name` within a single allocation,
    /// `n_labels` and `wire_len` must describe it, and it must not be
    /// mutated while the reference lives.
    fn make_fat_pointer(octets: *const u8, n_labels: usize, wire_len: usize) -> *const Name {
        // NOTE: switch to std::ptr::from_raw_parts once it is stable.
        ptr::slice_from_raw_parts(octets, n_labels + wire_len) as *const Name
    }

    /// The mutable variant of [`Name::make_fat_pointer`], with the same
    /// requirements. In addition, nothing else may access the buffer
    /// while the resulting reference lives.
    fn make_fat_pointer_mut(octets: *mut u8, n_labels: usize, wire_len: usize) -> *mut Name {
        ptr::slice_from_raw_parts_mut(octets, n_labels + wire_len) as *mut Name
    }

    /// Writes a `Name` into `allocation`: the label count, then
    /// `label_offsets`, then the concatenation of `slices`, which is the
    /// wire representation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that
    ///
    /// * `allocation` is a single allocation valid for writes of
    ///   [`Name::size_required_for`] octets;
    /// * `slices` and `label_offsets` describe a valid name; and
    /// * none of the slices overlaps the allocation.
    unsafe fn initialize_into(allocation: *mut u8, label_offsets: &[u8], slices: &[&[u8]]) {
        let n_labels = label_offsets.len();
        allocation.write(n_labels as u8);
        ptr::copy_nonoverlapping(label_offsets.as_ptr(), allocation.add(1), n_labels);
        let mut index = 1 + n_labels;
        for slice in slices {
            // SAFETY: a valid name keeps index within the allocation,
            // and the caller promised the slices do not overlap it.
            ptr::copy_nonoverlapping(slice.as_ptr(), allocation.add(index), slice.len());
            index += slice.len();
        }
    }

    /// Returns the size of a `Name` with `n_labels` labels and a wire
    /// representation of `wire_len` octets.
    const fn size_required_for(n_labels: usize, wire_len: usize) -> usize {
        1 + n_labels + wire_len
    }
}

////////////////////////////////////////////////////////////////////////
// NAME PUBLIC API                                                    //
////////////////////////////////////////////////////////////////////////

impl Name {
    /// Returns whether the `Name` is the DNS root `.`.
    pub fn is_root(&self) -> bool {
        self.n_labels == 1
    }

    /// Returns whether this `Name` is equal to or a subdomain of
    /// `other`.
    pub fn eq_or_subdomain_of(&self, other: &Name) -> bool {
        matches!(
            self.label_sequence()
                .compare(&other.label_sequence(), false)
                .relation,
            NameRelation::Equal | NameRelation::Subdomain
        )
    }

    /// Returns the number of labels in this `Name`, counting the null
    /// label.
    pub fn label_count(&self) -> usize {
        self.n_labels as usize
    }

    /// Returns an iterator over the labels of this `Name`.
    pub fn labels(&self) -> Labels {
        self.label_sequence().labels()
    }

    /// Returns a [`LabelSequence`] covering the whole `Name`.
    pub fn label_sequence(&self) -> LabelSequence {
        LabelSequence::new(self.wire_repr(), self.label_offsets())
    }

    /// Returns a reference to a `Name` representing the DNS root, `.`.
    pub fn root() -> &'static Name {
        static ROOT_NAME_REPR: [u8; 3] = [1, 0, 0];
        unsafe {
            // SAFETY: this is a valid one-label Name in a single static
            // that is never mutated.
            &*Name::make_fat_pointer(ROOT_NAME_REPR.as_ptr(), 1, 1)
        }
    }

    /// Decompresses the name at index `start` of `message`, which
    /// should be an entire DNS message so that pointers resolve. Returns
    /// the name and the number of octets it occupies at `start` (2 if
    /// it is a lone pointer, for instance).
    pub fn try_from_compressed(message: &[u8], start: usize) -> Result<(Box<Self>, usize), Error> {
        wire::parse_compressed_name(message, start)
    }

    /// Parses the uncompressed name at the start of `octets`, ignoring
    /// anything after it. Returns the name and its length.
    pub fn try_from_uncompressed(octets: &[u8]) -> Result<(Box<Self>, usize), Error> {
        wire::parse_uncompressed_name(octets, false)
    }

    /// Like [`Name::try_from_uncompressed`], but fails with
    /// [`Error::ExtraData`] unless the name fills `octets`.
    pub fn try_from_uncompressed_all(octets: &[u8]) -> Result<Box<Self>, Error> {
        wire::parse_uncompressed_name(octets, true).map(|(name, _)| name)
    }

    /// Checks the uncompressed name at the start of `octets` without
    /// allocating, returning its length.
    pub fn validate_uncompressed(octets: &[u8]) -> Result<usize, Error> {
        wire::validate_uncompressed_name(octets, false)
    }

    /// Like [`Name::validate_uncompressed`], but fails with
    /// [`Error::ExtraData`] unless the name fills `octets`.
    pub fn validate_uncompressed_all(octets: &[u8]) -> Result<(), Error> {
        wire::validate_uncompressed_name(octets, true).and(Ok(()))
    }

    /// Returns the uncompressed on-the-wire representation of the
    /// `Name`.
    pub fn wire_repr(&self) -> &[u8] {
        &self.data[self.label_count()..]
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.label_sequence().write_text(f, false)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.label_sequence().equals(&other.label_sequence(), false)
    }
}

impl Eq for Name {}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label_sequence()
            .compare(&other.label_sequence(), false)
            .order
    }
}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&self.label_sequence(), state)
    }
}

////////////////////////////////////////////////////////////////////////
// ALLOCATION AND CLONING OF BOXED NAMES                              //
////////////////////////////////////////////////////////////////////////

/// Allocates and initializes a `Box<Name>`. `label_offsets` gives the
/// start of each label in the wire representation, which is the
/// concatenation of `slices` and is `wire_len` octets long.
///
/// # Safety
///
/// The caller must ensure that the concatenated `slices` are a valid
/// wire representation of a domain name and that `wire_len` and
/// `label_offsets` describe it correctly.
unsafe fn new_boxed_name(wire_len: usize, label_offsets: &[u8], slices: &[&[u8]]) -> Box<Name> {
    // SAFETY:
    // * from_size_align_unchecked: an alignment of 1 is a nonzero power
    //   of two, and rounding up to it cannot overflow.
    // * alloc: size_required_for is never zero.
    // * initialize_into: the allocation is fresh, so no slice overlaps
    //   it, and the caller vouched for the name.
    // * from_raw: Name is repr(C) with alignment 1, so this matches the
    //   layout we allocated. The pointer is used once.
    let n_labels = label_offsets.len();
    let size = Name::size_required_for(n_labels, wire_len);
    let layout = Layout::from_size_align_unchecked(size, 1);
    let allocation = alloc::alloc(layout);
    if allocation.is_null() {
        alloc::handle_alloc_error(layout);
    }
    Name::initialize_into(allocation, label_offsets, slices);
    Box::from_raw(Name::make_fat_pointer_mut(allocation, n_labels, wire_len))
}

impl ToOwned for Name {
    type Owned = Box<Name>;

    fn to_owned(&self) -> Self::Owned {
        unsafe {
            // SAFETY: every Name this module hands out is valid.
            new_boxed_name(
                self.wire_repr().len(),
                self.label_offsets(),
                &[self.wire_repr()],
            )
        }
    }
}

impl Clone for Box<Name> {
    fn clone(&self) -> Self {
        self.as_ref().to_owned()
    }
}

////////////////////////////////////////////////////////////////////////
// PARSING OF NAMES FROM RUST STRINGS                                 //
////////////////////////////////////////////////////////////////////////

/// Parses a boxed [`Name`] from its textual form. The string must be
/// ASCII and fully qualified (end with `.`). The escapes of
/// [RFC 4343 § 2.1] are recognized: `\` followed by three decimal
/// digits gives that octet, and `\` followed by any other character
/// gives the character itself.
///
/// [RFC 4343 § 2.1]: https://datatracker.ietf.org/doc/html/rfc4343#section-2.1
impl FromStr for Box<Name> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::StrEmpty);
        } else if s == "." {
            return Ok(Name::root().to_owned());
        }

        let mut builder = NameBuilder::new();
        let mut rest = s.as_bytes();
        // Every multi-byte UTF-8 character starts with a non-ASCII
        // octet, so checking each octet is enough.
        while let Some((&octet, after)) = rest.split_first() {
            rest = after;
            match octet {
                b'\\' => {
                    let (value, consumed) = parse_escape(rest)?;
                    builder.try_push(value)?;
                    rest = &rest[consumed..];
                }
                b'.' => builder.next_label()?,
                _ if !octet.is_ascii() => return Err(Error::StrNotAscii),
                _ => builder.try_push(octet)?,
            }
        }
        builder.finish()
    }
}

/// Parses the escape whose backslash was just consumed, returning the
/// octet it denotes and the number of octets after the backslash that
/// it used.
fn parse_escape(rest: &[u8]) -> Result<(u8, usize), Error> {
    match rest {
        [] => Err(Error::InvalidEscape),
        [first, ..] if first.is_ascii_digit() => {
            let digits = rest
                .get(..3)
                .filter(|digits| digits.iter().all(u8::is_ascii_digit))
                .ok_or(Error::InvalidEscape)?;
            let value = digits
                .iter()
                .fold(0, |value, digit| 10 * value + (digit - b'0') as usize);
            u8::try_from(value)
                .map(|value| (value, 3))
                .or(Err(Error::InvalidEscape))
        }
        [first, ..] if !first.is_ascii() => Err(Error::StrNotAscii),
        [first, ..] => Ok((*first, 1)),
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_expected_characteristics() {
        let root = Name::root();
        assert!(root.is_root());
        assert_eq!(root.label_count(), 1);
        assert_eq!(root.label_offsets(), &[0]);
        assert_eq!(root.wire_repr(), &[0]);
        assert_eq!(root.to_string(), ".");
    }

    #[test]
    fn fromstr_works() {
        let name: Box<Name> = "foo.example.com.".parse().unwrap();
        assert_eq!(name.wire_repr(), b"\x03foo\x07example\x03com\x00");
        assert_eq!(name.label_offsets(), &[0, 4, 12, 16]);
        assert_eq!(name.to_string(), "foo.example.com.");
    }

    #[test]
    fn fromstr_works_for_root() {
        let name: Box<Name> = ".".parse().unwrap();
        assert_eq!(name.as_ref(), Name::root());
    }

    #[test]
    fn fromstr_rejects_bad_names() {
        assert_eq!("".parse::<Box<Name>>(), Err(Error::StrEmpty));
        assert_eq!("é.example.".parse::<Box<Name>>(), Err(Error::StrNotAscii));
        assert_eq!("example.com".parse::<Box<Name>>(), Err(Error::NonNullTerminal));
        assert_eq!("a..example.".parse::<Box<Name>>(), Err(Error::NullNonTerminal));
        assert_eq!(
            format!("{}.", "x".repeat(64)).parse::<Box<Name>>(),
            Err(Error::LabelTooLong)
        );
        assert_eq!("x.".repeat(128).parse::<Box<Name>>(), Err(Error::NameTooLong));
    }

    #[test]
    fn fromstr_escaping_works() {
        let escaped: Box<Name> = "\\000.\\\\\\..".parse().unwrap();
        assert_eq!(escaped.wire_repr(), b"\x01\x00\x02\\.\x00");
        assert_eq!(escaped.to_string(), "\\000.\\\\\\..");
    }

    #[test]
    fn fromstr_rejects_invalid_escapes() {
        assert_eq!("\\00".parse::<Box<Name>>(), Err(Error::InvalidEscape));
        assert_eq!("\\00x.".parse::<Box<Name>>(), Err(Error::InvalidEscape));
        assert_eq!("\\256.".parse::<Box<Name>>(), Err(Error::InvalidEscape));
        assert_eq!("x\\".parse::<Box<Name>>(), Err(Error::InvalidEscape));
    }

    #[test]
    fn labels_iterator_works() {
        let name: Box<Name> = "foo.example.com.".parse().unwrap();
        let octets: Vec<&[u8]> = name.labels().map(Label::octets).collect();
        assert_eq!(octets, [&b"foo"[..], &b"example"[..], &b"com"[..], &b""[..]]);
        assert_eq!(name.labels().rev().next(), Some(Label::null()));
        assert_eq!(name.labels().len(), 4);
    }

    #[test]
    fn eq_and_hash_fold_case() {
        use std::collections::HashSet;
        let upper: Box<Name> = "WWW.EXAMPLE.COM.".parse().unwrap();
        let lower: Box<Name> = "www.example.com.".parse().unwrap();
        assert_eq!(upper, lower);
        let set: HashSet<Box<Name>> = [upper, lower].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn eq_or_subdomain_of_works() {
        let foo: Box<Name> = "foo.example.com.".parse().unwrap();
        let example: Box<Name> = "example.com.".parse().unwrap();
        let org: Box<Name> = "example.org.".parse().unwrap();
        assert!(foo.eq_or_subdomain_of(&example));
        assert!(example.eq_or_subdomain_of(&example));
        assert!(example.eq_or_subdomain_of(Name::root()));
        assert!(!example.eq_or_subdomain_of(&foo));
        assert!(!org.eq_or_subdomain_of(&example));
    }

    #[test]
    fn ord_works() {
        // The ordered list from RFC 4034 § 6.1.
        let names: Vec<Box<Name>> = [
            "example.",
            "a.example.",
            "yljkjljk.a.example.",
            "Z.a.example.",
            "zABC.a.EXAMPLE.",
            "z.example.",
            "\\001.z.example.",
            "*.z.example.",
            "\\200.z.example.",
        ]
        .into_iter()
        .map(|n| n.parse().unwrap())
        .collect();

        for (i, ni) in names.iter().enumerate() {
            for (j, nj) in names.iter().enumerate() {
                assert_eq!(i.cmp(&j), ni.cmp(nj));
            }
        }
    }

    #[test]
    fn to_owned_copies() {
        let name: Box<Name> = "example.com.".parse().unwrap();
        let copy = name.clone();
        assert_eq!(copy.wire_repr(), name.wire_repr());
        assert_ne!(copy.wire_repr().as_ptr(), name.wire_repr().as_ptr());
    }
}
