// Copyright 2023 Matthew Ingwersen.
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

//! Implementation of the [`LabelSequence`] view.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;

use arrayvec::ArrayVec;

use super::{new_boxed_name, Label, Name, MAX_LABEL_LEN, MAX_N_LABELS, MAX_WIRE_LEN};

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a [`LabelSequence`] operation failed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// More labels were to be stripped than the sequence can give up.
    /// At least one label must always remain.
    OutOfRange { requested: usize, available: usize },

    /// The buffer passed to [`LabelSequence::serialize`] was too small.
    BadValue { required: usize, actual: usize },

    /// The image passed to [`LabelSequence::from_serialized`] does not
    /// describe a valid label sequence.
    InvalidImage,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::OutOfRange {
                requested,
                available,
            } => write!(
                f,
                "cannot strip {} labels from a sequence of {}",
                requested, available
            ),
            Self::BadValue { required, actual } => write!(
                f,
                "buffer of {} octets is too small for an image of {}",
                actual, required
            ),
            Self::InvalidImage => f.write_str("invalid serialized label sequence"),
        }
    }
}

impl std::error::Error for Error {}

/// The type returned by fallible [`LabelSequence`] operations.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// COMPARISON RESULTS                                                 //
////////////////////////////////////////////////////////////////////////

/// How two label sequences relate in the DNS tree.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NameRelation {
    /// The first sequence is a proper superdomain of the second.
    Superdomain,

    /// The first sequence is a proper subdomain of the second.
    Subdomain,

    /// The sequences are equal.
    Equal,

    /// The sequences share some trailing labels, but neither contains
    /// the other.
    CommonAncestor,

    /// The sequences have nothing in common.
    None,
}

/// The result of [`LabelSequence::compare`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NameComparison {
    /// The canonical ([RFC 4034 § 6.1]) ordering of the first sequence
    /// relative to the second.
    ///
    /// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
    pub order: Ordering,

    /// The number of trailing labels the sequences have in common.
    pub common_labels: usize,

    /// The relation of the first sequence to the second.
    pub relation: NameRelation,
}

////////////////////////////////////////////////////////////////////////
// LABEL SEQUENCES                                                    //
////////////////////////////////////////////////////////////////////////

/// A borrowed window onto consecutive labels of a domain name.
///
/// A `LabelSequence` is built over a [`Name`] (through
/// [`Name::label_sequence`]) or over an image previously written by
/// [`LabelSequence::serialize`]. It never copies: it refers to the
/// source's label offsets and wire data, and the window can be narrowed
/// with [`LabelSequence::strip_left`] and
/// [`LabelSequence::strip_right`] without touching them.
///
/// A sequence always covers at least one label. It is *absolute* when
/// its last label is the null label, i.e. when it reaches the root.
#[derive(Clone, Copy)]
pub struct LabelSequence<'a> {
    data: &'a [u8],
    offsets: &'a [u8],
    first: usize,
    last: usize,
}

impl<'a> LabelSequence<'a> {
    /// The largest possible image written by
    /// [`LabelSequence::serialize`]: the label count, one offset per
    /// label, and the wire data.
    pub const MAX_SERIALIZED_LENGTH: usize = MAX_WIRE_LEN + MAX_N_LABELS + 1;

    /// Creates a sequence covering every label described by `offsets`.
    /// The caller promises that `data` and `offsets` describe a valid
    /// run of labels and that `offsets` is not empty.
    pub(super) fn new(data: &'a [u8], offsets: &'a [u8]) -> Self {
        Self {
            data,
            offsets,
            first: 0,
            last: offsets.len() - 1,
        }
    }

    /// Returns the wire data covered by the sequence.
    pub fn data(&self) -> &'a [u8] {
        &self.data[self.offset_of(self.first)..self.end_of(self.last)]
    }

    /// Returns the number of octets of wire data covered by the
    /// sequence.
    pub fn length(&self) -> usize {
        self.end_of(self.last) - self.offset_of(self.first)
    }

    /// Returns the number of labels in the sequence.
    pub fn label_count(&self) -> usize {
        self.last - self.first + 1
    }

    /// Returns whether the sequence ends with the null label.
    pub fn is_absolute(&self) -> bool {
        self.label_at(self.last).is_null()
    }

    /// Returns an iterator over the labels of the sequence.
    pub fn labels(&self) -> Labels<'a> {
        Labels {
            sequence: *self,
            front: self.first,
            back: self.last + 1,
        }
    }

    /// Returns an iterator over the suffixes of the sequence, from the
    /// whole sequence down to its last label alone.
    pub fn suffixes(&self) -> Suffixes<'a> {
        Suffixes {
            next: Some(*self),
        }
    }

    /// Removes `count` labels from the front of the sequence.
    pub fn strip_left(&mut self, count: usize) -> Result<()> {
        self.check_strip(count)?;
        self.first += count;
        Ok(())
    }

    /// Removes `count` labels from the back of the sequence.
    pub fn strip_right(&mut self, count: usize) -> Result<()> {
        self.check_strip(count)?;
        self.last -= count;
        Ok(())
    }

    fn check_strip(&self, count: usize) -> Result<()> {
        if count >= self.label_count() {
            Err(Error::OutOfRange {
                requested: count,
                available: self.label_count(),
            })
        } else {
            Ok(())
        }
    }

    /// Returns whether two sequences cover the same wire data, folding
    /// ASCII case unless `case_sensitive` is set.
    pub fn equals(&self, other: &LabelSequence, case_sensitive: bool) -> bool {
        let (ours, theirs) = (self.data(), other.data());
        if case_sensitive {
            ours == theirs
        } else {
            ours.eq_ignore_ascii_case(theirs)
        }
    }

    /// Compares two sequences label by label from the root end.
    ///
    /// If exactly one of the sequences is absolute, they cannot be
    /// related; the result then has relation [`NameRelation::None`], no
    /// common labels, and orders the relative sequence first.
    pub fn compare(&self, other: &LabelSequence, case_sensitive: bool) -> NameComparison {
        if self.is_absolute() != other.is_absolute() {
            return NameComparison {
                order: self.is_absolute().cmp(&other.is_absolute()),
                common_labels: 0,
                relation: NameRelation::None,
            };
        }

        let mut common_labels = 0;
        for (ours, theirs) in self.labels().rev().zip(other.labels().rev()) {
            let order = ours.compare(theirs, case_sensitive);
            if order.is_ne() {
                return NameComparison {
                    order,
                    common_labels,
                    relation: if common_labels > 0 {
                        NameRelation::CommonAncestor
                    } else {
                        NameRelation::None
                    },
                };
            }
            common_labels += 1;
        }

        let order = self.label_count().cmp(&other.label_count());
        NameComparison {
            order,
            common_labels,
            relation: match order {
                Ordering::Less => NameRelation::Superdomain,
                Ordering::Greater => NameRelation::Subdomain,
                Ordering::Equal => NameRelation::Equal,
            },
        }
    }

    /// Computes a simple hash over (at most) the first 16 octets of the
    /// sequence's wire data, folding ASCII case unless `case_sensitive`
    /// is set.
    ///
    /// This is meant for small internal tables such as the compression
    /// table of a [`Renderer`](crate::message::Renderer). It is easy to
    /// find collisions, so it must not be used for tables whose keys
    /// come from untrusted input.
    pub fn hash(&self, case_sensitive: bool) -> u64 {
        self.data().iter().take(16).fold(0, |seed: u64, &octet| {
            let octet = if case_sensitive {
                octet
            } else {
                octet.to_ascii_lowercase()
            };
            seed ^ (octet as u64)
                .wrapping_add(0x9e3779b9)
                .wrapping_add(seed << 6)
                .wrapping_add(seed >> 2)
        })
    }

    /// Returns the length of the image [`LabelSequence::serialize`]
    /// would write.
    pub fn serialized_length(&self) -> usize {
        1 + self.label_count() + self.length()
    }

    /// Writes an image of the sequence into `buf`: the label count, the
    /// label offsets relative to the first label, and the wire data.
    /// Returns the number of octets written.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        let required = self.serialized_length();
        if buf.len() < required {
            return Err(Error::BadValue {
                required,
                actual: buf.len(),
            });
        }

        let base = self.offset_of(self.first);
        let n_labels = self.label_count();
        buf[0] = n_labels as u8;
        for (slot, offset) in buf[1..=n_labels]
            .iter_mut()
            .zip(&self.offsets[self.first..=self.last])
        {
            *slot = offset - base as u8;
        }
        buf[1 + n_labels..required].copy_from_slice(self.data());
        Ok(required)
    }

    /// Borrows a sequence from an image written by
    /// [`LabelSequence::serialize`]. The image is fully validated.
    /// Octets after the end of the image are ignored.
    pub fn from_serialized(image: &'a [u8]) -> Result<Self> {
        let n_labels = *image.first().ok_or(Error::InvalidImage)? as usize;
        if n_labels == 0 || n_labels > MAX_N_LABELS {
            return Err(Error::InvalidImage);
        }
        let offsets = image.get(1..=n_labels).ok_or(Error::InvalidImage)?;
        let data = &image[1 + n_labels..];

        // The offsets must describe back-to-back labels starting at the
        // first octet, with only the last label allowed to be null.
        let mut expected = 0;
        for (i, &offset) in offsets.iter().enumerate() {
            let offset = offset as usize;
            let label_len = *data.get(offset).ok_or(Error::InvalidImage)? as usize;
            let is_last = i == n_labels - 1;
            if offset != expected
                || label_len > MAX_LABEL_LEN
                || (label_len == 0 && !is_last)
            {
                return Err(Error::InvalidImage);
            }
            expected = offset + 1 + label_len;
        }
        if expected > data.len() || expected > MAX_WIRE_LEN {
            return Err(Error::InvalidImage);
        }

        Ok(Self::new(&data[..expected], offsets))
    }

    /// Copies an absolute sequence into a new boxed [`Name`]. Returns
    /// `None` for a relative sequence.
    pub fn to_name(&self) -> Option<Box<Name>> {
        if !self.is_absolute() {
            return None;
        }
        let base = self.offset_of(self.first);
        let label_offsets: ArrayVec<u8, MAX_N_LABELS> = self.offsets[self.first..=self.last]
            .iter()
            .map(|offset| offset - base as u8)
            .collect();
        let data = self.data();
        unsafe {
            // SAFETY: an absolute window onto valid labels is itself a
            // valid name, and the offsets were rebased to match.
            Some(new_boxed_name(data.len(), &label_offsets, &[data]))
        }
    }

    /// Writes the textual form of the sequence, with labels escaped as
    /// [`Label`]'s `Display` does. The dot after the last label of an
    /// absolute sequence is left out when `omit_final_dot` is set,
    /// except for the root itself.
    pub(crate) fn write_text<W: fmt::Write>(&self, f: &mut W, omit_final_dot: bool) -> fmt::Result {
        if self.label_count() == 1 && self.is_absolute() {
            return f.write_char('.');
        }
        for (i, label) in self.labels().enumerate() {
            if label.is_null() {
                if !omit_final_dot {
                    f.write_char('.')?;
                }
            } else {
                if i > 0 {
                    f.write_char('.')?;
                }
                write!(f, "{}", label)?;
            }
        }
        Ok(())
    }

    fn offset_of(&self, index: usize) -> usize {
        self.offsets[index] as usize
    }

    fn end_of(&self, index: usize) -> usize {
        let offset = self.offset_of(index);
        offset + 1 + self.data[offset] as usize
    }

    fn label_at(&self, index: usize) -> &'a Label {
        let start = self.offset_of(index) + 1;
        Label::from_unchecked(&self.data[start..self.end_of(index)])
    }
}

impl fmt::Display for LabelSequence<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_text(f, false)
    }
}

impl fmt::Debug for LabelSequence<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl PartialEq for LabelSequence<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, false)
    }
}

impl Eq for LabelSequence<'_> {}

impl Hash for LabelSequence<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for octet in self.data() {
            state.write_u8(octet.to_ascii_lowercase());
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ITERATORS                                                          //
////////////////////////////////////////////////////////////////////////

/// An iterator over the [`Label`]s of a [`LabelSequence`] (and hence of
/// a [`Name`]).
#[derive(Clone, Debug)]
pub struct Labels<'a> {
    sequence: LabelSequence<'a>,
    front: usize,
    back: usize,
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a Label;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.front += 1;
            Some(self.sequence.label_at(self.front - 1))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Labels<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back > self.front {
            self.back -= 1;
            Some(self.sequence.label_at(self.back))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for Labels<'_> {}

impl FusedIterator for Labels<'_> {}

/// An iterator over the suffixes of a [`LabelSequence`], longest first.
#[derive(Clone, Debug)]
pub struct Suffixes<'a> {
    next: Option<LabelSequence<'a>>,
}

impl<'a> Iterator for Suffixes<'a> {
    type Item = LabelSequence<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let mut rest = current;
        self.next = rest.strip_left(1).ok().map(|()| rest);
        Some(current)
    }
}

impl FusedIterator for Suffixes<'_> {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
