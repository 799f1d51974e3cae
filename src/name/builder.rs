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

//! Implementation of the [`NameBuilder`] structure.

use arrayvec::ArrayVec;

use super::{new_boxed_name, Error, Name, MAX_LABEL_LEN, MAX_N_LABELS, MAX_WIRE_LEN};

/// Builds a boxed [`Name`] one octet at a time.
///
/// The wire representation and label offsets are accumulated in
/// fixed-size buffers large enough for any valid name, so a builder on
/// the stack costs one heap allocation, made by
/// [`NameBuilder::finish`].
///
/// A new builder holds a single null label; finishing it right away
/// gives the root. Octets are appended to the current label with
/// [`NameBuilder::try_push`], and [`NameBuilder::next_label`] closes
/// the current label and opens a new, empty one. Every method checks
/// the limits on label and name length as it goes and leaves the
/// builder unchanged on error.
///
/// ```
/// use dnsupdate::name::NameBuilder;
/// let mut builder = NameBuilder::new();
/// for octet in b"example" {
///     builder.try_push(*octet).unwrap();
/// }
/// builder.next_label().unwrap();
/// for octet in b"com" {
///     builder.try_push(*octet).unwrap();
/// }
/// builder.next_label().unwrap();
/// assert_eq!(builder.finish().unwrap(), "example.com.".parse().unwrap());
/// ```
pub struct NameBuilder {
    wire_repr: ArrayVec<u8, MAX_WIRE_LEN>,
    label_offsets: ArrayVec<u8, MAX_N_LABELS>,
    label_start: usize,
}

impl NameBuilder {
    /// Constructs a new `NameBuilder` holding only the null label.
    pub fn new() -> Self {
        let mut wire_repr = ArrayVec::new();
        let mut label_offsets = ArrayVec::new();
        wire_repr.push(0);
        label_offsets.push(0);
        Self {
            wire_repr,
            label_offsets,
            label_start: 0,
        }
    }

    /// Returns the length of the label currently being built.
    fn label_len(&self) -> usize {
        self.wire_repr.len() - self.label_start - 1
    }

    /// Returns whether the name built so far ends with the null label.
    pub fn is_fully_qualified(&self) -> bool {
        self.label_len() == 0
    }

    /// Appends `octet` to the current label.
    pub fn try_push(&mut self, octet: u8) -> Result<(), Error> {
        if self.label_len() >= MAX_LABEL_LEN {
            Err(Error::LabelTooLong)
        } else {
            self.wire_repr
                .try_push(octet)
                .or(Err(Error::NameTooLong))?;
            self.wire_repr[self.label_start] += 1;
            Ok(())
        }
    }

    /// Closes the current label and starts a new, empty one. This fails
    /// if the current label is null, since only the last label of a
    /// name may be null.
    pub fn next_label(&mut self) -> Result<(), Error> {
        if self.is_fully_qualified() {
            Err(Error::NullNonTerminal)
        } else if self.wire_repr.is_full() {
            Err(Error::NameTooLong)
        } else {
            // Neither push fails: the wire buffer has room, and a name
            // with only non-null labels so far and room for another
            // octet has fewer than MAX_N_LABELS labels.
            self.label_start = self.wire_repr.len();
            self.wire_repr.push(0);
            self.label_offsets.push(self.label_start as u8);
            Ok(())
        }
    }

    /// Consumes the builder and returns the finished [`Name`]. The
    /// current label must be null.
    pub fn finish(self) -> Result<Box<Name>, Error> {
        if !self.is_fully_qualified() {
            Err(Error::NonNullTerminal)
        } else {
            unsafe {
                // SAFETY: each push checked the limits, and the name
                // ends with the null label, so the wire representation
                // and offsets describe a valid name.
                Ok(new_boxed_name(
                    self.wire_repr.len(),
                    &self.label_offsets,
                    &[&self.wire_repr],
                ))
            }
        }
    }
}

impl Default for NameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
