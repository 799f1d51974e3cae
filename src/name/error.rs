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

//! The [`Error`] type for problems building or decoding names.

use std::fmt;

/// An error signaling that a [`Name`](super::Name) or
/// [`Label`](super::Label) could not be constructed, whether from text,
/// from a [`NameBuilder`](super::NameBuilder), or from the wire.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// The name did not occupy the whole buffer it was required to.
    ExtraData,

    /// A `\` escape in a textual name was malformed.
    InvalidEscape,

    /// A compression pointer did not point strictly backward.
    InvalidPointer,

    /// A label was longer than 63 octets.
    LabelTooLong,

    /// The name was longer than 255 octets on the wire.
    NameTooLong,

    /// The final label was not the root (null) label.
    NonNullTerminal,

    /// A null label appeared before the end of the name.
    NullNonTerminal,

    /// A textual name was the empty string.
    StrEmpty,

    /// A textual name contained non-ASCII characters.
    StrNotAscii,

    /// The buffer ended in the middle of the name.
    UnexpectedEom,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::ExtraData => f.write_str("extra data after the name"),
            Self::InvalidEscape => f.write_str("invalid escape sequence"),
            Self::InvalidPointer => f.write_str("compression pointer does not point backward"),
            Self::LabelTooLong => f.write_str("label is longer than 63 octets"),
            Self::NameTooLong => f.write_str("name is longer than 255 octets on the wire"),
            Self::NonNullTerminal => f.write_str("last label is not null"),
            Self::NullNonTerminal => f.write_str("non-terminal label is null"),
            Self::StrEmpty => f.write_str("string was empty"),
            Self::StrNotAscii => f.write_str("string was not ASCII"),
            Self::UnexpectedEom => f.write_str("unexpected end of message"),
        }
    }
}

impl std::error::Error for Error {}
