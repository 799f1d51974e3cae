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

//! Implementation of the update [`Error`] type.

use std::fmt;

use super::{Mode, QrFlag};
use crate::message::{reader, renderer, Opcode};

/// An error signaling that an [`UpdateMessage`](super::UpdateMessage)
/// operation failed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// The zone section did not hold exactly one entry.
    InvalidZoneSection { count: usize },

    /// The QR flag was not the one the operation requires.
    InvalidQrFlag { expected: QrFlag },

    /// A decoded message did not have the UPDATE opcode.
    NotUpdateMessage { opcode: Opcode },

    /// The operation is not allowed on a message in this mode, or (for
    /// decoding) on a message that is not empty.
    InvalidOperation { mode: Mode },

    /// The message could not be decoded.
    Decode(reader::Error),

    /// The message could not be encoded.
    Encode(renderer::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::InvalidZoneSection { count } => {
                write!(f, "zone section has {} entries, but must have exactly one", count)
            }
            Self::InvalidQrFlag { expected } => {
                write!(f, "QR flag must indicate a {}", expected)
            }
            Self::NotUpdateMessage { opcode } => {
                write!(f, "message has opcode {}, not UPDATE", opcode)
            }
            Self::InvalidOperation { mode } => {
                write!(f, "operation not allowed on a message in {} mode", mode)
            }
            Self::Decode(err) => write!(f, "failed to decode message: {}", err),
            Self::Encode(err) => write!(f, "failed to encode message: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<reader::Error> for Error {
    fn from(err: reader::Error) -> Self {
        Self::Decode(err)
    }
}

impl From<renderer::Error> for Error {
    fn from(err: renderer::Error) -> Self {
        Self::Encode(err)
    }
}

/// The type returned by fallible [`UpdateMessage`](super::UpdateMessage)
/// methods.
pub type Result<T> = std::result::Result<T, Error>;
