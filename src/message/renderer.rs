// Copyright 2022 Matthew Ingwersen.
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

//! Implementation of the [`Renderer`] type to write on-the-wire DNS
//! messages.

use std::collections::HashMap;
use std::fmt;

use super::constants::*;
use super::{Opcode, Question, Rcode, Section};
use crate::class::Class;
use crate::name::{LabelSequence, Name};
use crate::rr::rdata::Component;
use crate::rr::{Rdata, Rrset, Ttl, Type};

////////////////////////////////////////////////////////////////////////
// RENDERER                                                           //
////////////////////////////////////////////////////////////////////////

/// A "frame" around a buffer that serializes a DNS message into it.
///
/// A `Renderer` is constructed using [`Renderer::new`] (to set a
/// message size limit different from the underlying buffer size) or
/// with its [`TryFrom`] implementation (which sets the message size
/// limit equal to the buffer length). The underlying buffer and message
/// size limit must be long enough to accommodate a full DNS message
/// header of 12 octets. The message header is initially zeroed.
///
/// Since header information is in a fixed position, it can be written
/// at any time through the appropriate `Renderer` methods. Questions
/// are serialized with [`Renderer::add_question`] and RRsets with
/// [`Renderer::add_rrset`]. These write sequentially into the buffer,
/// so they must be used in section order; attempts to go back to an
/// earlier section fail with [`Error::OutOfOrder`]. The section counts
/// in the header are kept up to date as entries are written.
///
/// # Compression
///
/// The `Renderer` remembers where it wrote each suffix of each domain
/// name, keyed by [`LabelSequence::hash`]. To write a new name, it
/// looks its suffixes up from longest to shortest, confirms a candidate
/// by comparing labels against the buffer, and then writes the
/// unmatched labels followed by a pointer to the longest match. This
/// gives optimal compression over everything written so far.
pub struct Renderer<'a> {
    octets: &'a mut [u8],
    cursor: usize,
    limit: usize,
    section: Section,
    counts: [u16; 4],
    compression_mode: CompressionMode,
    suffixes: HashMap<u64, Vec<u16>>,
}

/// How a [`Renderer`] may (when allowed by the DNS standard) compress
/// domain names in a message.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompressionMode {
    /// Perform standard compression. Names that differ only in case
    /// may share a pointer, so case is not preserved.
    Standard,

    /// Perform case-preserving compression. A pointer is only used for
    /// a suffix written with exactly the same case.
    CasePreserving,

    /// Do not compress domain names.
    Disabled,
}

impl Default for CompressionMode {
    fn default() -> Self {
        Self::Standard
    }
}

impl<'a> Renderer<'a> {
    /// Creates a new `Renderer` from the underlying buffer `octets`.
    /// The message size is limited to `limit` or `octets.len()`
    /// (whichever is smaller). If the smaller limit is too small to
    /// hold a full DNS message header of 12 octets, then this will
    /// fail.
    pub fn new(octets: &'a mut [u8], limit: usize) -> Result<Self> {
        let limit = limit.min(octets.len());
        if limit < HEADER_SIZE {
            Err(Error::Truncation)
        } else {
            octets[0..HEADER_SIZE].fill(0);
            Ok(Self {
                octets,
                cursor: HEADER_SIZE,
                limit,
                section: Section::Question,
                counts: [0; 4],
                compression_mode: CompressionMode::default(),
                suffixes: HashMap::new(),
            })
        }
    }

    /// Configures how the `Renderer` may (when allowed by the DNS
    /// standard) compress domain names in the message.
    ///
    /// Compression is enabled and case-insensitive by default. Changing
    /// this setting does not affect domain names already written.
    pub fn set_compression_mode(&mut self, mode: CompressionMode) {
        self.compression_mode = mode;
    }

    /// Sets the 16-bit ID of the message.
    pub fn set_id(&mut self, id: u16) {
        self.write_u16(ID_START, id);
    }

    /// Sets or clears the QR (query response) bit.
    pub fn set_qr(&mut self, qr: bool) {
        if qr {
            self.octets[QR_BYTE] |= QR_MASK;
        } else {
            self.octets[QR_BYTE] &= !QR_MASK;
        }
    }

    /// Sets the message's opcode.
    pub fn set_opcode(&mut self, opcode: Opcode) {
        self.octets[OPCODE_BYTE] &= !OPCODE_MASK;
        self.octets[OPCODE_BYTE] |= (u8::from(opcode) << OPCODE_SHIFT) & OPCODE_MASK;
    }

    /// Sets the message's RCODE.
    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.octets[RCODE_BYTE] &= !RCODE_MASK;
        self.octets[RCODE_BYTE] |= u8::from(rcode) & RCODE_MASK;
    }

    /// Returns the number of entries written to `section` so far.
    pub fn count(&self, section: Section) -> u16 {
        self.counts[section as usize]
    }

    /// Adds a question to the message. This must be used before any
    /// resource records are added.
    pub fn add_question(&mut self, question: &Question) -> Result<()> {
        if self.section != Section::Question {
            Err(Error::OutOfOrder)
        } else if let Some(new_qdcount) = self.count(Section::Question).checked_add(1) {
            self.with_rollback(|this| {
                this.write_name(&question.qname, true)?;
                this.try_push_u16(question.qtype.into())?;
                this.try_push_u16(question.qclass.into())
            })?;
            self.set_count(Section::Question, new_qdcount);
            Ok(())
        } else {
            Err(Error::CountOverflow)
        }
    }

    /// Adds an [`Rrset`] to `section`, which must not be
    /// [`Section::Question`] nor come before a section that has already
    /// been written. Each [`Rdata`] becomes one record; an `Rrset`
    /// without any [`Rdata`] becomes a single record with an empty
    /// RDATA field.
    ///
    /// This method is atomic: on failure, the message is left as it was.
    pub fn add_rrset(&mut self, section: Section, rrset: &Rrset) -> Result<()> {
        if section == Section::Question {
            return Err(Error::NotRrSection);
        } else if section < self.section {
            return Err(Error::OutOfOrder);
        }
        let new_count = u16::try_from(rrset.rr_count())
            .ok()
            .and_then(|n| self.count(section).checked_add(n))
            .ok_or(Error::CountOverflow)?;

        self.with_rollback(|this| {
            this.section = section;
            if rrset.rdata_count() == 0 {
                this.add_rr(&rrset.owner, rrset.rr_type, rrset.class, rrset.ttl, None)
            } else {
                for rdata in rrset.rdatas() {
                    this.add_rr(
                        &rrset.owner,
                        rrset.rr_type,
                        rrset.class,
                        rrset.ttl,
                        Some(rdata),
                    )?;
                }
                Ok(())
            }
        })?;
        self.set_count(section, new_count);
        Ok(())
    }

    /// Writes out an RR at the current cursor. This is for internal
    /// use: the write is not done atomically and may change the cursor
    /// even when an error is returned. This is intended to be used with
    /// [`Renderer::with_rollback`].
    fn add_rr(
        &mut self,
        owner: &Name,
        rr_type: Type,
        class: Class,
        ttl: Ttl,
        rdata: Option<&Rdata>,
    ) -> Result<()> {
        self.write_name(owner, true)?;
        self.try_push_u16(rr_type.into())?;
        self.try_push_u16(class.into())?;
        self.try_push_u32(ttl.into())?;

        // Save two octets for the RDLENGTH field. We must compute and
        // write this field at the end, since it's affected by
        // compression.
        if self.limit - self.cursor < 2 {
            return Err(Error::Truncation);
        }
        let rdlength_start = self.cursor;
        self.cursor += 2;

        // Write RDATA with compression.
        if let Some(rdata) = rdata {
            for component in rdata.components(class, rr_type) {
                match component.or(Err(Error::InvalidRdata))? {
                    Component::CompressibleName(name) => self.write_name(&name, true)?,
                    Component::UncompressibleName(name) => self.write_name(&name, false)?,
                    Component::Other(octets) => self.try_push(octets)?,
                }
            }
        }

        // Compute and write the RDLENGTH field. Compression never makes
        // RDATA longer, so this fits.
        let rdlength = self.cursor - rdlength_start - 2;
        self.write_u16(rdlength_start, rdlength as u16);
        Ok(())
    }

    /// Consumes the `Renderer`, returning the length of the message.
    pub fn finish(self) -> usize {
        self.cursor
    }

    /// Executes `f(self)`, returning the result and rolling back the
    /// section, cursor, and compression state to the current values
    /// first if the result is an error.
    fn with_rollback<F, T>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved_section = self.section;
        let saved_cursor = self.cursor;
        let result = f(self);
        if result.is_err() {
            self.section = saved_section;
            self.cursor = saved_cursor;
            for offsets in self.suffixes.values_mut() {
                offsets.retain(|&offset| (offset as usize) < saved_cursor);
            }
            self.suffixes.retain(|_, offsets| !offsets.is_empty());
        }
        result
    }

    /// Writes a domain name at the current cursor. If `compressible`
    /// and compression is enabled, its longest suffix already in the
    /// message is replaced with a pointer. Either way, its suffixes are
    /// recorded as targets for later names.
    fn write_name(&mut self, name: &Name, compressible: bool) -> Result<()> {
        let case_sensitive = self.compression_mode == CompressionMode::CasePreserving;
        let sequence = name.label_sequence();
        let start = self.cursor;

        let (n_verbatim, pointer) = if compressible {
            self.find_longest_suffix(&sequence, case_sensitive)
                .map_or((name.label_count() - 1, None), |(n, offset)| (n, Some(offset)))
        } else {
            (name.label_count() - 1, None)
        };

        for label in sequence.labels().take(n_verbatim) {
            self.try_push(&[label.len() as u8])?;
            self.try_push(label.octets())?;
        }
        match pointer {
            Some(offset) => self.try_push_u16(0xc000 | offset)?,
            None => self.try_push(&[0])?,
        }

        if self.compression_mode != CompressionMode::Disabled {
            let mut offset = start;
            for (suffix, label) in sequence.suffixes().zip(sequence.labels()).take(n_verbatim) {
                if offset > POINTER_MAX {
                    break;
                }
                self.suffixes
                    .entry(suffix.hash(case_sensitive))
                    .or_default()
                    .push(offset as u16);
                offset += 1 + label.len();
            }
        }
        Ok(())
    }

    /// Finds the longest suffix of `sequence` (excluding the root alone)
    /// already written to the message, returning the number of labels
    /// before that suffix and the suffix's offset.
    fn find_longest_suffix(
        &self,
        sequence: &LabelSequence,
        case_sensitive: bool,
    ) -> Option<(usize, u16)> {
        if self.compression_mode == CompressionMode::Disabled {
            return None;
        }
        sequence
            .suffixes()
            .take_while(|suffix| suffix.label_count() > 1)
            .enumerate()
            .find_map(|(n_verbatim, suffix)| {
                self.suffixes
                    .get(&suffix.hash(case_sensitive))?
                    .iter()
                    .find(|&&offset| self.suffix_matches(offset as usize, &suffix, case_sensitive))
                    .map(|&offset| (n_verbatim, offset))
            })
    }

    /// Checks whether the name written at `offset` is `suffix`,
    /// following any pointers in the buffer.
    fn suffix_matches(&self, mut offset: usize, suffix: &LabelSequence, case_sensitive: bool) -> bool {
        // Everything before the cursor was written by us, so the labels
        // and pointers there are well-formed and pointers go backward.
        for label in suffix.labels() {
            while self.octets[offset] & 0xc0 == 0xc0 {
                offset =
                    u16::from_be_bytes([self.octets[offset] & 0x3f, self.octets[offset + 1]]) as usize;
            }
            let len = self.octets[offset] as usize;
            let written = &self.octets[offset + 1..offset + 1 + len];
            let equal = if case_sensitive {
                written == label.octets()
            } else {
                written.eq_ignore_ascii_case(label.octets())
            };
            if !equal {
                return false;
            }
            offset += 1 + len;
        }
        true
    }

    /// Sets the count of `section`, in the header and in `self`.
    fn set_count(&mut self, section: Section, count: u16) {
        self.counts[section as usize] = count;
        let position = match section {
            Section::Question => QDCOUNT_START,
            Section::Answer => ANCOUNT_START,
            Section::Authority => NSCOUNT_START,
            Section::Additional => ARCOUNT_START,
        };
        self.write_u16(position, count);
    }

    /// Writes `data` at the current cursor, if there is room.
    fn try_push(&mut self, data: &[u8]) -> Result<()> {
        let end = self.cursor + data.len();
        if end > self.limit {
            Err(Error::Truncation)
        } else {
            self.octets[self.cursor..end].copy_from_slice(data);
            self.cursor = end;
            Ok(())
        }
    }

    /// Writes `data` in network byte order at the current cursor, if
    /// there is room.
    fn try_push_u16(&mut self, data: u16) -> Result<()> {
        self.try_push(&data.to_be_bytes())
    }

    /// Writes `data` in network byte order at the current cursor, if
    /// there is room.
    fn try_push_u32(&mut self, data: u32) -> Result<()> {
        self.try_push(&data.to_be_bytes())
    }

    /// Overwrites the two octets at `position` with `data` in network
    /// byte order.
    fn write_u16(&mut self, position: usize, data: u16) {
        self.octets[position..position + 2].copy_from_slice(&data.to_be_bytes());
    }
}

impl<'a> TryFrom<&'a mut [u8]> for Renderer<'a> {
    type Error = Error;

    fn try_from(octets: &'a mut [u8]) -> Result<Self> {
        let limit = octets.len();
        Self::new(octets, limit)
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that an entry could not be added to a message.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// A section count would exceed 65,535.
    CountOverflow,

    /// The entry does not fit within the buffer or size limit.
    Truncation,

    /// The entry belongs to a section before one already written.
    OutOfOrder,

    /// An RRset was given for the question section.
    NotRrSection,

    /// RDATA could not be broken into components for compression.
    InvalidRdata,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::CountOverflow => f.write_str("section count overflow"),
            Self::Truncation => f.write_str("message size limit exceeded"),
            Self::OutOfOrder => f.write_str("section written out of order"),
            Self::NotRrSection => f.write_str("RRsets cannot go in the question section"),
            Self::InvalidRdata => f.write_str("invalid RDATA"),
        }
    }
}

impl std::error::Error for Error {}

/// The type returned by fallible [`Renderer`] methods.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
