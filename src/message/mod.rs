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

//! Implementation of reading and writing of DNS messages.
//!
//! A [`Message`] is the decoded form of a whole DNS message, with its
//! records grouped into [`Rrset`]s. It is encoded through a
//! [`Renderer`] and decoded with a [`Reader`].

use std::borrow::Cow;

use log::debug;

use crate::rr::{Rdata, Rrset};

mod constants;
mod opcode;
mod question;
mod rcode;
pub mod reader;
pub mod renderer;
pub use opcode::{IntoOpcodeError, Opcode};
pub use question::Question;
pub use rcode::{IntoRcodeError, Rcode};
pub use reader::Reader;
pub use renderer::{CompressionMode, Renderer};

////////////////////////////////////////////////////////////////////////
// SECTIONS                                                           //
////////////////////////////////////////////////////////////////////////

/// The sections of a DNS message, in the order they appear on the
/// wire.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Section {
    Question,
    Answer,
    Authority,
    Additional,
}

impl Section {
    /// The sections that hold resource records.
    pub const RR_SECTIONS: [Self; 3] = [Self::Answer, Self::Authority, Self::Additional];
}

////////////////////////////////////////////////////////////////////////
// MESSAGES                                                           //
////////////////////////////////////////////////////////////////////////

/// A DNS message: a header, a question section, and three sections of
/// [`Rrset`]s.
///
/// The section counts of the header are not stored; they are derived
/// from the sections when the message is encoded (see
/// [`Message::count`]).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub id: u16,
    pub qr: bool,
    pub opcode: Opcode,
    pub rcode: Rcode,
    pub questions: Vec<Question>,
    pub answers: Vec<Rrset>,
    pub authorities: Vec<Rrset>,
    pub additionals: Vec<Rrset>,
}

impl Message {
    /// Creates an empty query message with ID zero and the given
    /// opcode.
    pub fn new(opcode: Opcode) -> Self {
        Self {
            id: 0,
            qr: false,
            opcode,
            rcode: Rcode::NoError,
            questions: Vec::new(),
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
        }
    }

    /// Returns the [`Rrset`]s of `section`. The question section has
    /// none.
    pub fn rrsets(&self, section: Section) -> &[Rrset] {
        match section {
            Section::Question => &[],
            Section::Answer => &self.answers,
            Section::Authority => &self.authorities,
            Section::Additional => &self.additionals,
        }
    }

    /// Returns the [`Rrset`]s of `section` for modification, or `None`
    /// for the question section.
    pub fn rrsets_mut(&mut self, section: Section) -> Option<&mut Vec<Rrset>> {
        match section {
            Section::Question => None,
            Section::Answer => Some(&mut self.answers),
            Section::Authority => Some(&mut self.authorities),
            Section::Additional => Some(&mut self.additionals),
        }
    }

    /// Returns the number of entries `section` takes up on the wire:
    /// the number of questions, or the number of records.
    pub fn count(&self, section: Section) -> usize {
        match section {
            Section::Question => self.questions.len(),
            _ => self.rrsets(section).iter().map(Rrset::rr_count).sum(),
        }
    }

    /// Encodes the message through `renderer`, writing the header and
    /// then every section in order.
    pub fn encode(&self, renderer: &mut Renderer) -> renderer::Result<()> {
        self.encode_header(renderer);
        for question in self.questions.iter() {
            renderer.add_question(question)?;
        }
        self.encode_rrsets(renderer)
    }

    /// Writes the header fields other than the counts.
    pub(crate) fn encode_header(&self, renderer: &mut Renderer) {
        renderer.set_id(self.id);
        renderer.set_qr(self.qr);
        renderer.set_opcode(self.opcode);
        renderer.set_rcode(self.rcode);
    }

    /// Writes the answer, authority, and additional sections.
    pub(crate) fn encode_rrsets(&self, renderer: &mut Renderer) -> renderer::Result<()> {
        for section in Section::RR_SECTIONS {
            for rrset in self.rrsets(section) {
                renderer.add_rrset(section, rrset)?;
            }
        }
        Ok(())
    }

    /// Decodes a whole DNS message.
    ///
    /// Exactly the number of entries given by the header counts is
    /// read from each section, and nothing may follow them. The
    /// reserved Z bits of the header must be clear. Consecutive records
    /// of a section that share owner, type, class, and TTL are gathered
    /// into one [`Rrset`], except that a record without RDATA (see
    /// [`Reader::read_rr`]) always stands alone.
    pub fn decode(octets: &[u8]) -> reader::Result<Self> {
        let mut reader = Reader::try_from(octets)?;
        if reader.z() != 0 {
            return Err(reader::Error::ReservedFlagsSet);
        }

        let mut message = Self {
            id: reader.id(),
            qr: reader.qr(),
            opcode: reader.opcode(),
            rcode: reader.rcode(),
            ..Self::new(reader.opcode())
        };
        for _ in 0..reader.qdcount() {
            message.questions.push(reader.read_question()?);
        }
        for (section, count) in Section::RR_SECTIONS
            .into_iter()
            .zip([reader.ancount(), reader.nscount(), reader.arcount()])
        {
            let mut rrsets = Vec::new();
            let mut last_has_rdata = false;
            for _ in 0..count {
                let rr = reader.read_rr()?;
                let has_rdata = rr.rdata.is_some();
                let mut rrset = Rrset::new(rr.owner, rr.rr_type, rr.class, rr.ttl);
                let rdata = rr.rdata.unwrap_or(Cow::Borrowed(Rdata::empty()));
                match rrsets.last_mut() {
                    Some(last) if has_rdata && last_has_rdata && continues(last, &rrset) => {
                        last.push_rdata(&rdata);
                    }
                    _ => {
                        if has_rdata {
                            rrset.push_rdata(&rdata);
                        }
                        rrsets.push(rrset);
                    }
                }
                last_has_rdata = has_rdata;
            }
            if let Some(slot) = message.rrsets_mut(section) {
                *slot = rrsets;
            }
        }

        if !reader.at_eom() {
            return Err(reader::Error::TrailingData {
                offset: reader.cursor(),
            });
        }
        debug!(
            "Decoded message {:#06x} ({}, {} octets)",
            message.id,
            message.opcode,
            octets.len()
        );
        Ok(message)
    }
}

/// Returns whether a record read into `next` belongs to the RRset
/// `last`. TTLs must match too, so that nothing is lost by grouping.
fn continues(last: &Rrset, next: &Rrset) -> bool {
    last.same_rrset_as(next) && last.ttl == next.ttl
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
