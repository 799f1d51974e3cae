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

//! Implementation of the [`Reader`] type to read on-the-wire DNS
//! messages.

use std::borrow::Cow;
use std::fmt;

use super::constants::*;
use super::{Opcode, Question, Rcode};
use crate::class::Class;
use crate::name::{self, Name};
use crate::rr::rdata::{Rdata, ReadRdataError};
use crate::rr::{Ttl, Type};

////////////////////////////////////////////////////////////////////////
// READER                                                             //
////////////////////////////////////////////////////////////////////////

/// A "frame" around a buffer containing a DNS message that enables
/// reading the message data.
///
/// A `Reader` is constructed using its [`TryFrom`] implementation. Any
/// underlying buffer for a reader must contain at least a full DNS
/// message header of 12 octets; otherwise the construction will fail.
///
/// Since header information is in a fixed position, it can be read
/// at any time through the appropriate `Reader` methods. For reading
/// questions and RRs, the [`Reader::read_question`] and
/// [`Reader::read_rr`] methods are provided. These read using a cursor,
/// which is initially set to the first octet after the DNS header. They
/// must be called sequentially to read any questions, and then any
/// records, in the order they appear in the message.
#[derive(Eq, PartialEq)]
pub struct Reader<'a> {
    octets: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    /// Reads the header field of two octets at `start`.
    fn header_u16(&self, start: usize) -> u16 {
        u16::from_be_bytes([self.octets[start], self.octets[start + 1]])
    }

    /// Returns the 16-bit ID of the message.
    pub fn id(&self) -> u16 {
        self.header_u16(ID_START)
    }

    /// Returns whether the QR (query response) bit is set.
    pub fn qr(&self) -> bool {
        (self.octets[QR_BYTE] & QR_MASK) != 0
    }

    /// Returns the message's opcode.
    pub fn opcode(&self) -> Opcode {
        Opcode::from_bits((self.octets[OPCODE_BYTE] & OPCODE_MASK) >> OPCODE_SHIFT)
    }

    /// Returns the seven bits between the opcode and the RCODE. These
    /// make up the reserved Z field of an UPDATE message, and in other
    /// messages hold AA, TC, RD, RA, and the rest.
    pub fn z(&self) -> u8 {
        (self.octets[Z_HIGH_BYTE] & Z_HIGH_MASK) << 4
            | (self.octets[Z_LOW_BYTE] & Z_LOW_MASK) >> 4
    }

    /// Returns the RCODE of the message.
    pub fn rcode(&self) -> Rcode {
        Rcode::from_bits(self.octets[RCODE_BYTE] & RCODE_MASK)
    }

    /// Returns the number of questions in the message.
    pub fn qdcount(&self) -> u16 {
        self.header_u16(QDCOUNT_START)
    }

    /// Returns the number of answers in the message.
    pub fn ancount(&self) -> u16 {
        self.header_u16(ANCOUNT_START)
    }

    /// Returns the number of authority records in the message.
    pub fn nscount(&self) -> u16 {
        self.header_u16(NSCOUNT_START)
    }

    /// Returns the number of additional records in the message.
    pub fn arcount(&self) -> u16 {
        self.header_u16(ARCOUNT_START)
    }

    /// Reads a [`Question`] starting at the current cursor.
    ///
    /// This method is atomic, in that the cursor is not changed on
    /// failure.
    pub fn read_question(&mut self) -> Result<Question> {
        let (qname, qname_len) =
            Name::try_from_compressed(self.octets, self.cursor).map_err(Error::InvalidOwner)?;
        let qname_end = self.cursor + qname_len;
        let qtype = read_u16(self.octets, qname_end)?.into();
        let qclass = read_u16(self.octets, qname_end + 2)?.into();
        self.cursor = qname_end + 4;
        Ok(Question {
            qname,
            qtype,
            qclass,
        })
    }

    /// Reads a resource record at the current cursor.
    ///
    /// A record of class NONE or ANY with an RDLENGTH of zero carries
    /// no RDATA at all ([RFC 2136 § 2.4]), and its
    /// [`ReadRr::rdata`] is `None`. Otherwise the RDATA is read with
    /// [`Rdata::read`], so names embedded in it are decompressed.
    ///
    /// This method is atomic, in that the cursor is not changed on
    /// failure.
    ///
    /// [RFC 2136 § 2.4]: https://datatracker.ietf.org/doc/html/rfc2136#section-2.4
    pub fn read_rr(&mut self) -> Result<ReadRr<'a>> {
        let (owner, owner_len) =
            Name::try_from_compressed(self.octets, self.cursor).map_err(Error::InvalidOwner)?;
        let owner_end = self.cursor + owner_len;
        let rr_type = read_u16(self.octets, owner_end)?.into();
        let class: Class = read_u16(self.octets, owner_end + 2)?.into();
        let ttl = read_u32(self.octets, owner_end + 4)?.into();
        let rdlength = read_u16(self.octets, owner_end + 8)?;
        let rdata_start = owner_end + 10;
        let rdata = if rdlength == 0 && class.is_meta() {
            None
        } else {
            Some(Rdata::read(class, rr_type, self.octets, rdata_start, rdlength)?)
        };
        self.cursor = rdata_start + rdlength as usize;
        Ok(ReadRr {
            owner,
            rr_type,
            class,
            ttl,
            rdata,
        })
    }

    /// Returns the index of the next octet to be read.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns whether the `Reader`'s cursor has reached the end of the
    /// message.
    pub fn at_eom(&self) -> bool {
        self.cursor >= self.octets.len()
    }
}

impl<'a> TryFrom<&'a [u8]> for Reader<'a> {
    type Error = Error;

    fn try_from(octets: &'a [u8]) -> Result<Self> {
        if octets.len() >= HEADER_SIZE {
            Ok(Self {
                octets,
                cursor: HEADER_SIZE,
            })
        } else {
            Err(Error::HeaderTooShort)
        }
    }
}

impl fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Reader")
            .field("id", &self.id())
            .field("qr", &self.qr())
            .field("opcode", &self.opcode())
            .field("z", &self.z())
            .field("rcode", &self.rcode())
            .field("qdcount", &self.qdcount())
            .field("ancount", &self.ancount())
            .field("nscount", &self.nscount())
            .field("arcount", &self.arcount())
            .field("cursor", &self.cursor)
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// HELPERS FOR READING MULTI-BYTE INTEGERS                            //
////////////////////////////////////////////////////////////////////////

/// Reads a network-byte-order `u16` at `octets[index]`.
fn read_u16(octets: &[u8], index: usize) -> Result<u16> {
    match octets.get(index..index + 2) {
        Some(&[a, b]) => Ok(u16::from_be_bytes([a, b])),
        _ => Err(Error::UnexpectedEomInField),
    }
}

/// Reads a network-byte-order `u32` at `octets[index]`.
fn read_u32(octets: &[u8], index: usize) -> Result<u32> {
    match octets.get(index..index + 4) {
        Some(&[a, b, c, d]) => Ok(u32::from_be_bytes([a, b, c, d])),
        _ => Err(Error::UnexpectedEomInField),
    }
}

////////////////////////////////////////////////////////////////////////
// READ RR STRUCTURE                                                  //
////////////////////////////////////////////////////////////////////////

/// A structure containing RR data as returned by [`Reader::read_rr`].
///
/// It is defined *here*, instead of the [`rr`](crate::rr) module,
/// because the rest of the crate deals with records grouped into
/// [`Rrset`](crate::rr::Rrset)s, and so that this type can borrow its
/// RDATA from the message when no decompression was needed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReadRr<'a> {
    pub owner: Box<Name>,
    pub rr_type: Type,
    pub class: Class,
    pub ttl: Ttl,
    pub rdata: Option<Cow<'a, Rdata>>,
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a DNS message could not be read.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    HeaderTooShort,
    ReservedFlagsSet,
    UnexpectedEomInField,
    InvalidOwner(name::Error),
    InvalidRdata(ReadRdataError),
    TrailingData { offset: usize },
}

impl From<ReadRdataError> for Error {
    fn from(err: ReadRdataError) -> Self {
        Self::InvalidRdata(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::HeaderTooShort => f.write_str("header too short"),
            Self::ReservedFlagsSet => f.write_str("reserved header flags are set"),
            Self::UnexpectedEomInField => f.write_str("unexpected end of message in field"),
            Self::InvalidOwner(err) => write!(f, "invalid owner: {}", err),
            Self::InvalidRdata(err) => err.fmt(f),
            Self::TrailingData { offset } => {
                write!(f, "trailing data after the last record at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for Error {}

/// The type returned by fallible [`Reader`] methods.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    /// An UPDATE response with a zone, two prerequisites, and an
    /// update, whose owners are compressed against the zone name.
    const UPDATE_RESPONSE: &[u8] =
        b"\x05\xaf\xa8\x06\x00\x01\x00\x02\x00\x01\x00\x00\
          \x07example\x03com\x00\x00\x06\x00\x01\
          \x03foo\xc0\x0c\x00\x1c\x00\xfe\x00\x00\x00\x00\x00\x00\
          \x03bar\xc0\x0c\x00\x1c\x00\xff\x00\x00\x00\x00\x00\x00\
          \xc0\x1d\x00\x1c\x00\x01\xaa\xbb\xcc\xdd\x00\x10\
          \x20\x01\x0d\xb8\x00\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x01";

    #[test]
    fn reader_works() {
        let mut reader = Reader::try_from(UPDATE_RESPONSE).unwrap();
        let zone: Box<Name> = "example.com.".parse().unwrap();
        let foo: Box<Name> = "foo.example.com.".parse().unwrap();

        // Check the header.
        assert_eq!(reader.id(), 0x05af);
        assert!(reader.qr());
        assert_eq!(reader.opcode(), Opcode::Update);
        assert_eq!(reader.z(), 0);
        assert_eq!(reader.rcode(), Rcode::YxDomain);
        assert_eq!(reader.qdcount(), 1);
        assert_eq!(reader.ancount(), 2);
        assert_eq!(reader.nscount(), 1);
        assert_eq!(reader.arcount(), 0);

        // Check the zone.
        let question = reader.read_question().unwrap();
        assert_eq!(question.qname, zone);
        assert_eq!(question.qtype, Type::SOA);
        assert_eq!(question.qclass, Class::IN);

        // Check the prerequisites, which carry no RDATA.
        let first = reader.read_rr().unwrap();
        assert_eq!(first.owner, foo);
        assert_eq!(first.rr_type, Type::AAAA);
        assert_eq!(first.class, Class::NONE);
        assert_eq!(first.ttl, Ttl::from(0));
        assert!(first.rdata.is_none());
        let second = reader.read_rr().unwrap();
        assert_eq!(second.owner, "bar.example.com.".parse().unwrap());
        assert_eq!(second.class, Class::ANY);
        assert!(second.rdata.is_none());

        // Check the update, whose owner points at foo.
        let update = reader.read_rr().unwrap();
        assert_eq!(update.owner, foo);
        assert_eq!(update.class, Class::IN);
        assert_eq!(update.ttl, Ttl::from(0xaabbccdd));
        let rdata = update.rdata.unwrap();
        assert!(matches!(rdata, Cow::Borrowed(_)));
        assert_eq!(rdata.len(), 16);

        // And that should be it!
        assert!(reader.at_eom());
        assert_eq!(reader.cursor(), UPDATE_RESPONSE.len());
    }

    #[test]
    fn reader_constructor_rejects_short_message() {
        for size in 0..HEADER_SIZE {
            let buf = vec![0; size];
            assert_eq!(Reader::try_from(buf.as_slice()), Err(Error::HeaderTooShort));
        }
    }

    #[test]
    fn z_collects_reserved_bits() {
        let mut header = [0; HEADER_SIZE];
        header[2] = 0x28 | 0x04;
        header[3] = 0x80;
        let reader = Reader::try_from(&header[..]).unwrap();
        assert_eq!(reader.opcode(), Opcode::Update);
        assert_eq!(reader.z(), 0b100_1000);
    }

    #[test]
    fn read_rr_is_atomic_on_truncation() {
        for len in HEADER_SIZE + 18..UPDATE_RESPONSE.len() {
            let mut reader = Reader::try_from(&UPDATE_RESPONSE[..len]).unwrap();
            reader.read_question().unwrap();
            let mut error = None;
            while error.is_none() && !reader.at_eom() {
                let before = reader.cursor();
                if let Err(err) = reader.read_rr() {
                    assert_eq!(reader.cursor(), before);
                    error = Some(err);
                }
            }
            assert!(matches!(
                error,
                None | Some(Error::UnexpectedEomInField)
                    | Some(Error::InvalidOwner(name::Error::UnexpectedEom))
                    | Some(Error::InvalidRdata(ReadRdataError::UnexpectedEom))
            ));
        }
    }
}
