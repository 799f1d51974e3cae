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

//! Implementation of [RFC 2136] DNS UPDATE messages.
//!
//! An UPDATE message reuses the four sections of an ordinary DNS
//! message under new names ([RFC 2136 § 2]):
//!
//! | UPDATE section | generic section |
//! |----------------|-----------------|
//! | Zone           | Question        |
//! | Prerequisite   | Answer          |
//! | Update         | Authority       |
//! | Additional     | Additional      |
//!
//! [`UpdateMessage`] wraps a generic [`Message`] under these names and
//! checks the rules that set UPDATE messages apart: exactly one zone,
//! the UPDATE opcode, and a QR flag that matches the direction of
//! travel.
//!
//! [RFC 2136]: https://datatracker.ietf.org/doc/html/rfc2136
//! [RFC 2136 § 2]: https://datatracker.ietf.org/doc/html/rfc2136#section-2

use std::fmt;

use log::debug;

use crate::class::Class;
use crate::message::{Message, Opcode, Question, Rcode, Renderer, Section};
use crate::name::Name;
use crate::rr::{Rrset, Type};

mod error;
pub use error::{Error, Result};

////////////////////////////////////////////////////////////////////////
// SUPPORTING TYPES                                                   //
////////////////////////////////////////////////////////////////////////

/// The direction of a message, as given by its QR flag.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum QrFlag {
    Request,
    Response,
}

impl From<bool> for QrFlag {
    fn from(qr: bool) -> Self {
        if qr {
            Self::Response
        } else {
            Self::Request
        }
    }
}

impl From<QrFlag> for bool {
    fn from(qr_flag: QrFlag) -> Self {
        qr_flag == QrFlag::Response
    }
}

impl fmt::Display for QrFlag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("response"),
        }
    }
}

/// Whether an [`UpdateMessage`] is being built for encoding or is a
/// target for decoding. This is fixed when the message is created.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
    Build,
    Parse,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Build => f.write_str("build"),
            Self::Parse => f.write_str("parse"),
        }
    }
}

/// The sections of an UPDATE message.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UpdateSection {
    Zone,
    Prerequisite,
    Update,
    Additional,
}

impl From<UpdateSection> for Section {
    fn from(section: UpdateSection) -> Self {
        match section {
            UpdateSection::Zone => Self::Question,
            UpdateSection::Prerequisite => Self::Answer,
            UpdateSection::Update => Self::Authority,
            UpdateSection::Additional => Self::Additional,
        }
    }
}

/// The sections of an UPDATE message that hold [`Rrset`]s. The zone
/// is set through [`UpdateMessage::set_zone`] instead.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RrsetSection {
    Prerequisite,
    Update,
    Additional,
}

impl From<RrsetSection> for UpdateSection {
    fn from(section: RrsetSection) -> Self {
        match section {
            RrsetSection::Prerequisite => Self::Prerequisite,
            RrsetSection::Update => Self::Update,
            RrsetSection::Additional => Self::Additional,
        }
    }
}

impl From<RrsetSection> for Section {
    fn from(section: RrsetSection) -> Self {
        UpdateSection::from(section).into()
    }
}

/// The zone of an UPDATE message. On the wire it is a question entry
/// whose type is SOA.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Zone {
    pub name: Box<Name>,
    pub class: Class,
}

impl Zone {
    fn to_question(&self) -> Question {
        Question {
            qname: self.name.clone(),
            qtype: Type::SOA,
            qclass: self.class,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} SOA", self.name, self.class)
    }
}

////////////////////////////////////////////////////////////////////////
// UPDATE MESSAGES                                                    //
////////////////////////////////////////////////////////////////////////

/// An [RFC 2136] UPDATE message.
///
/// A message in [`Mode::Build`] starts empty: set its zone with
/// [`UpdateMessage::set_zone`], append [`Rrset`]s with
/// [`UpdateMessage::add_rrset`], and write it out with
/// [`UpdateMessage::encode`]. Encoded messages are requests.
///
/// A message in [`Mode::Parse`] is filled in by a single call to
/// [`UpdateMessage::decode`], after which its header fields and
/// sections can be read. Decoded messages are responses. Decoding is
/// all or nothing: on failure, the message stays empty.
///
/// `UpdateMessage` does not implement [`Clone`]; an
/// independent copy is made with [`UpdateMessage::deep_copy`].
///
/// [RFC 2136]: https://datatracker.ietf.org/doc/html/rfc2136
#[derive(Debug)]
pub struct UpdateMessage {
    mode: Mode,
    message: Message,
    zone: Option<Zone>,
}

impl UpdateMessage {
    /// Creates an empty UPDATE request with ID zero and RCODE NOERROR.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            message: Message::new(Opcode::Update),
            zone: None,
        }
    }

    /// Returns a random message ID, as [RFC 5452 § 9.2] recommends for
    /// requests.
    ///
    /// [RFC 5452 § 9.2]: https://datatracker.ietf.org/doc/html/rfc5452#section-9.2
    pub fn generate_id() -> u16 {
        rand::random()
    }

    /// Returns the mode the message was created in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the 16-bit ID of the message.
    pub fn id(&self) -> u16 {
        self.message.id
    }

    /// Sets the 16-bit ID of the message.
    pub fn set_id(&mut self, id: u16) {
        self.message.id = id;
    }

    /// Returns the direction given by the QR flag.
    pub fn qr_flag(&self) -> QrFlag {
        self.message.qr.into()
    }

    /// Sets the QR flag.
    pub fn set_qr_flag(&mut self, qr_flag: QrFlag) {
        self.message.qr = qr_flag.into();
    }

    /// Returns the RCODE of the message.
    pub fn rcode(&self) -> Rcode {
        self.message.rcode
    }

    /// Sets the RCODE of the message.
    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.message.rcode = rcode;
    }

    /// Returns the zone of the message, if one is set.
    pub fn zone(&self) -> Option<&Zone> {
        self.zone.as_ref()
    }

    /// Sets the zone of the message, replacing any zone set before.
    pub fn set_zone(&mut self, name: Box<Name>, class: Class) -> Result<()> {
        self.check_mode(Mode::Build)?;
        self.zone = Some(Zone { name, class });
        Ok(())
    }

    /// Appends `rrset` to `section`.
    pub fn add_rrset(&mut self, section: RrsetSection, rrset: Rrset) -> Result<()> {
        self.check_mode(Mode::Build)?;
        if let Some(rrsets) = self.message.rrsets_mut(section.into()) {
            rrsets.push(rrset);
        }
        Ok(())
    }

    /// Returns an iterator over the [`Rrset`]s of `section`, in the
    /// order they were added or decoded.
    pub fn rrsets(&self, section: RrsetSection) -> std::slice::Iter<Rrset> {
        self.message.rrsets(section.into()).iter()
    }

    /// Returns the number of entries `section` takes up on the wire.
    pub fn rr_count(&self, section: UpdateSection) -> usize {
        match section {
            UpdateSection::Zone => usize::from(self.zone.is_some()),
            _ => self.message.count(section.into()),
        }
    }

    /// Encodes the message through `renderer`.
    ///
    /// The message must be in [`Mode::Build`], have a zone, and be a
    /// request; these are checked in that order. The zone is written as
    /// the question entry, followed by the prerequisite, update, and
    /// additional sections.
    pub fn encode(&self, renderer: &mut Renderer) -> Result<()> {
        self.check_mode(Mode::Build)?;
        let zone = match self.zone {
            Some(ref zone) => zone,
            None => {
                debug!("Refusing to encode an UPDATE message without a zone");
                return Err(Error::InvalidZoneSection { count: 0 });
            }
        };
        if self.message.qr {
            debug!("Refusing to encode an UPDATE message with the QR flag set");
            return Err(Error::InvalidQrFlag {
                expected: QrFlag::Request,
            });
        }

        self.message.encode_header(renderer);
        renderer.add_question(&zone.to_question())?;
        self.message.encode_rrsets(renderer)?;
        Ok(())
    }

    /// Decodes an UPDATE response from `octets` into this message,
    /// which must be an empty message in [`Mode::Parse`].
    ///
    /// Validation runs in a fixed order, and the first failure is
    /// returned: the message must decode as a DNS message, then have
    /// the UPDATE opcode, then have exactly one zone, and finally have
    /// the QR flag set.
    pub fn decode(&mut self, octets: &[u8]) -> Result<()> {
        self.check_mode(Mode::Parse)?;
        if self.zone.is_some() {
            return Err(Error::InvalidOperation { mode: self.mode });
        }

        let mut message = Message::decode(octets).map_err(|err| {
            debug!("Failed to decode UPDATE message: {}", err);
            Error::Decode(err)
        })?;
        if message.opcode != Opcode::Update {
            debug!("Decoded message has opcode {}, not UPDATE", message.opcode);
            return Err(Error::NotUpdateMessage {
                opcode: message.opcode,
            });
        }
        let question = match message.questions.len() {
            1 => message.questions.remove(0),
            count => {
                debug!("Decoded UPDATE message has {} zones", count);
                return Err(Error::InvalidZoneSection { count });
            }
        };
        if !message.qr {
            debug!("Decoded UPDATE message has the QR flag clear");
            return Err(Error::InvalidQrFlag {
                expected: QrFlag::Response,
            });
        }

        self.zone = Some(Zone {
            name: question.qname,
            class: question.qclass,
        });
        self.message = message;
        Ok(())
    }

    /// Makes an independent copy of this message, including its mode.
    pub fn deep_copy(&self) -> Self {
        Self {
            mode: self.mode,
            message: self.message.clone(),
            zone: self.zone.clone(),
        }
    }

    /// Fails with [`Error::InvalidOperation`] unless the message is in
    /// `mode`.
    fn check_mode(&self, mode: Mode) -> Result<()> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(Error::InvalidOperation { mode: self.mode })
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::reader;
    use crate::rr::{Rdata, Ttl};
    use lazy_static::lazy_static;

    lazy_static! {
        static ref ZONE: Box<Name> = "example.com.".parse().unwrap();
        static ref FOO: Box<Name> = "foo.example.com.".parse().unwrap();
        static ref BAR: Box<Name> = "bar.example.com.".parse().unwrap();
    }

    /// A response from a server to an update of foo.example.com.'s
    /// AAAA record, refused because foo.example.com. exists.
    const YXDOMAIN_RESPONSE: &[u8] =
        b"\x05\xaf\xa8\x06\x00\x01\x00\x02\x00\x01\x00\x00\
          \x07example\x03com\x00\x00\x06\x00\x01\
          \x03foo\xc0\x0c\x00\x1c\x00\xfe\x00\x00\x00\x00\x00\x00\
          \x03bar\xc0\x0c\x00\x1c\x00\xff\x00\x00\x00\x00\x00\x00\
          \xc0\x1d\x00\x1c\x00\x01\xaa\xbb\xcc\xdd\x00\x10\
          \x20\x01\x0d\xb8\x00\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x01";

    /// The encoding of the request built by `build_request`.
    const REQUEST: &[u8] = b"\x12\x34\x28\x00\x00\x01\x00\x02\x00\x01\x00\x00\
          \x07example\x03com\x00\x00\x06\x00\x01\
          \x03foo\xc0\x0c\x00\xff\x00\xfe\x00\x00\x00\x00\x00\x00\
          \x03bar\xc0\x0c\x00\xff\x00\xff\x00\x00\x00\x00\x00\x00\
          \xc0\x1d\x00\x01\x00\x01\x00\x00\x00\x0a\x00\x04\x0a\x0a\x01\x01";

    fn build_request() -> UpdateMessage {
        let mut message = UpdateMessage::new(Mode::Build);
        message.set_id(0x1234);
        message.set_zone(ZONE.clone(), Class::IN).unwrap();
        message
            .add_rrset(
                RrsetSection::Prerequisite,
                Rrset::new(FOO.clone(), Type::ANY, Class::NONE, Ttl::from(0)),
            )
            .unwrap();
        message
            .add_rrset(
                RrsetSection::Prerequisite,
                Rrset::new(BAR.clone(), Type::ANY, Class::ANY, Ttl::from(0)),
            )
            .unwrap();
        let mut update = Rrset::new(FOO.clone(), Type::A, Class::IN, Ttl::from(10));
        update.push_rdata(b"\x0a\x0a\x01\x01".try_into().unwrap());
        message.add_rrset(RrsetSection::Update, update).unwrap();
        message
    }

    fn encode(message: &UpdateMessage) -> Result<Vec<u8>> {
        let mut buf = vec![0; 512];
        let mut renderer = Renderer::try_from(&mut buf[..])?;
        message.encode(&mut renderer)?;
        let len = renderer.finish();
        buf.truncate(len);
        Ok(buf)
    }

    #[test]
    fn decode_works() {
        let mut message = UpdateMessage::new(Mode::Parse);
        message.decode(YXDOMAIN_RESPONSE).unwrap();
        assert_eq!(message.id(), 0x05af);
        assert_eq!(message.qr_flag(), QrFlag::Response);
        assert_eq!(message.rcode(), Rcode::YxDomain);
        assert_eq!(message.rr_count(UpdateSection::Zone), 1);
        assert_eq!(message.rr_count(UpdateSection::Prerequisite), 2);
        assert_eq!(message.rr_count(UpdateSection::Update), 1);
        assert_eq!(message.rr_count(UpdateSection::Additional), 0);

        let zone = message.zone().unwrap();
        assert_eq!(zone.name, *ZONE);
        assert_eq!(zone.class, Class::IN);
        assert_eq!(zone.to_string(), "example.com. IN SOA");

        let prerequisites: Vec<&Rrset> = message.rrsets(RrsetSection::Prerequisite).collect();
        assert_eq!(prerequisites[0].owner, *FOO);
        assert_eq!(prerequisites[0].rr_type, Type::AAAA);
        assert_eq!(prerequisites[0].class, Class::NONE);
        assert_eq!(prerequisites[0].rdata_count(), 0);
        assert_eq!(prerequisites[1].owner, *BAR);
        assert_eq!(prerequisites[1].class, Class::ANY);

        let update = message.rrsets(RrsetSection::Update).next().unwrap();
        assert_eq!(update.owner, *FOO);
        assert_eq!(update.class, Class::IN);
        assert_eq!(update.ttl, Ttl::from(0xaabbccdd));
        let address: &Rdata = b"\x20\x01\x0d\xb8\x00\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x01"
            .try_into()
            .unwrap();
        assert_eq!(update.rdatas().collect::<Vec<_>>(), vec![address]);
    }

    #[test]
    fn encode_works() {
        let octets = encode(&build_request()).unwrap();
        assert_eq!(octets.len(), 77);
        assert_eq!(octets, REQUEST);
    }

    #[test]
    fn encoded_request_decodes_after_flipping_qr() {
        let message = build_request();
        let mut octets = encode(&message).unwrap();
        octets[2] |= 0x80;
        let mut decoded = UpdateMessage::new(Mode::Parse);
        decoded.decode(&octets).unwrap();
        assert_eq!(decoded.id(), message.id());
        assert_eq!(decoded.rcode(), message.rcode());
        assert_eq!(decoded.zone(), message.zone());
        for section in [
            RrsetSection::Prerequisite,
            RrsetSection::Update,
            RrsetSection::Additional,
        ] {
            assert!(decoded.rrsets(section).eq(message.rrsets(section)));
        }
    }

    #[test]
    fn encode_requires_one_zone() {
        let mut message = UpdateMessage::new(Mode::Build);
        assert_eq!(encode(&message), Err(Error::InvalidZoneSection { count: 0 }));
        message.set_zone(FOO.clone(), Class::IN).unwrap();
        message.set_zone(ZONE.clone(), Class::IN).unwrap();
        assert_eq!(message.rr_count(UpdateSection::Zone), 1);
        assert_eq!(message.zone().unwrap().name, *ZONE);
    }

    #[test]
    fn encode_requires_request() {
        let mut message = build_request();
        message.set_qr_flag(QrFlag::Response);
        assert_eq!(
            encode(&message),
            Err(Error::InvalidQrFlag {
                expected: QrFlag::Request
            })
        );

        // A missing zone is reported first.
        let mut message = UpdateMessage::new(Mode::Build);
        message.set_qr_flag(QrFlag::Response);
        assert_eq!(encode(&message), Err(Error::InvalidZoneSection { count: 0 }));
    }

    #[test]
    fn encode_reports_renderer_errors() {
        let message = build_request();
        let mut buf = [0; 76];
        let mut renderer = Renderer::try_from(&mut buf[..]).unwrap();
        assert_eq!(
            message.encode(&mut renderer),
            Err(Error::Encode(crate::message::renderer::Error::Truncation))
        );
    }

    #[test]
    fn modes_are_enforced() {
        let mut parse = UpdateMessage::new(Mode::Parse);
        let invalid = Err(Error::InvalidOperation { mode: Mode::Parse });
        assert_eq!(parse.set_zone(ZONE.clone(), Class::IN), invalid);
        assert_eq!(
            parse.add_rrset(
                RrsetSection::Update,
                Rrset::new(FOO.clone(), Type::A, Class::ANY, Ttl::from(0)),
            ),
            invalid
        );
        assert_eq!(
            encode(&parse),
            Err(Error::InvalidOperation { mode: Mode::Parse })
        );

        let mut build = build_request();
        assert_eq!(
            build.decode(YXDOMAIN_RESPONSE),
            Err(Error::InvalidOperation { mode: Mode::Build })
        );

        // A parse-mode message can only be filled once.
        parse.decode(YXDOMAIN_RESPONSE).unwrap();
        assert_eq!(parse.decode(YXDOMAIN_RESPONSE), invalid);
    }

    #[test]
    fn decode_checks_in_order() {
        // Opcode QUERY, no zone, QR clear: the opcode is reported.
        let mut header = REQUEST[..12].to_vec();
        header[4..12].fill(0);
        header[2] = 0x00;
        let mut message = UpdateMessage::new(Mode::Parse);
        assert_eq!(
            message.decode(&header),
            Err(Error::NotUpdateMessage {
                opcode: Opcode::Query
            })
        );

        // UPDATE with no zone and QR clear: the zone is reported.
        header[2] = 0x28;
        assert_eq!(
            message.decode(&header),
            Err(Error::InvalidZoneSection { count: 0 })
        );

        // UPDATE with one zone and QR clear.
        assert_eq!(
            message.decode(REQUEST),
            Err(Error::InvalidQrFlag {
                expected: QrFlag::Response
            })
        );

        // A malformed message is reported before anything else.
        assert_eq!(
            message.decode(&REQUEST[..REQUEST.len() - 1]),
            Err(Error::Decode(reader::Error::InvalidRdata(
                crate::rr::ReadRdataError::UnexpectedEom
            )))
        );

        // Nothing was kept from the failures.
        assert!(message.zone().is_none());
        assert_eq!(message.rr_count(UpdateSection::Update), 0);
        message.decode(YXDOMAIN_RESPONSE).unwrap();
    }

    #[test]
    fn decode_rejects_two_zones() {
        let mut octets = YXDOMAIN_RESPONSE[..29].to_vec();
        octets[5] = 2;
        octets[7] = 0;
        octets[9] = 0;
        octets.extend_from_slice(b"\xc0\x0c\x00\x06\x00\x01");
        let mut message = UpdateMessage::new(Mode::Parse);
        assert_eq!(
            message.decode(&octets),
            Err(Error::InvalidZoneSection { count: 2 })
        );
    }

    #[test]
    fn deep_copy_is_independent() {
        let original = build_request();
        let mut copy = original.deep_copy();
        copy.set_id(0x4321);
        copy.add_rrset(
            RrsetSection::Additional,
            Rrset::new(BAR.clone(), Type::A, Class::IN, Ttl::from(0)),
        )
        .unwrap();
        assert_eq!(original.id(), 0x1234);
        assert_eq!(original.rr_count(UpdateSection::Additional), 0);
        assert_eq!(copy.rr_count(UpdateSection::Additional), 1);
        assert_eq!(copy.mode(), Mode::Build);
        assert_eq!(encode(&original).unwrap(), REQUEST);
    }
}
