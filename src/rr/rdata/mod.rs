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

//! Implementation of the [`Rdata`] type and DNS RDATA processing.
//!
//! Most RDATA is opaque to a DNS Update codec. The exceptions are the
//! RR types defined by [RFC 1035], whose embedded domain names may be
//! compressed in messages ([RFC 3597 § 4]), and the address types,
//! whose lengths are fixed. Each type this module knows about is
//! described by a [`Layout`]; reading, validation, and iteration over
//! [`Component`]s all work from that description.
//!
//! [RFC 1035]: https://datatracker.ietf.org/doc/html/rfc1035
//! [RFC 3597 § 4]: https://datatracker.ietf.org/doc/html/rfc3597#section-4

use std::borrow::Cow;
use std::fmt::{self, Write};
use std::str::FromStr;

use super::Type;
use crate::class::Class;
use crate::name::{self, Name};
use crate::util::{ascii_hex_digit_to_nibble, nibble_to_ascii_hex_digit};

// Implementations of RR types.
pub mod ipv6;
pub mod srv;
pub mod std13;

////////////////////////////////////////////////////////////////////////
// RDATA TYPE                                                         //
////////////////////////////////////////////////////////////////////////

/// A type for record RDATA.
///
/// The RDATA of a record is limited to 65,535 octets. The `Rdata` type
/// is a wrapper over `[u8]` that can only be constructed if the
/// underlying data has a valid length. Embedded domain names are always
/// stored uncompressed.
#[derive(Eq, Hash, PartialEq)]
#[repr(transparent)]
pub struct Rdata {
    octets: [u8],
}

impl Rdata {
    /// Converts a `&[u8]` to a `&Rdata`, without checking the length;
    /// for use within the `rr` module only.
    pub(in crate::rr) fn from_unchecked(octets: &[u8]) -> &Self {
        unsafe { &*(octets as *const [u8] as *const Self) }
    }

    /// Returns an empty `&Rdata`.
    pub fn empty() -> &'static Self {
        Self::from_unchecked(&[])
    }

    /// Reads RDATA of type `rr_type` in class `class` and of length
    /// `rdlength`, starting at `message[cursor]`.
    ///
    /// `message` should be the whole DNS message, so that compression
    /// pointers in embedded names can be followed. For the types whose
    /// names may be compressed, the names are decompressed into a newly
    /// allocated buffer. For other known types the RDATA is validated,
    /// and for unknown types it is taken as is; either way, a reference
    /// into `message` is returned.
    ///
    /// This fails with [`ReadRdataError::UnexpectedEom`] if `message`
    /// ends before `cursor + rdlength`, so `rdlength` need not be
    /// checked first.
    pub fn read(
        class: Class,
        rr_type: Type,
        message: &[u8],
        cursor: usize,
        rdlength: u16,
    ) -> Result<Cow<Self>, ReadRdataError> {
        let end = cursor + rdlength as usize;
        let message = message.get(..end).ok_or(ReadRdataError::UnexpectedEom)?;
        let octets = message.get(cursor..).ok_or(ReadRdataError::UnexpectedEom)?;

        match Layout::of(class, rr_type) {
            Layout::Opaque => Ok(Cow::Borrowed(Self::from_unchecked(octets))),
            Layout::FixedLen(len) if octets.len() == len => {
                Ok(Cow::Borrowed(Self::from_unchecked(octets)))
            }
            Layout::FixedLen(_) => Err(ReadRdataError::Other),
            Layout::Fields(fields) => {
                let mut rdata = Vec::with_capacity(octets.len());
                let mut index = cursor;
                for field in fields {
                    match *field {
                        ComponentType::CompressibleName | ComponentType::UncompressibleName => {
                            let (name, len) = Name::try_from_compressed(message, index)?;
                            rdata.extend_from_slice(name.wire_repr());
                            index += len;
                        }
                        ComponentType::FixedLen(len) => {
                            let fixed = message
                                .get(index..index + len)
                                .ok_or(ReadRdataError::Other)?;
                            rdata.extend_from_slice(fixed);
                            index += len;
                        }
                    }
                }
                if index != end {
                    Err(ReadRdataError::Other)
                } else {
                    Box::<Self>::try_from(rdata)
                        .map(Cow::Owned)
                        .or(Err(ReadRdataError::Other))
                }
            }
        }
    }

    /// Validates this `Rdata`, assuming that it is of type `rr_type` in
    /// class `class`. If the class/type combination is unknown, this is
    /// a successful no-op.
    pub fn validate(&self, class: Class, rr_type: Type) -> Result<(), ReadRdataError> {
        match Layout::of(class, rr_type) {
            Layout::Opaque => Ok(()),
            Layout::FixedLen(len) if self.len() == len => Ok(()),
            Layout::FixedLen(_) => Err(ReadRdataError::Other),
            Layout::Fields(fields) => {
                let mut n_components = 0;
                for component in self.components(class, rr_type) {
                    component?;
                    n_components += 1;
                }
                if n_components > fields.len() {
                    // Octets were left over after the last field.
                    Err(ReadRdataError::Other)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Returns an iterator over this `Rdata`'s [`Component`]s, assuming
    /// that it is of type `rr_type` in class `class`.
    pub fn components(&self, class: Class, rr_type: Type) -> Components {
        let types = match Layout::of(class, rr_type) {
            Layout::Fields(fields) => fields,
            _ => &[],
        };
        Components {
            types,
            rdata: &self.octets,
        }
    }

    /// Returns whether the `Rdata` is empty.
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns the length of the `Rdata`.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns the underlying octet slice.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }
}

impl<'a> TryFrom<&'a [u8]> for &'a Rdata {
    type Error = RdataTooLongError;

    fn try_from(octets: &'a [u8]) -> Result<Self, Self::Error> {
        if octets.len() > (u16::MAX as usize) {
            Err(RdataTooLongError)
        } else {
            Ok(Rdata::from_unchecked(octets))
        }
    }
}

impl<'a, const N: usize> TryFrom<&'a [u8; N]> for &'a Rdata {
    type Error = RdataTooLongError;

    fn try_from(octets: &'a [u8; N]) -> Result<Self, Self::Error> {
        octets[..].try_into()
    }
}

impl AsRef<[u8]> for Rdata {
    fn as_ref(&self) -> &[u8] {
        &self.octets
    }
}

impl ToOwned for Rdata {
    type Owned = Box<Self>;

    fn to_owned(&self) -> Self::Owned {
        let boxed_octets: Box<[u8]> = self.octets.into();
        // SAFETY: Rdata is a repr(transparent) wrapper over [u8].
        unsafe { Box::from_raw(Box::into_raw(boxed_octets) as *mut Rdata) }
    }
}

impl Clone for Box<Rdata> {
    fn clone(&self) -> Self {
        (**self).to_owned()
    }
}

impl TryFrom<Vec<u8>> for Box<Rdata> {
    type Error = RdataTooLongError;

    fn try_from(vec: Vec<u8>) -> Result<Self, Self::Error> {
        if vec.len() > (u16::MAX as usize) {
            Err(RdataTooLongError)
        } else {
            let boxed_octets: Box<[u8]> = vec.into_boxed_slice();
            // SAFETY: as in ToOwned above.
            unsafe { Ok(Box::from_raw(Box::into_raw(boxed_octets) as *mut Rdata)) }
        }
    }
}

/// `Rdata` is displayed in the generic form of [RFC 3597 § 5], which
/// works whatever the type: `\#`, the length in decimal, and the data
/// in hex.
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
impl fmt::Display for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\\# {}", self.len())?;
        if !self.is_empty() {
            f.write_char(' ')?;
            for octet in self.octets.iter() {
                f.write_char(char::from(nibble_to_ascii_hex_digit(octet >> 4)))?;
                f.write_char(char::from(nibble_to_ascii_hex_digit(octet & 0xf)))?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

/// Parses the generic form of [RFC 3597 § 5], the inverse of the
/// `Display` implementation. The hex data may be split by whitespace.
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
impl FromStr for Box<Rdata> {
    type Err = ParseRdataError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut tokens = text.split_ascii_whitespace();
        if tokens.next() != Some("\\#") {
            return Err(ParseRdataError::NotGeneric);
        }
        let len: usize = tokens
            .next()
            .and_then(|len| len.parse().ok())
            .ok_or(ParseRdataError::InvalidLength)?;

        let mut octets = Vec::with_capacity(len);
        let mut high_nibble = None;
        for digit in tokens.flat_map(str::bytes) {
            let nibble = ascii_hex_digit_to_nibble(digit).ok_or(ParseRdataError::InvalidHex)?;
            match high_nibble.take() {
                Some(high) => octets.push(high << 4 | nibble),
                None => high_nibble = Some(nibble),
            }
        }

        if high_nibble.is_some() {
            Err(ParseRdataError::InvalidHex)
        } else if octets.len() != len {
            Err(ParseRdataError::LengthMismatch)
        } else {
            octets.try_into().or(Err(ParseRdataError::TooLong))
        }
    }
}

////////////////////////////////////////////////////////////////////////
// LAYOUTS AND COMPONENTS                                             //
////////////////////////////////////////////////////////////////////////

/// How the RDATA of a particular class and type is structured.
enum Layout {
    /// Nothing is known; the RDATA is taken as is.
    Opaque,

    /// The RDATA must be exactly this long.
    FixedLen(usize),

    /// The RDATA is made of exactly these fields, in order.
    Fields(&'static [ComponentType]),
}

impl Layout {
    fn of(class: Class, rr_type: Type) -> Self {
        // Class NONE records delete single RRs and carry RDATA in the
        // zone's format ([RFC 2136 § 2.5.4]), which is read as IN.
        //
        // [RFC 2136 § 2.5.4]: https://datatracker.ietf.org/doc/html/rfc2136#section-2.5.4
        let internet = class == Class::IN || class == Class::NONE;
        match rr_type {
            Type::NS
            | Type::MD
            | Type::MF
            | Type::CNAME
            | Type::MB
            | Type::MG
            | Type::MR
            | Type::PTR => Self::Fields(std13::NAME_LAYOUT),
            Type::A if internet => Self::FixedLen(std13::IN_A_LEN),
            Type::SOA => Self::Fields(std13::SOA_LAYOUT),
            Type::MINFO => Self::Fields(std13::MINFO_LAYOUT),
            Type::MX => Self::Fields(std13::MX_LAYOUT),
            Type::AAAA if internet => Self::FixedLen(ipv6::IN_AAAA_LEN),
            Type::SRV if internet => Self::Fields(srv::IN_SRV_LAYOUT),
            _ => Self::Opaque,
        }
    }
}

/// A component of an [`Rdata`] classified for DNS compression.
///
/// For DNS compression, it is useful to break RDATA into three types of
/// components:
///
/// 1. embedded domain names that may be compressed per [RFC 3597 § 4],
/// 2. embedded domain names that may *not* be compressed, and
/// 3. all other data.
///
/// The [`Components`] iterator, produced by [`Rdata::components`],
/// yields the [`Component`]s of an [`Rdata`].
///
/// [RFC 3597 § 4]: https://datatracker.ietf.org/doc/html/rfc3597#section-4
#[derive(Debug)]
pub enum Component<'a> {
    CompressibleName(Box<Name>),
    UncompressibleName(Box<Name>),
    Other(&'a [u8]),
}

/// Specifies how to parse the next [`Component`] of an [`Rdata`].
#[derive(Copy, Clone, Debug)]
enum ComponentType {
    CompressibleName,
    UncompressibleName,
    FixedLen(usize),
}

/// An iterator over the [`Component`]s of an [`Rdata`]. See
/// [`Rdata::components`]. Octets left over after the known fields, or
/// all of the octets for an opaque type, are yielded as a final
/// [`Component::Other`].
pub struct Components<'a> {
    types: &'static [ComponentType],
    rdata: &'a [u8],
}

impl<'a> Iterator for Components<'a> {
    type Item = Result<Component<'a>, ReadRdataError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((next_type, remaining_types)) = self.types.split_first() {
            let parsed = match *next_type {
                ComponentType::CompressibleName => Name::try_from_uncompressed(self.rdata)
                    .map(|(name, len)| (Component::CompressibleName(name), len))
                    .map_err(ReadRdataError::from),
                ComponentType::UncompressibleName => Name::try_from_uncompressed(self.rdata)
                    .map(|(name, len)| (Component::UncompressibleName(name), len))
                    .map_err(ReadRdataError::from),
                ComponentType::FixedLen(len) => self
                    .rdata
                    .get(..len)
                    .map(|fixed| (Component::Other(fixed), len))
                    .ok_or(ReadRdataError::UnexpectedEom),
            };
            match parsed {
                Ok((component, len)) => {
                    self.types = remaining_types;
                    self.rdata = &self.rdata[len..];
                    Some(Ok(component))
                }
                Err(err) => {
                    // Nothing sensible follows a malformed field.
                    self.types = &[];
                    self.rdata = &[];
                    Some(Err(err))
                }
            }
        } else if self.rdata.is_empty() {
            None
        } else {
            let component = Component::Other(self.rdata);
            self.rdata = &[];
            Some(Ok(component))
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a `&[u8]` cannot be converted to an `&Rdata`
/// because it is too long.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct RdataTooLongError;

impl fmt::Display for RdataTooLongError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("RDATA is too long")
    }
}

impl std::error::Error for RdataTooLongError {}

/// An error signaling that RDATA could not be
/// read/decompressed/validated.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ReadRdataError {
    InvalidName(name::Error),
    UnexpectedEom,
    Other,
}

impl fmt::Display for ReadRdataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "invalid embedded domain name: {}", err),
            Self::UnexpectedEom => f.write_str("unexpected end of message in RDATA"),
            Self::Other => f.write_str("invalid RDATA"),
        }
    }
}

impl std::error::Error for ReadRdataError {}

impl From<name::Error> for ReadRdataError {
    fn from(err: name::Error) -> Self {
        Self::InvalidName(err)
    }
}

/// An error signaling that the generic text form of RDATA could not be
/// parsed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParseRdataError {
    /// The text did not start with `\#`.
    NotGeneric,

    /// The length was missing or not a decimal integer.
    InvalidLength,

    /// The data was not an even number of hex digits.
    InvalidHex,

    /// The data did not have the stated length.
    LengthMismatch,

    /// The data was longer than 65,535 octets.
    TooLong,
}

impl fmt::Display for ParseRdataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotGeneric => f.write_str("RDATA is not in the generic \\# form"),
            Self::InvalidLength => f.write_str("invalid RDATA length"),
            Self::InvalidHex => f.write_str("invalid hex in RDATA"),
            Self::LengthMismatch => f.write_str("RDATA does not match its stated length"),
            Self::TooLong => f.write_str("RDATA is too long"),
        }
    }
}

impl std::error::Error for ParseRdataError {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rdata_constructor_checks_length() {
        let quite_short = &[0, 1, 2, 3];
        let quite_short_rdata: &Rdata = quite_short.try_into().unwrap();
        assert_eq!(quite_short_rdata.octets(), quite_short);

        let almost_too_long = [0; u16::MAX as usize];
        assert!(<&Rdata>::try_from(&almost_too_long[..]).is_ok());
        let too_long = vec![0; u16::MAX as usize + 1];
        assert_eq!(<&Rdata>::try_from(&too_long[..]), Err(RdataTooLongError));
    }

    #[test]
    fn read_checks_if_message_is_long_enough() {
        let too_short = [0; 4];
        for rr_type in [Type::A, Type::NS, Type::SOA, Type::MX, Type::AAAA, Type::DHCID] {
            assert_eq!(
                Rdata::read(Class::IN, rr_type, &too_short, 2, 4),
                Err(ReadRdataError::UnexpectedEom),
            );
        }
    }

    #[test]
    fn read_checks_class_none_rdata_like_in() {
        let message = b"junk\x01\x02\x03";
        assert_eq!(
            Rdata::read(Class::NONE, Type::A, message, 4, 3),
            Err(ReadRdataError::Other)
        );
        assert!(Rdata::read(Class::CH, Type::A, message, 4, 3).is_ok());
    }

    #[test]
    fn read_borrows_opaque_rdata() {
        let message = b"junk\x01\x02\x03";
        let rdata = Rdata::read(Class::IN, Type::DHCID, message, 4, 3).unwrap();
        assert!(matches!(rdata, Cow::Borrowed(_)));
        assert_eq!(rdata.octets(), b"\x01\x02\x03");
    }

    #[test]
    fn read_decompresses_names() {
        // example.com. at 0, then NS RDATA ns1.<pointer to 0>.
        let message = b"\x07example\x03com\x00\x03ns1\xc0\x00";
        let rdata = Rdata::read(Class::IN, Type::NS, message, 13, 6).unwrap();
        assert!(matches!(rdata, Cow::Owned(_)));
        assert_eq!(rdata.octets(), b"\x03ns1\x07example\x03com\x00");
    }

    #[test]
    fn read_rejects_names_running_past_rdlength() {
        let message = b"\x03ns1\x07example\x03com\x00";
        assert_eq!(
            Rdata::read(Class::IN, Type::CNAME, message, 0, 4),
            Err(ReadRdataError::InvalidName(name::Error::UnexpectedEom)),
        );
        assert_eq!(
            Rdata::read(Class::IN, Type::CNAME, b"\x03ns1\x00\x00", 0, 6),
            Err(ReadRdataError::Other),
        );
    }

    #[test]
    fn validate_checks_layouts() {
        let a: &Rdata = b"\x0a\x0a\x01\x01".try_into().unwrap();
        assert_eq!(a.validate(Class::IN, Type::A), Ok(()));
        assert_eq!(a.validate(Class::IN, Type::AAAA), Err(ReadRdataError::Other));
        assert_eq!(a.validate(Class::CH, Type::AAAA), Ok(()));
        assert_eq!(a.validate(Class::NONE, Type::A), Ok(()));
        assert_eq!(a.validate(Class::NONE, Type::AAAA), Err(ReadRdataError::Other));
        assert_eq!(Rdata::empty().validate(Class::IN, Type::A), Err(ReadRdataError::Other));

        let name: &Rdata = b"\x07example\x03com\x00".try_into().unwrap();
        assert_eq!(name.validate(Class::IN, Type::PTR), Ok(()));
        let name_and_junk: &Rdata = b"\x07example\x03com\x00junk".try_into().unwrap();
        assert_eq!(
            name_and_junk.validate(Class::IN, Type::PTR),
            Err(ReadRdataError::Other)
        );
        let bad_name: &Rdata = b"\x07example\x03com".try_into().unwrap();
        assert_eq!(
            bad_name.validate(Class::IN, Type::PTR),
            Err(ReadRdataError::InvalidName(name::Error::UnexpectedEom))
        );
    }

    #[test]
    fn components_split_names_from_other_data() {
        let mx: &Rdata = b"\x00\x0a\x04mail\x07example\x03com\x00".try_into().unwrap();
        let components: Vec<Component> = mx
            .components(Class::IN, Type::MX)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(components.len(), 2);
        assert!(matches!(components[0], Component::Other(b"\x00\x0a")));
        assert!(matches!(
            &components[1],
            Component::CompressibleName(name) if name.to_string() == "mail.example.com."
        ));

        let opaque: Vec<Component> = mx
            .components(Class::IN, Type::DHCID)
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(matches!(opaque[..], [Component::Other(_)]));
    }

    #[test]
    fn generic_text_form_works() {
        let rdata: &Rdata = b"\x0a\x0a\x01\x01".try_into().unwrap();
        assert_eq!(rdata.to_string(), "\\# 4 0a0a0101");
        assert_eq!(Rdata::empty().to_string(), "\\# 0");

        let parsed: Box<Rdata> = "\\# 4 0A0a 0101".parse().unwrap();
        assert_eq!(&*parsed, rdata);
        let parsed: Box<Rdata> = "\\# 0".parse().unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn generic_text_form_rejects_bad_input() {
        for (text, error) in [
            ("4 0a0a0101", ParseRdataError::NotGeneric),
            ("\\# four", ParseRdataError::InvalidLength),
            ("\\# 2 0g0a", ParseRdataError::InvalidHex),
            ("\\# 2 0a0", ParseRdataError::InvalidHex),
            ("\\# 3 0a0a", ParseRdataError::LengthMismatch),
        ] {
            assert_eq!(text.parse::<Box<Rdata>>(), Err(error));
        }
    }
}
