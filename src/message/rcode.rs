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

//! Implementation of the [`Rcode`] type.

use std::fmt;

////////////////////////////////////////////////////////////////////////
// RCODES                                                             //
////////////////////////////////////////////////////////////////////////

/// The RCODE value of the DNS message header.
///
/// [RFC 1035 § 4.1.1] defines the RCODE field as a four-bit field
/// indicating success or failure in a DNS response. The first six
/// values are original to RFC 1035, and [RFC 2136 § 2.2] adds the next
/// five for UPDATE responses. The names given to each member of the
/// `Rcode` enumeration are those listed by the IANA.
///
/// [RFC 1035 § 4.1.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
/// [RFC 2136 § 2.2]: https://datatracker.ietf.org/doc/html/rfc2136#section-2.2
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Rcode {
    NoError,
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
    YxDomain,
    YxRrset,
    NxRrset,
    NotAuth,
    NotZone,
    DsoTypeNi,
    Unassigned(u8),
}

impl Rcode {
    /// Every assigned RCODE in wire order, with its IANA mnemonic.
    const MNEMONICS: [(Self, &'static str); 12] = [
        (Self::NoError, "NOERROR"),
        (Self::FormErr, "FORMERR"),
        (Self::ServFail, "SERVFAIL"),
        (Self::NxDomain, "NXDOMAIN"),
        (Self::NotImp, "NOTIMP"),
        (Self::Refused, "REFUSED"),
        (Self::YxDomain, "YXDOMAIN"),
        (Self::YxRrset, "YXRRSET"),
        (Self::NxRrset, "NXRRSET"),
        (Self::NotAuth, "NOTAUTH"),
        (Self::NotZone, "NOTZONE"),
        (Self::DsoTypeNi, "DSOTYPENI"),
    ];

    /// Converts the low four bits of `bits` into an `Rcode`. Higher
    /// bits are ignored, so this never fails.
    pub fn from_bits(bits: u8) -> Self {
        let value = bits & 0xf;
        Self::MNEMONICS
            .get(value as usize)
            .map_or(Self::Unassigned(value), |(rcode, _)| *rcode)
    }
}

impl TryFrom<u8> for Rcode {
    type Error = IntoRcodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 0xf {
            Err(IntoRcodeError)
        } else {
            Ok(Self::from_bits(value))
        }
    }
}

impl From<Rcode> for u8 {
    fn from(value: Rcode) -> Self {
        match value {
            Rcode::Unassigned(v) => v,
            _ => Rcode::MNEMONICS
                .iter()
                .position(|(rcode, _)| *rcode == value)
                .map_or(0, |index| index as u8),
        }
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match Self::MNEMONICS.iter().find(|(rcode, _)| rcode == self) {
            Some((_, mnemonic)) => f.write_str(mnemonic),
            None => write!(f, "RCODE{}", u8::from(*self)),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that the provided value does not fit in the
/// four-bit RCODE field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IntoRcodeError;

impl fmt::Display for IntoRcodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("not a valid RCODE")
    }
}

impl std::error::Error for IntoRcodeError {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rcode_conversions_work() {
        for value in 0..=15 {
            assert_eq!(u8::from(Rcode::from_bits(value)), value);
        }
        assert_eq!(Rcode::from_bits(0xf6), Rcode::YxDomain);
        assert_eq!(Rcode::from_bits(12), Rcode::Unassigned(12));
        assert_eq!(Rcode::try_from(16), Err(IntoRcodeError));
    }

    #[test]
    fn rcode_display_works() {
        assert_eq!(Rcode::YxDomain.to_string(), "YXDOMAIN");
        assert_eq!(Rcode::NotZone.to_string(), "NOTZONE");
        assert_eq!(Rcode::Unassigned(15).to_string(), "RCODE15");
    }
}
