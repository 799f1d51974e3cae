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

//! Provides the [`Type`] structure for DNS RR types.

use std::fmt;
use std::str::FromStr;

use crate::util::Caseless;

////////////////////////////////////////////////////////////////////////
// RR TYPES                                                           //
////////////////////////////////////////////////////////////////////////

/// The RR type of a DNS record.
///
/// This wraps the [`u16`] wire value, with constants for the types this
/// crate knows something about and [`Display`](fmt::Display) and
/// [`FromStr`] implementations that fall back to the `TYPEnnn` form of
/// [RFC 3597 § 5].
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Type(u16);

impl Type {
    pub const A: Type = Type(1);
    pub const NS: Type = Type(2);
    pub const MD: Type = Type(3);
    pub const MF: Type = Type(4);
    pub const CNAME: Type = Type(5);
    pub const SOA: Type = Type(6);
    pub const MB: Type = Type(7);
    pub const MG: Type = Type(8);
    pub const MR: Type = Type(9);
    pub const NULL: Type = Type(10);
    pub const WKS: Type = Type(11);
    pub const PTR: Type = Type(12);
    pub const HINFO: Type = Type(13);
    pub const MINFO: Type = Type(14);
    pub const MX: Type = Type(15);
    pub const TXT: Type = Type(16);
    pub const AAAA: Type = Type(28);
    pub const SRV: Type = Type(33);
    pub const DHCID: Type = Type(49);
    pub const ANY: Type = Type(255);

    const MNEMONICS: [(Type, &'static str); 20] = [
        (Type::A, "A"),
        (Type::NS, "NS"),
        (Type::MD, "MD"),
        (Type::MF, "MF"),
        (Type::CNAME, "CNAME"),
        (Type::SOA, "SOA"),
        (Type::MB, "MB"),
        (Type::MG, "MG"),
        (Type::MR, "MR"),
        (Type::NULL, "NULL"),
        (Type::WKS, "WKS"),
        (Type::PTR, "PTR"),
        (Type::HINFO, "HINFO"),
        (Type::MINFO, "MINFO"),
        (Type::MX, "MX"),
        (Type::TXT, "TXT"),
        (Type::AAAA, "AAAA"),
        (Type::SRV, "SRV"),
        (Type::DHCID, "DHCID"),
        (Type::ANY, "ANY"),
    ];
}

impl From<u16> for Type {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Type> for u16 {
    fn from(rr_type: Type) -> Self {
        rr_type.0
    }
}

impl FromStr for Type {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if let Some((rr_type, _)) = Self::MNEMONICS
            .iter()
            .find(|(_, mnemonic)| Caseless(mnemonic) == Caseless(text))
        {
            Ok(*rr_type)
        } else if text
            .get(0..4)
            .map_or(false, |prefix| Caseless(prefix) == Caseless("TYPE"))
        {
            text[4..]
                .parse::<u16>()
                .map(Self::from)
                .or(Err("type value is not a valid unsigned 16-bit integer"))
        } else {
            Err("unknown type")
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match Self::MNEMONICS.iter().find(|(rr_type, _)| rr_type == self) {
            Some((_, mnemonic)) => f.write_str(mnemonic),
            None => write!(f, "TYPE{}", self.0),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_displays_according_to_rfc3597() {
        assert_eq!(Type::DHCID.to_string(), "DHCID");
        assert_eq!(Type::from(0xff00).to_string(), "TYPE65280");
    }

    #[test]
    fn type_parses_mnemonics_and_rfc3597_forms() {
        assert_eq!("aaaa".parse::<Type>(), Ok(Type::AAAA));
        assert_eq!("ANY".parse::<Type>(), Ok(Type::ANY));
        assert_eq!("TYPE1".parse::<Type>(), Ok(Type::A));
        assert_eq!("type65280".parse::<Type>().map(u16::from), Ok(65280));
        assert!("TYPE".parse::<Type>().is_err());
        assert!("BOGUS".parse::<Type>().is_err());
    }
}
