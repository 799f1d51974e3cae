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

//! Implementation of the [`Class`] type for DNS classes.

use std::fmt;
use std::str::FromStr;

use crate::util::Caseless;

/// A DNS class.
///
/// This wraps the [`u16`] wire value with [`Display`](fmt::Display) and
/// [`FromStr`] implementations that follow [RFC 3597 § 5] for classes
/// without a mnemonic. Besides the data classes, DNS Update gives
/// meaning to the query classes [`NONE`](Class::NONE) and
/// [`ANY`](Class::ANY) in the prerequisite and update sections
/// ([RFC 2136 § 2.4 and § 2.5]).
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
/// [RFC 2136 § 2.4 and § 2.5]: https://datatracker.ietf.org/doc/html/rfc2136#section-2.4
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Class(u16);

impl Class {
    pub const IN: Self = Self(1);
    pub const CH: Self = Self(3);
    pub const HS: Self = Self(4);
    pub const NONE: Self = Self(254);
    pub const ANY: Self = Self(255);

    const MNEMONICS: [(Self, &'static str); 5] = [
        (Self::IN, "IN"),
        (Self::CH, "CH"),
        (Self::HS, "HS"),
        (Self::NONE, "NONE"),
        (Self::ANY, "ANY"),
    ];

    /// Returns whether this is one of the query classes NONE and ANY,
    /// which never label stored data.
    pub fn is_meta(self) -> bool {
        self == Self::NONE || self == Self::ANY
    }
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        Class(value)
    }
}

impl From<Class> for u16 {
    fn from(class: Class) -> Self {
        class.0
    }
}

impl FromStr for Class {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if let Some((class, _)) = Self::MNEMONICS
            .iter()
            .find(|(_, mnemonic)| Caseless(mnemonic) == Caseless(text))
        {
            Ok(*class)
        } else if text
            .get(0..5)
            .map_or(false, |prefix| Caseless(prefix) == Caseless("CLASS"))
        {
            text[5..]
                .parse::<u16>()
                .map(Self::from)
                .or(Err("class value is not a valid unsigned 16-bit integer"))
        } else {
            Err("unknown class")
        }
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", *self)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match Self::MNEMONICS.iter().find(|(class, _)| class == self) {
            Some((_, mnemonic)) => f.write_str(mnemonic),
            None => write!(f, "CLASS{}", self.0),
        }
    }
}
