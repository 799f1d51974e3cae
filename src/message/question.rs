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

//! Implementation of the [`Question`] type.

use std::fmt;

use crate::class::Class;
use crate::name::Name;
use crate::rr::Type;

////////////////////////////////////////////////////////////////////////
// QUESTIONS                                                          //
////////////////////////////////////////////////////////////////////////

/// An entry of the question section of a DNS message.
///
/// Defined in [RFC 1035 § 4.1.2], a DNS question includes the QNAME,
/// QTYPE, and QCLASS. In an UPDATE message the same entry, renamed
/// ZNAME, ZTYPE, and ZCLASS, names the zone being updated ([RFC 2136
/// § 2.3]). QTYPE and QCLASS values are supersets of TYPE and CLASS
/// values, so the [`Type`] and [`Class`] wrappers serve for them.
///
/// [RFC 1035 § 4.1.2]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.2
/// [RFC 2136 § 2.3]: https://datatracker.ietf.org/doc/html/rfc2136#section-2.3
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Question {
    pub qname: Box<Name>,
    pub qtype: Type,
    pub qclass: Class,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.qname, self.qclass, self.qtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_display_works() {
        let question = Question {
            qname: "example.com.".parse().unwrap(),
            qtype: Type::SOA,
            qclass: Class::IN,
        };
        assert_eq!(question.to_string(), "example.com. IN SOA");
    }
}
