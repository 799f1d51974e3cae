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

//! Handling of the [RFC 3596] RR type, AAAA.
//!
//! [RFC 3596]: https://datatracker.ietf.org/doc/html/rfc3596

use std::net::Ipv6Addr;

////////////////////////////////////////////////////////////////////////
// RFC 3596 §§ 2.1 and 2.2 - IPV6 AAAA RR                             //
////////////////////////////////////////////////////////////////////////

/// The length of IN AAAA RDATA.
pub(super) const IN_AAAA_LEN: usize = 16;

/// Serializes an AAAA record into the provided buffer.
pub fn serialize_aaaa(address: Ipv6Addr, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&address.octets());
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;
    use crate::rr::{Rdata, ReadRdataError, Type};

    #[test]
    fn serialize_aaaa_works() {
        let mut buf = Vec::new();
        serialize_aaaa("2001:db8:1::1".parse().unwrap(), &mut buf);
        assert_eq!(
            buf,
            b"\x20\x01\x0d\xb8\x00\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x01"
        );
        let rdata: &Rdata = buf[..].try_into().unwrap();
        assert_eq!(rdata.validate(Class::IN, Type::AAAA), Ok(()));
        assert_eq!(
            Rdata::from_unchecked(&buf[1..]).validate(Class::IN, Type::AAAA),
            Err(ReadRdataError::Other)
        );
    }
}
