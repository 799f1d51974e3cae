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

//! Helpers for the [RFC 2782] RR type, SRV.
//!
//! [RFC 2782]: https://datatracker.ietf.org/doc/html/rfc2782

use super::ComponentType;
use crate::name::Name;

////////////////////////////////////////////////////////////////////////
// RFC 2782 - SRV RR                                                  //
////////////////////////////////////////////////////////////////////////

/// The layout of IN SRV: PRIORITY, WEIGHT, PORT, and TARGET. RFC 2782
/// forbids compressing TARGET, but a decoder may still meet a
/// compressed one, so reading accepts it.
pub(super) const IN_SRV_LAYOUT: &[ComponentType] =
    &[ComponentType::FixedLen(6), ComponentType::UncompressibleName];

/// Serializes an SRV record into the provided buffer.
pub fn serialize_srv(priority: u16, weight: u16, port: u16, target: &Name, buf: &mut Vec<u8>) {
    buf.reserve(6 + target.wire_repr().len());
    buf.extend_from_slice(&priority.to_be_bytes());
    buf.extend_from_slice(&weight.to_be_bytes());
    buf.extend_from_slice(&port.to_be_bytes());
    buf.extend_from_slice(target.wire_repr());
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;
    use crate::rr::rdata::Component;
    use crate::rr::{Rdata, Type};

    #[test]
    fn srv_target_is_uncompressible() {
        let target: Box<Name> = "sip.example.com.".parse().unwrap();
        let mut buf = Vec::new();
        serialize_srv(1, 2, 5060, &target, &mut buf);
        assert_eq!(&buf[..6], b"\x00\x01\x00\x02\x13\xc4");

        let rdata: &Rdata = buf[..].try_into().unwrap();
        let components: Vec<Component> = rdata
            .components(Class::IN, Type::SRV)
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(matches!(
            &components[..],
            [Component::Other(_), Component::UncompressibleName(name)] if *name == target
        ));
    }
}
