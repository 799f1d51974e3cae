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

//! Layouts and serialization helpers for the RR types from the original
//! DNS specification, STD 13 ([RFC 1034] and [RFC 1035]).
//!
//! [RFC 1034]: https://datatracker.ietf.org/doc/html/rfc1034
//! [RFC 1035]: https://datatracker.ietf.org/doc/html/rfc1035

use std::net::Ipv4Addr;

use super::ComponentType;
use crate::name::Name;

////////////////////////////////////////////////////////////////////////
// STD 13 (RFC 1035 § 3.3) - STANDARD RRS                             //
////////////////////////////////////////////////////////////////////////

/// The layout of CNAME, MB, MD, MF, MG, MR, NS, and PTR, whose RDATA
/// is a single domain name.
pub(super) const NAME_LAYOUT: &[ComponentType] = &[ComponentType::CompressibleName];

/// The layout of MINFO: RMAILBX and EMAILBX.
pub(super) const MINFO_LAYOUT: &[ComponentType] = &[
    ComponentType::CompressibleName,
    ComponentType::CompressibleName,
];

/// The layout of MX: PREFERENCE and EXCHANGE.
pub(super) const MX_LAYOUT: &[ComponentType] =
    &[ComponentType::FixedLen(2), ComponentType::CompressibleName];

/// The layout of SOA: MNAME, RNAME, and then SERIAL, REFRESH, RETRY,
/// EXPIRE, and MINIMUM.
pub(super) const SOA_LAYOUT: &[ComponentType] = &[
    ComponentType::CompressibleName,
    ComponentType::CompressibleName,
    ComponentType::FixedLen(20),
];

/// Serializes a single-name record (e.g. NS or CNAME) into the provided
/// buffer.
pub fn serialize_name(name: &Name, buf: &mut Vec<u8>) {
    buf.extend_from_slice(name.wire_repr());
}

/// Serializes an MX record into the provided buffer.
pub fn serialize_mx(preference: u16, exchange: &Name, buf: &mut Vec<u8>) {
    buf.reserve(2 + exchange.wire_repr().len());
    buf.extend_from_slice(&preference.to_be_bytes());
    buf.extend_from_slice(exchange.wire_repr());
}

/// Serializes an SOA record into the provided buffer.
///
/// Note that [RFC 1035 § 3.3.13] does not state whether REFRESH, RETRY,
/// and EXPIRE are signed or unsigned. BIND, NSD, and Knot all treat
/// them as unsigned, and so do we.
///
/// [RFC 1035 § 3.3.13]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.3.13
#[allow(clippy::too_many_arguments)]
pub fn serialize_soa(
    mname: &Name,
    rname: &Name,
    serial: u32,
    refresh: u32,
    retry: u32,
    expire: u32,
    minimum: u32,
    buf: &mut Vec<u8>,
) {
    buf.reserve(20 + mname.wire_repr().len() + rname.wire_repr().len());
    buf.extend_from_slice(mname.wire_repr());
    buf.extend_from_slice(rname.wire_repr());
    for field in [serial, refresh, retry, expire, minimum] {
        buf.extend_from_slice(&field.to_be_bytes());
    }
}

////////////////////////////////////////////////////////////////////////
// STD 13 (RFC 1035 § 3.4) - INTERNET-SPECIFIC RRS                    //
////////////////////////////////////////////////////////////////////////

/// The length of IN A RDATA.
pub(super) const IN_A_LEN: usize = 4;

/// Serializes an A record into the provided buffer.
pub fn serialize_a(address: Ipv4Addr, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&address.octets());
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
