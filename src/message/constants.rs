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

//! Constants related to DNS messages.
//!
//! In an [RFC 2136] UPDATE header, the bits that other opcodes use for
//! AA, TC, RD, RA, and the rest are a single reserved field, Z, which
//! must be zero.
//!
//! [RFC 2136]: https://datatracker.ietf.org/doc/html/rfc2136#section-2.2

pub const HEADER_SIZE: usize = 12;
pub const ID_START: usize = 0;
pub const QR_BYTE: usize = 2;
pub const QR_MASK: u8 = 0x80;
pub const OPCODE_BYTE: usize = 2;
pub const OPCODE_MASK: u8 = 0x78;
pub const OPCODE_SHIFT: usize = 3;
pub const Z_HIGH_BYTE: usize = 2;
pub const Z_HIGH_MASK: u8 = 0x07;
pub const Z_LOW_BYTE: usize = 3;
pub const Z_LOW_MASK: u8 = 0xf0;
pub const RCODE_BYTE: usize = 3;
pub const RCODE_MASK: u8 = 0x0f;
pub const QDCOUNT_START: usize = 4;
pub const ANCOUNT_START: usize = 6;
pub const NSCOUNT_START: usize = 8;
pub const ARCOUNT_START: usize = 10;
pub const POINTER_MAX: usize = 16383;
