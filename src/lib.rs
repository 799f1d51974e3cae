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

//! A codec for [RFC 2136] DNS Update messages.
//!
//! The crate is layered, leaves first:
//!
//! * [`name`] provides domain names and the borrowed
//!   [`LabelSequence`](name::LabelSequence) view over them;
//! * [`class`] and [`rr`] provide classes, RR types, TTLs, RDATA, and
//!   RRsets;
//! * [`message`] provides a generic DNS message with wire encoding
//!   (through the compressing [`Renderer`](message::Renderer)) and
//!   decoding; and
//! * [`update`] layers the RFC 2136 section names and validation rules
//!   over the generic message.
//!
//! [RFC 2136]: https://datatracker.ietf.org/doc/html/rfc2136

pub mod class;
pub mod message;
pub mod name;
pub mod rr;
pub mod update;
mod util;
