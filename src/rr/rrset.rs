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

//! Implementation of the [`Rrset`] type.

use std::fmt;
use std::iter::FusedIterator;

use super::{Rdata, Ttl, Type};
use crate::class::Class;
use crate::name::Name;

////////////////////////////////////////////////////////////////////////
// RRSETS                                                             //
////////////////////////////////////////////////////////////////////////

/// A data structure for resource record sets as they appear in a
/// message section.
///
/// [RFC 2181 § 5] defines an RRset as a group of records with the same
/// owner, class, and type. Multiple records are stored in the same
/// [`Rrset`] structure by setting their common owner, [`Type`],
/// [`Class`], and [`Ttl`], and then pushing their [`Rdata`]s, one for
/// each record.
///
/// Unlike RRsets in a zone, these are append-only and keep duplicate
/// [`Rdata`] in the order it was pushed. An `Rrset` with no [`Rdata`]
/// at all is legal too: it stands for a single record with an empty
/// RDATA field, as used by the "ANY" and "NONE" forms of [RFC 2136
/// § 2.4].
///
/// [RFC 2181 § 5]: https://datatracker.ietf.org/doc/html/rfc2181#section-5
/// [RFC 2136 § 2.4]: https://datatracker.ietf.org/doc/html/rfc2136#section-2.4
#[derive(Clone, Eq, PartialEq)]
pub struct Rrset {
    pub owner: Box<Name>,
    pub rr_type: Type,
    pub class: Class,
    pub ttl: Ttl,
    rdatas: Vec<u8>,
    rdata_count: usize,
}

impl Rrset {
    /// Creates a new [`Rrset`] with the given owner, RR type, class,
    /// and TTL. It will initially contain no record data.
    pub fn new(owner: Box<Name>, rr_type: Type, class: Class, ttl: Ttl) -> Self {
        Self {
            owner,
            rr_type,
            class,
            ttl,
            rdatas: Vec::new(),
            rdata_count: 0,
        }
    }

    /// Appends an [`Rdata`] to this [`Rrset`]. Duplicates are kept.
    ///
    /// When the class is NONE or ANY, a single empty `Rdata` goes onto
    /// the wire exactly like an RRset with no RDATA at all, and it
    /// decodes as the latter.
    pub fn push_rdata(&mut self, rdata: &Rdata) {
        self.rdatas.reserve(2 + rdata.len());
        self.rdatas
            .extend_from_slice(&(rdata.len() as u16).to_ne_bytes());
        self.rdatas.extend_from_slice(rdata.octets());
        self.rdata_count += 1;
    }

    /// Returns an iterator over the [`Rdata`] of this `Rrset`.
    pub fn rdatas(&self) -> RdataIterator {
        RdataIterator {
            cursor: &self.rdatas,
        }
    }

    /// Returns the number of [`Rdata`]s pushed so far.
    pub fn rdata_count(&self) -> usize {
        self.rdata_count
    }

    /// Returns the number of records this `Rrset` takes up in a
    /// message. This is one more than [`Rrset::rdata_count`] when there
    /// is no [`Rdata`].
    pub fn rr_count(&self) -> usize {
        self.rdata_count.max(1)
    }

    /// Returns whether `self` and `other` share owner, type, and class,
    /// so that their records belong to the same RRset.
    pub fn same_rrset_as(&self, other: &Self) -> bool {
        self.rr_type == other.rr_type && self.class == other.class && self.owner == other.owner
    }
}

/// `Rrset`s are displayed one record per line, in master file format,
/// with RDATA in the generic form of [RFC 3597 § 5].
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
impl fmt::Display for Rrset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let write_prefix = |f: &mut fmt::Formatter| {
            write!(f, "{} {} {} {}", self.owner, self.ttl, self.class, self.rr_type)
        };
        if self.rdata_count == 0 {
            write_prefix(f)
        } else {
            for (i, rdata) in self.rdatas().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                write_prefix(f)?;
                write!(f, " {}", rdata)?;
            }
            Ok(())
        }
    }
}

impl fmt::Debug for Rrset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Rrset")
            .field("owner", &self.owner)
            .field("rr_type", &self.rr_type)
            .field("class", &self.class)
            .field("ttl", &self.ttl)
            .field("rdatas", &self.rdatas().collect::<Vec<_>>())
            .finish()
    }
}

/// An iterator over the [`Rdata`] of an [`Rrset`].
pub struct RdataIterator<'a> {
    cursor: &'a [u8],
}

impl<'a> Iterator for RdataIterator<'a> {
    type Item = &'a Rdata;

    fn next(&mut self) -> Option<Self::Item> {
        let len_octets: &[u8; 2] = self.cursor.get(0..2)?.try_into().ok()?;
        let len = u16::from_ne_bytes(*len_octets) as usize;
        if let Some(rdata) = self.cursor.get(2..len + 2) {
            self.cursor = &self.cursor[len + 2..];
            Some(Rdata::from_unchecked(rdata))
        } else {
            None
        }
    }
}

impl FusedIterator for RdataIterator<'_> {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
