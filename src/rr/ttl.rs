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

//! Provides the [`Ttl`] structure for DNS RR TTLs.

use std::fmt;

////////////////////////////////////////////////////////////////////////
// TTLS                                                               //
////////////////////////////////////////////////////////////////////////

/// The time to live (TTL) of a DNS record.
///
/// [RFC 2181 § 8] restricts TTLs to 0 through 2³¹ - 1 and says that a
/// value with the most significant bit set is to be treated as zero.
/// A codec must not apply that rule on its own, though: DNS Update
/// messages are relayed and compared octet for octet, so `Ttl` keeps
/// the raw 32-bit wire value unchanged. The RFC 2181 view is available
/// through [`Ttl::rfc2181_value`], and [`Ttl::exceeds_signed_range`]
/// tells whether the two differ.
///
/// [RFC 2181 § 8]: https://datatracker.ietf.org/doc/html/rfc2181#section-8
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Ttl(u32);

impl Ttl {
    /// Returns whether the most significant bit of the TTL is set.
    pub fn exceeds_signed_range(self) -> bool {
        self.0 > i32::MAX as u32
    }

    /// Returns the TTL as [RFC 2181 § 8] would have it, i.e. zero if the
    /// value exceeds 2³¹ - 1.
    ///
    /// [RFC 2181 § 8]: https://datatracker.ietf.org/doc/html/rfc2181#section-8
    pub fn rfc2181_value(self) -> u32 {
        if self.exceeds_signed_range() {
            0
        } else {
            self.0
        }
    }
}

impl From<u32> for Ttl {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Ttl> for u32 {
    fn from(ttl: Ttl) -> Self {
        ttl.0
    }
}

impl fmt::Debug for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_value_is_preserved() {
        assert_eq!(u32::from(Ttl::from(0xaabbccdd)), 0xaabbccdd);
        assert_eq!(u32::from(Ttl::from(23)), 23);
    }

    #[test]
    fn rfc2181_value_zeroes_large_ttls() {
        let i32_max = i32::MAX as u32;
        assert!(!Ttl::from(i32_max).exceeds_signed_range());
        assert_eq!(Ttl::from(i32_max).rfc2181_value(), i32_max);
        assert!(Ttl::from(i32_max + 1).exceeds_signed_range());
        assert_eq!(Ttl::from(i32_max + 1).rfc2181_value(), 0);
    }
}
