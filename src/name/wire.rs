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

//! Decoding and validation of on-the-wire names.

use arrayvec::ArrayVec;

use super::{new_boxed_name, Error, Name, MAX_LABEL_LEN, MAX_N_LABELS, MAX_WIRE_LEN};

/// The two high bits of a length octet that mark a compression pointer.
const POINTER_TAG: u8 = 0xc0;

////////////////////////////////////////////////////////////////////////
// UNCOMPRESSED NAMES                                                 //
////////////////////////////////////////////////////////////////////////

/// Walks the uncompressed name at the start of `octets`, returning its
/// length on the wire. When `label_offsets` is provided, the offset of
/// each label is recorded in it. With `use_all`, the name must fill
/// `octets` exactly.
fn scan_uncompressed(
    octets: &[u8],
    use_all: bool,
    mut label_offsets: Option<&mut ArrayVec<u8, MAX_N_LABELS>>,
) -> Result<usize, Error> {
    let mut offset = 0;
    loop {
        let label_len = *octets.get(offset).ok_or(Error::UnexpectedEom)? as usize;
        if label_len > MAX_LABEL_LEN {
            return Err(Error::LabelTooLong);
        }
        if let Some(ref mut label_offsets) = label_offsets {
            // Every non-null label takes at least two octets, so the
            // length check below stops us before this can overflow.
            label_offsets.push(offset as u8);
        }
        offset += label_len + 1;
        if offset > MAX_WIRE_LEN {
            return Err(Error::NameTooLong);
        } else if label_len == 0 {
            break;
        }
    }

    if use_all && offset < octets.len() {
        Err(Error::ExtraData)
    } else {
        Ok(offset)
    }
}

/// The implementation of [`Name::try_from_uncompressed`] and
/// [`Name::try_from_uncompressed_all`].
pub fn parse_uncompressed_name(octets: &[u8], use_all: bool) -> Result<(Box<Name>, usize), Error> {
    let mut label_offsets = ArrayVec::new();
    let wire_len = scan_uncompressed(octets, use_all, Some(&mut label_offsets))?;
    let name = unsafe {
        // SAFETY: scan_uncompressed only succeeds on a valid name, and
        // it recorded the label offsets as it went.
        new_boxed_name(wire_len, &label_offsets, &[&octets[..wire_len]])
    };
    Ok((name, wire_len))
}

/// The implementation of [`Name::validate_uncompressed`] and
/// [`Name::validate_uncompressed_all`].
pub fn validate_uncompressed_name(octets: &[u8], use_all: bool) -> Result<usize, Error> {
    scan_uncompressed(octets, use_all, None)
}

////////////////////////////////////////////////////////////////////////
// COMPRESSED NAMES                                                   //
////////////////////////////////////////////////////////////////////////

/// Decompresses the name at index `start` of `message`, following
/// [RFC 1035 § 4.1.4] pointers. Pointer targets are indices into
/// `message`, so the whole DNS message should be passed. Returns the
/// name and the number of octets it occupies at `start`.
///
/// Each pointer must refer to an index strictly before the chunk of
/// labels that contains it. This rules out loops.
///
/// [RFC 1035 § 4.1.4]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.4
pub fn parse_compressed_name(message: &[u8], start: usize) -> Result<(Box<Name>, usize), Error> {
    let mut label_offsets = ArrayVec::<u8, MAX_N_LABELS>::new();
    let mut wire_repr = ArrayVec::<u8, MAX_WIRE_LEN>::new();
    let mut chunk_start = start;
    let mut consumed = None;

    loop {
        let mut index = chunk_start;
        let next_chunk = loop {
            let len = *message.get(index).ok_or(Error::UnexpectedEom)?;
            if len & POINTER_TAG == POINTER_TAG {
                let target = parse_pointer(message, chunk_start, index)?;
                index += 2;
                break Some(target);
            } else if len as usize > MAX_LABEL_LEN {
                return Err(Error::LabelTooLong);
            }

            let end_of_label = index + len as usize + 1;
            if end_of_label > message.len() {
                return Err(Error::UnexpectedEom);
            }
            label_offsets.push(wire_repr.len() as u8);
            wire_repr
                .try_extend_from_slice(&message[index..end_of_label])
                .or(Err(Error::NameTooLong))?;
            index = end_of_label;
            if len == 0 {
                break None;
            }
        };

        consumed.get_or_insert(index - start);
        match next_chunk {
            Some(target) => chunk_start = target,
            None => break,
        }
    }

    let name = unsafe {
        // SAFETY: every label was checked as it was copied, the copy
        // ends with the null label, and label_offsets tracks the copy.
        new_boxed_name(wire_repr.len(), &label_offsets, &[&wire_repr])
    };
    Ok((name, consumed.unwrap_or_default()))
}

/// Reads the pointer at `index` of `message` and checks that it refers
/// to an index before `chunk_start`.
fn parse_pointer(message: &[u8], chunk_start: usize, index: usize) -> Result<usize, Error> {
    match message.get(index..index + 2) {
        Some(&[high, low]) => {
            let target = u16::from_be_bytes([high & !POINTER_TAG, low]) as usize;
            if target >= chunk_start {
                Err(Error::InvalidPointer)
            } else {
                Ok(target)
            }
        }
        _ => Err(Error::UnexpectedEom),
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn long_name() -> Vec<u8> {
        // 128 one-octet labels: 256 octets with the null label.
        let mut octets = b"\x01x".repeat(MAX_N_LABELS);
        octets.push(0);
        octets
    }

    #[test]
    fn parse_uncompressed_name_accepts_valid_names() {
        let octets = b"\x03foo\x07example\x03com\x00trailer";
        let target: Box<Name> = "foo.example.com.".parse().unwrap();
        assert_eq!(
            parse_uncompressed_name(&octets[..17], true),
            Ok((target.clone(), 17))
        );
        assert_eq!(parse_uncompressed_name(octets, false), Ok((target, 17)));
        assert_eq!(validate_uncompressed_name(octets, false), Ok(17));
    }

    #[test]
    fn uncompressed_rejects_extra_data() {
        let octets = b"\x03com\x00\x00";
        assert_eq!(validate_uncompressed_name(octets, true), Err(Error::ExtraData));
        assert_eq!(
            parse_uncompressed_name(octets, true).unwrap_err(),
            Error::ExtraData
        );
    }

    #[test]
    fn uncompressed_rejects_bad_names() {
        let mut long_label = vec![0x40];
        long_label.extend_from_slice(&[b'x'; 64]);
        long_label.push(0);
        for (octets, error) in [
            (&b"\x07example\x03co"[..], Error::UnexpectedEom),
            (&b""[..], Error::UnexpectedEom),
            (&long_label[..], Error::LabelTooLong),
            (&long_name()[..], Error::NameTooLong),
        ] {
            assert_eq!(validate_uncompressed_name(octets, false), Err(error));
            assert_eq!(parse_uncompressed_name(octets, false).unwrap_err(), error);
        }
    }

    #[test]
    fn parse_compressed_name_follows_pointers() {
        // Header-sized padding, then example.com., then foo.<ptr>.
        let mut message = vec![0; 12];
        message.extend_from_slice(b"\x07example\x03com\x00\x03foo\xc0\x0c");
        let (name, consumed) = parse_compressed_name(&message, 25).unwrap();
        assert_eq!(name, "foo.example.com.".parse().unwrap());
        assert_eq!(consumed, 6);
        assert_eq!(name.wire_repr(), b"\x03foo\x07example\x03com\x00");

        let (name, consumed) = parse_compressed_name(&message, 12).unwrap();
        assert_eq!(name, "example.com.".parse().unwrap());
        assert_eq!(consumed, 13);
    }

    #[test]
    fn parse_compressed_name_follows_pointer_chains() {
        let message = b"\x03com\x00\x07example\xc0\x00\x03foo\xc0\x05";
        let (name, consumed) = parse_compressed_name(message, 15).unwrap();
        assert_eq!(name, "foo.example.com.".parse().unwrap());
        assert_eq!(consumed, 6);
    }

    #[test]
    fn parse_compressed_name_rejects_loops_and_forward_pointers() {
        assert_eq!(
            parse_compressed_name(b"\xc0\x00", 0),
            Err(Error::InvalidPointer)
        );
        assert_eq!(
            parse_compressed_name(b"\x01a\x01b\xc0\x02", 2),
            Err(Error::InvalidPointer)
        );
        assert_eq!(
            parse_compressed_name(b"\x01x\xc0\x08junk\x00", 0),
            Err(Error::InvalidPointer)
        );
    }

    #[test]
    fn parse_compressed_name_rejects_truncation() {
        assert_eq!(
            parse_compressed_name(b"\x03foo\xc0", 0),
            Err(Error::UnexpectedEom)
        );
        assert_eq!(
            parse_compressed_name(b"\x03foo\x07exam", 0),
            Err(Error::UnexpectedEom)
        );
        assert_eq!(parse_compressed_name(b"\x03foo", 4), Err(Error::UnexpectedEom));
        assert_eq!(parse_compressed_name(b"", 0), Err(Error::UnexpectedEom));
    }

    #[test]
    fn parse_compressed_name_rejects_long_names_across_pointers() {
        // Two halves that are each valid but too long together.
        let mut message = b"\x01x".repeat(100);
        message.push(0);
        let second = message.len();
        message.extend_from_slice(&b"\x01x".repeat(30));
        message.extend_from_slice(b"\xc0\x00");
        assert_eq!(
            parse_compressed_name(&message, second),
            Err(Error::NameTooLong)
        );
        assert_eq!(
            parse_compressed_name(&long_name(), 0),
            Err(Error::NameTooLong)
        );
    }
}
