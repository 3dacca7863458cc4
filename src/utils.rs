use bytes::{Buf, BufMut};

use crate::error::{DecodeError, EncodeError};

macro_rules! ensure {
    ($cond:expr, $e:expr) => {
        if !($cond) {
            return Err($e);
        }
    };
}

macro_rules! prim_enum {
    (
        $( #[$enum_attr:meta] )*
        pub enum $name:ident {
            $(
                $( #[$enum_item_attr:meta] )*
                $var:ident=$val:expr
            ),+
        }) => {
        $( #[$enum_attr] )*
        #[repr(u8)]
        #[derive(Debug, Eq, PartialEq, Copy, Clone)]
        pub enum $name {
            $(
                $( #[$enum_item_attr] )*
                $var = $val
            ),+
        }
        impl std::convert::TryFrom<u8> for $name {
            type Error = $crate::error::DecodeError;
            fn try_from(v: u8) -> Result<Self, Self::Error> {
                match v {
                    $($val => Ok($name::$var)),+
                    ,_ => Err($crate::error::DecodeError::MalformedPacket)
                }
            }
        }
    };
}

pub(crate) fn read_u8(src: &mut &[u8]) -> Result<u8, DecodeError> {
    ensure!(src.has_remaining(), DecodeError::LengthMismatch);
    Ok(src.get_u8())
}

pub(crate) fn read_u16(src: &mut &[u8]) -> Result<u16, DecodeError> {
    ensure!(src.remaining() >= 2, DecodeError::LengthMismatch);
    Ok(src.get_u16())
}

/// Read a length-prefixed byte string: 2-byte big-endian length, then
/// that many raw bytes. The returned slice borrows from the input; the
/// cursor advances past the content. Fails if the declared length runs
/// past the end of `src`, which is the bounds guard protecting topic
/// extraction against truncated packets.
pub(crate) fn read_bytes<'a>(src: &mut &'a [u8]) -> Result<&'a [u8], DecodeError> {
    let len = read_u16(src)? as usize;
    ensure!(src.len() >= len, DecodeError::LengthMismatch);
    let (content, rest) = src.split_at(len);
    *src = rest;
    Ok(content)
}

pub(crate) fn read_str<'a>(src: &mut &'a [u8]) -> Result<&'a str, DecodeError> {
    std::str::from_utf8(read_bytes(src)?).map_err(|_| DecodeError::Utf8Error)
}

/// Infallible write half of the primitive field codec. Length limits
/// are validated while sizing the packet, before any byte is written,
/// so `encode` runs only against a destination already known to fit.
pub(crate) trait Encode {
    fn encoded_size(&self) -> usize;

    fn encode<B: BufMut>(&self, dst: &mut B);
}

impl Encode for u16 {
    fn encoded_size(&self) -> usize {
        2
    }
    fn encode<B: BufMut>(&self, dst: &mut B) {
        dst.put_u16(*self);
    }
}

impl Encode for &[u8] {
    fn encoded_size(&self) -> usize {
        2 + self.len()
    }
    fn encode<B: BufMut>(&self, dst: &mut B) {
        dst.put_u16(self.len() as u16);
        dst.put_slice(self);
    }
}

impl Encode for &str {
    fn encoded_size(&self) -> usize {
        2 + self.len()
    }
    fn encode<B: BufMut>(&self, dst: &mut B) {
        self.as_bytes().encode(dst);
    }
}

/// Content length limit for a length-prefixed field, 16-bit prefix.
pub(crate) fn ensure_prefixed_len(len: usize) -> Result<(), EncodeError> {
    ensure!(len <= usize::from(u16::MAX), EncodeError::InvalidLength);
    Ok(())
}

/// Decode the Remaining Length field: base-128, low 7 bits per digit,
/// high bit as continuation flag. Returns the value and the number of
/// bytes consumed. A fifth continuation digit overflows; running out
/// of input mid-field is a length error, never an out-of-bounds read.
pub(crate) fn decode_variable_length(src: &[u8]) -> Result<(u32, usize), DecodeError> {
    let mut cur = src;
    let mut shift: u32 = 0;
    let mut len: u32 = 0;
    loop {
        ensure!(cur.has_remaining(), DecodeError::LengthMismatch);
        let val = cur.get_u8();
        len += u32::from(val & 0b0111_1111) << shift;
        if val & 0b1000_0000 == 0 {
            return Ok((len, src.len() - cur.len()));
        }
        ensure!(shift < 21, DecodeError::RemainingLengthOverflow);
        shift += 7;
    }
}

/// Write the minimal base-128 form of a Remaining Length. The value
/// must already be validated against [`MAX_REMAINING_LENGTH`].
///
/// [`MAX_REMAINING_LENGTH`]: crate::types::MAX_REMAINING_LENGTH
pub(crate) fn write_variable_length<B: BufMut>(len: u32, dst: &mut B) {
    match len {
        0..=127 => dst.put_u8(len as u8),
        128..=16_383 => {
            dst.put_slice(&[((len & 0b0111_1111) | 0b1000_0000) as u8, (len >> 7) as u8])
        }
        16_384..=2_097_151 => {
            dst.put_slice(&[
                ((len & 0b0111_1111) | 0b1000_0000) as u8,
                (((len >> 7) & 0b0111_1111) | 0b1000_0000) as u8,
                (len >> 14) as u8,
            ]);
        }
        2_097_152..=268_435_455 => {
            dst.put_slice(&[
                ((len & 0b0111_1111) | 0b1000_0000) as u8,
                (((len >> 7) & 0b0111_1111) | 0b1000_0000) as u8,
                (((len >> 14) & 0b0111_1111) | 0b1000_0000) as u8,
                (len >> 21) as u8,
            ]);
        }
        _ => unreachable!("remaining length validated before writing"),
    }
}

/// Total fixed-header size for a packet with the given Remaining
/// Length: the type/flags byte plus 1-4 length digits. Every encoder
/// uses this to pre-validate destination capacity before the first
/// write.
pub(crate) fn total_header_length(remaining_length: u32) -> usize {
    match remaining_length {
        0..=127 => 2,
        128..=16_383 => 3,
        16_384..=2_097_151 => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_variable_length() {
        fn assert_variable_length<B: AsRef<[u8]> + 'static>(bytes: B, res: (u32, usize)) {
            assert_eq!(decode_variable_length(bytes.as_ref()).unwrap(), res);
        }

        assert_variable_length(b"\x7f\x7f", (127, 1));

        assert_eq!(
            decode_variable_length(b"\xff\xff\xff"),
            Err(DecodeError::LengthMismatch)
        );
        assert_eq!(
            decode_variable_length(b"\xff\xff\xff\xff\xff\xff"),
            Err(DecodeError::RemainingLengthOverflow)
        );

        assert_variable_length(b"\x00", (0, 1));
        assert_variable_length(b"\x7f", (127, 1));
        assert_variable_length(b"\x80\x01", (128, 2));
        assert_variable_length(b"\xff\x7f", (16383, 2));
        assert_variable_length(b"\x80\x80\x01", (16384, 3));
        assert_variable_length(b"\xff\xff\x7f", (2_097_151, 3));
        assert_variable_length(b"\x80\x80\x80\x01", (2_097_152, 4));
        assert_variable_length(b"\xff\xff\xff\x7f", (268_435_455, 4));
    }

    #[test]
    fn test_encode_variable_length() {
        let mut v = Vec::new();

        write_variable_length(123, &mut v);
        assert_eq!(v, [123].as_ref());

        v.clear();

        write_variable_length(129, &mut v);
        assert_eq!(v, b"\x81\x01".as_ref());

        v.clear();

        write_variable_length(16_383, &mut v);
        assert_eq!(v, b"\xff\x7f".as_ref());

        v.clear();

        write_variable_length(2_097_151, &mut v);
        assert_eq!(v, b"\xff\xff\x7f".as_ref());

        v.clear();

        write_variable_length(268_435_455, &mut v);
        assert_eq!(v, b"\xff\xff\xff\x7f".as_ref());
    }

    #[test]
    fn test_variable_length_round_trip() {
        let boundaries = [
            0u32, 1, 126, 127, 128, 129, 16_382, 16_383, 16_384, 16_385, 2_097_150, 2_097_151,
            2_097_152, 2_097_153, 268_435_454, 268_435_455,
        ];
        for n in boundaries.into_iter().chain((0..28).map(|s| 1u32 << s)) {
            let mut v = Vec::new();
            write_variable_length(n, &mut v);
            // minimal form: the final digit is never a bare zero
            // unless the value itself is zero
            if n > 0 {
                assert_ne!(*v.last().unwrap(), 0, "redundant digit for {n}");
            }
            assert_eq!(decode_variable_length(&v).unwrap(), (n, v.len()));
        }
    }

    #[test]
    fn test_total_header_length() {
        assert_eq!(total_header_length(0), 2);
        assert_eq!(total_header_length(127), 2);
        assert_eq!(total_header_length(128), 3);
        assert_eq!(total_header_length(16_383), 3);
        assert_eq!(total_header_length(16_384), 4);
        assert_eq!(total_header_length(2_097_151), 4);
        assert_eq!(total_header_length(2_097_152), 5);
        assert_eq!(total_header_length(268_435_455), 5);
    }

    #[test]
    fn test_read_prefixed_bytes() {
        let mut src: &[u8] = b"\x00\x05topicrest";
        assert_eq!(read_bytes(&mut src).unwrap(), b"topic");
        assert_eq!(src, b"rest");

        // declared length runs past the buffer end
        let mut src: &[u8] = b"\x00\x0fshort";
        assert_eq!(read_bytes(&mut src), Err(DecodeError::LengthMismatch));

        // fewer than 2 prefix bytes remain
        let mut src: &[u8] = b"\x00";
        assert_eq!(read_bytes(&mut src), Err(DecodeError::LengthMismatch));

        let mut src: &[u8] = b"\x00\x02\xff\xfe";
        assert_eq!(read_str(&mut src), Err(DecodeError::Utf8Error));
    }
}
