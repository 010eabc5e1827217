use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::core::Error;

/// Last byte of every acknowledgement the TV sends
pub const FRAME_END: u8 = b'x';

/// Longest acknowledgement we are willing to buffer
pub const MAX_FRAME_SIZE: usize = 64;

/// `<opcode1> <opcode2> <marker> <slot> <data> x`
const FRAME_FIELDS: usize = 6;

/// Codec for the RS-232C line
///
/// Outgoing frames are newline terminated. An incoming acknowledgement ends
/// at the `x` that forms its sixth field, so an opcode spelled `x` does not
/// cut the frame short. Line breaks and NULs between frames are dropped.
#[derive(Clone, Default)]
pub struct SerialCodec;

impl SerialCodec {
    /// Creates a new serial codec
    pub fn new() -> Self {
        SerialCodec
    }
}

impl Decoder for SerialCodec {
    type Item = String;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let noise = src
            .iter()
            .take_while(|b| matches!(b, b'\r' | b'\n' | b'\0'))
            .count();
        src.advance(noise);

        let end = match frame_end(&src[..]) {
            Some(end) => end,
            None if src.len() > MAX_FRAME_SIZE => {
                return Err(Error::protocol(format!(
                    "no frame end within {} bytes",
                    MAX_FRAME_SIZE
                )));
            }
            None => return Ok(None),
        };

        let frame = src.split_to(end + 1);
        String::from_utf8(frame.to_vec())
            .map(Some)
            .map_err(|_| Error::protocol("acknowledgement is not valid text"))
    }
}

fn frame_end(buf: &[u8]) -> Option<usize> {
    let mut fields = 1;
    for (i, byte) in buf.iter().enumerate() {
        match *byte {
            b' ' => fields += 1,
            FRAME_END if fields >= FRAME_FIELDS => return Some(i),
            _ => {}
        }
    }
    None
}

impl<'a> Encoder<&'a [u8]> for SerialCodec {
    type Error = Error;

    fn encode(&mut self, item: &'a [u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len() + 1);
        dst.extend_from_slice(item);
        if !item.ends_with(b"\n") {
            dst.put_u8(b'\n');
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_waits_for_frame_end() {
        let mut codec = SerialCodec::new();
        let mut bytes = BytesMut::from(&b"k a OK 0"[..]);

        assert!(codec.decode(&mut bytes).unwrap().is_none());

        bytes.extend_from_slice(b"0 01 x\r\n");
        assert_eq!(
            codec.decode(&mut bytes).unwrap().as_deref(),
            Some("k a OK 00 01 x")
        );
        assert!(codec.decode(&mut bytes).unwrap().is_none());
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_decode_back_to_back_frames() {
        let mut codec = SerialCodec::new();
        let mut bytes = BytesMut::from(&b"k e OK 01 00 x\r\nk e NG 01 01 x"[..]);

        assert_eq!(codec.decode(&mut bytes).unwrap().unwrap(), "k e OK 01 00 x");
        assert_eq!(codec.decode(&mut bytes).unwrap().unwrap(), "k e NG 01 01 x");
    }

    #[test]
    fn test_decode_keeps_leading_space() {
        let mut codec = SerialCodec::new();
        let mut bytes = BytesMut::from(&b"\n z OK 00 00 x"[..]);
        assert_eq!(codec.decode(&mut bytes).unwrap().unwrap(), " z OK 00 00 x");
    }

    #[test]
    fn test_decode_skips_x_opcode() {
        let mut codec = SerialCodec::new();
        let mut bytes = BytesMut::from(&b"x b OK 00 90 x"[..]);
        assert_eq!(codec.decode(&mut bytes).unwrap().unwrap(), "x b OK 00 90 x");
    }

    #[test]
    fn test_decode_rejects_runaway_input() {
        let mut codec = SerialCodec::new();
        let mut bytes = BytesMut::from(&[b'a'; MAX_FRAME_SIZE + 1][..]);
        assert!(codec.decode(&mut bytes).unwrap_err().is_protocol());
    }

    #[test]
    fn test_encode_terminates_frames() {
        let mut codec = SerialCodec::new();
        let mut bytes = BytesMut::new();

        codec.encode(&b"k a 00 01\n"[..], &mut bytes).unwrap();
        codec.encode(&b"k e 00 00"[..], &mut bytes).unwrap();
        assert_eq!(&bytes[..], b"k a 00 01\nk e 00 00\n");
    }
}
