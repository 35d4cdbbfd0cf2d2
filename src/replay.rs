pub mod buffer;
pub mod decoder;
pub mod types;

use std::io::Read;

use crate::error::ReplayError;
use buffer::ByteBuff;
use decoder::{Decoder, EventSink};
use types::{Decoded, Termination};

/// Decodes a whole replay stream into an in-memory log.
///
/// Never fails on bad data: decoding stops at the first record that cannot
/// be read, and everything before it is returned along with the reason.
pub fn decode_all(input: &[u8]) -> Decoded {
    Decoder::new(ByteBuff::new(input)).decode_all()
}

/// Same decode pass as [`decode_all`], with events handed to `sink`.
pub fn decode_into<S: EventSink + ?Sized>(input: &[u8], sink: &mut S) -> Termination {
    Decoder::new(ByteBuff::new(input)).decode_into(sink)
}

/// Reads `reader` to the end, then decodes it. Only I/O errors are returned
/// as `Err`.
pub fn decode_reader<R: Read>(mut reader: R) -> Result<Decoded, ReplayError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Ok(decode_all(&data))
}
