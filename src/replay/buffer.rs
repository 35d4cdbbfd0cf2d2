/// Forward-only byte cursor over a replay stream.
///
/// Reads never index past the end of `data`; an exhausted buffer yields
/// `None` instead of panicking.
#[derive(Debug, Clone, Copy)]
pub struct ByteBuff<'a> {
    pub data: &'a [u8],
    pub byte_index: usize,
}

impl<'a> ByteBuff<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteBuff {
            data,
            byte_index: 0,
        }
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.byte_index)?;
        self.byte_index += 1;
        Some(byte)
    }

    /// Unread bytes from the cursor to the end of the stream.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.byte_index..]
    }

    /// Moves the cursor to the start of `rest`, which must be a suffix of
    /// [`remaining`](Self::remaining) as returned by a parser.
    pub fn advance_to(&mut self, rest: &'a [u8]) {
        debug_assert!(rest.len() <= self.data.len() - self.byte_index);
        self.byte_index = self.data.len() - rest.len();
    }

    /// Offset of `rest` within the stream, for diagnostics.
    pub fn offset_of(&self, rest: &[u8]) -> usize {
        self.data.len() - rest.len()
    }

    pub fn done(&self) -> bool {
        self.byte_index >= self.data.len()
    }
}
