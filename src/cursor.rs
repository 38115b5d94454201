use {
    crate::{chunk::Chunk, Error},
    bytemuck::Pod,
    log::trace,
    std::{io::SeekFrom, mem::size_of},
};

/// Filler word written in front of records which must start on an alignment boundary.
pub const PADDING_SENTINEL: u32 = 0x1111_1111;

/// A forward reading position inside a bounded window of a borrowed byte source.
///
/// Positions are absolute offsets into the backing source, so chunk offsets read through one
/// cursor stay valid for every other cursor over the same source. No read or seek ever leaves the
/// `start..end` window, even when the source itself continues past it.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    end: usize,
    position: usize,
    start: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor whose window is the entire source.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            end: data.len(),
            position: 0,
            start: 0,
        }
    }

    /// Skips every padding sentinel word at the cursor and shrinks `chunk` so its bounds no longer
    /// include them.
    ///
    /// The cursor is left on the first word which is not a sentinel. Returns the number of padding
    /// bytes consumed.
    pub fn align_padding(&mut self, chunk: &mut Chunk) -> usize {
        let mut padding = 0;
        while self.peek_u32() == Some(PADDING_SENTINEL) {
            self.position += 4;
            padding += 4;
        }

        if padding > 0 {
            trace!(
                "Skipped {padding} padding bytes in chunk 0x{:08X} @ 0x{:X}",
                chunk.ty, chunk.offset
            );

            chunk.shrink_front(padding);
        }

        padding
    }

    /// Absolute offset one past the last readable byte.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn has_remaining(&self) -> bool {
        self.position < self.end
    }

    /// Length of the window, independent of the current position.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn peek_u32(&self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }

        let bytes = self.data.get(self.position..self.position + 4)?;

        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Fills `buf` completely or fails without moving.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let bytes = self.read_bytes(buf.len())?;
        buf.copy_from_slice(bytes);

        Ok(())
    }

    /// Borrows the next `len` bytes of the source and advances past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let end = self
            .position
            .checked_add(len)
            .filter(|&end| end <= self.end && end <= self.data.len())
            .ok_or(Error::OutOfBounds {
                position: self.position,
                requested: len,
                end: self.end,
            })?;
        let bytes = &self.data[self.position..end];
        self.position = end;

        Ok(bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Reads `count` consecutive floats.
    pub fn read_f32s(&mut self, count: usize) -> Result<Vec<f32>, Error> {
        let len = count.checked_mul(4).ok_or(Error::OutOfBounds {
            position: self.position,
            requested: usize::MAX,
            end: self.end,
        })?;
        let bytes = self.read_bytes(len)?;

        Ok(bytes
            .chunks_exact(4)
            .map(|word| f32::from_le_bytes([word[0], word[1], word[2], word[3]]))
            .collect())
    }

    /// Reads a fixed-layout record of `size_of::<T>()` bytes.
    ///
    /// The record starts out zeroed and is then overwritten with the source bytes.
    pub fn read_pod<T>(&mut self) -> Result<T, Error>
    where
        T: Pod,
    {
        let bytes = self.read_bytes(size_of::<T>())?;
        let mut res = T::zeroed();
        bytemuck::bytes_of_mut(&mut res).copy_from_slice(bytes);

        Ok(res)
    }

    /// Reads bytes up to and including a NUL terminator, returning the text before it.
    pub fn read_string(&mut self) -> Result<String, Error> {
        let window = &self.data[self.position..self.end.min(self.data.len())];
        let len = window
            .iter()
            .position(|&byte| byte == 0)
            .ok_or(Error::OutOfBounds {
                position: self.position,
                requested: window.len() + 1,
                end: self.end,
            })?;
        let bytes = self.read_bytes(len + 1)?;

        Ok(String::from_utf8_lossy(&bytes[..len]).into_owned())
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        let bytes = self.read_bytes(2)?;

        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        let bytes = self.read_bytes(4)?;

        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Bytes left between the current position and the end of the window.
    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.position)
    }

    /// Moves the cursor. `Start` offsets are absolute source offsets; the result must stay inside
    /// the window, and an `End` offset may not be positive nor reach back past the window start.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<usize, Error> {
        let target = match pos {
            SeekFrom::Start(offset) => i64::try_from(offset).unwrap_or(i64::MAX),
            SeekFrom::Current(offset) => self.position as i64 + offset,
            SeekFrom::End(offset) => {
                if offset > 0 || offset.unsigned_abs() > self.len() as u64 {
                    return Err(self.invalid_seek(self.end as i64 + offset));
                }

                self.end as i64 + offset
            }
        };

        if target < self.start as i64 || target > self.end as i64 {
            return Err(self.invalid_seek(target));
        }

        self.position = target as usize;

        Ok(self.position)
    }

    fn invalid_seek(&self, target: i64) -> Error {
        Error::InvalidSeek {
            target,
            start: self.start,
            end: self.end,
        }
    }

    /// Absolute offset of the first byte of the window.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Creates an independent cursor over `offset..offset + len` of the same source.
    ///
    /// The new window must lie inside this one; it starts positioned at `offset`.
    pub fn sub_window(&self, offset: usize, len: usize) -> Result<ByteCursor<'a>, Error> {
        let end = offset
            .checked_add(len)
            .filter(|&end| offset >= self.start && end <= self.end)
            .ok_or(Error::OutOfBounds {
                position: offset,
                requested: len,
                end: self.end,
            })?;

        Ok(Self {
            data: self.data,
            end,
            position: offset,
            start: offset,
        })
    }
}

/// Reads a fixed-width, NUL-padded text field.
pub(crate) fn fixed_str(bytes: &[u8]) -> String {
    let len = bytes
        .iter()
        .position(|&byte| byte == 0)
        .unwrap_or(bytes.len());

    String::from_utf8_lossy(&bytes[..len]).into_owned()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::chunk::Chunk,
        bytemuck::{Pod, Zeroable},
    };

    #[test]
    fn read_exactly_to_window_end() {
        let data = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut cursor = ByteCursor::new(&data).sub_window(4, 4).unwrap();

        assert_eq!(cursor.read_u32().unwrap(), u32::from_le_bytes([5, 6, 7, 8]));
        assert_eq!(cursor.remaining(), 0);
        assert!(!cursor.has_remaining());
    }

    #[test]
    fn read_past_window_end_does_not_advance() {
        let data = [0u8; 16];
        let mut cursor = ByteCursor::new(&data).sub_window(0, 4).unwrap();
        let mut buf = [0u8; 5];

        assert!(matches!(
            cursor.read(&mut buf),
            Err(Error::OutOfBounds {
                position: 0,
                requested: 5,
                end: 4
            })
        ));
        assert_eq!(cursor.remaining(), 4);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn sub_window_is_independent_of_parent() {
        let data = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let mut parent = ByteCursor::new(&data);
        parent.seek(SeekFrom::Start(6)).unwrap();

        let mut child = parent.sub_window(2, 3).unwrap();

        assert_eq!(child.position(), 2);
        assert_eq!(child.read_u8().unwrap(), 2);
        assert_eq!(parent.position(), 6);
        assert!(child.read_u32().is_err());
    }

    #[test]
    fn sub_window_cannot_outgrow_parent() {
        let data = [0u8; 8];
        let parent = ByteCursor::new(&data).sub_window(2, 4).unwrap();

        assert!(parent.sub_window(2, 5).is_err());
        assert!(parent.sub_window(1, 2).is_err());
        assert!(parent.sub_window(3, 3).is_ok());
    }

    #[test]
    fn seek_modes() {
        let data = [0u8; 32];
        let mut cursor = ByteCursor::new(&data).sub_window(8, 16).unwrap();

        assert_eq!(cursor.seek(SeekFrom::Start(12)).unwrap(), 12);
        assert_eq!(cursor.seek(SeekFrom::Current(4)).unwrap(), 16);
        assert_eq!(cursor.seek(SeekFrom::Current(-8)).unwrap(), 8);
        assert_eq!(cursor.seek(SeekFrom::End(0)).unwrap(), 24);
        assert_eq!(cursor.seek(SeekFrom::End(-16)).unwrap(), 8);
    }

    #[test]
    fn seek_outside_window_fails() {
        let data = [0u8; 32];
        let mut cursor = ByteCursor::new(&data).sub_window(8, 16).unwrap();

        assert!(matches!(
            cursor.seek(SeekFrom::Start(4)),
            Err(Error::InvalidSeek { .. })
        ));
        assert!(matches!(
            cursor.seek(SeekFrom::Start(25)),
            Err(Error::InvalidSeek { .. })
        ));
        assert!(matches!(
            cursor.seek(SeekFrom::Current(-1)),
            Err(Error::InvalidSeek { .. })
        ));
        assert!(matches!(
            cursor.seek(SeekFrom::End(1)),
            Err(Error::InvalidSeek { .. })
        ));
        assert!(matches!(
            cursor.seek(SeekFrom::End(-17)),
            Err(Error::InvalidSeek { .. })
        ));
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn read_string_stops_at_nul() {
        let data = b"hello\0world\0tail";
        let mut cursor = ByteCursor::new(data);

        assert_eq!(cursor.read_string().unwrap(), "hello");
        assert_eq!(cursor.read_string().unwrap(), "world");
        assert_eq!(cursor.position(), 12);
        assert!(cursor.read_string().is_err());
        assert_eq!(cursor.position(), 12);
    }

    #[test]
    fn read_pod_record() {
        #[repr(C, packed)]
        #[derive(Clone, Copy, Pod, Zeroable)]
        struct Record {
            tag: u8,
            value: u32,
        }

        let data = [7, 0x44, 0x33, 0x22, 0x11, 0xFF];
        let mut cursor = ByteCursor::new(&data);
        let record: Record = cursor.read_pod().unwrap();

        assert_eq!({ record.tag }, 7);
        assert_eq!({ record.value }, 0x1122_3344);
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn align_padding_shrinks_chunk() {
        let mut data = vec![];
        data.extend_from_slice(&PADDING_SENTINEL.to_le_bytes());
        data.extend_from_slice(&PADDING_SENTINEL.to_le_bytes());
        data.extend_from_slice(&42u32.to_le_bytes());

        let mut cursor = ByteCursor::new(&data);
        let mut chunk = Chunk::new(0x134900, 12, 0);

        assert_eq!(cursor.align_padding(&mut chunk), 8);
        assert_eq!(cursor.position(), 8);
        assert_eq!(chunk.offset, 8);
        assert_eq!(chunk.length, 4);
        assert_eq!(chunk.full_length, 12);
        assert_eq!(chunk.end_offset, 12);
        assert_eq!(cursor.read_u32().unwrap(), 42);
    }

    #[test]
    fn align_padding_is_idempotent() {
        let mut data = vec![];
        data.extend_from_slice(&PADDING_SENTINEL.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

        let mut cursor = ByteCursor::new(&data);
        let mut chunk = Chunk::new(0x134b01, 12, 0);

        cursor.align_padding(&mut chunk);

        let (offset, length, end_offset) = (chunk.offset, chunk.length, chunk.end_offset);

        assert_eq!(cursor.align_padding(&mut chunk), 0);
        assert_eq!(chunk.offset, offset);
        assert_eq!(chunk.length, length);
        assert_eq!(chunk.end_offset, end_offset);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn align_padding_stops_at_window_end() {
        let data = PADDING_SENTINEL.to_le_bytes();
        let mut cursor = ByteCursor::new(&data);
        let mut chunk = Chunk::new(0x134b01, 4, 0);

        assert_eq!(cursor.align_padding(&mut chunk), 4);
        assert_eq!(chunk.length, 0);
        assert!(!cursor.has_remaining());
    }

    #[test]
    fn fixed_str_trims_at_nul() {
        assert_eq!(fixed_str(b"abc\0\0\0"), "abc");
        assert_eq!(fixed_str(b"abc"), "abc");
        assert_eq!(fixed_str(b"\0abc"), "");
    }
}
