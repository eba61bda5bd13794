use std::{io::Write, mem::size_of};

use binrw::{io::Cursor, BinReaderExt, BinResult, BinWriterExt};

use crate::error::{CursorError, CursorResult};

/// Sequential little-endian reader over a fixed byte buffer.
///
/// Every read checks the remaining length first and fails with
/// [`CursorError::OutOfBounds`] without moving the cursor.
#[derive(Clone)]
pub struct Reader<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }

    pub fn position(&self) -> usize {
        self.inner.position() as usize
    }

    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    pub fn seek(&mut self, position: usize) {
        self.inner.set_position(position as u64);
    }

    // No bounds check, an overrun is reported by the next read
    pub fn skip(&mut self, count: usize) {
        let position = self.inner.position().saturating_add(count as u64);
        self.inner.set_position(position);
    }

    /// Reads a record of `size` bytes through binrw.
    pub fn read_with<T>(
        &mut self,
        size: usize,
        read: impl FnOnce(&mut Cursor<&'a [u8]>) -> BinResult<T>,
    ) -> CursorResult<T> {
        let offset = self.ensure(size)?;
        read(&mut self.inner).map_err(|_| {
            self.inner.set_position(offset as u64);
            CursorError::OutOfBounds {
                offset,
                need: size,
                len: self.len(),
            }
        })
    }

    pub fn read_u8(&mut self) -> CursorResult<u8> {
        self.read_with(size_of::<u8>(), |c| c.read_le())
    }

    pub fn read_i8(&mut self) -> CursorResult<i8> {
        self.read_with(size_of::<i8>(), |c| c.read_le())
    }

    pub fn read_u16(&mut self) -> CursorResult<u16> {
        self.read_with(size_of::<u16>(), |c| c.read_le())
    }

    pub fn read_i16(&mut self) -> CursorResult<i16> {
        self.read_with(size_of::<i16>(), |c| c.read_le())
    }

    pub fn read_u32(&mut self) -> CursorResult<u32> {
        self.read_with(size_of::<u32>(), |c| c.read_le())
    }

    pub fn read_i32(&mut self) -> CursorResult<i32> {
        self.read_with(size_of::<i32>(), |c| c.read_le())
    }

    pub fn read_f32(&mut self) -> CursorResult<f32> {
        self.read_with(size_of::<f32>(), |c| c.read_le())
    }

    /// Borrows the next `count` bytes without copying them.
    pub fn read_bytes(&mut self, count: usize) -> CursorResult<&'a [u8]> {
        let offset = self.ensure(count)?;
        let data: &'a [u8] = *self.inner.get_ref();
        self.skip(count);
        Ok(&data[offset..offset + count])
    }

    pub fn read_magic(&mut self) -> CursorResult<[u8; 4]> {
        let mut magic = [0_u8; 4];
        magic.copy_from_slice(self.read_bytes(4)?);
        Ok(magic)
    }

    fn ensure(&self, count: usize) -> CursorResult<usize> {
        let offset = self.position();
        if count > self.remaining() {
            return Err(CursorError::OutOfBounds {
                offset,
                need: count,
                len: self.len(),
            });
        }
        Ok(offset)
    }
}

/// Sequential little-endian writer into a buffer whose capacity is fixed at
/// construction. Writing past the end fails instead of growing the buffer.
pub struct Writer {
    inner: Cursor<Box<[u8]>>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Cursor::new(vec![0_u8; capacity].into_boxed_slice()),
        }
    }

    pub fn position(&self) -> usize {
        self.inner.position() as usize
    }

    pub fn capacity(&self) -> usize {
        self.inner.get_ref().len()
    }

    pub fn remaining(&self) -> usize {
        self.capacity().saturating_sub(self.position())
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    pub fn seek(&mut self, position: usize) {
        self.inner.set_position(position as u64);
    }

    pub fn skip(&mut self, count: usize) {
        let position = self.inner.position().saturating_add(count as u64);
        self.inner.set_position(position);
    }

    fn write_with(
        &mut self,
        size: usize,
        write: impl FnOnce(&mut Cursor<Box<[u8]>>) -> BinResult<()>,
    ) -> CursorResult<()> {
        let offset = self.ensure(size)?;
        write(&mut self.inner).map_err(|_| {
            // Leave the cursor where it was, like a failed read does
            self.inner.set_position(offset as u64);
            CursorError::CapacityExceeded {
                offset,
                need: size,
                capacity: self.capacity(),
            }
        })
    }

    pub fn write_u8(&mut self, value: u8) -> CursorResult<()> {
        self.write_with(size_of::<u8>(), |c| c.write_le(&value))
    }

    pub fn write_i8(&mut self, value: i8) -> CursorResult<()> {
        self.write_with(size_of::<i8>(), |c| c.write_le(&value))
    }

    pub fn write_u16(&mut self, value: u16) -> CursorResult<()> {
        self.write_with(size_of::<u16>(), |c| c.write_le(&value))
    }

    pub fn write_i16(&mut self, value: i16) -> CursorResult<()> {
        self.write_with(size_of::<i16>(), |c| c.write_le(&value))
    }

    pub fn write_u32(&mut self, value: u32) -> CursorResult<()> {
        self.write_with(size_of::<u32>(), |c| c.write_le(&value))
    }

    pub fn write_i32(&mut self, value: i32) -> CursorResult<()> {
        self.write_with(size_of::<i32>(), |c| c.write_le(&value))
    }

    pub fn write_f32(&mut self, value: f32) -> CursorResult<()> {
        self.write_with(size_of::<f32>(), |c| c.write_le(&value))
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> CursorResult<()> {
        self.write_with(bytes.len(), |c| c.write_all(bytes).map_err(binrw::Error::Io))
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.inner.into_inner().into_vec()
    }

    fn ensure(&self, count: usize) -> CursorResult<usize> {
        let offset = self.position();
        if count > self.remaining() {
            return Err(CursorError::CapacityExceeded {
                offset,
                need: count,
                capacity: self.capacity(),
            });
        }
        Ok(offset)
    }
}
