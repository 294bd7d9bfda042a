//! Bounds-checked big-endian reading primitives for class file parsing.
//!
//! Class files are big-endian throughout. These helpers read at a tracked offset and
//! advance it, returning [`crate::Error::OutOfBounds`] instead of panicking when the
//! input is truncated.

use crate::Result;

/// Read a `u8` at `offset`, advancing it.
///
/// # Errors
/// [`crate::Error::OutOfBounds`] when fewer than 1 byte remains.
pub(crate) fn read_u8_at(data: &[u8], offset: &mut usize) -> Result<u8> {
    let value = *data.get(*offset).ok_or(crate::Error::OutOfBounds)?;
    *offset += 1;
    Ok(value)
}

/// Read a big-endian `u16` at `offset`, advancing it.
///
/// # Errors
/// [`crate::Error::OutOfBounds`] when fewer than 2 bytes remain.
pub(crate) fn read_u16_at(data: &[u8], offset: &mut usize) -> Result<u16> {
    let bytes: [u8; 2] = data
        .get(*offset..*offset + 2)
        .ok_or(crate::Error::OutOfBounds)?
        .try_into()
        .map_err(|_| crate::Error::OutOfBounds)?;
    *offset += 2;
    Ok(u16::from_be_bytes(bytes))
}

/// Read a big-endian `u32` at `offset`, advancing it.
///
/// # Errors
/// [`crate::Error::OutOfBounds`] when fewer than 4 bytes remain.
pub(crate) fn read_u32_at(data: &[u8], offset: &mut usize) -> Result<u32> {
    let bytes: [u8; 4] = data
        .get(*offset..*offset + 4)
        .ok_or(crate::Error::OutOfBounds)?
        .try_into()
        .map_err(|_| crate::Error::OutOfBounds)?;
    *offset += 4;
    Ok(u32::from_be_bytes(bytes))
}

/// Take `len` bytes at `offset`, advancing it.
///
/// # Errors
/// [`crate::Error::OutOfBounds`] when fewer than `len` bytes remain.
pub(crate) fn read_bytes_at<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = offset.checked_add(len).ok_or(crate::Error::OutOfBounds)?;
    let slice = data.get(*offset..end).ok_or(crate::Error::OutOfBounds)?;
    *offset = end;
    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads_advance_offset() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut offset = 0;
        assert_eq!(read_u8_at(&data, &mut offset).unwrap(), 0x01);
        assert_eq!(read_u16_at(&data, &mut offset).unwrap(), 0x0203);
        assert_eq!(read_u32_at(&data, &mut offset).unwrap(), 0x0405_0607);
        assert_eq!(offset, 7);
    }

    #[test]
    fn test_out_of_bounds() {
        let data = [0x01];
        let mut offset = 0;
        assert!(read_u32_at(&data, &mut offset).is_err());
        // A failed read must not advance.
        assert_eq!(offset, 0);
    }
}
