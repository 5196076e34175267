use crate::error::OriginAsError;
use log::debug;
use std::io::{BufRead, BufReader};

/// create a [BufRead] on heap from a given path to a local file.
///
/// Compression is detected from the file suffix by `oneio`, so `.gz` dumps are transparently
/// decompressed while anything else is read as-is.
pub(crate) fn get_reader(path: &str) -> Result<Box<dyn BufRead>, OriginAsError> {
    let raw_reader = oneio::get_reader(path).map_err(|e| OriginAsError::open_failed(path, e))?;
    debug!("opened {}", path);
    Ok(Box::new(BufReader::new(raw_reader)))
}

/// Read one line into `buf` as raw bytes, line terminator included.
///
/// Returns `false` at end of input. Dumps and query streams are ASCII in practice, so working on
/// bytes keeps fixed-column slicing safe even when a stray non-UTF-8 byte shows up.
pub(crate) fn read_line<R: BufRead + ?Sized>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<bool> {
    buf.clear();
    Ok(reader.read_until(b'\n', buf)? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_line() {
        let mut cursor = Cursor::new(b"first\nsecond".to_vec());
        let mut buf = vec![];
        assert!(read_line(&mut cursor, &mut buf).unwrap());
        assert_eq!(buf, b"first\n");
        assert!(read_line(&mut cursor, &mut buf).unwrap());
        assert_eq!(buf, b"second");
        assert!(!read_line(&mut cursor, &mut buf).unwrap());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_open_missing_file() {
        let err = get_reader("/nonexistent/bgp4.txt").err().unwrap();
        assert!(err.to_string().contains("/nonexistent/bgp4.txt"));
    }
}
