//! Fixed-size file splitting and merging
//!
//! A standalone pre/post-processing utility. It is deliberately not wired
//! into the transfer path: transfers move whole files, and reconstruction
//! here depends entirely on the caller knowing the part count.

use crate::{Error, Result};
use std::io::{Read, Write};
use std::path::Path;

/// Default part size: 16 KB
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Name of part `part_num` (1-based) inside the parts directory
pub fn chunk_file_name(part_num: usize) -> String {
    format!("chunk_{part_num:06}")
}

/// Split a file into sequentially numbered fixed-size parts.
///
/// Parts are written to `out_dir` as `chunk_000001`, `chunk_000002`, …;
/// the last part may be short. Returns the number of parts written.
pub fn split_file(path: &Path, chunk_size: usize, out_dir: &Path) -> Result<usize> {
    if chunk_size == 0 {
        return Err(Error::InvalidRequest("chunk size must be non-zero".to_string()));
    }

    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    std::fs::create_dir_all(out_dir)?;

    let mut buffer = vec![0u8; chunk_size];
    let mut part_num = 0usize;

    loop {
        let bytes_read = read_up_to(&mut reader, &mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        part_num += 1;
        let part_path = out_dir.join(chunk_file_name(part_num));
        let mut part = std::fs::File::create(&part_path)?;
        part.write_all(&buffer[..bytes_read])?;
    }

    Ok(part_num)
}

/// Merge `total_parts` numbered parts from `parts_dir` into one file, in
/// part order. A missing part is an error; nothing verifies content.
pub fn merge_chunks(out_path: &Path, parts_dir: &Path, total_parts: usize) -> Result<()> {
    let mut output = std::fs::File::create(out_path)?;

    for part_num in 1..=total_parts {
        let part_path = parts_dir.join(chunk_file_name(part_num));
        let mut part = std::fs::File::open(&part_path)
            .map_err(|_| Error::FileNotFound(part_path.display().to_string()))?;
        std::io::copy(&mut part, &mut output)?;
    }

    output.flush()?;
    Ok(())
}

/// Fill as much of `buf` as the stream allows; 0 only at EOF
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn round_trip(data: &[u8], chunk_size: usize) -> (usize, Vec<u8>) {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("input.bin");
        std::fs::write(&input, data).unwrap();

        let parts_dir = temp.path().join("parts");
        let parts = split_file(&input, chunk_size, &parts_dir).unwrap();

        let merged = temp.path().join("merged.bin");
        merge_chunks(&merged, &parts_dir, parts).unwrap();

        (parts, std::fs::read(&merged).unwrap())
    }

    #[test]
    fn test_round_trip_short_last_chunk() {
        // 1000 is not a multiple of 256: four full parts plus a short one
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        let (parts, merged) = round_trip(&data, 256);
        assert_eq!(parts, 4);
        assert_eq!(merged, data);
    }

    #[test]
    fn test_round_trip_file_smaller_than_chunk() {
        let data = b"tiny".to_vec();
        let (parts, merged) = round_trip(&data, 256);
        assert_eq!(parts, 1);
        assert_eq!(merged, data);
    }

    #[test]
    fn test_round_trip_exact_multiple() {
        let data = vec![0x5au8; 512];
        let (parts, merged) = round_trip(&data, 256);
        assert_eq!(parts, 2);
        assert_eq!(merged, data);
    }

    #[test]
    fn test_empty_file_produces_no_parts() {
        let (parts, merged) = round_trip(&[], 256);
        assert_eq!(parts, 0);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_merge_missing_part_fails() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out.bin");
        let err = merge_chunks(&out, temp.path(), 3).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("input.bin");
        std::fs::write(&input, b"data").unwrap();
        assert!(split_file(&input, 0, temp.path()).is_err());
    }
}
