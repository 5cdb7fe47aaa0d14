//! Deterministic content splitting
//!
//! `split_content(content, n)` always yields exactly `n` fragments of
//! `ceil(len / n)` bytes each; trailing fragments may be shorter or empty.
//! Concatenating the fragments in order reproduces the input byte for byte.

use crate::error::{StowageError, StowageResult};
use bytes::Bytes;

pub fn split_content(content: &Bytes, num_chunks: usize) -> StowageResult<Vec<Bytes>> {
    if num_chunks == 0 {
        return Err(StowageError::validation(["num_chunks must be at least 1"]));
    }

    let len = content.len();
    let part_size = len.div_ceil(num_chunks);

    let fragments = (0..num_chunks)
        .map(|i| {
            let start = (i * part_size).min(len);
            let end = ((i + 1) * part_size).min(len);
            content.slice(start..end)
        })
        .collect();

    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk_is_whole_content() {
        let content = Bytes::from_static(b"abcdef");
        let parts = split_content(&content, 1).unwrap();
        assert_eq!(parts, vec![content]);
    }

    #[test]
    fn test_empty_content_single_chunk() {
        let parts = split_content(&Bytes::new(), 1).unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].is_empty());
    }

    #[test]
    fn test_last_fragment_is_shorter() {
        let content = Bytes::from_static(b"abcdefghij");
        let parts = split_content(&content, 3).unwrap();
        assert_eq!(parts, vec![
            Bytes::from_static(b"abcd"),
            Bytes::from_static(b"efgh"),
            Bytes::from_static(b"ij"),
        ]);
    }

    #[test]
    fn test_more_chunks_than_bytes() {
        let content = Bytes::from_static(b"ab");
        let parts = split_content(&content, 4).unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts.concat(), b"ab".to_vec());
    }

    #[test]
    fn test_zero_chunks_is_rejected() {
        let err = split_content(&Bytes::from_static(b"x"), 0).unwrap_err();
        assert!(err.validation_details().is_some());
    }
}
