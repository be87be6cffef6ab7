use std::path::Path;

use crate::error::{DecodeError, HarnessError, Result};

/// Magic word of an IDX1 file of unsigned bytes (labels).
pub const LABEL_MAGIC: u32 = 0x0000_0801;
/// Magic word of an IDX3 file of unsigned bytes (images).
pub const IMAGE_MAGIC: u32 = 0x0000_0803;

/// Decoded contents of an IDX3 image file: `count` images of `rows × cols`
/// bytes stored back to back, each row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    pub count: usize,
    pub rows: usize,
    pub cols: usize,
    pub pixels: Vec<u8>,
}

/// Parses an IDX1 label file.
///
/// # Layout
/// ```text
/// bytes 0-3:  0x00000801  (magic)
/// bytes 4-7:  N           (number of labels)
/// bytes 8..:  N bytes, one category id each
/// ```
///
/// Header words are big-endian in the canonical format. Files written by a
/// little-endian host with native integers are accepted too: when the magic
/// does not match, every header word is byte-reversed and checked again.
pub fn parse_labels(bytes: &[u8]) -> std::result::Result<Vec<u8>, DecodeError> {
    let [_, count] = read_header::<2>(bytes, LABEL_MAGIC)?;
    let count = count as usize;

    let needed = 8_usize.saturating_add(count);
    if bytes.len() < needed {
        return Err(DecodeError::Truncated {
            what: "label data",
            needed,
            available: bytes.len(),
        });
    }

    Ok(bytes[8..needed].to_vec())
}

/// Parses an IDX3 image file whose images must be exactly
/// `expected_rows × expected_cols`.
///
/// # Layout
/// ```text
/// bytes  0-3:   0x00000803  (magic)
/// bytes  4-7:   N           (number of images)
/// bytes  8-11:  rows
/// bytes 12-15:  cols
/// bytes 16..:   N * rows * cols bytes, row-major
/// ```
pub fn parse_images(
    bytes: &[u8],
    expected_rows: usize,
    expected_cols: usize,
) -> std::result::Result<ImageBlock, DecodeError> {
    let [_, count, rows, cols] = read_header::<4>(bytes, IMAGE_MAGIC)?;
    let (count, rows, cols) = (count as usize, rows as usize, cols as usize);

    if rows != expected_rows || cols != expected_cols {
        return Err(DecodeError::BadDimensions {
            rows,
            cols,
            expected_rows,
            expected_cols,
        });
    }

    let needed = count
        .checked_mul(rows * cols)
        .and_then(|n| n.checked_add(16))
        .unwrap_or(usize::MAX);
    if bytes.len() < needed {
        return Err(DecodeError::Truncated {
            what: "image data",
            needed,
            available: bytes.len(),
        });
    }

    Ok(ImageBlock {
        count,
        rows,
        cols,
        pixels: bytes[16..needed].to_vec(),
    })
}

/// Reads and parses a label file from disk.
pub fn read_labels(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let bytes = read_file(path)?;
    parse_labels(&bytes).map_err(|source| HarnessError::Format {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and parses an image file from disk.
pub fn read_images(
    path: impl AsRef<Path>,
    expected_rows: usize,
    expected_cols: usize,
) -> Result<ImageBlock> {
    let path = path.as_ref();
    let bytes = read_file(path)?;
    parse_images(&bytes, expected_rows, expected_cols).map_err(|source| HarnessError::Format {
        path: path.to_path_buf(),
        source,
    })
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads `N` 32-bit header words, correcting the byte order if the magic
/// word only matches once reversed.
fn read_header<const N: usize>(
    bytes: &[u8],
    magic: u32,
) -> std::result::Result<[u32; N], DecodeError> {
    let needed = 4 * N;
    if bytes.len() < needed {
        return Err(DecodeError::Truncated {
            what: "header",
            needed,
            available: bytes.len(),
        });
    }

    let mut words = [0u32; N];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    if words[0] != magic {
        words.iter_mut().for_each(|w| *w = w.swap_bytes());
    }
    if words[0] != magic {
        return Err(DecodeError::BadMagic {
            expected: magic,
            found: words[0].swap_bytes(),
        });
    }

    Ok(words)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Builds an IDX file from header words and payload. `swapped` writes
    /// the header little-endian.
    pub(crate) fn idx_bytes(header: &[u32], payload: &[u8], swapped: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(header.len() * 4 + payload.len());
        for &word in header {
            if swapped {
                out.extend_from_slice(&word.to_le_bytes());
            } else {
                out.extend_from_slice(&word.to_be_bytes());
            }
        }
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn parses_label_scenario() {
        let bytes = idx_bytes(&[LABEL_MAGIC, 3], &[5, 2, 5], false);
        assert_eq!(parse_labels(&bytes).unwrap(), vec![5, 2, 5]);
    }

    #[test]
    fn parses_image_scenario_row_major() {
        let bytes = idx_bytes(&[IMAGE_MAGIC, 1, 2, 2], &[0, 255, 128, 50], false);
        let block = parse_images(&bytes, 2, 2).unwrap();
        assert_eq!(block.count, 1);
        assert_eq!((block.rows, block.cols), (2, 2));
        assert_eq!(block.pixels, vec![0, 255, 128, 50]);
    }

    #[test]
    fn swapped_header_decodes_like_canonical() {
        let payload: Vec<u8> = (0..18).collect();
        let canonical = idx_bytes(&[IMAGE_MAGIC, 2, 3, 3], &payload, false);
        let swapped = idx_bytes(&[IMAGE_MAGIC, 2, 3, 3], &payload, true);
        assert_eq!(
            parse_images(&canonical, 3, 3).unwrap(),
            parse_images(&swapped, 3, 3).unwrap()
        );
    }

    #[test]
    fn rejects_unknown_magic() {
        let bytes = idx_bytes(&[0x1F8B_0800, 1], &[0], false);
        assert_eq!(
            parse_labels(&bytes),
            Err(DecodeError::BadMagic {
                expected: LABEL_MAGIC,
                found: 0x1F8B_0800,
            })
        );
    }

    #[test]
    fn label_magic_is_not_accepted_for_images() {
        let bytes = idx_bytes(&[LABEL_MAGIC, 0, 28, 28], &[], false);
        assert!(matches!(
            parse_images(&bytes, 28, 28),
            Err(DecodeError::BadMagic { .. })
        ));
    }

    #[test]
    fn rejects_wrong_dimensions() {
        let bytes = idx_bytes(&[IMAGE_MAGIC, 1, 2, 2], &[0; 4], false);
        assert_eq!(
            parse_images(&bytes, 28, 28),
            Err(DecodeError::BadDimensions {
                rows: 2,
                cols: 2,
                expected_rows: 28,
                expected_cols: 28,
            })
        );
    }

    #[test]
    fn rejects_truncated_payloads() {
        let labels = idx_bytes(&[LABEL_MAGIC, 4], &[1, 2, 3], false);
        assert!(matches!(
            parse_labels(&labels),
            Err(DecodeError::Truncated { needed: 12, available: 11, .. })
        ));

        let images = idx_bytes(&[IMAGE_MAGIC, 2, 2, 2], &[0; 7], false);
        assert!(matches!(
            parse_images(&images, 2, 2),
            Err(DecodeError::Truncated { needed: 24, available: 23, .. })
        ));

        assert!(matches!(
            parse_labels(&[0, 0, 8]),
            Err(DecodeError::Truncated { what: "header", .. })
        ));
    }

    #[test]
    fn huge_declared_count_is_truncation_not_overflow() {
        let bytes = idx_bytes(&[IMAGE_MAGIC, u32::MAX, 28, 28], &[0; 16], false);
        assert!(matches!(
            parse_images(&bytes, 28, 28),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_labels("/nonexistent/labels-idx1-ubyte").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/labels-idx1-ubyte"));
        assert!(matches!(err, HarnessError::Io { .. }));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_labels_preserved_in_either_byte_order(
            labels in proptest::collection::vec(any::<u8>(), 0..300),
            swapped in any::<bool>(),
        ) {
            let bytes = idx_bytes(&[LABEL_MAGIC, labels.len() as u32], &labels, swapped);
            prop_assert_eq!(parse_labels(&bytes).unwrap(), labels);
        }

        #[test]
        fn prop_image_count_matches_header(count in 0usize..6, fill in any::<u8>()) {
            let payload = vec![fill; count * 4 * 3];
            let bytes = idx_bytes(&[IMAGE_MAGIC, count as u32, 4, 3], &payload, false);
            let block = parse_images(&bytes, 4, 3).unwrap();
            prop_assert_eq!(block.count, count);
            prop_assert_eq!(block.pixels.len(), count * 12);
        }
    }
}
