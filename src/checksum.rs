// SPDX-License-Identifier: GPL-3.0-or-later

//! Boot-vector checksum. The word at offset 28 of the image holds the
//! two's-complement of the sum of the seven words before it, so that the
//! first eight words of a valid image add up to zero.

use std::error::Error;
use std::fmt;
use std::path::Path;
use anyhow::{Context, Result};
use bytes::{Buf, BufMut, BytesMut};

use crate::util;

pub const HEADER_WORDS: usize = 7;
pub const CHECKSUM_OFFSET: usize = HEADER_WORDS * 4;
pub const HEADER_SIZE: usize = CHECKSUM_OFFSET + 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumError {
    ImageTooShort { len: usize },
}

impl fmt::Display for ChecksumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumError::ImageTooShort { len } => {
                write!(f, "Image is {} bytes long, at least {} are needed", len, CHECKSUM_OFFSET)
            }
        }
    }
}

impl Error for ChecksumError {}

fn read_words<const N: usize>(image: &[u8]) -> Result<[u32; N], ChecksumError> {
    let mut buf = image.get(..N * 4)
        .ok_or(ChecksumError::ImageTooShort { len: image.len() })?;

    let mut words = [0u32; N];
    for word in &mut words {
        *word = buf.get_u32_le();
    }
    Ok(words)
}

pub fn vector_checksum(words: &[u32]) -> u32 {
    words.iter()
        .fold(0u32, |sum, w| sum.wrapping_add(*w))
        .wrapping_neg()
}

/// Returns a copy of `image` with the checksum slot rewritten, and the
/// checksum. An image shorter than the full header grows to `HEADER_SIZE`
/// bytes.
pub fn patch_image(image: &[u8]) -> Result<(Vec<u8>, u32), ChecksumError> {
    let words = read_words::<HEADER_WORDS>(image)?;
    let checksum = vector_checksum(&words);
    trace!("header={:08x?} checksum=0x{:08x}", words, checksum);

    let mut out = BytesMut::with_capacity(image.len().max(HEADER_SIZE));
    out.put_slice(&image[..CHECKSUM_OFFSET]);
    out.put_u32_le(checksum);
    out.put_slice(image.get(HEADER_SIZE..).unwrap_or(&[]));

    Ok((out.to_vec(), checksum))
}

pub fn verify_image(image: &[u8]) -> bool {
    read_words::<{ HEADER_WORDS + 1 }>(image)
        .map(|words| words.iter().fold(0u32, |sum, w| sum.wrapping_add(*w)) == 0)
        .unwrap_or(false)
}

/// Patches `src` into `dst`. Nothing is written if `src` can't be patched.
pub fn patch_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<u32> {
    let (src, dst) = (src.as_ref(), dst.as_ref());

    let image = util::read_file(src)?;
    let (patched, checksum) = patch_image(&image)
        .with_context(|| format!("Failed to patch {}", src.display()))?;

    std::fs::write(dst, &patched)
        .with_context(|| format!("Failed to write {}", dst.display()))?;

    info!("Wrote {} checksum=0x{:08x} size={}", dst.display(), checksum, patched.len());
    Ok(checksum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(words: &[u32], tail: &[u8]) -> Vec<u8> {
        let mut image = vec![];
        for w in words {
            image.extend_from_slice(&w.to_le_bytes());
        }
        image.extend_from_slice(tail);
        image
    }

    #[test]
    fn negated_sum() {
        assert_eq!(vector_checksum(&[1, 0, 0, 0, 0, 0, 0]), 0xFFFF_FFFF);
        assert_eq!(vector_checksum(&[0; 7]), 0);
        assert_eq!(vector_checksum(&[0xFFFF_FFFF, 1, 0, 0, 0, 0, 0]), 0);
    }

    #[test]
    fn patched_header_sums_to_zero() {
        let src = image(&[0x1000_8000, 0x0000_00C1, 0xDEAD_BEEF, 0x8000_0000, 0x8000_0001, 7, 3, 0x1234_5678], b"firmware");
        let (patched, _) = patch_image(&src).unwrap();

        assert!(verify_image(&patched));
        assert!(!verify_image(&src));
    }

    #[test]
    fn only_checksum_slot_changes() {
        let tail = (0..64u8).collect::<Vec<_>>();
        let src = image(&[1, 2, 3, 4, 5, 6, 7, 0xAAAA_AAAA], &tail);
        let (patched, _) = patch_image(&src).unwrap();

        assert_eq!(patched.len(), src.len());
        assert_eq!(&patched[..CHECKSUM_OFFSET], &src[..CHECKSUM_OFFSET]);
        assert_eq!(&patched[HEADER_SIZE..], &src[HEADER_SIZE..]);
        assert_eq!(&patched[CHECKSUM_OFFSET..HEADER_SIZE], &(-28i32 as u32).to_le_bytes());
    }

    #[test]
    fn short_header_grows() {
        let src = image(&[1, 0, 0, 0, 0, 0, 0], &[0xAB, 0xCD]);
        let (patched, checksum) = patch_image(&src).unwrap();

        assert_eq!(checksum, 0xFFFF_FFFF);
        assert_eq!(patched.len(), HEADER_SIZE);
        assert_eq!(&patched[CHECKSUM_OFFSET..], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn too_short() {
        assert_eq!(patch_image(&[0; 27]), Err(ChecksumError::ImageTooShort { len: 27 }));
        assert!(!verify_image(&[0; 31]));
    }
}
