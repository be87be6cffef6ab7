use std::path::Path;

use tracing::debug;

use crate::data::idx::{read_images, read_labels, ImageBlock};
use crate::error::{HarnessError, Result};

/// Image height every dataset file must declare.
pub const IMAGE_ROWS: usize = 28;
/// Image width every dataset file must declare.
pub const IMAGE_COLS: usize = 28;

/// Read-only view of one image inside a [`Dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawImage<'a> {
    pixels: &'a [u8],
    rows: usize,
    cols: usize,
}

impl<'a> RawImage<'a> {
    /// Wraps `pixels` as a `rows × cols` image. Returns `None` when the
    /// slice length does not match.
    pub fn new(pixels: &'a [u8], rows: usize, cols: usize) -> Option<Self> {
        (pixels.len() == rows * cols).then_some(RawImage { pixels, rows, cols })
    }

    /// Intensities in row-major order.
    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }
}

/// Images and labels of one IDX file pair.
///
/// Pixels live in a single contiguous buffer; sample `i` occupies
/// `pixels[i * rows * cols..(i + 1) * rows * cols]` and is paired with
/// `labels[i]`.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: usize,
    cols: usize,
    pixels: Vec<u8>,
    labels: Vec<u8>,
}

impl Dataset {
    /// Loads a matched image/label file pair of 28×28 images.
    pub fn load(images_path: impl AsRef<Path>, labels_path: impl AsRef<Path>) -> Result<Dataset> {
        let images_path = images_path.as_ref();
        let labels_path = labels_path.as_ref();

        let block = read_images(images_path, IMAGE_ROWS, IMAGE_COLS)?;
        let labels = read_labels(labels_path)?;
        let dataset = Dataset::from_parts(block, labels)?;

        debug!(
            images = %images_path.display(),
            labels = %labels_path.display(),
            samples = dataset.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Pairs a decoded image block with its labels.
    pub fn from_parts(block: ImageBlock, labels: Vec<u8>) -> Result<Dataset> {
        if block.count != labels.len() {
            return Err(HarnessError::CountMismatch {
                images: block.count,
                labels: labels.len(),
            });
        }
        Ok(Dataset {
            rows: block.rows,
            cols: block.cols,
            pixels: block.pixels,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn pixel_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Image of sample `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn image(&self, index: usize) -> RawImage<'_> {
        let size = self.pixel_count();
        RawImage {
            pixels: &self.pixels[index * size..(index + 1) * size],
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Label of sample `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn label(&self, index: usize) -> u8 {
        self.labels[index]
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// `(image, label)` pairs in file order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (RawImage<'_>, u8)> + '_ {
        (0..self.len()).map(move |i| (self.image(i), self.labels[i]))
    }
}
