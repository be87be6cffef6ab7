pub mod idx;
pub mod dataset;

pub use dataset::{Dataset, RawImage, IMAGE_COLS, IMAGE_ROWS};
pub use idx::{parse_images, parse_labels, read_images, read_labels, ImageBlock};
