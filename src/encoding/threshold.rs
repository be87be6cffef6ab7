use crate::data::RawImage;

/// Intensities at or above this value switch a pixel's "on" channel.
pub const THRESHOLD: u8 = 128;

/// Binary two-channel rendering of one image.
///
/// For pixel `p`, `bits[2p]` is the "on" channel and `bits[2p + 1]` the
/// "off" channel; exactly one of them is 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInput {
    bits: Vec<u8>,
}

impl EncodedInput {
    pub fn as_slice(&self) -> &[u8] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

/// Length of the encoding of an image with `pixel_count` pixels.
/// A recognizer fed by [`encode`] must be built with this input size.
pub fn encoded_len(pixel_count: usize) -> usize {
    2 * pixel_count
}

/// Thresholds `image` into complementary on/off channel pairs.
pub fn encode(image: &RawImage<'_>) -> EncodedInput {
    let mut bits = Vec::with_capacity(encoded_len(image.pixel_count()));
    for &intensity in image.pixels() {
        let on = u8::from(intensity >= THRESHOLD);
        bits.push(on);
        bits.push(1 - on);
    }
    EncodedInput { bits }
}
