pub mod threshold;

pub use threshold::{encode, encoded_len, EncodedInput, THRESHOLD};
