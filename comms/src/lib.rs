mod deserialize;
pub mod msg;
mod protocol;
mod serialize;
pub mod specs;
mod tensor;

use std::io;

use bytes::{Bytes, BytesMut};

pub use deserialize::Deserialize;
pub use msg::{GradientBatch, ParameterSnapshot};
pub use serialize::Serialize;
pub use tensor::{ShapeErr, Tensor};

/// Serializes `value` into a freshly allocated byte buffer.
///
/// # Arguments
/// * `value` - A serializable object.
///
/// # Returns
/// The encoded bytes or an `io::Error` if the value can't be represented on the wire.
pub fn encode<T: Serialize>(value: &T) -> io::Result<Bytes> {
    let mut buf = BytesMut::new();
    value.serialize(&mut buf)?;
    Ok(buf.freeze())
}

/// Deserializes a `T` out of `buf`, the whole buffer must be consumed.
///
/// # Arguments
/// * `buf` - The encoded bytes.
///
/// # Returns
/// The decoded value or an `io::Error` of kind `InvalidData`.
pub fn decode<T: Deserialize>(mut buf: &[u8]) -> io::Result<T> {
    let value = T::deserialize(&mut buf)?;

    if !buf.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} trailing bytes after the payload", buf.len()),
        ));
    }

    Ok(value)
}
