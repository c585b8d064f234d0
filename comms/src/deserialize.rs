use std::io;

use bytes::Buf;

/// A value that can be read back from its wire form.
pub trait Deserialize: Sized {
    /// Reads a value from the front of `buf`, advancing it past the consumed bytes.
    ///
    /// # Returns
    /// The value or an `io::Error` of kind `InvalidData` if `buf` doesn't hold one.
    fn deserialize<B: Buf>(buf: &mut B) -> io::Result<Self>;
}
