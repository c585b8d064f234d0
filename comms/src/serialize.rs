use std::io;

use bytes::BufMut;

/// A value that can be written in its wire form.
pub trait Serialize {
    /// Appends the encoded value to `buf`.
    ///
    /// # Returns
    /// An `io::Error` if the value can't be represented on the wire.
    fn serialize<B: BufMut>(&self, buf: &mut B) -> io::Result<()>;
}
