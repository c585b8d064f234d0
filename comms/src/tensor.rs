use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use bytes::{Buf, BufMut};

use crate::{Deserialize, Serialize};

type RankType = u32;
type DimType = u64;

/// Error returned when a tensor's shape doesn't describe the amount of values it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeErr {
    pub shape: Vec<usize>,
    pub len: usize,
}

impl Display for ShapeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tensor error: shape {:?} doesn't match {} values",
            self.shape, self.len
        )
    }
}

impl Error for ShapeErr {}

/// A dense, row major block of `f32` values with a shape.
///
/// A tensor with an empty shape is a scalar and holds exactly one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    values: Vec<f32>,
}

impl Tensor {
    /// Creates a new `Tensor`.
    ///
    /// # Arguments
    /// * `shape` - The dimensions of the tensor.
    /// * `values` - The flattened values.
    ///
    /// # Returns
    /// A new `Tensor` or a `ShapeErr` if the shape's volume isn't `values.len()`.
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> Result<Self, ShapeErr> {
        if shape.iter().product::<usize>() != values.len() {
            return Err(ShapeErr {
                shape,
                len: values.len(),
            });
        }

        Ok(Self { shape, values })
    }

    /// Creates a rank 0 tensor.
    pub fn scalar(value: f32) -> Self {
        Self {
            shape: Vec::new(),
            values: vec![value],
        }
    }

    /// Creates a rank 1 tensor holding `values`.
    pub fn vector(values: Vec<f32>) -> Self {
        Self {
            shape: vec![values.len()],
            values,
        }
    }

    /// Creates a tensor of the given shape filled with zeros.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            values: vec![0.; len],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Returns the amount of values in the tensor.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Tensor {
    fn serialize<B: BufMut>(&self, buf: &mut B) -> io::Result<()> {
        let rank = RankType::try_from(self.shape.len()).map_err(io::Error::other)?;
        buf.put_u32(rank);

        for &dim in &self.shape {
            buf.put_u64(dim as DimType);
        }

        buf.put_slice(bytemuck::cast_slice(&self.values));
        Ok(())
    }
}

impl Deserialize for Tensor {
    fn deserialize<B: Buf>(buf: &mut B) -> io::Result<Self> {
        let rank = take_u32(buf)? as usize;

        if buf.remaining() < rank.saturating_mul(size_of::<DimType>()) {
            return too_short(buf.remaining());
        }

        let mut shape = Vec::with_capacity(rank);
        let mut len = 1usize;

        for _ in 0..rank {
            let dim = usize::try_from(buf.get_u64()).map_err(invalid_data)?;
            len = len
                .checked_mul(dim)
                .ok_or_else(|| invalid_data("tensor volume overflows"))?;
            shape.push(dim);
        }

        let nbytes = len
            .checked_mul(size_of::<f32>())
            .ok_or_else(|| invalid_data("tensor volume overflows"))?;

        if buf.remaining() < nbytes {
            return too_short(buf.remaining());
        }

        // Values are written as raw native endian floats, see `Serialize` above.
        let values = (0..len).map(|_| buf.get_f32_ne()).collect();

        Ok(Self { shape, values })
    }
}

/// Reads a big endian `u32` making sure there are enough bytes left.
pub(crate) fn take_u32<B: Buf>(buf: &mut B) -> io::Result<u32> {
    if buf.remaining() < size_of::<u32>() {
        return too_short(buf.remaining());
    }

    Ok(buf.get_u32())
}

pub(crate) fn invalid_data<E>(err: E) -> io::Error
where
    E: Into<Box<dyn Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::InvalidData, err)
}

fn too_short<T>(remaining: usize) -> io::Result<T> {
    Err(invalid_data(format!(
        "unexpected end of payload, only {remaining} bytes left"
    )))
}
