//! The two payloads exchanged between the parameter server and its workers.

use std::{io, ops::Deref};

use bytes::{Buf, BufMut};

use crate::{
    Deserialize, Serialize, Tensor,
    protocol::{self, HeaderType},
    tensor::{invalid_data, take_u32},
};

/// The ordered view of every parameter of a model at a point in time.
///
/// The order is the enumeration order fixed when the model was built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSnapshot(Vec<Tensor>);

/// The gradients a worker computed, positionally aligned with a `ParameterSnapshot`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradientBatch(Vec<Tensor>);

macro_rules! tensor_list {
    ($name:ident, $header:expr) => {
        impl $name {
            pub fn new(tensors: Vec<Tensor>) -> Self {
                Self(tensors)
            }

            pub fn into_inner(self) -> Vec<Tensor> {
                self.0
            }
        }

        impl From<Vec<Tensor>> for $name {
            fn from(tensors: Vec<Tensor>) -> Self {
                Self(tensors)
            }
        }

        impl Deref for $name {
            type Target = [Tensor];

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl IntoIterator for $name {
            type Item = Tensor;
            type IntoIter = std::vec::IntoIter<Tensor>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl Serialize for $name {
            fn serialize<B: BufMut>(&self, buf: &mut B) -> io::Result<()> {
                serialize_tensors($header, &self.0, buf)
            }
        }

        impl Deserialize for $name {
            fn deserialize<B: Buf>(buf: &mut B) -> io::Result<Self> {
                deserialize_tensors($header, buf).map(Self)
            }
        }
    };
}

tensor_list!(ParameterSnapshot, protocol::PARAMS);
tensor_list!(GradientBatch, protocol::GRAD);

fn serialize_tensors<B>(header: HeaderType, tensors: &[Tensor], buf: &mut B) -> io::Result<()>
where
    B: BufMut,
{
    let count = u32::try_from(tensors.len()).map_err(io::Error::other)?;

    buf.put_u32(header);
    buf.put_u32(count);

    for tensor in tensors {
        tensor.serialize(buf)?;
    }

    Ok(())
}

fn deserialize_tensors<B: Buf>(expected: HeaderType, buf: &mut B) -> io::Result<Vec<Tensor>> {
    let header = take_u32(buf)?;
    if header != expected {
        return Err(invalid_data(format!(
            "Received an unexpected payload kind {header}, expected {expected}"
        )));
    }

    let count = take_u32(buf)? as usize;

    // Every tensor takes at least its rank, this bounds the preallocation.
    let mut tensors = Vec::with_capacity(count.min(buf.remaining() / protocol::HEADER_SIZE));
    for _ in 0..count {
        tensors.push(Tensor::deserialize(buf)?);
    }

    Ok(tensors)
}
