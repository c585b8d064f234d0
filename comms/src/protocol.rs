pub type HeaderType = u32;
pub const HEADER_SIZE: usize = size_of::<HeaderType>();

pub const GRAD: HeaderType = 2;
pub const PARAMS: HeaderType = 3;
