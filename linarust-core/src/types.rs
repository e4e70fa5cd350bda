/// Defines the possible data types for Tensor elements.
///
/// Every kernel preserves the element type of its input: a `C64` batch
/// factorizes into `C64` factors, with real-valued outputs (eigenvalues,
/// singular values) reported in the matching real type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit floating-point type.
    F32,
    /// 64-bit floating-point type.
    F64,
    /// Complex number made of two 32-bit floats.
    C64,
    /// Complex number made of two 64-bit floats.
    C128,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size_of(&self) -> usize {
        match self {
            DType::F32 => std::mem::size_of::<f32>(),
            DType::F64 => std::mem::size_of::<f64>(),
            DType::C64 => 2 * std::mem::size_of::<f32>(),
            DType::C128 => 2 * std::mem::size_of::<f64>(),
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, DType::C64 | DType::C128)
    }

    /// The real type with the same precision.
    pub fn to_real(&self) -> DType {
        match self {
            DType::F32 | DType::C64 => DType::F32,
            DType::F64 | DType::C128 => DType::F64,
        }
    }
}
