//! Tensor types.

use std::fmt;

/// Element type of a tensor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DType {
    Bool,
    Int8,
    Int32,
    Int64,
    Float16,
    Float32,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Bool => "bool",
            DType::Int8 => "int8",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float16 => "float16",
            DType::Float32 => "float32",
        };
        f.write_str(name)
    }
}

/// Type of a value flowing through the graph.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Type {
    /// Dense tensor with a static shape. A scalar has an empty shape.
    Tensor { shape: Vec<u64>, dtype: DType },
    Tuple(Vec<Type>),
}

impl Type {
    pub fn tensor(shape: impl Into<Vec<u64>>, dtype: DType) -> Self {
        Type::Tensor {
            shape: shape.into(),
            dtype,
        }
    }

    pub fn scalar(dtype: DType) -> Self {
        Type::Tensor {
            shape: Vec::new(),
            dtype,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Tensor { shape, dtype } => {
                f.write_str("Tensor[(")?;
                for (i, dim) in shape.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{dim}")?;
                }
                write!(f, "), {dtype}]")
            }
            Type::Tuple(fields) => {
                f.write_str("(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(")")
            }
        }
    }
}
