//! Mapping from container element types to XDMF number types.

use std::fmt;

use crate::container::NativeType;

/// XDMF `NumberType` attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Int,
    UInt,
    Float,
}

impl NumberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberKind::Int => "Int",
            NumberKind::UInt => "UInt",
            NumberKind::Float => "Float",
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// XDMF number type plus byte width (`Precision`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberType {
    pub kind: NumberKind,
    pub precision: u8,
}

impl NumberType {
    pub const fn new(kind: NumberKind, precision: u8) -> Self {
        Self { kind, precision }
    }
}

/// Map a native element type to its XDMF number type.
///
/// Only 32/64-bit integers and floats have a mapping; everything else
/// (8/16-bit integers, strings, enums, compounds, ...) returns `None`.
pub fn map_native_type(dtype: &NativeType) -> Option<NumberType> {
    let mapped = match dtype {
        NativeType::Int32 => NumberType::new(NumberKind::Int, 4),
        NativeType::Int64 => NumberType::new(NumberKind::Int, 8),
        NativeType::UInt32 => NumberType::new(NumberKind::UInt, 4),
        NativeType::UInt64 => NumberType::new(NumberKind::UInt, 8),
        NativeType::Float32 => NumberType::new(NumberKind::Float, 4),
        NativeType::Float64 => NumberType::new(NumberKind::Float, 8),
        _ => return None,
    };
    Some(mapped)
}
