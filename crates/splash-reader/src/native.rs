//! Conversions from netcdf/HDF5 library types to the engine's container model.

use std::sync::Once;

use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;
use splash_xdmf::{AttrValue, NativeType, ScalarValue};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when probing a group that
/// does not exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 0:
///   #000: ../../../src/H5G.c line 548 in H5Gopen2(): unable to open group
/// ```
///
/// This function disables that output by calling H5Eset_auto2 with null handlers.
/// It only needs to be called once per process, but is safe to call multiple times.
///
/// **Important**: Call this early in `main()`, before any container is opened.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Element type of a variable as seen by the engine.
pub fn native_type(vartype: &NcVariableType) -> NativeType {
    match vartype {
        NcVariableType::Int(int) => match int {
            IntType::I8 => NativeType::Int8,
            IntType::I16 => NativeType::Int16,
            IntType::I32 => NativeType::Int32,
            IntType::I64 => NativeType::Int64,
            IntType::U8 => NativeType::UInt8,
            IntType::U16 => NativeType::UInt16,
            IntType::U32 => NativeType::UInt32,
            IntType::U64 => NativeType::UInt64,
        },
        NcVariableType::Float(FloatType::F32) => NativeType::Float32,
        NcVariableType::Float(FloatType::F64) => NativeType::Float64,
        NcVariableType::Char => NativeType::Char,
        NcVariableType::String => NativeType::String,
        NcVariableType::Enum(_) => NativeType::Enum,
        NcVariableType::Compound(_) => NativeType::Compound,
        NcVariableType::Opaque(_) => NativeType::Opaque,
        NcVariableType::Vlen(_) => NativeType::Vlen,
    }
}

fn array<T>(values: Vec<T>, scalar: fn(T) -> ScalarValue) -> AttrValue {
    AttrValue::Array(values.into_iter().map(scalar).collect())
}

/// Attribute value as seen by the engine.
///
/// Single-element arrays stay arrays; the engine treats both shapes alike.
pub fn attribute_value(value: AttributeValue) -> AttrValue {
    match value {
        AttributeValue::Schar(v) => ScalarValue::I8(v).into(),
        AttributeValue::Short(v) => ScalarValue::I16(v).into(),
        AttributeValue::Int(v) => ScalarValue::I32(v).into(),
        AttributeValue::Longlong(v) => ScalarValue::I64(v).into(),
        AttributeValue::Uchar(v) => ScalarValue::U8(v).into(),
        AttributeValue::Ushort(v) => ScalarValue::U16(v).into(),
        AttributeValue::Uint(v) => ScalarValue::U32(v).into(),
        AttributeValue::Ulonglong(v) => ScalarValue::U64(v).into(),
        AttributeValue::Float(v) => ScalarValue::F32(v).into(),
        AttributeValue::Double(v) => ScalarValue::F64(v).into(),
        AttributeValue::Schars(v) => array(v, ScalarValue::I8),
        AttributeValue::Shorts(v) => array(v, ScalarValue::I16),
        AttributeValue::Ints(v) => array(v, ScalarValue::I32),
        AttributeValue::Longlongs(v) => array(v, ScalarValue::I64),
        AttributeValue::Uchars(v) => array(v, ScalarValue::U8),
        AttributeValue::Ushorts(v) => array(v, ScalarValue::U16),
        AttributeValue::Uints(v) => array(v, ScalarValue::U32),
        AttributeValue::Ulonglongs(v) => array(v, ScalarValue::U64),
        AttributeValue::Floats(v) => array(v, ScalarValue::F32),
        AttributeValue::Doubles(v) => array(v, ScalarValue::F64),
        AttributeValue::Str(s) => AttrValue::Text(s),
        AttributeValue::Strs(s) => AttrValue::TextArray(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_type_mapping() {
        assert_eq!(
            native_type(&NcVariableType::Float(FloatType::F32)),
            NativeType::Float32
        );
        assert_eq!(
            native_type(&NcVariableType::Int(IntType::U64)),
            NativeType::UInt64
        );
        assert_eq!(native_type(&NcVariableType::Int(IntType::I16)), NativeType::Int16);
        assert_eq!(native_type(&NcVariableType::String), NativeType::String);
    }

    #[test]
    fn test_attribute_value_mapping() {
        assert_eq!(
            attribute_value(AttributeValue::Int(20)),
            AttrValue::Scalar(ScalarValue::I32(20))
        );
        assert_eq!(
            attribute_value(AttributeValue::Doubles(vec![1.0, -2.0])),
            AttrValue::Array(vec![ScalarValue::F64(1.0), ScalarValue::F64(-2.0)])
        );
        assert_eq!(
            attribute_value(AttributeValue::Str("m".to_string())),
            AttrValue::Text("m".to_string())
        );
    }

    #[test]
    fn test_silence_is_idempotent() {
        silence_hdf5_errors();
        silence_hdf5_errors();
    }
}
