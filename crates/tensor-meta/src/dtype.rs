// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor element data types, keyed by their TensorFlow enum codes.

use crate::TensorMetaError;

/// Enumerates the element types a saved-model tensor can declare.
///
/// The discriminants are the values of TensorFlow's `DataType` protobuf
/// enum, so a `DataType` round-trips through the wire encoding unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum DataType {
    /// 32-bit IEEE 754 floating point (`DT_FLOAT`).
    Float32 = 1,
    /// 64-bit IEEE 754 floating point (`DT_DOUBLE`).
    Float64 = 2,
    /// 32-bit signed integer.
    Int32 = 3,
    /// 8-bit unsigned integer (image pixels).
    UInt8 = 4,
    /// 16-bit signed integer.
    Int16 = 5,
    /// 8-bit signed integer (quantised weights).
    Int8 = 6,
    /// Variable-length byte string.
    String = 7,
    /// 64-bit signed integer.
    Int64 = 9,
    /// Boolean.
    Bool = 10,
    /// 16-bit brain floating point.
    BFloat16 = 14,
    /// 16-bit IEEE 754 floating point (`DT_HALF`).
    Float16 = 19,
}

impl DataType {
    /// Returns the TensorFlow enum code for this data type.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Parses a dtype name. Accepts numpy-style (`"float32"`) and short
    /// (`"f32"`) spellings, case-insensitively.
    pub fn from_name(s: &str) -> Result<Self, TensorMetaError> {
        match s.to_lowercase().as_str() {
            "float32" | "f32" | "float" => Ok(Self::Float32),
            "float64" | "f64" | "double" => Ok(Self::Float64),
            "int32" | "i32" => Ok(Self::Int32),
            "uint8" | "u8" => Ok(Self::UInt8),
            "int16" | "i16" => Ok(Self::Int16),
            "int8" | "i8" => Ok(Self::Int8),
            "string" => Ok(Self::String),
            "int64" | "i64" => Ok(Self::Int64),
            "bool" => Ok(Self::Bool),
            "bfloat16" | "bf16" => Ok(Self::BFloat16),
            "float16" | "f16" | "half" => Ok(Self::Float16),
            _ => Err(TensorMetaError::UnknownDTypeName(s.to_string())),
        }
    }

    /// Returns the size of a single element in bytes, or `None` for
    /// variable-length types.
    pub fn size_bytes(self) -> Option<usize> {
        match self {
            Self::Float64 | Self::Int64 => Some(8),
            Self::Float32 | Self::Int32 => Some(4),
            Self::Int16 | Self::BFloat16 | Self::Float16 => Some(2),
            Self::UInt8 | Self::Int8 | Self::Bool => Some(1),
            Self::String => None,
        }
    }

    /// Returns the canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Int32 => "int32",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::Int8 => "int8",
            Self::String => "string",
            Self::Int64 => "int64",
            Self::Bool => "bool",
            Self::BFloat16 => "bfloat16",
            Self::Float16 => "float16",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensorflow_codes() {
        assert_eq!(DataType::Float32.code(), 1);
        assert_eq!(DataType::Int64.code(), 9);
        assert_eq!(DataType::Float16.code(), 19);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(DataType::from_name("F32").unwrap(), DataType::Float32);
        assert_eq!(DataType::from_name("half").unwrap(), DataType::Float16);
        assert!(DataType::from_name("complex128").is_err());
    }

    #[test]
    fn test_size_bytes() {
        assert_eq!(DataType::Float32.size_bytes(), Some(4));
        assert_eq!(DataType::BFloat16.size_bytes(), Some(2));
        assert_eq!(DataType::String.size_bytes(), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&DataType::Float32).unwrap();
        assert_eq!(json, "\"float32\"");
    }
}
