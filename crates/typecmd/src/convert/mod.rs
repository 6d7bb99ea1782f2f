//! String to typed-value conversion.
//!
//! Every value type a command can accept is described by a
//! [`TypeDescriptor`]: a display name plus a parser from raw text. The
//! built-in numeric, boolean and string types are covered by [`Primitive`];
//! anything else is added at startup through [`TypeRegistry::register_type`].

mod primitive;
mod registry;
mod value;

use thiserror::Error;

pub use primitive::Primitive;
pub use primitive::PrimitiveType;
pub use primitive::parse;
pub use registry::TypeDescriptor;
pub use registry::TypeRegistry;
pub use value::CustomValue;
pub use value::Value;

/// Why a raw argument could not be turned into a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Cannot convert '{raw}' to {type_name}.")]
    InvalidFormat { raw: String, type_name: String },

    #[error("Value {raw} must be in range [{min}..{max}].")]
    OutOfRange {
        raw: String,
        min: String,
        max: String,
        type_name: String,
    },
}

impl ConversionError {
    pub fn invalid_format(raw: impl Into<String>, type_name: impl Into<String>) -> Self {
        ConversionError::InvalidFormat {
            raw: raw.into(),
            type_name: type_name.into(),
        }
    }

    pub fn out_of_range(
        raw: impl Into<String>,
        min: impl ToString,
        max: impl ToString,
        type_name: impl Into<String>,
    ) -> Self {
        ConversionError::OutOfRange {
            raw: raw.into(),
            min: min.to_string(),
            max: max.to_string(),
            type_name: type_name.into(),
        }
    }

    /// The text that failed to convert.
    pub fn raw(&self) -> &str {
        match self {
            ConversionError::InvalidFormat { raw, .. } | ConversionError::OutOfRange { raw, .. } => {
                raw
            }
        }
    }

    /// Display name of the conversion target.
    pub fn type_name(&self) -> &str {
        match self {
            ConversionError::InvalidFormat { type_name, .. }
            | ConversionError::OutOfRange { type_name, .. } => type_name,
        }
    }
}
