use std::any::TypeId;
use std::num::IntErrorKind;

use super::ConversionError;
use super::Value;

/// The built-in value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Bool,
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    String,
}

impl Primitive {
    pub const ALL: [Primitive; 12] = [
        Primitive::Bool,
        Primitive::Byte,
        Primitive::UByte,
        Primitive::Short,
        Primitive::UShort,
        Primitive::Int,
        Primitive::UInt,
        Primitive::Long,
        Primitive::ULong,
        Primitive::Float,
        Primitive::Double,
        Primitive::String,
    ];

    /// Name shown in help text and conversion diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Byte => "byte",
            Primitive::UByte => "ubyte",
            Primitive::Short => "short",
            Primitive::UShort => "ushort",
            Primitive::Int => "int",
            Primitive::UInt => "uint",
            Primitive::Long => "long",
            Primitive::ULong => "ulong",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::String => "string",
        }
    }

    /// The Rust type this primitive converts to.
    pub fn type_id(self) -> TypeId {
        match self {
            Primitive::Bool => TypeId::of::<bool>(),
            Primitive::Byte => TypeId::of::<i8>(),
            Primitive::UByte => TypeId::of::<u8>(),
            Primitive::Short => TypeId::of::<i16>(),
            Primitive::UShort => TypeId::of::<u16>(),
            Primitive::Int => TypeId::of::<i32>(),
            Primitive::UInt => TypeId::of::<u32>(),
            Primitive::Long => TypeId::of::<i64>(),
            Primitive::ULong => TypeId::of::<u64>(),
            Primitive::Float => TypeId::of::<f32>(),
            Primitive::Double => TypeId::of::<f64>(),
            Primitive::String => TypeId::of::<String>(),
        }
    }

    pub fn parse(self, raw: &str) -> Result<Value, ConversionError> {
        match self {
            Primitive::Bool => parse::<bool>(raw).map(Value::Bool),
            Primitive::Byte => parse::<i8>(raw).map(Value::Byte),
            Primitive::UByte => parse::<u8>(raw).map(Value::UByte),
            Primitive::Short => parse::<i16>(raw).map(Value::Short),
            Primitive::UShort => parse::<u16>(raw).map(Value::UShort),
            Primitive::Int => parse::<i32>(raw).map(Value::Int),
            Primitive::UInt => parse::<u32>(raw).map(Value::UInt),
            Primitive::Long => parse::<i64>(raw).map(Value::Long),
            Primitive::ULong => parse::<u64>(raw).map(Value::ULong),
            Primitive::Float => parse::<f32>(raw).map(Value::Float),
            Primitive::Double => parse::<f64>(raw).map(Value::Double),
            Primitive::String => parse::<String>(raw).map(Value::Str),
        }
    }
}

/// Rust types backed by a [`Primitive`].
pub trait PrimitiveType: Clone + Send + Sync + 'static {
    const KIND: Primitive;

    fn parse_text(raw: &str) -> Result<Self, ConversionError>;
}

/// Typed parse of a built-in type.
///
/// Custom descriptors use this to convert the parts of composite input.
pub fn parse<T: PrimitiveType>(raw: &str) -> Result<T, ConversionError> {
    T::parse_text(raw)
}

enum WideError {
    Format,
    Overflow,
}

/// Integers accept a `0x` or `0b` prefix and must be consumed entirely.
fn parse_wide(raw: &str) -> Result<i128, WideError> {
    let (digits, radix) = if let Some(rest) = raw.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = raw.strip_prefix("0b") {
        (rest, 2)
    } else {
        (raw, 10)
    };

    if digits.starts_with('+') {
        return Err(WideError::Format);
    }

    i128::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => WideError::Overflow,
        _ => WideError::Format,
    })
}

macro_rules! integer_primitives {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl PrimitiveType for $ty {
            const KIND: Primitive = Primitive::$kind;

            fn parse_text(raw: &str) -> Result<Self, ConversionError> {
                let out_of_range = || {
                    ConversionError::out_of_range(raw, <$ty>::MIN, <$ty>::MAX, Self::KIND.name())
                };
                match parse_wide(raw) {
                    Ok(wide) => <$ty>::try_from(wide).map_err(|_| out_of_range()),
                    Err(WideError::Overflow) => Err(out_of_range()),
                    Err(WideError::Format) => {
                        Err(ConversionError::invalid_format(raw, Self::KIND.name()))
                    }
                }
            }
        }
    )*};
}

integer_primitives! {
    i8 => Byte,
    u8 => UByte,
    i16 => Short,
    u16 => UShort,
    i32 => Int,
    u32 => UInt,
    i64 => Long,
    u64 => ULong,
}

/// Whether the digits before any exponent are not all zero.
fn has_nonzero_mantissa(raw: &str) -> bool {
    raw.split(['e', 'E'])
        .next()
        .is_some_and(|mantissa| mantissa.bytes().any(|b| (b'1'..=b'9').contains(&b)))
}

macro_rules! float_primitives {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl PrimitiveType for $ty {
            const KIND: Primitive = Primitive::$kind;

            fn parse_text(raw: &str) -> Result<Self, ConversionError> {
                let invalid = || ConversionError::invalid_format(raw, Self::KIND.name());
                if raw.starts_with('+') {
                    return Err(invalid());
                }
                let value: $ty = raw.parse().map_err(|_| invalid())?;

                // A finite literal that overflowed to infinity or underflowed to zero.
                let overflowed = value.is_infinite() && !raw.to_ascii_lowercase().contains("inf");
                let underflowed = value == 0.0 && has_nonzero_mantissa(raw);
                if overflowed || underflowed {
                    return Err(ConversionError::out_of_range(
                        raw,
                        format!("{:e}", <$ty>::MIN),
                        format!("{:e}", <$ty>::MAX),
                        Self::KIND.name(),
                    ));
                }
                Ok(value)
            }
        }
    )*};
}

float_primitives! {
    f32 => Float,
    f64 => Double,
}

impl PrimitiveType for bool {
    const KIND: Primitive = Primitive::Bool;

    fn parse_text(raw: &str) -> Result<Self, ConversionError> {
        match raw {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ConversionError::invalid_format(raw, Self::KIND.name())),
        }
    }
}

impl PrimitiveType for String {
    const KIND: Primitive = Primitive::String;

    fn parse_text(raw: &str) -> Result<Self, ConversionError> {
        Ok(raw.to_string())
    }
}
