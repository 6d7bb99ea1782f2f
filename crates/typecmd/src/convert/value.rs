use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A converted argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    UByte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Str(String),
    Custom(CustomValue),
}

impl Value {
    /// The payload as `dyn Any`, whatever the variant.
    pub fn as_any(&self) -> &dyn Any {
        match self {
            Value::Bool(v) => v,
            Value::Byte(v) => v,
            Value::UByte(v) => v,
            Value::Short(v) => v,
            Value::UShort(v) => v,
            Value::Int(v) => v,
            Value::UInt(v) => v,
            Value::Long(v) => v,
            Value::ULong(v) => v,
            Value::Float(v) => v,
            Value::Double(v) => v,
            Value::Str(v) => v,
            Value::Custom(v) => v.as_any(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::UByte(_) => "ubyte",
            Value::Short(_) => "short",
            Value::UShort(_) => "ushort",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Long(_) => "long",
            Value::ULong(_) => "ulong",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::Custom(v) => v.type_name(),
        }
    }
}

/// A value produced by a user-registered descriptor.
#[derive(Clone)]
pub struct CustomValue {
    type_name: Arc<str>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl CustomValue {
    pub fn new<T: Any + Send + Sync>(type_name: Arc<str>, value: T) -> Self {
        Self {
            type_name,
            inner: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn as_any(&self) -> &dyn Any {
        &*self.inner
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomValue({})", self.type_name)
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Point(f32, f32);

    #[test]
    fn test_downcast_primitive() {
        let value = Value::Int(313);
        assert_eq!(value.downcast_ref::<i32>(), Some(&313));
        assert_eq!(value.downcast_ref::<i64>(), None);
        assert_eq!(value.type_name(), "int");
    }

    #[test]
    fn test_downcast_custom() {
        let value = Value::Custom(CustomValue::new(Arc::from("point"), Point(1.0, 2.5)));
        assert_eq!(value.downcast_ref::<Point>(), Some(&Point(1.0, 2.5)));
        assert_eq!(value.downcast_ref::<String>(), None);
        assert_eq!(value.type_name(), "point");
        assert_eq!(format!("{:?}", value), "Custom(CustomValue(point))");
    }

    #[test]
    fn test_custom_clone_shares_payload() {
        let value = CustomValue::new(Arc::from("point"), Point(0.0, 0.0));
        let copy = value.clone();
        assert_eq!(value, copy);
        assert_ne!(value, CustomValue::new(Arc::from("point"), Point(0.0, 0.0)));
    }
}
