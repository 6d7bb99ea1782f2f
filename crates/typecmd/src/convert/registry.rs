use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{ConversionError, CustomValue, Primitive, Value};
use crate::error::ConfigError;

type CustomParser = Arc<dyn Fn(&str) -> Result<Value, ConversionError> + Send + Sync>;

#[derive(Clone)]
enum Parser {
    Primitive(Primitive),
    Custom(CustomParser),
}

/// Display name plus text parser for one value type.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: Arc<str>,
    type_id: TypeId,
    parser: Parser,
}

impl TypeDescriptor {
    pub fn primitive(kind: Primitive) -> Self {
        Self {
            name: Arc::from(kind.name()),
            type_id: kind.type_id(),
            parser: Parser::Primitive(kind),
        }
    }

    /// Describe a user type `T` parsed by `parse`.
    ///
    /// Composite types usually split the input and hand each part to
    /// [`super::parse`]:
    ///
    /// ```
    /// use typecmd::convert::{parse, ConversionError, TypeDescriptor};
    ///
    /// #[derive(Clone)]
    /// struct Point(f32, f32);
    ///
    /// let point = TypeDescriptor::custom("point", |raw: &str| {
    ///     let (x, y) = raw
    ///         .split_once(':')
    ///         .ok_or_else(|| ConversionError::invalid_format(raw, "point"))?;
    ///     Ok(Point(parse(x)?, parse(y)?))
    /// });
    /// assert_eq!(point.name(), "point");
    /// assert!(point.parse("1.0:2.5").is_ok());
    /// ```
    pub fn custom<T, F>(name: &str, parse: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&str) -> Result<T, ConversionError> + Send + Sync + 'static,
    {
        let name: Arc<str> = Arc::from(name);
        let value_name = Arc::clone(&name);
        Self {
            name,
            type_id: TypeId::of::<T>(),
            parser: Parser::Custom(Arc::new(move |raw| {
                parse(raw).map(|v| Value::Custom(CustomValue::new(Arc::clone(&value_name), v)))
            })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn parse(&self, raw: &str) -> Result<Value, ConversionError> {
        match &self.parser {
            Parser::Primitive(kind) => kind.parse(raw),
            Parser::Custom(parse) => parse(raw),
        }
    }
}

impl AsRef<TypeDescriptor> for TypeDescriptor {
    fn as_ref(&self) -> &TypeDescriptor {
        self
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field(
                "kind",
                &match self.parser {
                    Parser::Primitive(kind) => format!("{:?}", kind),
                    Parser::Custom(_) => "Custom".to_string(),
                },
            )
            .finish()
    }
}

/// Name used for types nobody registered.
pub const UNKNOWN_TYPE_NAME: &str = "unknown";

/// One descriptor per value type, filled during startup.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    descriptors: HashMap<TypeId, TypeDescriptor>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every [`Primitive`].
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        for kind in Primitive::ALL {
            registry
                .descriptors
                .insert(kind.type_id(), TypeDescriptor::primitive(kind));
        }
        registry
    }

    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<(), ConfigError> {
        if let Some(existing) = self.descriptors.get(&descriptor.type_id) {
            return Err(ConfigError::DuplicateType {
                name: descriptor.name().to_string(),
                existing: existing.name().to_string(),
            });
        }
        debug!(type_name = descriptor.name(), "registered type");
        self.descriptors.insert(descriptor.type_id, descriptor);
        Ok(())
    }

    /// Shorthand for [`TypeDescriptor::custom`] followed by [`Self::register`].
    pub fn register_type<T, F>(&mut self, name: &str, parse: F) -> Result<(), ConfigError>
    where
        T: Any + Send + Sync,
        F: Fn(&str) -> Result<T, ConversionError> + Send + Sync + 'static,
    {
        self.register(TypeDescriptor::custom(name, parse))
    }

    pub fn descriptor<T: Any>(&self) -> Option<&TypeDescriptor> {
        self.descriptor_by_id(TypeId::of::<T>())
    }

    pub fn descriptor_by_id(&self, type_id: TypeId) -> Option<&TypeDescriptor> {
        self.descriptors.get(&type_id)
    }

    pub fn name_of<T: Any>(&self) -> &str {
        self.descriptor::<T>()
            .map_or(UNKNOWN_TYPE_NAME, |descriptor| descriptor.name())
    }

    /// Parse `raw` into any registered `T`.
    pub fn parse<T: Any + Clone>(&self, raw: &str) -> Result<T, ConversionError> {
        let unknown = || ConversionError::invalid_format(raw, UNKNOWN_TYPE_NAME);
        let descriptor = self.descriptor::<T>().ok_or_else(unknown)?;
        let value = descriptor.parse(raw)?;
        value.downcast_ref::<T>().cloned().ok_or_else(unknown)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::parse;

    #[derive(Debug, Clone, PartialEq)]
    struct Pair(i32, i32);

    fn parse_pair(raw: &str) -> Result<Pair, ConversionError> {
        let (a, b) = raw
            .split_once(':')
            .ok_or_else(|| ConversionError::invalid_format(raw, "pair"))?;
        Ok(Pair(parse(a)?, parse(b)?))
    }

    #[test]
    fn test_primitive_names() {
        let types = TypeRegistry::with_primitives();
        assert_eq!(types.len(), Primitive::ALL.len());
        assert_eq!(types.name_of::<u8>(), "ubyte");
        assert_eq!(types.name_of::<i64>(), "long");
        assert_eq!(types.name_of::<String>(), "string");
        assert_eq!(types.name_of::<Pair>(), "unknown");
    }

    #[test]
    fn test_register_custom_type() {
        let mut types = TypeRegistry::with_primitives();
        types.register_type("pair", parse_pair).unwrap();

        assert_eq!(types.name_of::<Pair>(), "pair");
        assert_eq!(types.parse::<Pair>("212:313"), Ok(Pair(212, 313)));
    }

    #[test]
    fn test_custom_parse_reports_inner_failure() {
        let mut types = TypeRegistry::with_primitives();
        types.register_type("pair", parse_pair).unwrap();

        assert_eq!(
            types.parse::<Pair>("212").unwrap_err().to_string(),
            "Cannot convert '212' to pair."
        );
        assert_eq!(
            types.parse::<Pair>("212:x").unwrap_err().to_string(),
            "Cannot convert 'x' to int."
        );
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut types = TypeRegistry::with_primitives();
        let err = types
            .register_type("number", |raw: &str| parse::<i32>(raw))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateType { .. }));
        assert_eq!(types.name_of::<i32>(), "int");
    }

    #[test]
    fn test_parse_unregistered_type() {
        let types = TypeRegistry::new();
        assert!(types.is_empty());
        assert_eq!(
            types.parse::<i32>("1").unwrap_err().to_string(),
            "Cannot convert '1' to unknown."
        );
    }

    #[test]
    fn test_descriptor_parse_builds_custom_value() {
        let descriptor = TypeDescriptor::custom("pair", parse_pair);
        let value = descriptor.parse("1:2").unwrap();
        assert_eq!(value.type_name(), "pair");
        assert_eq!(value.downcast_ref::<Pair>(), Some(&Pair(1, 2)));
        assert_eq!(descriptor.type_id(), TypeId::of::<Pair>());
    }
}
