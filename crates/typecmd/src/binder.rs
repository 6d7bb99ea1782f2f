//! Positional conversion of raw arguments.

use std::any::{Any, type_name};

use thiserror::Error;
use tracing::trace;

use crate::convert::{ConversionError, TypeDescriptor, Value};
use crate::error::ArgError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("Wrong number of arguments: expected {expected}, got {supplied}.")]
    ArityMismatch { expected: usize, supplied: usize },

    #[error("argument {position} could not be converted to {}", .source.type_name())]
    Conversion {
        position: usize,
        #[source]
        source: ConversionError,
    },
}

/// Convert `raw` left to right using `descriptors`.
///
/// Stops at the first failure; nothing after the failing position is
/// converted.
pub fn bind<D, S>(descriptors: &[D], raw: &[S]) -> Result<Args, BindError>
where
    D: AsRef<TypeDescriptor>,
    S: AsRef<str>,
{
    if descriptors.len() != raw.len() {
        return Err(BindError::ArityMismatch {
            expected: descriptors.len(),
            supplied: raw.len(),
        });
    }

    let mut values = Vec::with_capacity(raw.len());
    for (position, (descriptor, text)) in descriptors.iter().zip(raw).enumerate() {
        let descriptor = descriptor.as_ref();
        let value = descriptor
            .parse(text.as_ref())
            .map_err(|source| BindError::Conversion { position, source })?;
        trace!(position, type_name = descriptor.name(), "bound argument");
        values.push(value);
    }

    Ok(Args { values })
}

/// Fully converted arguments, in parameter order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Borrow the value at `position` as `T`.
    pub fn get_ref<T: Any>(&self, position: usize) -> Result<&T, ArgError> {
        let value = self.values.get(position).ok_or(ArgError::Missing {
            position,
            len: self.values.len(),
        })?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| ArgError::TypeMismatch {
                position,
                expected: type_name::<T>(),
                actual: value.type_name().to_string(),
            })
    }

    /// Clone the value at `position` as `T`.
    pub fn get<T: Any + Clone>(&self, position: usize) -> Result<T, ArgError> {
        self.get_ref::<T>(position).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{Primitive, TypeRegistry};

    fn descriptors(kinds: &[Primitive]) -> Vec<TypeDescriptor> {
        kinds.iter().copied().map(TypeDescriptor::primitive).collect()
    }

    #[test]
    fn test_bind_converts_in_order() {
        let params = descriptors(&[Primitive::Int, Primitive::Double, Primitive::String]);
        let args = bind(&params, &["313", "3.1415", "micbinz"]).unwrap();

        assert_eq!(args.len(), 3);
        assert_eq!(args.get::<i32>(0), Ok(313));
        assert_eq!(args.get::<f64>(1), Ok(3.1415));
        assert_eq!(args.get::<String>(2), Ok("micbinz".to_string()));
    }

    #[test]
    fn test_bind_reports_first_failure_position() {
        let params = descriptors(&[Primitive::Int, Primitive::UByte, Primitive::Bool]);
        let err = bind(&params, &["1", "256", "nope"]).unwrap_err();

        match err {
            BindError::Conversion { position, source } => {
                assert_eq!(position, 1);
                assert_eq!(source.to_string(), "Value 256 must be in range [0..255].");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bind_stops_at_first_failure() {
        let mut types = TypeRegistry::with_primitives();
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = std::sync::Arc::clone(&calls);

        #[derive(Clone)]
        struct Probe;
        types
            .register_type("probe", move |_raw: &str| {
                seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(Probe)
            })
            .unwrap();

        let params = vec![
            types.descriptor::<i32>().unwrap().clone(),
            types.descriptor::<Probe>().unwrap().clone(),
        ];
        assert!(bind(&params, &["x", "anything"]).is_err());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_bind_rejects_wrong_count() {
        let params = descriptors(&[Primitive::Int]);
        assert_eq!(
            bind(&params, &["1", "2"]),
            Err(BindError::ArityMismatch {
                expected: 1,
                supplied: 2
            })
        );
    }

    #[test]
    fn test_bind_no_parameters() {
        let params: Vec<TypeDescriptor> = Vec::new();
        let raw: [&str; 0] = [];
        assert!(bind(&params, &raw).unwrap().is_empty());
    }

    #[test]
    fn test_bind_error_message_names_type() {
        let params = descriptors(&[Primitive::Float]);
        let err = bind(&params, &["abc"]).unwrap_err();
        assert_eq!(err.to_string(), "argument 0 could not be converted to float");
    }

    #[test]
    fn test_get_type_mismatch() {
        let args = Args::new(vec![Value::Int(1)]);
        match args.get::<String>(0) {
            Err(ArgError::TypeMismatch {
                position, actual, ..
            }) => {
                assert_eq!(position, 0);
                assert_eq!(actual, "int");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            args.get::<i32>(3),
            Err(ArgError::Missing { position: 3, len: 1 })
        );
        assert_eq!(args.get_ref::<i32>(0), Ok(&1));
        assert_eq!(args.value(0), Some(&Value::Int(1)));
    }
}
