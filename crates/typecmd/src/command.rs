//! A named operation with typed parameters.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::debug;

use crate::binder::{self, Args, BindError};
use crate::convert::{TypeDescriptor, TypeRegistry};
use crate::error::{BoxError, ConfigError, InvocationError};
use crate::help;

/// What a command body returns: the exit code, or a failure message.
pub type ActionResult = Result<i32, BoxError>;

type Action = Arc<dyn Fn(&Args, &mut dyn Write) -> ActionResult + Send + Sync>;

/// One formal parameter of a command.
#[derive(Debug, Clone)]
pub struct Parameter {
    descriptor: TypeDescriptor,
    label: Option<String>,
}

impl Parameter {
    pub fn new(descriptor: TypeDescriptor, label: Option<String>) -> Self {
        Self { descriptor, label }
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// `label:type`, or just `type` without a label.
    pub fn help_token(&self) -> String {
        match &self.label {
            Some(label) => format!("{}:{}", label, self.descriptor.name()),
            None => self.descriptor.name().to_string(),
        }
    }
}

impl AsRef<TypeDescriptor> for Parameter {
    fn as_ref(&self) -> &TypeDescriptor {
        &self.descriptor
    }
}

/// An immutable command: name, parameters, body and help line.
#[derive(Clone)]
pub struct Command {
    name: String,
    parameters: Vec<Parameter>,
    description: Option<String>,
    action: Action,
    help_line: String,
}

impl Command {
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            description: None,
            params: Vec::new(),
            action: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The command's entry in the help listing. Contains a second, indented
    /// line when a description was given.
    pub fn help_line(&self) -> &str {
        &self.help_line
    }

    /// Convert `raw` into this command's parameter types.
    pub fn bind<S: AsRef<str>>(&self, raw: &[S]) -> Result<Args, InvocationError> {
        binder::bind(&self.parameters, raw).map_err(|e| match e {
            BindError::ArityMismatch { supplied, .. } => InvocationError::ArityMismatch {
                name: self.name.clone(),
                supplied,
            },
            BindError::Conversion { position, source } => InvocationError::ConversionFailed {
                command: self.name.clone(),
                position,
                source,
            },
        })
    }

    /// Run the body on already converted arguments.
    ///
    /// A body error becomes [`InvocationError::OperationFailed`]; a panic
    /// becomes [`InvocationError::OperationPanicked`].
    pub fn invoke(&self, args: &Args, out: &mut dyn Write) -> Result<i32, InvocationError> {
        debug!(command = %self.name, arity = self.arity(), "invoking command");

        let outcome = catch_silently(AssertUnwindSafe(|| (self.action)(args, out)));
        match outcome {
            Ok(Ok(code)) => Ok(code),
            Ok(Err(e)) => Err(InvocationError::OperationFailed {
                name: self.name.clone(),
                message: e.to_string(),
            }),
            Err(_) => Err(InvocationError::OperationPanicked {
                name: self.name.clone(),
            }),
        }
    }

    /// Bind and invoke. The body never runs if any argument fails to convert.
    pub fn call<S: AsRef<str>>(&self, raw: &[S], out: &mut dyn Write) -> Result<i32, InvocationError> {
        let args = self.bind(raw)?;
        self.invoke(&args, out)
    }
}

/// `catch_unwind` with the panic message routed to the log instead of
/// stderr. The previous hook is back in place when this returns.
fn catch_silently<F, R>(body: F) -> std::thread::Result<R>
where
    F: FnOnce() -> R + panic::UnwindSafe,
{
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        debug!(panic = %info, "command body panicked");
    }));
    let outcome = panic::catch_unwind(body);
    panic::set_hook(previous);
    outcome
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("arity", &self.arity())
            .field("help_line", &self.help_line)
            .finish_non_exhaustive()
    }
}

enum ParamSpec {
    Typed {
        type_id: TypeId,
        rust_name: &'static str,
        label: Option<String>,
    },
    Explicit(Parameter),
}

/// Collects a command's parts; [`CommandBuilder::build`] resolves the
/// parameter types against a [`TypeRegistry`].
pub struct CommandBuilder {
    name: String,
    description: Option<String>,
    params: Vec<ParamSpec>,
    action: Option<Action>,
}

impl CommandBuilder {
    /// Text shown on an indented line below the command in help output.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
        self
    }

    /// Append an unlabeled parameter of type `T`.
    pub fn param<T: Any>(mut self) -> Self {
        self.params.push(ParamSpec::Typed {
            type_id: TypeId::of::<T>(),
            rust_name: type_name::<T>(),
            label: None,
        });
        self
    }

    /// Append a parameter of type `T` shown as `label:type` in help.
    pub fn labeled<T: Any>(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.params.push(ParamSpec::Typed {
            type_id: TypeId::of::<T>(),
            rust_name: type_name::<T>(),
            label: (!label.is_empty()).then_some(label),
        });
        self
    }

    /// Append a parameter with an explicit descriptor.
    pub fn param_descriptor(mut self, descriptor: TypeDescriptor, label: Option<&str>) -> Self {
        self.params.push(ParamSpec::Explicit(Parameter::new(
            descriptor,
            label.filter(|l| !l.is_empty()).map(str::to_string),
        )));
        self
    }

    /// The body. It receives the converted arguments and the output writer.
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Args, &mut dyn Write) -> ActionResult + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    pub fn build(self, types: &TypeRegistry) -> Result<Command, ConfigError> {
        let action = self.action.ok_or_else(|| ConfigError::MissingAction {
            command: self.name.clone(),
        })?;

        let mut parameters = Vec::with_capacity(self.params.len());
        for param in self.params {
            let parameter = match param {
                ParamSpec::Typed {
                    type_id,
                    rust_name,
                    label,
                } => {
                    let descriptor = types.descriptor_by_id(type_id).ok_or_else(|| {
                        ConfigError::UnregisteredType {
                            command: self.name.clone(),
                            type_name: rust_name.to_string(),
                        }
                    })?;
                    Parameter::new(descriptor.clone(), label)
                }
                ParamSpec::Explicit(parameter) => parameter,
            };
            parameters.push(parameter);
        }

        let help_line = help::describe_command(&self.name, &parameters, self.description.as_deref());

        Ok(Command {
            name: self.name,
            parameters,
            description: self.description,
            action,
            help_line,
        })
    }
}
