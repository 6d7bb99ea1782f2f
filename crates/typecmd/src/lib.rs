#![deny(clippy::all)]

pub mod app;
pub mod binder;
pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod help;
pub mod localisation;
pub mod properties;
pub mod registry;
pub mod telemetry;

pub use app::Application;
pub use app::ApplicationBuilder;
pub use binder::Args;
pub use binder::BindError;
pub use command::ActionResult;
pub use command::Command;
pub use command::CommandBuilder;
pub use command::Parameter;
pub use config::TelemetryConfig;
pub use convert::ConversionError;
pub use convert::Primitive;
pub use convert::TypeDescriptor;
pub use convert::TypeRegistry;
pub use convert::Value;
pub use error::ArgError;
pub use error::ConfigError;
pub use error::EXIT_FAILURE;
pub use error::EXIT_SUCCESS;
pub use error::InvocationError;
pub use localisation::Locale;
pub use localisation::ResourceBundle;
pub use properties::Properties;
pub use registry::CommandRegistry;
pub use telemetry::init_tracing;
