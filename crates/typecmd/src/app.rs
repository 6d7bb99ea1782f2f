//! The dispatcher.
//!
//! One call to [`Application::launch`] runs one dispatch cycle: parse the
//! input, resolve the name, resolve the arity, convert the arguments, invoke
//! the command and report its exit code. Every failure ends in a diagnostic
//! and [`EXIT_FAILURE`]; nothing escapes as a panic.

use std::io::{self, Write};

use tracing::{debug, info};

use crate::command::Command;
use crate::error::{ConfigError, EXIT_FAILURE, EXIT_SUCCESS, InvocationError};
use crate::help;
use crate::registry::{CommandRegistry, RegistryBuilder};

/// The single argument that asks for help.
pub const HELP_TOKEN: &str = "?";

pub struct Application {
    name: Option<String>,
    description: Option<String>,
    registry: CommandRegistry,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::default()
    }

    /// Program name shown in the usage banner.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Run with the process arguments. `argv[0]` becomes the program name
    /// unless one was set.
    pub fn launch_env(&mut self) -> i32 {
        let mut argv = std::env::args();
        if let Some(program) = argv.next() {
            if self.name.is_none() {
                self.name = Some(program);
            }
        }
        let argv: Vec<String> = argv.collect();
        self.launch(&argv)
    }

    /// Run with `argv`, which excludes the program name, writing to the
    /// process's stdout and stderr.
    pub fn launch<S: AsRef<str>>(&self, argv: &[S]) -> i32 {
        let stdout = io::stdout();
        let stderr = io::stderr();
        let code = self.launch_with(argv, &mut stdout.lock(), &mut stderr.lock());
        let _ = io::stdout().flush();
        code
    }

    /// Run with `argv`, writing command output and help to `out` and
    /// diagnostics to `err`.
    pub fn launch_with<S: AsRef<str>>(
        &self,
        argv: &[S],
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> i32 {
        if let [only] = argv {
            if only.as_ref() == HELP_TOKEN {
                self.write_lines(out, &self.help_page());
                return EXIT_SUCCESS;
            }
        }

        match self.dispatch(argv, out) {
            Ok(code) => {
                info!(exit_code = code, "command completed");
                code
            }
            Err(e) => {
                debug!(category = %e.category(), context = %e.context(), "dispatch failed");
                self.report(&e, err);
                e.exit_code()
            }
        }
    }

    /// The dispatch cycle without help handling or diagnostics.
    pub fn dispatch<S: AsRef<str>>(&self, argv: &[S], out: &mut dyn Write) -> Result<i32, InvocationError> {
        let (name, args) = argv.split_first().ok_or(InvocationError::NoCommand)?;
        let name = name.as_ref();

        let command = self.registry.resolve(name, args.len())?;
        debug!(command = name, arity = args.len(), "resolved command");

        let bound = command.bind(args)?;
        command.invoke(&bound, out)
    }

    /// Full help page: usage banner, description and every command.
    pub fn help_page(&self) -> Vec<String> {
        help::render_page(
            self.name.as_deref(),
            self.description.as_deref(),
            &self.registry,
        )
    }

    /// The variants of one command.
    pub fn help_for(&self, name: &str) -> Vec<String> {
        help::render_help(&self.registry, Some(name))
    }

    fn report(&self, error: &InvocationError, err: &mut dyn Write) {
        match error {
            InvocationError::NoCommand => {
                self.write_lines(err, &self.help_page());
            }
            InvocationError::CommandNotFound { .. } => {
                let _ = writeln!(err, "{}", error);
                let _ = writeln!(err);
                self.write_lines(err, &self.help_page());
            }
            InvocationError::ArityMismatch { name, .. } => {
                let _ = writeln!(err, "{}", error);
                let _ = writeln!(err, "Supported:");
                self.write_lines(err, &self.help_for(name));
            }
            InvocationError::ConversionFailed { .. }
            | InvocationError::OperationFailed { .. }
            | InvocationError::OperationPanicked { .. } => {
                let _ = writeln!(err, "{}", error);
            }
        }
        let _ = err.flush();
    }

    fn write_lines(&self, target: &mut dyn Write, lines: &[String]) {
        for line in lines {
            let _ = writeln!(target, "{}", line);
        }
    }
}

#[derive(Default)]
pub struct ApplicationBuilder {
    name: Option<String>,
    description: Option<String>,
    commands: RegistryBuilder,
}

impl ApplicationBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// One line shown under the usage banner.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
        self
    }

    pub fn command(mut self, command: Command) -> Self {
        self.commands = self.commands.command(command);
        self
    }

    pub fn commands(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        self.commands = self.commands.commands(commands);
        self
    }

    pub fn build(self) -> Result<Application, ConfigError> {
        Ok(Application {
            name: self.name,
            description: self.description,
            registry: self.commands.build()?,
        })
    }

    /// Like [`Self::build`], but a configuration error ends the process.
    pub fn build_or_exit(self) -> Application {
        self.build().unwrap_or_else(|e| exit_on_config_error(e))
    }
}

/// Report a registration error and terminate.
pub fn exit_on_config_error(error: ConfigError) -> ! {
    let _ = writeln!(io::stderr(), "Implementation error: {}", error);
    std::process::exit(EXIT_FAILURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::TypeRegistry;

    fn app(commands: Vec<Command>) -> Application {
        Application::builder()
            .name("/opt/bin/smack_cpp_test")
            .commands(commands)
            .build()
            .unwrap()
    }

    fn add_int() -> Command {
        Command::builder("add_int")
            .param::<i32>()
            .param::<i32>()
            .action(|args, out| {
                writeln!(out, "{}", args.get::<i32>(0)? + args.get::<i32>(1)?)?;
                Ok(EXIT_SUCCESS)
            })
            .build(&TypeRegistry::with_primitives())
            .unwrap()
    }

    fn run(app: &Application, argv: &[&str]) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = app.launch_with(argv, &mut out, &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_add_int() {
        let (code, out, err) = run(&app(vec![add_int()]), &["add_int", "313", "100"]);
        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(out, "413\n");
        assert!(err.is_empty());
    }

    #[test]
    fn test_empty_input_prints_help_to_err() {
        let (code, out, err) = run(&app(vec![add_int()]), &[]);
        assert_eq!(code, EXIT_FAILURE);
        assert!(out.is_empty());
        assert_eq!(
            err,
            "Usage: smack_cpp_test COMMAND arguments\n\nCommands:\nadd_int int int\n"
        );
    }

    #[test]
    fn test_question_mark_prints_help_to_out() {
        let (code, out, err) = run(&app(vec![add_int()]), &["?"]);
        assert_eq!(code, EXIT_SUCCESS);
        assert!(out.starts_with("Usage: smack_cpp_test COMMAND arguments\n"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_question_mark_with_arguments_is_a_command_name() {
        let (code, _, err) = run(&app(vec![add_int()]), &["?", "x"]);
        assert_eq!(code, EXIT_FAILURE);
        assert!(err.starts_with("Unknown command '?'.\n"));
    }

    #[test]
    fn test_unknown_command() {
        let (code, _, err) = run(&app(vec![add_int()]), &["bogus", "hogus"]);
        assert_eq!(code, EXIT_FAILURE);
        let lines: Vec<&str> = err.lines().collect();
        assert_eq!(lines[0], "Unknown command 'bogus'.");
        assert_eq!(lines[1], "");
        assert!(lines.contains(&"add_int int int"));
    }

    #[test]
    fn test_arity_mismatch_lists_variants_only() {
        let other = Command::builder("other")
            .action(|_, _| Ok(0))
            .build(&TypeRegistry::with_primitives())
            .unwrap();
        let (code, _, err) = run(&app(vec![add_int(), other]), &["add_int", "1"]);
        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(
            err,
            "The command 'add_int' does not support 1 parameters.\nSupported:\nadd_int int int\n"
        );
    }

    #[test]
    fn test_conversion_failure() {
        let (code, out, err) = run(&app(vec![add_int()]), &["add_int", "1", "13x"]);
        assert_eq!(code, EXIT_FAILURE);
        assert!(out.is_empty());
        assert_eq!(err, "Conversion failed: Cannot convert '13x' to int.\n");
    }

    #[test]
    fn test_range_failure() {
        let cmd = Command::builder("byte")
            .param::<i8>()
            .action(|_, _| Ok(0))
            .build(&TypeRegistry::with_primitives())
            .unwrap();
        let (code, _, err) = run(&app(vec![cmd]), &["byte", "128"]);
        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(
            err,
            "Conversion failed: Value 128 must be in range [-128..127].\n"
        );
    }

    #[test]
    fn test_dispatch_errors() {
        let app = app(vec![add_int()]);
        let mut out = Vec::new();
        let empty: [&str; 0] = [];
        assert!(matches!(
            app.dispatch(&empty, &mut out),
            Err(InvocationError::NoCommand)
        ));
        assert_eq!(app.dispatch(&["add_int", "1", "2"], &mut out).unwrap(), 0);
    }

    #[test]
    fn test_names() {
        let mut app = Application::builder()
            .description("demo")
            .build()
            .unwrap();
        assert_eq!(app.name(), None);
        assert_eq!(app.description(), Some("demo"));
        app.set_name("tool");
        assert_eq!(app.name(), Some("tool"));
        assert!(app.registry().is_empty());
    }

    #[test]
    fn test_duplicate_command_is_config_error() {
        let result = Application::builder()
            .command(add_int())
            .command(add_int())
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::DuplicateCommand { arity: 2, .. })
        ));
    }
}
