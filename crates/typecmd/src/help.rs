//! Help text.
//!
//! Listings are sorted by command name, then by arity; the registry's
//! ordered maps provide that order directly.

use std::path::Path;

use crate::command::{Command, Parameter};
use crate::registry::CommandRegistry;

/// Indentation of a command's description line.
const DESCRIPTION_INDENT: &str = "    ";

/// `<name> <param> <param> ...`, plus an indented description line.
pub fn describe_command(name: &str, parameters: &[Parameter], description: Option<&str>) -> String {
    let mut line = String::from(name);
    for parameter in parameters {
        line.push(' ');
        line.push_str(&parameter.help_token());
    }
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        line.push('\n');
        line.push_str(DESCRIPTION_INDENT);
        line.push_str(description);
    }
    line
}

/// The per-command listing.
///
/// Without `focus` every command is listed; with it only the variants of
/// that name. An unknown focus name yields no lines.
pub fn render_help(registry: &CommandRegistry, focus: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    let commands: Box<dyn Iterator<Item = &Command>> = match focus {
        Some(name) => Box::new(registry.variants(name)),
        None => Box::new(registry.iter()),
    };
    for command in commands {
        lines.extend(command.help_line().lines().map(str::to_string));
    }
    lines
}

/// Usage banner, description and the full listing.
pub fn render_page(
    program: Option<&str>,
    description: Option<&str>,
    registry: &CommandRegistry,
) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(program) = program.filter(|p| !p.is_empty()) {
        lines.push(format!("Usage: {} COMMAND arguments", program_display_name(program)));
    }
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        lines.push(description.to_string());
    }
    lines.push(String::new());
    lines.push("Commands:".to_string());
    lines.extend(render_help(registry, None));
    lines
}

/// File name of `program` without directory or extension.
pub fn program_display_name(program: &str) -> String {
    Path::new(program)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}
