#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use assert_cmd::Command;
use typecmd::Application;

pub fn typecmd_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("typecmd"))
}

/// Exit code, stdout and stderr of one in-process launch.
pub fn launch(app: &Application, argv: &[&str]) -> (i32, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = app.launch_with(argv, &mut out, &mut err);
    (
        code,
        String::from_utf8(out).expect("stdout is UTF-8"),
        String::from_utf8(err).expect("stderr is UTF-8"),
    )
}

pub fn write_file(dir: &Path, name: &str, text: &str) {
    let mut file = std::fs::File::create(dir.join(name)).expect("create fixture");
    file.write_all(text.as_bytes()).expect("write fixture");
}
