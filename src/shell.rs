//! The external shell that evaluates recipes and resolves `$'...'` values.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::config::ShellConfig;
use crate::error::{Error, Result};

/// Evaluates shell source and returns what it printed.
///
/// Fails with [`Error::Syntax`] when the shell cannot parse the source and
/// [`Error::Evaluation`] when it exits non-zero or writes to stderr.
pub trait Shell {
    fn evaluate(&self, source: &str) -> Result<String>;
}

/// A real bash process per evaluation, with only `PATH` kept in its environment.
#[derive(Debug, Clone)]
pub struct Bash {
    program: String,
}

impl Bash {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(config.program.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for Bash {
    fn default() -> Self {
        Self::new("bash")
    }
}

impl Shell for Bash {
    fn evaluate(&self, source: &str) -> Result<String> {
        log::debug!("{}: evaluating {} bytes", self.program, source.len());

        let mut command = Command::new(&self.program);
        command
            .env_clear()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(path) = std::env::var_os("PATH") {
            command.env("PATH", path);
        }

        let mut child = command.spawn()?;
        // Feed stdin from a thread so a chatty script cannot fill the stdout
        // pipe while we are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.to_owned();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });
        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            // A shell that bails out early closes stdin; its exit status says why.
            if let Some(problem) = stdin_problem(writer.join()) {
                log::debug!("{}: script not fully written: {problem}", self.program);
            }
        }

        check_output(
            output.status.code().unwrap_or(-1),
            &output.stdout,
            &output.stderr,
        )
    }
}

/// Classify a finished shell run.
fn check_output(exit_code: i32, stdout: &[u8], stderr: &[u8]) -> Result<String> {
    let stderr = String::from_utf8_lossy(stderr);
    if exit_code == 2 || stderr.contains("syntax error") {
        let line = diagnostic_line(&stderr).unwrap_or(0);
        log::debug!("shell syntax error at line {line}: {}", stderr.trim());
        return Err(Error::syntax(stderr.trim(), "", line));
    }

    if exit_code != 0 || !stderr.is_empty() {
        return Err(Error::Evaluation {
            exit_code,
            stderr: stderr.into_owned(),
        });
    }

    Ok(String::from_utf8_lossy(stdout).into_owned())
}

/// Why feeding the script to stdin failed, if it did.
fn stdin_problem(joined: std::thread::Result<std::io::Result<()>>) -> Option<String> {
    match joined {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(_) => Some("writer thread panicked".into()),
    }
}

/// Line number from a bash diagnostic such as `bash: line 4: syntax error`.
fn diagnostic_line(stderr: &str) -> Option<usize> {
    let (_, rest) = stderr.split_once("line ")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bash_available() -> bool {
        Command::new("bash")
            .args(["-c", "true"])
            .status()
            .is_ok_and(|s| s.success())
    }

    #[test]
    fn clean_run_returns_stdout() {
        assert_eq!(check_output(0, b"hello", b"").unwrap(), "hello");
    }

    #[test]
    fn exit_two_is_syntax_error() {
        let err = check_output(
            2,
            b"",
            b"bash: line 4: syntax error: unexpected end of file\n",
        )
        .unwrap_err();
        match err {
            Error::Syntax { message, line, .. } => {
                assert_eq!(line, 4);
                assert!(message.contains("unexpected end of file"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn syntax_marker_wins_over_exit_code() {
        let err = check_output(1, b"", b"bash: line 2: syntax error near `then'").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, .. }));
    }

    #[test]
    fn stderr_output_is_evaluation_error() {
        let err = check_output(0, b"out", b"warning\n").unwrap_err();
        match err {
            Error::Evaluation { exit_code, stderr } => {
                assert_eq!(exit_code, 0);
                assert_eq!(stderr, "warning\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nonzero_exit_is_evaluation_error() {
        let err = check_output(1, b"", b"").unwrap_err();
        assert!(matches!(err, Error::Evaluation { exit_code: 1, .. }));
    }

    #[test]
    fn diagnostic_line_parsing() {
        assert_eq!(diagnostic_line("bash: line 12: x: command not found"), Some(12));
        assert_eq!(diagnostic_line("no line info"), None);
    }

    #[test]
    fn stdin_problems_are_reported() {
        assert_eq!(stdin_problem(Ok(Ok(()))), None);
        let broken = std::io::Error::from(std::io::ErrorKind::BrokenPipe);
        assert!(stdin_problem(Ok(Err(broken))).is_some());
        let panic: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(
            stdin_problem(Err(panic)).as_deref(),
            Some("writer thread panicked")
        );
    }

    #[test]
    fn shell_that_ignores_stdin_is_judged_by_exit_status() {
        if !Command::new("true").status().is_ok_and(|s| s.success()) {
            return;
        }
        let out = Bash::new("true").evaluate(&"x\n".repeat(1 << 20)).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn real_bash_evaluates() {
        if !bash_available() {
            return;
        }
        let out = Bash::default().evaluate("x=1\nprintf %s \"$x\"\n").unwrap();
        assert_eq!(out, "1");
    }

    #[test]
    fn real_bash_environment_is_cleared() {
        if !bash_available() {
            return;
        }
        let out = Bash::default()
            .evaluate("printf %s \"${HOME-unset}\"")
            .unwrap();
        assert_eq!(out, "unset");
    }

    #[test]
    fn real_bash_reports_syntax_errors() {
        if !bash_available() {
            return;
        }
        let err = Bash::default().evaluate("x=1\nif then\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, .. }), "{err:?}");
    }
}
