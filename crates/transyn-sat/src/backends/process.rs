//! SMT-LIB2 oracle backed by an external solver process.
//!
//! A fresh process is spawned per call so that each call gets its own
//! timeout flag. The full script is streamed over stdin and the model is
//! read back with a single `get-value` over every declared variable.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};

use thiserror::Error;
use tracing::debug;

use crate::backends::smtlib_printer::{constraints_to_script, quote_symbol};
use crate::constraints::ConstraintSet;
use crate::solver::{Assignment, OracleResponse, SatOracle};

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("solver I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("solver not found: {0}")]
    NotFound(String),
    #[error("solver error: {0}")]
    SolverError(String),
    #[error("Failed to parse solver output: {0}")]
    ParseError(String),
}

/// Command-line dialect of the solver binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    Z3,
    Cvc5,
}

#[derive(Debug, Clone)]
pub struct ProcessOracle {
    kind: SolverKind,
    command: String,
}

impl ProcessOracle {
    pub fn z3() -> Self {
        Self::with_command(SolverKind::Z3, "z3")
    }

    pub fn cvc5() -> Self {
        Self::with_command(SolverKind::Cvc5, "cvc5")
    }

    pub fn with_command(kind: SolverKind, command: impl Into<String>) -> Self {
        Self {
            kind,
            command: command.into(),
        }
    }

    pub fn kind(&self) -> SolverKind {
        self.kind
    }

    /// Command-line arguments for one call.
    pub fn args(&self, timeout_secs: Option<u64>) -> Vec<String> {
        match self.kind {
            SolverKind::Z3 => {
                let mut args = vec!["-in".to_string(), "-smt2".to_string()];
                if let Some(secs) = timeout_secs {
                    args.push(format!("-T:{secs}"));
                }
                args
            }
            SolverKind::Cvc5 => {
                let mut args = vec![
                    "--lang".to_string(),
                    "smt2".to_string(),
                    "--produce-models".to_string(),
                ];
                if let Some(secs) = timeout_secs {
                    args.push(format!("--tlimit={}", secs.saturating_mul(1000)));
                }
                args
            }
        }
    }
}

impl SatOracle for ProcessOracle {
    type Error = OracleError;

    fn solve(
        &mut self,
        constraints: &ConstraintSet,
        timeout_secs: Option<u64>,
    ) -> Result<OracleResponse, OracleError> {
        if timeout_secs == Some(0) {
            return Ok(OracleResponse::Timeout);
        }
        let mut session = SolverSession::spawn(&self.command, &self.args(timeout_secs))?;
        debug!(
            solver = %self.command,
            vars = constraints.var_count(),
            assertions = constraints.assertions.len(),
            "Sending constraints to solver"
        );
        session.send_command_no_response(&constraints_to_script(constraints))?;
        let verdict = session.send_command("(check-sat)")?;
        match verdict.as_str() {
            "sat" => {}
            "unsat" => return Ok(OracleResponse::Unsat),
            "unknown" | "timeout" => return Ok(OracleResponse::Timeout),
            other => return Err(OracleError::SolverError(other.to_string())),
        }
        if constraints.vars.is_empty() {
            return Ok(OracleResponse::Sat(Assignment::default()));
        }
        let names: Vec<String> = constraints.vars.iter().map(|v| quote_symbol(v)).collect();
        let response = session.send_command_sexpr(&format!("(get-value ({}))", names.join(" ")))?;
        let values = parse_value_list(&response)?;
        Ok(OracleResponse::Sat(values.into_iter().collect()))
    }

    fn name(&self) -> &str {
        &self.command
    }
}

struct SolverSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr: BufReader<ChildStderr>,
}

impl SolverSession {
    fn spawn(cmd: &str, args: &[String]) -> Result<Self, OracleError> {
        let mut child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| OracleError::NotFound(format!("{cmd}: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| OracleError::SolverError("failed to capture solver stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| OracleError::SolverError("failed to capture solver stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| OracleError::SolverError("failed to capture solver stderr".into()))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            stderr: BufReader::new(stderr),
        })
    }

    fn send_command_no_response(&mut self, cmd: &str) -> Result<(), OracleError> {
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn send_command(&mut self, cmd: &str) -> Result<String, OracleError> {
        self.send_command_no_response(cmd)?;
        let mut response = String::new();
        self.stdout.read_line(&mut response)?;
        if response.is_empty() {
            return Err(self.no_response(cmd));
        }
        Ok(response.trim().to_string())
    }

    /// Send `cmd` and read one balanced s-expression, possibly spanning
    /// several lines.
    fn send_command_sexpr(&mut self, cmd: &str) -> Result<String, OracleError> {
        self.send_command_no_response(cmd)?;
        let mut response = String::new();
        loop {
            let mut line = String::new();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(self.no_response(cmd));
            }
            response.push_str(&line);
            if paren_depth(&response) <= 0 && !response.trim().is_empty() {
                break;
            }
        }
        Ok(response.trim().to_string())
    }

    fn no_response(&mut self, cmd: &str) -> OracleError {
        let mut stderr = String::new();
        let _ = self.stderr.read_line(&mut stderr);
        let cmd = cmd.lines().next().unwrap_or(cmd);
        OracleError::SolverError(format!(
            "No response from solver for command `{cmd}`. stderr: {}",
            stderr.trim()
        ))
    }
}

impl Drop for SolverSession {
    fn drop(&mut self) {
        let _ = writeln!(self.stdin, "(exit)");
        let _ = self.stdin.flush();
        let _ = self.child.wait();
    }
}

fn paren_depth(text: &str) -> i64 {
    let mut depth = 0;
    let mut quoted = false;
    for ch in text.chars() {
        match ch {
            '|' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth -= 1,
            _ => {}
        }
    }
    depth
}

fn tokenize(response: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_quoted_symbol = false;
    for ch in response.trim().chars() {
        match ch {
            '(' | ')' if !in_quoted_symbol => {
                if !buf.is_empty() {
                    out.push(std::mem::take(&mut buf));
                }
            }
            '|' => {
                in_quoted_symbol = !in_quoted_symbol;
                if !in_quoted_symbol {
                    out.push(std::mem::take(&mut buf));
                }
            }
            c if c.is_whitespace() && !in_quoted_symbol => {
                if !buf.is_empty() {
                    out.push(std::mem::take(&mut buf));
                }
            }
            other => buf.push(other),
        }
    }
    if !buf.is_empty() {
        out.push(buf);
    }
    out
}

/// Parse a `get-value` response of the form `((a true) (b false))`.
fn parse_value_list(response: &str) -> Result<Vec<(String, bool)>, OracleError> {
    if response.starts_with("(error") {
        return Err(OracleError::SolverError(response.to_string()));
    }
    let tokens = tokenize(response);
    if tokens.len() % 2 != 0 {
        return Err(OracleError::ParseError(response.to_string()));
    }
    tokens
        .chunks(2)
        .map(|pair| match pair[1].as_str() {
            "true" => Ok((pair[0].clone(), true)),
            "false" => Ok((pair[0].clone(), false)),
            other => Err(OracleError::ParseError(format!(
                "unexpected value `{other}` for `{}`",
                pair[0]
            ))),
        })
        .collect()
}
