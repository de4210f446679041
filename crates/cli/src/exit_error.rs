// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! `main` maps every error path to an `ExitError` instead of calling
//! `std::process::exit()` mid-logic, so the process has exactly one exit
//! point.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<ck_core::ProjectError> for ExitError {
    fn from(err: ck_core::ProjectError) -> Self {
        Self::new(1, format!("cannot load project: {err}"))
    }
}

impl From<std::io::Error> for ExitError {
    fn from(err: std::io::Error) -> Self {
        Self::new(1, format!("{err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_carry_exit_code_one() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let exit_err: ExitError = io_err.into();
        assert_eq!(exit_err.code, 1);
        assert_eq!(exit_err.to_string(), "missing");
    }
}
