//! Pre-admission request validation.
//!
//! Runs before any workspace or sandbox work. A rejected request never
//! consumes an admission slot and never reaches the container engine.

use crate::config::settings::JudgeConfig;
use crate::config::types::{JudgeError, Result};
use crate::judge::Request;
use once_cell::sync::Lazy;
use regex::Regex;

/// Filenames that reach the sandbox are restricted to a safe shape.
pub const FILE_NAME_REGEX: &str = r"^[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+$";

static FILE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(FILE_NAME_REGEX).expect("file name pattern"));

pub fn validate(request: &Request, config: &JudgeConfig) -> Result<()> {
    check_file_name("source code", &request.source_code.file_name)?;
    check_file_name("expected output", &request.expected_output.file_name)?;
    if let Some(input) = &request.input {
        check_file_name("input", &input.file_name)?;
    }

    if request.time_limit < config.min_time_limit || request.time_limit > config.max_time_limit {
        return Err(JudgeError::Validation(format!(
            "Bad request, time limit must be between {} Sec and {} Sec, provided: {}",
            config.min_time_limit, config.max_time_limit, request.time_limit
        )));
    }

    if request.memory_limit < config.min_memory_limit
        || request.memory_limit > config.max_memory_limit
    {
        return Err(JudgeError::Validation(format!(
            "Bad request, memory limit must be between {} MB and {} MB, provided: {}",
            config.min_memory_limit, config.max_memory_limit, request.memory_limit
        )));
    }

    Ok(())
}

fn check_file_name(field: &str, file_name: &str) -> Result<()> {
    if FILE_NAME_PATTERN.is_match(file_name) {
        Ok(())
    } else {
        Err(JudgeError::Validation(format!(
            "Bad request, {} file must match the following regex {}",
            field, FILE_NAME_REGEX
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::{Language, SubmissionFile};

    fn request() -> Request {
        Request {
            source_code: SubmissionFile::new("Main.java", b"class Main {}".to_vec()),
            expected_output: SubmissionFile::new("expected.txt", b"ok\n".to_vec()),
            input: None,
            time_limit: 10,
            memory_limit: 500,
            language: Language::Java,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(validate(&request(), &JudgeConfig::default()).is_ok());
    }

    #[test]
    fn file_name_shapes() {
        for good in ["Main.java", "test_2.py", "my-prog.cpp", "a.b"] {
            assert!(FILE_NAME_PATTERN.is_match(good), "{} should match", good);
        }
        for bad in [
            "noextension",
            ".hidden",
            "trailingdot.",
            "two..dots",
            "../escape.c",
            "has space.c",
            "semi;colon.c",
            "",
        ] {
            assert!(!FILE_NAME_PATTERN.is_match(bad), "{} should not match", bad);
        }
    }

    #[test]
    fn bad_source_name_names_the_field() {
        let mut bad = request();
        bad.source_code.file_name = "../../etc/passwd".to_string();
        let message = validate(&bad, &JudgeConfig::default())
            .unwrap_err()
            .to_string();
        assert!(message.contains("source code file"));
    }

    #[test]
    fn bad_input_name_names_the_field() {
        let mut bad = request();
        bad.input = Some(SubmissionFile::new("in put.txt", b"".to_vec()));
        let message = validate(&bad, &JudgeConfig::default())
            .unwrap_err()
            .to_string();
        assert!(message.contains("input file"));
    }

    #[test]
    fn time_limit_bounds_enforced() {
        let config = JudgeConfig::default();

        let mut low = request();
        low.time_limit = 0;
        assert!(validate(&low, &config).is_err());

        let mut high = request();
        high.time_limit = config.max_time_limit + 1;
        let message = validate(&high, &config).unwrap_err().to_string();
        assert!(message.contains("time limit"));
        assert!(message.contains(&config.max_time_limit.to_string()));
    }

    #[test]
    fn memory_limit_bounds_enforced() {
        let config = JudgeConfig::default();
        let mut bad = request();
        bad.memory_limit = config.max_memory_limit + 1;
        let message = validate(&bad, &config).unwrap_err().to_string();
        assert!(message.contains("memory limit"));
    }
}
