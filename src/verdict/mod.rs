//! Verdict model and classification.
//!
//! A judgment terminates in exactly one verdict. The classifier is a pure
//! function over the sandbox driver's signals plus the reference output;
//! `Response` is the JSON shape the HTTP collaborator serves verbatim.

pub mod classifier;

use serde::{Deserialize, Serialize};

/// Terminal classification of a submission.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    Accepted,
    WrongAnswer,
    CompilationError,
    RuntimeError,
    OutOfMemory,
    TimeLimitExceeded,
}

impl Verdict {
    /// Stable numeric code carried in the response body.
    pub fn status_code(self) -> i32 {
        match self {
            Verdict::Accepted => 100,
            Verdict::WrongAnswer => 200,
            Verdict::CompilationError => 300,
            Verdict::RuntimeError => 400,
            Verdict::OutOfMemory => 500,
            Verdict::TimeLimitExceeded => 600,
        }
    }

    pub fn status(self) -> &'static str {
        match self {
            Verdict::Accepted => "Accepted",
            Verdict::WrongAnswer => "Wrong Answer",
            Verdict::CompilationError => "Compilation Error",
            Verdict::RuntimeError => "Runtime Error",
            Verdict::OutOfMemory => "Out Of Memory",
            Verdict::TimeLimitExceeded => "Time Limit Exceeded",
        }
    }
}

/// The classifier's result: the verdict plus its payloads, before
/// serialization.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Judgment {
    pub verdict: Verdict,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl Judgment {
    pub fn bare(verdict: Verdict) -> Self {
        Self {
            verdict,
            output: None,
            error: None,
        }
    }

    pub fn with_output(verdict: Verdict, output: String) -> Self {
        Self {
            verdict,
            output: Some(output),
            error: None,
        }
    }

    pub fn with_error(verdict: Verdict, error: impl Into<String>) -> Self {
        Self {
            verdict,
            output: None,
            error: Some(error.into()),
        }
    }
}

/// Response body for one completed judgment.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: i32,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn new(verdict: Verdict, output: Option<String>, error: Option<String>) -> Self {
        Self {
            status_code: verdict.status_code(),
            status: verdict.status().to_string(),
            output,
            error,
        }
    }
}

impl From<Judgment> for Response {
    fn from(judgment: Judgment) -> Self {
        Response::new(judgment.verdict, judgment.output, judgment.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_frozen() {
        assert_eq!(Verdict::Accepted.status_code(), 100);
        assert_eq!(Verdict::WrongAnswer.status_code(), 200);
        assert_eq!(Verdict::CompilationError.status_code(), 300);
        assert_eq!(Verdict::RuntimeError.status_code(), 400);
        assert_eq!(Verdict::OutOfMemory.status_code(), 500);
        assert_eq!(Verdict::TimeLimitExceeded.status_code(), 600);
    }

    #[test]
    fn response_json_shape_is_frozen() {
        let response = Response::new(Verdict::Accepted, Some("Hello\n".to_string()), None);
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"statusCode":100,"status":"Accepted","output":"Hello\n"}"#
        );
    }

    #[test]
    fn absent_payloads_are_omitted() {
        let response = Response::new(Verdict::TimeLimitExceeded, None, None);
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"statusCode":600,"status":"Time Limit Exceeded"}"#);
    }
}
