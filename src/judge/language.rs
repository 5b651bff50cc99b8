use crate::config::types::JudgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported submission languages.
///
/// The set is closed at the type level; new languages enter through
/// `ExecutionRegistry::register`, keyed by an existing variant or added here
/// as a data change.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Python,
    C,
    Cpp,
    Go,
    Cs,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Java,
        Language::Python,
        Language::C,
        Language::Cpp,
        Language::Go,
        Language::Cs,
    ];

    /// Stable lowercase tag used in image names and log lines.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Python => "python",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Go => "go",
            Language::Cs => "cs",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = JudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "java" => Ok(Language::Java),
            "python" | "py" => Ok(Language::Python),
            "c" => Ok(Language::C),
            "cpp" | "c++" | "cxx" => Ok(Language::Cpp),
            "go" | "golang" => Ok(Language::Go),
            "cs" | "csharp" | "c#" => Ok(Language::Cs),
            other => Err(JudgeError::UnknownLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("py".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("c++".parse::<Language>().unwrap(), Language::Cpp);
        assert_eq!("golang".parse::<Language>().unwrap(), Language::Go);
        assert_eq!("JAVA".parse::<Language>().unwrap(), Language::Java);
    }

    #[test]
    fn rejects_unknown_language() {
        let err = "cobol".parse::<Language>().unwrap_err();
        assert!(matches!(err, JudgeError::UnknownLanguage(ref tag) if tag == "cobol"));
    }

    #[test]
    fn tag_round_trips_through_serde() {
        for language in Language::ALL {
            let json = serde_json::to_string(&language).unwrap();
            assert_eq!(json, format!("\"{}\"", language.tag()));
            let back: Language = serde_json::from_str(&json).unwrap();
            assert_eq!(back, language);
        }
    }
}
