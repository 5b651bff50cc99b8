//! Per-language build and run policies.
//!
//! All language variation lives in this data: base image, filename
//! convention, compile recipe, run command. The rest of the pipeline never
//! branches on the language.

use crate::judge::language::Language;
use std::path::Path;

/// How the uploaded source file is named inside the workspace.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SourceNaming {
    /// Keep the uploaded filename. Java class files must match their public
    /// class; Python accepts any name.
    Original,
    /// Rename to a fixed canonical filename on materialization.
    Fixed(&'static str),
}

/// Build/run policy for one language.
#[derive(Clone, Copy, Debug)]
pub struct LanguagePolicy {
    pub language: Language,
    pub display_name: &'static str,
    pub source_naming: SourceNaming,
    pub base_image: &'static str,
    /// Compile step template, `{source}`/`{stem}` placeholders. `None` for
    /// interpreted languages: their build is the copy alone.
    pub compile_command: Option<&'static str>,
    /// Run command template, same placeholders.
    pub run_command: &'static str,
    /// When true, compile failures surface in the build phase; when false
    /// they surface as runtime errors and are only visible in run stderr.
    pub requires_compilation: bool,
}

static JAVA: LanguagePolicy = LanguagePolicy {
    language: Language::Java,
    display_name: "Java",
    source_naming: SourceNaming::Original,
    base_image: "openjdk:17-jdk-slim",
    compile_command: Some("javac -encoding UTF-8 {source}"),
    run_command: "java {stem}",
    requires_compilation: true,
};

static PYTHON: LanguagePolicy = LanguagePolicy {
    language: Language::Python,
    display_name: "Python",
    source_naming: SourceNaming::Original,
    base_image: "python:3.11-slim",
    compile_command: None,
    run_command: "python3 {source}",
    requires_compilation: false,
};

static C: LanguagePolicy = LanguagePolicy {
    language: Language::C,
    display_name: "C",
    source_naming: SourceNaming::Fixed("main.c"),
    base_image: "gcc:12",
    compile_command: Some("gcc -O2 -o main {source}"),
    run_command: "./main",
    requires_compilation: true,
};

static CPP: LanguagePolicy = LanguagePolicy {
    language: Language::Cpp,
    display_name: "C++",
    source_naming: SourceNaming::Fixed("main.cpp"),
    base_image: "gcc:12",
    compile_command: Some("g++ -O2 -o main {source}"),
    run_command: "./main",
    requires_compilation: true,
};

static GO: LanguagePolicy = LanguagePolicy {
    language: Language::Go,
    display_name: "Go",
    source_naming: SourceNaming::Fixed("main.go"),
    base_image: "golang:1.21",
    compile_command: Some("go mod init sandbox && go build -o main {source}"),
    run_command: "./main",
    requires_compilation: true,
};

static CS: LanguagePolicy = LanguagePolicy {
    language: Language::Cs,
    display_name: "C#",
    source_naming: SourceNaming::Fixed("main.cs"),
    base_image: "mono:6",
    compile_command: Some("mcs -out:main.exe {source}"),
    run_command: "mono main.exe",
    requires_compilation: true,
};

impl LanguagePolicy {
    /// Built-in policy for a language.
    pub fn for_language(language: Language) -> &'static LanguagePolicy {
        match language {
            Language::Java => &JAVA,
            Language::Python => &PYTHON,
            Language::C => &C,
            Language::Cpp => &CPP,
            Language::Go => &GO,
            Language::Cs => &CS,
        }
    }

    /// Workspace filename for an uploaded source file.
    pub fn source_file_name(&self, uploaded: &str) -> String {
        match self.source_naming {
            SourceNaming::Original => uploaded.to_string(),
            SourceNaming::Fixed(name) => name.to_string(),
        }
    }

    pub fn rendered_compile_command(&self, source: &str) -> Option<String> {
        self.compile_command
            .map(|template| render(template, source))
    }

    pub fn rendered_run_command(&self, source: &str) -> String {
        render(self.run_command, source)
    }
}

/// Substitute `{source}` with the workspace filename and `{stem}` with the
/// filename minus its extension.
fn render(template: &str, source: &str) -> String {
    let stem = Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string());
    template.replace("{source}", source).replace("{stem}", &stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_has_a_policy() {
        for language in Language::ALL {
            let policy = LanguagePolicy::for_language(language);
            assert_eq!(policy.language, language);
            assert!(!policy.base_image.is_empty());
            assert_eq!(policy.requires_compilation, policy.compile_command.is_some());
        }
    }

    #[test]
    fn java_keeps_uploaded_name_and_runs_the_class() {
        let policy = LanguagePolicy::for_language(Language::Java);
        assert_eq!(policy.source_file_name("Solution.java"), "Solution.java");
        assert_eq!(
            policy.rendered_compile_command("Solution.java").unwrap(),
            "javac -encoding UTF-8 Solution.java"
        );
        assert_eq!(policy.rendered_run_command("Solution.java"), "java Solution");
    }

    #[test]
    fn c_renames_to_canonical_main() {
        let policy = LanguagePolicy::for_language(Language::C);
        assert_eq!(policy.source_file_name("whatever.c"), "main.c");
        assert_eq!(
            policy.rendered_compile_command("main.c").unwrap(),
            "gcc -O2 -o main main.c"
        );
        assert_eq!(policy.rendered_run_command("main.c"), "./main");
    }

    #[test]
    fn python_build_is_copy_only() {
        let policy = LanguagePolicy::for_language(Language::Python);
        assert!(policy.rendered_compile_command("prog.py").is_none());
        assert!(!policy.requires_compilation);
        assert_eq!(policy.rendered_run_command("prog.py"), "python3 prog.py");
    }

    #[test]
    fn render_handles_both_placeholders() {
        assert_eq!(render("java {stem}", "Main.java"), "java Main");
        assert_eq!(render("python3 {source}", "t.py"), "python3 t.py");
        assert_eq!(render("./main", "main.c"), "./main");
    }
}
