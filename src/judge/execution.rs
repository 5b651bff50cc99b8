//! The per-submission execution object.
//!
//! An `Execution` owns one judged submission for its whole lifetime: the
//! materialized input files, the rendered sandbox definition, the limits,
//! and the workspace directory holding them all.

use crate::config::types::Result;
use crate::judge::policy::LanguagePolicy;
use crate::judge::workspace::Workspace;
use crate::judge::Language;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One uploaded file: its declared name plus raw content.
#[derive(Clone, Debug)]
pub struct SubmissionFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl SubmissionFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// A validated judging request. Immutable once constructed.
#[derive(Clone, Debug)]
pub struct Request {
    pub source_code: SubmissionFile,
    pub expected_output: SubmissionFile,
    pub input: Option<SubmissionFile>,
    /// Run-phase wall-clock limit, seconds.
    pub time_limit: u64,
    /// Sandbox memory cap, MB.
    pub memory_limit: u64,
    pub language: Language,
}

/// A submission bound to its language policy and workspace.
#[derive(Debug)]
pub struct Execution {
    id: String,
    image_name: String,
    policy: &'static LanguagePolicy,
    workspace: Workspace,
    source_file: PathBuf,
    expected_output_file: PathBuf,
    input_file: Option<PathBuf>,
    time_limit: u64,
    memory_limit: u64,
}

impl Execution {
    /// Materialize a request into a fresh workspace under `root`: write the
    /// renamed source, the expected output, the optional stdin payload, and
    /// the rendered sandbox definition file.
    pub fn new(root: &Path, request: Request, policy: &'static LanguagePolicy) -> Result<Self> {
        let id = Uuid::new_v4().to_string();
        let image_name = format!("judgebox-{}-{}", policy.language.tag(), id);
        let workspace = Workspace::create(root, &id)?;

        let source_name = policy.source_file_name(&request.source_code.file_name);
        let source_file = workspace.write_file(&source_name, &request.source_code.content)?;
        let expected_output_file = workspace.write_file(
            &request.expected_output.file_name,
            &request.expected_output.content,
        )?;
        let input_file = match &request.input {
            Some(input) => Some(workspace.write_file(&input.file_name, &input.content)?),
            None => None,
        };

        workspace.write_file("Dockerfile", dockerfile(policy, &source_name).as_bytes())?;

        Ok(Self {
            id,
            image_name,
            policy,
            workspace,
            source_file,
            expected_output_file,
            input_file,
            time_limit: request.time_limit,
            memory_limit: request.memory_limit,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn policy(&self) -> &'static LanguagePolicy {
        self.policy
    }

    pub fn workspace_dir(&self) -> &Path {
        self.workspace.dir()
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn input_file(&self) -> Option<&Path> {
        self.input_file.as_deref()
    }

    pub fn expected_output_file(&self) -> &Path {
        &self.expected_output_file
    }

    pub fn read_expected_output(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.expected_output_file)?)
    }

    pub fn time_limit(&self) -> u64 {
        self.time_limit
    }

    pub fn memory_limit(&self) -> u64 {
        self.memory_limit
    }
}

/// Render the sandbox definition for one submission. Only the source enters
/// the image; judge data (expected output, stdin payload) stays on the host.
fn dockerfile(policy: &LanguagePolicy, source_name: &str) -> String {
    let mut lines = vec![
        format!("FROM {}", policy.base_image),
        "WORKDIR /app".to_string(),
        format!("COPY {} ./", source_name),
    ];
    if let Some(compile) = policy.rendered_compile_command(source_name) {
        lines.push(format!("RUN {}", compile));
    }
    lines.push(format!("CMD {}", policy.rendered_run_command(source_name)));
    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::policy::LanguagePolicy;
    use std::path::PathBuf;

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("judgebox-exec-{}-{}", name, std::process::id()))
    }

    fn request(language: Language, source_name: &str) -> Request {
        Request {
            source_code: SubmissionFile::new(source_name, b"content".to_vec()),
            expected_output: SubmissionFile::new("expected.txt", b"Hello\n".to_vec()),
            input: Some(SubmissionFile::new("input.txt", b"1 2\n".to_vec())),
            time_limit: 10,
            memory_limit: 500,
            language,
        }
    }

    #[test]
    fn materializes_all_files() {
        let root = temp_root("materialize");
        let policy = LanguagePolicy::for_language(Language::Cpp);
        let execution = Execution::new(&root, request(Language::Cpp, "solution.cpp"), policy).unwrap();

        // C++ sources are renamed to the canonical filename.
        assert_eq!(execution.source_file().file_name().unwrap(), "main.cpp");
        assert!(execution.source_file().exists());
        assert!(execution.expected_output_file().exists());
        assert!(execution.input_file().unwrap().exists());
        assert!(execution.workspace_dir().join("Dockerfile").exists());
        assert_eq!(execution.read_expected_output().unwrap(), b"Hello\n");

        drop(execution);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn image_name_carries_language_and_id() {
        let root = temp_root("image-name");
        let policy = LanguagePolicy::for_language(Language::Java);
        let execution = Execution::new(&root, request(Language::Java, "Main.java"), policy).unwrap();

        assert!(execution.image_name().starts_with("judgebox-java-"));
        assert!(execution.image_name().ends_with(execution.id()));

        drop(execution);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn workspace_removed_on_drop() {
        let root = temp_root("drop");
        let policy = LanguagePolicy::for_language(Language::Python);
        let dir = {
            let execution =
                Execution::new(&root, request(Language::Python, "prog.py"), policy).unwrap();
            execution.workspace_dir().to_path_buf()
        };
        assert!(!dir.exists());
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn dockerfile_for_compiled_language() {
        let policy = LanguagePolicy::for_language(Language::C);
        let rendered = dockerfile(policy, "main.c");
        assert_eq!(
            rendered,
            "FROM gcc:12\nWORKDIR /app\nCOPY main.c ./\nRUN gcc -O2 -o main main.c\nCMD ./main\n"
        );
    }

    #[test]
    fn dockerfile_for_interpreted_language_has_no_compile_step() {
        let policy = LanguagePolicy::for_language(Language::Python);
        let rendered = dockerfile(policy, "prog.py");
        assert!(!rendered.contains("RUN "));
        assert!(rendered.contains("CMD python3 prog.py"));
    }
}
