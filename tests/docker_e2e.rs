//! End-to-end scenarios against a real docker daemon.
//!
//! Ignored by default; run with `cargo test -- --ignored` on a host with
//! docker installed and the base images pulled.

use judgebox::config::JudgeConfig;
use judgebox::judge::{Language, Request, SubmissionFile};
use judgebox::observability::MetricsRegistry;
use judgebox::sandbox::docker::DockerEngine;
use judgebox::service::{JudgeReply, JudgeService};
use std::sync::Arc;

fn service(root: &tempfile::TempDir) -> JudgeService {
    let config = JudgeConfig {
        max_requests: 4,
        workspace_root: root.path().to_path_buf(),
        ..JudgeConfig::default()
    };
    let engine = Arc::new(DockerEngine::new(
        config.output_cap_bytes,
        config.build_budget,
    ));
    JudgeService::new(config, engine, Arc::new(MetricsRegistry::new())).unwrap()
}

fn judge(source_name: &str, source: &str, expected: &str, language: Language) -> JudgeReply {
    judge_with_limits(source_name, source, expected, language, 10, 500)
}

fn judge_with_limits(
    source_name: &str,
    source: &str,
    expected: &str,
    language: Language,
    time_limit: u64,
    memory_limit: u64,
) -> JudgeReply {
    let root = tempfile::tempdir().unwrap();
    let service = service(&root);
    service.judge(Request {
        source_code: SubmissionFile::new(source_name, source.as_bytes().to_vec()),
        expected_output: SubmissionFile::new("expected.txt", expected.as_bytes().to_vec()),
        input: None,
        time_limit,
        memory_limit,
        language,
    })
}

fn status(reply: JudgeReply) -> String {
    match reply {
        JudgeReply::Completed(response) => response.status,
        other => panic!("expected a completed judgment, got {:?}", other),
    }
}

#[test]
#[ignore = "requires a running docker daemon"]
fn java_hello_is_accepted() {
    let source = r#"
public class Main {
    public static void main(String[] args) {
        System.out.println("Hello");
    }
}
"#;
    assert_eq!(status(judge("Main.java", source, "Hello\n", Language::Java)), "Accepted");
}

#[test]
#[ignore = "requires a running docker daemon"]
fn infinite_loop_exceeds_time_limit() {
    let reply = judge_with_limits(
        "loop.py",
        "while True:\n    pass\n",
        "Hello\n",
        Language::Python,
        1,
        500,
    );
    assert_eq!(status(reply), "Time Limit Exceeded");
}

#[test]
#[ignore = "requires a running docker daemon"]
fn invalid_java_is_a_compilation_error() {
    let reply = judge(
        "Main.java",
        "public class Main { this does not compile",
        "Hello\n",
        Language::Java,
    );
    match reply {
        JudgeReply::Completed(response) => {
            assert_eq!(response.status, "Compilation Error");
            assert!(response.error.is_some());
        }
        other => panic!("expected a completed judgment, got {:?}", other),
    }
}

#[test]
#[ignore = "requires a running docker daemon"]
fn mismatched_output_is_a_wrong_answer() {
    let reply = judge(
        "prog.py",
        "print(\"World\")\n",
        "Hello\n",
        Language::Python,
    );
    match reply {
        JudgeReply::Completed(response) => {
            assert_eq!(response.status, "Wrong Answer");
            assert_eq!(response.output.as_deref(), Some("World"));
        }
        other => panic!("expected a completed judgment, got {:?}", other),
    }
}

#[test]
#[ignore = "requires a running docker daemon"]
fn uncaught_exception_is_a_runtime_error() {
    let reply = judge("crash.py", "raise RuntimeError(\"boom\")\n", "Hello\n", Language::Python);
    assert_eq!(status(reply), "Runtime Error");
}

#[test]
#[ignore = "requires a running docker daemon"]
fn progressive_allocation_runs_out_of_memory() {
    let source = "data = []\nwhile True:\n    data.append(bytearray(1024 * 1024))\n";
    let reply = judge_with_limits("hog.py", source, "Hello\n", Language::Python, 10, 16);
    assert_eq!(status(reply), "Out Of Memory");
}
