/// Verdict classification: a pure, deterministic function over the sandbox
/// driver's evidence plus the reference output. First matching rule wins;
/// the ordering below is part of the contract.
use crate::sandbox::{BuildOutcome, RunOutcome};
use crate::verdict::{Judgment, Verdict};

/// SIGKILL exit used as the OOM fallback when the engine surfaces no
/// explicit memory-kill signal.
const OOM_EXIT_CODE: i32 = 137;

/// Classify one judged submission.
///
/// `run` is `None` exactly when the build failed. Ordering:
/// 1. build failed -> Compilation Error
/// 2. timed out -> Time Limit Exceeded
/// 3. memory-killed, or exit 137 without timeout -> Out Of Memory
/// 4. non-zero exit -> Runtime Error
/// 5. normalized stdout == normalized expected -> Accepted
/// 6. otherwise -> Wrong Answer
pub fn classify(build: &BuildOutcome, run: Option<&RunOutcome>, expected: &[u8]) -> Judgment {
    if !build.ok {
        return Judgment::with_error(Verdict::CompilationError, build.stderr.trim());
    }

    let run = match run {
        Some(run) => run,
        // Build succeeded but the driver produced no run result; report it
        // rather than guess a submission-caused verdict.
        None => {
            return Judgment::with_error(Verdict::RuntimeError, "sandbox produced no run result")
        }
    };

    if run.timed_out {
        return Judgment::bare(Verdict::TimeLimitExceeded);
    }

    if run.memory_killed || run.exit_code == OOM_EXIT_CODE {
        return Judgment::bare(Verdict::OutOfMemory);
    }

    if run.exit_code != 0 {
        return Judgment::with_error(Verdict::RuntimeError, run.stderr.trim());
    }

    let actual = normalize(run.stdout.as_bytes());
    if actual == normalize(expected) {
        Judgment::with_output(Verdict::Accepted, actual)
    } else {
        Judgment::with_output(Verdict::WrongAnswer, actual)
    }
}

/// Normalize an output stream for comparison. Fixed contract:
/// lossy UTF-8 decode (invalid sequences become U+FFFD), `\r\n` -> `\n`,
/// strip a single trailing `\n`. Internal whitespace is untouched.
pub fn normalize(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.replace("\r\n", "\n");
    match text.strip_suffix('\n') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}
