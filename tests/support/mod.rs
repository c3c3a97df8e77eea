#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

const CONFIG_VARS: [&str; 6] = [
    "OPENAI_MODEL",
    "OPENAI_ENDPOINT",
    "REQUEST_TIMEOUT_SECS",
    "MAX_HISTORY_MESSAGES",
    "CONTINUE_ON_ERROR",
    "LOG_FILE_PATH",
];

fn spawn_with_stdin(mut cmd: Command, stdin: &str) -> Output {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().expect("failed to spawn parley binary");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for parley")
}

fn base_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_parley"));
    for key in CONFIG_VARS {
        cmd.env_remove(key);
    }
    cmd
}

/// Runs the built binary with `stdin` piped in and a clean set of config vars.
pub fn run_parley(stdin: &str, envs: &[(&str, &str)]) -> Output {
    let mut cmd = base_command();
    cmd.env("OPENAI_API_KEY", "test-key");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    spawn_with_stdin(cmd, stdin)
}

/// Runs the binary from `dir` with no credential in the environment, so the
/// only configuration source is whatever `.env` the directory holds.
pub fn run_parley_in(dir: &Path, stdin: &str) -> Output {
    let mut cmd = base_command();
    cmd.env_remove("OPENAI_API_KEY").current_dir(dir);
    spawn_with_stdin(cmd, stdin)
}

pub fn unreachable_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    drop(listener);
    format!("http://{addr}/v1/chat/completions")
}

pub fn unique_temp_dir(suffix: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "parley-{suffix}-{stamp}-{}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("failed to create temp directory");
    dir
}
