//! Integration tests for basic command execution
//!
//! These run real programs through a session: resolution, launch, capture
//! and trimming.

#![cfg(unix)]

use shellcall::{MemorySink, OutputTrimming, ResolvedCommand, Session, SessionConfig};
use std::path::Path;
use std::sync::Arc;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn quiet_session() -> Session {
    Session::new(SessionConfig::quiet()).expect("session should start")
}

#[tokio::test]
async fn test_echo_is_trimmed() {
    let session = quiet_session();
    let out = session.run("echo", &args(&["value"])).await.unwrap();
    assert_eq!(out, "value");
}

#[tokio::test]
async fn test_arguments_are_passed_verbatim() {
    let session = quiet_session();
    let out = session
        .run("printf", &args(&["%s|%s", "a b", "*"]))
        .await
        .unwrap();
    // No shell in between: no word splitting, no globbing
    assert_eq!(out, "a b|*");
}

#[tokio::test]
async fn test_custom_trim_characters() {
    let config = SessionConfig::quiet()
        .with_output_trimming(OutputTrimming::Characters(['\n', '#'].into_iter().collect()));
    let session = Session::new(config).unwrap();

    let out = session.run("echo", &args(&["##value# "])).await.unwrap();
    assert_eq!(out, "value# ");
}

#[tokio::test]
async fn test_resolved_path_is_absolute() {
    let session = quiet_session();
    let path = session.resolve("ls").await.unwrap();
    assert!(path.is_absolute());

    let cmd = session.command("ls").await.unwrap();
    assert_eq!(cmd.path(), path);
}

#[tokio::test]
async fn test_explicit_path_runs_without_lookup() {
    let session = quiet_session();
    let out = session
        .execute(Path::new("/bin/sh"), &args(&["-c", "echo direct"]))
        .await
        .unwrap();
    assert_eq!(out, "direct");
}

#[tokio::test]
async fn test_resolved_command_runs_with_own_config() {
    let sink = MemorySink::new();
    let config = SessionConfig::quiet().with_stdout_sink(Arc::new(sink.clone()));
    let cmd = ResolvedCommand::new("sh", "/bin/sh", config);

    let out = cmd
        .execute(&args(&["-c", "echo one; echo two"]), &std::env::temp_dir())
        .await
        .unwrap();

    assert_eq!(shellcall::output::lines(&out), vec!["one", "two"]);
    assert_eq!(sink.text(), "one\ntwo\n");
}

#[tokio::test]
async fn test_echo_sink_sees_output_before_return() {
    let stdout = MemorySink::new();
    let stderr = MemorySink::new();
    let config = SessionConfig::quiet()
        .with_stdout_sink(Arc::new(stdout.clone()))
        .with_stderr_sink(Arc::new(stderr.clone()));
    let session = Session::new(config).unwrap();

    session
        .run("sh", &args(&["-c", "echo to-out; echo to-err >&2"]))
        .await
        .unwrap();

    assert_eq!(stdout.text(), "to-out\n");
    assert_eq!(stderr.text(), "to-err\n");
}

#[tokio::test]
async fn test_concurrent_runs_in_one_session() {
    let session = Arc::new(quiet_session());

    let mut handles = Vec::new();
    for i in 0..8 {
        let session = Arc::clone(&session);
        handles.push(tokio::spawn(async move {
            session.run("echo", &[i.to_string()]).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap().unwrap(), i.to_string());
    }
}
