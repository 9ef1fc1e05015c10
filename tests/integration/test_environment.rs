//! Integration tests for environment modes and forked sessions

#![cfg(unix)]

use shellcall::{Environment, Session, SessionConfig};
use std::collections::BTreeMap;
use std::path::Path;

async fn env_dump(session: &Session) -> shellcall::Result<String> {
    session.execute(Path::new("/usr/bin/env"), &[]).await
}

fn exact(vars: &[(&str, &str)]) -> Environment {
    Environment::Exact(
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn sorted_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = shellcall::output::lines(text)
        .into_iter()
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}

#[tokio::test]
async fn test_fork_overlays_exact_environment() {
    let config = SessionConfig::quiet().with_environment(exact(&[("A", "1")]));
    let session = Session::new(config).unwrap();
    let fork = session.fork_with_environment([("B", "2"), ("A", "9")]);

    let forked = env_dump(&fork).await.unwrap();
    assert_eq!(sorted_lines(&forked), vec!["A=9", "B=2"]);

    let original = env_dump(&session).await.unwrap();
    assert_eq!(sorted_lines(&original), vec!["A=1"]);
}

#[tokio::test]
async fn test_overlay_keeps_host_variables() {
    let mut vars = BTreeMap::new();
    vars.insert("SHELLCALL_OVERLAY".to_string(), "yes".to_string());
    let config = SessionConfig::quiet().with_environment(Environment::Overlay(vars));
    let session = Session::new(config).unwrap();

    let dump = env_dump(&session).await.unwrap();
    let lines = shellcall::output::lines(&dump);
    assert!(lines.contains(&"SHELLCALL_OVERLAY=yes"));
    if let Ok(path) = std::env::var("PATH") {
        assert!(lines.contains(&format!("PATH={}", path).as_str()));
    }
}

#[tokio::test]
async fn test_resolution_uses_host_environment() {
    // No PATH for the child, but lookup still works through the host shell
    let config = SessionConfig::quiet().with_environment(exact(&[("ONLY", "this")]));
    let session = Session::new(config).unwrap();

    let out = session.run("env", &[]).await.unwrap();
    assert_eq!(out, "ONLY=this");
}

#[tokio::test]
async fn test_fork_starts_in_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::new(SessionConfig::quiet()).unwrap();
    let recorded = session.change_directory(dir.path()).await.unwrap();

    let fork = session.fork_with_environment([("X", "1")]);
    assert_eq!(fork.current_directory(), recorded);
    assert_eq!(fork.config().resolution_shell(), Path::new("/bin/sh"));
}
