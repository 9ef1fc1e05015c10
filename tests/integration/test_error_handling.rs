//! Integration tests for failure classification
//!
//! Failures come back as values with everything the child produced attached.

#![cfg(unix)]

use shellcall::error::{EXIT_CANNOT_START, EXIT_NOT_FOUND};
use shellcall::{Error, ErrorKind, Session, SessionConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn quiet_session() -> Session {
    Session::new(SessionConfig::quiet()).expect("session should start")
}

fn sh(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}

#[tokio::test]
async fn test_non_zero_exit_keeps_code_and_stderr() {
    let session = quiet_session();
    let err = session
        .run("grep", &["needle".to_string(), "random123.txt".to_string()])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NonZeroExit);
    let view = err.execution_error().unwrap();
    assert_eq!(view.exit_code, 2);
    assert!(view.stderr.contains("random123.txt"));
    assert!(view.invoked_path.ends_with("grep"));
    assert_eq!(
        err.to_string(),
        format!("{} exited with error code 2.", view.invoked_path.display())
    );
}

#[tokio::test]
async fn test_failure_output_is_not_trimmed() {
    let session = quiet_session();

    let ok = session
        .execute(Path::new("/bin/sh"), &sh("echo value"))
        .await
        .unwrap();
    assert_eq!(ok, "value");

    let err = session
        .execute(Path::new("/bin/sh"), &sh("echo value; exit 1"))
        .await
        .unwrap_err();
    match err {
        Error::NonZeroExit(view) => {
            assert_eq!(view.stdout, "value\n");
            assert_eq!(view.exit_code, 1);
        }
        other => panic!("expected NonZeroExit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_command_is_not_found() {
    let session = quiet_session();
    let err = session
        .run("shellcall-definitely-not-installed", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ResolutionFailed { .. }));
    assert!(err.is_not_found());
    assert_eq!(err.exit_code(), Some(EXIT_NOT_FOUND));
    assert_eq!(
        err.to_string(),
        "Unable to locate command 'shellcall-definitely-not-installed'"
    );
}

#[tokio::test]
async fn test_exit_127_classifies_as_not_found() {
    let session = quiet_session();
    let err = session
        .execute(Path::new("/bin/sh"), &sh("exit 127"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.exit_code(), Some(127));
}

#[tokio::test]
async fn test_other_codes_are_reported_exactly() {
    let session = quiet_session();
    for code in [1, 3, 42, 126, 255] {
        let err = session
            .execute(Path::new("/bin/sh"), &sh(&format!("exit {}", code)))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(code));
        assert!(matches!(err, Error::NonZeroExit(_)));
    }
}

#[tokio::test]
async fn test_missing_explicit_path_fails_to_launch() {
    let session = quiet_session();
    let err = session
        .execute(Path::new("/no/such/dir/tool"), &[])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LaunchFailed);
    assert_eq!(err.exit_code(), Some(EXIT_CANNOT_START));
    let view = err.execution_error().unwrap();
    assert_eq!(view.invoked_path, PathBuf::from("/no/such/dir/tool"));
}

#[tokio::test]
async fn test_timeout_discards_output() {
    let config = SessionConfig::quiet().with_timeout(Some(Duration::from_millis(300)));
    let session = Session::new(config).unwrap();

    let err = session
        .execute(Path::new("/bin/sh"), &sh("echo started; exec sleep 30"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(err.execution_error().is_none());
}

#[tokio::test]
async fn test_timeout_includes_background_output_holders() {
    let config = SessionConfig::quiet().with_timeout(Some(Duration::from_millis(300)));
    let session = Session::new(config).unwrap();

    // The shell exits at once, but the backgrounded sleep keeps stdout open
    let started = std::time::Instant::now();
    let err = session
        .execute(Path::new("/bin/sh"), &sh("sleep 6 & echo hi"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(
        started.elapsed() < Duration::from_secs(3),
        "took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_failures_do_not_poison_the_session() {
    let session = quiet_session();
    let _ = session.run("false", &[]).await.unwrap_err();
    let out = session.run("echo", &["still fine".to_string()]).await.unwrap();
    assert_eq!(out, "still fine");
}
