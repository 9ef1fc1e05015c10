//! Integration tests for high-volume output
//!
//! A child that writes far more than a pipe buffer holds must finish and
//! hand back every byte, whichever stream it writes to.

#![cfg(unix)]

use shellcall::{MemorySink, OutputTrimming, Session, SessionConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const LIMIT: Duration = Duration::from_secs(60);

fn sh(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}

fn untrimmed_session() -> Session {
    let config = SessionConfig::quiet().with_output_trimming(OutputTrimming::None);
    Session::new(config).unwrap()
}

#[tokio::test]
async fn test_tens_of_megabytes_on_stdout() {
    let session = untrimmed_session();
    let bytes = 20 * 1024 * 1024;

    let out = timeout(
        LIMIT,
        session.execute(
            Path::new("/bin/sh"),
            &sh(&format!("head -c {} /dev/zero | tr '\\0' 'a'", bytes)),
        ),
    )
    .await
    .expect("large stdout should not hang")
    .unwrap();

    assert_eq!(out.len(), bytes);
    assert!(out.bytes().all(|b| b == b'a'));
}

#[tokio::test]
async fn test_large_stderr_with_silent_stdout() {
    let session = untrimmed_session();
    let bytes = 4 * 1024 * 1024;

    // Fails on purpose so the stderr capture comes back in the error
    let err = timeout(
        LIMIT,
        session.execute(
            Path::new("/bin/sh"),
            &sh(&format!(
                "head -c {} /dev/zero | tr '\\0' 'e' >&2; exit 1",
                bytes
            )),
        ),
    )
    .await
    .expect("large stderr should not hang")
    .unwrap_err();

    let view = err.execution_error().unwrap();
    assert_eq!(view.stdout, "");
    assert_eq!(view.stderr.len(), bytes);
}

#[tokio::test]
async fn test_interleaved_streams_keep_their_order() {
    let session = untrimmed_session();
    let script = "i=0; while [ $i -lt 2000 ]; do echo out$i; echo err$i >&2; i=$((i+1)); done";

    let out = timeout(LIMIT, session.execute(Path::new("/bin/sh"), &sh(script)))
        .await
        .expect("interleaved output should not hang")
        .unwrap();

    let lines = shellcall::output::lines(&out);
    assert_eq!(lines.len(), 2000);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(*line, format!("out{}", i));
    }
}

#[tokio::test]
async fn test_sink_receives_every_byte() {
    let sink = MemorySink::new();
    let config = SessionConfig::quiet()
        .with_output_trimming(OutputTrimming::None)
        .with_stdout_sink(Arc::new(sink.clone()));
    let session = Session::new(config).unwrap();
    let bytes = 1024 * 1024;

    let out = timeout(
        LIMIT,
        session.execute(
            Path::new("/bin/sh"),
            &sh(&format!("head -c {} /dev/zero | tr '\\0' 'z'", bytes)),
        ),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(out.len(), bytes);
    assert_eq!(sink.contents().len(), bytes);
    assert!(sink.chunks().len() >= 1);
}
