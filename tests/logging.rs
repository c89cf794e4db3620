mod common;

use common::ScriptedSource;
use iginx_client_rs::logger::{set_log_file, set_log_prefix};
use iginx_client_rs::{DataType, FetchOptions, PagedResult};

#[test]
fn fetch_failures_are_mirrored_to_the_log_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("logs").join("client.log");
    set_log_file(&path).expect("log file");

    let source = ScriptedSource::new().then_fail("connection reset");
    let mut cursor = PagedResult::new(
        source,
        21,
        vec!["root.s".to_owned()],
        vec![DataType::Long],
        FetchOptions::default(),
    )
    .expect("cursor");

    {
        let _prefix = set_log_prefix("session 3");
        assert!(!cursor.has_next());
    }

    let logged = std::fs::read_to_string(&path).expect("read log");
    assert!(
        logged.starts_with("warning: session 3: query 21: failed to fetch page"),
        "log contents: {logged}"
    );
    assert!(
        logged.contains("connection reset"),
        "log contents: {logged}"
    );
}
