mod common;

use common::{ScriptedSource, page};
use iginx_client_rs::error::Error;
use iginx_client_rs::{CsvSink, DataType, FetchOptions, FetchState, PagedResult, Result, Value};

fn columns() -> (Vec<String>, Vec<DataType>) {
    (
        vec!["root.s1".to_owned(), "root.s2".to_owned()],
        vec![DataType::Long, DataType::Binary],
    )
}

fn row(s1: Option<i64>, s2: Option<&'static str>) -> Vec<Option<Value<'static>>> {
    vec![s1.map(Value::Long), s2.map(Value::from)]
}

#[test]
fn drains_pages_until_server_reports_no_more() {
    let (paths, types) = columns();
    let first = page(&[row(Some(1), None), row(Some(2), Some("b"))], &types, true);
    let source = ScriptedSource::new()
        .then_page(first)
        .then_page(page(&[row(None, Some("c"))], &types, false));
    let mut cursor =
        PagedResult::new(source, 42, paths, types, FetchOptions::default()).expect("cursor");

    let rows = cursor.by_ref().collect::<Result<Vec<_>>>().expect("rows");
    assert_eq!(
        rows,
        vec![
            row(Some(1), None),
            row(Some(2), Some("b")),
            row(None, Some("c")),
        ]
    );
    assert_eq!(cursor.state(), FetchState::NoMore);
    assert_eq!(cursor.source().fetches.len(), 2);

    assert!(!cursor.has_next());
    assert!(!cursor.has_next());
    assert_eq!(cursor.source().fetches.len(), 2);
}

#[test]
fn fetch_requests_carry_query_id_and_fetch_size() {
    let (paths, types) = columns();
    let source = ScriptedSource::new().then_page(page(&[], &types, false));
    let options = FetchOptions::new().with_fetch_size(2).expect("fetch size");
    let mut cursor = PagedResult::new(source, 7, paths, types, options).expect("cursor");

    assert!(!cursor.has_next());
    let request = cursor.source().fetches[0];
    assert_eq!(request.query_id, 7);
    assert_eq!(request.fetch_size, 2);
}

#[test]
fn failed_fetch_reports_no_rows_and_is_retried() {
    let (paths, types) = columns();
    let source = ScriptedSource::new()
        .then_fail("connection reset")
        .then_page(page(&[row(Some(5), Some("e"))], &types, false));
    let mut cursor =
        PagedResult::new(source, 1, paths, types, FetchOptions::default()).expect("cursor");

    assert!(!cursor.has_next());
    assert_eq!(cursor.state(), FetchState::Unknown);
    assert!(matches!(cursor.last_error(), Some(Error::Transport { .. })));

    assert!(cursor.has_next());
    let first = cursor.try_next().expect("decode").expect("row");
    assert_eq!(first, row(Some(5), Some("e")));
    assert!(!cursor.has_next());
    assert_eq!(cursor.source().fetches.len(), 2);
    assert!(cursor.take_last_error().is_some());
    assert!(cursor.last_error().is_none());
}

#[test]
fn seeded_first_page_is_served_before_fetching() {
    let (paths, types) = columns();
    let seed = page(&[row(Some(1), Some("a")), row(Some(2), None)], &types, true);
    let source = ScriptedSource::new().then_page(page(&[row(Some(3), None)], &types, false));
    let mut cursor = PagedResult::with_first_page(
        source,
        3,
        paths,
        types,
        FetchOptions::default(),
        seed.values_list,
        seed.bitmap_list,
    )
    .expect("cursor");

    assert_eq!(cursor.buffered_rows(), 2);
    assert!(cursor.has_next());
    assert!(cursor.source().fetches.is_empty());

    let rows = cursor.by_ref().collect::<Result<Vec<_>>>().expect("rows");
    assert_eq!(rows.len(), 3);
    assert_eq!(cursor.source().fetches.len(), 1);
}

#[test]
fn empty_page_with_more_pending_ends_this_call_only() {
    let (paths, types) = columns();
    let source = ScriptedSource::new()
        .then_page(page(&[], &types, true))
        .then_page(page(&[row(Some(9), None)], &types, false));
    let mut cursor =
        PagedResult::new(source, 5, paths, types, FetchOptions::default()).expect("cursor");

    assert!(!cursor.has_next());
    assert_eq!(cursor.state(), FetchState::HasMore);
    assert!(cursor.has_next());
    assert_eq!(cursor.state(), FetchState::NoMore);
}

#[test]
fn undecodable_row_terminates_the_cursor() {
    let (paths, types) = columns();
    let mut broken = page(&[row(Some(1), None), row(Some(2), None)], &types, true);
    broken.values_list[0].truncate(3);
    let source = ScriptedSource::new().then_page(broken);
    let mut cursor =
        PagedResult::new(source, 8, paths, types, FetchOptions::default()).expect("cursor");

    let err = cursor.try_next().expect_err("short buffer");
    assert!(matches!(err, Error::Corrupted { .. }));
    assert_eq!(cursor.state(), FetchState::NoMore);
    assert!(!cursor.has_next());
    assert_eq!(cursor.source().fetches.len(), 1);
}

#[test]
fn mismatched_page_buffers_are_rejected() {
    let (paths, types) = columns();
    let err = PagedResult::with_first_page(
        ScriptedSource::new(),
        1,
        paths,
        types,
        FetchOptions::default(),
        vec![vec![0; 8]],
        Vec::new(),
    )
    .err()
    .expect("unequal buffers");
    assert!(matches!(err, Error::Corrupted { .. }));
}

#[test]
fn close_forwards_every_call_to_the_server() {
    let (paths, types) = columns();
    let source = ScriptedSource::new()
        .then_close(Ok(()))
        .then_close(Err(Error::transport("unknown query id 11")));
    let mut cursor =
        PagedResult::new(source, 11, paths, types, FetchOptions::default()).expect("cursor");

    assert!(cursor.close().is_ok());
    assert!(matches!(cursor.close(), Err(Error::Transport { .. })));
    assert_eq!(cursor.source().closed, vec![11, 11]);
}

#[test]
fn drain_into_writes_every_row_to_the_sink() {
    let (paths, types) = columns();
    let source = ScriptedSource::new()
        .then_page(page(&[row(Some(1), None)], &types, true))
        .then_page(page(&[row(None, Some("x,y"))], &types, false));
    let mut cursor =
        PagedResult::new(source, 2, paths, types, FetchOptions::default()).expect("cursor");

    let mut sink = CsvSink::new(Vec::new());
    cursor.drain_into(&mut sink).expect("drain");
    let csv = String::from_utf8(sink.into_inner().expect("writer")).expect("utf8");
    assert_eq!(csv, "root.s1,root.s2\n1,\n,\"x,y\"\n");
}
