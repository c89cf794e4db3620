#![allow(dead_code)]

use std::collections::VecDeque;

use iginx_client_rs::codec::encode_row;
use iginx_client_rs::error::Error;
use iginx_client_rs::metadata::DataType;
use iginx_client_rs::request::FetchRequest;
use iginx_client_rs::value::Value;
use iginx_client_rs::{FetchedPage, PageSource, Result};
use serde_json::{Value as JsonValue, json};

pub fn value_to_json(value: Option<&Value<'_>>) -> JsonValue {
    match value {
        None => json!({ "kind": "null" }),
        Some(Value::Boolean(v)) => json!({ "kind": "boolean", "value": *v }),
        Some(Value::Integer(v)) => json!({ "kind": "integer", "value": *v }),
        Some(Value::Long(v)) => json!({ "kind": "long", "value": *v }),
        Some(Value::Float(v)) => json!({ "kind": "float", "value": v.to_string() }),
        Some(Value::Double(v)) => json!({ "kind": "double", "value": v.to_string() }),
        Some(Value::Binary(s)) => json!({ "kind": "binary", "value": s }),
    }
}

pub fn row_to_json(row: &[Option<Value<'_>>]) -> JsonValue {
    let cells = row.iter().map(|value| value_to_json(value.as_ref()));
    JsonValue::Array(cells.collect())
}

/// Encodes rows into one page the way the server ships them.
pub fn page(rows: &[Vec<Option<Value<'_>>>], types: &[DataType], has_more: bool) -> FetchedPage {
    let mut page = FetchedPage {
        has_more,
        ..FetchedPage::default()
    };
    for row in rows {
        let encoded = encode_row(row, types).expect("encode fixture row");
        page.values_list.push(encoded.values);
        page.bitmap_list.push(encoded.bitmap.into_bytes());
    }
    page
}

/// Page source replaying a fixed script and recording every call.
#[derive(Default)]
pub struct ScriptedSource {
    pages: VecDeque<Result<FetchedPage>>,
    closes: VecDeque<Result<()>>,
    pub fetches: Vec<FetchRequest>,
    pub closed: Vec<i64>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_page(mut self, page: FetchedPage) -> Self {
        self.pages.push_back(Ok(page));
        self
    }

    pub fn then_fail(mut self, details: &str) -> Self {
        self.pages.push_back(Err(Error::transport(details)));
        self
    }

    pub fn then_close(mut self, result: Result<()>) -> Self {
        self.closes.push_back(result);
        self
    }
}

impl PageSource for ScriptedSource {
    fn fetch_page(&mut self, request: FetchRequest) -> Result<FetchedPage> {
        self.fetches.push(request);
        self.pages
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport("fetch script exhausted")))
    }

    fn close_query(&mut self, query_id: i64) -> Result<()> {
        self.closed.push(query_id);
        self.closes.pop_front().unwrap_or(Ok(()))
    }
}
