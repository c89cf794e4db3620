use std::borrow::Cow;

use crate::api::FetchOptions;
use crate::codec::{BitMask, decode_row};
use crate::error::{Error, Result, Section};
use crate::logger::{LogPrefixGuard, log_error, log_warn, set_log_prefix};
use crate::metadata::DataType;
use crate::request::FetchRequest;
use crate::sinks::{RowSink, SinkContext};
use crate::value::{Row, Value};

/// One page of row buffers returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub values_list: Vec<Vec<u8>>,
    pub bitmap_list: Vec<Vec<u8>>,
    pub has_more: bool,
}

/// Remote side of a paged result set.
pub trait PageSource {
    /// Fetches the next page of `request.query_id`.
    fn fetch_page(&mut self, request: FetchRequest) -> Result<FetchedPage>;

    /// Releases the server-side result set.
    fn close_query(&mut self, query_id: i64) -> Result<()>;
}

impl<S: PageSource + ?Sized> PageSource for &mut S {
    fn fetch_page(&mut self, request: FetchRequest) -> Result<FetchedPage> {
        (**self).fetch_page(request)
    }

    fn close_query(&mut self, query_id: i64) -> Result<()> {
        (**self).close_query(query_id)
    }
}

impl<S: PageSource + ?Sized> PageSource for Box<S> {
    fn fetch_page(&mut self, request: FetchRequest) -> Result<FetchedPage> {
        (**self).fetch_page(request)
    }

    fn close_query(&mut self, query_id: i64) -> Result<()> {
        (**self).close_query(query_id)
    }
}

/// What the server last said about pages beyond the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Nothing fetched yet, or the last fetch failed.
    Unknown,
    HasMore,
    /// Terminal.
    NoMore,
}

/// Pull-based cursor over a server-side result set, holding one page at a time.
///
/// Pages are fetched only when the local one is used up; there is no
/// read-ahead. Fetch failures end iteration for that call and are kept in
/// [`PagedResult::last_error`]; the next [`PagedResult::has_next`] retries.
pub struct PagedResult<S: PageSource> {
    source: S,
    query_id: i64,
    options: FetchOptions,
    paths: Vec<String>,
    types: Vec<DataType>,
    values_list: Vec<Vec<u8>>,
    bitmap_list: Vec<Vec<u8>>,
    index: usize,
    state: FetchState,
    last_error: Option<Error>,
}

impl<S: PageSource> PagedResult<S> {
    /// Creates a cursor with no local page; the first [`Self::has_next`] fetches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when paths and types differ in length.
    pub fn new(
        source: S,
        query_id: i64,
        paths: Vec<String>,
        types: Vec<DataType>,
        options: FetchOptions,
    ) -> Result<Self> {
        Self::with_first_page(
            source,
            query_id,
            paths,
            types,
            options,
            Vec::new(),
            Vec::new(),
        )
    }

    /// Creates a cursor seeded with the page delivered alongside the query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when paths and types differ in length and
    /// [`Error::Corrupted`] when the page has unequal buffer counts.
    pub fn with_first_page(
        source: S,
        query_id: i64,
        paths: Vec<String>,
        types: Vec<DataType>,
        options: FetchOptions,
        values_list: Vec<Vec<u8>>,
        bitmap_list: Vec<Vec<u8>>,
    ) -> Result<Self> {
        if paths.len() != types.len() {
            return Err(Error::validation(format!(
                "{} columns but {} data types",
                paths.len(),
                types.len()
            )));
        }
        check_page(values_list.len(), bitmap_list.len())?;
        Ok(Self {
            source,
            query_id,
            options,
            paths,
            types,
            values_list,
            bitmap_list,
            index: 0,
            state: FetchState::Unknown,
            last_error: None,
        })
    }

    #[must_use]
    pub const fn query_id(&self) -> i64 {
        self.query_id
    }

    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    #[must_use]
    pub fn types(&self) -> &[DataType] {
        &self.types
    }

    #[must_use]
    pub const fn state(&self) -> FetchState {
        self.state
    }

    /// Most recent fetch failure, if any.
    #[must_use]
    pub const fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn take_last_error(&mut self) -> Option<Error> {
        self.last_error.take()
    }

    /// Rows left in the local page.
    #[must_use]
    pub fn buffered_rows(&self) -> usize {
        self.values_list.len() - self.index
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Reports whether another row is available, fetching one page if the
    /// local page is used up and the server has not signalled exhaustion.
    pub fn has_next(&mut self) -> bool {
        if self.index < self.values_list.len() {
            return true;
        }
        self.values_list.clear();
        self.bitmap_list.clear();
        self.index = 0;
        if matches!(self.state, FetchState::HasMore | FetchState::Unknown) {
            self.fetch();
        }
        !self.values_list.is_empty()
    }

    fn log_prefix(&self) -> LogPrefixGuard {
        set_log_prefix(format!("query {}", self.query_id))
    }

    fn fetch(&mut self) {
        let request = FetchRequest::new(self.query_id, &self.options);
        let page = self.source.fetch_page(request).and_then(|page| {
            check_page(page.values_list.len(), page.bitmap_list.len())?;
            Ok(page)
        });
        match page {
            Ok(page) => {
                self.values_list = page.values_list;
                self.bitmap_list = page.bitmap_list;
                self.state = if page.has_more {
                    FetchState::HasMore
                } else {
                    FetchState::NoMore
                };
            }
            Err(err) => {
                let _prefix = self.log_prefix();
                log_warn(&format!("failed to fetch page: {err}"));
                self.state = FetchState::Unknown;
                self.last_error = Some(err);
            }
        }
    }

    /// Decodes the next row, fetching a page first if needed.
    ///
    /// Returns `Ok(None)` at the end of the stream or after a failed fetch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corrupted`] when a row does not decode against the
    /// declared types; the cursor is then treated as exhausted.
    pub fn try_next(&mut self) -> Result<Option<Row<'_>>> {
        if !self.has_next() {
            return Ok(None);
        }
        let index = self.index;
        self.index += 1;

        let bitmap = BitMask::view(self.types.len(), &self.bitmap_list[index]);
        match decode_row(&self.values_list[index], &bitmap, &self.types) {
            Ok(row) => Ok(Some(row)),
            Err(err) => {
                let _prefix = self.log_prefix();
                log_error(&format!("row {index} failed to decode: {err}"));
                self.index = self.values_list.len();
                self.state = FetchState::NoMore;
                Err(err)
            }
        }
    }

    /// Streams every remaining row into `sink`.
    ///
    /// # Errors
    ///
    /// Propagates decode failures and errors reported by the sink.
    pub fn drain_into<K: RowSink + ?Sized>(&mut self, sink: &mut K) -> Result<()> {
        sink.begin(SinkContext {
            paths: &self.paths,
            types: &self.types,
            has_timestamps: false,
        })?;
        while let Some(row) = self.try_next()? {
            sink.write_row(None, &row)?;
        }
        sink.finish()
    }

    /// Releases the server-side result set.
    ///
    /// Call at most once: a second call reaches the server with an id it no
    /// longer knows and returns whatever error it reports.
    ///
    /// # Errors
    ///
    /// Propagates the collaborator's failure unchanged.
    pub fn close(&mut self) -> Result<()> {
        self.source.close_query(self.query_id)
    }
}

fn check_page(values: usize, bitmaps: usize) -> Result<()> {
    if values != bitmaps {
        return Err(Error::Corrupted {
            section: Section::Bitmap,
            details: Cow::Owned(format!("{values} value buffers but {bitmaps} bitmaps")),
        });
    }
    Ok(())
}

impl<S: PageSource> Iterator for PagedResult<S> {
    type Item = Result<Row<'static>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.try_next() {
            Ok(Some(row)) => {
                let owned = row.into_iter().map(|value| value.map(Value::into_owned));
                Some(Ok(owned.collect()))
            }
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
