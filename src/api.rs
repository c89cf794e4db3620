use crate::error::{Error, Result};

/// Page size hint sent with every fetch when none is configured.
pub const DEFAULT_FETCH_SIZE: i32 = 1000;

/// Configures how paged results are pulled from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    fetch_size: i32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fetch_size: DEFAULT_FETCH_SIZE,
        }
    }

    /// Sets the number of rows requested per page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for sizes that are zero or negative.
    pub fn with_fetch_size(mut self, fetch_size: i32) -> Result<Self> {
        if fetch_size <= 0 {
            return Err(Error::validation(format!(
                "fetch size must be positive, got {fetch_size}"
            )));
        }
        self.fetch_size = fetch_size;
        Ok(self)
    }

    #[must_use]
    pub const fn fetch_size(&self) -> i32 {
        self.fetch_size
    }
}

/// Configures how insert batches are labelled for the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    aligned: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self { aligned: true }
    }

    /// Non-aligned batches let each series keep its own timestamps server-side.
    #[must_use]
    pub const fn with_aligned(mut self, aligned: bool) -> Self {
        self.aligned = aligned;
        self
    }

    #[must_use]
    pub const fn aligned(&self) -> bool {
        self.aligned
    }
}
