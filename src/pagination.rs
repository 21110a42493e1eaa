//! Transaction listing with hybrid pointer/offset pagination.
//!
//! A page may name its successor (`nextPath` / `next_path`). When it does,
//! that path is followed verbatim. When it does not, a full page (exactly
//! `limit` items) implies more may exist and the next offset is requested. A
//! short page without a pointer ends the listing.
//!
//! An empty pointer string counts as no pointer, so a full page carrying
//! `"nextPath": ""` still falls back to the next offset. A pointer to a page
//! already fetched ends the listing.

use std::collections::HashSet;

use async_stream::try_stream;
use futures::{Stream, TryStreamExt as _};
use reqwest::Method;
use serde_json::Value;

use crate::client::{Client, bearer};
use crate::extract::{NEXT_PAGE, PAGE_ITEMS};
use crate::{Result, request_json};

pub const DEFAULT_PAGE_LIMIT: u32 = 25;

/// Loop-local position in a listing.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageCursor {
    pub base_path: String,
    pub limit: u32,
    pub offset: u64,
    pub next_path: Option<String>,
    followed: HashSet<String>,
}

impl PageCursor {
    /// Positioned on the first page of `base_path`.
    #[must_use]
    pub fn new<S: Into<String>>(base_path: S, limit: u32) -> Self {
        let mut cursor = Self {
            base_path: base_path.into(),
            limit,
            offset: 0,
            next_path: None,
            followed: HashSet::new(),
        };
        let first = cursor.offset_path();
        cursor.followed.insert(first.clone());
        cursor.next_path = Some(first);
        cursor
    }

    fn offset_path(&self) -> String {
        format!(
            "{}?limit={}&offset={}",
            self.base_path, self.limit, self.offset
        )
    }

    /// Moves past `page`; afterwards `next_path` is `None` when the listing is done.
    pub fn advance(&mut self, page: &Page) {
        self.next_path = match &page.next {
            Some(next) if self.followed.insert(next.clone()) => Some(next.clone()),
            Some(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(next = ?page.next, "page pointer repeats, ending listing");
                None
            }
            None if page.is_full(self.limit) => {
                self.offset += u64::from(self.limit);
                let path = self.offset_path();
                self.followed.insert(path.clone());
                Some(path)
            }
            None => None,
        };
    }
}

/// One decoded page of a listing.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub next: Option<String>,
    /// Whether the items came from an array, as opposed to a bare object
    /// taken as a single item.
    pub from_array: bool,
}

impl Page {
    /// Items come from the first of: a top-level array, the first of
    /// `items`/`transactions`/`data` that is an array, or the object itself as
    /// a single item. `null` is an empty page.
    #[must_use]
    pub fn parse(body: Value) -> Self {
        let next = NEXT_PAGE.first_str(&body).map(str::to_owned);

        let (items, from_array) = match body {
            Value::Array(items) => (items, true),
            Value::Null => (Vec::new(), true),
            other => match PAGE_ITEMS.first_array(&other) {
                Some(items) => (items.clone(), true),
                None => (vec![other], false),
            },
        };

        Self {
            items,
            next,
            from_array,
        }
    }

    #[must_use]
    pub fn is_full(&self, limit: u32) -> bool {
        self.from_array && u32::try_from(self.items.len()).is_ok_and(|len| len == limit)
    }
}

#[expect(clippy::multiple_inherent_impl, reason = "Listing lives beside its cursor")]
impl Client {
    /// Streams transaction pages in order, one request in flight at a time.
    ///
    /// The stream ends after the last page or yields a single error and ends.
    pub fn transaction_pages(&self) -> impl Stream<Item = Result<Vec<Value>>> + '_ {
        let limit = self.config().page_limit;
        let base_path = self.config().endpoints.transactions.clone();

        try_stream! {
            let token = self.session.require_access_token()?;
            let mut cursor = PageCursor::new(base_path, limit);

            while let Some(path) = cursor.next_path.take() {
                let request = self
                    .http
                    .request(Method::GET, self.endpoint(&path)?)
                    .header(reqwest::header::ACCEPT, "*/*")
                    .build()?;
                let body = request_json(&self.http, request, Some(bearer(token)?)).await?;
                let page = Page::parse(body);

                #[cfg(feature = "tracing")]
                tracing::debug!(%path, items = page.items.len(), next = ?page.next, "transaction page");

                cursor.advance(&page);
                yield page.items;
            }
        }
    }

    /// Fetches every transaction, following pages until the server signals the
    /// end. Fails as a whole if any page fails.
    pub async fn transactions(&self) -> Result<Vec<Value>> {
        let mut pages = std::pin::pin!(self.transaction_pages());
        let mut all = Vec::new();
        while let Some(items) = pages.try_next().await? {
            all.extend(items);
        }

        #[cfg(feature = "tracing")]
        tracing::info!(count = all.len(), "fetched transactions");

        Ok(all)
    }
}
