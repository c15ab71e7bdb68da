//! Cursor pagination shared by every list endpoint.
//!
//! A list request carries an optional `limit`, sort `order` and at most one
//! of the `after`/`before` cursors. A list response wraps one page of items
//! with `has_more` and the ids of its first and last item. The next request
//! is computed from the current one plus the page just received; nothing in
//! here performs I/O.

use std::str::FromStr;

use serde_json::Value;

use crate::codec::{Decode, Encode, ObjectReader, ObjectWriter};
use crate::error::{Result, WireError};

crate::wire_string_enum! {
    /// Sort order of a list, by creation time.
    pub enum SortOrder {
        /// Oldest first.
        Asc => "asc",
        /// Newest first.
        Desc => "desc",
    }
}

impl FromStr for SortOrder {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(WireError::invalid_page_parameter(
                "order",
                format!("expected \"asc\" or \"desc\", got {other:?}"),
            )),
        }
    }
}

/// Bounds a list resource declares for its `limit` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    /// Smallest accepted limit.
    pub min: u32,
    /// Largest accepted limit.
    pub max: u32,
}

impl PageBounds {
    /// Bounds used by most collections: 1 to 100.
    pub const STANDARD: PageBounds = PageBounds::new(1, 100);

    /// Create bounds.
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Check a limit against the bounds.
    pub fn check(&self, limit: u32) -> Result<()> {
        if limit < self.min || limit > self.max {
            return Err(WireError::invalid_page_parameter(
                "limit",
                format!("{limit} is outside {}..={}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// An item type served by a list endpoint.
pub trait ListResource {
    /// The endpoint's limit bounds.
    const BOUNDS: PageBounds = PageBounds::STANDARD;
}

/// Items that carry the id used as a pagination cursor.
pub trait Identified {
    /// The item's id.
    fn id(&self) -> &str;
}

/// Which way a sequence of list requests walks through the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Following `after` cursors, in the requested order.
    Forward,
    /// Following `before` cursors, against the requested order.
    Backward,
}

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters for one list request.
///
/// At most one cursor is ever set; the builder rejects requests carrying
/// both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    limit: Option<u32>,
    order: Option<SortOrder>,
    after: Option<String>,
    before: Option<String>,
}

impl PageRequest {
    /// A request with every parameter unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a request.
    pub fn builder() -> PageRequestBuilder {
        PageRequestBuilder::default()
    }

    /// Requested page size.
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Requested sort order.
    pub fn order(&self) -> Option<SortOrder> {
        self.order
    }

    /// Cursor to continue after.
    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }

    /// Cursor to continue before.
    pub fn before(&self) -> Option<&str> {
        self.before.as_deref()
    }

    /// The walking direction implied by the cursor in use.
    pub fn direction(&self) -> Direction {
        if self.before.is_some() {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }

    /// Check the request against a resource's bounds.
    ///
    /// Runs on every path to the wire, so cursors computed from a page are
    /// held to the same rules as ones set through the builder.
    pub fn validate(&self, bounds: &PageBounds) -> Result<()> {
        check_parameters(self.limit, self.after.as_deref(), self.before.as_deref())?;
        if let Some(limit) = self.limit {
            bounds.check(limit)?;
        }
        Ok(())
    }

    /// Query parameters for the set fields only, in a fixed order.
    pub fn to_query_parameters(&self, bounds: &PageBounds) -> Result<Vec<(&'static str, String)>> {
        self.validate(bounds)?;
        let mut params = Vec::with_capacity(4);
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(order) = self.order {
            params.push(("order", order.as_str().to_string()));
        }
        if let Some(after) = &self.after {
            params.push(("after", after.clone()));
        }
        if let Some(before) = &self.before {
            params.push(("before", before.clone()));
        }
        Ok(params)
    }

    /// Same limit and order, continuing after `cursor`.
    pub fn continue_after(&self, cursor: impl Into<String>) -> Self {
        Self {
            limit: self.limit,
            order: self.order,
            after: Some(cursor.into()),
            before: None,
        }
    }

    /// Same limit and order, continuing before `cursor`.
    pub fn continue_before(&self, cursor: impl Into<String>) -> Self {
        Self {
            limit: self.limit,
            order: self.order,
            after: None,
            before: Some(cursor.into()),
        }
    }
}

/// Rules that hold regardless of the resource: one cursor at most, no empty
/// cursor, no zero limit.
fn check_parameters(limit: Option<u32>, after: Option<&str>, before: Option<&str>) -> Result<()> {
    if after.is_some() && before.is_some() {
        return Err(WireError::invalid_page_parameter(
            "after",
            "`after` and `before` are mutually exclusive",
        ));
    }
    if after == Some("") {
        return Err(WireError::invalid_page_parameter("after", "cursor is empty"));
    }
    if before == Some("") {
        return Err(WireError::invalid_page_parameter("before", "cursor is empty"));
    }
    if limit == Some(0) {
        return Err(WireError::invalid_page_parameter("limit", "must be positive"));
    }
    Ok(())
}

/// Builder for [`PageRequest`].
#[derive(Debug, Clone, Default)]
pub struct PageRequestBuilder {
    limit: Option<u32>,
    order: Option<SortOrder>,
    after: Option<String>,
    before: Option<String>,
}

impl PageRequestBuilder {
    /// Set the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the sort order.
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Continue after a cursor.
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    /// Continue before a cursor.
    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Build, rejecting conflicting or empty cursors and a zero limit.
    pub fn build(self) -> Result<PageRequest> {
        check_parameters(self.limit, self.after.as_deref(), self.before.as_deref())?;
        Ok(PageRequest {
            limit: self.limit,
            order: self.order,
            after: self.after,
            before: self.before,
        })
    }

    /// Build and check the limit against a resource's bounds.
    pub fn build_within(self, bounds: &PageBounds) -> Result<PageRequest> {
        let request = self.build()?;
        request.validate(bounds)?;
        Ok(request)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse<T> {
    /// Items on this page, in the requested order.
    pub data: Vec<T>,
    /// Whether another page follows this one.
    pub has_more: bool,
    /// Id of the first item, absent when the page is empty.
    pub first_id: Option<String>,
    /// Id of the last item, absent when the page is empty.
    pub last_id: Option<String>,
}

impl<T> PageResponse<T> {
    /// Value of the envelope's `object` key.
    pub const OBJECT: &'static str = "list";

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the page holds no items.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over the page's items.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// The request for the following page, or `None` when the walk is done.
    ///
    /// Walking forward continues after `last_id`; walking backward continues
    /// before `first_id`. Limit and order are carried over unchanged.
    pub fn next_request(&self, current: &PageRequest) -> Option<PageRequest> {
        if !self.has_more {
            return None;
        }
        let cursor = match current.direction() {
            Direction::Forward => self.last_id.as_deref(),
            Direction::Backward => self.first_id.as_deref(),
        };
        let next = cursor.filter(|id| !id.is_empty()).map(|id| match current.direction() {
            Direction::Forward => current.continue_after(id),
            Direction::Backward => current.continue_before(id),
        });
        if next.is_none() {
            tracing::warn!(
                items = self.data.len(),
                "list page reports has_more without a cursor; stopping"
            );
        }
        next
    }
}

impl<T: Identified> PageResponse<T> {
    /// Returns true if `first_id`/`last_id` match the page's items.
    pub fn cursors_consistent(&self) -> bool {
        let first = self.data.first().map(Identified::id);
        let last = self.data.last().map(Identified::id);
        first == self.first_id.as_deref() && last == self.last_id.as_deref()
    }

    /// Fill in missing `first_id`/`last_id` from the items' own ids.
    ///
    /// Some list endpoints page by item id without echoing the cursors.
    pub fn with_item_cursors(mut self) -> Self {
        if self.first_id.is_none() {
            self.first_id = self.data.first().map(|item| item.id().to_string());
        }
        if self.last_id.is_none() {
            self.last_id = self.data.last().map(|item| item.id().to_string());
        }
        self
    }
}

impl<T> IntoIterator for PageResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<T: Encode> Encode for PageResponse<T> {
    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new();
        out.field("object", Self::OBJECT)
            .field("data", &self.data)
            .field("has_more", &self.has_more)
            .nullable("first_id", &self.first_id)
            .nullable("last_id", &self.last_id);
        out.into_value()
    }
}

impl<T: Decode> Decode for PageResponse<T> {
    fn decode(value: &Value) -> Result<Self> {
        let fields = ObjectReader::new(value, "PageResponse")?;
        fields.literal("object", Self::OBJECT)?;
        Ok(Self {
            data: fields.required("data")?,
            has_more: fields.required("has_more")?,
            first_id: fields.nullable("first_id")?,
            last_id: fields.nullable("last_id")?,
        })
    }
}

impl<T: Encode> serde::Serialize for PageResponse<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.encode(), serializer)
    }
}

impl<'de, T: Decode> serde::Deserialize<'de> for PageResponse<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = <Value as serde::Deserialize>::deserialize(deserializer)?;
        Self::decode(&value).map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auto-pager
// ─────────────────────────────────────────────────────────────────────────────

/// Drives a walk through a whole collection, one request at a time.
///
/// The caller sends [`Paginator::next_request`], feeds the page it got back
/// into [`Paginator::advance`], and repeats until the paginator is done.
/// [`Paginator::restart`] begins the walk again from the first request.
#[derive(Debug, Clone)]
pub struct Paginator {
    initial: PageRequest,
    next: Option<PageRequest>,
    pages: usize,
}

impl Paginator {
    /// Start a walk at `initial`.
    pub fn new(initial: PageRequest) -> Self {
        Self {
            next: Some(initial.clone()),
            initial,
            pages: 0,
        }
    }

    /// The request to send next, or `None` once the walk is done.
    pub fn next_request(&self) -> Option<&PageRequest> {
        self.next.as_ref()
    }

    /// Returns true once the last page has been seen.
    pub fn is_done(&self) -> bool {
        self.next.is_none()
    }

    /// Number of pages fed in so far.
    pub fn pages_seen(&self) -> usize {
        self.pages
    }

    /// Record a page received for the current request.
    ///
    /// Stops the walk if the page would lead back to the same request, so a
    /// misbehaving server cannot make the walk loop forever.
    pub fn advance<T>(&mut self, page: &PageResponse<T>) {
        let Some(current) = self.next.take() else {
            return;
        };
        self.pages += 1;
        let next = page.next_request(&current);
        self.next = match next {
            Some(next) if next == current => {
                tracing::warn!(
                    after = ?current.after(),
                    before = ?current.before(),
                    "list cursor did not advance; stopping"
                );
                None
            }
            other => other,
        };
    }

    /// Begin the walk again from the initial request.
    pub fn restart(&mut self) {
        self.next = Some(self.initial.clone());
        self.pages = 0;
    }
}
