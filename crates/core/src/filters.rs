//! Filter and action extension points.
//!
//! Deployments customize behavior by injecting callbacks at composition
//! time rather than by patching the service. A [`FilterChain`] threads a
//! value through every registered callback in registration order; an
//! [`ActionHook`] fans a finished fact out to observers. [`Filters`] is the
//! full set of slots the service consults, with every slot empty by default
//! so stock behavior needs no registration at all.

use crate::annotation::Subtype;
use crate::content::{ContentQuery, NewContentItem};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// FilterChain
// ---------------------------------------------------------------------------

/// An ordered chain of value-rewriting callbacks.
///
/// `apply` feeds the value through each callback in the order they were
/// pushed; an empty chain returns the value unchanged.
pub struct FilterChain<T> {
    callbacks: Vec<Box<dyn Fn(T) -> T + Send + Sync>>,
}

impl<T> FilterChain<T> {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Append a callback to the end of the chain.
    pub fn push(&mut self, callback: impl Fn(T) -> T + Send + Sync + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Run the value through the chain.
    pub fn apply(&self, value: T) -> T {
        self.callbacks
            .iter()
            .fold(value, |value, callback| callback(value))
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<T> Default for FilterChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// ActionHook
// ---------------------------------------------------------------------------

/// An ordered set of observers notified after something happened.
///
/// Observers cannot alter the value or veto the event.
pub struct ActionHook<T> {
    observers: Vec<Box<dyn Fn(&T) + Send + Sync>>,
}

impl<T> ActionHook<T> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Append an observer to the end of the hook.
    pub fn push(&mut self, observer: impl Fn(&T) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Notify every observer, in registration order.
    pub fn fire(&self, value: &T) {
        for observer in &self.observers {
            observer(value);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<T> Default for ActionHook<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Filter slots
// ---------------------------------------------------------------------------

/// Payload handed to [`Filters::after_insert`] observers once an editor
/// comment has been stored.
#[derive(Debug, Clone)]
pub struct InsertedAnnotation {
    pub parent_id: DbId,
    pub author_id: DbId,
    pub annotation_id: DbId,
    pub subtype: Subtype,
}

/// Every extension point the service consults, in one injectable bundle.
#[derive(Default)]
pub struct Filters {
    /// Rewrites the query used to list a parent's annotations.
    pub query: FilterChain<ContentQuery>,
    /// Rewrites the record about to be inserted for an editor comment.
    pub new_comment: FilterChain<NewContentItem>,
    /// Rewrites the record about to be inserted for a revision marker.
    pub new_revision: FilterChain<NewContentItem>,
    /// Rewrites the record about to be inserted for a status marker.
    pub new_status: FilterChain<NewContentItem>,
    /// Rewrites the list of content types annotations are enabled for.
    pub active_types: FilterChain<Vec<String>>,
    /// Rewrites the per-item entry count of the overview column.
    pub column_page_size: FilterChain<usize>,
    /// Rewrites the advisory per-item annotation ceiling.
    pub annotation_cap: FilterChain<usize>,
    /// Rewrites a resolved status display label.
    pub status_label: FilterChain<String>,
    /// Observes successfully inserted editor comments.
    pub after_insert: ActionHook<InsertedAnnotation>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
