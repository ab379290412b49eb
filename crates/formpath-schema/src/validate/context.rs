//! Validation context
//!
//! `ValidationContext` carries the resolver and the mutable validation
//! state: the current path and the accumulated errors.

use std::cell::RefCell;

use formpath_document::{FormPath, PathSegment};

use crate::resolve::Resolver;

use super::error::{FieldError, ValidationErrorKind};

// =============================================================================
// ValidationState
// =============================================================================

#[derive(Debug, Default)]
pub(crate) struct ValidationState {
    /// Current path in the payload (for error reporting)
    pub path: FormPath,
    pub errors: Vec<FieldError>,
}

impl ValidationState {
    /// Clone for fork (trial validation of a union arm).
    pub fn fork(&self) -> Self {
        Self {
            path: self.path.clone(),
            errors: Vec::new(),
        }
    }

    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }
}

// =============================================================================
// ValidationContext
// =============================================================================

pub(crate) struct ValidationContext<'r, 'a> {
    pub resolver: &'r Resolver<'a>,
    pub state: RefCell<ValidationState>,
}

impl<'r, 'a> ValidationContext<'r, 'a> {
    pub fn new(resolver: &'r Resolver<'a>) -> Self {
        Self {
            resolver,
            state: RefCell::new(ValidationState::default()),
        }
    }

    /// Record an error at the current path (validation continues).
    pub fn record_error(&self, kind: ValidationErrorKind) {
        let path = self.path();
        self.record_error_at(path, kind);
    }

    pub fn record_error_at(&self, path: FormPath, kind: ValidationErrorKind) {
        self.state.borrow_mut().errors.push(FieldError { path, kind });
    }

    pub fn error_count(&self) -> usize {
        self.state.borrow().errors.len()
    }

    pub fn path(&self) -> FormPath {
        self.state.borrow().path.clone()
    }

    pub fn push_path(&self, segment: PathSegment) {
        self.state.borrow_mut().path.push(segment);
    }

    pub fn pop_path(&self) {
        self.state.borrow_mut().path.0.pop();
    }

    /// Run `f` against a forked state and hand back what it recorded.
    ///
    /// The caller decides whether to [`ValidationState::merge`] the result.
    pub fn trial<T>(&self, f: impl FnOnce() -> T) -> (T, ValidationState) {
        let forked = self.state.borrow().fork();
        let saved = self.state.replace(forked);
        let output = f();
        let trial = self.state.replace(saved);
        (output, trial)
    }

    pub fn merge(&self, other: ValidationState) {
        self.state.borrow_mut().merge(other);
    }

    pub fn finish(self) -> ValidationState {
        self.state.into_inner()
    }
}
