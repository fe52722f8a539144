//! Render target references, resolved once when a scheduler is attached.

use crate::motion::Stage;
use crate::{Error, Result};

/// Opaque handle to a host element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRef {
    Selector(String),
    Element(ElementHandle),
}

impl From<&str> for TargetRef {
    fn from(selector: &str) -> Self {
        TargetRef::Selector(selector.to_string())
    }
}

impl From<ElementHandle> for TargetRef {
    fn from(handle: ElementHandle) -> Self {
        TargetRef::Element(handle)
    }
}

/// Host lookup that turns a target reference into a stage
pub trait TargetResolver {
    type Stage: Stage;

    fn query(&self, selector: &str) -> Option<Self::Stage>;

    /// `None` when the handle does not refer to an element
    fn element(&self, handle: ElementHandle) -> Option<Self::Stage>;

    fn resolve(&self, target: &TargetRef) -> Result<Self::Stage> {
        match target {
            TargetRef::Selector(selector) => self
                .query(selector)
                .ok_or_else(|| Error::TargetNotFound(selector.clone())),
            TargetRef::Element(handle) => {
                self.element(*handle).ok_or(Error::NotAnElement(handle.0))
            }
        }
    }
}
