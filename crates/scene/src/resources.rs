//! GPU resource accounting
//!
//! Every geometry, material and surface a scene allocates is wrapped in a
//! [`TrackedResource`]. Releasing one twice is a no-op, and the shared
//! [`ResourceTracker`] counts allocations and releases per kind so leaks and
//! double frees show up in tests.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Kind of tracked resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Vertex/index buffers
    Geometry,
    /// Shader program and uniforms
    Material,
    /// Rendering surface (canvas + context)
    Surface,
}

impl ResourceKind {
    const ALL: [ResourceKind; 3] = [
        ResourceKind::Geometry,
        ResourceKind::Material,
        ResourceKind::Surface,
    ];

    fn index(self) -> usize {
        match self {
            ResourceKind::Geometry => 0,
            ResourceKind::Material => 1,
            ResourceKind::Surface => 2,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Geometry => "geometry",
            ResourceKind::Material => "material",
            ResourceKind::Surface => "surface",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
struct Counters {
    allocated: [AtomicUsize; 3],
    released: [AtomicUsize; 3],
}

/// Shared allocation/release counters
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    counters: Arc<Counters>,
}

impl ResourceTracker {
    /// Create a tracker with zero counts
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new resource
    pub fn allocate(&self, kind: ResourceKind, label: impl Into<String>) -> TrackedResource {
        self.counters.allocated[kind.index()].fetch_add(1, Ordering::SeqCst);
        TrackedResource {
            kind,
            label: label.into(),
            released: false,
            tracker: self.clone(),
        }
    }

    /// Resources of `kind` allocated so far
    pub fn allocated(&self, kind: ResourceKind) -> usize {
        self.counters.allocated[kind.index()].load(Ordering::SeqCst)
    }

    /// Resources of `kind` released so far
    pub fn released(&self, kind: ResourceKind) -> usize {
        self.counters.released[kind.index()].load(Ordering::SeqCst)
    }

    /// Resources allocated but not yet released, across all kinds
    pub fn live(&self) -> usize {
        ResourceKind::ALL
            .iter()
            .map(|&kind| self.allocated(kind) - self.released(kind))
            .sum()
    }
}

/// Handle to one allocated resource
#[derive(Debug)]
pub struct TrackedResource {
    kind: ResourceKind,
    label: String,
    released: bool,
    tracker: ResourceTracker,
}

impl TrackedResource {
    /// Resource kind
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Debug label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether [`release`](Self::release) has run
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Release the resource; returns false if it was already released
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.tracker.counters.released[self.kind.index()].fetch_add(1, Ordering::SeqCst);
        tracing::trace!(kind = %self.kind, label = %self.label, "Released resource");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_counts_once() {
        let tracker = ResourceTracker::new();
        let mut geometry = tracker.allocate(ResourceKind::Geometry, "river");

        assert_eq!(tracker.allocated(ResourceKind::Geometry), 1);
        assert_eq!(tracker.live(), 1);

        assert!(geometry.release());
        assert!(!geometry.release());
        assert!(geometry.is_released());
        assert_eq!(tracker.released(ResourceKind::Geometry), 1);
        assert_eq!(tracker.live(), 0);
    }

    #[test]
    fn test_kinds_counted_separately() {
        let tracker = ResourceTracker::new();
        let _g = tracker.allocate(ResourceKind::Geometry, "a");
        let mut m = tracker.allocate(ResourceKind::Material, "a");
        m.release();

        assert_eq!(tracker.allocated(ResourceKind::Geometry), 1);
        assert_eq!(tracker.released(ResourceKind::Geometry), 0);
        assert_eq!(tracker.released(ResourceKind::Material), 1);
        assert_eq!(tracker.allocated(ResourceKind::Surface), 0);
    }

    #[test]
    fn test_clones_share_counters() {
        let tracker = ResourceTracker::new();
        let other = tracker.clone();
        let mut r = other.allocate(ResourceKind::Surface, "canvas");
        r.release();
        assert_eq!(tracker.released(ResourceKind::Surface), 1);
        assert_eq!(r.label(), "canvas");
        assert_eq!(r.kind(), ResourceKind::Surface);
    }
}
