//! Leak tracker for tests.
//!
//! A harness registers suspect objects during setup, runs a scenario, then
//! asserts that [`LeakTracker::alive_objects`] is empty at teardown. The
//! tracker never owns what it tracks: liveness is asked of a [`Liveness`]
//! capability, which for `Arc`-owned objects is a `Weak` pointer.
//!
//! Not meant to be shared across threads while a scenario runs.

use parking_lot::{const_mutex, Mutex, MutexGuard};
use std::any::Any;
use std::panic::Location;
use std::sync::{Arc, Weak};

/// Resolved object handed back by the tracker
pub type AnyObject = Arc<dyn Any + Send + Sync>;

/// Capability answering whether a tracked object still exists
pub trait Liveness: Send {
    fn is_alive(&self) -> bool;

    /// Strong handle on the object, if it is alive and can be handed out
    fn resolve(&self) -> Option<AnyObject>;
}

impl<T: Any + Send + Sync> Liveness for Weak<T> {
    fn is_alive(&self) -> bool {
        self.strong_count() > 0
    }

    fn resolve(&self) -> Option<AnyObject> {
        self.upgrade().map(|strong| strong as AnyObject)
    }
}

/// One registration: probe plus provenance
pub struct ReferenceAllocation {
    probe: Box<dyn Liveness>,
    pub type_name: &'static str,
    pub address: String,
    pub file: &'static str,
    pub line: u32,
}

impl ReferenceAllocation {
    /// Computed on every call; never cached
    pub fn is_valid(&self) -> bool {
        self.probe.is_alive()
    }

    pub fn describe(&self) -> String {
        format!(
            "{}[{}], {}:{}",
            self.type_name, self.address, self.file, self.line
        )
    }
}

/// Ordered list of weakly tracked objects
#[derive(Default)]
pub struct LeakTracker {
    allocations: Vec<ReferenceAllocation>,
}

impl LeakTracker {
    pub const fn new() -> Self {
        Self {
            allocations: Vec::new(),
        }
    }

    /// Track `object` from the caller's location; `None` is ignored
    #[track_caller]
    pub fn register<T: Any + Send + Sync>(&mut self, object: Option<&Arc<T>>) {
        let location = Location::caller();
        self.register_at(object, location.file(), location.line());
    }

    pub fn register_at<T: Any + Send + Sync>(
        &mut self,
        object: Option<&Arc<T>>,
        file: &'static str,
        line: u32,
    ) {
        let Some(object) = object else {
            return;
        };
        self.track(
            Box::new(Arc::downgrade(object)),
            std::any::type_name::<T>(),
            format!("{:p}", Arc::as_ptr(object)),
            file,
            line,
        );
    }

    /// Track through a custom liveness capability
    pub fn track(
        &mut self,
        probe: Box<dyn Liveness>,
        type_name: &'static str,
        address: String,
        file: &'static str,
        line: u32,
    ) {
        self.allocations.push(ReferenceAllocation {
            probe,
            type_name,
            address,
            file,
            line,
        });
    }

    /// Forget every registration; tracked objects are unaffected
    pub fn reset(&mut self) {
        self.allocations.clear();
    }

    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }

    pub fn allocations(&self) -> &[ReferenceAllocation] {
        &self.allocations
    }

    /// Objects still alive, in registration order
    pub fn alive_objects(&self) -> Vec<AnyObject> {
        self.allocations
            .iter()
            .filter_map(|a| a.probe.resolve())
            .collect()
    }

    /// One `<type>[<address>], <file>:<line>` line per live entry
    pub fn alive_objects_description(&self) -> String {
        self.allocations
            .iter()
            .filter(|a| a.is_valid())
            .map(ReferenceAllocation::describe)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

static GLOBAL: Mutex<LeakTracker> = const_mutex(LeakTracker::new());

/// Process-wide tracker
pub fn global() -> MutexGuard<'static, LeakTracker> {
    GLOBAL.lock()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct Session {
        _id: u32,
    }

    // === Registration ===

    #[test]
    fn test_register_none_is_ignored() {
        let mut tracker = LeakTracker::new();
        tracker.register::<Session>(None);
        assert!(tracker.is_empty());
        assert!(tracker.alive_objects().is_empty());
    }

    #[test]
    fn test_tracked_object_alive_while_owned() {
        let mut tracker = LeakTracker::new();
        let session = Arc::new(Session { _id: 1 });
        let extra_owner = Arc::clone(&session);

        tracker.register(Some(&session));
        assert_eq!(tracker.alive_objects().len(), 1);

        drop(session);
        assert_eq!(tracker.alive_objects().len(), 1);

        drop(extra_owner);
        assert!(tracker.alive_objects().is_empty());
        // Entry stays; it is just no longer valid
        assert_eq!(tracker.len(), 1);
        assert!(!tracker.allocations()[0].is_valid());
    }

    #[test]
    fn test_tracker_does_not_extend_lifetime() {
        let mut tracker = LeakTracker::new();
        let session = Arc::new(Session { _id: 2 });
        tracker.register(Some(&session));
        assert_eq!(Arc::strong_count(&session), 1);
    }

    #[test]
    fn test_resolved_object_downcasts() {
        let mut tracker = LeakTracker::new();
        let session = Arc::new(Session { _id: 7 });
        tracker.register(Some(&session));

        let alive = tracker.alive_objects();
        let resolved = alive[0].clone().downcast::<Session>().ok().unwrap();
        assert!(Arc::ptr_eq(&resolved, &session));
    }

    // === Reset ===

    #[test]
    fn test_reset_empties_regardless_of_liveness() {
        let mut tracker = LeakTracker::new();
        let alive = Arc::new(Session { _id: 1 });
        tracker.register(Some(&alive));
        tracker.register(Some(&Arc::new(Session { _id: 2 })));

        tracker.reset();

        assert!(tracker.is_empty());
        assert!(tracker.alive_objects().is_empty());
        assert_eq!(Arc::strong_count(&alive), 1);
    }

    // === Description ===

    #[test]
    fn test_description_lists_live_entries_only() {
        let mut tracker = LeakTracker::new();
        let kept = Arc::new(Session { _id: 1 });
        tracker.register_at(Some(&kept), "scenario.rs", 10);
        tracker.register_at(Some(&Arc::new(Session { _id: 2 })), "scenario.rs", 11);

        let description = tracker.alive_objects_description();

        assert_eq!(description.lines().count(), 1);
        assert!(description.contains("Session["));
        assert!(description.ends_with("], scenario.rs:10"));
        assert!(description.contains(&format!("{:p}", Arc::as_ptr(&kept))));
    }

    #[test]
    fn test_register_captures_call_site() {
        let mut tracker = LeakTracker::new();
        let session = Arc::new(Session { _id: 3 });
        let line = line!() + 1;
        tracker.register(Some(&session));

        assert_eq!(tracker.allocations()[0].file, file!());
        assert_eq!(tracker.allocations()[0].line, line);
    }

    // === Custom liveness ===

    struct Generation {
        current: Arc<AtomicU64>,
        registered: u64,
    }

    impl Liveness for Generation {
        fn is_alive(&self) -> bool {
            self.current.load(Ordering::SeqCst) == self.registered
        }

        fn resolve(&self) -> Option<AnyObject> {
            self.is_alive().then(|| Arc::new(self.registered) as AnyObject)
        }
    }

    #[test]
    fn test_custom_generation_probe() {
        let mut tracker = LeakTracker::new();
        let generation = Arc::new(AtomicU64::new(5));
        tracker.track(
            Box::new(Generation {
                current: Arc::clone(&generation),
                registered: 5,
            }),
            "Slot",
            "slot#3".to_string(),
            "pool.rs",
            42,
        );
        assert_eq!(tracker.alive_objects_description(), "Slot[slot#3], pool.rs:42");

        generation.store(6, Ordering::SeqCst);
        assert!(tracker.alive_objects().is_empty());
    }
}
