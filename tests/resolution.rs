//! Component resolution integration tests.
//!
//! These tests drive the public registry workflow the way a host
//! application would: register headers and implementations, bind
//! overrides, load units on demand, and construct instances.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use keelson::component::{ComponentRegistry, Contract, ResolveError, UnitLoader};
use keelson::core::{ClassTag, TypeDescriptor, UnitPath};
use keelson::util::Symbol;

trait Door: Send {
    fn label(&self) -> String;
}

struct SlidingDoor {
    name: String,
}

impl Door for SlidingDoor {
    fn label(&self) -> String {
        format!("sliding:{}", self.name)
    }
}

struct RevolvingDoor {
    name: String,
}

impl Door for RevolvingDoor {
    fn label(&self) -> String {
        format!("revolving:{}", self.name)
    }
}

struct DoorContract;

impl Contract for DoorContract {
    type Interface = dyn Door;
    type Args = String;
}

fn make_sliding(name: String) -> Box<dyn Door> {
    Box::new(SlidingDoor { name })
}

fn make_revolving(name: String) -> Box<dyn Door> {
    Box::new(RevolvingDoor { name })
}

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn header_unit() -> UnitPath {
    UnitPath::new("dock.doors_h")
}

fn impl_unit() -> UnitPath {
    UnitPath::new("dock.doors_impl")
}

fn header() -> Symbol {
    Symbol::new("dock.doors_h.Door")
}

fn header_descriptor() -> TypeDescriptor {
    TypeDescriptor::new(header_unit(), "Door", ClassTag::Header)
}

fn impl_descriptor(name: &str) -> TypeDescriptor {
    TypeDescriptor::new(impl_unit(), name, ClassTag::Impl).with_ancestors(["dock.doors_h.Door"])
}

/// Registry with the Door header and a conventional SlidingDoor impl.
fn registry_with_pair() -> ComponentRegistry {
    let registry = ComponentRegistry::new();
    registry.register_header::<DoorContract>(header_descriptor());
    registry.register_impl::<DoorContract>(impl_descriptor("SlidingDoor"), make_sliding);
    registry
}

// ============================================================================
// convention resolution and construction
// ============================================================================

#[test]
fn test_header_resolves_and_constructs_through_convention() {
    let registry = registry_with_pair();

    let resolved = registry.resolve::<DoorContract>().unwrap();
    assert_eq!(resolved.as_str(), "dock.doors_impl.SlidingDoor");

    let door = registry
        .construct::<DoorContract>("front".to_string())
        .unwrap();
    assert_eq!(door.label(), "sliding:front");
}

#[test]
fn test_bundle_constructs_itself() {
    let registry = ComponentRegistry::new();
    registry.register_bundle::<DoorContract>(
        TypeDescriptor::new(UnitPath::new("dock.hatches"), "Hatch", ClassTag::Bundle),
        make_sliding,
    );

    let resolved = registry.resolve::<DoorContract>().unwrap();
    assert_eq!(resolved.as_str(), "dock.hatches.Hatch");

    let door = registry
        .construct::<DoorContract>("aft".to_string())
        .unwrap();
    assert_eq!(door.label(), "sliding:aft");
}

// ============================================================================
// explicit bindings
// ============================================================================

#[test]
fn test_binding_redirects_construction() {
    let registry = registry_with_pair();
    registry.register_impl::<DoorContract>(impl_descriptor("RevolvingDoor"), make_revolving);

    registry
        .bind(header(), Symbol::new("dock.doors_impl.RevolvingDoor"))
        .unwrap();

    let door = registry
        .construct::<DoorContract>("lobby".to_string())
        .unwrap();
    assert_eq!(door.label(), "revolving:lobby");
}

#[test]
fn test_descriptor_override_wins_over_convention() {
    let registry = ComponentRegistry::new();
    registry.register_header::<DoorContract>(
        header_descriptor().with_override("dock.doors_impl.RevolvingDoor"),
    );
    registry.register_impl::<DoorContract>(impl_descriptor("SlidingDoor"), make_sliding);
    registry.register_impl::<DoorContract>(impl_descriptor("RevolvingDoor"), make_revolving);

    let resolved = registry.resolve::<DoorContract>().unwrap();
    assert_eq!(resolved.as_str(), "dock.doors_impl.RevolvingDoor");
}

#[test]
fn test_invalid_binding_is_reported_with_both_names() {
    let registry = registry_with_pair();
    registry
        .bind(header(), Symbol::new("dock.doors_impl.NoSuchDoor"))
        .unwrap();

    let err = registry.resolve::<DoorContract>().unwrap_err();
    match err {
        ResolveError::InvalidOverride { header, target, .. } => {
            assert_eq!(header.as_str(), "dock.doors_h.Door");
            assert_eq!(target.as_str(), "dock.doors_impl.NoSuchDoor");
        }
        other => panic!("expected InvalidOverride, got {other:?}"),
    }
}

// ============================================================================
// unit loaders
// ============================================================================

struct SiblingLoader {
    loads: Arc<AtomicUsize>,
}

impl UnitLoader for SiblingLoader {
    fn load(&self, unit: UnitPath, registry: &ComponentRegistry) -> anyhow::Result<()> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if unit == impl_unit() {
            registry.register_impl::<DoorContract>(impl_descriptor("SlidingDoor"), make_sliding);
        }
        Ok(())
    }
}

#[test]
fn test_cold_registry_resolves_through_loader() {
    init_logs();
    let loads = Arc::new(AtomicUsize::new(0));
    let registry = ComponentRegistry::new().with_loader(Box::new(SiblingLoader {
        loads: Arc::clone(&loads),
    }));
    registry.register_header::<DoorContract>(header_descriptor());

    // Nothing but the header is registered; resolution pulls the
    // implementation unit in on demand.
    let door = registry
        .construct::<DoorContract>("cargo".to_string())
        .unwrap();
    assert_eq!(door.label(), "sliding:cargo");
    assert!(registry.is_loaded(impl_unit()));

    // Further resolutions reuse the cached answer.
    registry.resolve::<DoorContract>().unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

// ============================================================================
// diagnostics
// ============================================================================

#[test]
fn test_missing_implementation_diagnostic_lists_remediations() {
    let registry = ComponentRegistry::new();
    registry.register_header::<DoorContract>(header_descriptor());

    let err = registry.resolve::<DoorContract>().unwrap_err();
    let rendered = err.to_diagnostic().format(false);

    assert!(rendered.contains("error:"));
    assert!(rendered.contains("dock.doors_h.Door"));
    assert!(rendered.contains("help: consider:"));
    assert!(rendered.contains("1. Register an implementation type"));
    assert!(rendered.contains("2. Bind an implementation explicitly"));
    assert!(rendered.contains("3. Tag the type as `bundle`"));
}

// ============================================================================
// concurrency
// ============================================================================

#[test]
fn test_concurrent_resolution_publishes_one_answer() {
    let registry = registry_with_pair();
    registry.register_impl::<DoorContract>(impl_descriptor("RevolvingDoor"), make_revolving);

    let answers: Vec<Symbol> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = &registry;
                scope.spawn(move || registry.resolve_name(header()).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(answers.windows(2).all(|pair| pair[0] == pair[1]));
}

/// Loader that parks inside `load` until released, so a test can overlap
/// other registry calls with an in-flight load.
struct GatedLoader {
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
    loads: Arc<AtomicUsize>,
}

impl UnitLoader for GatedLoader {
    fn load(&self, unit: UnitPath, registry: &ComponentRegistry) -> anyhow::Result<()> {
        self.entered.lock().unwrap().send(()).ok();
        self.release.lock().unwrap().recv().ok();
        self.loads.fetch_add(1, Ordering::SeqCst);
        if unit == impl_unit() {
            registry.register_impl::<DoorContract>(impl_descriptor("SlidingDoor"), make_sliding);
        }
        Ok(())
    }
}

#[test]
fn test_resolution_waits_for_in_flight_unit_load() {
    init_logs();
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let loads = Arc::new(AtomicUsize::new(0));
    let registry = ComponentRegistry::new().with_loader(Box::new(GatedLoader {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
        loads: Arc::clone(&loads),
    }));
    registry.register_header::<DoorContract>(header_descriptor());

    let answers: Vec<Symbol> = thread::scope(|scope| {
        let registry = &registry;
        let first = scope.spawn(move || registry.resolve_name(header()).unwrap());

        // The first resolver is now parked inside the loader with the
        // implementation unit still empty. A second resolver must wait
        // for the load instead of scanning the empty unit.
        entered_rx.recv().unwrap();
        let second = scope.spawn(move || registry.resolve_name(header()).unwrap());

        thread::sleep(Duration::from_millis(20));
        release_tx.send(()).unwrap();
        vec![first.join().unwrap(), second.join().unwrap()]
    });

    assert_eq!(answers[0].as_str(), "dock.doors_impl.SlidingDoor");
    assert_eq!(answers[0], answers[1]);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_bind_during_resolution_wins_over_stale_publish() {
    init_logs();
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let registry = ComponentRegistry::new().with_loader(Box::new(GatedLoader {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
        loads: Arc::new(AtomicUsize::new(0)),
    }));
    registry.register_header::<DoorContract>(header_descriptor());
    registry.register_impl::<DoorContract>(
        TypeDescriptor::new(UnitPath::new("dock.hatches"), "RevolvingDoor", ClassTag::Impl)
            .with_ancestors(["dock.doors_h.Door"]),
        make_revolving,
    );

    let pre_bind = thread::scope(|scope| {
        let registry = &registry;
        let resolver = scope.spawn(move || registry.resolve_name(header()).unwrap());

        // Rebind while the resolver is parked inside the loader.
        entered_rx.recv().unwrap();
        registry
            .bind(header(), Symbol::new("dock.hatches.RevolvingDoor"))
            .unwrap();
        release_tx.send(()).unwrap();
        resolver.join().unwrap()
    });

    // The overlapping resolution saw the pre-bind world and keeps its
    // answer, but it must not republish it over the eviction: every
    // resolution after the bind serves the bound target.
    assert_eq!(pre_bind.as_str(), "dock.doors_impl.SlidingDoor");
    assert_eq!(
        registry.resolve_name(header()).unwrap().as_str(),
        "dock.hatches.RevolvingDoor"
    );
}
