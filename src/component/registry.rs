//! Component registry - explicit registration, resolution, and construction.
//!
//! Key principle: registration never fails and resolution never guesses.
//! Every type the registry knows about was registered explicitly, either
//! up front or by a [`UnitLoader`] pulled in on demand, and resolution
//! follows one deterministic path: explicit binding, self-implementing
//! role, then the naming convention.

use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, RwLock};
use std::thread::{self, ThreadId};

use crate::component::contract::{
    contract_id, contract_name, Constructor, Contract, ErasedConstructor,
};
use crate::component::errors::{OverrideFault, ResolveError};
use crate::core::descriptor::TypeDescriptor;
use crate::core::location::UnitPath;
use crate::core::tag::ClassTag;
use crate::util::Symbol;

/// Loads a unit's registrations on demand.
///
/// Convention-based resolution may land on a unit nobody has registered
/// yet. When a loader is installed, the registry asks it to populate that
/// unit before scanning it. Loaders are invoked without any registry lock
/// held, so they are free to call back into registration.
pub trait UnitLoader: Send + Sync {
    /// Register everything `unit` declares. Called at most once per unit
    /// for a given registry; a failed load may be retried.
    fn load(&self, unit: UnitPath, registry: &ComponentRegistry) -> anyhow::Result<()>;
}

/// Registered types, bindings, and constructors behind one lock.
#[derive(Default)]
struct Inner {
    /// All registered types by fully-qualified name.
    types: BTreeMap<Symbol, TypeDescriptor>,
    /// Member index: unit path to the types declared in it.
    units: HashMap<UnitPath, BTreeSet<Symbol>>,
    /// Explicit header-to-implementation bindings.
    bindings: HashMap<Symbol, Symbol>,
    /// Contract marker to the header (or bundle) registered under it.
    contracts: HashMap<TypeId, Symbol>,
    /// Constructors keyed by contract and implementation name.
    constructors: HashMap<(TypeId, Symbol), ErasedConstructor>,
}

/// Load progress of a unit. The owning thread is recorded so a loader
/// that resolves recursively may re-enter its own unit mid-load.
#[derive(Clone, Copy, PartialEq, Eq)]
enum LoadState {
    InFlight(ThreadId),
    Loaded,
}

/// Registry of application types and the resolution rules between them.
///
/// Resolution of a header to its implementation follows, in order:
///
/// 1. an explicit binding ([`ComponentRegistry::bind`] or
///    [`TypeDescriptor::with_override`]), validated against the target;
/// 2. the type's own role: `impl` and `bundle` types resolve to themselves;
/// 3. the naming convention: the sibling unit named by the header's role
///    marker is loaded and scanned for `impl` subtypes of the header.
///
/// Results are cached; the first resolution of a name wins and later calls
/// return the same answer. [`ComponentRegistry::bind`] evicts the cached
/// entry for its header so rebinding takes effect on later resolutions.
pub struct ComponentRegistry {
    loader: Option<Box<dyn UnitLoader>>,
    inner: RwLock<Inner>,
    /// Resolution results, published once per header.
    cache: RwLock<HashMap<Symbol, Symbol>>,
    /// Bumped by [`ComponentRegistry::bind`]. A resolution publishes its
    /// result only if no bind happened while it was computing.
    generation: AtomicU64,
    /// Per-unit load progress; `load_done` signals finished loads.
    loads: Mutex<HashMap<UnitPath, LoadState>>,
    load_done: Condvar,
}

impl ComponentRegistry {
    /// Create an empty registry with no unit loader.
    ///
    /// This always succeeds - no I/O or discovery happens here.
    pub fn new() -> Self {
        ComponentRegistry {
            loader: None,
            inner: RwLock::new(Inner::default()),
            cache: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            loads: Mutex::new(HashMap::new()),
            load_done: Condvar::new(),
        }
    }

    /// Install a unit loader for on-demand registration.
    pub fn with_loader(mut self, loader: Box<dyn UnitLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Register a type. Re-registering the same name replaces the entry.
    pub fn register(&self, descriptor: TypeDescriptor) {
        let mut inner = self.inner.write().unwrap();
        Self::insert(&mut inner, descriptor);
    }

    /// Register a header and expose it under contract `C`.
    pub fn register_header<C: Contract>(&self, descriptor: TypeDescriptor) {
        debug_assert_eq!(descriptor.tag(), ClassTag::Header);
        let name = descriptor.name();
        let mut inner = self.inner.write().unwrap();
        Self::insert(&mut inner, descriptor);
        inner.contracts.insert(contract_id::<C>(), name);
    }

    /// Register an implementation along with its constructor for `C`.
    pub fn register_impl<C: Contract>(&self, descriptor: TypeDescriptor, ctor: Constructor<C>) {
        debug_assert_eq!(descriptor.tag(), ClassTag::Impl);
        let name = descriptor.name();
        let mut inner = self.inner.write().unwrap();
        Self::insert(&mut inner, descriptor);
        inner
            .constructors
            .insert((contract_id::<C>(), name), ErasedConstructor::new::<C>(ctor));
    }

    /// Register a self-implementing bundle: exposed under contract `C` and
    /// constructed by `ctor`.
    pub fn register_bundle<C: Contract>(&self, descriptor: TypeDescriptor, ctor: Constructor<C>) {
        debug_assert_eq!(descriptor.tag(), ClassTag::Bundle);
        let name = descriptor.name();
        let mut inner = self.inner.write().unwrap();
        Self::insert(&mut inner, descriptor);
        inner.contracts.insert(contract_id::<C>(), name);
        inner
            .constructors
            .insert((contract_id::<C>(), name), ErasedConstructor::new::<C>(ctor));
    }

    fn insert(inner: &mut Inner, descriptor: TypeDescriptor) {
        let name = descriptor.name();
        inner.units.entry(descriptor.unit()).or_default().insert(name);
        inner.types.insert(name, descriptor);
    }

    /// Bind `header` to a specific implementation, replacing any earlier
    /// binding. The header must already be registered; the target is
    /// validated when the header is next resolved, so it may be registered
    /// later (for instance by a unit loader).
    pub fn bind(&self, header: Symbol, target: Symbol) -> Result<(), ResolveError> {
        {
            let mut inner = self.inner.write().unwrap();
            if !inner.types.contains_key(&header) {
                let suggestions = Self::near_names(&inner, header);
                return Err(ResolveError::UnknownType {
                    name: header,
                    suggestions,
                });
            }
            inner.bindings.insert(header, target);
        }
        // Bump before evicting: a resolution that began before this bind
        // must not republish its answer after the eviction.
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.write().unwrap().remove(&header);
        Ok(())
    }

    /// Resolve the header registered under contract `C` to an
    /// implementation name.
    pub fn resolve<C: Contract>(&self) -> Result<Symbol, ResolveError> {
        let header = self.contract_header::<C>()?;
        self.resolve_name(header)
    }

    /// Resolve a type name to the name of its implementation.
    ///
    /// Headers resolve to an `impl` subtype; `impl` and `bundle` types
    /// resolve to themselves; explicit bindings win over both.
    pub fn resolve_name(&self, name: Symbol) -> Result<Symbol, ResolveError> {
        let generation = self.generation.load(Ordering::SeqCst);
        {
            let cache = self.cache.read().unwrap();
            if let Some(&resolved) = cache.get(&name) {
                return Ok(resolved);
            }
        }

        let resolved = self.resolve_uncached(name)?;

        // First writer wins so every caller sees one answer. An answer
        // computed against a binding set a bind has since replaced is
        // still returned to its caller, but never published.
        let mut cache = self.cache.write().unwrap();
        if self.generation.load(Ordering::SeqCst) != generation {
            return Ok(resolved);
        }
        if let Some(&existing) = cache.get(&name) {
            return Ok(existing);
        }
        cache.insert(name, resolved);
        Ok(resolved)
    }

    /// Construct an instance of the implementation resolved for contract
    /// `C`, passing `args` through to its registered constructor.
    pub fn construct<C: Contract>(&self, args: C::Args) -> Result<Box<C::Interface>, ResolveError> {
        let header = self.contract_header::<C>()?;
        let resolved = self.resolve_name(header)?;

        // Copy the fn pointer out so no lock is held during construction.
        let ctor = {
            let inner = self.inner.read().unwrap();
            inner
                .constructors
                .get(&(contract_id::<C>(), resolved))
                .and_then(|erased| erased.typed::<C>())
        };

        match ctor {
            Some(ctor) => Ok(ctor(args)),
            None => Err(ResolveError::NoConstructor {
                resolved,
                contract: contract_name::<C>(),
            }),
        }
    }

    /// Look up a registered type's descriptor.
    pub fn descriptor(&self, name: Symbol) -> Option<TypeDescriptor> {
        let inner = self.inner.read().unwrap();
        inner.types.get(&name).cloned()
    }

    /// Check if a type is registered.
    pub fn contains(&self, name: Symbol) -> bool {
        let inner = self.inner.read().unwrap();
        inner.types.contains_key(&name)
    }

    /// All types registered in a unit, sorted by name.
    pub fn members_of(&self, unit: UnitPath) -> Vec<Symbol> {
        let inner = self.inner.read().unwrap();
        inner
            .units
            .get(&unit)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// All registered type names, sorted.
    pub fn registered_types(&self) -> Vec<Symbol> {
        let inner = self.inner.read().unwrap();
        inner.types.keys().copied().collect()
    }

    /// Whether a loader has finished populating the unit.
    pub fn is_loaded(&self, unit: UnitPath) -> bool {
        matches!(
            self.loads.lock().unwrap().get(&unit),
            Some(LoadState::Loaded)
        )
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().types.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().types.is_empty()
    }

    fn contract_header<C: Contract>(&self) -> Result<Symbol, ResolveError> {
        let inner = self.inner.read().unwrap();
        inner
            .contracts
            .get(&contract_id::<C>())
            .copied()
            .ok_or(ResolveError::UnboundContract {
                contract: contract_name::<C>(),
            })
    }

    fn resolve_uncached(&self, name: Symbol) -> Result<Symbol, ResolveError> {
        let desc = self.descriptor(name).ok_or_else(|| {
            let inner = self.inner.read().unwrap();
            ResolveError::UnknownType {
                name,
                suggestions: Self::near_names(&inner, name),
            }
        })?;

        // An explicit binding wins over the type's own role.
        if let Some(target) = self.binding_for(&desc) {
            if target != name {
                return self.validate_override(name, target);
            }
            // A self-binding adds nothing; fall through to the role rules.
        }

        if desc.tag().is_self_implementing() {
            return Ok(name);
        }

        self.resolve_by_convention(&desc)
    }

    fn binding_for(&self, desc: &TypeDescriptor) -> Option<Symbol> {
        let inner = self.inner.read().unwrap();
        inner
            .bindings
            .get(&desc.name())
            .copied()
            .or_else(|| desc.override_target())
    }

    fn validate_override(&self, header: Symbol, target: Symbol) -> Result<Symbol, ResolveError> {
        let target_desc = self.descriptor(target).ok_or(ResolveError::InvalidOverride {
            header,
            target,
            fault: OverrideFault::TargetMissing,
        })?;

        if target_desc.tag() != ClassTag::Impl {
            return Err(ResolveError::InvalidOverride {
                header,
                target,
                fault: OverrideFault::NotAnImpl(target_desc.tag()),
            });
        }

        if !target_desc.inherits_from(header) {
            return Err(ResolveError::InvalidOverride {
                header,
                target,
                fault: OverrideFault::NotASubtype,
            });
        }

        Ok(target)
    }

    fn resolve_by_convention(&self, desc: &TypeDescriptor) -> Result<Symbol, ResolveError> {
        let header = desc.name();
        let declared_in = desc.unit();

        let search_unit = match declared_in.implementation_sibling() {
            Some(sibling) => sibling,
            None => {
                tracing::warn!(
                    "header unit `{}` carries no role marker; scanning it for implementations of `{}`",
                    declared_in,
                    header
                );
                declared_in
            }
        };

        self.ensure_loaded(search_unit)?;

        let candidates = self.conventional_impls_in(search_unit, header);
        match candidates.as_slice() {
            [] => Err(ResolveError::NoImplementation {
                header,
                searched_unit: search_unit,
            }),
            [only] => Ok(*only),
            [first, ..] => {
                let listed: Vec<&str> = candidates.iter().map(|c| c.as_str()).collect();
                tracing::warn!(
                    "multiple implementations of `{}` in `{}`: {}; using the first",
                    header,
                    search_unit,
                    listed.join(", ")
                );
                Ok(*first)
            }
        }
    }

    /// `impl`-tagged direct subtypes of `header` declared in `unit`,
    /// sorted by name.
    fn conventional_impls_in(&self, unit: UnitPath, header: Symbol) -> Vec<Symbol> {
        let inner = self.inner.read().unwrap();
        let Some(members) = inner.units.get(&unit) else {
            return Vec::new();
        };

        members
            .iter()
            .filter(|&&member| member != header)
            .filter(|&&member| {
                inner
                    .types
                    .get(&member)
                    .is_some_and(|d| Self::is_conventional_impl(&inner, d, header))
            })
            .copied()
            .collect()
    }

    /// The convention accepts a candidate whose direct supertype is the
    /// header itself or some subtype of it.
    fn is_conventional_impl(inner: &Inner, candidate: &TypeDescriptor, header: Symbol) -> bool {
        if candidate.tag() != ClassTag::Impl {
            return false;
        }
        match candidate.direct_parent() {
            Some(parent) if parent == header => true,
            Some(parent) => inner
                .types
                .get(&parent)
                .is_some_and(|p| p.inherits_from(header)),
            None => false,
        }
    }

    fn ensure_loaded(&self, unit: UnitPath) -> Result<(), ResolveError> {
        let Some(loader) = self.loader.as_deref() else {
            return Ok(());
        };

        let mut loads = self.loads.lock().unwrap();
        loop {
            match loads.get(&unit).copied() {
                Some(LoadState::Loaded) => return Ok(()),
                // The loading thread itself may resolve recursively; it
                // sees its own unit mid-population, nobody else does.
                Some(LoadState::InFlight(owner)) if owner == thread::current().id() => {
                    return Ok(());
                }
                Some(LoadState::InFlight(_)) => {
                    loads = self.load_done.wait(loads).unwrap();
                }
                None => break,
            }
        }
        loads.insert(unit, LoadState::InFlight(thread::current().id()));
        drop(loads);

        tracing::debug!("loading unit `{}`", unit);
        let outcome = loader.load(unit, self);

        let mut loads = self.loads.lock().unwrap();
        match outcome {
            Ok(()) => {
                loads.insert(unit, LoadState::Loaded);
                self.load_done.notify_all();
                Ok(())
            }
            Err(source) => {
                // A failed unit is cleared so a later call may retry it.
                loads.remove(&unit);
                self.load_done.notify_all();
                Err(ResolveError::UnitLoad { unit, source })
            }
        }
    }

    /// Registered names close to `name`, for typo suggestions.
    fn near_names(inner: &Inner, name: Symbol) -> Vec<Symbol> {
        let needle = name.last_segment().to_ascii_lowercase();
        inner
            .types
            .keys()
            .filter(|key| {
                let last = key.last_segment().to_ascii_lowercase();
                last == needle || last.starts_with(&needle) || needle.starts_with(&last)
            })
            .take(3)
            .copied()
            .collect()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
