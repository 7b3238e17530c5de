//! Construction contracts.
//!
//! Resolution works on names; construction needs types. A [`Contract`] is a
//! zero-sized marker linking a header name to the Rust-side shape of its
//! instances: the interface trait object callers receive and the argument
//! type constructors accept. Constructors are plain functions erased behind
//! `Any` so one registry can hold constructors for many contracts.

use std::any::{type_name, Any, TypeId};

/// Rust-side shape of a registered header.
///
/// Implementors are marker types. `Interface` is what construction hands
/// back, usually `dyn SomeTrait`; `Args` is the argument bundle every
/// constructor registered under this contract accepts, `()` when
/// constructors take nothing.
pub trait Contract: 'static {
    type Interface: ?Sized + 'static;
    type Args: 'static;
}

/// Constructor signature for a contract: args in, boxed interface out.
pub type Constructor<C> = fn(<C as Contract>::Args) -> Box<<C as Contract>::Interface>;

/// Identity of a contract marker type.
pub fn contract_id<C: Contract>() -> TypeId {
    TypeId::of::<C>()
}

/// Human-readable name of a contract marker type, for diagnostics.
pub fn contract_name<C: Contract>() -> &'static str {
    type_name::<C>()
}

/// A constructor with its contract type erased, so constructors for
/// different contracts can live in one table.
pub(crate) struct ErasedConstructor {
    contract: &'static str,
    ctor: Box<dyn Any + Send + Sync>,
}

impl ErasedConstructor {
    pub(crate) fn new<C: Contract>(ctor: Constructor<C>) -> Self {
        ErasedConstructor {
            contract: contract_name::<C>(),
            ctor: Box::new(ctor),
        }
    }

    /// The contract this constructor was registered under.
    pub(crate) fn contract(&self) -> &'static str {
        self.contract
    }

    /// Recover the typed constructor for contract `C`. Returns `None` if
    /// the constructor was registered under a different contract.
    ///
    /// Constructors are `fn` pointers, so the caller gets a copy and can
    /// invoke it after any registry lock is released.
    pub(crate) fn typed<C: Contract>(&self) -> Option<Constructor<C>> {
        self.ctor.downcast_ref::<Constructor<C>>().copied()
    }
}

impl std::fmt::Debug for ErasedConstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErasedConstructor")
            .field("contract", &self.contract)
            .finish()
    }
}
