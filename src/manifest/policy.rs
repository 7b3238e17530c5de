//! Lifecycle status and usage-policy flags.
//!
//! These fields classify a unit rather than describe it: where it is in
//! its lifecycle, how it may be called, and which surfaces and backing
//! services it touches. Aggregation filters and reports group by them.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle status of a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Development,
    Production,
    Deprecated,
    Unstable,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Development => write!(f, "Development"),
            Status::Production => write!(f, "Production"),
            Status::Deprecated => write!(f, "Deprecated"),
            Status::Unstable => write!(f, "Unstable"),
        }
    }
}

/// How a unit expects to be called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    #[default]
    Sync,
    Async,
    Hybrid,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Sync => write!(f, "sync"),
            AccessMode::Async => write!(f, "async"),
            AccessMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Declared thread-safety level of a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreadSafety {
    #[default]
    Unsafe,
    Reentrant,
    ThreadSafe,
    ActorSafe,
    Immutable,
}

impl ThreadSafety {
    /// Get the description of the thread safety level.
    pub fn description(&self) -> &'static str {
        match self {
            ThreadSafety::Unsafe => "No synchronization, may cause race conditions.",
            ThreadSafety::Reentrant => {
                "Reentrant for single thread recursion, not parallel-safe."
            }
            ThreadSafety::ThreadSafe => "Internally synchronized for parallel access.",
            ThreadSafety::ActorSafe => "Thread-safe via actor/queue-based serialized access.",
            ThreadSafety::Immutable => "Immutable after creation, safe by design.",
        }
    }
}

impl fmt::Display for ThreadSafety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadSafety::Unsafe => write!(f, "unsafe"),
            ThreadSafety::Reentrant => write!(f, "reentrant"),
            ThreadSafety::ThreadSafe => write!(f, "thread-safe"),
            ThreadSafety::ActorSafe => write!(f, "actor-safe"),
            ThreadSafety::Immutable => write!(f, "immutable"),
        }
    }
}

bitflags! {
    /// Hint for coding assistants about how a unit may be touched.
    ///
    /// A hint, not an enforcement mechanism.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AiAccess: u32 {
        const NO_ACCESS = 1 << 0;
        const READ = 1 << 1;
        const SUGGEST_ONLY = 1 << 2;
        const FORK_ALLOWED = 1 << 3;
        const WRITE = 1 << 4;
        const ALL = Self::NO_ACCESS.bits()
            | Self::READ.bits()
            | Self::SUGGEST_ONLY.bits()
            | Self::FORK_ALLOWED.bits()
            | Self::WRITE.bits();
    }

    /// User-facing surfaces a unit participates in.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Frontend: u32 {
        const CLI = 1 << 0;
        const API = 1 << 1;
        const TUI = 1 << 2;
        const GUI = 1 << 3;
        const WEB = 1 << 4;
        const ALL = Self::CLI.bits()
            | Self::API.bits()
            | Self::TUI.bits()
            | Self::GUI.bits()
            | Self::WEB.bits();
    }

    /// Backing services a unit talks to.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Backend: u32 {
        const SQLITE = 1 << 0;
        const REDIS = 1 << 1;
        const POSTGRESQL = 1 << 2;
        const FILE = 1 << 3;
        const MQTT = 1 << 4;
        const DOCKER = 1 << 5;
        const ALL = Self::SQLITE.bits()
            | Self::REDIS.bits()
            | Self::POSTGRESQL.bits()
            | Self::FILE.bits()
            | Self::MQTT.bits()
            | Self::DOCKER.bits();
    }

    /// Coarse classification of backends.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct BackendGroup: u32 {
        const DATABASE = 1 << 0;
        const FILE = 1 << 1;
        const NETWORK = 1 << 2;
        const CONTAINER = 1 << 3;
        const ALL = Self::DATABASE.bits()
            | Self::FILE.bits()
            | Self::NETWORK.bits()
            | Self::CONTAINER.bits();
    }
}

// bitflags ships its serde support as free functions, not as impls on
// the generated types; wire them onto each flags type. Human-readable
// formats carry the `"CLI | WEB"` string encoding.
macro_rules! impl_flags_serde {
    ($($flags:ident),+ $(,)?) => {
        $(
            impl Serialize for $flags {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    bitflags::serde::serialize(self, serializer)
                }
            }

            impl<'de> Deserialize<'de> for $flags {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    bitflags::serde::deserialize(deserializer)
                }
            }
        )+
    };
}

impl_flags_serde!(AiAccess, Frontend, Backend, BackendGroup);

impl Default for AiAccess {
    fn default() -> Self {
        AiAccess::ALL
    }
}

impl Backend {
    /// The group(s) the selected backends belong to.
    pub fn groups(&self) -> BackendGroup {
        let mut groups = BackendGroup::empty();
        if self.contains(Backend::SQLITE) {
            groups |= BackendGroup::DATABASE;
        }
        if self.contains(Backend::REDIS) {
            groups |= BackendGroup::DATABASE | BackendGroup::NETWORK;
        }
        if self.contains(Backend::POSTGRESQL) {
            groups |= BackendGroup::DATABASE | BackendGroup::NETWORK;
        }
        if self.contains(Backend::FILE) {
            groups |= BackendGroup::FILE;
        }
        if self.contains(Backend::MQTT) {
            groups |= BackendGroup::NETWORK;
        }
        if self.contains(Backend::DOCKER) {
            groups |= BackendGroup::CONTAINER | BackendGroup::NETWORK;
        }
        groups
    }
}

/// Lowercase kebab rendering of the set flags, `all` and `none` collapsed.
fn flag_names<F: bitflags::Flags>(value: &F) -> String {
    if value.is_empty() {
        return "none".to_string();
    }
    if value.is_all() {
        return "all".to_string();
    }
    value
        .iter_names()
        .map(|(name, _)| name.to_ascii_lowercase().replace('_', "-"))
        .collect::<Vec<_>>()
        .join(" | ")
}

impl fmt::Display for AiAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", flag_names(self))
    }
}

impl fmt::Display for Frontend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", flag_names(self))
    }
}

impl fmt::Display for BackendGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", flag_names(self))
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups = flag_names(&self.groups()).replace(" | ", ", ");
        write!(f, "{} (group: {})", flag_names(self), groups)
    }
}
