//! Block catalog: registration, freezing and lookup.
//!
//! A [`Catalog`] is filled once at startup, then frozen and shared as
//! `Arc<Catalog>` by any number of compilers and engines. Lookups by id or
//! name are only needed at compile time; the compiler resolves each node to a
//! [`BlockKey`] so the engine dispatches by index.
//!
//! # Example
//!
//! ```rust
//! use rivulet_core::{BlockDescriptor, BlockGroup, Catalog, ProcessContext, ProcessError,
//!     Signal, SignalType, Signals};
//!
//! fn silence(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
//!     Ok(Signal::Real(ctx.silence()))
//! }
//!
//! let mut catalog = Catalog::new();
//! let key = catalog.register(BlockDescriptor {
//!     id: "silence",
//!     name: "Silence",
//!     icon: "mute",
//!     group: BlockGroup::Generators,
//!     description: "Emits zeros",
//!     signals: Signals::generator(SignalType::Real),
//!     param_fields: &[],
//!     validate: None,
//!     process: silence,
//! })?;
//! catalog.freeze();
//!
//! assert_eq!(catalog.key_of("silence"), Some(key));
//! assert!(catalog.is_generator("silence"));
//! # Ok::<(), rivulet_core::CatalogError>(())
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::block::{BlockDescriptor, BlockGroup, ProcessFn};
use crate::params::Params;

/// Stable index of a registered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey(pub(crate) u32);

impl BlockKey {
    /// Registration index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors raised by [`Catalog::register`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A required descriptor field is empty.
    #[error("block descriptor is missing required field '{0}'")]
    MissingField(&'static str),

    /// Another block already uses this id.
    #[error("block id '{0}' is already registered")]
    DuplicateId(String),

    /// Another block already uses this display name.
    #[error("block name '{0}' is already registered")]
    DuplicateName(String),

    /// The catalog no longer accepts registrations.
    #[error("catalog is frozen; cannot register '{0}'")]
    Frozen(String),
}

/// Registry of block descriptors.
#[derive(Debug, Default)]
pub struct Catalog {
    blocks: Vec<BlockDescriptor>,
    by_id: HashMap<&'static str, BlockKey>,
    by_name: HashMap<&'static str, BlockKey>,
    frozen: bool,
}

impl Catalog {
    /// Creates an empty, unfrozen catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a block.
    ///
    /// # Errors
    ///
    /// Fails if the catalog is frozen, if `id`, `name` or `icon` is empty, or
    /// if the id or name is already taken.
    pub fn register(&mut self, descriptor: BlockDescriptor) -> Result<BlockKey, CatalogError> {
        if self.frozen {
            return Err(CatalogError::Frozen(descriptor.id.to_owned()));
        }
        for (field, value) in [
            ("id", descriptor.id),
            ("name", descriptor.name),
            ("icon", descriptor.icon),
        ] {
            if value.trim().is_empty() {
                return Err(CatalogError::MissingField(field));
            }
        }
        if self.by_id.contains_key(descriptor.id) {
            return Err(CatalogError::DuplicateId(descriptor.id.to_owned()));
        }
        if self.by_name.contains_key(descriptor.name) {
            return Err(CatalogError::DuplicateName(descriptor.name.to_owned()));
        }

        let key = BlockKey(self.blocks.len() as u32);
        self.by_id.insert(descriptor.id, key);
        self.by_name.insert(descriptor.name, key);
        self.blocks.push(descriptor);
        tracing::debug!("catalog_register: {} as key {}", descriptor.id, key.0);
        Ok(key)
    }

    /// Rejects all further registrations.
    pub fn freeze(&mut self) {
        self.frozen = true;
        tracing::debug!("catalog_freeze: {} blocks", self.blocks.len());
    }

    /// Returns true once [`freeze`](Self::freeze) has been called.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Descriptor by block id.
    pub fn get(&self, id: &str) -> Option<&BlockDescriptor> {
        self.key_of(id).map(|key| &self.blocks[key.index()])
    }

    /// Descriptor by display name.
    pub fn get_by_name(&self, name: &str) -> Option<&BlockDescriptor> {
        self.by_name.get(name).map(|key| &self.blocks[key.index()])
    }

    /// Resolves a block id to its key.
    pub fn key_of(&self, id: &str) -> Option<BlockKey> {
        self.by_id.get(id).copied()
    }

    /// Descriptor by key.
    pub fn descriptor(&self, key: BlockKey) -> Option<&BlockDescriptor> {
        self.blocks.get(key.index())
    }

    /// The handler of a resolved block.
    pub fn process_fn(&self, key: BlockKey) -> Option<ProcessFn> {
        self.descriptor(key).map(|d| d.process)
    }

    /// Returns true if `id` names a block without an input port.
    pub fn is_generator(&self, id: &str) -> bool {
        self.get(id).is_some_and(BlockDescriptor::is_generator)
    }

    /// Returns true if `id` names a block without an output port.
    pub fn is_sink(&self, id: &str) -> bool {
        self.get(id).is_some_and(BlockDescriptor::is_sink)
    }

    /// Default parameters of a block; empty for unknown ids.
    pub fn default_params(&self, id: &str) -> Params {
        self.get(id)
            .map(BlockDescriptor::default_params)
            .unwrap_or_default()
    }

    /// Validation messages for `params` against block `id`.
    ///
    /// An unknown id yields a single message.
    pub fn validate_params(&self, id: &str, params: &Params) -> Vec<String> {
        match self.get(id) {
            Some(descriptor) => descriptor.validate_params(params),
            None => vec![format!("unknown block type '{id}'")],
        }
    }

    /// Blocks of one palette group, in registration order.
    pub fn blocks_in_group(&self, group: BlockGroup) -> Vec<&BlockDescriptor> {
        self.blocks.iter().filter(|b| b.group == group).collect()
    }

    /// All blocks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockDescriptor> {
        self.blocks.iter()
    }

    /// Number of registered blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
