//! Transient local resources for user-picked files.
//!
//! A [`ResourceHandle`] is the Rust analogue of an object URL: a short-lived,
//! locally dereferenceable reference to bytes the user selected. Every
//! `acquire` must be paired with exactly one `release`, triggered either by
//! layer removal or by session teardown.

use crate::error::ResourceError;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Opaque handle to bytes held by a [`ResourceLifecycle`] implementation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(u64);

impl ResourceHandle {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob#{}", self.0)
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob#{}", self.0)
    }
}

/// A user-provided binary file. Bytes are shared so snapshots are cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Arc<[u8]>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Allocation and revocation of transient handles.
///
/// Implementations own the bytes; holders of a handle own nothing.
pub trait ResourceLifecycle {
    /// Wrap a file in a new handle.
    fn acquire(&mut self, file: LocalFile) -> ResourceHandle;

    /// Free a handle. A second release of the same handle is an error and
    /// must leave the arena untouched.
    fn release(&mut self, handle: ResourceHandle) -> Result<(), ResourceError>;

    /// Dereference a live handle.
    fn read(&self, handle: ResourceHandle) -> Result<LocalFile, ResourceError>;

    /// Release every live handle. Returns how many were freed.
    fn release_all(&mut self) -> usize;

    /// Number of handles acquired and not yet released.
    fn live_count(&self) -> usize;
}

/// Default in-memory arena.
#[derive(Debug, Default)]
pub struct ResourceArena {
    live: HashMap<ResourceHandle, LocalFile>,
    released: HashSet<ResourceHandle>,
    next: u64,
}

impl ResourceArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self, handle: ResourceHandle) -> bool {
        self.live.contains_key(&handle)
    }
}

impl ResourceLifecycle for ResourceArena {
    fn acquire(&mut self, file: LocalFile) -> ResourceHandle {
        self.next += 1;
        let handle = ResourceHandle(self.next);
        log::debug!("acquire {handle} ({}, {} bytes)", file.name, file.len());
        self.live.insert(handle, file);
        handle
    }

    fn release(&mut self, handle: ResourceHandle) -> Result<(), ResourceError> {
        if self.live.remove(&handle).is_some() {
            self.released.insert(handle);
            log::debug!("release {handle}");
            Ok(())
        } else if self.released.contains(&handle) {
            Err(ResourceError::AlreadyReleased(handle))
        } else {
            Err(ResourceError::Unknown(handle))
        }
    }

    fn read(&self, handle: ResourceHandle) -> Result<LocalFile, ResourceError> {
        match self.live.get(&handle) {
            Some(file) => Ok(file.clone()),
            None if self.released.contains(&handle) => Err(ResourceError::AlreadyReleased(handle)),
            None => Err(ResourceError::Unknown(handle)),
        }
    }

    fn release_all(&mut self) -> usize {
        let count = self.live.len();
        for (handle, _) in self.live.drain() {
            self.released.insert(handle);
        }
        if count > 0 {
            log::debug!("released {count} outstanding resource(s)");
        }
        count
    }

    fn live_count(&self) -> usize {
        self.live.len()
    }
}
