use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::{ReadLibrary, StoredLibrary};
use crate::{error::Result, Error, ParamError};

/// A versioned reference to a stored object, written `wsid/objid/version`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    pub wsid: u64,
    pub objid: u64,
    pub version: u64,
}
impl ObjectRef {
    pub fn new(wsid: u64, objid: u64, version: u64) -> Self {
        Self {
            wsid,
            objid,
            version,
        }
    }
}
impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.wsid, self.objid, self.version)
    }
}
impl FromStr for ObjectRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ParamError::InvalidRef(s.to_string());
        let mut parts = s.trim().split('/').map(str::parse::<u64>);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(wsid)), Some(Ok(objid)), Some(Ok(version)), None) => {
                Ok(Self::new(wsid, objid, version))
            }
            _ => Err(invalid().into()),
        }
    }
}
impl Serialize for ObjectRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The workspace to save into
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkspaceId {
    Id(u64),
    Name(String),
}

/// The object to save as: an existing object id or a (possibly new) name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectId {
    Id(u64),
    Name(String),
}

/// Where a new library version is saved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaveTarget {
    pub workspace: WorkspaceId,
    pub object: ObjectId,
}

/// Persistent storage of read libraries.
///
/// Implemented by whatever backs the object store in a deployment; the crate
/// only depends on this interface.
pub trait LibraryStore {
    /// Fetch a stored library, with its files staged on the local filesystem
    fn get(&self, reference: &ObjectRef) -> Result<StoredLibrary>;

    /// Save `library` as a new version of `target`
    fn save(&mut self, target: &SaveTarget, library: &ReadLibrary) -> Result<ObjectRef>;
}

#[cfg(test)]
pub(crate) use memory::MemoryStore;

#[cfg(test)]
mod memory {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{
        library::{FileHandle, StoredFile},
        StoreError,
    };

    /// An in-process store keeping every saved version
    #[derive(Debug, Default)]
    pub(crate) struct MemoryStore {
        workspaces: Vec<String>,
        names: BTreeMap<(u64, String), u64>,
        objects: BTreeMap<ObjectRef, StoredLibrary>,
    }
    impl MemoryStore {
        pub(crate) fn insert(&mut self, reference: ObjectRef, library: StoredLibrary) {
            self.objects.insert(reference, library);
        }

        fn workspace(&mut self, workspace: &WorkspaceId) -> u64 {
            match workspace {
                WorkspaceId::Id(wsid) => *wsid,
                WorkspaceId::Name(name) => {
                    if let Some(pos) = self.workspaces.iter().position(|ws| ws == name) {
                        return pos as u64 + 1;
                    }
                    self.workspaces.push(name.clone());
                    self.workspaces.len() as u64
                }
            }
        }

        fn latest(&self, wsid: u64, objid: u64) -> Option<u64> {
            self.objects
                .keys()
                .filter(|r| r.wsid == wsid && r.objid == objid)
                .map(|r| r.version)
                .max()
        }
    }
    impl LibraryStore for MemoryStore {
        fn get(&self, reference: &ObjectRef) -> Result<StoredLibrary> {
            self.objects
                .get(reference)
                .cloned()
                .ok_or_else(|| StoreError::ObjectNotFound(reference.to_string()).into())
        }

        fn save(&mut self, target: &SaveTarget, library: &ReadLibrary) -> Result<ObjectRef> {
            let wsid = self.workspace(&target.workspace);
            let objid = match &target.object {
                ObjectId::Id(objid) => {
                    if self.latest(wsid, *objid).is_none() {
                        return Err(StoreError::ObjectNotFound(format!("{wsid}/{objid}")).into());
                    }
                    *objid
                }
                ObjectId::Name(name) => {
                    let next = self.names.len() as u64 + 1;
                    *self.names.entry((wsid, name.clone())).or_insert(next)
                }
            };
            let version = self.latest(wsid, objid).map_or(1, |v| v + 1);
            let reference = ObjectRef::new(wsid, objid, version);

            let stored_file = |handle: &FileHandle| StoredFile {
                path: handle.path.clone(),
                name: handle.display_name.clone(),
            };
            self.insert(
                reference,
                StoredLibrary {
                    layout: library.layout,
                    fwd: stored_file(&library.fwd),
                    rev: library.rev.as_ref().map(stored_file),
                    metadata: library.metadata.clone(),
                },
            );
            Ok(reference)
        }
    }
}
