use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::core::{Error, Result};
use crate::entity::EntityMetadata;

type Entry = Arc<dyn Any + Send + Sync>;

/// Metadata cache of one database handle, keyed by entity type.
///
/// Builders run without holding the lock. When two threads build the same
/// type concurrently the first published entry wins and the other result is
/// dropped. Failed builds are never stored.
#[derive(Default)]
pub struct EntityRegistry {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<E: Send + Sync + 'static>(&self) -> Result<Option<Arc<EntityMetadata<E>>>> {
        let entries = self.entries.read()?;
        entries
            .get(&TypeId::of::<E>())
            .cloned()
            .map(downcast::<E>)
            .transpose()
    }

    pub fn get_or_insert_with<E, F>(&self, build: F) -> Result<Arc<EntityMetadata<E>>>
    where
        E: Send + Sync + 'static,
        F: FnOnce() -> Result<EntityMetadata<E>>,
    {
        if let Some(existing) = self.get::<E>()? {
            return Ok(existing);
        }

        let built: Entry = Arc::new(build()?);
        let published = {
            let mut entries = self.entries.write()?;
            entries
                .entry(TypeId::of::<E>())
                .or_insert(built)
                .clone()
        };
        downcast::<E>(published)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn downcast<E: Send + Sync + 'static>(entry: Entry) -> Result<Arc<EntityMetadata<E>>> {
    entry.downcast::<EntityMetadata<E>>().map_err(|_| {
        Error::MappingConstruction(format!(
            "Cached metadata does not belong to {}",
            std::any::type_name::<E>()
        ))
    })
}
