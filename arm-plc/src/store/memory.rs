//! In-process variable store

use super::{StoreError, Value, VariableName, VariableStore};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct Namespace {
    name: String,
    objects: HashMap<String, HashMap<VariableName, Value>>,
}

#[derive(Default)]
struct Table {
    namespaces: Vec<Namespace>,
    /// Variable name -> (namespace index, object)
    locations: HashMap<VariableName, (usize, String)>,
}

impl Table {
    fn slot_mut(&mut self, name: VariableName) -> Result<&mut Value, StoreError> {
        let (ns, object) = self
            .locations
            .get(&name)
            .ok_or(StoreError::NotRegistered(name))?;
        self.namespaces
            .get_mut(*ns)
            .and_then(|n| n.objects.get_mut(object))
            .and_then(|vars| vars.get_mut(&name))
            .ok_or(StoreError::NotRegistered(name))
    }
}

/// Variable store held in memory behind a read/write lock
#[derive(Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered variables
    pub fn len(&self) -> usize {
        self.table.read().locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VariableStore for MemoryStore {
    fn add_object(&self, namespace: &str, object: &str) -> Result<usize, StoreError> {
        let mut table = self.table.write();
        let idx = match table.namespaces.iter().position(|n| n.name == namespace) {
            Some(idx) => idx,
            None => {
                table.namespaces.push(Namespace {
                    name: namespace.to_string(),
                    objects: HashMap::new(),
                });
                table.namespaces.len() - 1
            }
        };

        let ns = &mut table.namespaces[idx];
        if ns.objects.contains_key(object) {
            return Err(StoreError::DuplicateObject {
                namespace: namespace.to_string(),
                object: object.to_string(),
            });
        }
        ns.objects.insert(object.to_string(), HashMap::new());
        Ok(idx)
    }

    fn add_variable(
        &self,
        namespace_idx: usize,
        object: &str,
        name: VariableName,
        initial: Value,
    ) -> Result<(), StoreError> {
        let mut table = self.table.write();
        if table.locations.contains_key(&name) {
            return Err(StoreError::DuplicateVariable(name));
        }

        let ns = table
            .namespaces
            .get_mut(namespace_idx)
            .ok_or(StoreError::UnknownNamespaceIndex(namespace_idx))?;
        let Some(vars) = ns.objects.get_mut(object) else {
            return Err(StoreError::UnknownObject {
                namespace: ns.name.clone(),
                object: object.to_string(),
            });
        };
        vars.insert(name, initial);
        table
            .locations
            .insert(name, (namespace_idx, object.to_string()));
        Ok(())
    }

    fn get_variable(
        &self,
        namespace: &str,
        object: &str,
        name: VariableName,
    ) -> Result<Value, StoreError> {
        let table = self.table.read();
        let ns = table
            .namespaces
            .iter()
            .find(|n| n.name == namespace)
            .ok_or_else(|| StoreError::UnknownNamespace(namespace.to_string()))?;
        let vars = ns
            .objects
            .get(object)
            .ok_or_else(|| StoreError::UnknownObject {
                namespace: namespace.to_string(),
                object: object.to_string(),
            })?;
        vars.get(&name)
            .copied()
            .ok_or(StoreError::NotRegistered(name))
    }

    fn update_variable(&self, name: VariableName, value: Value) -> Result<(), StoreError> {
        let mut table = self.table.write();
        let slot = table.slot_mut(name)?;
        if !slot.same_type(&value) {
            return Err(StoreError::TypeMismatch {
                name,
                expected: slot.type_name(),
                actual: value.type_name(),
            });
        }
        *slot = value;
        Ok(())
    }
}
