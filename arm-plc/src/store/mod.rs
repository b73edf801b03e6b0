//! Supervisory variable store
//!
//! A namespace/object/variable table in the shape of an OPC-UA address space.
//! Variable names form a closed set ([`VariableName`]); each belongs to one
//! writer role, enforced by [`RoleWriter`].
//!
//! Registration order: objects before variables, variables before any access.
//! [`register_variables`] lays out the full arm object in one call.

mod memory;
mod names;
mod writer;

pub use memory::MemoryStore;
pub use names::{Value, VariableName, WriterRole};
pub use writer::{RoleWriter, register_variables};

use thiserror::Error;

/// Store access errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Variable {0} is not registered")]
    NotRegistered(VariableName),

    #[error("Unknown namespace: {0}")]
    UnknownNamespace(String),

    #[error("Unknown namespace index: {0}")]
    UnknownNamespaceIndex(usize),

    #[error("Object {object} is not registered in namespace {namespace}")]
    UnknownObject { namespace: String, object: String },

    #[error("Object {object} already exists in namespace {namespace}")]
    DuplicateObject { namespace: String, object: String },

    #[error("Variable {0} is already registered")]
    DuplicateVariable(VariableName),

    #[error("Variable {name} holds {expected} values, got {actual}")]
    TypeMismatch {
        name: VariableName,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Variable {name} may not be written by the {role} role")]
    WrongRole { name: VariableName, role: WriterRole },
}

/// Key/value contract of the supervisory store
pub trait VariableStore: Send + Sync {
    /// Add an object, creating the namespace on first use; returns the
    /// namespace index
    fn add_object(&self, namespace: &str, object: &str) -> Result<usize, StoreError>;

    /// Add a variable under an existing object; its type follows `initial`
    fn add_variable(
        &self,
        namespace_idx: usize,
        object: &str,
        name: VariableName,
        initial: Value,
    ) -> Result<(), StoreError>;

    /// Read a variable
    fn get_variable(
        &self,
        namespace: &str,
        object: &str,
        name: VariableName,
    ) -> Result<Value, StoreError>;

    /// Overwrite a registered variable with a value of the same type
    fn update_variable(&self, name: VariableName, value: Value) -> Result<(), StoreError>;
}
