//! Role-checked access to the arm object

use super::{StoreError, Value, VariableName, VariableStore, WriterRole};
use std::sync::Arc;

/// Register every arm variable under `namespace`/`object` with its initial value
pub fn register_variables(
    store: &dyn VariableStore,
    namespace: &str,
    object: &str,
) -> Result<usize, StoreError> {
    let idx = store.add_object(namespace, object)?;
    for name in VariableName::ALL {
        store.add_variable(idx, object, name, name.initial())?;
    }
    tracing::debug!(
        "Registered {} variables under {}/{}",
        VariableName::ALL.len(),
        namespace,
        object
    );
    Ok(idx)
}

/// Handle on the arm object that only writes variables owned by its role
#[derive(Clone)]
pub struct RoleWriter {
    store: Arc<dyn VariableStore>,
    role: WriterRole,
    namespace: String,
    object: String,
}

impl RoleWriter {
    pub fn new(
        store: Arc<dyn VariableStore>,
        role: WriterRole,
        namespace: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            store,
            role,
            namespace: namespace.into(),
            object: object.into(),
        }
    }

    pub fn role(&self) -> WriterRole {
        self.role
    }

    /// Read any variable
    pub fn read(&self, name: VariableName) -> Result<Value, StoreError> {
        self.store.get_variable(&self.namespace, &self.object, name)
    }

    /// Read a float variable
    pub fn read_f64(&self, name: VariableName) -> Result<f64, StoreError> {
        let value = self.read(name)?;
        value.as_f64().ok_or(StoreError::TypeMismatch {
            name,
            expected: "float",
            actual: value.type_name(),
        })
    }

    /// Read a bool variable
    pub fn read_bool(&self, name: VariableName) -> Result<bool, StoreError> {
        let value = self.read(name)?;
        value.as_bool().ok_or(StoreError::TypeMismatch {
            name,
            expected: "bool",
            actual: value.type_name(),
        })
    }

    /// Write a variable owned by this role
    pub fn write(&self, name: VariableName, value: impl Into<Value>) -> Result<(), StoreError> {
        if name.role() != self.role {
            return Err(StoreError::WrongRole {
                name,
                role: self.role,
            });
        }
        self.store.update_variable(name, value.into())
    }

    /// Seed a target variable from the sensor side
    ///
    /// Only the sync loop's first successful pull does this, so targets start
    /// at the measured pose instead of zero.
    pub(crate) fn seed_target(&self, name: VariableName, value: f64) -> Result<(), StoreError> {
        if self.role != WriterRole::Sensor || name.role() != WriterRole::Target {
            return Err(StoreError::WrongRole {
                name,
                role: self.role,
            });
        }
        self.store.update_variable(name, Value::Float(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn writers() -> (RoleWriter, RoleWriter) {
        let store: Arc<dyn VariableStore> = Arc::new(MemoryStore::new());
        register_variables(store.as_ref(), "ns", "RobotArmCtrl").unwrap();
        (
            RoleWriter::new(store.clone(), WriterRole::Sensor, "ns", "RobotArmCtrl"),
            RoleWriter::new(store, WriterRole::Target, "ns", "RobotArmCtrl"),
        )
    }

    #[test]
    fn test_roles_enforced() {
        let (sensor, hmi) = writers();
        sensor.write(VariableName::ArmAngle2, 12.5).unwrap();
        hmi.write(VariableName::Motor2Ctrl, 40.0).unwrap();

        assert!(matches!(
            sensor.write(VariableName::Motor2Ctrl, 1.0),
            Err(StoreError::WrongRole { .. })
        ));
        assert!(matches!(
            hmi.write(VariableName::ArmAngle2, 1.0),
            Err(StoreError::WrongRole { .. })
        ));

        assert_eq!(hmi.read_f64(VariableName::ArmAngle2).unwrap(), 12.5);
        assert_eq!(sensor.read_f64(VariableName::Motor2Ctrl).unwrap(), 40.0);
    }

    #[test]
    fn test_seed_target_only_from_sensor() {
        let (sensor, hmi) = writers();
        sensor.seed_target(VariableName::Motor1Ctrl, 45.0).unwrap();
        assert_eq!(hmi.read_f64(VariableName::Motor1Ctrl).unwrap(), 45.0);
        assert!(hmi.seed_target(VariableName::Motor1Ctrl, 0.0).is_err());
        assert!(sensor.seed_target(VariableName::ArmAngle1, 0.0).is_err());
    }

    #[test]
    fn test_registration_is_complete() {
        let (sensor, _) = writers();
        assert!(!sensor.read_bool(VariableName::GripperCtrl).unwrap());
        assert!(sensor.read_bool(VariableName::CubePosX).is_err());
    }
}
