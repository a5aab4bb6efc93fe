//! Role registry: the single authoritative mapping from caller identity to
//! the one capability class it may act as.
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::LedgerError;

/// The capability class an identity is authorized to act as. Exactly one per
/// identity; never-assigned identities default to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub enum Role {
    #[n(0)]
    None,
    #[n(1)]
    Supplier,
    #[n(2)]
    Manufacturer,
    #[n(3)]
    Distributor,
    #[n(4)]
    Transporter,
    #[n(5)]
    Wholesaler,
    #[n(6)]
    Retailer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::None => "None",
            Role::Supplier => "Supplier",
            Role::Manufacturer => "Manufacturer",
            Role::Distributor => "Distributor",
            Role::Transporter => "Transporter",
            Role::Wholesaler => "Wholesaler",
            Role::Retailer => "Retailer",
        };
        f.write_str(name)
    }
}

/// Capability interface consulted (read-only) by every state-changing call.
/// Injected into the service so tests can supply isolated instances instead
/// of sharing process-wide state.
pub trait RoleDirectory {
    /// Role of `identity`, defaulting to [`Role::None`] when never assigned.
    fn role_of(&self, identity: &str) -> Result<Role, LedgerError>;
    /// Set or overwrite the role of `identity`.
    fn assign_role(&self, identity: &str, role: Role) -> Result<(), LedgerError>;
}

fn role_key(identity: &str) -> Vec<u8> {
    [b"role:", identity.as_bytes()].concat()
}

/// Role directory persisted in the shared sled tree, keyed `role:<identity>`.
pub struct SledRoleDirectory {
    instance: Arc<sled::Db>,
}

impl SledRoleDirectory {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self { instance }
    }
}

impl RoleDirectory for SledRoleDirectory {
    fn role_of(&self, identity: &str) -> Result<Role, LedgerError> {
        match self.instance.get(role_key(identity))? {
            Some(bytes) => Ok(minicbor::decode(&bytes)?),
            None => Ok(Role::None),
        }
    }

    fn assign_role(&self, identity: &str, role: Role) -> Result<(), LedgerError> {
        let cbor =
            minicbor::to_vec(role).map_err(|err| LedgerError::Codec(err.to_string()))?;
        self.instance.insert(role_key(identity), cbor)?;
        Ok(())
    }
}

/// In-memory directory for tests and embedded use.
#[derive(Default)]
pub struct MemoryRoleDirectory {
    inner: RwLock<HashMap<String, Role>>,
}

impl MemoryRoleDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoleDirectory for MemoryRoleDirectory {
    fn role_of(&self, identity: &str) -> Result<Role, LedgerError> {
        let map = self.inner.read().expect("role map lock poisoned");
        Ok(map.get(identity).copied().unwrap_or(Role::None))
    }

    fn assign_role(&self, identity: &str, role: Role) -> Result<(), LedgerError> {
        let mut map = self.inner.write().expect("role map lock poisoned");
        map.insert(identity.to_string(), role);
        Ok(())
    }
}
