//! Access control predicates, evaluated before any state is touched.

use crate::errors::{RegistryError, Result};
use crate::types::FileRecord;
use ikf_types::Address;
use tracing::warn;

/// Fails with `Unauthorized` unless `caller` is the current administrator.
pub fn require_admin(caller: &Address, admin: &Address) -> Result<()> {
    if caller != admin {
        warn!(target: "registry", "Admin action denied for {}", caller);
        return Err(RegistryError::Unauthorized {
            caller: *caller,
            reason: "is not the administrator".to_string(),
        });
    }
    Ok(())
}

/// Fails with `Unauthorized` unless `caller` owns `record`.
pub fn require_owner(caller: &Address, record: &FileRecord) -> Result<()> {
    if *caller != record.owner {
        warn!(
            target: "registry",
            "Owner action on {} denied for {}", record.filename, caller
        );
        return Err(RegistryError::Unauthorized {
            caller: *caller,
            reason: format!("is not the owner of {}", record.filename),
        });
    }
    Ok(())
}
