//! Service layer API for custody transitions and read-only queries.
//!
//! `CustodyService` is the custody state machine and the only writer of
//! batch, history and role state. Every transition validates the caller's
//! role and the batch's Stage/Status before touching storage, then applies
//! the record mutation and the history append in a single [`sled::Batch`],
//! so a call either commits in full or leaves no trace.
use std::sync::Arc;

use crate::batch::{Batch, BatchId, Stage, Status, TimeStamp};
use crate::error::LedgerError;
use crate::history::{HistoryEntry, entry_key, entry_prefix};
use crate::policy::{LedgerPolicy, RoleAssignmentPolicy, TransportGate};
use crate::registry::{Role, RoleDirectory};

/// Read projection returned by [`CustodyService::get_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub name: String,
    pub holder: String,
    pub stage: Stage,
    pub updates_count: u64,
}

/// Read projection returned by [`CustodyService::get_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub status: Status,
    pub holder: String,
    pub location: String,
    pub stage: Stage,
}

pub struct CustodyService<R: RoleDirectory> {
    instance: Arc<sled::Db>,
    roles: R,
    policy: LedgerPolicy,
}

fn batch_key(id: &BatchId) -> Vec<u8> {
    [b"batch:".as_slice(), id.as_bytes()].concat()
}

fn to_cbor<T: minicbor::Encode<()>>(value: &T) -> Result<Vec<u8>, LedgerError> {
    minicbor::to_vec(value).map_err(|err| LedgerError::Codec(err.to_string()))
}

impl<R: RoleDirectory> CustodyService<R> {
    pub fn new(instance: Arc<sled::Db>, roles: R, policy: LedgerPolicy) -> Self {
        Self {
            instance,
            roles,
            policy,
        }
    }

    /// Assign or overwrite the role of `identity`, gated by the configured
    /// [`RoleAssignmentPolicy`]. Roles are not per-batch state, so no history
    /// entry is written.
    pub fn assign_role(
        &self,
        caller: &str,
        identity: &str,
        role: Role,
    ) -> Result<(), LedgerError> {
        match &self.policy.role_assignment {
            RoleAssignmentPolicy::AdminOnly { admin } if caller != admin => {
                tracing::debug!(caller, identity, "role assignment denied, admin only");
                return Err(LedgerError::AssignmentDenied {
                    caller: caller.to_string(),
                });
            }
            RoleAssignmentPolicy::SelfService if caller != identity => {
                tracing::debug!(caller, identity, "role assignment denied, self only");
                return Err(LedgerError::AssignmentDenied {
                    caller: caller.to_string(),
                });
            }
            _ => {}
        }

        self.roles.assign_role(identity, role)?;
        tracing::info!(identity, %role, "role assigned");
        Ok(())
    }

    // TRANSITIONS

    /// Bring a new batch into existence. Supplier only; the identifier must
    /// not already exist.
    pub fn create(
        &self,
        caller: &str,
        id: BatchId,
        name: &str,
        note: &str,
    ) -> Result<Batch, LedgerError> {
        let role = self.require_role(caller, Role::Supplier, "create")?;

        if self.instance.contains_key(batch_key(&id))? {
            tracing::debug!(batch = %id, "create rejected, identifier exists");
            return Err(LedgerError::DuplicateCreate(id));
        }

        let batch = Batch {
            name: name.to_string(),
            holder: caller.to_string(),
            stage: Stage::Created,
            status: Status::Pending,
            location: "origin".to_string(),
            updates_count: 1,
        };
        let entry = HistoryEntry::new(caller, role, TimeStamp::new(), note);

        self.commit(&id, &batch, 0, &entry)?;
        tracing::info!(batch = %id, action = "create", holder = caller, "transition committed");
        Ok(batch)
    }

    /// Manufacturer processes a created batch into its finished form.
    pub fn manufacture(&self, caller: &str, id: BatchId, note: &str) -> Result<Batch, LedgerError> {
        self.advance(
            caller,
            id,
            note,
            "manufacture",
            Role::Manufacturer,
            &[Stage::Created],
            Stage::Manufactured,
        )
    }

    /// Distributor takes formal receipt of a manufactured batch.
    pub fn receive_by_distributor(
        &self,
        caller: &str,
        id: BatchId,
        note: &str,
    ) -> Result<Batch, LedgerError> {
        self.advance(
            caller,
            id,
            note,
            "receive_by_distributor",
            Role::Distributor,
            &[Stage::Manufactured],
            Stage::WithDistributor,
        )
    }

    /// Wholesaler takes formal receipt from the distributor. The wholesaler
    /// leg is optional; retailers may also receive straight from the
    /// distributor.
    pub fn receive_by_wholesaler(
        &self,
        caller: &str,
        id: BatchId,
        note: &str,
    ) -> Result<Batch, LedgerError> {
        self.advance(
            caller,
            id,
            note,
            "receive_by_wholesaler",
            Role::Wholesaler,
            &[Stage::WithDistributor],
            Stage::WithWholesaler,
        )
    }

    /// Retailer takes formal receipt, from either the distributor or the
    /// wholesaler.
    pub fn receive_by_retailer(
        &self,
        caller: &str,
        id: BatchId,
        note: &str,
    ) -> Result<Batch, LedgerError> {
        self.advance(
            caller,
            id,
            note,
            "receive_by_retailer",
            Role::Retailer,
            &[Stage::WithDistributor, Stage::WithWholesaler],
            Stage::WithRetailer,
        )
    }

    /// Retailer records the final sale. Terminal: no transition applies to a
    /// sold batch.
    pub fn mark_sold(&self, caller: &str, id: BatchId, note: &str) -> Result<Batch, LedgerError> {
        let role = self.require_role(caller, Role::Retailer, "mark_sold")?;
        let mut batch = self.load_batch(&id)?;

        if batch.stage != Stage::WithRetailer {
            return self.reject("mark_sold", &id, &batch);
        }

        batch.stage = Stage::Sold;
        batch.status = Status::Completed;

        self.apply(caller, role, &id, batch, note, "mark_sold")
    }

    /// Transporter takes possession of a batch awaiting pickup. Stage and
    /// holder are unchanged; only the transit overlay moves.
    pub fn transporter_pickup(
        &self,
        caller: &str,
        id: BatchId,
        from: &str,
        to: &str,
        note: &str,
    ) -> Result<Batch, LedgerError> {
        let role = self.require_role(caller, Role::Transporter, "transporter_pickup")?;
        let mut batch = self.load_batch(&id)?;

        if batch.status != Status::Pending {
            return self.reject("transporter_pickup", &id, &batch);
        }

        batch.status = Status::InProgress;
        batch.location = format!("in transit: {from} -> {to}");

        self.apply(caller, role, &id, batch, note, "transporter_pickup")
    }

    /// Transporter releases a batch at its destination, awaiting formal
    /// receipt by the next-stage role.
    pub fn transporter_deliver(
        &self,
        caller: &str,
        id: BatchId,
        destination: &str,
        note: &str,
    ) -> Result<Batch, LedgerError> {
        let role = self.require_role(caller, Role::Transporter, "transporter_deliver")?;
        let mut batch = self.load_batch(&id)?;

        if batch.status != Status::InProgress {
            return self.reject("transporter_deliver", &id, &batch);
        }

        batch.status = Status::Completed;
        batch.location = destination.to_string();

        self.apply(caller, role, &id, batch, note, "transporter_deliver")
    }

    /// Legacy single-call transport: pickup and delivery collapsed into one
    /// entry. Kept for callers that predate the two-step flow.
    pub fn pickup_for_transport(
        &self,
        caller: &str,
        id: BatchId,
        destination: &str,
        note: &str,
    ) -> Result<Batch, LedgerError> {
        let role = self.require_role(caller, Role::Transporter, "pickup_for_transport")?;
        let mut batch = self.load_batch(&id)?;

        if batch.status != Status::Pending {
            return self.reject("pickup_for_transport", &id, &batch);
        }

        batch.status = Status::Completed;
        batch.location = destination.to_string();

        self.apply(caller, role, &id, batch, note, "pickup_for_transport")
    }

    // QUERIES

    /// Core record projection: name, current holder, stage, update count.
    pub fn get_batch(&self, id: &BatchId) -> Result<BatchSummary, LedgerError> {
        let batch = self.load_batch(id)?;
        Ok(BatchSummary {
            name: batch.name,
            holder: batch.holder,
            stage: batch.stage,
            updates_count: batch.updates_count,
        })
    }

    /// Transit projection: status, holder, free-text location, stage.
    pub fn get_status(&self, id: &BatchId) -> Result<StatusView, LedgerError> {
        let batch = self.load_batch(id)?;
        Ok(StatusView {
            status: batch.status,
            holder: batch.holder,
            location: batch.location,
            stage: batch.stage,
        })
    }

    /// Number of history entries, counted from the log itself.
    pub fn history_len(&self, id: &BatchId) -> Result<u64, LedgerError> {
        if !self.instance.contains_key(batch_key(id))? {
            return Err(LedgerError::NotFound(*id));
        }

        let mut len = 0u64;
        for item in self.instance.scan_prefix(entry_prefix(id)) {
            item?;
            len += 1;
        }
        Ok(len)
    }

    /// History entry `index` (0-based, oldest first).
    pub fn history_entry(&self, id: &BatchId, index: u64) -> Result<HistoryEntry, LedgerError> {
        let batch = self.load_batch(id)?;

        match self.instance.get(entry_key(id, index))? {
            Some(bytes) => Ok(minicbor::decode(&bytes)?),
            None => Err(LedgerError::HistoryOutOfRange {
                index,
                len: batch.updates_count,
            }),
        }
    }

    /// Role of `identity` per the injected directory.
    pub fn role_of(&self, identity: &str) -> Result<Role, LedgerError> {
        self.roles.role_of(identity)
    }

    // INTERNALS

    fn load_batch(&self, id: &BatchId) -> Result<Batch, LedgerError> {
        let bytes = self
            .instance
            .get(batch_key(id))?
            .ok_or(LedgerError::NotFound(*id))?;
        Ok(minicbor::decode(&bytes)?)
    }

    fn require_role(
        &self,
        caller: &str,
        required: Role,
        action: &'static str,
    ) -> Result<Role, LedgerError> {
        let actual = self.roles.role_of(caller)?;
        if actual != required {
            tracing::debug!(caller, action, %required, %actual, "caller not authorized");
            return Err(LedgerError::Unauthorized { required, actual });
        }
        Ok(actual)
    }

    /// Shared body of the stage-advancing transitions: role check, stage
    /// precondition, transport gate, then custody moves to the caller and the
    /// transit overlay resets to Pending.
    fn advance(
        &self,
        caller: &str,
        id: BatchId,
        note: &str,
        action: &'static str,
        required: Role,
        allowed_from: &[Stage],
        to: Stage,
    ) -> Result<Batch, LedgerError> {
        let role = self.require_role(caller, required, action)?;
        let mut batch = self.load_batch(&id)?;

        if !allowed_from.contains(&batch.stage) || !self.transport_gate_open(&batch) {
            return self.reject(action, &id, &batch);
        }

        batch.stage = to;
        batch.holder = caller.to_string();
        batch.status = Status::Pending;

        self.apply(caller, role, &id, batch, note, action)
    }

    /// Under the strict gate a stage advance needs a completed transport leg.
    fn transport_gate_open(&self, batch: &Batch) -> bool {
        match self.policy.transport_gate {
            TransportGate::Lenient => true,
            TransportGate::Strict => batch.status == Status::Completed,
        }
    }

    fn reject(
        &self,
        action: &'static str,
        id: &BatchId,
        batch: &Batch,
    ) -> Result<Batch, LedgerError> {
        tracing::debug!(
            batch = %id,
            action,
            stage = %batch.stage,
            status = %batch.status,
            "transition rejected",
        );
        Err(LedgerError::InvalidTransition {
            action,
            stage: batch.stage,
            status: batch.status,
        })
    }

    /// Bump the update count and commit the mutated record plus one history
    /// entry atomically.
    fn apply(
        &self,
        caller: &str,
        role: Role,
        id: &BatchId,
        mut batch: Batch,
        note: &str,
        action: &'static str,
    ) -> Result<Batch, LedgerError> {
        let seq = batch.updates_count;
        batch.updates_count += 1;

        let entry = HistoryEntry::new(caller, role, TimeStamp::new(), note);
        self.commit(id, &batch, seq, &entry)?;

        tracing::info!(
            batch = %id,
            action,
            stage = %batch.stage,
            status = %batch.status,
            holder = %batch.holder,
            "transition committed",
        );
        Ok(batch)
    }

    /// Batch insert: record update and history entry land together or not at
    /// all. The entry key is derived from the sequence number, so the arena
    /// is only ever extended at its tail.
    fn commit(
        &self,
        id: &BatchId,
        batch: &Batch,
        seq: u64,
        entry: &HistoryEntry,
    ) -> Result<(), LedgerError> {
        let record_cbor = to_cbor(batch)?;
        let entry_cbor = to_cbor(entry)?;

        let mut writes = sled::Batch::default();
        writes.insert(batch_key(id), record_cbor);
        writes.insert(entry_key(id, seq), entry_cbor);
        self.instance.apply_batch(writes)?;

        Ok(())
    }
}
