//! Entity services: the uniform create / read / update / archive contract.
//!
//! One generic [`EntityService`] serves every entity type. Each service is a
//! short-lived borrow of the [`Ledger`], obtained through accessors such as
//! [`Ledger::accounts`].
//!
//! Updates and archives are read-modify-write cycles over the store's
//! check-and-swap primitive. A patch that names its `revision` is checked
//! against it and fails with `Conflict` on mismatch; otherwise a lost race is
//! retried up to `conflict_retries` times (at most once) before the conflict is surfaced.

use std::marker::PhantomData;

use chrono::Duration;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::config::MAX_CONFLICT_RETRIES;
use crate::entities::Balanced;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::record::{
    Entity, Record, RecordId, RecordKind, RecordState, Stored, Timestamp, PROTECTED_KEYS,
};
use crate::store::{RecordRepository, RecordStore, RecordsExt, Selector, StoreError};

pub struct EntityService<'a, S, E> {
    ledger: &'a Ledger<S>,
    _marker: PhantomData<E>,
}

impl<'a, S: RecordStore, E: Entity> EntityService<'a, S, E> {
    pub fn new(ledger: &'a Ledger<S>) -> Self {
        Self {
            ledger,
            _marker: PhantomData,
        }
    }

    fn repository(&self) -> RecordRepository<'a, S, E> {
        self.ledger.store().records::<E>()
    }

    /// Creates a record from a loosely typed payload.
    ///
    /// `id` and `createdAt` are kept when supplied. `type` is taken from the
    /// payload only for entities spanning several kinds; single-kind entities
    /// always get their own kind. `state`, `storeNo` and `updatedAt` are
    /// always assigned here.
    pub fn create(&self, data: Value) -> LedgerResult<Stored<E>> {
        let mut fields = into_object(data, E::NAME)?;

        let kind = self.resolve_kind(fields.get("type"))?;
        let id = match fields.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => Some(RecordId::from(id.as_str())),
            Some(Value::String(_)) | Some(Value::Null) | None => None,
            Some(other) => {
                return Err(LedgerError::InvalidArgument(format!(
                    "id must be a string, got {}",
                    other
                )))
            }
        };
        let created_at = match fields.get("createdAt") {
            Some(Value::Null) | None => None,
            Some(value) => Some(serde_json::from_value::<Timestamp>(value.clone())?),
        };

        fields.retain(|key, _| !PROTECTED_KEYS.contains(&key.as_str()));
        let body: E = serde_json::from_value(Value::Object(fields))?;

        self.insert(id, kind, created_at, body)
    }

    /// Creates a record for a single-kind entity from a typed body.
    pub fn create_entity(&self, data: E) -> LedgerResult<Stored<E>> {
        let kind = self.resolve_kind(None)?;
        self.insert(None, kind, None, data)
    }

    /// Creates a record of an explicit kind, for entities spanning several.
    pub fn create_as(&self, kind: RecordKind, data: E) -> LedgerResult<Stored<E>> {
        if !E::accepts(kind) {
            return Err(LedgerError::InvalidArgument(format!(
                "{} cannot be stored as type {}",
                E::NAME,
                kind
            )));
        }
        self.insert(None, kind, None, data)
    }

    fn insert(
        &self,
        id: Option<RecordId>,
        kind: RecordKind,
        created_at: Option<Timestamp>,
        data: E,
    ) -> LedgerResult<Stored<E>> {
        let store_no = &self.ledger.config().store_no;
        let now = self.ledger.now();
        let record = Record {
            id: id.unwrap_or_else(|| RecordId::generate(store_no)),
            kind,
            state: RecordState::Active,
            store_no: store_no.clone(),
            created_at: created_at.unwrap_or(now),
            updated_at: now,
            data,
        };

        let stored = self.repository().insert(&record)?;
        debug!(
            "event=record_created module=service entity={} id={} type={}",
            E::NAME,
            stored.data.id,
            stored.data.kind
        );
        Ok(stored)
    }

    fn resolve_kind(&self, requested: Option<&Value>) -> LedgerResult<RecordKind> {
        if let [only] = E::KINDS {
            return Ok(*only);
        }
        let requested = requested.ok_or_else(|| {
            LedgerError::InvalidArgument(format!(
                "{} requires a type, one of {}",
                E::NAME,
                kind_list::<E>()
            ))
        })?;
        match serde_json::from_value::<RecordKind>(requested.clone()) {
            Ok(kind) if E::accepts(kind) => Ok(kind),
            _ => Err(LedgerError::InvalidArgument(format!(
                "{} type must be one of {}, got {}",
                E::NAME,
                kind_list::<E>(),
                requested
            ))),
        }
    }

    /// Every active record of this entity, in store order.
    pub fn get_all(&self) -> LedgerResult<Vec<Stored<E>>> {
        Ok(self.repository().select(&Selector::new().active())?)
    }

    /// Point lookup regardless of state. Records of other entity types are
    /// reported as not found.
    pub fn get_by_id(&self, id: &str) -> LedgerResult<Stored<E>> {
        self.repository()
            .get(id)?
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    /// Shallow-merges `patch` over the stored record and re-activates it.
    ///
    /// `patch.id` is required. Header keys in the patch are ignored, except
    /// `revision`, which becomes the expected revision.
    pub fn update(&self, patch: Value) -> LedgerResult<Stored<E>> {
        let patch = into_object(patch, E::NAME)?;
        let id = match patch.get("id") {
            Some(Value::String(id)) => id.clone(),
            _ => {
                return Err(LedgerError::InvalidArgument(format!(
                    "{} update requires a string id",
                    E::NAME
                )))
            }
        };
        let expected = match patch.get("revision") {
            Some(Value::Null) | None => None,
            Some(value) => Some(value.as_u64().ok_or_else(|| {
                LedgerError::InvalidArgument(format!("revision must be a number, got {}", value))
            })?),
        };

        self.update_with(&id, expected, |record| {
            *record = merge_patch(record, &patch)?;
            record.state = RecordState::Active;
            Ok(())
        })
    }

    /// Soft-deletes the record. Archiving an archived record succeeds.
    pub fn archive(&self, id: &str) -> LedgerResult<Stored<E>> {
        self.update_with(id, None, |record| {
            record.state = RecordState::Inactive;
            Ok(())
        })
    }

    /// Read-modify-write through the store's check-and-swap.
    ///
    /// `apply` edits a copy of the current record. `id`, `type`, `storeNo`
    /// and `createdAt` are restored afterwards and `updatedAt` is advanced
    /// past its previous value.
    pub fn update_with<F>(
        &self,
        id: &str,
        expected_revision: Option<u64>,
        mut apply: F,
    ) -> LedgerResult<Stored<E>>
    where
        F: FnMut(&mut Record<E>) -> LedgerResult<()>,
    {
        let repository = self.repository();
        let retries = match expected_revision {
            Some(_) => 0,
            None => self.ledger.config().conflict_retries.min(MAX_CONFLICT_RETRIES),
        };
        let mut attempt = 0;

        loop {
            let current = self.get_by_id(id)?;
            if let Some(expected) = expected_revision {
                if expected != current.version {
                    return Err(LedgerError::Conflict {
                        id: id.to_string(),
                        expected,
                        actual: current.version,
                    });
                }
            }

            let mut next = current.data.clone();
            apply(&mut next)?;
            next.id = current.data.id.clone();
            next.kind = current.data.kind;
            next.store_no = current.data.store_no.clone();
            next.created_at = current.data.created_at;
            next.updated_at = self.next_updated_at(current.data.updated_at);

            match repository.compare_and_swap(&next, current.version) {
                Ok(saved) => {
                    debug!(
                        "event=record_written module=service entity={} id={} revision={} state={}",
                        E::NAME,
                        id,
                        saved.version,
                        saved.data.state
                    );
                    return Ok(saved);
                }
                Err(StoreError::Conflict { actual, .. }) if attempt < retries => {
                    attempt += 1;
                    warn!(
                        "event=record_conflict module=service status=retry entity={} id={} expected={} actual={} attempt={}",
                        E::NAME,
                        id,
                        current.version,
                        actual,
                        attempt
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn next_updated_at(&self, previous: Timestamp) -> Timestamp {
        let now = self.ledger.now();
        if now > previous {
            now
        } else {
            previous + Duration::milliseconds(1)
        }
    }
}

impl<'a, S: RecordStore, E: Entity + Balanced> EntityService<'a, S, E> {
    /// Moves the stored balance by `delta`.
    ///
    /// This is the one place balances change outside a caller's own update
    /// patch. Nothing calls it on the caller's behalf: recording a
    /// transaction does not touch any account.
    pub fn adjust_balance(&self, id: &str, delta: Decimal) -> LedgerResult<Stored<E>> {
        self.update_with(id, None, |record| {
            let balance = record.data.balance() + delta;
            record.data.set_balance(balance);
            Ok(())
        })
    }
}

fn into_object(value: Value, entity: &str) -> LedgerResult<Map<String, Value>> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(LedgerError::InvalidArgument(format!(
            "{} must be an object, got {}",
            entity, other
        ))),
    }
}

fn merge_patch<E: Entity>(record: &Record<E>, patch: &Map<String, Value>) -> LedgerResult<Record<E>> {
    let mut merged = match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => {
            return Err(LedgerError::Persistence(format!(
                "{} did not serialize to an object",
                record.id
            )))
        }
        Err(err) => return Err(LedgerError::Persistence(err.to_string())),
    };
    for (key, value) in patch {
        if !PROTECTED_KEYS.contains(&key.as_str()) {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok(serde_json::from_value(Value::Object(merged))?)
}

fn kind_list<E: Entity>() -> String {
    E::KINDS
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join("|")
}
