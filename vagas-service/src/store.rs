use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{pooled_connection::bb8::Pool, AsyncConnection, AsyncPgConnection, RunQueryDsl};
use shared::{SlotError, Unit};
use tracing::info;
use crate::models::*;
use crate::schema::*;

pub type DbPool = Pool<AsyncPgConnection>;

type Transition = fn(&Unit, i64) -> Result<Unit, SlotError>;

/// Reads and updates the `unidades` table.
///
/// `reserve` and `confirm` must apply their transition atomically: the row
/// read and the counter write happen under one lock, so concurrent calls on
/// the same unit never lose an update.
#[async_trait]
pub trait UnitStore: Send + Sync {
    /// All units, ascending by id.
    async fn list_units(&self) -> Result<Vec<Unit>, SlotError>;

    async fn reserve(&self, id: i32, qty: i64) -> Result<Unit, SlotError>;

    async fn confirm(&self, id: i32, qty: i64) -> Result<Unit, SlotError>;
}

pub struct PgUnitStore {
    pool: DbPool,
}

impl PgUnitStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn apply(&self, id: i32, qty: i64, transition: Transition) -> Result<Unit, SlotError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get database connection: {}", e))?;

        conn.transaction::<Unit, SlotError, _>(|conn| {
            Box::pin(async move {
                let row = unidades::table
                    .filter(unidades::id.eq(id))
                    .for_update()
                    .get_result::<DbUnit>(conn)
                    .await
                    .optional()?;

                let current: Unit = row.ok_or(SlotError::NotFound)?.into();
                let next = transition(&current, qty)?;
                let counters = UnitCounters::from(&next);

                let updated = diesel::update(unidades::table.filter(unidades::id.eq(id)))
                    .set(&counters)
                    .get_result::<DbUnit>(conn)
                    .await?;

                Ok(Unit::from(updated))
            })
        })
        .await
    }
}

#[async_trait]
impl UnitStore for PgUnitStore {
    async fn list_units(&self) -> Result<Vec<Unit>, SlotError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get database connection: {}", e))?;

        let rows = unidades::table
            .order(unidades::id.asc())
            .load::<DbUnit>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Unit::from).collect())
    }

    async fn reserve(&self, id: i32, qty: i64) -> Result<Unit, SlotError> {
        let unit = self.apply(id, qty, Unit::reserve).await?;
        info!(
            "Reserved {} slots on unit {} (requested now {})",
            qty, id, unit.vagas_solicitadas
        );
        Ok(unit)
    }

    async fn confirm(&self, id: i32, qty: i64) -> Result<Unit, SlotError> {
        let unit = self.apply(id, qty, Unit::confirm).await?;
        info!(
            "Confirmed {} slots on unit {} (available now {})",
            qty, id, unit.vagas_disponiveis
        );
        Ok(unit)
    }
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Map-backed store; the mutex plays the role of the row lock.
    #[derive(Default)]
    pub struct MemoryUnitStore {
        units: Mutex<BTreeMap<i32, Unit>>,
    }

    impl MemoryUnitStore {
        pub fn with_units(units: impl IntoIterator<Item = Unit>) -> Self {
            Self {
                units: Mutex::new(units.into_iter().map(|u| (u.id, u)).collect()),
            }
        }

        pub fn get(&self, id: i32) -> Option<Unit> {
            self.units.lock().unwrap().get(&id).cloned()
        }

        fn apply(&self, id: i32, qty: i64, transition: Transition) -> Result<Unit, SlotError> {
            let mut units = self.units.lock().unwrap();
            let current = units.get_mut(&id).ok_or(SlotError::NotFound)?;
            let next = transition(current, qty)?;
            *current = next.clone();
            Ok(next)
        }
    }

    #[async_trait]
    impl UnitStore for MemoryUnitStore {
        async fn list_units(&self) -> Result<Vec<Unit>, SlotError> {
            Ok(self.units.lock().unwrap().values().cloned().collect())
        }

        async fn reserve(&self, id: i32, qty: i64) -> Result<Unit, SlotError> {
            self.apply(id, qty, Unit::reserve)
        }

        async fn confirm(&self, id: i32, qty: i64) -> Result<Unit, SlotError> {
            self.apply(id, qty, Unit::confirm)
        }
    }

    /// Store whose backend is always down.
    pub struct UnavailableStore;

    #[async_trait]
    impl UnitStore for UnavailableStore {
        async fn list_units(&self) -> Result<Vec<Unit>, SlotError> {
            Err(anyhow::anyhow!("connection refused").into())
        }

        async fn reserve(&self, _id: i32, _qty: i64) -> Result<Unit, SlotError> {
            Err(anyhow::anyhow!("connection refused").into())
        }

        async fn confirm(&self, _id: i32, _qty: i64) -> Result<Unit, SlotError> {
            Err(diesel::result::Error::BrokenTransactionManager.into())
        }
    }
}
