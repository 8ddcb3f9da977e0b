use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One organizational unit and its slot counters, as stored in `unidades`
/// and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: i32,
    pub nome: String,
    pub capacidade_vagas: i32,
    pub vagas_utilizadas: i32,
    pub vagas_disponiveis: i32,
    pub vagas_solicitadas: i32,
    pub vagas_confirmadas: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    #[serde(default)]
    pub vagas_desejadas: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    #[serde(default)]
    pub vagas_a_confirmar: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationReply {
    pub message: String,
    pub unidade: Unit,
}

/// Body of a 4xx reply. Infrastructure failures use [`InternalErrorResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("invalid quantity")]
    InvalidQuantity,
    #[error("invalid quantity to confirm")]
    InvalidConfirmQuantity,
    #[error("unit not found")]
    NotFound,
    #[error("no slots available")]
    NoSlotsAvailable,
    #[error("requested quantity exceeds available slots")]
    ExceedsAvailable,
    #[error("requested quantity exceeds solicited quantity")]
    ExceedsRequested,
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SlotError {
    /// HTTP status code the API answers with for this error.
    pub fn status(&self) -> u16 {
        match self {
            SlotError::InvalidQuantity
            | SlotError::InvalidConfirmQuantity
            | SlotError::NoSlotsAvailable
            | SlotError::ExceedsAvailable
            | SlotError::ExceedsRequested => 400,
            SlotError::NotFound => 404,
            SlotError::Database(_) | SlotError::Internal(_) => 500,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status() >= 500
    }
}

impl ReserveRequest {
    pub fn new(vagas_desejadas: i64) -> Self {
        Self {
            vagas_desejadas: Some(vagas_desejadas),
        }
    }

    pub fn quantity(&self) -> Result<i64, SlotError> {
        match self.vagas_desejadas {
            Some(qty) if qty > 0 => Ok(qty),
            _ => Err(SlotError::InvalidQuantity),
        }
    }
}

impl ConfirmRequest {
    pub fn new(vagas_a_confirmar: i64) -> Self {
        Self {
            vagas_a_confirmar: Some(vagas_a_confirmar),
        }
    }

    pub fn quantity(&self) -> Result<i64, SlotError> {
        match self.vagas_a_confirmar {
            Some(qty) if qty > 0 => Ok(qty),
            _ => Err(SlotError::InvalidConfirmQuantity),
        }
    }
}

impl Unit {
    /// Moves `qty` slots into the requested bucket.
    ///
    /// `vagas_disponiveis` is left untouched here; availability only drops
    /// when the reservation is confirmed.
    pub fn reserve(&self, qty: i64) -> Result<Unit, SlotError> {
        if qty <= 0 {
            return Err(SlotError::InvalidQuantity);
        }
        if self.vagas_disponiveis == 0 {
            return Err(SlotError::NoSlotsAvailable);
        }
        if qty > i64::from(self.vagas_disponiveis) {
            return Err(SlotError::ExceedsAvailable);
        }

        // qty <= vagas_disponiveis, so it fits in an i32
        let qty = qty as i32;
        let vagas_solicitadas = self
            .vagas_solicitadas
            .checked_add(qty)
            .ok_or_else(|| anyhow::anyhow!("vagas_solicitadas overflow on unit {}", self.id))?;

        Ok(Unit {
            vagas_solicitadas,
            ..self.clone()
        })
    }

    /// Finalizes `qty` previously requested slots: requested -> used, and
    /// only now is the available pool reduced.
    pub fn confirm(&self, qty: i64) -> Result<Unit, SlotError> {
        if qty <= 0 {
            return Err(SlotError::InvalidConfirmQuantity);
        }
        if qty > i64::from(self.vagas_solicitadas) {
            return Err(SlotError::ExceedsRequested);
        }

        let qty = qty as i32;
        let overflow = || anyhow::anyhow!("slot counter overflow on unit {}", self.id);

        Ok(Unit {
            vagas_solicitadas: self.vagas_solicitadas - qty,
            vagas_utilizadas: self.vagas_utilizadas.checked_add(qty).ok_or_else(overflow)?,
            vagas_disponiveis: self.vagas_disponiveis.checked_sub(qty).ok_or_else(overflow)?,
            vagas_confirmadas: self.vagas_confirmadas.checked_add(qty).ok_or_else(overflow)?,
            ..self.clone()
        })
    }
}
