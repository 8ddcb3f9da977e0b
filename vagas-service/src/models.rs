use diesel::prelude::*;
use shared::Unit;

#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = crate::schema::unidades)]
pub struct DbUnit {
    pub id: i32,
    pub nome: String,
    pub capacidade_vagas: i32,
    pub vagas_utilizadas: i32,
    pub vagas_disponiveis: i32,
    pub vagas_solicitadas: i32,
    pub vagas_confirmadas: i32,
}

/// Counter columns written back by a transition. `id`, `nome` and
/// `capacidade_vagas` are never touched by this service.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::unidades)]
pub struct UnitCounters {
    pub vagas_utilizadas: i32,
    pub vagas_disponiveis: i32,
    pub vagas_solicitadas: i32,
    pub vagas_confirmadas: i32,
}

impl From<DbUnit> for Unit {
    fn from(row: DbUnit) -> Self {
        Self {
            id: row.id,
            nome: row.nome,
            capacidade_vagas: row.capacidade_vagas,
            vagas_utilizadas: row.vagas_utilizadas,
            vagas_disponiveis: row.vagas_disponiveis,
            vagas_solicitadas: row.vagas_solicitadas,
            vagas_confirmadas: row.vagas_confirmadas,
        }
    }
}

impl From<&Unit> for UnitCounters {
    fn from(unit: &Unit) -> Self {
        Self {
            vagas_utilizadas: unit.vagas_utilizadas,
            vagas_disponiveis: unit.vagas_disponiveis,
            vagas_solicitadas: unit.vagas_solicitadas,
            vagas_confirmadas: unit.vagas_confirmadas,
        }
    }
}
