diesel::table! {
    unidades (id) {
        id -> Int4,
        nome -> Varchar,
        capacidade_vagas -> Int4,
        vagas_utilizadas -> Int4,
        vagas_disponiveis -> Int4,
        vagas_solicitadas -> Int4,
        vagas_confirmadas -> Int4,
    }
}
