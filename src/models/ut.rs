// src/models/ut.rs

use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationError;

/// Unidade de trabalho (centro de custo) à qual requisições e usuários pertencem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct WorkUnit {
    #[schema(example = "020-johnson-projetos-sjc")]
    pub id: &'static str,
    #[schema(example = "020")]
    pub codigo: &'static str,
    #[schema(example = "São José dos Campos")]
    pub cidade: &'static str,
    pub descricao: &'static str,
}

const fn ut(
    id: &'static str,
    codigo: &'static str,
    cidade: &'static str,
    descricao: &'static str,
) -> WorkUnit {
    WorkUnit { id, codigo, cidade, descricao }
}

pub static WORK_UNITS: &[WorkUnit] = &[
    // São José dos Campos
    ut("020-johnson-projetos-sjc", "020", "São José dos Campos", "020 - JOHNSON/ KENVUE – PROJETOS - SÃO JOSÉ DOS CAMPOS"),
    ut("012-johnson-utilidades-sjc", "012", "São José dos Campos", "012 - JOHNSON/ KENVUE – UTILIDADES - SÃO JOSÉ DOS CAMPOS"),
    ut("026-johnson-manutencao-sjc", "026", "São José dos Campos", "026 - JOHNSON/ KENVUE – MANUTENÇÃO - SÃO JOSÉ DOS CAMPOS"),
    ut("031-johnson-limpeza-sjc", "031", "São José dos Campos", "031 - JOHNSON/ KENVUE – LIMPEZA - SÃO JOSÉ DOS CAMPOS"),
    ut("009-gerdau-servicos-sjc", "009", "São José dos Campos", "009 - GERDAU – SERVIÇOS - SÃO JOSÉ DOS CAMPOS"),
    ut("017-gerdau-manpred-sjc", "017", "São José dos Campos", "017 - GERDAU – MAN.PRED-MF-SÃO JOSÉ DOS CAMPOS"),
    ut("007-eaton-manpred-sjc", "007", "São José dos Campos", "007 - EATON – MAN.PRED-MF-SÃO JOSÉ DOS CAMPOS"),
    ut("000-panasonic-manpred-sjc", "000", "São José dos Campos", "000 - PANASONIC – MAN.PRED-MF-SÃO JOSÉ DOS CAMPOS"),
    ut("014-johnson-usinagem-sjc", "014", "São José dos Campos", "014 - JOHNSON/ KENVUE – USINAGEM-MF-SÃO JOSÉ DOS CAMPOS"),
    ut("032-johnson-almox-sjc", "032", "São José dos Campos", "032 - JOHNSON/ KENVUE – GESTÃO ALMOX-MF-SÃO JOSÉ DOS CAMPOS"),
    ut("000-becooper-manpred-sjc", "000", "São José dos Campos", "000 - BECOOPER – MAN.PRED-MF-SÃO JOSÉ DOS CAMPOS"),
    // Guarulhos
    ut("034-johnson-guarulhos", "034", "Guarulhos", "034 - JOHNSON & JOHNSON – MF-GUARULHOS"),
    ut("000-cummins-limpred-ms-guarulhos", "000", "Guarulhos", "000 - CUMMINS – LIMP.PRED-MS-GUARULHOS"),
    ut("001-cummins-manpred-mf-guarulhos", "001", "Guarulhos", "001 - CUMMINS – MAN.PRED-MF-GUARULHOS"),
    ut("003-cummins-limpred-ms-guarulhos", "003", "Guarulhos", "003 - CUMMINS – LIMP.PRED-MS-GUARULHOS"),
    ut("004-cummins-manpred-mf-guarulhos", "004", "Guarulhos", "004 - CUMMINS – MAN.PRED-MF-GUARULHOS"),
    // Jacareí
    ut("044-dow-man-equip-jacarei", "044", "Jacareí", "044 - DOW AGROSC – MAN.EQUIP-MF-JACAREÍ"),
    ut("002-ardagh-manpred-jacarei", "002", "Jacareí", "002 - ARDAGH – MAN.PRED-MF-JACAREÍ"),
    ut("003-ardagh-limpred-jacarei", "003", "Jacareí", "003 - ARDAGH – LIMP.PRED-MS-JACAREÍ"),
    ut("010-suzano-limpcons-jacarei", "010", "Jacareí", "010 - SUZANO – LIMP.CONS.AV-MS-JACAREÍ"),
    // Osasco
    ut("002-sbt-osasco", "002", "Osasco", "002 - SBT – MF-OSASCO"),
    ut("003-sbt-osasco", "003", "Osasco", "003 - SBT – MF-OSASCO"),
    // Vale do Paraíba e demais
    ut("001-amsted-cruzeiro", "001", "Cruzeiro", "001 - AMSTED MAXION – SERVIÇOS-CRUZEIRO"),
    ut("000-schlumberger-manpred-taubate", "000", "Taubaté", "000 - SCHLUMBERGER – MAN.PRED-MF-TAUBATÉ"),
    ut("010-schlumberger-limpred-taubate", "010", "Taubaté", "010 - SCHLUMBERGER – LIMP.PRED-MS-TAUBATÉ"),
    ut("000-schlumberger-bombeiros-taubate", "000", "Taubaté", "000 - SCHLUMBERGER – BOMBEIROS-MS-TAUBATÉ"),
    ut("006-aeroquip-guaratingueta", "006", "Guaratinguetá", "006 - AEROQUIP DO BRASIL – MF-GUARATINGUETA"),
    ut("009-cummins-campo-grande", "009", "Campo Grande", "009 - CUMMINS – FULL SERV-MF-CAMPO GRANDE"),
    ut("010-cummins-cuiaba", "010", "Cuiabá", "010 - CUMMINS – FULL SERV-MF-CUIABÁ"),
    ut("043-dow-franco-rocha", "043", "Franco da Rocha", "043 - DOW AGROSC – MAN.EQUIP-MF-FRANCO DA ROCHA"),
    ut("001-panasonic-extrema", "001", "Extrema", "001 - PANASONIC – MAN.PRED-MF-EXTREMA"),
    ut("000-masterfoods-limpcons-guararema", "000", "Guararema", "000 - MASTERFOODS – LIMP.CONS.AV-MS-GUARAREMA"),
    ut("001-masterfoods-manpred-guararema", "001", "Guararema", "001 - MASTERFOODS – MAN.PRED-MF-GUARAREMA"),
];

pub fn find(id: &str) -> Option<&'static WorkUnit> {
    WORK_UNITS.iter().find(|u| u.id == id)
}

/// Descrição legível da UT; cai para o próprio id quando ele não está no catálogo.
pub fn describe(id: &str) -> &str {
    find(id).map(|u| u.descricao).unwrap_or(id)
}

pub fn validate_ut(id: &str) -> Result<(), ValidationError> {
    if find(id).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("ut");
        err.message = Some("A UT deve ser uma opção válida da lista.".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = WORK_UNITS.iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), WORK_UNITS.len());
    }

    #[test]
    fn describe_falls_back_to_id() {
        assert_eq!(
            describe("020-johnson-projetos-sjc"),
            "020 - JOHNSON/ KENVUE – PROJETOS - SÃO JOSÉ DOS CAMPOS"
        );
        assert_eq!(describe("desconhecida"), "desconhecida");
    }

    #[test]
    fn validate_ut_rejects_unknown_ids() {
        assert!(validate_ut("010-cummins-cuiaba").is_ok());
        assert!(validate_ut("999-inexistente").is_err());
    }
}
