use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MedicaoError, Result};
use crate::models::SemanticRole;

/// Keywords for one role. Matching is lowercase substring containment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleKeywords {
    pub role: SemanticRole,
    pub keywords: Vec<String>,
}

/// Roles in priority order, each with its keywords. When a column label
/// matches several roles, the earlier entry takes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordTable(pub Vec<RoleKeywords>);

// (role, keywords) in priority order
const DEFAULT_KEYWORDS: &[(SemanticRole, &[&str])] = &[
    (SemanticRole::Date, &["data", "date", "periodo", "período", "mes", "mês"]),
    (
        SemanticRole::Quantity,
        &["medicao", "medição", "quantidade", "qty", "amount", "medido", "qtd"],
    ),
    (
        SemanticRole::MonetaryValue,
        &["valor", "preço", "preco", "custo", "total", "price", "value"],
    ),
    (
        SemanticRole::ResponsibleParty,
        &["responsavel", "responsável", "encarregado", "owner", "fiscal"],
    ),
    (
        SemanticRole::Location,
        &["local", "localizacao", "localização", "trecho", "area", "área", "location"],
    ),
    (SemanticRole::Unit, &["unidade", "unid", "unit", "und."]),
    (
        SemanticRole::Discipline,
        &["disciplina", "atividade", "servico", "serviço", "categoria", "discipline", "activity"],
    ),
    (SemanticRole::Balance, &["saldo", "balance", "restante"]),
    (SemanticRole::CumulativeTotal, &["acumulado", "cumulative", "acum"]),
];

impl Default for KeywordTable {
    fn default() -> Self {
        KeywordTable(
            DEFAULT_KEYWORDS
                .iter()
                .map(|(role, words)| RoleKeywords {
                    role: *role,
                    keywords: words.iter().map(|w| w.to_string()).collect(),
                })
                .collect(),
        )
    }
}

impl KeywordTable {
    fn matching_role(&self, label_lower: &str, mapping: &SchemaMapping) -> Option<SemanticRole> {
        self.0
            .iter()
            .filter(|rk| mapping.get(rk.role).is_none())
            .find(|rk| {
                rk.keywords
                    .iter()
                    .any(|w| !w.is_empty() && label_lower.contains(&w.to_lowercase()))
            })
            .map(|rk| rk.role)
    }
}

/// Role to column label. A label appears here only if the table has it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaMapping(BTreeMap<SemanticRole, String>);

impl SchemaMapping {
    pub fn get(&self, role: SemanticRole) -> Option<&str> {
        self.0.get(&role).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Binds column labels to roles by keyword. Columns are visited in order;
/// each column fills at most one role and each role takes the first column
/// that matches it.
pub fn infer_mapping<S: AsRef<str>>(columns: &[S], keywords: &KeywordTable) -> SchemaMapping {
    let mut mapping = SchemaMapping::default();
    for column in columns {
        let label = column.as_ref();
        let lower = label.to_lowercase();
        if let Some(role) = keywords.matching_role(&lower, &mapping) {
            tracing::debug!(column = label, role = role.name(), "bound column");
            mapping.0.insert(role, label.to_string());
        }
    }
    mapping
}

/// Applies explicit user choices on top of an inferred mapping. Overrides
/// win over inference but must name a column of the table.
pub fn apply_overrides<S: AsRef<str>>(
    mapping: &SchemaMapping,
    overrides: &[(SemanticRole, String)],
    columns: &[S],
) -> Result<SchemaMapping> {
    let mut next = mapping.clone();
    for (role, label) in overrides {
        if !columns.iter().any(|c| c.as_ref() == label) {
            return Err(MedicaoError::UnknownColumn(label.clone()));
        }
        next.0.insert(*role, label.clone());
    }
    Ok(next)
}
