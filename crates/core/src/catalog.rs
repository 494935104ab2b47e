//! Fixed local identities of the eight course modules and the additional
//! sections shown below them.

use serde::Serialize;

use crate::course::{ModuleIndex, MODULE_COUNT};

/// Local identity of one module slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleCatalogEntry {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub duration: &'static str,
}

/// Catalog entries, in slot order.
pub const MODULE_CATALOG: [ModuleCatalogEntry; MODULE_COUNT] = [
    ModuleCatalogEntry {
        title: "Módulo 1",
        subtitle: "Fundamentos de IA generativa",
        duration: "16h",
    },
    ModuleCatalogEntry {
        title: "Módulo 2",
        subtitle: "Governança e risco",
        duration: "16h",
    },
    ModuleCatalogEntry {
        title: "Módulo 3",
        subtitle: "Possibilidades tecnológicas",
        duration: "16h",
    },
    ModuleCatalogEntry {
        title: "Módulo 4",
        subtitle: "Engenharia de prompts e padrões de saída",
        duration: "16h",
    },
    ModuleCatalogEntry {
        title: "Módulo 5",
        subtitle: "Agentes e automação de workflow",
        duration: "16h",
    },
    ModuleCatalogEntry {
        title: "Módulo 6",
        subtitle: "IA no ecossistema corporativo",
        duration: "16h",
    },
    ModuleCatalogEntry {
        title: "Módulo 7",
        subtitle: "Confiabilidade, vieses e segurança",
        duration: "16h",
    },
    ModuleCatalogEntry {
        title: "Módulo 8",
        subtitle: "Produtividade e colaboração com IA",
        duration: "16h",
    },
];

/// Catalog entry for a slot.
pub fn module_entry(index: ModuleIndex) -> &'static ModuleCatalogEntry {
    &MODULE_CATALOG[index.slot()]
}

// ---------------------------------------------------------------------------
// Additional sections
// ---------------------------------------------------------------------------

/// Sections listed after the modules. Only the survey is ever gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionalSection {
    Calendar,
    ExtraExercises,
    Questions,
    InstitutionalSurvey,
}

impl AdditionalSection {
    pub const ALL: [AdditionalSection; 4] = [
        Self::Calendar,
        Self::ExtraExercises,
        Self::Questions,
        Self::InstitutionalSurvey,
    ];

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Calendar => "Calendário",
            Self::ExtraExercises => "Exercícios Extras",
            Self::Questions => "Tire Suas Dúvidas Aqui",
            Self::InstitutionalSurvey => "Pesquisa Institucional",
        }
    }

    /// Whether the section is locked given the all-modules-completed gate.
    pub fn is_locked(self, all_modules_completed: bool) -> bool {
        matches!(self, Self::InstitutionalSurvey) && !all_modules_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_titles_follow_slot_numbers() {
        for index in ModuleIndex::all() {
            assert_eq!(module_entry(index).title, format!("Módulo {index}"));
        }
    }

    #[test]
    fn only_survey_is_gated() {
        for section in AdditionalSection::ALL {
            assert!(!section.is_locked(true));
        }
        let locked: Vec<_> = AdditionalSection::ALL
            .into_iter()
            .filter(|s| s.is_locked(false))
            .collect();
        assert_eq!(locked, vec![AdditionalSection::InstitutionalSurvey]);
    }
}
