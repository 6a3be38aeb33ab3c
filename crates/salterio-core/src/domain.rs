//! Content domains: per-site defaults and classification tables.
//!
//! Both blogs run the same pipeline; everything that differs between them
//! lives in a [`DomainProfile`].

use std::fmt;
use std::str::FromStr;

use crate::classify::{ClassificationKind, ContentClassifier, KeywordTable, PrimarySource};
use crate::error::AppError;
use crate::text::AnchorMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentDomain {
    /// Liturgical contemplations, classified by time and cycle.
    Contemplations,
    /// Spiritual exercises, classified by type and category.
    Exercises,
}

impl fmt::Display for ContentDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentDomain::Contemplations => write!(f, "contemplaciones"),
            ContentDomain::Exercises => write!(f, "ejercicios"),
        }
    }
}

impl FromStr for ContentDomain {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "contemplaciones" | "contemplations" => Ok(ContentDomain::Contemplations),
            "ejercicios" | "exercises" => Ok(ContentDomain::Exercises),
            other => Err(AppError::ConfigError(format!(
                "Unknown content domain '{other}': expected 'contemplaciones' or 'ejercicios'"
            ))),
        }
    }
}

/// Everything that distinguishes one content domain from the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainProfile {
    pub domain: ContentDomain,
    pub site_url: &'static str,
    pub user_agent: &'static str,
    pub corpus_file: &'static str,
    pub ledger_prefix: &'static str,
    /// `file` prefix of reference entries belonging to this domain.
    pub reference_tag: &'static str,
    pub summary_anchors: &'static [&'static str],
    pub anchor_mode: AnchorMode,
    pub classifier: ContentClassifier,
}

impl ContentDomain {
    pub fn profile(self) -> DomainProfile {
        match self {
            ContentDomain::Contemplations => DomainProfile {
                domain: self,
                site_url: "https://diegojavier.wordpress.com",
                user_agent: "ContemplacionesLiturgicas/1.0",
                corpus_file: "contemplaciones.json",
                ledger_prefix: "failed_urls",
                reference_tag: "contemplaciones -",
                summary_anchors: &["contemplación", "contemplacion", "contemplamos", "contempla"],
                anchor_mode: AnchorMode::After,
                classifier: ContentClassifier::new(
                    ClassificationKind::Liturgical,
                    liturgical_times(),
                    liturgical_cycles(),
                    PrimarySource::Readings,
                ),
            },
            ContentDomain::Exercises => DomainProfile {
                domain: self,
                site_url: "https://ejerciciosespirituales.wordpress.com",
                user_agent: "EjerciciosEspirituales/1.0",
                corpus_file: "ejercicios_espirituales.json",
                ledger_prefix: "failed_urls_ejercicios",
                reference_tag: "ejercicios -",
                summary_anchors: &["ejercicio", "meditación", "oración", "contemplación", "reflexión"],
                anchor_mode: AnchorMode::Including,
                classifier: ContentClassifier::new(
                    ClassificationKind::Exercise,
                    exercise_types(),
                    exercise_categories(),
                    PrimarySource::Text,
                ),
            },
        }
    }
}

pub fn liturgical_times() -> KeywordTable {
    KeywordTable::new("Tiempo Ordinario")
        .entry(
            "Adviento",
            &["adviento", "preparación navidad", "espera", "venida del señor"],
        )
        .entry(
            "Navidad",
            &["navidad", "nacimiento", "belén", "pesebre", "nochebuena"],
        )
        .entry(
            "Cuaresma",
            &["cuaresma", "miércoles de ceniza", "ayuno", "penitencia", "desierto"],
        )
        .entry(
            "Pascua",
            &[
                "pascua",
                "resurrección",
                "aleluya",
                "pentecostés",
                "semana santa",
                "triduo",
            ],
        )
        .entry(
            "Tiempo Ordinario",
            &["tiempo ordinario", "domingo", "vida de jesús"],
        )
}

/// Cycle by Gospel book. John is read in every cycle and maps to the default.
pub fn liturgical_cycles() -> KeywordTable {
    KeywordTable::new("A")
        .entry("A", &["mt", "mateo"])
        .entry("B", &["mc", "marcos"])
        .entry("C", &["lc", "lucas"])
        .entry("A", &["jn", "juan"])
}

pub fn exercise_types() -> KeywordTable {
    KeywordTable::new("Ejercicios Generales")
        .entry("Meditación", &["meditación", "meditar", "reflexionar", "pensar"])
        .entry("Contemplación", &["contemplación", "contemplar", "mirar", "observar"])
        .entry("Oración", &["oración", "orar", "rezar", "plegaria"])
        .entry("Reflexión", &["reflexión", "reflexionar", "considerar", "pensar"])
        .entry(
            "Examen de conciencia",
            &["examen", "conciencia", "revisar", "evaluar"],
        )
        .entry("Lectio Divina", &["lectio", "divina", "lectura", "palabra"])
}

pub fn exercise_categories() -> KeywordTable {
    KeywordTable::new("Ejercicios Generales")
        .entry(
            "Ejercicios Ignacianos",
            &["ignacio", "ignaciano", "jesuita", "ejercicios espirituales"],
        )
        .entry(
            "Meditación Franciscana",
            &["francisco", "franciscano", "pobreza", "hermano"],
        )
        .entry(
            "Oración Carmelitana",
            &["carmelo", "carmelita", "teresa", "juan de la cruz"],
        )
        .entry("Lectio Divina", &["lectio", "divina", "lectura orante", "palabra"])
        .entry(
            "Examen de Conciencia",
            &["examen", "conciencia", "revisión", "día"],
        )
}
