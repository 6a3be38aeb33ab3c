//! Keyword-table classification.
//!
//! Tables are ordered data: the first label with any keyword present in the
//! text wins, so order is the tie-break when a text mentions several labels.

use crate::models::Classification;

/// Ordered `label -> keywords` table with a default label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<(String, Vec<String>)>,
    default_label: String,
}

impl KeywordTable {
    pub fn new(default_label: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            default_label: default_label.into(),
        }
    }

    /// Append a label; keywords are matched lower-cased.
    pub fn entry(mut self, label: impl Into<String>, keywords: &[&str]) -> Self {
        self.entries.push((
            label.into(),
            keywords.iter().map(|k| k.to_lowercase()).collect(),
        ));
        self
    }

    /// Label of the first entry with a keyword occurring in `text`
    /// (case-insensitive substring match), else the default label.
    pub fn classify(&self, text: &str) -> &str {
        let lowered = text.to_lowercase();
        self.entries
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k.as_str())))
            .map(|(label, _)| label.as_str())
            .unwrap_or(&self.default_label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn default_label(&self) -> &str {
        &self.default_label
    }
}

/// Text the primary table is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimarySource {
    /// Title and body, like the secondary table.
    Text,
    /// The extracted readings string (liturgical cycle follows the Gospel book).
    Readings,
}

/// How the classification is shaped when stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationKind {
    Liturgical,
    Exercise,
}

/// Two independent keyword-table lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentClassifier {
    kind: ClassificationKind,
    secondary: KeywordTable,
    primary: KeywordTable,
    primary_source: PrimarySource,
}

impl ContentClassifier {
    pub fn new(
        kind: ClassificationKind,
        secondary: KeywordTable,
        primary: KeywordTable,
        primary_source: PrimarySource,
    ) -> Self {
        Self {
            kind,
            secondary,
            primary,
            primary_source,
        }
    }

    /// Liturgical time or exercise type of `title + body`.
    pub fn secondary(&self, title: &str, body: &str) -> &str {
        self.secondary.classify(&format!("{title} {body}"))
    }

    /// Liturgical cycle or exercise category.
    pub fn primary(&self, title: &str, body: &str, readings: &str) -> &str {
        match self.primary_source {
            PrimarySource::Text => self.primary.classify(&format!("{title} {body}")),
            PrimarySource::Readings => self.primary.classify(readings),
        }
    }

    pub fn classify(&self, title: &str, body: &str, readings: &str) -> Classification {
        let secondary = self.secondary(title, body).to_string();
        let primary = self.primary(title, body, readings).to_string();
        match self.kind {
            ClassificationKind::Liturgical => Classification::Liturgical {
                ciclo: primary,
                tiempo_liturgico: secondary,
            },
            ClassificationKind::Exercise => Classification::Exercise {
                categoria: primary,
                tipo: secondary,
            },
        }
    }

    pub fn secondary_table(&self) -> &KeywordTable {
        &self.secondary
    }

    pub fn primary_table(&self) -> &KeywordTable {
        &self.primary
    }
}
