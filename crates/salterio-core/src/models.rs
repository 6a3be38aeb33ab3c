use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::urls::{normalize_url, post_date_slug};

/// Largest integer a JSON number carries exactly (2^53 - 1).
const JSON_SAFE_ID_MASK: u64 = (1 << 53) - 1;

/// A post URL produced by discovery, keyed by its normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostCandidate {
    pub normalized_url: String,
}

impl PostCandidate {
    pub fn new(url: &str) -> Self {
        Self {
            normalized_url: normalize_url(url),
        }
    }

    /// `yyyymmdd` date embedded in the post URL, if any.
    pub fn date_key(&self) -> Option<String> {
        post_date_slug(&self.normalized_url).map(|(date, _)| date)
    }
}

/// What `RawPost` title and content hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    /// Rendered HTML from the REST API; needs cleaning.
    Html,
    /// Text already extracted from a page, entities decoded.
    Text,
}

/// A post as obtained from the site, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    /// API id, or derived from the URL date and slug when scraped.
    pub source_id: u64,
    pub url: String,
    pub raw_title: String,
    pub raw_content_html: String,
    pub format: ContentFormat,
    /// Anchor-located excerpt computed by the page extractor.
    pub excerpt: Option<String>,
    /// Citation-like tokens found directly in the page text.
    pub reading_reference_hint: Option<String>,
}

/// Domain-specific classification of a record.
///
/// Serialized flat into the record, so the field names match the corpus
/// files each domain has always produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Classification {
    Liturgical {
        ciclo: String,
        tiempo_liturgico: String,
    },
    Exercise {
        categoria: String,
        tipo: String,
    },
}

impl Classification {
    /// Liturgical cycle or exercise category.
    pub fn primary(&self) -> &str {
        match self {
            Classification::Liturgical { ciclo, .. } => ciclo,
            Classification::Exercise { categoria, .. } => categoria,
        }
    }

    /// Liturgical time or exercise type.
    pub fn secondary(&self) -> &str {
        match self {
            Classification::Liturgical {
                tiempo_liturgico, ..
            } => tiempo_liturgico,
            Classification::Exercise { tipo, .. } => tipo,
        }
    }
}

/// The persisted, user-facing unit of a corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: u64,
    #[serde(flatten)]
    pub classification: Classification,
    #[serde(rename = "titulo", default)]
    pub title: String,
    /// `"; "`-joined citation strings, possibly empty.
    #[serde(rename = "lecturas", default)]
    pub readings: String,
    /// At most 200 characters.
    #[serde(rename = "resumen", default)]
    pub summary: String,
    #[serde(default)]
    pub link: String,
}

/// A URL whose extraction failed during one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

/// Best reference entry found for a target title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    pub reference_title: String,
    pub reference_link: String,
    /// In `[0, 1]`.
    pub score: f64,
}

/// Entry of the secondary index used as reconciliation reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReferenceEntry {
    #[serde(default)]
    pub title: String,
    /// Source tag, e.g. `"contemplaciones - 2024"`.
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub link: String,
}

/// `{"rendered": "..."}` wrapper used by the WordPress REST API.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// Post object as returned by a WordPress REST discovery endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ApiPost {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub guid: Rendered,
}

impl ApiPost {
    /// `link`, falling back to `guid.rendered`.
    pub fn permalink(&self) -> &str {
        if self.link.is_empty() {
            &self.guid.rendered
        } else {
            &self.link
        }
    }

    pub fn into_raw_post(self) -> RawPost {
        let url = self.permalink().to_string();
        RawPost {
            source_id: self.id,
            url,
            raw_title: self.title.rendered,
            raw_content_html: self.content.rendered,
            format: ContentFormat::Html,
            excerpt: None,
            reading_reference_hint: None,
        }
    }
}

/// Deterministic id for a scraped post: SHA-256 of `<yyyymmdd><slug>`,
/// truncated so it stays exact as a JSON number.
pub fn derive_source_id(date: &str, slug: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(date.as_bytes());
    hasher.update(slug.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes) & JSON_SAFE_ID_MASK
}
