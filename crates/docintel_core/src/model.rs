//! Client-side projection of the backend's data model.
//!
//! Everything here is produced by the backend. Fields are lenient on the wire:
//! a missing value falls back to zero, empty or neutral so the front-end can
//! always render something.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Backend document identifier.
pub type DocumentId = i64;

/// MIME types the backend can extract text from.
pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["application/pdf", "image/png", "image/jpeg"];

/// Returns true if `mime` is one of [`ACCEPTED_MIME_TYPES`].
///
/// Parameters such as `; charset=...` are ignored and the comparison is
/// case-insensitive.
pub fn is_accepted_mime(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or(mime).trim();
    ACCEPTED_MIME_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(essence))
}

/// A file picked by the user, including its content.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn info(&self) -> FileInfo {
        FileInfo {
            name: self.name.clone(),
            size: self.bytes.len() as u64,
            mime: self.mime.clone(),
        }
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Byte-free description of the current file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub mime: String,
}

impl FileInfo {
    /// File name up to the first `.`.
    pub fn stem(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SummaryType {
    #[default]
    Standard,
    Bullet,
    Executive,
    Detailed,
    Qa,
    Topics,
    Fast,
}

/// Backend endpoint family a summary type is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryRoute {
    /// `POST /summarize` with `{ text, type, length }`.
    Standard,
    /// `POST /summarize-fast` with `{ text, length }`.
    Fast,
    /// `POST /advanced-summary` with `{ text, summary_type, length }`.
    Advanced { summary_type: &'static str },
}

impl SummaryType {
    pub const ALL: [SummaryType; 7] = [
        SummaryType::Standard,
        SummaryType::Bullet,
        SummaryType::Executive,
        SummaryType::Detailed,
        SummaryType::Qa,
        SummaryType::Topics,
        SummaryType::Fast,
    ];

    /// Name used on the command line and in the UI.
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryType::Standard => "standard",
            SummaryType::Bullet => "bullet",
            SummaryType::Executive => "executive",
            SummaryType::Detailed => "detailed",
            SummaryType::Qa => "qa",
            SummaryType::Topics => "topics",
            SummaryType::Fast => "fast",
        }
    }

    /// Name the backend stores and expects in `summary_type` fields.
    pub fn wire_name(self) -> &'static str {
        match self {
            SummaryType::Bullet => "bullet_points",
            other => other.as_str(),
        }
    }

    pub fn route(self) -> SummaryRoute {
        match self {
            SummaryType::Standard => SummaryRoute::Standard,
            SummaryType::Fast => SummaryRoute::Fast,
            other => SummaryRoute::Advanced {
                summary_type: other.wire_name(),
            },
        }
    }
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for SummaryType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        if needle.eq_ignore_ascii_case("bullet_points") {
            return Ok(SummaryType::Bullet);
        }
        SummaryType::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownVariant {
                kind: "summary type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryLength {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(SummaryLength::Short),
            "medium" => Ok(SummaryLength::Medium),
            "long" => Ok(SummaryLength::Long),
            _ => Err(UnknownVariant {
                kind: "summary length",
                value: s.to_string(),
            }),
        }
    }
}

/// A generated summary and the settings it was requested with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    pub summary_type: SummaryType,
    pub length: SummaryLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Pdf,
    Docx,
    Markdown,
    Txt,
}

impl ExportFormat {
    /// Value sent in the `format` field of `/export`.
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Txt => "txt",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "txt" | "text" => Ok(ExportFormat::Txt),
            _ => Err(UnknownVariant {
                kind: "export format",
                value: s.to_string(),
            }),
        }
    }
}

/// Backend-computed analytics for a text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub basic_statistics: BasicStatistics,
    pub readability: Readability,
    pub content_analysis: ContentAnalysis,
    pub document_structure: DocumentStructure,
    pub quality_metrics: QualityMetrics,
    pub linguistic_features: LinguisticFeatures,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicStatistics {
    pub word_count: u64,
    pub sentence_count: u64,
    pub paragraph_count: u64,
    pub character_count: u64,
    pub character_count_no_spaces: u64,
    pub average_word_length: f64,
    pub average_sentence_length: f64,
    pub average_paragraph_length: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Readability {
    pub flesch_reading_ease: f64,
    pub readability_level: String,
    pub grade_level: String,
    pub reading_time_minutes: f64,
    pub reading_time_seconds: f64,
    pub complexity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentAnalysis {
    pub keywords: Vec<String>,
    pub sentiment: Sentiment,
    pub topic_diversity: f64,
    pub information_density: f64,
    pub vocabulary_richness: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sentiment {
    pub polarity: Polarity,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    #[default]
    #[serde(other)]
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentStructure {
    pub structure_score: f64,
    pub organization: String,
    pub paragraph_consistency: f64,
    pub headers_count: u64,
    pub bullet_points_count: u64,
    pub numbered_lists_count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityMetrics {
    pub quality_score: f64,
    pub quality_level: String,
    pub vocabulary_sophistication: f64,
    pub information_density: f64,
    pub structure_variety: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinguisticFeatures {
    pub punctuation_density: f64,
    pub capitalization_ratio: f64,
    pub numeric_content_ratio: f64,
    pub question_ratio: f64,
}

/// A persisted document as returned by the `/documents` endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRecord {
    pub id: DocumentId,
    #[serde(deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary_length: String,
    #[serde(rename = "analysis_data", deserialize_with = "lenient_analysis")]
    pub analysis: Option<Analysis>,
    #[serde(deserialize_with = "null_as_default")]
    pub file_size: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub word_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

// Nullable columns come back as `null` rather than being omitted.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts the analysis column as an object, as a JSON-encoded string, or as
/// null. Anything unreadable is treated as absent.
fn lenient_analysis<'de, D>(deserializer: D) -> Result<Option<Analysis>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let analysis = match value {
        Some(serde_json::Value::String(raw)) => serde_json::from_str(&raw).ok(),
        Some(value @ serde_json::Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    };
    Ok(analysis)
}

/// Aggregate counters from `/documents/stats/overview`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentStats {
    pub total_documents: u64,
    pub total_words_processed: u64,
    pub recent_documents: u64,
    pub average_document_length: f64,
}

/// Body of `POST /documents/save`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub filename: String,
    pub text: String,
    pub summary: String,
    pub summary_type: String,
    pub summary_length: String,
    pub analysis: Option<Analysis>,
    pub file_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_check_ignores_case_and_parameters() {
        assert!(is_accepted_mime("application/pdf"));
        assert!(is_accepted_mime("IMAGE/PNG"));
        assert!(is_accepted_mime("image/jpeg; q=0.9"));
        assert!(!is_accepted_mime("image/gif"));
        assert!(!is_accepted_mime("text/plain"));
        assert!(!is_accepted_mime(""));
    }

    #[test]
    fn bullet_is_the_only_renamed_summary_type() {
        for ty in SummaryType::ALL {
            let expected = if ty == SummaryType::Bullet {
                "bullet_points"
            } else {
                ty.as_str()
            };
            assert_eq!(ty.wire_name(), expected);
        }
        assert_eq!("bullet_points".parse(), Ok(SummaryType::Bullet));
        assert_eq!(" QA ".parse(), Ok(SummaryType::Qa));
        assert!("poem".parse::<SummaryType>().is_err());
    }

    #[test]
    fn analysis_defaults_missing_fields() {
        let analysis: Analysis = serde_json::from_str(
            r#"{"basic_statistics": {"word_count": 12}, "content_analysis": {"sentiment": {"polarity": "mixed"}}}"#,
        )
        .unwrap();
        assert_eq!(analysis.basic_statistics.word_count, 12);
        assert_eq!(analysis.basic_statistics.sentence_count, 0);
        assert_eq!(analysis.readability.flesch_reading_ease, 0.0);
        assert_eq!(analysis.content_analysis.sentiment.polarity, Polarity::Neutral);
        assert!(analysis.content_analysis.keywords.is_empty());
    }

    #[test]
    fn record_accepts_analysis_as_string_or_object() {
        let from_string: DocumentRecord = serde_json::from_str(
            r#"{"id": 3, "filename": "a.pdf", "analysis_data": "{\"readability\": {\"flesch_reading_ease\": 61.5}}"}"#,
        )
        .unwrap();
        assert_eq!(
            from_string.analysis.unwrap().readability.flesch_reading_ease,
            61.5
        );

        let from_object: DocumentRecord = serde_json::from_str(
            r#"{"id": 4, "analysis_data": {"basic_statistics": {"word_count": 7}}}"#,
        )
        .unwrap();
        assert_eq!(from_object.analysis.unwrap().basic_statistics.word_count, 7);

        let garbage: DocumentRecord = serde_json::from_str(
            r#"{"id": 5, "analysis_data": "not json", "summary": null, "word_count": null}"#,
        )
        .unwrap();
        assert!(garbage.analysis.is_none());
        assert_eq!(garbage.summary, "");
        assert_eq!(garbage.word_count, 0);
    }

    #[test]
    fn file_stem_stops_at_first_dot() {
        let info = SelectedFile::new("report.final.pdf", "application/pdf", vec![1, 2]).info();
        assert_eq!(info.stem(), "report");
        assert_eq!(info.size, 2);
    }
}
