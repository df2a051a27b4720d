use docintel_core::{
    Analysis, AppViewModel, DisplayedDocument, DocumentRecord, DocumentStats, FileInfo,
    HistoryView, Notice, NoticeLevel, Phase, Summary,
};

/// Characters of document text shown before truncating.
const TEXT_PREVIEW_CHARS: usize = 600;

/// One-line status: phase, progress bar and backend state.
pub fn status_line(view: &AppViewModel) -> String {
    let backend = match view.backend_online {
        Some(true) => "online",
        Some(false) => "offline",
        None => "unknown",
    };
    format!(
        "[{}] {:>3}% {:<11} backend: {}",
        progress_bar(view.progress, 20),
        view.progress,
        phase_label(view.phase),
        backend
    )
}

pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "Idle",
        Phase::Uploading => "Uploading",
        Phase::Extracting => "Extracting",
        Phase::Summarizing => "Summarizing",
        Phase::Analyzing => "Analyzing",
        Phase::Ready => "Ready",
        Phase::Error => "Error",
    }
}

fn progress_bar(progress: u8, width: usize) -> String {
    let filled = (progress.min(100) as usize * width) / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.message)
}

/// The displayed document, its summary and its analytics.
pub fn render_document(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(error) = &view.last_error {
        lines.push(format!("! {error}"));
    }

    match &view.document {
        DisplayedDocument::Empty => lines.push("No document loaded.".to_string()),
        DisplayedDocument::Live {
            file,
            text,
            summary,
            analysis,
        } => {
            lines.push(file_heading(file.as_ref()));
            push_text(&mut lines, text);
            if let Some(summary) = summary {
                push_summary(&mut lines, summary);
            }
            if let Some(analysis) = analysis {
                lines.extend(render_analysis(analysis));
            }
        }
        DisplayedDocument::Historical(record) => lines.extend(render_record(record)),
    }
    lines
}

fn file_heading(file: Option<&FileInfo>) -> String {
    match file {
        Some(file) => format!("== {} ({}, {}) ==", file.name, file.mime, format_size(file.size)),
        None => "== Document ==".to_string(),
    }
}

fn render_record(record: &DocumentRecord) -> Vec<String> {
    let mut lines = vec![format!("== #{} {} (saved {}) ==", record.id, record.filename, record.created_at)];
    lines.push(format!(
        "{} words, {}",
        record.word_count,
        format_size(record.file_size)
    ));
    push_text(&mut lines, &record.text);
    if !record.summary.trim().is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "-- Summary ({}, {}) --",
            record.summary_type, record.summary_length
        ));
        lines.extend(record.summary.lines().map(str::to_string));
    }
    if let Some(analysis) = &record.analysis {
        lines.extend(render_analysis(analysis));
    }
    lines
}

fn push_text(lines: &mut Vec<String>, text: &str) {
    if text.trim().is_empty() {
        lines.push("(no extracted text)".to_string());
        return;
    }
    let total = text.chars().count();
    let preview: String = text.chars().take(TEXT_PREVIEW_CHARS).collect();
    lines.push(String::new());
    lines.push("-- Extracted text --".to_string());
    lines.extend(preview.lines().map(str::to_string));
    if total > TEXT_PREVIEW_CHARS {
        lines.push(format!("... ({} more characters)", total - TEXT_PREVIEW_CHARS));
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &Summary) {
    lines.push(String::new());
    lines.push(format!(
        "-- Summary ({}, {}) --",
        summary.summary_type, summary.length
    ));
    lines.extend(summary.text.lines().map(str::to_string));
}

/// Analytics dashboard.
pub fn render_analysis(analysis: &Analysis) -> Vec<String> {
    let stats = &analysis.basic_statistics;
    let readability = &analysis.readability;
    let content = &analysis.content_analysis;
    let structure = &analysis.document_structure;
    let quality = &analysis.quality_metrics;
    let linguistic = &analysis.linguistic_features;

    let mut lines = vec![String::new(), "-- Analysis --".to_string()];
    lines.push(format!(
        "Words {} | Sentences {} | Paragraphs {} | Characters {} ({} without spaces)",
        stats.word_count,
        stats.sentence_count,
        stats.paragraph_count,
        stats.character_count,
        stats.character_count_no_spaces
    ));
    lines.push(format!(
        "Avg word {:.1} chars | Avg sentence {:.1} words | Avg paragraph {:.1} sentences",
        stats.average_word_length, stats.average_sentence_length, stats.average_paragraph_length
    ));
    lines.push(format!(
        "Readability: {:.1} Flesch ({}), grade {}, complexity {:.1}",
        readability.flesch_reading_ease,
        or_dash(&readability.readability_level),
        or_dash(&readability.grade_level),
        readability.complexity_score
    ));
    lines.push(format!(
        "Reading time: {:.1} min",
        readability.reading_time_minutes
    ));
    lines.push(format!(
        "Sentiment: {:?} ({:.0}% confidence)",
        content.sentiment.polarity,
        content.sentiment.confidence * 100.0
    ));
    if !content.keywords.is_empty() {
        lines.push(format!("Keywords: {}", content.keywords.join(", ")));
    }
    lines.push(format!(
        "Topic diversity {:.2} | Information density {:.2} | Vocabulary richness {:.2}",
        content.topic_diversity, content.information_density, content.vocabulary_richness
    ));
    lines.push(format!(
        "Structure: {:.1} ({}), {} headers, {} bullets, {} numbered items",
        structure.structure_score,
        or_dash(&structure.organization),
        structure.headers_count,
        structure.bullet_points_count,
        structure.numbered_lists_count
    ));
    lines.push(format!(
        "Quality: {:.1} ({}), sophistication {:.2}",
        quality.quality_score,
        or_dash(&quality.quality_level),
        quality.vocabulary_sophistication
    ));
    lines.push(format!(
        "Punctuation {:.2} | Capitals {:.2} | Numbers {:.2} | Questions {:.2}",
        linguistic.punctuation_density,
        linguistic.capitalization_ratio,
        linguistic.numeric_content_ratio,
        linguistic.question_ratio
    ));
    lines
}

pub fn render_history(history: &HistoryView) -> Vec<String> {
    let mut lines = Vec::new();
    if !history.query.is_empty() {
        lines.push(format!("Search: {:?}", history.query));
    }
    if history.no_documents_found {
        lines.push("No documents found".to_string());
        return lines;
    }
    for row in &history.rows {
        let marker = if row.selected { '>' } else { ' ' };
        lines.push(format!(
            "{marker} {:>5}  {:<32} {:<14} {:>7} words  {}",
            row.id,
            truncate(&row.filename, 32),
            or_dash(&row.summary_type),
            row.word_count,
            row.created_at
        ));
    }
    lines
}

pub fn render_stats(stats: &DocumentStats) -> Vec<String> {
    vec![
        format!("Documents:          {}", stats.total_documents),
        format!("Words processed:    {}", stats.total_words_processed),
        format!("Recent (7 days):    {}", stats.recent_documents),
        format!("Average length:     {:.0} words", stats.average_document_length),
    ]
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KIB {
        format!("{bytes} B")
    } else if value < KIB * KIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{:.1} MB", value / (KIB * KIB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docintel_core::{HistoryRowView, SummaryLength, SummaryType};

    fn view(document: DisplayedDocument) -> AppViewModel {
        AppViewModel {
            document,
            ..AppViewModel::default()
        }
    }

    #[test]
    fn status_line_shows_progress() {
        let view = AppViewModel {
            phase: Phase::Summarizing,
            progress: 40,
            backend_online: Some(true),
            ..AppViewModel::default()
        };
        assert_eq!(
            status_line(&view),
            "[########------------]  40% Summarizing backend: online"
        );
    }

    #[test]
    fn empty_view_says_so() {
        assert_eq!(render_document(&view(DisplayedDocument::Empty)), vec!["No document loaded."]);
    }

    #[test]
    fn live_document_shows_summary_and_truncates_text() {
        let text = "x".repeat(TEXT_PREVIEW_CHARS + 5);
        let lines = render_document(&view(DisplayedDocument::Live {
            file: Some(FileInfo {
                name: "scan.png".into(),
                size: 2048,
                mime: "image/png".into(),
            }),
            text,
            summary: Some(Summary {
                text: "- point".into(),
                summary_type: SummaryType::Bullet,
                length: SummaryLength::Short,
            }),
            analysis: None,
        }));

        assert_eq!(lines[0], "== scan.png (image/png, 2.0 KB) ==");
        assert!(lines.contains(&"... (5 more characters)".to_string()));
        assert!(lines.contains(&"-- Summary (bullet, short) --".to_string()));
        assert!(lines.contains(&"- point".to_string()));
        assert!(!lines.contains(&"-- Analysis --".to_string()));
    }

    #[test]
    fn historical_document_shows_its_analysis() {
        let record = DocumentRecord {
            id: 3,
            filename: "old.pdf".into(),
            text: "hello".into(),
            analysis: Some(Analysis::default()),
            created_at: "2025-01-01 09:00:00".into(),
            ..DocumentRecord::default()
        };
        let lines = render_document(&view(DisplayedDocument::Historical(record)));
        assert_eq!(lines[0], "== #3 old.pdf (saved 2025-01-01 09:00:00) ==");
        assert!(lines.contains(&"-- Analysis --".to_string()));
        assert!(lines.iter().any(|line| line.starts_with("Sentiment: Neutral")));
    }

    #[test]
    fn history_marks_selection_and_empty_results() {
        let history = HistoryView {
            rows: vec![HistoryRowView {
                id: 12,
                filename: "report.pdf".into(),
                summary_type: "executive".into(),
                word_count: 512,
                created_at: "2025-02-02".into(),
                selected: true,
            }],
            ..HistoryView::default()
        };
        let lines = render_history(&history);
        assert!(lines[0].starts_with(">    12  report.pdf"));

        let empty = HistoryView {
            query: "zebra".into(),
            no_documents_found: true,
            ..HistoryView::default()
        };
        assert_eq!(render_history(&empty), vec!["Search: \"zebra\"", "No documents found"]);
    }

    #[test]
    fn notices_are_tagged() {
        let notice = Notice {
            level: NoticeLevel::Error,
            message: "Upload failed: boom".into(),
        };
        assert_eq!(render_notice(&notice), "[error] Upload failed: boom");
    }
}
