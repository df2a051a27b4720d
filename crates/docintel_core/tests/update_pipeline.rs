use std::sync::Once;

use docintel_core::{
    update, Analysis, AppState, DisplayedDocument, Effect, Msg, NoticeLevel, Phase, Preferences,
    SaveRequest, SelectedFile, SummaryLength, SummaryType,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(docintel_logging::initialize_for_tests);
}

fn pdf(name: &str) -> SelectedFile {
    SelectedFile::new(name, "application/pdf", b"%PDF-1.4 test".to_vec())
}

fn analysis(words: u64) -> Analysis {
    let mut analysis = Analysis::default();
    analysis.basic_statistics.word_count = words;
    analysis
}

/// Runs the upload and extraction steps; leaves the machine about to summarize.
fn uploaded(state: AppState, text: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::FileSelected(pdf("report.pdf")));
    let (state, _) = update(
        state,
        Msg::UploadDone {
            request: 1,
            result: Ok(text.to_string()),
        },
    );
    update(state, Msg::StepSettled { request: 2 })
}

/// Runs a complete process action with every step succeeding.
fn processed(text: &str) -> AppState {
    let (state, _) = uploaded(AppState::new(), text);
    let (state, _) = update(
        state,
        Msg::SummaryDone {
            request: 3,
            result: Ok("a short summary".to_string()),
        },
    );
    let (state, _) = update(
        state,
        Msg::AnalysisDone {
            request: 4,
            result: Ok(analysis(2)),
        },
    );
    let (mut state, _) = update(
        state,
        Msg::SaveDone {
            request: 5,
            result: Ok(Some(9)),
        },
    );
    state.take_notices();
    state
}

#[test]
fn accepted_file_starts_upload_once() {
    init_logging();
    for mime in ["application/pdf", "image/png", "image/jpeg"] {
        let file = SelectedFile::new("scan", mime, vec![1, 2, 3]);
        let (state, effects) = update(AppState::new(), Msg::FileSelected(file.clone()));

        assert_eq!(effects, vec![Effect::Upload { request: 1, file }]);
        assert_eq!(state.phase(), Phase::Uploading);
        assert_eq!(state.view().progress, 0);
        assert!(state.view().is_loading);
    }
}

#[test]
fn unsupported_file_is_rejected_without_effects() {
    init_logging();
    let file = SelectedFile::new("notes.txt", "text/plain", b"hi".to_vec());
    let (mut state, effects) = update(AppState::new(), Msg::FileSelected(file));

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.view().document, DisplayedDocument::Empty);
    let notices = state.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.contains("text/plain"));
}

#[test]
fn full_process_walks_phases_in_order() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::FileSelected(pdf("report.pdf")));
    assert_eq!(effects.len(), 1);
    assert_eq!(state.phase(), Phase::Uploading);

    let (state, effects) = update(
        state,
        Msg::UploadDone {
            request: 1,
            result: Ok("hello world".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Settle {
            request: 2,
            phase: Phase::Extracting
        }]
    );
    assert_eq!(state.phase(), Phase::Extracting);
    assert_eq!(state.view().progress, 20);

    let (state, effects) = update(state, Msg::StepSettled { request: 2 });
    assert_eq!(
        effects,
        vec![Effect::Summarize {
            request: 3,
            text: "hello world".to_string(),
            summary_type: SummaryType::Standard,
            length: SummaryLength::Medium,
        }]
    );
    assert_eq!(state.phase(), Phase::Summarizing);
    assert_eq!(state.view().progress, 40);
    match state.view().document {
        DisplayedDocument::Live { text, .. } => assert_eq!(text, "hello world"),
        other => panic!("expected live document, got {other:?}"),
    }

    let (state, effects) = update(
        state,
        Msg::SummaryDone {
            request: 3,
            result: Ok("greeting".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Analyze {
            request: 4,
            text: "hello world".to_string()
        }]
    );
    assert_eq!(state.phase(), Phase::Analyzing);
    assert_eq!(state.view().progress, 60);

    let (state, effects) = update(
        state,
        Msg::AnalysisDone {
            request: 4,
            result: Ok(analysis(2)),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Save {
            request: 5,
            payload: SaveRequest {
                filename: "report.pdf".to_string(),
                text: "hello world".to_string(),
                summary: "greeting".to_string(),
                summary_type: "standard".to_string(),
                summary_length: "medium".to_string(),
                analysis: Some(analysis(2)),
                file_size: 13,
            },
        }]
    );
    assert_eq!(state.view().progress, 80);

    let (mut state, effects) = update(
        state,
        Msg::SaveDone {
            request: 5,
            result: Ok(Some(9)),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::LoadHistory { trigger: 1 }, Effect::LoadStats]
    );
    assert_eq!(state.phase(), Phase::Ready);
    assert_eq!(state.view().progress, 100);
    assert!(!state.is_loading());
    let notices = state.take_notices();
    assert_eq!(
        notices.last().map(|n| n.message.as_str()),
        Some("Document processed, summarized, and saved automatically!")
    );
}

#[test]
fn failed_auto_steps_still_end_ready() {
    init_logging();
    let (state, _) = uploaded(AppState::new(), "some text");
    let (state, effects) = update(
        state,
        Msg::SummaryDone {
            request: 3,
            result: Err("model offline".to_string()),
        },
    );
    assert!(matches!(effects.as_slice(), [Effect::Analyze { request: 4, .. }]));

    let (state, effects) = update(
        state,
        Msg::AnalysisDone {
            request: 4,
            result: Err("HTTP 500".to_string()),
        },
    );
    assert!(matches!(effects.as_slice(), [Effect::Save { request: 5, .. }]));

    let (mut state, effects) = update(
        state,
        Msg::SaveDone {
            request: 5,
            result: Err("db locked".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Ready);
    assert_eq!(state.view().last_error, None);
    match state.view().document {
        DisplayedDocument::Live {
            text,
            summary,
            analysis,
            ..
        } => {
            assert_eq!(text, "some text");
            assert!(summary.is_none());
            assert!(analysis.is_none());
        }
        other => panic!("expected live document, got {other:?}"),
    }
    let notices = state.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Document processed successfully!");
}

#[test]
fn upload_failure_moves_to_error_and_next_action_recovers() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FileSelected(pdf("a.pdf")));
    let (state, effects) = update(
        state,
        Msg::UploadDone {
            request: 1,
            result: Err("Unsupported file format".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Error);
    assert_eq!(
        state.view().last_error.as_deref(),
        Some("Upload failed: Unsupported file format")
    );

    let (state, effects) = update(state, Msg::FileSelected(pdf("b.pdf")));
    assert_eq!(state.phase(), Phase::Uploading);
    assert_eq!(state.view().last_error, None);
    assert!(matches!(effects.as_slice(), [Effect::Upload { request: 2, .. }]));
}

#[test]
fn new_actions_are_refused_while_busy() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FileSelected(pdf("a.pdf")));

    let (state, effects) = update(state, Msg::FileSelected(pdf("b.pdf")));
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::AnalyzeClicked);
    assert!(effects.is_empty());
    let (mut state, effects) = update(state, Msg::ResetClicked);
    assert!(effects.is_empty());

    assert_eq!(state.phase(), Phase::Uploading);
    assert_eq!(state.in_flight(), Some(1));
    assert!(state
        .take_notices()
        .iter()
        .all(|notice| notice.level == NoticeLevel::Info));
}

#[test]
fn stale_and_mismatched_responses_are_ignored() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FileSelected(pdf("a.pdf")));
    let before = state.clone();

    let (state, effects) = update(
        state,
        Msg::UploadDone {
            request: 42,
            result: Ok("late".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);

    // Right request id, wrong kind of response.
    let (state, effects) = update(
        state,
        Msg::SummaryDone {
            request: 1,
            result: Ok("nope".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn cancel_aborts_in_flight_request() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FileSelected(pdf("a.pdf")));
    let (state, effects) = update(state, Msg::CancelClicked);

    assert_eq!(effects, vec![Effect::Cancel { request: 1 }]);
    assert_eq!(state.phase(), Phase::Error);
    assert_eq!(state.in_flight(), None);
    assert_eq!(
        state.view().last_error.as_deref(),
        Some("Upload failed: cancelled")
    );

    let (state, effects) = update(
        state,
        Msg::UploadDone {
            request: 1,
            result: Ok("too late".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Error);

    let (_state, effects) = update(state, Msg::CancelClicked);
    assert!(effects.is_empty());
}

#[test]
fn manual_summarize_uses_requested_style_then_analyzes_and_saves() {
    init_logging();
    let state = processed("long body of text");

    let (state, effects) = update(
        state,
        Msg::SummarizeClicked {
            summary_type: SummaryType::Bullet,
            length: SummaryLength::Long,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Summarize {
            request: 6,
            text: "long body of text".to_string(),
            summary_type: SummaryType::Bullet,
            length: SummaryLength::Long,
        }]
    );
    assert_eq!(state.phase(), Phase::Summarizing);
    assert_eq!(state.view().progress, 0);

    let (state, effects) = update(
        state,
        Msg::SummaryDone {
            request: 6,
            result: Ok("- point".to_string()),
        },
    );
    assert!(matches!(effects.as_slice(), [Effect::Analyze { request: 7, .. }]));

    let (state, effects) = update(
        state,
        Msg::AnalysisDone {
            request: 7,
            result: Ok(analysis(4)),
        },
    );
    match effects.as_slice() {
        [Effect::Save { request: 8, payload }] => {
            assert_eq!(payload.summary, "- point");
            assert_eq!(payload.summary_type, "bullet_points");
            assert_eq!(payload.summary_length, "long");
        }
        other => panic!("expected save effect, got {other:?}"),
    }

    let (mut state, effects) = update(
        state,
        Msg::SaveDone {
            request: 8,
            result: Ok(None),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::LoadHistory { trigger: 2 }, Effect::LoadStats]
    );
    assert_eq!(state.phase(), Phase::Ready);
    assert_eq!(
        state.take_notices().last().map(|n| n.message.clone()),
        Some("Summary and analytics generated successfully!".to_string())
    );
}

#[test]
fn manual_summarize_failure_is_an_error() {
    init_logging();
    let state = processed("text");
    let (state, _) = update(
        state,
        Msg::SummarizeClicked {
            summary_type: SummaryType::Executive,
            length: SummaryLength::Short,
        },
    );
    let (state, effects) = update(
        state,
        Msg::SummaryDone {
            request: 6,
            result: Err("HTTP 503".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Error);
    assert_eq!(
        state.view().last_error.as_deref(),
        Some("Summary failed: HTTP 503")
    );
}

#[test]
fn summarize_and_analyze_need_text() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::SummarizeClicked {
            summary_type: SummaryType::Standard,
            length: SummaryLength::Medium,
        },
    );
    assert!(effects.is_empty());
    let (mut state, effects) = update(state, Msg::AnalyzeClicked);
    assert!(effects.is_empty());

    assert_eq!(state.phase(), Phase::Idle);
    let messages: Vec<_> = state
        .take_notices()
        .into_iter()
        .map(|notice| notice.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "No text available to summarize".to_string(),
            "No text available to analyze".to_string()
        ]
    );
}

#[test]
fn manual_analyze_goes_straight_to_ready() {
    init_logging();
    let state = processed("text to analyze");
    let (state, effects) = update(state, Msg::AnalyzeClicked);
    assert_eq!(
        effects,
        vec![Effect::Analyze {
            request: 6,
            text: "text to analyze".to_string()
        }]
    );
    assert_eq!(state.phase(), Phase::Analyzing);

    let (state, effects) = update(
        state,
        Msg::AnalysisDone {
            request: 6,
            result: Ok(analysis(3)),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Ready);
    match state.view().document {
        DisplayedDocument::Live { analysis, .. } => {
            assert_eq!(analysis.unwrap().basic_statistics.word_count, 3)
        }
        other => panic!("expected live document, got {other:?}"),
    }
}

#[test]
fn disabled_auto_steps_skip_straight_to_save() {
    init_logging();
    let preferences = Preferences {
        auto_summarize: false,
        auto_analyze: false,
        ..Preferences::default()
    };
    let state = AppState::with_preferences(preferences);
    let (state, effects) = uploaded(state, "plain");

    assert!(matches!(effects.as_slice(), [Effect::Save { request: 3, .. }]));
    // Saving has no phase of its own.
    assert_eq!(state.phase(), Phase::Extracting);
    assert_eq!(state.view().progress, 66);

    let (mut state, effects) = update(
        state,
        Msg::SaveDone {
            request: 3,
            result: Ok(Some(1)),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::LoadHistory { trigger: 1 }, Effect::LoadStats]
    );
    assert_eq!(state.phase(), Phase::Ready);
    assert_eq!(
        state.take_notices().last().map(|n| n.message.clone()),
        Some("Document processed successfully!".to_string())
    );
}

#[test]
fn empty_extraction_skips_text_steps() {
    init_logging();
    let (state, effects) = uploaded(AppState::new(), "   ");

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Ready);
    assert_eq!(state.view().progress, 100);
}

#[test]
fn failed_save_is_mirrored_locally_when_enabled() {
    init_logging();
    let preferences = Preferences {
        local_mirror: true,
        auto_summarize: false,
        auto_analyze: false,
        ..Preferences::default()
    };
    let (state, _) = update(
        AppState::with_preferences(preferences),
        Msg::FileSelected(pdf("memo.pdf")),
    );
    let (state, _) = update(
        state,
        Msg::UploadDone {
            request: 1,
            result: Ok("memo text".to_string()),
        },
    );
    let (state, effects) = update(state, Msg::StepSettled { request: 2 });
    assert!(matches!(effects.as_slice(), [Effect::Save { request: 3, .. }]));

    let (state, effects) = update(
        state,
        Msg::SaveDone {
            request: 3,
            result: Err("HTTP 500".to_string()),
        },
    );
    match effects.as_slice() {
        [Effect::MirrorLocally(payload)] => {
            assert_eq!(payload.filename, "memo.pdf");
            assert_eq!(payload.text, "memo text");
            assert_eq!(payload.summary, "");
        }
        other => panic!("expected mirror effect, got {other:?}"),
    }
    assert_eq!(state.phase(), Phase::Ready);
}

#[test]
fn reset_clears_live_document() {
    init_logging();
    let state = processed("text");
    let (state, effects) = update(state, Msg::ResetClicked);

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, Phase::Idle);
    assert_eq!(view.progress, 0);
    assert_eq!(view.document, DisplayedDocument::Empty);
}

#[test]
fn is_loading_matches_busy_phases() {
    let busy = [
        Phase::Uploading,
        Phase::Extracting,
        Phase::Summarizing,
        Phase::Analyzing,
    ];
    for phase in [
        Phase::Idle,
        Phase::Uploading,
        Phase::Extracting,
        Phase::Summarizing,
        Phase::Analyzing,
        Phase::Ready,
        Phase::Error,
    ] {
        assert_eq!(phase.is_busy(), busy.contains(&phase), "{phase:?}");
        assert_eq!(phase.accepts_action(), !phase.is_busy(), "{phase:?}");
    }
}

#[test]
fn dismissing_error_clears_banner() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::FileSelected(pdf("a.pdf")));
    let (state, _) = update(
        state,
        Msg::UploadDone {
            request: 1,
            result: Err("boom".to_string()),
        },
    );
    let (mut state, _) = update(state, Msg::ErrorDismissed);
    assert_eq!(state.view().last_error, None);
    assert_eq!(state.phase(), Phase::Error);
    assert!(state.consume_dirty());

    let (mut state, _) = update(state, Msg::ErrorDismissed);
    assert!(!state.consume_dirty());
}

fn single_step_preferences() -> Preferences {
    Preferences {
        auto_summarize: false,
        auto_analyze: false,
        analyze_after_summarize: false,
        auto_save: false,
        ..Preferences::default()
    }
}

#[test]
fn manual_summarize_without_auto_save_saves_once() {
    init_logging();
    let (state, effects) = uploaded(AppState::with_preferences(single_step_preferences()), "body");
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Ready);

    let (state, effects) = update(
        state,
        Msg::SummarizeClicked {
            summary_type: SummaryType::Bullet,
            length: SummaryLength::Short,
        },
    );
    assert!(matches!(effects.as_slice(), [Effect::Summarize { request: 3, .. }]));

    let (state, effects) = update(
        state,
        Msg::SummaryDone {
            request: 3,
            result: Ok("gist".to_string()),
        },
    );
    match effects.as_slice() {
        [Effect::Save { request: 4, payload }] => {
            assert_eq!(payload.summary, "gist");
            assert_eq!(payload.summary_type, "bullet_points");
        }
        other => panic!("expected a single save, got {other:?}"),
    }
    assert_eq!(state.phase(), Phase::Summarizing);
}

#[test]
fn manual_analyze_without_auto_save_never_saves() {
    init_logging();
    let (state, effects) = uploaded(AppState::with_preferences(single_step_preferences()), "body");
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::AnalyzeClicked);
    assert_eq!(
        effects,
        vec![Effect::Analyze {
            request: 3,
            text: "body".to_string()
        }]
    );

    let (state, effects) = update(
        state,
        Msg::AnalysisDone {
            request: 3,
            result: Ok(analysis(1)),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Ready);
}
