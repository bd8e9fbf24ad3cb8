//! End-to-end behaviour of the engine against a `DocumentBuffer`.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{ScriptedBackend, annotations_consistent, inline_engine, manual_engine, type_text};
use livecheck::{
    CheckReason, CorrectionKind, CorrectionSource, Dictionary, DocumentBuffer, Engine,
    EngineOptions, Error, InlineExecutor, ProviderPolicy, ProviderService, Selection, TextHost,
    ThreadedExecutor,
};

fn teh(score: f32) -> Arc<ScriptedBackend> {
    Arc::new(ScriptedBackend::new("scripted").word("Teh", &[("The", score)]))
}

#[test]
fn confident_correction_is_applied_without_moving_cursor() {
    let mut engine = inline_engine(teh(0.9), EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    assert_eq!(engine.poll(&mut doc, now), 1);

    assert_eq!(doc.to_string(), "The ");
    assert_eq!(doc.cursor(), 4);
    let entries = engine.list_annotations();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, CorrectionKind::Auto);
    assert_eq!(entries[0].range(), (0, 3));
    assert_eq!(entries[0].original_value, "Teh");
    assert_eq!(entries[0].current_value, "The");
    assert_eq!(engine.stats().auto_applied, 1);
}

#[test]
fn background_correction_stays_out_of_undo_history() {
    let mut engine = inline_engine(teh(0.9), EngineOptions::default());
    let mut doc = DocumentBuffer::with_text("Teh");
    let now = Instant::now();
    doc.set_cursor(3);

    type_text(&mut engine, &mut doc, " ", now);
    doc.commit();
    engine.poll(&mut doc, now);
    assert_eq!(doc.to_string(), "The ");

    // Undo takes back the typed space and leaves the correction alone.
    let edits = doc.undo();
    assert_eq!(edits.len(), 1);
    assert_eq!(doc.to_string(), "The");
    assert!(!doc.can_undo());
}

#[test]
fn correcting_a_typed_word_keeps_earlier_undo_groups() {
    let mut engine = inline_engine(teh(0.9), EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Hello world. ", now);
    engine.poll(&mut doc, now);
    doc.commit();
    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);
    assert_eq!(doc.to_string(), "Hello world. The ");
    assert!(doc.can_undo());

    doc.undo();
    assert_eq!(doc.to_string(), "Hello world. ");
    doc.undo();
    assert_eq!(doc.to_string(), "");
}

#[test]
fn low_confidence_correction_is_offered_with_filtered_suggestions() {
    let backend = Arc::new(ScriptedBackend::new("scripted").word(
        "Teh",
        &[("The", 0.3), ("Tea", 0.2), ("Ten", 0.01)],
    ));
    let mut engine = inline_engine(backend, EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);

    assert_eq!(doc.to_string(), "Teh ");
    let entries = engine.list_annotations();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.kind, CorrectionKind::Manual);
    assert_eq!(entry.source, CorrectionSource::Word);
    let texts: Vec<&str> = entry.suggestions.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["The", "Tea"]);
}

#[test]
fn applied_fix_shifts_later_corrections_in_the_same_result() {
    let backend = ScriptedBackend::new("scripted")
        .word("becuse", &[("because", 0.9)])
        .word("teh", &[("the", 0.3)])
        .all_words();
    let mut engine = inline_engine(Arc::new(backend), EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "becuse teh ", now);
    engine.poll(&mut doc, now);

    assert_eq!(doc.to_string(), "because teh ");
    let entries = engine.list_annotations();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, CorrectionKind::Auto);
    assert_eq!(entries[0].range(), (0, 7));
    assert_eq!(entries[1].kind, CorrectionKind::Manual);
    assert_eq!(entries[1].range(), (8, 11));
    assert_eq!(entries[1].original_value, "teh");
    assert!(annotations_consistent(&engine, &doc));
}

#[test]
fn autocorrect_disabled_offers_instead() {
    let options = EngineOptions {
        autocorrect_enabled: false,
        ..EngineOptions::default()
    };
    let mut engine = inline_engine(teh(0.9), options);
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);
    assert_eq!(doc.to_string(), "Teh ");
    assert_eq!(engine.list_annotations()[0].kind, CorrectionKind::Manual);
}

#[test]
fn result_arriving_after_more_typing_is_discarded() {
    let (mut engine, jobs) = manual_engine(teh(0.9), EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);
    assert_eq!(jobs.queued(), 1);

    type_text(&mut engine, &mut doc, "c", now);
    jobs.run_all();
    engine.poll(&mut doc, now);
    jobs.run_all();
    engine.poll(&mut doc, now);

    assert_eq!(doc.to_string(), "Teh c");
    assert!(engine.list_annotations().is_empty());
    assert_eq!(engine.stats().stale_dropped, 1);
}

#[test]
fn result_is_discarded_when_cursor_moved_away() {
    let (mut engine, jobs) = manual_engine(teh(0.9), EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);

    let old = doc.selection();
    doc.set_cursor(0);
    engine.on_selection_change_at(&doc, old, doc.selection(), now);
    jobs.run_all();
    engine.poll(&mut doc, now);

    assert_eq!(doc.to_string(), "Teh ");
    assert!(engine.list_annotations().is_empty());
    assert_eq!(engine.stats().stale_dropped, 1);
}

#[test]
fn prediction_shrinks_while_typed_and_clears_on_mismatch() {
    let backend = Arc::new(ScriptedBackend::new("scripted").completion("test", "ing"));
    let mut engine = inline_engine(backend, EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "test", now);
    engine.poll(&mut doc, now);
    let prediction = engine.prediction().unwrap();
    assert_eq!(prediction.ghost_text, "ing");
    assert_eq!(prediction.full_text, "testing");
    assert_eq!(prediction.anchor_pos, 4);

    let dispatched = engine.stats().dispatched;
    type_text(&mut engine, &mut doc, "in", now);
    engine.poll(&mut doc, now);
    let prediction = engine.prediction().unwrap();
    assert_eq!(prediction.ghost_text, "g");
    assert_eq!(prediction.anchor_pos, 6);
    assert_eq!(engine.stats().dispatched, dispatched);

    type_text(&mut engine, &mut doc, "z", now);
    assert!(engine.prediction().is_none());
    engine.poll(&mut doc, now);
    assert_eq!(engine.stats().dispatched, dispatched + 1);
}

#[test]
fn accepting_prediction_inserts_ghost_text() {
    let backend = Arc::new(ScriptedBackend::new("scripted").completion("test", "ing"));
    let mut engine = inline_engine(backend, EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "test", now);
    engine.poll(&mut doc, now);
    let edit = engine.accept_prediction(&mut doc).unwrap();

    assert_eq!(edit.inserted(), "ing");
    assert_eq!(doc.to_string(), "testing");
    assert_eq!(doc.cursor(), 7);
    assert!(engine.prediction().is_none());
    assert!(matches!(
        engine.accept_prediction(&mut doc),
        Err(Error::NoPrediction)
    ));
}

#[test]
fn focus_loss_and_cursor_moves_clear_prediction() {
    let backend = Arc::new(ScriptedBackend::new("scripted").completion("test", "ing"));
    let mut engine = inline_engine(backend, EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "test", now);
    engine.poll(&mut doc, now);
    assert!(engine.prediction().is_some());
    engine.on_focus_lost(&doc);
    assert!(engine.prediction().is_none());

    type_text(&mut engine, &mut doc, " test", now);
    engine.poll(&mut doc, now);
    assert!(engine.prediction().is_some());
    engine.on_selection_change_at(&doc, Selection::cursor(9), Selection::cursor(2), now);
    assert!(engine.prediction().is_none());
}

#[test]
fn edit_in_paragraph_drops_its_grammar_entries_only() {
    let backend = Arc::new(
        ScriptedBackend::new("scripted")
            .word("teh", &[("the", 0.3)])
            .phrase("he go", "he goes", 0.8, "Subject and verb disagree")
            .phrase("they goes", "they go", 0.8, "Subject and verb disagree"),
    );
    let mut engine = inline_engine(backend, EngineOptions::default());
    let mut doc = DocumentBuffer::with_text("he go home. they goes out.\nteh end");
    let now = Instant::now();

    for cursor in [11, 26, 30] {
        doc.set_cursor(cursor);
        engine.trigger_check_now(&doc, CheckReason::Explicit);
        engine.poll(&mut doc, now);
    }
    let sources: Vec<_> = engine
        .list_annotations()
        .iter()
        .map(|e| (e.source, e.range()))
        .collect();
    assert_eq!(
        sources,
        vec![
            (CorrectionSource::Grammar, (0, 5)),
            (CorrectionSource::Grammar, (12, 21)),
            (CorrectionSource::Word, (27, 30)),
        ]
    );

    doc.select(25, 25);
    let edit = doc.insert("side");
    engine.on_edit_at(&doc, &edit, now);

    let entries = engine.list_annotations();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source, CorrectionSource::Word);
    assert_eq!(entries[0].range(), (31, 34));
    assert!(annotations_consistent(&engine, &doc));
}

#[test]
fn edit_in_other_paragraph_keeps_grammar_entry() {
    let backend = Arc::new(ScriptedBackend::new("scripted").phrase(
        "he go",
        "he goes",
        0.8,
        "Subject and verb disagree",
    ));
    let mut engine = inline_engine(backend, EngineOptions::default());
    let mut doc = DocumentBuffer::with_text("he go home.\nnext line");
    let now = Instant::now();

    doc.set_cursor(11);
    engine.trigger_check_now(&doc, CheckReason::Explicit);
    engine.poll(&mut doc, now);
    assert_eq!(engine.list_annotations().len(), 1);

    doc.set_cursor(21);
    let edit = doc.insert("s");
    engine.on_edit_at(&doc, &edit, now);
    assert_eq!(engine.list_annotations().len(), 1);
    assert_eq!(engine.list_annotations()[0].range(), (0, 5));
}

#[test]
fn revert_restores_text_and_relative_cursor() {
    let backend = Arc::new(ScriptedBackend::new("scripted").word("alot", &[("a lot", 0.9)]));
    let mut engine = inline_engine(backend, EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "alot ", now);
    engine.poll(&mut doc, now);
    assert_eq!(doc.to_string(), "a lot ");
    assert_eq!(doc.cursor(), 6);

    type_text(&mut engine, &mut doc, "more", now);
    assert_eq!(doc.cursor(), 10);
    let id = engine.list_annotations()[0].id;
    engine.revert_annotation(&mut doc, id).unwrap();

    assert_eq!(doc.to_string(), "alot more");
    assert_eq!(doc.cursor(), 9);
    assert!(engine.list_annotations().is_empty());

    // Reverted text is not corrected again.
    doc.set_cursor(4);
    engine.trigger_check_now(&doc, CheckReason::Explicit);
    engine.poll(&mut doc, now);
    assert_eq!(doc.to_string(), "alot more");
    assert!(engine.list_annotations().is_empty());
}

#[test]
fn repeated_checks_do_not_duplicate_entries() {
    let mut engine = inline_engine(teh(0.3), EngineOptions::default());
    let mut doc = DocumentBuffer::with_text("Teh cat");
    let now = Instant::now();
    doc.set_cursor(3);

    for _ in 0..3 {
        engine.trigger_check_now(&doc, CheckReason::Explicit);
        engine.poll(&mut doc, now);
    }
    assert_eq!(engine.list_annotations().len(), 1);
    assert!(annotations_consistent(&engine, &doc));
}

#[test]
fn applying_a_suggestion_is_undoable() {
    let backend = Arc::new(ScriptedBackend::new("scripted").word("Teh", &[("The", 0.3), ("Tea", 0.2)]));
    let mut engine = inline_engine(backend, EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh cat", now);
    engine.poll(&mut doc, now);
    doc.commit();
    let id = engine.list_annotations()[0].id;

    engine.apply_annotation(&mut doc, id, "Tea").unwrap();
    assert_eq!(doc.to_string(), "Tea cat");
    assert_eq!(doc.cursor(), 7);
    assert!(engine.list_annotations().is_empty());

    doc.undo();
    assert_eq!(doc.to_string(), "Teh cat");
}

#[test]
fn dismissed_text_is_not_flagged_again() {
    let mut engine = inline_engine(teh(0.3), EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);
    let id = engine.list_annotations()[0].id;
    engine.dismiss_annotation(id).unwrap();
    assert!(matches!(
        engine.dismiss_annotation(id),
        Err(Error::UnknownAnnotation(_))
    ));

    type_text(&mut engine, &mut doc, "teh ", now);
    engine.poll(&mut doc, now);
    assert!(engine.list_annotations().is_empty());
}

#[test]
fn dictionary_words_are_never_flagged() {
    let backend = teh(0.3);
    let mut engine = inline_engine(Arc::clone(&backend), EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);
    assert_eq!(engine.list_annotations().len(), 1);

    assert!(engine.add_to_dictionary("TEH").unwrap());
    assert!(!engine.add_to_dictionary("teh").unwrap());
    assert!(engine.list_annotations().is_empty());
    assert!(engine.is_in_dictionary("Teh"));
    assert_eq!(backend.excluded(), vec!["teh", "teh"]);

    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);
    assert!(engine.list_annotations().is_empty());
}

#[test]
fn grammar_waits_for_its_debounce() {
    let backend = Arc::new(ScriptedBackend::new("scripted").phrase(
        "he go",
        "he goes",
        0.8,
        "Subject and verb disagree",
    ));
    let mut engine = inline_engine(backend, EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let start = Instant::now();

    type_text(&mut engine, &mut doc, "he go home.", start);
    engine.poll(&mut doc, start + Duration::from_millis(799));
    assert!(engine.list_annotations().is_empty());
    assert_eq!(
        engine.next_deadline(),
        Some(start + Duration::from_millis(800))
    );

    engine.poll(&mut doc, start + Duration::from_millis(800));
    let entries = engine.list_annotations();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source, CorrectionSource::Grammar);
    assert_eq!(entries[0].kind, CorrectionKind::Manual);
    assert_eq!(entries[0].message.as_deref(), Some("Subject and verb disagree"));
}

#[test]
fn grammar_is_never_applied_automatically() {
    let backend = Arc::new(ScriptedBackend::new("scripted").phrase(
        "he go",
        "he goes",
        0.99,
        "Subject and verb disagree",
    ));
    let mut engine = inline_engine(backend, EngineOptions::default());
    let mut doc = DocumentBuffer::with_text("he go home.");
    doc.set_cursor(11);
    engine.trigger_check_now(&doc, CheckReason::Explicit);
    engine.poll(&mut doc, Instant::now());
    assert_eq!(doc.to_string(), "he go home.");
    assert_eq!(engine.list_annotations()[0].kind, CorrectionKind::Manual);
}

#[test]
fn idle_rechecks_word_under_cursor() {
    let mut engine = inline_engine(teh(0.3), EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let start = Instant::now();

    // No boundary typed, so only the idle timer catches the word.
    type_text(&mut engine, &mut doc, "Teh", start);
    engine.poll(&mut doc, start + Duration::from_millis(4999));
    assert!(engine.list_annotations().is_empty());

    engine.poll(&mut doc, start + Duration::from_millis(5000));
    assert_eq!(engine.list_annotations().len(), 1);
    assert_eq!(engine.list_annotations()[0].range(), (0, 3));
}

#[test]
fn idle_waits_for_a_pending_word_check() {
    let options = EngineOptions {
        word_debounce_ms: 8000,
        ..EngineOptions::default()
    };
    let mut engine = inline_engine(teh(0.3), options);
    let mut doc = DocumentBuffer::new();
    let start = Instant::now();

    type_text(&mut engine, &mut doc, "ab Teh", start);
    engine.poll(&mut doc, start + Duration::from_millis(5000));
    assert!(engine.list_annotations().is_empty());

    // The debounced check of "ab" goes out first; the idle check follows.
    engine.poll(&mut doc, start + Duration::from_millis(8000));
    assert!(engine.list_annotations().is_empty());
    engine.poll(&mut doc, start + Duration::from_millis(8001));
    let entries = engine.list_annotations();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].range(), (3, 6));
}

#[test]
fn leaving_a_word_checks_it() {
    let mut engine = inline_engine(teh(0.3), EngineOptions::default());
    let mut doc = DocumentBuffer::with_text("Teh cat");
    let now = Instant::now();

    doc.set_cursor(2);
    let old = doc.selection();
    doc.set_cursor(7);
    engine.on_selection_change_at(&doc, old, doc.selection(), now);
    engine.poll(&mut doc, now);
    assert_eq!(engine.list_annotations().len(), 1);
}

#[test]
fn later_engine_edit_is_carried_into_pending_results() {
    let backend = Arc::new(
        ScriptedBackend::new("scripted")
            .word("alot", &[("a lot", 0.9)])
            .phrase("he go", "he goes", 0.8, "Subject and verb disagree"),
    );
    let mut engine = inline_engine(backend, EngineOptions::default());
    let mut doc = DocumentBuffer::with_text("he go alot");
    doc.set_cursor(10);

    engine.trigger_check_now(&doc, CheckReason::Explicit);
    engine.poll(&mut doc, Instant::now());

    assert_eq!(doc.to_string(), "he go a lot");
    assert_eq!(doc.cursor(), 11);
    insta::assert_json_snapshot!(engine.list_annotations(), @r#"
    [
      {
        "id": 2,
        "from": 0,
        "to": 5,
        "kind": "manual",
        "source": "grammar",
        "originalValue": "he go",
        "currentValue": "he go",
        "suggestions": [
          {
            "text": "he goes",
            "score": 0.8
          }
        ],
        "message": "Subject and verb disagree"
      },
      {
        "id": 1,
        "from": 6,
        "to": 11,
        "kind": "auto",
        "source": "word",
        "originalValue": "alot",
        "currentValue": "a lot",
        "suggestions": [
          {
            "text": "a lot",
            "score": 0.9
          }
        ]
      }
    ]
    "#);
}

#[test]
fn provider_failure_produces_nothing() {
    let backend = Arc::new(ScriptedBackend::new("scripted").word("Teh", &[("The", 0.9)]).failing());
    let mut engine = inline_engine(backend, EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    assert_eq!(engine.poll(&mut doc, now), 0);
    assert_eq!(doc.to_string(), "Teh ");
    assert!(engine.list_annotations().is_empty());
    assert_eq!(engine.stats().errors, 1);
}

#[test]
fn remote_answers_while_local_engine_is_loading() {
    let local = Arc::new(ScriptedBackend::new("local").not_ready());
    let remote = teh(0.3);
    let providers = ProviderService::new(ProviderPolicy::OfflinePreferred)
        .with_local(local.clone())
        .with_remote(remote.clone());
    let mut engine = Engine::new(
        EngineOptions::default(),
        providers,
        Dictionary::in_memory(),
        InlineExecutor::new(),
    );
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);
    assert_eq!(local.calls(), 0);
    assert_eq!(remote.calls(), 1);
    assert_eq!(engine.list_annotations().len(), 1);
}

#[test]
fn failing_local_engine_falls_back_to_remote() {
    let local = Arc::new(ScriptedBackend::new("local").failing());
    let remote = teh(0.3);
    let providers = ProviderService::new(ProviderPolicy::OfflinePreferred)
        .with_local(local.clone())
        .with_remote(remote.clone());
    let mut engine = Engine::new(
        EngineOptions::default(),
        providers,
        Dictionary::in_memory(),
        InlineExecutor::new(),
    );
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);
    assert_eq!((local.calls(), remote.calls()), (1, 1));
    assert_eq!(engine.list_annotations().len(), 1);
    assert_eq!(engine.stats().errors, 0);
}

#[test]
fn destroyed_engine_ignores_late_results() {
    let (mut engine, jobs) = manual_engine(teh(0.9), EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);
    engine.destroy();
    assert!(engine.is_destroyed());

    jobs.run_all();
    assert_eq!(engine.poll(&mut doc, now), 0);
    assert_eq!(doc.to_string(), "Teh ");
    assert!(matches!(
        engine.add_to_dictionary("teh"),
        Err(Error::EngineDestroyed)
    ));
}

#[test]
fn destroy_does_not_wait_for_a_busy_provider() {
    common::init_tracing();
    let backend = Arc::new(
        ScriptedBackend::new("scripted")
            .word("Teh", &[("The", 0.9)])
            .delay(Duration::from_secs(2)),
    );
    let mut engine = Engine::new(
        EngineOptions::default(),
        common::local_service(Arc::clone(&backend)),
        Dictionary::in_memory(),
        ThreadedExecutor::new().unwrap(),
    );
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);
    let deadline = Instant::now() + Duration::from_secs(1);
    while backend.calls() == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(backend.calls(), 1);

    let started = Instant::now();
    engine.destroy();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(engine.poll(&mut doc, Instant::now()), 0);
    assert_eq!(doc.to_string(), "Teh ");
}

#[test]
fn unknown_and_changed_annotations_are_errors() {
    let mut engine = inline_engine(teh(0.3), EngineOptions::default());
    let mut doc = DocumentBuffer::new();
    let now = Instant::now();

    type_text(&mut engine, &mut doc, "Teh ", now);
    engine.poll(&mut doc, now);
    let id = engine.list_annotations()[0].id;

    assert!(matches!(
        engine.revert_annotation(&mut doc, id),
        Err(Error::NotApplied(_))
    ));

    // The host edits without telling the engine.
    doc.set_text("Tex ");
    assert!(matches!(
        engine.apply_annotation(&mut doc, id, "The"),
        Err(Error::TextChanged(_))
    ));
}
