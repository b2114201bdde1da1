use script_api::MockScriptService;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use workflow::{
    EditOrchestrator, ScriptView, WorkflowError, WorkflowOutcome, WorkflowStore,
};

const WAIT: Duration = Duration::from_secs(5);

fn setup() -> (Arc<MockScriptService>, EditOrchestrator, WorkflowStore) {
    // RUST_LOG=workflow=debug surfaces orchestrator logs when a test fails.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let service = Arc::new(MockScriptService::default());
    let orchestrator = EditOrchestrator::new(service.clone());
    (service, orchestrator, WorkflowStore::new())
}

fn generate_document(
    orchestrator: &EditOrchestrator,
    store: &mut WorkflowStore,
    prompt: &str,
    scene_count: u32,
) {
    store.set_prompt(prompt);
    store.set_scene_count(scene_count);
    orchestrator.generate(store).unwrap();
    let outcome = orchestrator.wait(store, WAIT).expect("generation timed out");
    assert!(matches!(outcome, WorkflowOutcome::DocumentReplaced));
}

#[test]
fn generate_produces_a_consistent_document() {
    let (_, orchestrator, mut store) = setup();
    generate_document(&orchestrator, &mut store, "a storm at sea", 3);

    let document = store.document().unwrap();
    assert_eq!(document.total_scenes, 3);
    assert_eq!(document.total_scenes as usize, document.scenes.len());
    let numbers: HashSet<u32> = document.scenes.iter().map(|s| s.scene_number).collect();
    assert_eq!(numbers.len(), document.scenes.len());
    assert!(!store.is_busy());
}

#[test]
fn edits_before_generation_are_rejected_without_a_network_call() {
    let (service, orchestrator, mut store) = setup();
    store.set_prompt("a storm at sea");

    let err = orchestrator.edit_all(&mut store, "make it darker").unwrap_err();
    assert!(matches!(err, WorkflowError::NoDocument));
    let err = orchestrator
        .edit_scene(&mut store, 1, "add dialogue")
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NoDocument));
    assert_eq!(service.calls(), 0);
}

#[test]
fn local_validation_rejects_bad_input_before_any_request() {
    let (service, orchestrator, mut store) = setup();

    let err = orchestrator.generate(&mut store).unwrap_err();
    assert!(matches!(err, WorkflowError::EmptyPrompt));
    store.set_prompt("   ");
    let err = orchestrator.generate(&mut store).unwrap_err();
    assert!(matches!(err, WorkflowError::EmptyPrompt));
    assert_eq!(service.calls(), 0);

    generate_document(&orchestrator, &mut store, "a storm at sea", 2);
    let calls_after_generate = service.calls();

    let err = orchestrator.edit_all(&mut store, "  ").unwrap_err();
    assert!(matches!(err, WorkflowError::EmptyInstruction));
    let err = orchestrator
        .edit_scene(&mut store, 99, "add dialogue")
        .unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownScene(99)));
    assert_eq!(service.calls(), calls_after_generate);
}

#[test]
fn a_second_operation_while_one_is_in_flight_is_rejected() {
    let (_, orchestrator, mut store) = setup();
    store.set_prompt("a storm at sea");
    orchestrator.generate(&mut store).unwrap();

    let err = orchestrator.generate(&mut store).unwrap_err();
    assert!(matches!(err, WorkflowError::OperationInFlight(_)));
    let err = orchestrator
        .edit_all(&mut store, "make it darker")
        .unwrap_err();
    assert!(matches!(err, WorkflowError::OperationInFlight(_)));

    // The in-flight generation is unaffected by the rejected attempts.
    let outcome = orchestrator.wait(&mut store, WAIT).expect("generation timed out");
    assert!(matches!(outcome, WorkflowOutcome::DocumentReplaced));
    assert!(store.document().is_some());
}

#[test]
fn a_failed_scene_edit_leaves_the_document_unchanged() {
    let (service, orchestrator, mut store) = setup();
    generate_document(&orchestrator, &mut store, "a storm at sea", 2);
    let before = store.document().unwrap().clone();

    service.set_fail_requests(true);
    orchestrator
        .edit_scene(&mut store, 1, "add dialogue")
        .unwrap();
    let outcome = orchestrator.wait(&mut store, WAIT).expect("edit timed out");
    match outcome {
        WorkflowOutcome::Failed(WorkflowError::EditSceneFailed {
            scene_number,
            ref scene_title,
            ..
        }) => {
            assert_eq!(scene_number, 1);
            assert!(!scene_title.is_empty());
        }
        other => panic!("expected a scoped edit failure, got {other:?}"),
    }
    assert_eq!(store.document(), Some(&before));
    assert!(!store.is_busy());
}

#[test]
fn a_failed_generation_leaves_the_document_absent() {
    let (service, orchestrator, mut store) = setup();
    service.set_fail_requests(true);
    store.set_prompt("a storm at sea");
    orchestrator.generate(&mut store).unwrap();

    let outcome = orchestrator.wait(&mut store, WAIT).expect("generation timed out");
    assert!(matches!(
        outcome,
        WorkflowOutcome::Failed(WorkflowError::GenerationFailed { .. })
    ));
    assert!(store.document().is_none());
    assert!(!store.is_busy());
}

#[test]
fn a_stale_generation_response_is_discarded() {
    let (_, orchestrator, mut store) = setup();
    store.set_prompt("surviving an earthquake");
    orchestrator.generate(&mut store).unwrap();

    // The prompt changes before the response is reconciled.
    store.set_prompt("a quiet morning");
    let outcome = orchestrator.wait(&mut store, WAIT).expect("generation timed out");
    assert!(matches!(outcome, WorkflowOutcome::StaleResponseDiscarded));
    assert!(store.document().is_none());
    assert!(!store.is_busy());

    // The derived-state recomputation now regenerates for the current prompt.
    assert!(orchestrator.ensure_generated(&mut store).unwrap());
    let outcome = orchestrator.wait(&mut store, WAIT).expect("generation timed out");
    assert!(matches!(outcome, WorkflowOutcome::DocumentReplaced));
    assert_eq!(
        store.document().unwrap().original_prompt,
        "a quiet morning"
    );
}

#[test]
fn a_stale_edit_response_is_discarded_after_the_document_is_invalidated() {
    let (_, orchestrator, mut store) = setup();
    generate_document(&orchestrator, &mut store, "a storm at sea", 2);
    orchestrator
        .edit_all(&mut store, "make it darker")
        .unwrap();

    // Changing the prompt mid-edit abandons the document the edit targeted.
    store.set_prompt("a quiet morning");
    let outcome = orchestrator.wait(&mut store, WAIT).expect("edit timed out");
    assert!(matches!(outcome, WorkflowOutcome::StaleResponseDiscarded));
    assert!(store.document().is_none());
    assert!(!store.is_busy());
}

#[test]
fn ensure_generated_is_idle_without_work_to_do() {
    let (service, orchestrator, mut store) = setup();

    // Nothing to do with an empty prompt.
    assert!(!orchestrator.ensure_generated(&mut store).unwrap());
    assert_eq!(service.calls(), 0);

    generate_document(&orchestrator, &mut store, "a storm at sea", 2);
    let calls_after_generate = service.calls();

    // Nothing to do while a document is present.
    assert!(!orchestrator.ensure_generated(&mut store).unwrap());
    assert_eq!(service.calls(), calls_after_generate);
}

#[test]
fn scene_views_round_trip_to_the_document() {
    let (_, orchestrator, mut store) = setup();
    generate_document(&orchestrator, &mut store, "a storm at sea", 3);
    let document = store.document().unwrap();
    let view = ScriptView::from_document(document);

    for scene_view in &view.scenes {
        let scene = document.find_scene(scene_view.scene_number).unwrap();
        assert_eq!(scene.scene_title, scene_view.scene_title);
        assert_eq!(scene.script, scene_view.script);
        assert_eq!(scene.story_context, scene_view.story_context);
        assert_eq!(scene.trigger_word, scene_view.trigger_word);
    }
}

#[test]
fn earthquake_scenario_matches_the_reference_workflow() {
    let (_, orchestrator, mut store) = setup();
    generate_document(&orchestrator, &mut store, "surviving an earthquake", 2);

    let document = store.document().unwrap();
    assert_eq!(document.total_scenes, 2);
    assert_eq!(document.scenes[0].scene_title, "Before the Quake");
    assert_eq!(document.scenes[1].scene_title, "Riding Out the Quake");
    for scene in &document.scenes {
        assert!(!scene.script.is_empty());
        assert!(!scene.story_context.is_empty());
        assert_eq!(scene.trigger_word, "princess merida");
    }
}

#[test]
fn edit_all_keeps_the_project_and_replaces_the_scenes() {
    let (_, orchestrator, mut store) = setup();
    generate_document(&orchestrator, &mut store, "surviving an earthquake", 2);
    let before = store.document().unwrap().clone();

    orchestrator
        .edit_all(&mut store, "make it funnier")
        .unwrap();
    let outcome = orchestrator.wait(&mut store, WAIT).expect("edit timed out");
    assert!(matches!(outcome, WorkflowOutcome::DocumentReplaced));

    let after = store.document().unwrap();
    assert_eq!(after.project_id, before.project_id);
    assert_ne!(after.scenes, before.scenes);
    assert!(after
        .scenes
        .iter()
        .all(|scene| scene.script.contains("make it funnier")));
}

#[test]
fn edit_scene_still_replaces_the_whole_document() {
    let (_, orchestrator, mut store) = setup();
    generate_document(&orchestrator, &mut store, "surviving an earthquake", 2);
    let before = store.document().unwrap().clone();

    orchestrator
        .edit_scene(&mut store, 1, "add dialogue")
        .unwrap();
    let outcome = orchestrator.wait(&mut store, WAIT).expect("edit timed out");
    assert!(matches!(outcome, WorkflowOutcome::DocumentReplaced));

    let after = store.document().unwrap();
    assert_eq!(after.project_id, before.project_id);
    assert_ne!(
        after.find_scene(1).unwrap().script,
        before.find_scene(1).unwrap().script
    );
    assert_eq!(after.find_scene(2), before.find_scene(2));
}
