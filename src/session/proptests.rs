//! Property-based tests for the conversation manager
//!
//! Random sequences of uploads, resets and responses must keep:
//! - the transcript starting with user, every assistant turn answering one
//! - the transcript never longer than the display log
//! - the original image changing only on upload-from-empty or reset
//! - requests failing exactly when no image is loaded

use super::{ConversationManager, SessionError, UploadOutcome};
use crate::images;
use crate::llm::{MessageContent, OutputItem, Role};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    Upload(Vec<u8>),
    Reset,
    Respond(String, Vec<OutputItem>),
}

fn arb_output() -> impl Strategy<Value = OutputItem> {
    prop_oneof![
        proptest::collection::vec(proptest::option::of("[a-zA-Z !.\n ]{0,20}"), 0..4).prop_map(
            |texts| OutputItem::Message {
                content: texts
                    .into_iter()
                    .map(|text| MessageContent { text })
                    .collect(),
            }
        ),
        proptest::option::of("[A-Za-z0-9+/]{4,16}")
            .prop_map(|result| OutputItem::ImageGenerationCall { result }),
        Just(OutputItem::Unknown),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        1 => proptest::collection::vec(any::<u8>(), 1..32).prop_map(Action::Upload),
        1 => Just(Action::Reset),
        4 => (
            "[a-z ]{1,20}",
            proptest::collection::vec(arb_output(), 0..4)
        )
            .prop_map(|(prompt, outputs)| Action::Respond(prompt, outputs)),
    ]
}

fn assert_invariants(manager: &ConversationManager) {
    let transcript = manager.transcript();
    if let Some(first) = transcript.first() {
        assert_eq!(first.role, Role::User, "transcript starts with assistant");
    }
    // Image-only replies leave two user turns in a row, never two assistants
    for pair in transcript.windows(2) {
        if pair[1].role == Role::Assistant {
            assert_eq!(pair[0].role, Role::User, "assistant follows assistant");
        }
    }
    assert!(transcript.len() <= manager.render_log().count());
    assert_eq!(manager.is_active(), manager.image_state().original.is_some());
    assert_eq!(
        manager.image_state().original.is_some(),
        manager.image_state().current.is_some()
    );
}

proptest! {
    #[test]
    fn prop_invariants_hold(actions in proptest::collection::vec(arb_action(), 0..30)) {
        let mut manager = ConversationManager::new();

        for action in actions {
            let original_before = manager.image_state().original.clone();

            match action {
                Action::Upload(bytes) => {
                    let was_active = manager.is_active();
                    let outcome = manager.ingest_upload(&bytes);
                    if was_active {
                        prop_assert_eq!(outcome, UploadOutcome::Ignored);
                        prop_assert_eq!(&manager.image_state().original, &original_before);
                    } else {
                        prop_assert_eq!(outcome, UploadOutcome::Accepted);
                        let encoded = images::encode_b64(&bytes);
                        prop_assert_eq!(
                            manager.image_state().original.as_deref(),
                            Some(encoded.as_str())
                        );
                        prop_assert!(manager.transcript().is_empty());
                        prop_assert_eq!(manager.render_log().count(), 0);
                    }
                }
                Action::Reset => {
                    manager.reset();
                    prop_assert!(!manager.is_active());
                    prop_assert!(manager.image_state().current.is_none());
                    prop_assert!(manager.transcript().is_empty());
                    prop_assert_eq!(manager.render_log().count(), 0);
                }
                Action::Respond(prompt, outputs) => {
                    match manager.build_request(&prompt) {
                        Err(SessionError::MissingImage) => {
                            prop_assert!(!manager.is_active());
                        }
                        Ok(turns) => {
                            prop_assert_eq!(turns.len(), manager.transcript().len() + 1);
                            let transcript_before = manager.transcript().len();
                            manager.apply_response(&prompt, &outputs);
                            prop_assert!(manager.transcript().len() > transcript_before);
                            prop_assert_eq!(&manager.image_state().original, &original_before);
                        }
                    }
                }
            }

            assert_invariants(&manager);
        }
    }

    #[test]
    fn prop_base64_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let encoded = images::encode_b64(&bytes);
        prop_assert_eq!(images::decode_b64(&encoded).unwrap(), bytes);
    }

    #[test]
    fn prop_current_image_is_last_result(
        results in proptest::collection::vec(proptest::option::of("[A-Za-z0-9]{4,8}"), 1..5)
    ) {
        let mut manager = ConversationManager::new();
        manager.ingest_upload(b"seed");
        let before = manager.current_image().map(str::to_string);

        let outputs: Vec<OutputItem> = results
            .iter()
            .cloned()
            .map(|result| OutputItem::ImageGenerationCall { result })
            .collect();
        manager.apply_response("edit", &outputs);

        let expected = results.last().cloned().flatten().or(before);
        prop_assert_eq!(manager.current_image().map(str::to_string), expected);

        let images_logged = manager.render_log().filter(|e| e.kind == super::EntryKind::Image).count();
        prop_assert!(images_logged <= 1);
    }
}
