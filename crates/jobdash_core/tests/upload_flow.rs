use std::path::PathBuf;
use std::sync::Once;

use jobdash_core::{
    update, AppState, ChannelState, DocumentKind, Effect, Msg, PushEvent, ResumeGate, Screen,
    UploadPhase, UserId, INVALID_TYPE_MESSAGE, NO_FILE_MESSAGE, TRANSPORT_FAILED_MESSAGE,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(jobdash_logging::initialize_for_tests);
}

fn user() -> UserId {
    UserId::new("user_1")
}

/// Signed in, has-resume check answered "no": upload form on screen.
fn upload_form() -> AppState {
    let (state, _) = update(AppState::new(), Msg::UserSignedIn(user()));
    let (state, effects) = update(
        state,
        Msg::ResumeChecked {
            session: 1,
            result: Ok(false),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.gate(), ResumeGate::Missing);
    state
}

fn select(state: AppState, name: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::ResumeFileSelected {
            path: PathBuf::from(name),
            mime: None,
        },
    )
}

fn submit(state: AppState, name: &str) -> (AppState, u64) {
    let (state, _) = select(state, name);
    let (state, effects) = update(state, Msg::UploadSubmitted);
    let attempt = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::UploadResume { attempt, .. } => Some(*attempt),
            _ => None,
        })
        .expect("upload effect");
    (state, attempt)
}

fn push(state: AppState, event: PushEvent) -> (AppState, Vec<Effect>) {
    update(state, Msg::Push(event))
}

fn progress(value: u8) -> PushEvent {
    PushEvent::Progress {
        user_id: user(),
        progress: value,
    }
}

#[test]
fn sign_in_syncs_checks_and_opens_channel() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), Msg::UserSignedIn(user()));

    assert_eq!(
        effects,
        vec![
            Effect::SyncUser { user_id: user() },
            Effect::CheckResume {
                session: 1,
                user_id: user(),
            },
            Effect::OpenStatusChannel {
                session: 1,
                user_id: user(),
            },
        ]
    );
    assert_eq!(state.view().screen, Screen::Loading);
    assert!(state.consume_dirty());
}

#[test]
fn wrong_file_type_is_rejected_without_effects() {
    init_logging();
    for name in ["resume.txt", "resume.png", "resume", "resume.pages"] {
        let (state, effects) = select(upload_form(), name);
        assert!(effects.is_empty());
        let (state, effects) = update(state, Msg::UploadSubmitted);
        assert!(effects.is_empty(), "{name} must not reach the network");

        let Screen::Upload(view) = state.view().screen else {
            panic!("upload form expected");
        };
        assert_eq!(view.phase, UploadPhase::Idle);
        assert_eq!(view.validation_error.as_deref(), Some(NO_FILE_MESSAGE));
    }

    let (state, _) = select(upload_form(), "resume.txt");
    let Screen::Upload(view) = state.view().screen else {
        panic!("upload form expected");
    };
    assert_eq!(view.validation_error.as_deref(), Some(INVALID_TYPE_MESSAGE));
    assert_eq!(view.file_name, None);
}

#[test]
fn submit_emits_upload_with_file_and_user() {
    init_logging();
    let (state, _) = select(upload_form(), "/home/me/resume.docx");
    let (state, effects) = update(state, Msg::UploadSubmitted);

    match effects.as_slice() {
        [Effect::UploadResume {
            attempt,
            user_id,
            file,
        }] => {
            assert_eq!(*attempt, 1);
            assert_eq!(user_id, &user());
            assert_eq!(file.file_name, "resume.docx");
            assert_eq!(file.kind, DocumentKind::Docx);
        }
        other => panic!("unexpected effects {other:?}"),
    }
    let Screen::Upload(view) = state.view().screen else {
        panic!("upload form expected");
    };
    assert_eq!(view.phase, UploadPhase::Uploading);
    assert_eq!(view.progress, 10);
    assert_eq!(view.button_label, "Uploading your resume...");
}

#[test]
fn progress_to_hundred_flips_gate_and_fetches_first_page() {
    init_logging();
    let (state, attempt) = submit(upload_form(), "resume.pdf");
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            attempt,
            result: Ok(()),
        },
    );
    assert_eq!(state.upload().phase(), UploadPhase::Processing);
    assert_eq!(state.upload().progress(), 10);

    let (state, effects) = push(state, progress(50));
    assert!(effects.is_empty());
    assert_eq!(state.upload().progress(), 50);
    assert_eq!(state.gate(), ResumeGate::Missing);

    let (state, effects) = push(state, progress(100));
    assert_eq!(state.gate(), ResumeGate::Ready);
    assert_eq!(state.generation(), 1);
    assert_eq!(state.upload().phase(), UploadPhase::Success);
    let pages: Vec<u32> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::FetchJobs { page, .. } => Some(*page),
            _ => None,
        })
        .collect();
    assert_eq!(pages, vec![1]);
    assert!(effects.contains(&Effect::FetchBookmarks {
        session: 1,
        user_id: user(),
    }));
    assert!(matches!(state.view().screen, Screen::Jobs(_)));

    // A late processed(success) for the same upload must not reload again.
    let (state, effects) = push(
        state,
        PushEvent::Processed {
            user_id: user(),
            success: true,
            error: None,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.generation(), 1);
}

#[test]
fn processed_success_forces_full_progress() {
    init_logging();
    let (state, _) = submit(upload_form(), "resume.pdf");
    let (state, _) = push(state, progress(20));
    let (state, _) = push(
        state,
        PushEvent::Processed {
            user_id: user(),
            success: true,
            error: None,
        },
    );

    assert_eq!(state.upload().phase(), UploadPhase::Success);
    assert_eq!(state.upload().progress(), 100);
}

#[test]
fn terminal_state_ignores_late_progress() {
    init_logging();
    let (state, _) = submit(upload_form(), "resume.pdf");
    let (state, _) = push(
        state,
        PushEvent::Error {
            user_id: user(),
            error: Some("Could not parse resume".to_string()),
        },
    );
    assert_eq!(state.upload().phase(), UploadPhase::Error);

    let (state, _) = push(state, progress(60));
    let (state, _) = push(
        state,
        PushEvent::Processing {
            user_id: user(),
            progress: None,
        },
    );
    assert_eq!(state.upload().phase(), UploadPhase::Error);
    assert_eq!(state.upload().error(), Some("Could not parse resume"));

    let (state, _) = update(state, Msg::UploadRetryClicked);
    assert_eq!(state.upload().phase(), UploadPhase::Idle);
    assert_eq!(state.upload().progress(), 0);

    let (state, _) = submit(state, "resume.pdf");
    let (state, _) = push(
        state,
        PushEvent::Processing {
            user_id: user(),
            progress: None,
        },
    );
    assert_eq!(state.upload().phase(), UploadPhase::Processing);
    assert_eq!(state.upload().progress(), 50);
}

#[test]
fn processed_failure_uses_server_message_or_default() {
    init_logging();
    let (state, _) = submit(upload_form(), "resume.pdf");
    let (state, _) = push(
        state,
        PushEvent::Processed {
            user_id: user(),
            success: false,
            error: None,
        },
    );

    let Screen::Upload(view) = state.view().screen else {
        panic!("upload form expected");
    };
    assert_eq!(view.phase, UploadPhase::Error);
    assert_eq!(
        view.error.as_deref(),
        Some("Processing failed. Please try again.")
    );
    assert!(view.can_retry);
    assert_eq!(state.gate(), ResumeGate::Missing);
}

#[test]
fn transport_rejection_is_terminal_until_retry() {
    init_logging();
    let (state, attempt) = submit(upload_form(), "resume.pdf");
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            attempt,
            result: Err("http status 500".to_string()),
        },
    );
    assert_eq!(state.upload().phase(), UploadPhase::Error);
    assert_eq!(state.upload().error(), Some(TRANSPORT_FAILED_MESSAGE));

    let (state, effects) = update(state, Msg::UploadSubmitted);
    assert!(effects.is_empty(), "no automatic retry");
    assert_eq!(state.upload().phase(), UploadPhase::Error);
}

#[test]
fn events_for_other_users_are_ignored() {
    init_logging();
    let (state, _) = submit(upload_form(), "resume.pdf");
    let (mut state, _) = update(state, Msg::Tick);
    state.consume_dirty();

    let (mut state, effects) = push(
        state,
        PushEvent::Processed {
            user_id: UserId::new("someone_else"),
            success: true,
            error: None,
        },
    );

    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state.upload().phase(), UploadPhase::Uploading);
    assert_eq!(state.gate(), ResumeGate::Missing);
}

#[test]
fn channel_state_is_reported() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::UserSignedIn(user()));
    let (state, _) = update(
        state,
        Msg::ChannelStateChanged {
            session: 1,
            state: ChannelState::Reconnecting { attempt: 2 },
        },
    );
    assert_eq!(state.view().channel, ChannelState::Reconnecting { attempt: 2 });
}
