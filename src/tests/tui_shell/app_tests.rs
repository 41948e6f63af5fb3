    use super::*;
    use crate::model::{BaseEntry, Entry, EntryId, PlanState};
    use crate::protocol::{FromHost, ToHost};
    use crate::transport::{HostEndpoint, channel};

    fn app_with(ids: &[&str]) -> (App, HostEndpoint) {
        let state = PlanState {
            entries: ids
                .iter()
                .map(|id| Entry::commit(*id, Action::Pick, *id, format!("commit {}", id)))
                .collect(),
            base: Some(BaseEntry {
                sha: "base".to_string(),
                message: "root".to_string(),
            }),
            ..PlanState::default()
        };
        let (link, endpoint) = channel();
        let app = App::new(PlanProvider::new(state, link), "plan".to_string());
        (app, endpoint)
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn order(app: &App) -> Vec<&str> {
        app.provider
            .state()
            .entries
            .iter()
            .map(|e| e.id.as_str())
            .collect()
    }

    #[test]
    fn search_focuses_next_match_and_wraps() {
        let (mut app, _endpoint) = app_with(&["a1", "b2", "c3"]);
        // Descending display: c3, b2, a1, base. Focus starts on c3.
        app.search("COMMIT");
        assert_eq!(
            app.provider.selection().focused().map(EntryId::as_str),
            Some("b2")
        );
        app.perform(KeyAction::SearchNext);
        assert_eq!(
            app.provider.selection().focused().map(EntryId::as_str),
            Some("a1")
        );
        app.perform(KeyAction::SearchNext);
        assert_eq!(
            app.provider.selection().focused().map(EntryId::as_str),
            Some("c3")
        );
        app.search("nothing like this");
        assert!(app.notice.as_ref().is_some_and(|n| n.is_error));
    }

    #[test]
    fn squash_on_oldest_commit_is_refused_with_a_notice() {
        let (mut app, _endpoint) = app_with(&["a1", "b2"]);
        app.perform(KeyAction::Focus(1));
        assert_eq!(
            app.provider.selection().focused().map(EntryId::as_str),
            Some("a1")
        );
        app.perform(KeyAction::SetAction(Action::Squash));
        assert_eq!(app.provider.state().entries[0].action, Action::Pick);
        assert!(app.notice.as_ref().is_some_and(|n| n.is_error));
    }

    #[test]
    fn keys_drive_the_provider() {
        let (mut app, _endpoint) = app_with(&["a1", "b2", "c3"]);
        event_loop::handle_key(&mut app, key('j'));
        event_loop::handle_key(&mut app, key('J'));
        assert_eq!(order(&app), vec!["b2", "a1", "c3"]);
        event_loop::handle_key(&mut app, key('d'));
        assert_eq!(app.provider.state().entries[0].action, Action::Drop);
    }

    #[test]
    fn search_prompt_collects_text_until_enter() {
        let (mut app, _endpoint) = app_with(&["a1", "b2"]);
        event_loop::handle_key(&mut app, key('/'));
        assert_eq!(app.mode, UiMode::Search);
        for c in "a1".chars() {
            event_loop::handle_key(&mut app, key(c));
        }
        event_loop::handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(app.mode, UiMode::Plan);
        assert_eq!(
            app.provider.selection().focused().map(EntryId::as_str),
            Some("a1")
        );
    }

    #[test]
    fn abort_asks_first_then_waits_for_the_host() {
        let (mut app, mut endpoint) = app_with(&["a1"]);
        event_loop::handle_key(&mut app, key('q'));
        assert_eq!(app.mode, UiMode::ConfirmAbort);
        event_loop::handle_key(&mut app, key('n'));
        assert_eq!(app.mode, UiMode::Plan);
        assert!(app.pending.is_none());

        event_loop::handle_key(&mut app, key('q'));
        event_loop::handle_key(&mut app, key('y'));
        let (id, name) = app.pending.expect("abort pending");
        assert_eq!(name, "Abort");

        let mut saw_abort = false;
        while let Ok(msg) = endpoint.inbox.try_recv() {
            if let ToHost::Request {
                request: HostRequest::Command {
                    command: HostCommand::Abort,
                },
                ..
            } = msg
            {
                saw_abort = true;
            }
        }
        assert!(saw_abort);

        endpoint
            .outbox
            .send(FromHost::Response {
                id,
                response: HostResponse::Ack {
                    status: PlanStatus::Aborted,
                },
            })
            .expect("send ack");
        app.poll_host();
        assert!(app.quit);
        assert_eq!(app.outcome(), Some(PlanStatus::Aborted));
    }

    #[test]
    fn read_only_plans_reject_mutating_keys() {
        let (link, _endpoint) = channel();
        let state = PlanState {
            entries: vec![Entry::commit("a1", Action::Pick, "a1", "x")],
            read_only: Some("merges".to_string()),
            ..PlanState::default()
        };
        let mut app = App::new(PlanProvider::new(state, link), "plan".to_string());
        app.perform(KeyAction::SetAction(Action::Drop));
        assert_eq!(app.provider.state().entries[0].action, Action::Pick);
        assert!(
            app.notice
                .as_ref()
                .is_some_and(|n| n.text.contains("merges"))
        );
        app.perform(KeyAction::ToggleOrder);
        assert!(app.provider.state().ascending);
    }
