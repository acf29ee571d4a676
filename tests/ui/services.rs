use crossterm::event::KeyCode;

use swarmdeck::backend::memory::{BackendCall, BackendOp};
use swarmdeck::backend::BackendError;
use swarmdeck::config::Config;
use swarmdeck::constants::{
    ERROR_INSPECT_SERVICE, ERROR_INVALID_REPLICAS, ERROR_REMOVE_SERVICE, ERROR_SCALE_SERVICE, ERROR_SERVICE_LOGS,
    ERROR_SHOW_TASKS, INFO_REFRESHING_SERVICES,
};
use swarmdeck::ui::components::SortMode;
use swarmdeck::ui::core::{Action, RoutingState};

use super::support::{code, ctrl, key, Harness, FIRST_SERVICE, WEB_SERVICE};

fn assert_idle(h: &Harness) {
    assert_eq!(h.handler.routing_state(), RoutingState::Interpreting);
    assert!(h.handler.registry().is_empty());
}

#[tokio::test]
async fn test_scale_commit_scales_selected_service_once() {
    let mut h = Harness::new();

    h.press(ctrl('s'));
    assert!(h.handler.is_forwarding());
    assert_eq!(h.handler.registry().len(), 1);

    h.press(key('5'));
    h.press(code(KeyCode::Enter));
    h.settle().await;

    assert_eq!(h.calls(), vec![BackendCall::Scale(FIRST_SERVICE.to_string(), 5)]);
    assert_idle(&h);
    assert_eq!(h.messages(), vec![format!("Service {} scaled to 5 replicas", FIRST_SERVICE)]);

    let actions = h.drain_actions();
    assert!(actions.contains(&Action::ReloadServices));
    assert_eq!(actions.last(), Some(&Action::Refresh));
}

#[tokio::test]
async fn test_scale_rejects_invalid_counts_without_calling_backend() {
    for input in ["-1", "abc", "", "2.5"] {
        let mut h = Harness::new();
        h.press(ctrl('s'));
        h.type_text(input);
        h.press(code(KeyCode::Enter));
        h.settle().await;

        assert!(h.calls().is_empty(), "input {:?} reached the backend", input);
        assert_eq!(h.messages(), vec![format!("{}: {}", ERROR_INVALID_REPLICAS, input)]);
        assert_idle(&h);
    }
}

#[tokio::test]
async fn test_scale_to_zero_is_allowed() {
    let mut h = Harness::new();
    h.press(ctrl('s'));
    h.type_text("0");
    h.press(code(KeyCode::Enter));
    h.settle().await;

    assert_eq!(h.calls(), vec![BackendCall::Scale(FIRST_SERVICE.to_string(), 0)]);
}

#[tokio::test]
async fn test_scale_edit_keys_change_committed_value() {
    let mut h = Harness::new();
    h.press(ctrl('s'));
    h.type_text("15");
    h.press(code(KeyCode::Backspace));
    h.type_text("2");
    h.press(code(KeyCode::Enter));
    h.settle().await;

    assert_eq!(h.calls(), vec![BackendCall::Scale(FIRST_SERVICE.to_string(), 12)]);
}

#[tokio::test]
async fn test_scale_failure_is_reported_and_refreshes() {
    let mut h = Harness::new();
    h.backend
        .fail(BackendOp::Scale, BackendError::Unavailable("manager down".to_string()));

    h.press(ctrl('s'));
    h.type_text("3");
    h.press(code(KeyCode::Enter));
    h.settle().await;

    assert_eq!(h.calls(), vec![BackendCall::Scale(FIRST_SERVICE.to_string(), 3)]);
    assert_eq!(
        h.messages(),
        vec![format!("{}: Swarm manager unavailable: manager down", ERROR_SCALE_SERVICE)]
    );
    assert_idle(&h);
    assert_eq!(h.drain_actions().last(), Some(&Action::Refresh));
}

#[tokio::test]
async fn test_scale_global_service_surfaces_backend_error() {
    let mut h = Harness::new();
    // Sorted by name: api, node-exporter, web, worker
    h.press(key('j'));
    h.press(ctrl('s'));
    h.type_text("2");
    h.press(code(KeyCode::Enter));
    h.settle().await;

    assert_eq!(h.calls(), vec![BackendCall::Scale("g5t2hn".to_string(), 2)]);
    let messages = h.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with(ERROR_SCALE_SERVICE));
}

#[tokio::test]
async fn test_remove_declined_makes_no_call() {
    for answer in ["n", "", "yes", "N"] {
        let mut h = Harness::new();
        h.press(ctrl('r'));
        h.type_text(answer);
        h.press(code(KeyCode::Enter));
        h.settle().await;

        assert!(h.calls().is_empty(), "answer {:?} removed a service", answer);
        assert!(h.messages().is_empty());
        assert_idle(&h);
    }
}

#[tokio::test]
async fn test_remove_confirmed_with_either_case() {
    for answer in ["y", "Y"] {
        let mut h = Harness::new();
        h.press(ctrl('r'));
        h.type_text(answer);
        h.press(code(KeyCode::Enter));
        h.settle().await;

        assert_eq!(h.calls(), vec![BackendCall::Remove(FIRST_SERVICE.to_string())]);
        assert_eq!(h.messages(), vec![format!("Service {} removed", FIRST_SERVICE)]);
        assert!(h.backend.services().iter().all(|s| s.id != FIRST_SERVICE));
        assert_idle(&h);
    }
}

#[tokio::test]
async fn test_remove_failure_is_reported() {
    let mut h = Harness::new();
    h.backend.fail(BackendOp::Remove, BackendError::Other("in use".to_string()));

    h.press(ctrl('r'));
    h.press(key('y'));
    h.press(code(KeyCode::Enter));
    h.settle().await;

    assert_eq!(h.messages(), vec![format!("{}: in use", ERROR_REMOVE_SERVICE)]);
    assert_eq!(h.drain_actions().last(), Some(&Action::Refresh));
    assert_idle(&h);
}

#[tokio::test]
async fn test_cancel_makes_no_call() {
    for cancel in [code(KeyCode::Esc), ctrl('c')] {
        for start in [ctrl('s'), ctrl('r')] {
            let mut h = Harness::new();
            h.press(start);
            h.type_text("y");
            h.press(cancel);
            h.settle().await;

            assert!(h.calls().is_empty());
            assert!(h.messages().is_empty());
            assert_idle(&h);
        }
    }
}

#[tokio::test]
async fn test_keys_typed_into_prompt_are_not_commands() {
    let mut h = Harness::new();
    h.press(ctrl('s'));
    // Each of these is a command while interpreting
    h.press(key('j'));
    h.press(key('q'));
    h.press(code(KeyCode::F(1)));
    h.press(code(KeyCode::Esc));
    h.settle().await;

    assert!(!h.drain_actions().contains(&Action::Quit));
    assert_eq!(h.handler.services().read().selected_index(), 0);
    assert_eq!(h.handler.services().read().sort_mode(), SortMode::Name);
    assert!(h.calls().is_empty());
    assert_idle(&h);
}

#[tokio::test]
async fn test_interpreting_resumes_after_interaction() {
    let mut h = Harness::new();
    h.press(ctrl('r'));
    h.press(key('n'));
    h.press(code(KeyCode::Enter));
    h.settle().await;
    h.drain_actions();

    h.press(key('j'));
    assert_eq!(h.handler.services().read().selected_index(), 1);
    h.press(key('q'));
    assert!(h.drain_actions().contains(&Action::Quit));
}

#[tokio::test]
async fn test_prompt_keystrokes_request_refresh() {
    let mut h = Harness::new();
    h.press(ctrl('s'));
    h.drain_actions();
    h.type_text("12");
    h.press(code(KeyCode::Esc));
    h.settle().await;

    let refreshes = h
        .drain_actions()
        .into_iter()
        .filter(|action| *action == Action::Refresh)
        .count();
    // One per edited key, one when the prompt closes
    assert_eq!(refreshes, 3);
}

#[tokio::test]
async fn test_opening_logs_prompt_requests_refresh() {
    let mut h = Harness::new();
    h.drain_actions();
    h.press(key('l'));
    assert!(!h.handler.has_focus());
    assert!(h.drain_actions().contains(&Action::Refresh));

    h.press(code(KeyCode::Esc));
    h.settle().await;
    assert_idle(&h);
}

#[tokio::test]
async fn test_back_to_back_interactions() {
    let mut h = Harness::new();
    h.press(ctrl('s'));
    h.type_text("2");
    h.press(code(KeyCode::Enter));
    h.settle().await;

    h.press(ctrl('s'));
    h.type_text("7");
    h.press(code(KeyCode::Enter));
    h.settle().await;

    assert_eq!(
        h.calls(),
        vec![
            BackendCall::Scale(FIRST_SERVICE.to_string(), 2),
            BackendCall::Scale(FIRST_SERVICE.to_string(), 7),
        ]
    );
    assert_idle(&h);
}

#[tokio::test]
async fn test_extra_keys_after_commit_do_not_leak() {
    let mut h = Harness::new();
    h.press(ctrl('s'));
    h.type_text("3");
    h.press(code(KeyCode::Enter));
    // Typed ahead before the interaction finished
    h.type_text("99");
    h.settle().await;

    h.press(ctrl('s'));
    h.type_text("4");
    h.press(code(KeyCode::Enter));
    h.settle().await;

    assert_eq!(
        h.calls(),
        vec![
            BackendCall::Scale(FIRST_SERVICE.to_string(), 3),
            BackendCall::Scale(FIRST_SERVICE.to_string(), 4),
        ]
    );
}

#[tokio::test]
async fn test_scale_without_services_reports_no_selection() {
    let mut h = Harness::new();
    h.handler.services().write().set_services(Vec::new());

    h.press(ctrl('s'));
    h.type_text("2");
    h.press(code(KeyCode::Enter));
    h.settle().await;

    assert!(h.calls().is_empty());
    assert_eq!(h.messages(), vec![format!("{}: no service selected", ERROR_SCALE_SERVICE)]);
    assert_idle(&h);
}

#[tokio::test]
async fn test_filter_prompt_sets_and_clears_filter() {
    let mut h = Harness::new();
    h.press(key('%'));
    h.type_text("wor");
    h.press(code(KeyCode::Enter));
    h.settle().await;

    {
        let list = h.handler.services().read();
        assert_eq!(list.filter(), Some("wor"));
        assert_eq!(list.selected_id().unwrap(), "z8m1c4");
    }
    assert_idle(&h);

    h.press(key('%'));
    h.press(code(KeyCode::Enter));
    h.settle().await;
    assert_eq!(h.handler.services().read().filter(), None);
    assert_eq!(h.handler.services().read().visible_services().len(), 4);
}

#[tokio::test]
async fn test_logs_stream_until_viewer_closed() {
    let mut h = Harness::new();
    h.press(key('j'));
    h.press(key('j'));
    h.press(key('l'));
    assert!(!h.handler.has_focus());

    h.type_text("5m");
    h.press(code(KeyCode::Enter));
    // Still forwarding: the viewer reads this one
    assert!(h.handler.is_forwarding());
    h.press(code(KeyCode::Esc));
    h.settle().await;

    assert_eq!(
        h.calls(),
        vec![BackendCall::Logs {
            service_id: WEB_SERVICE.to_string(),
            since: "5m".to_string(),
        }]
    );
    assert_idle(&h);
    assert!(h.drain_actions().contains(&Action::CloseView));

    h.handler.on_view_closed();
    assert!(h.handler.has_focus());
}

#[tokio::test]
async fn test_logs_empty_since_uses_configured_default() {
    let mut config = Config::default();
    config.logs.default_since = "1h".to_string();
    let mut h = Harness::with_config(&config);

    h.press(key('l'));
    h.press(code(KeyCode::Enter));
    h.press(key('q'));
    h.settle().await;

    assert_eq!(
        h.calls(),
        vec![BackendCall::Logs {
            service_id: FIRST_SERVICE.to_string(),
            since: "1h".to_string(),
        }]
    );
    assert_idle(&h);
}

#[tokio::test]
async fn test_logs_failure_and_cancel_still_close_view() {
    let mut h = Harness::new();
    h.backend
        .fail(BackendOp::Logs, BackendError::NotFound(FIRST_SERVICE.to_string()));
    h.press(key('l'));
    h.press(code(KeyCode::Enter));
    h.settle().await;

    assert_eq!(
        h.messages(),
        vec![format!("{}: No such service: {}", ERROR_SERVICE_LOGS, FIRST_SERVICE)]
    );
    assert!(h.drain_actions().contains(&Action::CloseView));
    assert_idle(&h);

    h.handler.on_view_closed();
    h.press(key('l'));
    h.press(code(KeyCode::Esc));
    h.settle().await;
    assert_eq!(h.calls().len(), 1);
    assert!(h.drain_actions().contains(&Action::CloseView));
    assert_idle(&h);
}

#[tokio::test]
async fn test_inspect_opens_viewer_until_closed() {
    let mut h = Harness::new();
    h.press(key('i'));
    assert!(h.handler.is_forwarding());
    assert!(!h.handler.has_focus());

    // Scroll, then close
    h.press(code(KeyCode::Down));
    h.press(code(KeyCode::Esc));
    h.settle().await;

    assert_eq!(h.calls(), vec![BackendCall::Inspect(FIRST_SERVICE.to_string())]);
    assert!(h.messages().is_empty());
    assert_idle(&h);

    let actions = h.drain_actions();
    assert!(actions.contains(&Action::CloseView));
    h.handler.on_view_closed();
    assert!(h.handler.has_focus());
}

#[tokio::test]
async fn test_inspect_failure_clears_forwarding() {
    let mut h = Harness::new();
    h.backend
        .fail(BackendOp::Inspect, BackendError::Unavailable("timeout".to_string()));

    h.press(key('I'));
    h.settle().await;

    assert_eq!(
        h.messages(),
        vec![format!("{}: Swarm manager unavailable: timeout", ERROR_INSPECT_SERVICE)]
    );
    assert!(h.drain_actions().contains(&Action::CloseView));
    assert_idle(&h);
}

#[tokio::test]
async fn test_sort_and_navigation_commands() {
    let mut h = Harness::new();
    h.press(code(KeyCode::End));
    assert_eq!(h.handler.services().read().selected_id().unwrap(), "z8m1c4");

    h.press(code(KeyCode::F(1)));
    {
        let list = h.handler.services().read();
        assert_eq!(list.sort_mode(), SortMode::Image);
        // Selection follows the service across the resort
        assert_eq!(list.selected_id().unwrap(), "z8m1c4");
    }

    h.press(code(KeyCode::Home));
    assert_eq!(h.handler.services().read().selected_index(), 0);
    assert!(h.drain_actions().iter().all(|action| *action == Action::Refresh));
}

#[tokio::test]
async fn test_refresh_command_reloads_services() {
    let mut h = Harness::new();
    h.press(code(KeyCode::F(5)));
    h.settle().await;

    assert_eq!(h.messages(), vec![INFO_REFRESHING_SERVICES.to_string()]);
    let loaded = h.drain_actions().into_iter().find_map(|action| match action {
        Action::ServicesLoaded(services) => Some(services),
        _ => None,
    });
    assert_eq!(loaded.map(|services| services.len()), Some(4));
}

#[tokio::test]
async fn test_refresh_failure_becomes_message() {
    let mut h = Harness::new();
    h.backend.fail(BackendOp::List, BackendError::Unavailable("down".to_string()));
    h.press(code(KeyCode::F(5)));
    h.settle().await;

    let messages = h.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[1].contains("down"));
}

#[tokio::test]
async fn test_enter_requests_task_view() {
    let mut h = Harness::new();
    h.press(code(KeyCode::Enter));
    assert!(h
        .drain_actions()
        .contains(&Action::ShowServiceTasks(FIRST_SERVICE.to_string())));

    h.handler.services().write().set_services(Vec::new());
    h.press(code(KeyCode::Enter));
    assert_eq!(h.messages(), vec![format!("{}: no service selected", ERROR_SHOW_TASKS)]);
}

#[tokio::test]
async fn test_shutdown_aborts_open_prompt() {
    let mut h = Harness::new();
    h.press(ctrl('s'));
    tokio::task::yield_now().await;
    assert!(h.handler.is_forwarding());

    h.handler.shutdown();
    // Aborted tasks drop their session and registration on the runtime
    for _ in 0..10 {
        if !h.handler.is_forwarding() && h.handler.registry().is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_idle(&h);
}
