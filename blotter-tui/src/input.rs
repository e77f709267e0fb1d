//! Keyboard input dispatch — overlays first, then global keys, then
//! panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, FormState, Overlay, Panel};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::Form(_) => {
            handle_form_key(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys (always available).
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('1') => {
            app.active_panel = Panel::Desk;
            return;
        }
        KeyCode::Char('2') => {
            app.active_panel = Panel::Combined;
            return;
        }
        KeyCode::Char('3') | KeyCode::Char('?') => {
            app.active_panel = Panel::Help;
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Desk | Panel::Combined => handle_blotter_key(app, key),
        Panel::Help => {}
    }
}

fn handle_blotter_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(blotter) = app.active_blotter() {
                let count = blotter.row_count();
                if count > 0 && blotter.cursor + 1 < count {
                    blotter.cursor += 1;
                }
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(blotter) = app.active_blotter() {
                blotter.cursor = blotter.cursor.saturating_sub(1);
            }
        }
        KeyCode::Char(' ') => {
            // Toggle selection; a fresh selection puts the instrument in
            // focus for every listening app.
            if let Some(blotter) = app.active_blotter() {
                if let Some(order) = blotter.toggle_selection() {
                    blotter.session.broadcast_instrument(&order.ticker);
                }
            }
        }
        KeyCode::Esc => {
            if let Some(blotter) = app.active_blotter() {
                blotter.selected.clear();
            }
        }
        KeyCode::Char('n') => {
            app.overlay = Overlay::Form(FormState::from_draft(&app.draft_defaults));
        }
        KeyCode::Char('e') => execute_targets(app),
        KeyCode::Char('s') => send_targets_to_combined(app),
        KeyCode::Char('x') | KeyCode::Delete => remove_targets(app),
        _ => {}
    }
}

fn handle_form_key(app: &mut AppState, key: KeyEvent) {
    let Overlay::Form(form) = &mut app.overlay else {
        return;
    };

    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
        }
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left => form.cycle(-1),
        KeyCode::Right => form.cycle(1),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Enter => submit_form(app),
        KeyCode::Char(c) => form.insert_char(c),
        _ => {}
    }
}

fn submit_form(app: &mut AppState) {
    let Overlay::Form(form) = &mut app.overlay else {
        return;
    };
    let Some(draft) = form.try_into_draft() else {
        // Field errors are now recorded; the overlay stays up to show them.
        return;
    };

    let Some(blotter) = app.active_blotter() else {
        app.set_warning("Open a blotter panel to submit an order");
        return;
    };
    match blotter.session.submit(draft) {
        Ok(order_id) => {
            let app_name = blotter.session.app_name().clone();
            app.overlay = Overlay::None;
            app.set_status(format!("[{app_name}] Order {order_id} created"));
        }
        Err(err) => app.set_error(format!("Submit failed: {err}")),
    }
}

fn execute_targets(app: &mut AppState) {
    let Some(blotter) = app.active_blotter() else {
        return;
    };
    let targets = blotter.target_ids();
    if targets.is_empty() {
        app.set_warning("No order to execute");
        return;
    }

    let mut started = 0;
    let mut skipped = Vec::new();
    for id in targets {
        match blotter.session.execute(id) {
            Ok(()) => started += 1,
            Err(err) => skipped.push(format!("{id}: {err}")),
        }
    }
    if skipped.is_empty() {
        app.set_status(format!("Executing {started} order(s)"));
    } else {
        app.set_warning(format!("Executing {started}, skipped {}", skipped.join("; ")));
    }
}

fn send_targets_to_combined(app: &mut AppState) {
    let combined_app = app.combined_app.clone();
    let Some(blotter) = app.active_blotter() else {
        return;
    };
    if *blotter.session.app_name() == combined_app {
        app.set_warning("Already on the combined blotter");
        return;
    }

    let targets = blotter.target_ids();
    if targets.is_empty() {
        app.set_warning("No order to send");
        return;
    }

    let mut sent = 0;
    for id in &targets {
        if blotter.session.send_to(*id, &combined_app).is_ok() {
            sent += 1;
        }
    }
    app.set_status(format!("Sent {sent} order(s) to {combined_app}"));
}

fn remove_targets(app: &mut AppState) {
    let Some(blotter) = app.active_blotter() else {
        return;
    };
    let targets = blotter.target_ids();
    if targets.is_empty() {
        app.set_warning("No order to remove");
        return;
    }

    let mut removed = 0;
    let mut errors = Vec::new();
    for id in targets {
        match blotter.session.remove(id) {
            Ok(_) => removed += 1,
            Err(err) => errors.push(err.to_string()),
        }
    }
    blotter.reconcile();
    if errors.is_empty() {
        app.set_status(format!("Removed {removed} order(s)"));
    } else {
        app.set_error(errors.join("; "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blotter_core::entry::OrderDraft;
    use blotter_core::{AppName, ContextBus, FillSettings, InProcessBus, OrderStatus, Session};
    use crossterm::event::KeyEvent;
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> AppState {
        let bus: Arc<dyn ContextBus> = Arc::new(InProcessBus::new());
        // A slow tick: these tests assert on dispatch, not on completion.
        let fill = FillSettings {
            tick: Duration::from_millis(500),
            fraction: 0.25,
        };
        let desk = Session::connect(AppName::new("desk"), Arc::clone(&bus), fill);
        let combined = Session::connect(AppName::combined(), Arc::clone(&bus), fill);
        let mut app = AppState::new(desk, combined, AppName::combined(), OrderDraft::default());
        app.overlay = Overlay::None;
        app
    }

    fn press(app: &mut AppState, code: KeyCode) {
        handle_key(app, KeyEvent::from(code));
    }

    #[test]
    fn q_quits() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn welcome_swallows_the_first_key() {
        let mut app = app();
        app.overlay = Overlay::Welcome;
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        assert!(matches!(app.overlay, Overlay::None));
    }

    #[test]
    fn tab_cycles_panels() {
        let mut app = app();
        assert_eq!(app.active_panel, Panel::Desk);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.active_panel, Panel::Combined);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.active_panel, Panel::Desk);
    }

    #[test]
    fn n_opens_the_order_form_seeded_with_defaults() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        match &app.overlay {
            Overlay::Form(form) => assert_eq!(form.ticker, "AAPL"),
            _ => panic!("expected form overlay"),
        }
    }

    #[test]
    fn form_enter_submits_to_the_active_blotter() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.overlay, Overlay::None));
        assert_eq!(app.desk.session.store().len(), 1);
        assert!(app.combined.session.store().is_empty());
    }

    #[test]
    fn form_stays_open_on_validation_failure() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        if let Overlay::Form(form) = &mut app.overlay {
            form.ticker.clear();
        }
        press(&mut app, KeyCode::Enter);

        match &app.overlay {
            Overlay::Form(form) => assert!(form.error_for(crate::app::FormField::Ticker).is_some()),
            _ => panic!("form should stay open"),
        }
        assert!(app.desk.session.store().is_empty());
    }

    #[test]
    fn s_sends_the_cursor_order_to_combined() {
        let mut app = app();
        app.desk.session.submit(OrderDraft::default()).unwrap();

        press(&mut app, KeyCode::Char('s'));
        app.pump_sessions();

        assert_eq!(app.combined.session.store().len(), 1);
        let copy = &app.combined.session.store().snapshot()[0];
        assert_eq!(copy.status, OrderStatus::New);
    }

    #[test]
    fn s_on_the_combined_panel_warns() {
        let mut app = app();
        app.active_panel = Panel::Combined;
        press(&mut app, KeyCode::Char('s'));
        let (message, _) = app.status_message.clone().unwrap();
        assert!(message.contains("Already on the combined blotter"));
    }

    #[test]
    fn x_removes_the_selected_orders() {
        let mut app = app();
        app.desk.session.submit(OrderDraft::default()).unwrap();
        app.desk.session.submit(OrderDraft::default()).unwrap();

        press(&mut app, KeyCode::Char(' ')); // select cursor row
        press(&mut app, KeyCode::Char('x'));

        assert_eq!(app.desk.session.store().len(), 1);
        assert!(app.desk.selected.is_empty());
    }

    #[test]
    fn e_starts_execution_and_double_execute_warns() {
        let mut app = app();
        app.desk.session.submit(OrderDraft::default()).unwrap();

        press(&mut app, KeyCode::Char('e'));
        let (message, _) = app.status_message.clone().unwrap();
        assert!(message.contains("Executing 1"));

        press(&mut app, KeyCode::Char('e'));
        let (message, level) = app.status_message.clone().unwrap();
        assert!(message.contains("skipped"), "got: {message}");
        assert_eq!(level, crate::app::StatusLevel::Warning);
    }

    #[test]
    fn space_broadcasts_the_instrument_in_focus() {
        let mut app = app();
        app.desk.session.submit(OrderDraft::default()).unwrap();

        press(&mut app, KeyCode::Char(' '));
        app.pump_sessions();

        let (message, _) = app.status_message.clone().unwrap();
        assert!(message.contains("Instrument in focus: AAPL"), "got: {message}");
    }
}
