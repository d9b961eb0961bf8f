use super::*;

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::MemoryBackend;
use crate::core::event::MouseEvent;
use crate::widgets::Window;

type Log = Rc<RefCell<Vec<String>>>;

/// Records every hook the runtime fires on it; used to observe routing.
struct Probe {
    name: &'static str,
    caption: &'static str,
    log: Log,
    bar: Vec<(Key, &'static str, i32)>,
}

impl Probe {
    fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            caption: "",
            log: Rc::clone(log),
            bar: Vec::new(),
        }
    }

    fn caption(mut self, caption: &'static str) -> Self {
        self.caption = caption;
        self
    }

    fn bar_entry(mut self, key: Key, name: &'static str, command: i32) -> Self {
        self.bar.push((key, name, command));
        self
    }

    fn record(&self, entry: String) {
        self.log.borrow_mut().push(format!("{}:{}", self.name, entry));
    }
}

impl Widget for Probe {
    fn on_attach(&mut self, state: &mut ControlState) {
        if !self.caption.is_empty() {
            state.set_caption(self.caption);
        }
    }

    fn on_focus(&mut self, _state: &mut ControlState, _ctx: &mut Ctx<'_>) {
        self.record("focus".into());
    }

    fn on_lose_focus(&mut self, _state: &mut ControlState, _ctx: &mut Ctx<'_>) {
        self.record("blur".into());
    }

    fn on_mouse_pressed(
        &mut self,
        _state: &mut ControlState,
        pos: Pos,
        _button: MouseButton,
        _ctx: &mut Ctx<'_>,
    ) {
        self.record(format!("pressed {},{}", pos.x, pos.y));
    }

    fn on_mouse_released(
        &mut self,
        _state: &mut ControlState,
        pos: Pos,
        _button: MouseButton,
        _ctx: &mut Ctx<'_>,
    ) {
        self.record(format!("released {},{}", pos.x, pos.y));
    }

    fn on_mouse_drag(
        &mut self,
        _state: &mut ControlState,
        pos: Pos,
        _button: MouseButton,
        _ctx: &mut Ctx<'_>,
    ) -> bool {
        self.record(format!("drag {},{}", pos.x, pos.y));
        false
    }

    fn on_mouse_enter(&mut self, _state: &mut ControlState, _ctx: &mut Ctx<'_>) -> bool {
        self.record("enter".into());
        false
    }

    fn on_mouse_leave(&mut self, _state: &mut ControlState, _ctx: &mut Ctx<'_>) -> bool {
        self.record("leave".into());
        false
    }

    fn on_mouse_over(&mut self, _state: &mut ControlState, pos: Pos, _ctx: &mut Ctx<'_>) -> bool {
        self.record(format!("over {},{}", pos.x, pos.y));
        false
    }

    fn on_mouse_wheel(
        &mut self,
        _state: &mut ControlState,
        direction: WheelDirection,
        _ctx: &mut Ctx<'_>,
    ) -> bool {
        self.record(format!("wheel {:?}", direction));
        false
    }

    fn on_update_command_bar(&self, _state: &ControlState, bar: &mut CommandBar) -> bool {
        for (key, name, command) in &self.bar {
            let _ = bar.set(*key, name, *command);
        }
        !self.bar.is_empty()
    }

    fn on_hot_key(&mut self, _state: &mut ControlState, _ctx: &mut Ctx<'_>) {
        self.record("hotkey".into());
    }
}

fn key(code: KeyCode) -> SystemEvent {
    SystemEvent::Key(Key::simple(code))
}

fn mouse(kind: MouseEventKind, x: i32, y: i32) -> SystemEvent {
    SystemEvent::Mouse(MouseEvent {
        kind,
        column: x,
        row: y,
        modifiers: KeyModifiers::NONE,
    })
}

fn app_with(events: Vec<SystemEvent>) -> Application<MemoryBackend> {
    let mut backend = MemoryBackend::new(80, 24);
    backend.push_events(events);
    match Application::new(backend, AppFlags::COMMAND_BAR) {
        Ok(app) => app,
        Err(err) => panic!("application init failed: {}", err),
    }
}

fn add_probe(
    app: &mut Application<MemoryBackend>,
    probe: Probe,
    layout: LayoutSpec,
) -> ControlId {
    let desktop = app.desktop();
    app.add(desktop, layout, Box::new(probe)).unwrap()
}

#[test]
fn new_application_has_a_desktop_and_no_modal_session() {
    let app = app_with(Vec::new());
    assert!(app.backend().is_initialized());
    assert!(app.tree().contains(app.desktop()));
    assert_eq!(app.modal_depth(), 0);
}

#[test]
fn run_paints_a_frame_and_restores_the_backend() {
    let mut app = app_with(Vec::new());
    app.run().unwrap();
    let frame = app.backend().last_frame().unwrap();
    assert_eq!((frame.width(), frame.height()), (80, 24));
    assert!(!app.backend().is_initialized());
}

#[test]
fn modal_stack_refuses_the_seventeenth_session() {
    let mut app = app_with(Vec::new());
    let desktop = app.desktop();
    for _ in 0..MAX_MODAL_STACK {
        app.push_modal(desktop).unwrap();
    }
    assert!(matches!(
        app.push_modal(desktop),
        Err(AppError::ModalStackFull)
    ));
    assert_eq!(app.modal_depth(), MAX_MODAL_STACK);
}

#[test]
fn clicks_reach_the_hit_control_in_local_coordinates() {
    let log: Log = Log::default();
    let mut app = app_with(vec![
        mouse(MouseEventKind::Down(MouseButton::Left), 5, 2),
        mouse(MouseEventKind::Up(MouseButton::Left), 5, 2),
    ]);
    add_probe(&mut app, Probe::new("p", &log), LayoutSpec::fixed(1, 1, 10, 3));
    app.run().unwrap();
    let log = log.borrow();
    assert!(log.contains(&"p:pressed 4,1".to_string()));
    assert!(log.contains(&"p:released 4,1".to_string()));
}

#[test]
fn clicks_outside_a_control_miss_it() {
    let log: Log = Log::default();
    let mut app = app_with(vec![
        mouse(MouseEventKind::Down(MouseButton::Left), 40, 10),
        mouse(MouseEventKind::Up(MouseButton::Left), 40, 10),
    ]);
    add_probe(&mut app, Probe::new("p", &log), LayoutSpec::fixed(1, 1, 10, 3));
    app.run().unwrap();
    assert!(log.borrow().iter().all(|e| !e.contains("pressed")));
}

#[test]
fn a_pressed_button_locks_the_mouse_to_the_press_owner() {
    let log: Log = Log::default();
    let mut app = app_with(vec![
        mouse(MouseEventKind::Down(MouseButton::Left), 5, 2),
        mouse(MouseEventKind::Drag(MouseButton::Left), 30, 10),
        mouse(MouseEventKind::Up(MouseButton::Left), 50, 20),
    ]);
    add_probe(&mut app, Probe::new("p", &log), LayoutSpec::fixed(1, 1, 10, 3));
    app.run().unwrap();
    let log = log.borrow();
    // Drag and release land far outside the control but still reach it.
    assert!(log.contains(&"p:drag 29,9".to_string()));
    assert!(log.contains(&"p:released 49,19".to_string()));
}

#[test]
fn wheel_goes_to_the_hovered_control_but_not_while_locked() {
    let log: Log = Log::default();
    let mut app = app_with(vec![
        mouse(MouseEventKind::Moved, 5, 2),
        mouse(MouseEventKind::ScrollUp, 5, 2),
        mouse(MouseEventKind::Down(MouseButton::Left), 5, 2),
        mouse(MouseEventKind::ScrollDown, 5, 2),
        mouse(MouseEventKind::Up(MouseButton::Left), 5, 2),
    ]);
    add_probe(&mut app, Probe::new("p", &log), LayoutSpec::fixed(1, 1, 10, 3));
    app.run().unwrap();
    let log = log.borrow();
    assert!(log.contains(&"p:enter".to_string()));
    assert!(log.contains(&"p:wheel Up".to_string()));
    assert!(!log.contains(&"p:wheel Down".to_string()));
}

#[test]
fn hover_fires_leave_then_enter_when_the_pointer_moves_between_controls() {
    let log: Log = Log::default();
    let mut app = app_with(vec![
        mouse(MouseEventKind::Moved, 2, 2),
        mouse(MouseEventKind::Moved, 22, 2),
    ]);
    add_probe(&mut app, Probe::new("a", &log), LayoutSpec::fixed(1, 1, 10, 3));
    add_probe(&mut app, Probe::new("b", &log), LayoutSpec::fixed(21, 1, 10, 3));
    app.run().unwrap();
    let log = log.borrow();
    let enter_a = log.iter().position(|e| e == "a:enter").unwrap();
    let leave_a = log.iter().position(|e| e == "a:leave").unwrap();
    let enter_b = log.iter().position(|e| e == "b:enter").unwrap();
    assert!(enter_a < leave_a && leave_a < enter_b);
}

#[test]
fn tab_moves_focus_and_the_loss_hook_runs_before_the_gain_hook() {
    let log: Log = Log::default();
    let mut app = app_with(vec![key(KeyCode::Tab)]);
    add_probe(&mut app, Probe::new("a", &log), LayoutSpec::fixed(1, 1, 10, 3));
    add_probe(&mut app, Probe::new("b", &log), LayoutSpec::fixed(21, 1, 10, 3));
    app.run().unwrap();
    let log = log.borrow();
    assert_eq!(log.as_slice(), &["a:focus", "a:blur", "b:focus"]);
}

#[test]
fn shift_tab_moves_focus_backward() {
    let log: Log = Log::default();
    let mut app = app_with(vec![SystemEvent::Key(Key::new(
        KeyCode::Tab,
        KeyModifiers::SHIFT,
    ))]);
    add_probe(&mut app, Probe::new("a", &log), LayoutSpec::fixed(1, 1, 10, 3));
    add_probe(&mut app, Probe::new("b", &log), LayoutSpec::fixed(21, 1, 10, 3));
    app.run().unwrap();
    let log = log.borrow();
    assert_eq!(log.as_slice(), &["a:focus", "a:blur", "b:focus"]);
}

#[test]
fn alt_hotkey_focuses_the_target_and_fires_its_hook() {
    let log: Log = Log::default();
    let seen: Rc<RefCell<Vec<ControlEvent>>> = Rc::default();
    let seen_by_handler = Rc::clone(&seen);
    let mut app = app_with(vec![SystemEvent::Key(Key::new(
        KeyCode::Char('s'),
        KeyModifiers::ALT,
    ))]);
    add_probe(&mut app, Probe::new("a", &log), LayoutSpec::fixed(1, 1, 10, 3));
    let target = add_probe(
        &mut app,
        Probe::new("b", &log).caption("&Save"),
        LayoutSpec::fixed(21, 1, 10, 3),
    );
    app.set_event_handler(Box::new(move |event| {
        seen_by_handler.borrow_mut().push(event.clone());
        EventResponse::Ignored
    }));
    app.run().unwrap();
    assert!(log.borrow().contains(&"b:hotkey".to_string()));
    let seen = seen.borrow();
    assert_eq!(seen[0].source, target);
    assert_eq!(seen[0].kind, ControlEventKind::HotKeyActivated);
}

#[test]
fn an_unconsumed_function_key_raises_the_bar_command() {
    let log: Log = Log::default();
    let seen: Rc<RefCell<Vec<ControlEventKind>>> = Rc::default();
    let seen_by_handler = Rc::clone(&seen);
    let mut app = app_with(vec![key(KeyCode::F(2))]);
    add_probe(
        &mut app,
        Probe::new("p", &log).bar_entry(Key::simple(KeyCode::F(2)), "Save", 7),
        LayoutSpec::fixed(1, 1, 10, 3),
    );
    app.set_event_handler(Box::new(move |event| {
        seen_by_handler.borrow_mut().push(event.kind.clone());
        EventResponse::Ignored
    }));
    app.run().unwrap();
    assert_eq!(seen.borrow().as_slice(), &[ControlEventKind::Command(7)]);
}

#[test]
fn the_command_bar_renders_the_focused_controls_entries() {
    let log: Log = Log::default();
    let mut app = app_with(Vec::new());
    add_probe(
        &mut app,
        Probe::new("p", &log).bar_entry(Key::simple(KeyCode::F(1)), "Help", 1),
        LayoutSpec::fixed(1, 1, 10, 3),
    );
    app.run().unwrap();
    let frame = app.backend().last_frame().unwrap();
    assert!(frame.row_text(23).contains("F1 Help"));
}

#[test]
fn a_modal_session_confines_input_to_its_subtree() {
    let log: Log = Log::default();
    let mut app = app_with(vec![
        mouse(MouseEventKind::Down(MouseButton::Left), 2, 2),
        mouse(MouseEventKind::Up(MouseButton::Left), 2, 2),
        key(KeyCode::Esc),
    ]);
    add_probe(&mut app, Probe::new("p", &log), LayoutSpec::fixed(1, 1, 10, 3));
    let desktop = app.desktop();
    let dialog = app
        .add(
            desktop,
            LayoutSpec::fixed(30, 8, 30, 10),
            Box::new(Window::new("Confirm").modal()),
        )
        .unwrap();
    app.show_modal(dialog).unwrap();
    // The click lands on the probe's cells but the modal root owns routing.
    assert!(log.borrow().iter().all(|e| !e.contains("pressed")));
    assert_eq!(app.modal_depth(), 0);
}

#[test]
fn entering_a_control_also_delivers_the_hover_position() {
    let log: Log = Log::default();
    let mut app = app_with(vec![mouse(MouseEventKind::Moved, 5, 2)]);
    add_probe(&mut app, Probe::new("p", &log), LayoutSpec::fixed(1, 1, 10, 3));
    app.run().unwrap();
    let log = log.borrow();
    let enter = log.iter().position(|e| e == "p:enter").unwrap();
    let over = log.iter().position(|e| e == "p:over 4,1").unwrap();
    assert!(enter < over);
}

#[test]
fn focus_hooks_fire_once_across_modal_repaints() {
    let log: Log = Log::default();
    let mut app = app_with(vec![
        SystemEvent::Resize(90, 28),
        SystemEvent::Resize(80, 24),
        key(KeyCode::Esc),
    ]);
    let desktop = app.desktop();
    let dialog = app
        .add(
            desktop,
            LayoutSpec::fixed(20, 5, 30, 10),
            Box::new(Window::new("Confirm").modal()),
        )
        .unwrap();
    app.add(
        dialog,
        LayoutSpec::fixed(2, 2, 10, 1),
        Box::new(Probe::new("p", &log)),
    )
    .unwrap();
    app.show_modal(dialog).unwrap();
    // The dialog is also a desktop child; it must only be painted (and its
    // focus chain only evaluated) in the modal pass, or the hooks churn on
    // every repaint.
    let log = log.borrow();
    assert_eq!(log.iter().filter(|e| *e == "p:focus").count(), 1);
    assert!(log.iter().all(|e| e != "p:blur"));
}

#[test]
fn shifted_mouse_movement_switches_the_bar_field_set() {
    let log: Log = Log::default();
    let mut app = app_with(vec![SystemEvent::Mouse(MouseEvent {
        kind: MouseEventKind::Moved,
        column: 60,
        row: 10,
        modifiers: KeyModifiers::SHIFT,
    })]);
    add_probe(
        &mut app,
        Probe::new("p", &log)
            .bar_entry(Key::simple(KeyCode::F(2)), "Save", 7)
            .bar_entry(Key::new(KeyCode::F(2), KeyModifiers::SHIFT), "Save As", 8),
        LayoutSpec::fixed(1, 1, 10, 3),
    );
    app.run().unwrap();
    let frame = app.backend().last_frame().unwrap();
    assert!(frame.row_text(23).contains("Shift+F2 Save As"));
    assert!(!frame.row_text(23).contains(" F2 Save "));
}

#[test]
fn a_resize_event_reshapes_the_frame() {
    let mut app = app_with(vec![SystemEvent::Resize(100, 30)]);
    app.run().unwrap();
    let frame = app.backend().last_frame().unwrap();
    assert_eq!((frame.width(), frame.height()), (100, 30));
}

#[test]
fn the_handler_can_stop_the_application() {
    let log: Log = Log::default();
    let mut app = app_with(vec![
        mouse(MouseEventKind::Down(MouseButton::Left), 5, 2),
        mouse(MouseEventKind::Up(MouseButton::Left), 5, 2),
        // Never reached once the handler stops the loop.
        mouse(MouseEventKind::Moved, 22, 2),
    ]);
    let clicks: Rc<RefCell<u32>> = Rc::default();
    let clicks_seen = Rc::clone(&clicks);
    let desktop = app.desktop();
    app.add(
        desktop,
        LayoutSpec::fixed(1, 1, 10, 3),
        Box::new(crate::widgets::Button::new("Ok")),
    )
    .unwrap();
    add_probe(&mut app, Probe::new("q", &log), LayoutSpec::fixed(21, 1, 10, 3));
    app.set_event_handler(Box::new(move |event| {
        assert_eq!(event.kind, ControlEventKind::ButtonClicked);
        *clicks_seen.borrow_mut() += 1;
        EventResponse::CloseApp
    }));
    app.run().unwrap();
    assert_eq!(*clicks.borrow(), 1);
    assert!(log.borrow().iter().all(|e| e != "q:enter"));
}

#[test]
fn stop_current_never_downgrades_an_application_stop() {
    let mut status = LoopStatus::StopApp;
    status.stop_current();
    assert_eq!(status, LoopStatus::StopApp);
    let mut status = LoopStatus::Normal;
    status.stop_current();
    assert_eq!(status, LoopStatus::StopCurrent);
}

#[test]
fn repaint_bits_are_independent() {
    let mut status = RepaintStatus::clean();
    assert!(!status.needs_draw() && !status.needs_layout());
    status.mark_draw();
    assert!(status.needs_draw() && !status.needs_layout());
    status.mark_all();
    assert!(status.needs_layout());
    status.clear_draw();
    assert!(!status.needs_draw() && status.needs_layout());
}
