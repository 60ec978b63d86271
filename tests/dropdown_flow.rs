use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use term_menus::app::MenuApp;
use term_menus::config::Config;
use term_menus::constants::{OPEN_CLASS, PANEL_CLASS};
use term_menus::document::ElementId;
use term_menus::event_loop::ControlFlow;
use term_menus::layout::{FloatRect, Viewport};
use term_menus::ui::UiFrame;

fn app() -> MenuApp {
    MenuApp::new(Viewport::new(80, 24), &Config::default()).expect("app")
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

fn click_at(app: &mut MenuApp, column: u16, row: u16) -> ControlFlow {
    app.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), column, row));
    app.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), column, row))
}

fn visible_label(app: &MenuApp, label: &str) -> ElementId {
    let doc = app.document();
    doc.descendants(doc.root())
        .into_iter()
        .find(|el| doc.label(*el) == label && doc.is_visible(*el))
        .unwrap_or_else(|| panic!("no visible `{label}`"))
}

fn click_label(app: &mut MenuApp, label: &str) -> ControlFlow {
    let el = visible_label(app, label);
    let rect = app.document().client_rect(el).expect("rect");
    click_at(app, rect.x as u16, rect.y as u16)
}

#[test]
fn menu_bar_click_opens_panel_under_trigger() {
    let mut app = app();
    let file = app.menu_bar()[0];
    click_at(&mut app, 5, 3);

    assert_eq!(app.dropdowns().open_triggers(), &[file]);
    let panel = app.dropdowns().panel_for(file).expect("open");
    let doc = app.document();
    assert!(doc.has_class(panel, PANEL_CLASS));
    assert!(doc.has_class(file, OPEN_CLASS));
    assert_eq!(doc.bounds(panel), Some(FloatRect::new(4, 4, 10, 6)));

    // a second click on the trigger closes it again
    click_at(&mut app, 5, 3);
    assert!(app.dropdowns().is_empty());
    assert!(!app.document().has_class(file, OPEN_CLASS));
}

#[test]
fn nested_menu_action_closes_everything() {
    let mut app = app();
    click_at(&mut app, 5, 3);
    click_label(&mut app, "Recent");
    assert_eq!(app.dropdowns().len(), 2);

    let file = app.menu_bar()[0];
    let parent = app.dropdowns().panel_for(file).expect("parent");
    let recent = app.dropdowns().open_triggers()[1];
    let child = app.dropdowns().panel_for(recent).expect("child");
    let doc = app.document();
    let parent_rect = doc.bounds(parent).expect("parent bounds");
    let child_rect = doc.bounds(child).expect("child bounds");
    assert!(child_rect.x >= parent_rect.right() - 1);

    assert_eq!(click_label(&mut app, "notes.txt"), ControlFlow::Continue);
    assert_eq!(app.last_action(), Some("open:notes.txt"));
    assert!(app.dropdowns().is_empty());
    assert!(app.status_line().ends_with("last: open:notes.txt"));
}

#[test]
fn switching_menus_closes_the_previous_one() {
    let mut app = app();
    let [file, edit, _] = [app.menu_bar()[0], app.menu_bar()[1], app.menu_bar()[2]];
    click_at(&mut app, 5, 3);
    click_at(&mut app, 12, 3);
    assert_eq!(app.dropdowns().open_triggers(), &[edit]);
    assert!(!app.document().has_class(file, OPEN_CLASS));
}

#[test]
fn outside_click_and_escape_close_panels() {
    let mut app = app();
    click_at(&mut app, 5, 3);
    click_label(&mut app, "Recent");
    click_at(&mut app, 60, 20);
    assert!(app.dropdowns().is_empty());

    click_at(&mut app, 5, 3);
    app.handle_event(&Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
    assert!(app.dropdowns().is_empty());
}

#[test]
fn quit_item_stops_the_loop() {
    let mut app = app();
    click_at(&mut app, 5, 3);
    assert_eq!(click_label(&mut app, "Quit"), ControlFlow::Quit);
    assert_eq!(app.last_action(), Some("quit"));
}

#[test]
fn wheel_scroll_repositions_open_panel() {
    let mut app = app();
    click_at(&mut app, 5, 3);
    let file = app.menu_bar()[0];
    let panel = app.dropdowns().panel_for(file).expect("open");
    assert_eq!(app.document().bounds(panel).map(|b| b.y), Some(4));

    app.handle_event(&mouse(MouseEventKind::ScrollDown, 40, 12));
    assert_eq!(app.document().viewport().scroll_y, 1);
    assert_eq!(app.document().bounds(panel).map(|b| b.y), Some(5));
    assert!(app.dropdowns().is_open(file));
}

#[test]
fn open_panel_paints_above_page() {
    let mut app = app();
    click_at(&mut app, 5, 3);
    let area = Rect::new(0, 0, 80, 24);
    let mut buffer = Buffer::empty(area);
    let mut frame = UiFrame::from_parts(area, &mut buffer);
    app.draw(&mut frame);

    assert_eq!(buffer[(4, 4)].symbol(), "┌");
    let row: String = (5..8).map(|x| buffer[(x, 5)].symbol()).collect();
    assert_eq!(row, "New");
}
