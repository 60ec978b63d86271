use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use indoc::indoc;

use term_menus::app::MenuApp;
use term_menus::config::Config;
use term_menus::constants::SELECT_PILL_REMOVE_CLASS;
use term_menus::document::ElementId;
use term_menus::event_loop::ControlFlow;
use term_menus::layout::Viewport;
use term_menus::select::SelectKind;

fn app() -> MenuApp {
    MenuApp::new(Viewport::new(80, 24), &Config::default()).expect("app")
}

fn press_key(app: &mut MenuApp, code: KeyCode) -> ControlFlow {
    app.handle_event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

fn click_element(app: &mut MenuApp, el: ElementId) {
    let rect = app.document().client_rect(el).expect("rect");
    let (column, row) = (rect.x as u16, rect.y as u16);
    for kind in [
        MouseEventKind::Down(MouseButton::Left),
        MouseEventKind::Up(MouseButton::Left),
    ] {
        app.handle_event(&Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }));
    }
}

fn click_label(app: &mut MenuApp, label: &str) {
    let doc = app.document();
    let el = doc
        .descendants(doc.root())
        .into_iter()
        .find(|el| doc.label(*el) == label && doc.is_visible(*el))
        .unwrap_or_else(|| panic!("no visible `{label}`"));
    click_element(app, el);
}

#[test]
fn dropdown_select_picks_with_the_mouse() {
    let mut app = app();
    let input = app.selects()[0].input();
    click_element(&mut app, input);
    assert!(app.dropdowns().is_open(input));
    assert_eq!(app.focused_select().map(|s| s.id()), Some("fruit"));

    // disabled options do nothing
    click_label(&mut app, "Plum");
    assert!(app.dropdowns().is_open(input));
    assert!(app.selects()[0].selected_values().is_empty());

    click_label(&mut app, "Pear");
    assert!(!app.dropdowns().is_open(input));
    let fruit = &app.selects()[0];
    assert_eq!(fruit.selected_values(), vec!["pear"]);
    assert_eq!(fruit.hidden().selected_values(), vec!["pear"]);
    assert_eq!(app.document().label(input), "Pear");
    assert_eq!(app.status_line(), "fruit=pear  tags=");
}

#[test]
fn clicking_the_input_again_closes_the_menu() {
    let mut app = app();
    let input = app.selects()[0].input();
    click_element(&mut app, input);
    click_element(&mut app, input);
    assert!(app.dropdowns().is_empty());
}

#[test]
fn flat_multi_select_adds_pills_and_removes_them() {
    let mut app = app();
    assert_eq!(app.selects()[1].kind(), SelectKind::Flat);
    click_label(&mut app, "Rust");
    click_label(&mut app, "Menus");
    assert_eq!(app.selects()[1].selected_values(), vec!["rust", "menus"]);
    assert_eq!(app.status_line(), "fruit=  tags=rust,menus");

    let doc = app.document();
    let remove_rust = doc
        .query_class(app.selects()[1].input(), SELECT_PILL_REMOVE_CLASS)
        .into_iter()
        .find(|el| doc.attr(*el, "value") == Some("rust"))
        .expect("pill remove button");
    click_element(&mut app, remove_rust);

    let tags = &app.selects()[1];
    assert_eq!(tags.selected_values(), vec!["menus"]);
    assert_eq!(tags.hidden().selected_values(), vec!["menus"]);
}

#[test]
fn typing_filters_the_focused_select() {
    let mut app = app();
    press_key(&mut app, KeyCode::Tab);
    press_key(&mut app, KeyCode::Tab);
    assert_eq!(app.focused_select().map(|s| s.id()), Some("tags"));

    // `q` goes into the filter instead of quitting
    assert_eq!(press_key(&mut app, KeyCode::Char('q')), ControlFlow::Continue);
    assert_eq!(app.selects()[1].filter(), "q");
    press_key(&mut app, KeyCode::Backspace);

    press_key(&mut app, KeyCode::Char('m'));
    press_key(&mut app, KeyCode::Char('e'));
    let groups = app.selects()[1].groups();
    let visible: Vec<usize> = groups.into_iter().flat_map(|g| g.options).collect();
    assert_eq!(visible, vec![2]);

    press_key(&mut app, KeyCode::Down);
    press_key(&mut app, KeyCode::Down);
    assert_eq!(app.selects()[1].highlighted_value(), Some("menus"));
    press_key(&mut app, KeyCode::Enter);
    assert_eq!(app.selects()[1].selected_values(), vec!["menus"]);
}

#[test]
fn selects_come_from_config() {
    let config = Config::from_toml_str(indoc! {r#"
        [[select]]
        id = "size"
        kind = "flat"
        options = [
            { value = "s", label = "Small" },
            { value = "l", label = "Large" },
        ]
    "#})
    .expect("config");
    let mut app = MenuApp::new(Viewport::new(80, 24), &config).expect("app");
    assert_eq!(app.selects().len(), 1);
    assert_eq!(app.selects()[0].id(), "size");

    click_label(&mut app, "Large");
    assert_eq!(app.status_line(), "size=l");
}
