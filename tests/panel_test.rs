use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use serde_json::json;
use std::sync::mpsc;
use std::sync::Arc;

use chartui::cache_pane::CachePaneState;
use chartui::dashboard::DashboardAddState;
use chartui::notify::NotifyLevel;
use chartui::panel::{ActivePane, ChartPanel, Framework, ViewMode};
use chartui::providers::{DashboardStubMode, StubDashboard};
use chartui::sql::SqlPaneState;
use chartui::{App, AppEvent, CacheManager};

mod common;

use common::{drain, write_query_file, CountingClipboard};

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

#[test]
fn test_full_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let query_path = write_query_file(dir.path(), r#"{"measures": ["Orders.count"]}"#);

    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx);

    // 1. Open the query file
    drain(&mut app, AppEvent::Open(query_path));
    assert_eq!(app.props.query, json!({"measures": ["Orders.count"]}));

    // 2. Before readiness there is no generated code
    assert!(!app.panel.is_ready());
    assert!(app.panel.bundle().is_none());

    // 3. Readiness fires once, code and dependencies derive
    drain(&mut app, AppEvent::RendererReady);
    assert!(app.panel.is_ready());
    let bundle = app.panel.bundle().expect("bundle after readiness");
    assert!(bundle.code.text().contains("Orders.count"));
    assert!(!bundle.dependencies.is_empty());

    // 4. Walk the tabs
    drain(&mut app, key('2'));
    assert_eq!(app.panel.view_mode, ViewMode::Query);
    drain(&mut app, key('3'));
    assert_eq!(app.panel.view_mode, ViewMode::Code);
    drain(&mut app, key('4'));
    assert!(matches!(app.panel.sql, SqlPaneState::Loaded(_)));
    drain(&mut app, key('5'));
    assert!(matches!(app.panel.cache, CachePaneState::Loaded(_)));
    drain(&mut app, key('1'));
    assert_eq!(app.panel.view_mode, ViewMode::Chart);
}

#[test]
fn test_query_pane_text_is_byte_exact() {
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx);
    app.set_query(json!({"measures": ["Orders.count"]}));

    assert_eq!(
        ChartPanel::query_text(&app.props),
        "{\n  \"measures\": [\n    \"Orders.count\"\n  ]\n}"
    );
}

#[test]
fn test_unsupported_framework_overrides_tabs() {
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx);
    app.set_query(json!({"measures": ["Orders.count"]}));

    // react -> angular
    drain(&mut app, key('f'));
    assert_eq!(app.panel.framework, Framework::Angular);
    assert!(!app.panel.framework.supported());
    assert_eq!(
        app.panel.framework.docs_link(),
        Some("https://cube.dev/docs/@cubejs-client-ngx")
    );

    for tab in ['1', '2', '3', '4', '5'] {
        drain(&mut app, key(tab));
        assert_eq!(
            app.panel.active_pane(),
            ActivePane::Unsupported(Framework::Angular)
        );
    }
}

#[test]
fn test_copy_query_to_clipboard() {
    let (clipboard, writes, last_text) = CountingClipboard::new(true);
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx).with_clipboard(Box::new(clipboard));
    app.set_query(json!({"measures": ["Orders.count"]}));

    drain(&mut app, key('2')); // query pane
    drain(&mut app, key('y'));

    assert_eq!(writes.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(
        last_text.lock().unwrap().as_deref(),
        Some("{\n  \"measures\": [\n    \"Orders.count\"\n  ]\n}")
    );
    let note = app.notification.as_ref().expect("notification");
    assert_eq!(note.level, NotifyLevel::Success);
}

#[test]
fn test_copy_without_clipboard_makes_no_write() {
    let (clipboard, writes, _) = CountingClipboard::new(false);
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx).with_clipboard(Box::new(clipboard));
    app.set_query(json!({"measures": ["Orders.count"]}));

    drain(&mut app, key('2'));
    drain(&mut app, key('y'));

    assert_eq!(writes.load(std::sync::atomic::Ordering::SeqCst), 0);
    let note = app.notification.as_ref().expect("notification");
    assert_eq!(note.level, NotifyLevel::Error);
}

#[test]
fn test_sandbox_export_writes_form() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx).with_cache_manager(CacheManager::with_dir(dir.path().to_path_buf()));
    app.set_query(json!({"measures": ["Orders.count"]}));

    // Export is disabled before readiness
    drain(&mut app, key('e'));
    assert!(!dir.path().join("sandbox").exists());
    assert_eq!(
        app.notification.as_ref().map(|n| n.level),
        Some(NotifyLevel::Error)
    );

    drain(&mut app, AppEvent::RendererReady);
    drain(&mut app, key('e'));

    let form_path = dir.path().join("sandbox").join("bizcharts.json");
    assert!(form_path.exists());
    let form: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(form_path).unwrap()).unwrap();
    assert_eq!(
        form["action"],
        "https://codesandbox.io/api/v1/sandboxes/define"
    );
    assert_eq!(form["method"], "POST");
    assert_eq!(form["field"], "parameters");

    let parameters: serde_json::Value =
        serde_json::from_str(form["parameters"].as_str().unwrap()).unwrap();
    assert_eq!(parameters["template"], "create-react-app");
    assert!(parameters["files"]["index.js"]["content"]
        .as_str()
        .unwrap()
        .contains("Orders.count"));
    let deps = parameters["files"]["package.json"]["content"]["dependencies"]
        .as_object()
        .unwrap();
    assert_eq!(deps["react-dom"], "latest");
    assert_eq!(deps["bizcharts"], "latest");
}

#[test]
fn test_dashboard_workflow_over_keys() {
    let dashboard = Arc::new(StubDashboard::new(DashboardStubMode::Supported));
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx).with_dashboard_source(dashboard.clone());
    app.set_query(json!({"measures": ["Orders.count"]}));
    drain(&mut app, AppEvent::RendererReady);

    assert_eq!(app.panel.dashboard, DashboardAddState::Idle);
    drain(&mut app, key('d'));

    assert_eq!(dashboard.charts_added(), 1);
    assert_eq!(app.panel.dashboard, DashboardAddState::Redirecting);
    assert_eq!(app.route, "/dashboard");
}

fn buffer_text(buf: &Buffer) -> String {
    let mut text = String::new();
    for y in buf.area.top()..buf.area.bottom() {
        for x in buf.area.left()..buf.area.right() {
            if let Some(cell) = buf.cell((x, y)) {
                text.push_str(cell.symbol());
            }
        }
        text.push('\n');
    }
    text
}

#[test]
fn test_render_panes() {
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx);
    app.set_query(json!({"measures": ["Orders.count"]}));
    drain(&mut app, AppEvent::RendererReady);

    let area = Rect::new(0, 0, 100, 30);

    // Chart pane (demo renderer)
    let mut buf = Buffer::empty(area);
    app.render(area, &mut buf);

    // Query pane shows the serialized query
    drain(&mut app, key('2'));
    let mut buf = Buffer::empty(area);
    app.render(area, &mut buf);
    assert!(buffer_text(&buf).contains("Orders.count"));

    // Unsupported framework pane names the docs link
    drain(&mut app, key('f')); // react -> angular
    let mut buf = Buffer::empty(area);
    app.render(area, &mut buf);
    let text = buffer_text(&buf);
    assert!(text.contains("We do not support Angular code generation"));
    assert!(text.contains("cube.dev"));
}

#[test]
fn test_render_hide_actions_uses_raw_callback() {
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx).with_hide_actions(true);
    app.set_query(json!({"measures": ["Orders.count"]}));
    app.set_result_set(json!({"data": [{"Orders.count": 5}, {"Orders.count": 9}]}));
    drain(&mut app, AppEvent::RendererReady);

    let area = Rect::new(0, 0, 80, 24);
    let mut buf = Buffer::empty(area);
    app.render(area, &mut buf);
    // No tab bar when actions are hidden
    assert!(!buffer_text(&buf).contains("JSON Query"));
}

#[test]
fn test_library_selection_stays_with_host() {
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx);
    app.set_query(json!({"measures": ["Orders.count"]}));
    drain(&mut app, AppEvent::RendererReady);

    // The key produces an event; only the host's handler mutates props
    let event = app.event(&key('l'));
    assert!(matches!(event, Some(AppEvent::SetChartLibrary(_))));
    assert_eq!(app.props.charting_library, "bizcharts");

    if let Some(event) = event {
        drain(&mut app, event);
    }
    assert_eq!(app.props.charting_library, "chartjs");
    assert!(app
        .panel
        .bundle()
        .unwrap()
        .dependencies
        .contains(&"react-chartjs-2".to_string()));
}
