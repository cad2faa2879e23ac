use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::{Paragraph, Widget};
use ratatui::{buffer::Buffer, layout::Rect};

pub mod actions;
pub mod cache;
pub mod cache_pane;
pub mod clip;
pub mod codegen;
pub mod config;
pub mod dashboard;
pub mod notify;
pub mod panel;
pub mod providers;
pub mod sandbox;
pub mod sql;
pub mod widgets;

pub use cache::CacheManager;
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};

use actions::{playground_action, playground_action_detail};
use cache_pane::{CachePaneState, CacheReport, CacheSource};
use clip::{copy_to_clipboard, ClipboardAccess, SystemClipboard};
use codegen::{CodeGenerator, ReadySignal};
use dashboard::{AddChartSupport, DashboardAddState, DashboardSource};
use notify::{ErrorModal, Notification};
use panel::{ActivePane, ChartPanel, PanelProps, RenderFn, RenderRequest, ViewMode};
use sandbox::SandboxForm;
use sql::{first_sql, format_sql, SqlPaneState, SqlSource};

/// Application name used for config/cache directories and other
/// app-specific paths
pub const APP_NAME: &str = "chartui";

pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf),
    /// The external chart renderer signaled readiness. Fired at most once
    /// per process; every panel observes the same signal.
    RendererReady,
    /// Internal event to fetch compiled SQL after the pane shows loading
    FetchSql,
    SqlLoaded(Result<Vec<String>, String>),
    /// Internal event to inspect the cache after the pane activates
    InspectCache,
    CacheInspected(Result<CacheReport, String>),
    /// Internal event to run the dashboard capability check
    DashboardCheck,
    DashboardChecked(AddChartSupport),
    DashboardAdded(Result<(), String>),
    SetChartLibrary(String),
    Navigate(String),
    Exit,
    Crash(String),
    Resize(u16, u16), // resized (width, height)
}

/// The hosted playground: panel state plus its collaborators.
pub struct App {
    pub props: PanelProps,
    pub panel: ChartPanel,
    pub result_set: Option<serde_json::Value>,
    pub error: Option<String>,
    pub route: String,
    pub notification: Option<Notification>,
    pub error_modal: ErrorModal,
    pub theme: Theme,
    ready: ReadySignal,
    code_generator: Arc<dyn CodeGenerator>,
    sql_source: Arc<dyn SqlSource>,
    cache_source: Arc<dyn CacheSource>,
    dashboard_source: Option<Arc<dyn DashboardSource>>,
    clipboard: Box<dyn ClipboardAccess>,
    render_fn: RenderFn,
    cache_manager: Option<CacheManager>,
    #[allow(dead_code)]
    tx: Sender<AppEvent>,
}

impl App {
    pub fn new(tx: Sender<AppEvent>) -> Self {
        let ready = ReadySignal::new();
        Self {
            props: PanelProps {
                query: serde_json::Value::Object(Default::default()),
                chart_type: "line".to_string(),
                pivot_config: None,
                charting_library: "bizcharts".to_string(),
                chart_libraries: providers::default_chart_libraries(),
                hide_actions: false,
            },
            panel: ChartPanel::new(ready.clone()),
            result_set: None,
            error: None,
            route: "/".to_string(),
            notification: None,
            error_modal: ErrorModal::new(),
            theme: Theme::default(),
            ready,
            code_generator: Arc::new(providers::StaticCodeGenerator),
            sql_source: Arc::new(providers::QueryCompiler),
            cache_source: Arc::new(providers::LocalCacheSource),
            dashboard_source: None,
            clipboard: Box::new(SystemClipboard),
            render_fn: providers::demo_render(),
            cache_manager: None,
            tx,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_code_generator(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.code_generator = generator;
        self
    }

    pub fn with_sql_source(mut self, source: Arc<dyn SqlSource>) -> Self {
        self.sql_source = source;
        self
    }

    pub fn with_cache_source(mut self, source: Arc<dyn CacheSource>) -> Self {
        self.cache_source = source;
        self
    }

    pub fn with_dashboard_source(mut self, source: Arc<dyn DashboardSource>) -> Self {
        self.dashboard_source = Some(source);
        self
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardAccess>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_render(mut self, render: RenderFn) -> Self {
        self.render_fn = render;
        self
    }

    pub fn with_cache_manager(mut self, cache_manager: CacheManager) -> Self {
        self.cache_manager = Some(cache_manager);
        self
    }

    pub fn with_charting_library(mut self, library: impl Into<String>) -> Self {
        self.props.charting_library = library.into();
        self
    }

    pub fn with_framework(mut self, framework: panel::Framework) -> Self {
        self.panel.framework = framework;
        self
    }

    pub fn with_chart_type(mut self, chart_type: impl Into<String>) -> Self {
        self.props.chart_type = chart_type.into();
        self
    }

    pub fn with_pivot_config(mut self, pivot_config: serde_json::Value) -> Self {
        self.props.pivot_config = Some(pivot_config);
        self.derive();
        self
    }

    pub fn with_hide_actions(mut self, hide_actions: bool) -> Self {
        self.props.hide_actions = hide_actions;
        self
    }

    pub fn set_query(&mut self, query: serde_json::Value) {
        self.props.query = query;
        self.panel.sql = SqlPaneState::Idle;
        self.panel.cache = CachePaneState::Idle;
        self.derive();
    }

    pub fn set_result_set(&mut self, result_set: serde_json::Value) {
        self.result_set = Some(result_set);
    }

    fn derive(&mut self) {
        self.panel
            .derive_bundle(self.code_generator.as_ref(), &self.props);
    }

    /// Process one event; may return a follow-up event to enqueue.
    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path) => match std::fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(query) => {
                        self.set_query(query);
                        None
                    }
                    Err(e) => Some(AppEvent::Crash(format!(
                        "Invalid query JSON in {}: {}",
                        path.display(),
                        e
                    ))),
                },
                Err(e) => Some(AppEvent::Crash(format!(
                    "Could not read {}: {}",
                    path.display(),
                    e
                ))),
            },
            AppEvent::RendererReady => {
                self.ready.fire();
                self.derive();
                None
            }
            AppEvent::FetchSql => {
                let result = self
                    .sql_source
                    .sql(&self.props.query)
                    .map_err(|e| e.to_string());
                Some(AppEvent::SqlLoaded(result))
            }
            AppEvent::SqlLoaded(result) => {
                self.panel.sql = match result {
                    Ok(statements) => match first_sql(statements.clone()) {
                        Some(sql) => SqlPaneState::Loaded(format_sql(&sql)),
                        None => SqlPaneState::Failed("The backend returned no SQL".to_string()),
                    },
                    Err(e) => SqlPaneState::Failed(e.clone()),
                };
                None
            }
            AppEvent::InspectCache => {
                let result = self
                    .cache_source
                    .inspect(&self.props.query)
                    .map_err(|e| e.to_string());
                Some(AppEvent::CacheInspected(result))
            }
            AppEvent::CacheInspected(result) => {
                self.panel.cache = match result {
                    Ok(report) => CachePaneState::Loaded(report.clone()),
                    Err(e) => CachePaneState::Failed(e.clone()),
                };
                None
            }
            AppEvent::DashboardCheck => {
                let source = self.dashboard_source.as_ref()?;
                let support = match source.can_add_chart() {
                    Ok(support) => support,
                    Err(e) => AddChartSupport::Error(e.to_string()),
                };
                Some(AppEvent::DashboardChecked(support))
            }
            AppEvent::DashboardChecked(support) => self.dashboard_checked(support),
            AppEvent::DashboardAdded(result) => {
                match result {
                    Ok(()) => {
                        self.panel.dashboard = DashboardAddState::Redirecting;
                        return Some(AppEvent::Navigate("/dashboard".to_string()));
                    }
                    Err(e) => {
                        self.panel.dashboard = DashboardAddState::Idle;
                        self.error_modal.open(
                            "Failed to add the chart to your dashboard",
                            e.as_str(),
                            "OK",
                            None,
                        );
                    }
                }
                None
            }
            AppEvent::SetChartLibrary(library) => {
                playground_action_detail("Set Chart Library", library);
                self.props.charting_library = library.clone();
                self.derive();
                None
            }
            AppEvent::Navigate(path) => {
                self.route = path.clone();
                None
            }
            AppEvent::Resize(_, _) => None,
            // Exit and Crash are handled by the event loop
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn dashboard_checked(&mut self, support: &AddChartSupport) -> Option<AppEvent> {
        match support {
            AddChartSupport::Supported => {
                playground_action("Add to Dashboard");
                let code = self
                    .panel
                    .bundle()
                    .map(|b| b.code.text())
                    .unwrap_or_default();
                let source = match self.dashboard_source.as_ref() {
                    Some(source) => source,
                    None => {
                        self.panel.dashboard = DashboardAddState::Idle;
                        return None;
                    }
                };
                let result = source.add_chart(&code).map_err(|e| e.to_string());
                Some(AppEvent::DashboardAdded(result))
            }
            AddChartSupport::Unsupported => {
                self.panel.dashboard = DashboardAddState::Idle;
                self.error_modal.open(
                    dashboard::UNSUPPORTED_TITLE,
                    dashboard::UNSUPPORTED_CONTENT,
                    "OK",
                    None,
                );
                None
            }
            AddChartSupport::Error(description) => {
                self.panel.dashboard = DashboardAddState::Idle;
                self.error_modal.open(
                    dashboard::LOAD_ERROR_TITLE,
                    description.as_str(),
                    dashboard::LOAD_ERROR_OK,
                    Some("/dashboard".to_string()),
                );
                None
            }
        }
    }

    fn key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        // The blocking dialog captures input while active
        if self.error_modal.active {
            return match key.code {
                KeyCode::Enter => self.error_modal.acknowledge().map(AppEvent::Navigate),
                KeyCode::Esc => {
                    self.error_modal.close();
                    None
                }
                _ => None,
            };
        }

        if self.props.hide_actions {
            return match key.code {
                KeyCode::Char('q') => Some(AppEvent::Exit),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('q') => Some(AppEvent::Exit),
            KeyCode::Char('1') => {
                playground_action("Show Chart");
                self.panel.select_mode(ViewMode::Chart);
                None
            }
            KeyCode::Char('2') => {
                playground_action("Show Query");
                self.panel.select_mode(ViewMode::Query);
                None
            }
            KeyCode::Char('3') => {
                playground_action("Show Code");
                self.panel.select_mode(ViewMode::Code);
                None
            }
            KeyCode::Char('4') => {
                playground_action("Show SQL");
                self.panel.select_mode(ViewMode::Sql);
                // Loading doubles as the in-flight guard; no duplicate fetch
                if self.panel.active_pane() == ActivePane::Sql && self.panel.sql.needs_fetch() {
                    self.panel.sql = SqlPaneState::Loading;
                    return Some(AppEvent::FetchSql);
                }
                None
            }
            KeyCode::Char('5') => {
                playground_action("Show Cache");
                self.panel.select_mode(ViewMode::Cache);
                if self.panel.active_pane() == ActivePane::Cache {
                    return Some(AppEvent::InspectCache);
                }
                None
            }
            KeyCode::Char('f') => {
                self.panel.next_framework();
                playground_action_detail("Set Framework", self.panel.framework.id());
                if !self.panel.framework.supported() {
                    if let Some(link) = self.panel.framework.docs_link() {
                        playground_action_detail("Unsupported Framework Docs", link);
                    }
                }
                None
            }
            KeyCode::Char('l') => self.props.next_library().map(AppEvent::SetChartLibrary),
            KeyCode::Char('y') => {
                self.copy_active_pane();
                None
            }
            KeyCode::Char('e') => {
                playground_action("Open Code Sandbox");
                self.export_sandbox();
                None
            }
            KeyCode::Char('d') => self.request_dashboard_add(),
            _ => None,
        }
    }

    fn copy_active_pane(&mut self) {
        let action = if self.panel.active_pane() == ActivePane::Query {
            "Copy Query to Clipboard"
        } else {
            "Copy Code to Clipboard"
        };
        playground_action(action);
        match self.panel.copy_payload(&self.props) {
            Some(text) => {
                self.notification = Some(copy_to_clipboard(self.clipboard.as_mut(), &text));
            }
            None => {
                self.notification =
                    Some(Notification::error("There is no generated code to copy yet"));
            }
        }
    }

    /// Write the prepared sandbox POST form to the cache directory. The
    /// submission itself happens outside this process.
    fn export_sandbox(&mut self) {
        // Disabled until the code bundle exists
        let bundle = match self.panel.bundle() {
            Some(bundle) => bundle,
            None => {
                self.notification =
                    Some(Notification::error("The chart renderer is not ready yet"));
                return;
            }
        };
        let form = SandboxForm::for_bundle(bundle);
        let written = self
            .cache_manager
            .as_ref()
            .ok_or_else(|| color_eyre::eyre::eyre!("No cache directory is configured"))
            .and_then(|cache| {
                let dir = cache.sandbox_dir()?;
                let path = dir.join(format!("{}.json", &self.props.charting_library));
                std::fs::write(&path, serde_json::to_vec_pretty(&form)?)?;
                Ok(path)
            });
        self.notification = Some(match written {
            Ok(path) => {
                Notification::success(format!("Sandbox form written to {}", path.display()))
            }
            Err(e) => Notification::error_with("Could not write sandbox form", e.to_string()),
        });
    }

    fn request_dashboard_add(&mut self) -> Option<AppEvent> {
        // Disabled without a dashboard collaborator, and guarded against
        // re-entrant clicks while a check is in flight
        if self.dashboard_source.is_none() || self.panel.dashboard.in_progress() {
            return None;
        }
        self.panel.dashboard = DashboardAddState::InProgress;
        Some(AppEvent::DashboardCheck)
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(1)])
            .split(area);

        if self.route == "/dashboard" {
            Paragraph::new("Dashboard\n\nThe chart was sent to your dashboard app.")
                .style(Style::default().fg(self.theme.get("text_primary")))
                .centered()
                .render(layout[0], buf);
        } else if self.props.hide_actions {
            (self.render_fn)(
                RenderRequest::Raw {
                    result_set: self.result_set.as_ref(),
                    error: self.error.as_deref(),
                },
                layout[0],
                buf,
            );
        } else {
            widgets::panel::render_chart_panel(
                layout[0],
                buf,
                &self.panel,
                &self.props,
                &self.theme,
                self.error.as_deref(),
                self.dashboard_source.is_some(),
                &self.render_fn,
            );
        }

        widgets::modal::render_error_modal(layout[0], buf, &self.error_modal, &self.theme);

        widgets::status::StatusLine {
            notification: self.notification.as_ref(),
            theme: &self.theme,
        }
        .render(layout[1], buf);
    }
}
