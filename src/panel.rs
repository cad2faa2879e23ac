//! Chart panel state: view mode, framework selection, and derived code.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use serde_json::Value;

use crate::cache_pane::CachePaneState;
use crate::codegen::{CodeBundle, CodeGenerator, CodegenParams, ReadySignal};
use crate::dashboard::DashboardAddState;
use crate::sql::SqlPaneState;

/// What the caller-supplied render callback is asked to draw.
pub enum RenderRequest<'a> {
    /// The chart pane of the full panel.
    Chart {
        framework: Framework,
        error: Option<&'a str>,
    },
    /// The bare chart when actions are hidden: no tabs, no chrome.
    Raw {
        result_set: Option<&'a Value>,
        error: Option<&'a str>,
    },
}

/// Caller-supplied chart renderer.
pub type RenderFn = Box<dyn Fn(RenderRequest<'_>, Rect, &mut Buffer)>;

/// Pane selected by the tab row. Default is the chart preview.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Chart,
    Query,
    Code,
    Sql,
    Cache,
}

impl ViewMode {
    pub const ALL: [Self; 5] = [Self::Chart, Self::Query, Self::Code, Self::Sql, Self::Cache];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chart => "Chart",
            Self::Query => "JSON Query",
            Self::Code => "Code",
            Self::Sql => "SQL",
            Self::Cache => "Cache",
        }
    }
}

/// Client framework the generated code targets. Only React code
/// generation is supported; the rest link out to their docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framework {
    Vanilla,
    React,
    Angular,
    Vue,
}

impl Default for Framework {
    fn default() -> Self {
        Self::React
    }
}

impl Framework {
    pub const ALL: [Self; 4] = [Self::Vanilla, Self::React, Self::Angular, Self::Vue];

    pub fn id(self) -> &'static str {
        match self {
            Self::Vanilla => "vanilla",
            Self::React => "react",
            Self::Angular => "angular",
            Self::Vue => "vue",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Vanilla => "Vanilla JavaScript",
            Self::React => "React",
            Self::Angular => "Angular",
            Self::Vue => "Vue.js",
        }
    }

    pub fn docs_link(self) -> Option<&'static str> {
        match self {
            Self::Vanilla => Some("https://cube.dev/docs/@cubejs-client-core"),
            Self::React => None,
            Self::Angular => Some("https://cube.dev/docs/@cubejs-client-ngx"),
            Self::Vue => Some("https://cube.dev/docs/@cubejs-client-vue"),
        }
    }

    pub fn supported(self) -> bool {
        matches!(self, Self::React)
    }

    pub fn scaffolding_supported(self) -> bool {
        matches!(self, Self::React | Self::Angular)
    }

    pub fn next(self) -> Self {
        match self {
            Self::Vanilla => Self::React,
            Self::React => Self::Angular,
            Self::Angular => Self::Vue,
            Self::Vue => Self::Vanilla,
        }
    }
}

/// One entry of the parent-supplied charting library list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLibrary {
    pub value: String,
    pub title: String,
}

impl ChartLibrary {
    pub fn new(value: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            title: title.into(),
        }
    }
}

/// Inputs owned by the host. The panel reads these; it never mutates the
/// charting library selection directly (it emits a set-library event).
#[derive(Debug, Clone, Default)]
pub struct PanelProps {
    pub query: Value,
    pub chart_type: String,
    pub pivot_config: Option<Value>,
    pub charting_library: String,
    pub chart_libraries: Vec<ChartLibrary>,
    pub hide_actions: bool,
}

impl PanelProps {
    /// Display title of the currently selected charting library.
    pub fn library_title(&self) -> Option<&str> {
        self.chart_libraries
            .iter()
            .find(|l| l.value == self.charting_library)
            .map(|l| l.title.as_str())
    }

    /// Next library id after the current selection, wrapping around.
    pub fn next_library(&self) -> Option<String> {
        if self.chart_libraries.is_empty() {
            return None;
        }
        let idx = self
            .chart_libraries
            .iter()
            .position(|l| l.value == self.charting_library)
            .map(|i| (i + 1) % self.chart_libraries.len())
            .unwrap_or(0);
        Some(self.chart_libraries[idx].value.clone())
    }
}

/// Pane resolved from view mode and framework support. Checked in order;
/// an unsupported framework wins over whatever tab is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Unsupported(Framework),
    Code,
    Query,
    Sql,
    Cache,
    Chart,
}

/// View state for one chart panel instance.
pub struct ChartPanel {
    pub view_mode: ViewMode,
    pub framework: Framework,
    pub dashboard: DashboardAddState,
    pub sql: SqlPaneState,
    pub cache: CachePaneState,
    ready: ReadySignal,
    bundle: Option<CodeBundle>,
    memo_key: Option<String>,
}

impl ChartPanel {
    pub fn new(ready: ReadySignal) -> Self {
        Self {
            view_mode: ViewMode::default(),
            framework: Framework::default(),
            dashboard: DashboardAddState::default(),
            sql: SqlPaneState::default(),
            cache: CachePaneState::default(),
            ready,
            bundle: None,
            memo_key: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    /// Derived code bundle, if the readiness signal has fired.
    pub fn bundle(&self) -> Option<&CodeBundle> {
        self.bundle.as_ref()
    }

    pub fn select_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn next_framework(&mut self) {
        self.framework = self.framework.next();
    }

    /// Recompute the code bundle from the provider. A memoized selector:
    /// nothing is computed before readiness, and an unchanged
    /// (library, query, chart type, pivot config) key is a no-op.
    pub fn derive_bundle(&mut self, provider: &dyn CodeGenerator, props: &PanelProps) {
        if !self.ready.is_ready() {
            self.bundle = None;
            self.memo_key = None;
            return;
        }
        let key = format!(
            "{}\u{1f}{}\u{1f}{}\u{1f}{}",
            props.charting_library,
            props.query,
            props.chart_type,
            props
                .pivot_config
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_default(),
        );
        if self.memo_key.as_deref() == Some(key.as_str()) {
            return;
        }
        let params = CodegenParams {
            query: props.query.clone(),
            chart_type: props.chart_type.clone(),
            pivot_config: props.pivot_config.clone(),
        };
        self.bundle = Some(CodeBundle {
            code: provider.codegen(&props.charting_library, &params),
            dependencies: provider.dependencies(&props.charting_library),
        });
        self.memo_key = Some(key);
    }

    /// The query serialized with 2-space indentation, as shown in the
    /// JSON Query pane and copied to the clipboard.
    pub fn query_text(props: &PanelProps) -> String {
        serde_json::to_string_pretty(&props.query).unwrap_or_default()
    }

    /// Resolve which pane to show. First match wins: an unsupported
    /// framework substitutes the informational pane for every view mode.
    pub fn active_pane(&self) -> ActivePane {
        if !self.framework.supported() {
            return ActivePane::Unsupported(self.framework);
        }
        match self.view_mode {
            ViewMode::Code => ActivePane::Code,
            ViewMode::Query => ActivePane::Query,
            ViewMode::Sql => ActivePane::Sql,
            ViewMode::Cache => ActivePane::Cache,
            ViewMode::Chart => ActivePane::Chart,
        }
    }

    /// Text the copy action would place on the clipboard: the query JSON
    /// when the query pane is active, the generated code otherwise. None
    /// when code is requested before readiness.
    pub fn copy_payload(&self, props: &PanelProps) -> Option<String> {
        match self.active_pane() {
            ActivePane::Query => Some(Self::query_text(props)),
            _ => self.bundle.as_ref().map(|b| b.code.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::CodeExample;
    use serde_json::json;
    use std::cell::Cell;

    struct CountingGenerator {
        calls: Cell<usize>,
    }

    impl CountingGenerator {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl CodeGenerator for CountingGenerator {
        fn dependencies(&self, library: &str) -> Vec<String> {
            vec![library.to_string()]
        }

        fn codegen(&self, library: &str, params: &CodegenParams) -> CodeExample {
            self.calls.set(self.calls.get() + 1);
            CodeExample::Source(format!("render({}, {})", library, params.chart_type))
        }
    }

    fn props() -> PanelProps {
        PanelProps {
            query: json!({"measures": ["Orders.count"]}),
            chart_type: "line".to_string(),
            pivot_config: None,
            charting_library: "bizcharts".to_string(),
            chart_libraries: vec![
                ChartLibrary::new("bizcharts", "Bizcharts"),
                ChartLibrary::new("chartjs", "Chart.js"),
            ],
            hide_actions: false,
        }
    }

    #[test]
    fn no_bundle_before_readiness() {
        let generator = CountingGenerator::new();
        let mut panel = ChartPanel::new(ReadySignal::new());
        panel.derive_bundle(&generator, &props());
        assert!(panel.bundle().is_none());
        assert_eq!(generator.calls.get(), 0);
    }

    #[test]
    fn bundle_derived_after_readiness() {
        let generator = CountingGenerator::new();
        let ready = ReadySignal::new();
        let mut panel = ChartPanel::new(ready.clone());
        ready.fire();
        panel.derive_bundle(&generator, &props());
        let bundle = panel.bundle().unwrap();
        assert_eq!(bundle.dependencies, vec!["bizcharts"]);
        assert_eq!(generator.calls.get(), 1);
    }

    #[test]
    fn derivation_is_memoized_until_inputs_change() {
        let generator = CountingGenerator::new();
        let ready = ReadySignal::new();
        let mut panel = ChartPanel::new(ready.clone());
        ready.fire();
        let mut p = props();
        panel.derive_bundle(&generator, &p);
        panel.derive_bundle(&generator, &p);
        assert_eq!(generator.calls.get(), 1);

        p.chart_type = "bar".to_string();
        panel.derive_bundle(&generator, &p);
        assert_eq!(generator.calls.get(), 2);

        p.query = json!({"measures": ["Orders.total"]});
        panel.derive_bundle(&generator, &p);
        assert_eq!(generator.calls.get(), 3);

        p.pivot_config = Some(json!({"x": ["Orders.status"]}));
        panel.derive_bundle(&generator, &p);
        assert_eq!(generator.calls.get(), 4);

        p.charting_library = "chartjs".to_string();
        panel.derive_bundle(&generator, &p);
        assert_eq!(generator.calls.get(), 5);
    }

    #[test]
    fn unsupported_framework_overrides_every_view_mode() {
        let mut panel = ChartPanel::new(ReadySignal::new());
        panel.framework = Framework::Angular;
        for mode in ViewMode::ALL {
            panel.select_mode(mode);
            assert_eq!(panel.active_pane(), ActivePane::Unsupported(Framework::Angular));
        }
    }

    #[test]
    fn supported_framework_dispatches_on_view_mode() {
        let mut panel = ChartPanel::new(ReadySignal::new());
        assert_eq!(panel.active_pane(), ActivePane::Chart);
        panel.select_mode(ViewMode::Query);
        assert_eq!(panel.active_pane(), ActivePane::Query);
        panel.select_mode(ViewMode::Code);
        assert_eq!(panel.active_pane(), ActivePane::Code);
        panel.select_mode(ViewMode::Sql);
        assert_eq!(panel.active_pane(), ActivePane::Sql);
        panel.select_mode(ViewMode::Cache);
        assert_eq!(panel.active_pane(), ActivePane::Cache);
    }

    #[test]
    fn query_text_uses_two_space_indent() {
        let p = props();
        assert_eq!(
            ChartPanel::query_text(&p),
            "{\n  \"measures\": [\n    \"Orders.count\"\n  ]\n}"
        );
    }

    #[test]
    fn copy_payload_targets_active_pane() {
        let generator = CountingGenerator::new();
        let ready = ReadySignal::new();
        let mut panel = ChartPanel::new(ready.clone());
        let p = props();

        panel.select_mode(ViewMode::Query);
        assert_eq!(panel.copy_payload(&p), Some(ChartPanel::query_text(&p)));

        // Code pane before readiness: nothing to copy.
        panel.select_mode(ViewMode::Code);
        assert_eq!(panel.copy_payload(&p), None);

        ready.fire();
        panel.derive_bundle(&generator, &p);
        assert_eq!(panel.copy_payload(&p), Some("render(bizcharts, line)".to_string()));
    }

    #[test]
    fn framework_attributes() {
        assert!(Framework::React.supported());
        assert!(Framework::React.docs_link().is_none());
        for f in [Framework::Vanilla, Framework::Angular, Framework::Vue] {
            assert!(!f.supported());
            assert!(f.docs_link().is_some());
        }
        assert!(Framework::Angular.scaffolding_supported());
        assert!(!Framework::Vue.scaffolding_supported());
        assert_eq!(Framework::default(), Framework::React);
    }

    #[test]
    fn next_library_wraps() {
        let mut p = props();
        assert_eq!(p.next_library().as_deref(), Some("chartjs"));
        p.charting_library = "chartjs".to_string();
        assert_eq!(p.next_library().as_deref(), Some("bizcharts"));
        p.chart_libraries.clear();
        assert_eq!(p.next_library(), None);
    }
}
