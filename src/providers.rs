//! Built-in collaborators: a static code generator, a query-to-SQL
//! compiler, a local cache inspector, and a stub dashboard source.

use std::sync::atomic::{AtomicUsize, Ordering};

use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::cache_pane::{CacheReport, CacheSource};
use crate::codegen::{CodeExample, CodeGenerator, CodegenParams};
use crate::dashboard::{AddChartSupport, DashboardSource};
use crate::panel::{ChartLibrary, RenderFn, RenderRequest};
use crate::sql::SqlSource;

/// Charting libraries the static generator knows about.
pub fn default_chart_libraries() -> Vec<ChartLibrary> {
    vec![
        ChartLibrary::new("bizcharts", "Bizcharts"),
        ChartLibrary::new("chartjs", "Chart.js"),
        ChartLibrary::new("recharts", "Recharts"),
        ChartLibrary::new("d3", "D3"),
    ]
}

/// Code generator with a fixed template per charting library.
#[derive(Default)]
pub struct StaticCodeGenerator;

impl StaticCodeGenerator {
    fn render_snippet(library: &str, chart_type: &str) -> String {
        match library {
            "chartjs" => format!(
                "<ChartRenderer type=\"{}\" data={{chartData(resultSet)}} />",
                chart_type
            ),
            "recharts" => format!(
                "<CartesianChart resultSet={{resultSet}} ChartComponent={{{}}} />",
                recharts_component(chart_type)
            ),
            "d3" => "<div ref={(el) => el && drawChart(el, resultSet)} />".to_string(),
            _ => format!(
                "<Chart data={{resultSet.chartPivot()}} type=\"{}\" />",
                chart_type
            ),
        }
    }
}

fn recharts_component(chart_type: &str) -> &'static str {
    match chart_type {
        "bar" => "BarChart",
        "area" => "AreaChart",
        "pie" => "PieChart",
        _ => "LineChart",
    }
}

impl CodeGenerator for StaticCodeGenerator {
    fn dependencies(&self, library: &str) -> Vec<String> {
        let mut deps = vec![
            "@cubejs-client/core".to_string(),
            "@cubejs-client/react".to_string(),
        ];
        let lib_dep = match library {
            "chartjs" => Some("react-chartjs-2"),
            "recharts" => Some("recharts"),
            "d3" => Some("d3"),
            "bizcharts" => Some("bizcharts"),
            _ => None,
        };
        if let Some(dep) = lib_dep {
            deps.push(dep.to_string());
        }
        deps
    }

    fn codegen(&self, library: &str, params: &CodegenParams) -> CodeExample {
        let query = serde_json::to_string_pretty(&params.query).unwrap_or_default();
        let pivot = params
            .pivot_config
            .as_ref()
            .map(|p| format!("\nconst pivotConfig = {};\n", p))
            .unwrap_or_default();
        let snippet = Self::render_snippet(library, &params.chart_type);

        CodeExample::Source(format!(
            "import React from 'react';\n\
             import ReactDOM from 'react-dom';\n\
             import cubejs from '@cubejs-client/core';\n\
             import {{ QueryRenderer }} from '@cubejs-client/react';\n\
             \n\
             const cubejsApi = cubejs('CUBEJS_TOKEN', {{ apiUrl: 'CUBEJS_API_URL' }});\n\
             \n\
             const query = {};\n{}\
             \n\
             const App = () => (\n\
             \x20 <QueryRenderer\n\
             \x20   query={{query}}\n\
             \x20   cubejsApi={{cubejsApi}}\n\
             \x20   render={{({{ resultSet }}) => {{\n\
             \x20     if (!resultSet) {{\n\
             \x20       return 'Loading...';\n\
             \x20     }}\n\
             \x20     return {};\n\
             \x20   }}}}\n\
             \x20 />\n\
             );\n\
             \n\
             ReactDOM.render(<App />, document.getElementById('root'));\n",
            query, pivot, snippet
        ))
    }
}

/// Compiles the playground query shape (measures, dimensions, time
/// dimensions, filters, limit) into a SELECT statement. Comparison date
/// ranges yield one identical statement per range.
#[derive(Default)]
pub struct QueryCompiler;

/// `Orders.count` -> `orders__count`
fn column_alias(member: &str) -> String {
    member.to_lowercase().replace('.', "__")
}

/// Table behind a member: the cube name, lowercased
fn member_table(member: &str) -> Option<String> {
    member.split('.').next().map(|c| c.to_lowercase())
}

fn string_items(query: &Value, key: &str) -> Vec<String> {
    query[key]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn measure_expr(member: &str) -> String {
    let column = member
        .split('.')
        .nth(1)
        .unwrap_or(member)
        .to_lowercase();
    if column == "count" {
        "COUNT(*)".to_string()
    } else {
        format!("SUM({})", column)
    }
}

impl QueryCompiler {
    fn compile(&self, query: &Value) -> Result<String> {
        let measures = string_items(query, "measures");
        let dimensions = string_items(query, "dimensions");

        let mut select = Vec::new();
        let mut group_by = Vec::new();
        let mut table = None;

        for dim in &dimensions {
            let alias = column_alias(dim);
            select.push(format!("{} AS {}", alias, alias));
            group_by.push(alias);
            table = table.or_else(|| member_table(dim));
        }
        for measure in &measures {
            select.push(format!("{} AS {}", measure_expr(measure), column_alias(measure)));
            table = table.or_else(|| member_table(measure));
        }

        if select.is_empty() {
            return Err(eyre!("query has no measures or dimensions"));
        }
        let table = table.ok_or_else(|| eyre!("query members name no cube"))?;

        let mut sql = format!("SELECT {} FROM {}", select.join(", "), table);

        let filters: Vec<String> = query["filters"]
            .as_array()
            .map(|fs| {
                fs.iter()
                    .filter_map(|f| {
                        let member = f["member"].as_str().or_else(|| f["dimension"].as_str())?;
                        let values = f["values"].as_array()?;
                        let value = values.first()?.as_str()?;
                        Some(format!("{} = '{}'", column_alias(member), value))
                    })
                    .collect()
            })
            .unwrap_or_default();
        if !filters.is_empty() {
            sql.push_str(&format!(" WHERE {}", filters.join(" AND ")));
        }

        if !group_by.is_empty() {
            sql.push_str(&format!(" GROUP BY {}", group_by.join(", ")));
        }

        if let Some(limit) = query["limit"].as_u64() {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        Ok(sql)
    }

    /// Number of parallel statements the query expands to.
    fn fan_out(query: &Value) -> usize {
        query["timeDimensions"]
            .as_array()
            .and_then(|tds| {
                tds.iter()
                    .find_map(|td| td["compareDateRange"].as_array().map(|r| r.len()))
            })
            .unwrap_or(1)
            .max(1)
    }
}

impl SqlSource for QueryCompiler {
    fn sql(&self, query: &Value) -> Result<Vec<String>> {
        let sql = self.compile(query)?;
        Ok(vec![sql; Self::fan_out(query)])
    }
}

/// Cache inspector that derives a deterministic report from the query.
#[derive(Default)]
pub struct LocalCacheSource;

impl CacheSource for LocalCacheSource {
    fn inspect(&self, query: &Value) -> Result<CacheReport> {
        let serialized = serde_json::to_string(query)?;
        let mut hasher = Sha256::new();
        hasher.update(serialized.as_bytes());
        let digest = hasher.finalize();
        let cache_key = format!("{:x}", digest);

        let hit = digest[0] % 2 == 0;
        let pre_aggregation = query["timeDimensions"]
            .as_array()
            .and_then(|tds| tds.iter().find(|td| td["granularity"].is_string()))
            .and_then(|td| td["dimension"].as_str())
            .map(|d| format!("{}_main", member_table(d).unwrap_or_default()));

        Ok(CacheReport {
            cache_key,
            hit,
            pre_aggregation,
            age_seconds: hit.then(|| i64::from(digest[1]) * 7),
        })
    }
}

/// Default render callback: a line chart of the result set's first
/// numeric series, or a placeholder/error message.
pub fn demo_render() -> RenderFn {
    Box::new(|request: RenderRequest<'_>, area: Rect, buf: &mut Buffer| {
        let (error, result_set) = match &request {
            RenderRequest::Chart { error, .. } => (*error, None),
            RenderRequest::Raw { error, result_set } => (*error, *result_set),
        };

        if let Some(error) = error {
            Paragraph::new(error)
                .style(Style::default().fg(Color::Red))
                .centered()
                .render(area, buf);
            return;
        }

        let points = result_points(result_set);
        let x_max = points.len().max(1) as f64;
        let y_max = points
            .iter()
            .map(|(_, y)| *y)
            .fold(1.0_f64, f64::max);

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points);

        Chart::new(vec![dataset])
            .x_axis(
                Axis::default()
                    .bounds([0.0, x_max])
                    .labels(["0".to_string(), format!("{}", x_max as usize)].map(Span::raw)),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, y_max])
                    .labels(["0".to_string(), format!("{}", y_max as usize)].map(Span::raw)),
            )
            .render(area, buf);
    })
}

/// Points for the demo chart: values from the result set when present,
/// otherwise a fixed placeholder series.
fn result_points(result_set: Option<&Value>) -> Vec<(f64, f64)> {
    let values: Vec<f64> = result_set
        .and_then(|rs| rs["data"].as_array())
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    row.as_object()
                        .and_then(|o| o.values().find_map(|v| v.as_f64()))
                })
                .collect()
        })
        .unwrap_or_default();

    let values = if values.is_empty() {
        vec![2.0, 5.0, 3.0, 8.0, 6.0, 9.0, 4.0]
    } else {
        values
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i as f64, v))
        .collect()
}

/// How the stub dashboard answers its capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardStubMode {
    Supported,
    Unsupported,
    Broken,
}

/// In-process dashboard source for demos and tests. Counts add_chart
/// calls so tests can assert the at-most-once contract.
pub struct StubDashboard {
    mode: DashboardStubMode,
    added: AtomicUsize,
}

impl StubDashboard {
    pub fn new(mode: DashboardStubMode) -> Self {
        Self {
            mode,
            added: AtomicUsize::new(0),
        }
    }

    pub fn charts_added(&self) -> usize {
        self.added.load(Ordering::SeqCst)
    }
}

impl DashboardSource for StubDashboard {
    fn can_add_chart(&self) -> Result<AddChartSupport> {
        Ok(match self.mode {
            DashboardStubMode::Supported => AddChartSupport::Supported,
            DashboardStubMode::Unsupported => AddChartSupport::Unsupported,
            DashboardStubMode::Broken => {
                AddChartSupport::Error("Dashboard app failed to compile".to_string())
            }
        })
    }

    fn add_chart(&self, _code: &str) -> Result<()> {
        self.added.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
