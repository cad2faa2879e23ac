//! Code-generation provider seam and the renderer readiness signal.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

/// Parameters handed to the code generator for one derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenParams {
    pub query: Value,
    pub chart_type: String,
    pub pivot_config: Option<Value>,
}

/// Generated example source: a single file, or a named file tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeExample {
    Source(String),
    Files(BTreeMap<String, String>),
}

impl CodeExample {
    /// Flatten to display/copy text. File trees are concatenated with a
    /// `// <name>` header per file, in name order.
    pub fn text(&self) -> String {
        match self {
            Self::Source(s) => s.clone(),
            Self::Files(files) => {
                let mut out = String::new();
                for (name, content) in files {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(&format!("// {}\n{}", name, content));
                }
                out
            }
        }
    }
}

/// Provider of example source code and runtime dependency lists for a
/// charting library. Injected wherever generated code is needed.
pub trait CodeGenerator {
    /// Runtime dependency names for the given charting library.
    fn dependencies(&self, library: &str) -> Vec<String>;

    /// Example source for the given charting library and parameters.
    fn codegen(&self, library: &str, params: &CodegenParams) -> CodeExample;
}

/// One-shot "renderer ready" signal. Fired at most once per process,
/// carries no payload, and is shared by every panel that clones it.
#[derive(Clone, Debug, Default)]
pub struct ReadySignal(Arc<OnceLock<()>>);

impl ReadySignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal. Returns true only for the first call.
    pub fn fire(&self) -> bool {
        self.0.set(()).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.0.get().is_some()
    }
}

/// Derived code + dependency list for the current selection. Only exists
/// after the readiness signal has fired.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBundle {
    pub code: CodeExample,
    pub dependencies: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_signal_fires_once() {
        let signal = ReadySignal::new();
        assert!(!signal.is_ready());
        assert!(signal.fire());
        assert!(signal.is_ready());
        assert!(!signal.fire());
        assert!(signal.is_ready());
    }

    #[test]
    fn ready_signal_shared_across_clones() {
        let signal = ReadySignal::new();
        let other = signal.clone();
        signal.fire();
        assert!(other.is_ready());
    }

    #[test]
    fn code_example_text_single_source() {
        let code = CodeExample::Source("const a = 1;".to_string());
        assert_eq!(code.text(), "const a = 1;");
    }

    #[test]
    fn code_example_text_file_tree() {
        let mut files = BTreeMap::new();
        files.insert("index.js".to_string(), "render();".to_string());
        files.insert("chart.js".to_string(), "export {};".to_string());
        let code = CodeExample::Files(files);
        assert_eq!(code.text(), "// chart.js\nexport {};\n// index.js\nrender();");
    }
}
