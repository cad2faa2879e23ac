//! Sandbox export: file-tree payload and the POST form that carries it.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::codegen::{CodeBundle, CodeExample};

/// Sandbox service define endpoint. The form is submitted out of process;
/// no response is consumed.
pub const SANDBOX_DEFINE_URL: &str = "https://codesandbox.io/api/v1/sandboxes/define";

/// Form field the serialized definition is placed under.
pub const SANDBOX_PARAMETERS_FIELD: &str = "parameters";

/// Project template the sandbox is created from.
const SANDBOX_TEMPLATE: &str = "create-react-app";

/// Dependency always present in the synthesized manifest.
const BASE_DEPENDENCY: &str = "react-dom";

/// Entry file used when the generated source is a single string.
const ENTRY_FILE: &str = "index.js";

/// File-tree definition for a sandbox project: the generated source plus a
/// synthesized package manifest, tagged with the project template.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SandboxDefinition {
    pub files: BTreeMap<String, SandboxFile>,
    pub template: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SandboxFile {
    pub content: Value,
}

impl SandboxDefinition {
    /// Build the definition from generated source and its dependency
    /// names. A single-string source lands under the entry file; a file
    /// tree is used verbatim. Every dependency is pinned to "latest".
    pub fn new(code: &CodeExample, dependencies: &[String]) -> Self {
        let mut files = BTreeMap::new();
        match code {
            CodeExample::Source(source) => {
                files.insert(
                    ENTRY_FILE.to_string(),
                    SandboxFile {
                        content: Value::String(source.clone()),
                    },
                );
            }
            CodeExample::Files(tree) => {
                for (name, content) in tree {
                    files.insert(
                        name.clone(),
                        SandboxFile {
                            content: Value::String(content.clone()),
                        },
                    );
                }
            }
        }

        let mut deps = Map::new();
        deps.insert(BASE_DEPENDENCY.to_string(), Value::String("latest".to_string()));
        for dep in dependencies {
            deps.insert(dep.clone(), Value::String("latest".to_string()));
        }
        files.insert(
            "package.json".to_string(),
            SandboxFile {
                content: json!({ "dependencies": Value::Object(deps) }),
            },
        );

        Self {
            files,
            template: SANDBOX_TEMPLATE,
        }
    }

    /// Serialized definition, as placed in the hidden form field.
    pub fn parameters(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// A prepared POST form for the sandbox service. The submission itself is
/// external; the host serializes this to disk and points the user at it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SandboxForm {
    pub action: &'static str,
    pub method: &'static str,
    pub field: &'static str,
    pub parameters: String,
}

impl SandboxForm {
    /// Build the form for a derived bundle. Callers gate on readiness:
    /// no bundle means the export control stays disabled.
    pub fn for_bundle(bundle: &CodeBundle) -> Self {
        let definition = SandboxDefinition::new(&bundle.code, &bundle.dependencies);
        Self {
            action: SANDBOX_DEFINE_URL,
            method: "POST",
            field: SANDBOX_PARAMETERS_FIELD,
            parameters: definition.parameters(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition_for(code: CodeExample, deps: &[&str]) -> SandboxDefinition {
        let deps: Vec<String> = deps.iter().map(|d| d.to_string()).collect();
        SandboxDefinition::new(&code, &deps)
    }

    #[test]
    fn single_source_lands_under_entry_file() {
        let def = definition_for(CodeExample::Source("render();".to_string()), &[]);
        assert_eq!(
            def.files.get("index.js").map(|f| &f.content),
            Some(&Value::String("render();".to_string()))
        );
        assert_eq!(def.template, "create-react-app");
    }

    #[test]
    fn file_tree_is_used_verbatim() {
        let mut tree = BTreeMap::new();
        tree.insert("App.js".to_string(), "export default App;".to_string());
        tree.insert("index.js".to_string(), "render(App);".to_string());
        let def = definition_for(CodeExample::Files(tree), &[]);
        assert!(def.files.contains_key("App.js"));
        assert!(def.files.contains_key("index.js"));
    }

    #[test]
    fn manifest_pins_dependencies_to_latest() {
        let def = definition_for(
            CodeExample::Source(String::new()),
            &["@cubejs-client/core", "bizcharts"],
        );
        let manifest = &def.files["package.json"].content;
        let deps = manifest["dependencies"].as_object().unwrap();
        assert_eq!(deps["react-dom"], "latest");
        assert_eq!(deps["@cubejs-client/core"], "latest");
        assert_eq!(deps["bizcharts"], "latest");
        assert_eq!(deps.len(), 3);
    }

    #[test]
    fn form_targets_define_endpoint() {
        let bundle = CodeBundle {
            code: CodeExample::Source("render();".to_string()),
            dependencies: vec!["chart.js".to_string()],
        };
        let form = SandboxForm::for_bundle(&bundle);
        assert_eq!(form.action, SANDBOX_DEFINE_URL);
        assert_eq!(form.method, "POST");
        assert_eq!(form.field, "parameters");
        assert!(form.parameters.contains("chart.js"));
    }
}
