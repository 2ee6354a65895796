//! Tool trait and the ToolSpec registry.
//!
//! A [`Tool`] is a plain callable that declares its call signature and its
//! documentation as Rust values. Registration cross-checks the two and
//! produces an immutable [`ToolSpec`]: a self-describing unit with a JSON
//! schema for the model and a uniform `invoke` contract that coerces the
//! model's arguments to the declared types.
//!
//! Every tool gains a synthetic required `reason` parameter (a present-tense
//! note on why the model is calling it). `invoke` strips it before the
//! arguments reach the tool.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RegistrationError, ToolError};
use crate::provider::ToolDefinition;
use crate::session::SessionContext;

/// Name of the synthetic parameter added to every tool.
pub const REASON_PARAM: &str = "reason";

const REASON_DESCRIPTION: &str = "What are you doing by using this function. In present tense with '-ing' ending. Always required.";

/// The declared type of a tool parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Array(Box<ParamType>),
}

impl ParamType {
    /// Shorthand for `Array(Box::new(inner))`.
    pub fn array(inner: ParamType) -> Self {
        Self::Array(Box::new(inner))
    }

    /// Map a type name (`"i64"`, `"float"`, `"Vec<String>"`, `"list[int]"`, ...)
    /// to a parameter type. Unrecognized names fall back to `String`.
    pub fn from_type_name(name: &str) -> Self {
        let name = name.trim();
        for (open, close) in [("Vec<", '>'), ("list[", ']'), ("array<", '>'), ("[", ']')] {
            if let Some(inner) = name.strip_prefix(open).and_then(|rest| rest.strip_suffix(close)) {
                return Self::array(Self::from_type_name(inner));
            }
        }
        match name {
            "int" | "integer" | "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32"
            | "u64" | "usize" => Self::Integer,
            "float" | "number" | "f32" | "f64" => Self::Number,
            "list" | "Vec" | "array" => Self::array(Self::String),
            _ => Self::String,
        }
    }

    /// The JSON-schema `type` keyword.
    pub fn json_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Array(_) => "array",
        }
    }

    /// JSON-schema fragment: `{"type": ...}` plus `items` for arrays.
    pub fn schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), Value::from(self.json_name()));
        if let Self::Array(inner) = self {
            schema.insert("items".into(), inner.schema());
        }
        Value::Object(schema)
    }

    fn describe(&self) -> String {
        match self {
            Self::Array(inner) => format!("array of {}", inner.describe()),
            other => other.json_name().to_string(),
        }
    }

    /// Convert a model-supplied value to this type.
    ///
    /// Integers and numbers accept numeric strings; arrays accept a JSON
    /// array (or a string holding one) and coerce element-wise.
    pub fn coerce(&self, param: &str, value: Value) -> Result<Value, ToolError> {
        let fail = |value: &Value| ToolError::Coercion {
            param: param.to_string(),
            expected: self.describe(),
            value: value.to_string(),
        };

        match self {
            Self::String => match value {
                Value::String(_) => Ok(value),
                Value::Null => Err(fail(&value)),
                Value::Number(_) | Value::Bool(_) => Ok(Value::String(value.to_string())),
                Value::Array(_) | Value::Object(_) => Ok(Value::String(value.to_string())),
            },
            Self::Integer => {
                let parsed = match &value {
                    Value::Number(n) => n.as_i64().or_else(|| {
                        n.as_f64()
                            .filter(|f| f.is_finite() && f.fract() == 0.0)
                            .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                            .map(|f| f as i64)
                    }),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                };
                parsed.map(Value::from).ok_or_else(|| fail(&value))
            }
            Self::Number => {
                let parsed = match &value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
                    _ => None,
                };
                parsed
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| fail(&value))
            }
            Self::Array(inner) => {
                let items = match value {
                    Value::Array(items) => items,
                    Value::String(ref s) => match serde_json::from_str::<Value>(s) {
                        Ok(Value::Array(items)) => items,
                        _ => return Err(fail(&value)),
                    },
                    other => return Err(fail(&other)),
                };
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| inner.coerce(&format!("{param}[{i}]"), item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
        }
    }
}

/// One parameter as the tool's call signature declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub kind: ParamType,
    /// Whether the tool has a default for this parameter (makes it optional).
    pub has_default: bool,
}

impl ParamDecl {
    pub fn required(name: impl Into<String>, kind: ParamType) -> Self {
        Self { name: name.into(), kind, has_default: false }
    }

    pub fn optional(name: impl Into<String>, kind: ParamType) -> Self {
        Self { name: name.into(), kind, has_default: true }
    }
}

/// One parameter as the tool's documentation describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDoc {
    pub name: String,
    pub description: String,
}

/// A tool's documentation: overall description plus per-parameter lines,
/// in the same order as the signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolDoc {
    pub description: String,
    pub params: Vec<ParamDoc>,
}

impl ToolDoc {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), params: Vec::new() }
    }

    pub fn param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.params.push(ParamDoc { name: name.into(), description: description.into() });
        self
    }
}

/// Coerced, named arguments handed to a tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Result<&str, ToolError> {
        self.opt_str(name)
            .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{name}' argument")))
    }

    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn i64(&self, name: &str) -> Result<i64, ToolError> {
        self.opt_i64(name)
            .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{name}' argument")))
    }

    pub fn opt_i64(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    pub fn f64(&self, name: &str) -> Result<f64, ToolError> {
        self.values
            .get(name)
            .and_then(Value::as_f64)
            .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{name}' argument")))
    }

    pub fn f64_list(&self, name: &str) -> Result<Vec<f64>, ToolError> {
        self.list(name, Value::as_f64)
    }

    pub fn i64_list(&self, name: &str) -> Result<Vec<i64>, ToolError> {
        self.list(name, Value::as_i64)
    }

    pub fn str_list(&self, name: &str) -> Result<Vec<String>, ToolError> {
        self.list(name, |v| v.as_str().map(String::from))
    }

    fn list<T>(&self, name: &str, item: impl Fn(&Value) -> Option<T>) -> Result<Vec<T>, ToolError> {
        let items = self
            .values
            .get(name)
            .and_then(Value::as_array)
            .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{name}' list")))?;
        items
            .iter()
            .map(|v| {
                item(v).ok_or_else(|| {
                    ToolError::InvalidArguments(format!("Unexpected element in '{name}': {v}"))
                })
            })
            .collect()
    }
}

/// What a tool can reach while it runs: the registry it lives in (for
/// meta-tools like the batch runner) and the session collaborators.
pub struct ToolContext<'a> {
    pub registry: &'a ToolRegistry,
    pub session: &'a dyn SessionContext,
}

/// A callable exposed to the model.
///
/// Tools should report domain failures as an `{"error": ...}` payload so the
/// model can react; `Err` is reserved for failures the turn cannot recover from.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "get_weather").
    fn name(&self) -> &str;

    /// Description and per-parameter documentation.
    fn doc(&self) -> ToolDoc;

    /// Declared parameters in call order.
    fn signature(&self) -> Vec<ParamDecl>;

    /// Whether invocations surface a progress indicator.
    fn show_progress(&self) -> bool {
        true
    }

    /// Run the tool. The result must be JSON-serializable.
    async fn call(&self, args: ToolArgs, ctx: &ToolContext<'_>) -> Result<Value, ToolError>;
}

/// A registered parameter: declaration and documentation merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamType,
    pub description: String,
    pub required: bool,
}

/// A validated, self-describing, invokable tool.
#[derive(Clone)]
pub struct ToolSpec {
    name: String,
    description: String,
    parameters: Vec<ParamSpec>,
    show_progress: bool,
    tool: Arc<dyn Tool>,
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("show_progress", &self.show_progress)
            .finish()
    }
}

impl ToolSpec {
    /// Validate a tool's documentation against its signature.
    pub fn register(tool: Arc<dyn Tool>) -> Result<Self, RegistrationError> {
        let name = tool.name().to_string();
        let doc = tool.doc();
        let signature = tool.signature();

        if doc.params.len() != signature.len() {
            return Err(RegistrationError::ParamCountMismatch {
                tool: name,
                documented: doc.params.len(),
                declared: signature.len(),
            });
        }

        for (index, (documented, declared)) in doc.params.iter().zip(&signature).enumerate() {
            if documented.name != declared.name {
                return Err(RegistrationError::ParamOrderMismatch {
                    tool: name,
                    index,
                    documented: documented.name.clone(),
                    declared: declared.name.clone(),
                });
            }
        }

        if let Some(undocumented) = doc.params.iter().find(|p| p.description.trim().is_empty()) {
            return Err(RegistrationError::MissingParamDescription {
                tool: name,
                param: undocumented.name.clone(),
            });
        }

        if doc.description.trim().is_empty() {
            return Err(RegistrationError::MissingDescription(name));
        }

        if signature.iter().any(|p| p.name == REASON_PARAM) {
            return Err(RegistrationError::ReservedParam { tool: name, param: REASON_PARAM.into() });
        }

        let parameters = signature
            .into_iter()
            .zip(doc.params)
            .map(|(decl, doc)| ParamSpec {
                name: decl.name,
                kind: decl.kind,
                description: doc.description.replace('\n', " "),
                required: !decl.has_default,
            })
            .collect();

        Ok(Self {
            name,
            description: doc.description,
            parameters,
            show_progress: tool.show_progress(),
            tool,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declared parameters (without the synthetic `reason`).
    pub fn parameters(&self) -> &[ParamSpec] {
        &self.parameters
    }

    pub fn show_progress(&self) -> bool {
        self.show_progress
    }

    /// Names of parameters without a default, followed by `reason`.
    pub fn required(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .chain(std::iter::once(REASON_PARAM))
            .collect()
    }

    /// The `{name, description, parameters}` schema sent to the model.
    pub fn to_definition(&self) -> ToolDefinition {
        let mut properties = Map::new();
        for param in &self.parameters {
            let mut schema = param.kind.schema();
            schema["description"] = Value::from(param.description.clone());
            properties.insert(param.name.clone(), schema);
        }
        properties.insert(
            REASON_PARAM.into(),
            serde_json::json!({ "type": "string", "description": REASON_DESCRIPTION }),
        );

        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": self.required(),
            }),
        }
    }

    /// Strip `reason`, reject unknown or missing arguments and coerce the rest.
    pub fn coerce_args(&self, mut args: Map<String, Value>) -> Result<ToolArgs, ToolError> {
        args.remove(REASON_PARAM);

        if let Some(unknown) = args.keys().find(|k| !self.parameters.iter().any(|p| &p.name == *k)) {
            return Err(ToolError::InvalidArguments(format!(
                "Unexpected argument '{unknown}' for tool '{}'",
                self.name
            )));
        }

        let mut coerced = Map::new();
        for param in &self.parameters {
            match args.remove(&param.name) {
                Some(value) => {
                    coerced.insert(param.name.clone(), param.kind.coerce(&param.name, value)?);
                }
                None if param.required => {
                    return Err(ToolError::InvalidArguments(format!(
                        "Missing required argument '{}' for tool '{}'",
                        param.name, self.name
                    )));
                }
                None => {}
            }
        }
        Ok(ToolArgs::new(coerced))
    }

    /// Coerce the arguments, call the tool and return its result as
    /// 4-space indented JSON.
    pub async fn invoke(
        &self,
        args: Map<String, Value>,
        ctx: &ToolContext<'_>,
    ) -> Result<String, ToolError> {
        let args = self.coerce_args(args)?;
        let result = self.tool.call(args, ctx).await?;
        to_pretty_json(&result).map_err(|e| ToolError::Serialization {
            tool_name: self.name.clone(),
            reason: e.to_string(),
        })
    }
}

fn to_pretty_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// A registry of available tools, keyed by name, in registration order.
///
/// The dispatch loop uses this to:
/// 1. Get tool definitions to send to the model
/// 2. Look up and invoke tools when the model requests them
#[derive(Debug, Default)]
pub struct ToolRegistry {
    specs: Vec<ToolSpec>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a tool list. Any registration error aborts the
    /// whole build; there is no partial registry.
    pub fn from_tools(
        tools: impl IntoIterator<Item = Arc<dyn Tool>>,
    ) -> Result<Self, RegistrationError> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistrationError> {
        if self.index.contains_key(tool.name()) {
            return Err(RegistrationError::Duplicate(tool.name().to_string()));
        }
        let spec = ToolSpec::register(tool)?;
        self.index.insert(spec.name.clone(), self.specs.len());
        self.specs.push(spec);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    /// All tool definitions, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.specs.iter().map(ToolSpec::to_definition).collect()
    }

    /// Registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Invoke a tool by name.
    pub async fn invoke(
        &self,
        name: &str,
        args: Map<String, Value>,
        session: &dyn SessionContext,
    ) -> Result<String, ToolError> {
        let spec = self.get(name).ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        let ctx = ToolContext { registry: self, session };
        spec.invoke(args, &ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::NullSession;

    /// Sums a list of integers; echoes an optional label.
    struct SumTool;

    #[async_trait]
    impl Tool for SumTool {
        fn name(&self) -> &str {
            "sum"
        }

        fn doc(&self) -> ToolDoc {
            ToolDoc::new("Adds up a list of integers")
                .param("values", "the integers to add")
                .param("label", "an optional label for the total")
        }

        fn signature(&self) -> Vec<ParamDecl> {
            vec![
                ParamDecl::required("values", ParamType::array(ParamType::Integer)),
                ParamDecl::optional("label", ParamType::String),
            ]
        }

        async fn call(&self, args: ToolArgs, _ctx: &ToolContext<'_>) -> Result<Value, ToolError> {
            let total: i64 = args.i64_list("values")?.iter().sum();
            Ok(serde_json::json!({
                "total": total,
                "label": args.opt_str("label").unwrap_or("total"),
            }))
        }
    }

    /// A tool whose documentation can be bent out of shape per test.
    struct Misdocumented {
        doc: ToolDoc,
        signature: Vec<ParamDecl>,
    }

    #[async_trait]
    impl Tool for Misdocumented {
        fn name(&self) -> &str {
            "broken"
        }
        fn doc(&self) -> ToolDoc {
            self.doc.clone()
        }
        fn signature(&self) -> Vec<ParamDecl> {
            self.signature.clone()
        }
        async fn call(&self, _args: ToolArgs, _ctx: &ToolContext<'_>) -> Result<Value, ToolError> {
            Ok(Value::Null)
        }
    }

    fn two_params() -> Vec<ParamDecl> {
        vec![
            ParamDecl::required("location", ParamType::String),
            ParamDecl::required("day", ParamType::String),
        ]
    }

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn required_is_non_default_params_plus_reason() {
        let spec = ToolSpec::register(Arc::new(SumTool)).unwrap();
        assert_eq!(spec.required(), vec!["values", "reason"]);
    }

    #[test]
    fn definition_has_object_schema_with_items() {
        let def = ToolSpec::register(Arc::new(SumTool)).unwrap().to_definition();
        assert_eq!(def.name, "sum");
        assert_eq!(def.parameters["type"], "object");
        assert_eq!(def.parameters["properties"]["values"]["type"], "array");
        assert_eq!(def.parameters["properties"]["values"]["items"]["type"], "integer");
        assert_eq!(def.parameters["properties"]["reason"]["type"], "string");
        assert_eq!(
            def.parameters["required"],
            serde_json::json!(["values", "reason"])
        );
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let tool = Misdocumented {
            doc: ToolDoc::new("Weather").param("location", "where"),
            signature: two_params(),
        };
        let err = ToolSpec::register(Arc::new(tool)).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::ParamCountMismatch { tool: "broken".into(), documented: 1, declared: 2 }
        );
    }

    #[test]
    fn order_mismatch_is_rejected() {
        let tool = Misdocumented {
            doc: ToolDoc::new("Weather").param("day", "when").param("location", "where"),
            signature: two_params(),
        };
        let err = ToolSpec::register(Arc::new(tool)).unwrap_err();
        assert!(matches!(err, RegistrationError::ParamOrderMismatch { index: 0, .. }));
    }

    #[test]
    fn missing_param_description_is_rejected() {
        let tool = Misdocumented {
            doc: ToolDoc::new("Weather").param("location", "where").param("day", "  "),
            signature: two_params(),
        };
        let err = ToolSpec::register(Arc::new(tool)).unwrap_err();
        assert!(matches!(err, RegistrationError::MissingParamDescription { ref param, .. } if param == "day"));
    }

    #[test]
    fn missing_description_is_rejected() {
        let tool = Misdocumented {
            doc: ToolDoc::new("").param("location", "where").param("day", "when"),
            signature: two_params(),
        };
        let err = ToolSpec::register(Arc::new(tool)).unwrap_err();
        assert_eq!(err, RegistrationError::MissingDescription("broken".into()));
    }

    #[test]
    fn reserved_reason_param_is_rejected() {
        let tool = Misdocumented {
            doc: ToolDoc::new("Weather").param("reason", "why"),
            signature: vec![ParamDecl::required("reason", ParamType::String)],
        };
        let err = ToolSpec::register(Arc::new(tool)).unwrap_err();
        assert!(matches!(err, RegistrationError::ReservedParam { .. }));
    }

    #[test]
    fn duplicate_registration_fails_the_whole_registry() {
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(SumTool), Arc::new(SumTool)];
        let err = ToolRegistry::from_tools(tools).unwrap_err();
        assert_eq!(err, RegistrationError::Duplicate("sum".into()));
    }

    #[test]
    fn type_names_map_recursively() {
        assert_eq!(ParamType::from_type_name("str"), ParamType::String);
        assert_eq!(ParamType::from_type_name("i64"), ParamType::Integer);
        assert_eq!(ParamType::from_type_name("float"), ParamType::Number);
        assert_eq!(
            ParamType::from_type_name("list[int]"),
            ParamType::array(ParamType::Integer)
        );
        assert_eq!(
            ParamType::from_type_name("Vec<Vec<f64>>"),
            ParamType::array(ParamType::array(ParamType::Number))
        );
        assert_eq!(ParamType::from_type_name("bool"), ParamType::String);
        assert_eq!(
            ParamType::from_type_name("Vec<Widget>"),
            ParamType::array(ParamType::String)
        );
    }

    #[test]
    fn numeric_strings_coerce_to_integer_array() {
        let spec = ToolSpec::register(Arc::new(SumTool)).unwrap();
        let args = spec
            .coerce_args(map(serde_json::json!({"values": ["1", "2", " 3"], "reason": "adding"})))
            .unwrap();
        assert_eq!(args.i64_list("values").unwrap(), vec![1, 2, 3]);
        assert!(args.get("reason").is_none());
    }

    #[test]
    fn malformed_array_element_propagates() {
        let spec = ToolSpec::register(Arc::new(SumTool)).unwrap();
        let err = spec
            .coerce_args(map(serde_json::json!({"values": ["1", "two"], "reason": "adding"})))
            .unwrap_err();
        assert!(matches!(err, ToolError::Coercion { ref param, .. } if param == "values[1]"));
    }

    #[test]
    fn scalar_coercions() {
        assert_eq!(ParamType::Integer.coerce("n", Value::from("42")).unwrap(), Value::from(42));
        assert_eq!(ParamType::Integer.coerce("n", serde_json::json!(7.0)).unwrap(), Value::from(7));
        assert!(ParamType::Integer.coerce("n", serde_json::json!(7.5)).is_err());
        assert!(ParamType::Integer.coerce("n", serde_json::json!(1e20)).is_err());
        assert!(ParamType::Integer.coerce("n", serde_json::json!(-1e20)).is_err());
        assert_eq!(ParamType::Number.coerce("x", Value::from("2.5")).unwrap(), serde_json::json!(2.5));
        assert_eq!(ParamType::String.coerce("s", Value::from(3)).unwrap(), Value::from("3"));
        assert!(ParamType::String.coerce("s", Value::Null).is_err());
    }

    #[test]
    fn stringified_array_is_accepted() {
        let coerced = ParamType::array(ParamType::Number)
            .coerce("xs", Value::from("[1, \"2.5\"]"))
            .unwrap();
        assert_eq!(coerced, serde_json::json!([1.0, 2.5]));
    }

    #[test]
    fn unknown_and_missing_arguments_are_rejected() {
        let spec = ToolSpec::register(Arc::new(SumTool)).unwrap();
        let unknown = spec.coerce_args(map(serde_json::json!({"values": [1], "colour": "red"})));
        assert!(matches!(unknown, Err(ToolError::InvalidArguments(_))));
        let missing = spec.coerce_args(map(serde_json::json!({"label": "x"})));
        assert!(matches!(missing, Err(ToolError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn invoke_returns_four_space_json() {
        let registry = ToolRegistry::from_tools([Arc::new(SumTool) as Arc<dyn Tool>]).unwrap();
        let out = registry
            .invoke("sum", map(serde_json::json!({"values": ["2", 3], "reason": "adding"})), &NullSession)
            .await
            .unwrap();
        assert!(out.contains("\n    \"total\": 5"), "{out}");
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["label"], "total");
    }

    #[tokio::test]
    async fn invoke_missing_tool() {
        let registry = ToolRegistry::new();
        let err = registry.invoke("nonexistent", Map::new(), &NullSession).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn registry_keeps_registration_order() {
        let registry = ToolRegistry::from_tools([
            Arc::new(SumTool) as Arc<dyn Tool>,
            Arc::new(Misdocumented {
                doc: ToolDoc::new("Weather").param("location", "where").param("day", "when"),
                signature: two_params(),
            }),
        ])
        .unwrap();
        assert_eq!(registry.names(), vec!["sum", "broken"]);
        assert_eq!(registry.definitions()[1].name, "broken");
        assert!(registry.get("broken").is_some());
    }
}
