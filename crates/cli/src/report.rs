use std::fmt::Write as _;

use anyhow::{Context, Result, bail};
use argtree::{ArgParser, OptionKind, Value};
use serde::Serialize;

/// A serializable snapshot of one resolved parser node and its matched
/// command, if any.
#[derive(Debug, Serialize)]
pub struct NodeReport {
    pub options: Vec<OptionReport>,
    pub arguments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandReport>,
}

#[derive(Debug, Serialize)]
pub struct OptionReport {
    pub name: String,
    pub kind: &'static str,
    pub found: bool,
    pub values: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CommandReport {
    pub name: String,
    pub node: Box<NodeReport>,
}

impl NodeReport {
    pub fn from_parser(parser: &ArgParser) -> Self {
        let options = parser
            .options()
            .map(|(name, option)| OptionReport {
                name: name.to_string(),
                kind: kind_name(option.kind()),
                found: option.is_found(),
                values: option.values().iter().map(json_value).collect(),
            })
            .collect();

        let command = parser.command().map(|(name, child)| CommandReport {
            name: name.to_string(),
            node: Box::new(Self::from_parser(child)),
        });

        Self {
            options,
            arguments: parser.args().to_vec(),
            command,
        }
    }
}

fn kind_name(kind: OptionKind) -> &'static str {
    match kind {
        OptionKind::Flag => "flag",
        OptionKind::String => "string",
        OptionKind::Integer => "integer",
        OptionKind::Float => "float",
    }
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Flag(v) => serde_json::Value::Bool(*v),
        Value::Str(v) => serde_json::Value::String(v.clone()),
        Value::Int(v) => serde_json::Value::from(*v),
        // NaN and infinities have no JSON form.
        Value::Float(v) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
    }
}

/// Render the whole tree below `root`, as JSON or as the plain listing.
pub fn render(root: &ArgParser, format: &str) -> Result<String> {
    match format {
        "json" => {
            let report = NodeReport::from_parser(root);
            serde_json::to_string_pretty(&report).context("failed to serialize parse report")
        }
        "text" => {
            let mut out = root.to_string();
            let mut node = root;
            while let Some((name, child)) = node.command() {
                write!(out, "\n[{name}]\n{child}")?;
                node = child;
            }
            Ok(out)
        }
        other => bail!("unknown output format '{other}' (expected text or json)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed() -> ArgParser {
        let mut root = ArgParser::new();
        root.add_flag("verbose v");
        root.add_cmd("show", "help").add_float_list("at", true);
        root.parse(["-v", "show", "--at", "1.5", "2", "--", "x"])
            .unwrap();
        root
    }

    #[test]
    fn json_report_mirrors_tree() {
        let text = render(&parsed(), "json").unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json["options"][0]["name"], "verbose");
        assert_eq!(json["options"][1]["name"], "v");
        assert_eq!(json["options"][1]["values"], serde_json::json!([false, true]));
        assert_eq!(json["command"]["name"], "show");
        assert_eq!(
            json["command"]["node"]["options"][0]["values"],
            serde_json::json!([1.5, 2.0])
        );
        assert_eq!(json["command"]["node"]["arguments"], serde_json::json!(["x"]));
        assert!(json["command"]["node"].get("command").is_none());
    }

    #[test]
    fn text_report_walks_into_commands() {
        let text = render(&parsed(), "text").unwrap();
        assert!(text.starts_with("Options:\n  verbose: [false, true]\n"));
        assert!(text.contains("\n[show]\nOptions:\n  at: [1.5, 2]\n"));
    }

    #[test]
    fn unknown_format_is_an_error() {
        let err = render(&parsed(), "yaml").unwrap_err();
        assert!(err.to_string().contains("unknown output format"));
    }
}
