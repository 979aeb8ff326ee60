use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use supports_color::Stream;

static PLAIN: AtomicBool = AtomicBool::new(false);

pub fn set_plain(value: bool) {
    PLAIN.store(value, Ordering::Relaxed);
}

pub fn is_plain() -> bool {
    PLAIN.load(Ordering::Relaxed)
}

pub fn use_color_stdout() -> bool {
    supports_color(Stream::Stdout)
}

pub fn use_color_stderr() -> bool {
    supports_color(Stream::Stderr)
}

fn supports_color(stream: Stream) -> bool {
    if is_plain() {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    supports_color::on(stream).is_some()
}

pub fn style_text<F>(text: &str, use_color: bool, style: F) -> String
where
    F: FnOnce(colored::ColoredString) -> colored::ColoredString,
{
    if use_color && !is_plain() {
        style(text.normal()).to_string()
    } else {
        text.to_string()
    }
}

/// How command results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
    /// Bare IDs only, for piping into other commands.
    Quiet,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "table" => Some(Self::Table),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "quiet" => Some(Self::Quiet),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Quiet => "quiet",
        }
    }
}

/// Column spec: (response key, display title).
pub type Columns<'a> = [(&'a str, &'a str)];

pub fn print_success(message: &str) {
    let use_color = use_color_stdout();
    println!("{}", style_text(&format!("✅ {message}"), use_color, |t| t.green().bold()));
}

pub fn print_error(message: &str) {
    let use_color = use_color_stderr();
    eprintln!(
        "{}",
        style_text(&format!("Error: {message}"), use_color, |t| t.red())
    );
}

/// Render a list of result rows in the requested format.
pub fn print_items(items: &[Value], columns: &Columns, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&Value::Array(items.to_vec())),
        OutputFormat::Csv => print_csv(items, columns),
        OutputFormat::Quiet => print_ids(items),
        OutputFormat::Table => print_table(items, columns),
    }
}

/// Render a single record. Table and CSV fall back to key/value rows over the
/// record's own fields.
pub fn print_item(item: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(item),
        OutputFormat::Quiet => {
            if let Some(id) = item_id(item) {
                println!("{id}");
            }
        }
        OutputFormat::Csv => {
            println!("field,value");
            for (key, value) in object_fields(item) {
                println!("{},{}", escape_csv(&key), escape_csv(&render_cell(&value)));
            }
        }
        OutputFormat::Table => {
            let use_color = use_color_stdout();
            let fields = object_fields(item);
            let width = fields.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
            for (key, value) in fields {
                let label = style_text(&format!("{key:width$}"), use_color, |t| t.cyan());
                println!("  {label}  {}", render_cell(&value));
            }
        }
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}

fn print_table(items: &[Value], columns: &Columns) {
    if items.is_empty() {
        println!("(no results)");
        return;
    }
    let use_color = use_color_stdout();
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|(key, _)| lookup_cell(item, key))
                .collect()
        })
        .collect();
    let mut widths: Vec<usize> = columns.iter().map(|(_, title)| title.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let header = columns
        .iter()
        .enumerate()
        .map(|(i, (_, title))| format!("{:width$}", title, width = widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", style_text(&header, use_color, |t| t.bold()));
    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    }
}

fn print_csv(items: &[Value], columns: &Columns) {
    let header = columns
        .iter()
        .map(|(_, title)| escape_csv(title))
        .collect::<Vec<_>>()
        .join(",");
    println!("{header}");
    for item in items {
        let line = columns
            .iter()
            .map(|(key, _)| escape_csv(&lookup_cell(item, key)))
            .collect::<Vec<_>>()
            .join(",");
        println!("{line}");
    }
}

fn print_ids(items: &[Value]) {
    for item in items {
        if let Some(id) = item_id(item) {
            println!("{id}");
        }
    }
}

fn item_id(item: &Value) -> Option<String> {
    for key in ["id", "_id"] {
        if let Some(id) = item.get(key) {
            let rendered = render_cell(id);
            if !rendered.is_empty() {
                return Some(rendered);
            }
        }
    }
    None
}

fn object_fields(item: &Value) -> Vec<(String, Value)> {
    match item {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        other => vec![("value".to_string(), other.clone())],
    }
}

/// Look up a column key on a row and render it for display.
pub fn lookup_cell(item: &Value, key: &str) -> String {
    item.get(key).map(render_cell).unwrap_or_default()
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(render_cell)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

fn escape_csv(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_format_names_round_trip() {
        for format in [
            OutputFormat::Table,
            OutputFormat::Json,
            OutputFormat::Csv,
            OutputFormat::Quiet,
        ] {
            assert_eq!(OutputFormat::from_name(format.as_str()), Some(format));
        }
        assert!(OutputFormat::from_name("xml").is_none());
    }

    #[test]
    fn output_format_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&OutputFormat::Csv).unwrap(),
            "\"csv\""
        );
        let parsed: OutputFormat = serde_json::from_str("\"table\"").unwrap();
        assert_eq!(parsed, OutputFormat::Table);
    }

    #[test]
    fn lookup_cell_renders_common_shapes() {
        let item = json!({
            "name": "Alice",
            "tags": ["vip", "lead"],
            "value": 250.5,
            "active": true,
            "missing": null,
        });
        assert_eq!(lookup_cell(&item, "name"), "Alice");
        assert_eq!(lookup_cell(&item, "tags"), "vip, lead");
        assert_eq!(lookup_cell(&item, "value"), "250.5");
        assert_eq!(lookup_cell(&item, "active"), "true");
        assert_eq!(lookup_cell(&item, "missing"), "");
        assert_eq!(lookup_cell(&item, "absent"), "");
    }

    #[test]
    fn item_id_falls_back_to_underscore_id() {
        assert_eq!(item_id(&json!({"id": "a-1"})).as_deref(), Some("a-1"));
        assert_eq!(item_id(&json!({"_id": "b-2"})).as_deref(), Some("b-2"));
        assert!(item_id(&json!({"name": "x"})).is_none());
    }

    #[test]
    fn escape_csv_quotes_when_needed() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
    }
}
