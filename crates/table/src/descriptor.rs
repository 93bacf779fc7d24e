//! Static description of a remote collection and how its columns display.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::page::Record;

/// How a cell value is turned into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Render {
    #[default]
    Text,
    Number,
    /// Two decimal places.
    Currency,
    /// Date part of an ISO-8601 timestamp.
    Date,
    /// "Yes" / "No".
    Boolean,
}

impl Render {
    pub fn apply(self, value: &Value) -> String {
        match (self, value) {
            (_, Value::Null) => String::new(),
            (Render::Currency, v) => match as_f64(v) {
                Some(n) => format!("{n:.2}"),
                None => plain(v),
            },
            (Render::Number, v) => match as_f64(v) {
                Some(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
                Some(n) => n.to_string(),
                None => plain(v),
            },
            (Render::Date, Value::String(s)) => s.split('T').next().unwrap_or(s).to_string(),
            (Render::Boolean, Value::Bool(b)) => (if *b { "Yes" } else { "No" }).to_string(),
            (_, v) => plain(v),
        }
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Resolve a dotted path (`branch.name`, `items.0.sku`) inside a record.
pub fn lookup<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// One displayed column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub header: String,
    pub sortable: bool,
    /// Field name sent as `sort=`; defaults to the accessor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
    /// Dotted path to the value in a record.
    pub accessor: String,
    #[serde(default)]
    pub render: Render,
}

impl ColumnSpec {
    pub fn new(header: impl Into<String>, accessor: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            sortable: false,
            sort_key: None,
            accessor: accessor.into(),
            render: Render::Text,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn sort_by(mut self, key: impl Into<String>) -> Self {
        self.sortable = true;
        self.sort_key = Some(key.into());
        self
    }

    pub fn render(mut self, render: Render) -> Self {
        self.render = render;
        self
    }

    pub fn sort_field(&self) -> &str {
        self.sort_key.as_deref().unwrap_or(&self.accessor)
    }

    pub fn value<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        lookup(record, &self.accessor)
    }

    /// Display text for this column of `record`; missing values render empty.
    pub fn cell(&self, record: &Record) -> String {
        self.value(record)
            .map(|v| self.render.apply(v))
            .unwrap_or_default()
    }
}

/// HTTP verb used for updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UpdateMethod {
    #[default]
    Put,
    Patch,
}

/// Binds a table to a REST collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,
    /// Collection path, e.g. `/branches`.
    pub base_path: String,
    pub columns: Vec<ColumnSpec>,
    /// Field keys the backend matches the search term against.
    pub search_fields: Vec<String>,
    /// Related sub-resources the backend should embed.
    pub populate: Vec<String>,
    pub id_field: String,
    pub update_method: UpdateMethod,
    /// Aggregate endpoints accept reads only.
    #[serde(default)]
    pub read_only: bool,
}

impl ResourceDescriptor {
    pub fn new(name: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
            columns: Vec::new(),
            search_fields: Vec::new(),
            populate: Vec::new(),
            id_field: "_id".to_string(),
            update_method: UpdateMethod::Put,
            read_only: false,
        }
    }

    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    pub fn search<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn populate<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.populate = relations.into_iter().map(Into::into).collect();
        self
    }

    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    pub fn update_method(mut self, method: UpdateMethod) -> Self {
        self.update_method = method;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// The sortable column whose sort field is `field`.
    pub fn sortable_column(&self, field: &str) -> Option<&ColumnSpec> {
        self.columns
            .iter()
            .find(|c| c.sortable && c.sort_field() == field)
    }

    /// `base_path + "/" + id`, with `id` encoded as a single path segment.
    ///
    /// `None` for ids that cannot address a record: empty, `.` and `..`.
    pub fn record_path(&self, id: &str) -> Option<String> {
        if matches!(id, "" | "." | "..") {
            return None;
        }
        Some(format!(
            "{}/{}",
            self.base_path.trim_end_matches('/'),
            encode_segment(id)
        ))
    }

    pub fn record_id(&self, record: &Record) -> Option<String> {
        match lookup(record, &self.id_field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Percent-encode everything outside the unreserved set, so `/`, `?` and `#`
/// stay inside the segment.
fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte))
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn branches() -> ResourceDescriptor {
        ResourceDescriptor::new("branches", "/branches")
            .column(ColumnSpec::new("Name", "name").sortable())
            .column(ColumnSpec::new("Manager", "manager.name").sort_by("manager"))
            .column(ColumnSpec::new("Opened", "openedAt").render(Render::Date))
            .search(["name", "code"])
            .populate(["manager"])
    }

    #[test]
    fn lookup_follows_nested_objects_and_arrays() {
        let record = json!({ "manager": { "name": "Ada" }, "tags": ["a", "b"] });
        assert_eq!(lookup(&record, "manager.name"), Some(&json!("Ada")));
        assert_eq!(lookup(&record, "tags.1"), Some(&json!("b")));
        assert_eq!(lookup(&record, "manager.email"), None);
        assert_eq!(lookup(&record, "tags.x"), None);
    }

    #[test]
    fn cells_render_by_kind() {
        let record = json!({
            "total": 12.5,
            "qty": 3,
            "paid": true,
            "createdAt": "2024-03-01T10:00:00Z",
            "note": null,
        });
        assert_eq!(ColumnSpec::new("T", "total").render(Render::Currency).cell(&record), "12.50");
        assert_eq!(ColumnSpec::new("Q", "qty").render(Render::Number).cell(&record), "3");
        assert_eq!(ColumnSpec::new("P", "paid").render(Render::Boolean).cell(&record), "Yes");
        assert_eq!(ColumnSpec::new("D", "createdAt").render(Render::Date).cell(&record), "2024-03-01");
        assert_eq!(ColumnSpec::new("N", "note").cell(&record), "");
        assert_eq!(ColumnSpec::new("M", "missing").cell(&record), "");
    }

    #[test]
    fn sort_field_defaults_to_accessor() {
        let descriptor = branches();
        assert!(descriptor.sortable_column("name").is_some());
        assert!(descriptor.sortable_column("manager").is_some());
        assert!(descriptor.sortable_column("manager.name").is_none());
        assert!(descriptor.sortable_column("openedAt").is_none());
    }

    #[test]
    fn record_paths_and_ids() {
        let descriptor = branches();
        assert_eq!(descriptor.record_path("42").as_deref(), Some("/branches/42"));
        assert_eq!(descriptor.record_id(&json!({ "_id": "abc" })), Some("abc".to_string()));
        assert_eq!(descriptor.record_id(&json!({ "_id": 7 })), Some("7".to_string()));
        assert_eq!(descriptor.record_id(&json!({ "id": 7 })), None);
    }

    #[test]
    fn record_ids_stay_inside_one_path_segment() {
        let descriptor = branches();
        assert_eq!(descriptor.record_path("a/b").as_deref(), Some("/branches/a%2Fb"));
        assert_eq!(descriptor.record_path("a?b#c").as_deref(), Some("/branches/a%3Fb%23c"));
        assert_eq!(descriptor.record_path("../roles").as_deref(), Some("/branches/..%2Froles"));
        assert_eq!(descriptor.record_path("x y").as_deref(), Some("/branches/x%20y"));
        assert_eq!(descriptor.record_path("v1.2_a-b~").as_deref(), Some("/branches/v1.2_a-b~"));
        assert_eq!(descriptor.record_path(".."), None);
        assert_eq!(descriptor.record_path("."), None);
        assert_eq!(descriptor.record_path(""), None);
    }
}
