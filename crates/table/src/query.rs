//! Table query state and its wire serialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::ResourceDescriptor;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Parameter names the table itself sends; filters may not reuse them.
pub const RESERVED_PARAMS: [&str; 7] = [
    "page",
    "limit",
    "search",
    "sort",
    "order",
    "searchFields",
    "populate",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

/// Single-column sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub dir: SortDir,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Desc,
        }
    }
}

/// Query state owned by one table controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableQuery {
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    pub sort: Option<Sort>,
    pub search: String,
    pub filters: BTreeMap<String, Value>,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            search: String::new(),
            filters: BTreeMap::new(),
        }
    }
}

/// Partial update of a [`TableQuery`].
///
/// An empty `sort_field` clears the sort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPatch {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_field: Option<String>,
    pub sort_dir: Option<SortDir>,
    pub search: Option<String>,
    pub filters: Option<BTreeMap<String, Value>>,
}

impl QueryPatch {
    pub fn is_empty(&self) -> bool {
        self.page.is_none()
            && self.page_size.is_none()
            && self.sort_field.is_none()
            && self.sort_dir.is_none()
            && self.search.is_none()
            && self.filters.is_none()
    }

    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn sort(field: impl Into<String>, dir: SortDir) -> Self {
        Self {
            sort_field: Some(field.into()),
            sort_dir: Some(dir),
            ..Self::default()
        }
    }

    pub fn filters(filters: BTreeMap<String, Value>) -> Self {
        Self {
            filters: Some(filters),
            ..Self::default()
        }
    }
}

impl TableQuery {
    /// Apply `patch` on top of this state.
    ///
    /// Narrowing the result set (search, filters, page size) without naming a
    /// page goes back to page 1.
    pub fn merged(&self, patch: &QueryPatch) -> TableQuery {
        let mut next = self.clone();

        if let Some(size) = patch.page_size {
            next.page_size = size.max(1);
        }
        if let Some(search) = &patch.search {
            next.search = search.trim().to_string();
        }
        if let Some(filters) = &patch.filters {
            next.filters = filters.clone();
        }

        match (&patch.sort_field, patch.sort_dir) {
            (Some(field), _) if field.is_empty() => next.sort = None,
            (Some(field), dir) => {
                let dir = dir.unwrap_or(match &self.sort {
                    Some(current) if current.field == *field => current.dir,
                    _ => SortDir::Asc,
                });
                next.sort = Some(Sort {
                    field: field.clone(),
                    dir,
                });
            }
            (None, Some(dir)) => {
                if let Some(sort) = next.sort.as_mut() {
                    sort.dir = dir;
                }
            }
            (None, None) => {}
        }

        let narrowed = next.search != self.search
            || next.filters != self.filters
            || next.page_size != self.page_size;
        next.page = match patch.page {
            Some(page) => page.max(1),
            None if narrowed => 1,
            None => self.page,
        };

        next
    }

    /// Sort toggle: same field reverses, a new field starts ascending.
    pub fn toggled_sort(&self, field: &str) -> Sort {
        match &self.sort {
            Some(current) if current.field == field => Sort {
                field: field.to_string(),
                dir: current.dir.reversed(),
            },
            _ => Sort::asc(field),
        }
    }

    pub fn page_count(&self, total: u64) -> u32 {
        let size = u64::from(self.page_size.max(1));
        total.div_ceil(size).try_into().unwrap_or(u32::MAX)
    }
}

fn filter_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(filter_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

/// Serialize `query` into the collection's GET parameters.
///
/// `page`, `limit`, then `search`, `sort`, `order`, `searchFields`, `populate`
/// when they carry something, then one pair per filter key. Filters named
/// like one of [`RESERVED_PARAMS`] are dropped.
pub fn query_pairs(descriptor: &ResourceDescriptor, query: &TableQuery) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("page".to_string(), query.page.to_string()),
        ("limit".to_string(), query.page_size.to_string()),
    ];

    if !query.search.is_empty() {
        pairs.push(("search".to_string(), query.search.clone()));
    }
    if let Some(sort) = &query.sort {
        pairs.push(("sort".to_string(), sort.field.clone()));
        pairs.push(("order".to_string(), sort.dir.as_str().to_string()));
    }
    if !query.search.is_empty() && !descriptor.search_fields.is_empty() {
        pairs.push(("searchFields".to_string(), descriptor.search_fields.join(",")));
    }
    if !descriptor.populate.is_empty() {
        pairs.push(("populate".to_string(), descriptor.populate.join(",")));
    }

    for (key, value) in &query.filters {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            tracing::debug!(resource = %descriptor.name, key, "dropping filter on reserved parameter");
            continue;
        }
        if let Some(value) = filter_value(value) {
            pairs.push((key.clone(), value));
        }
    }

    pairs
}

/// Form-urlencoded rendering of [`query_pairs`].
pub fn query_string(descriptor: &ResourceDescriptor, query: &TableQuery) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query_pairs(descriptor, query))
        .finish()
}
