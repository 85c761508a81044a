//! Row query builder
//!
//! Renders filter predicates, ordering, and range pagination as the
//! query parameters the hosted backend's REST surface expects
//! (`col=eq.value`, `col=in.(a,b)`, `order=col.desc`, `limit`/`offset`).

/// A single filter predicate on one column
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, String),
    Neq(String, String),
    In(String, Vec<String>),
    Ilike(String, String),
}

/// Query over one table: filters, optional ordering, optional range
#[derive(Debug, Clone, Default)]
pub struct Query {
    select: Option<String>,
    filters: Vec<Filter>,
    order: Option<(String, bool)>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict returned columns (defaults to `*`)
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq(column.into(), value.into()));
        self
    }

    pub fn neq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Neq(column.into(), value.into()));
        self
    }

    pub fn within(mut self, column: impl Into<String>, values: Vec<String>) -> Self {
        self.filters.push(Filter::In(column.into(), values));
        self
    }

    pub fn ilike(mut self, column: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.filters.push(Filter::Ilike(column.into(), pattern.into()));
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some((column.into(), true));
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some((column.into(), false));
        self
    }

    /// Range-based pagination
    pub fn range(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    /// Filters of this query (used by in-memory implementations)
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Ordering of this query: (column, ascending)
    pub fn ordering(&self) -> Option<(&str, bool)> {
        self.order.as_ref().map(|(c, asc)| (c.as_str(), *asc))
    }

    /// Pagination of this query: (offset, limit)
    pub fn pagination(&self) -> (Option<usize>, Option<usize>) {
        (self.offset, self.limit)
    }

    /// Render as query-string pairs
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        params.push((
            "select".to_string(),
            self.select.clone().unwrap_or_else(|| "*".to_string()),
        ));
        for filter in &self.filters {
            let (column, value) = match filter {
                Filter::Eq(c, v) => (c, format!("eq.{}", v)),
                Filter::Neq(c, v) => (c, format!("neq.{}", v)),
                Filter::In(c, vs) => (c, format!("in.({})", vs.join(","))),
                Filter::Ilike(c, p) => (c, format!("ilike.{}", p)),
            };
            params.push((column.clone(), value));
        }
        if let Some((column, ascending)) = &self.order {
            let direction = if *ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", column, direction)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        params
    }
}
