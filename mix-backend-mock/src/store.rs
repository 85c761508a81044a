//! In-memory row store
//!
//! Rows are plain JSON objects keyed by table name. Filter evaluation
//! stringifies scalar columns so `eq.5` matches both `5` and `"5"`,
//! mirroring how the wire protocol renders every predicate as text.

use mix_client::{Filter, Query};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct RowStore {
    tables: HashMap<String, Vec<Value>>,
    next_serial: i64,
}

/// Scalar column rendered as predicate text
fn column_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        _ => None,
    }
}

fn matches_filter(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(column, value) => column_text(row, column).as_deref() == Some(value.as_str()),
        Filter::Neq(column, value) => column_text(row, column).as_deref() != Some(value.as_str()),
        Filter::In(column, values) => match column_text(row, column) {
            Some(text) => values.iter().any(|v| v == &text),
            None => false,
        },
        Filter::Ilike(column, pattern) => match column_text(row, column) {
            Some(text) => ilike(&text, pattern),
            None => false,
        },
    }
}

/// Case-insensitive match with `%` wildcards
fn ilike(text: &str, pattern: &str) -> bool {
    let text = text.to_lowercase();
    let pattern = pattern.to_lowercase();
    let parts: Vec<&str> = pattern.split('%').collect();

    let mut position = 0;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        match text[position..].find(part) {
            Some(found) => {
                // A leading literal (no wildcard before it) must anchor
                // at the start
                if i == 0 && found != 0 {
                    return false;
                }
                position += found + part.len();
            }
            None => return false,
        }
    }
    // A trailing literal must anchor at the end
    if let Some(last) = parts.last() {
        if !last.is_empty() && !text.ends_with(&last.to_lowercase()) {
            return false;
        }
    }
    true
}

fn compare_columns(a: &Value, b: &Value, column: &str) -> Ordering {
    match (a.get(column), b.get(column)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

impl RowStore {
    pub fn seed(&mut self, table: &str, rows: Vec<Value>) {
        self.tables.entry(table.to_string()).or_default().extend(rows);
    }

    pub fn all(&self, table: &str) -> Vec<Value> {
        self.tables.get(table).cloned().unwrap_or_default()
    }

    pub fn select(&self, table: &str, query: &Query) -> Vec<Value> {
        let mut rows: Vec<Value> = self
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters().iter().all(|f| matches_filter(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((column, ascending)) = query.ordering() {
            rows.sort_by(|a, b| {
                let ord = compare_columns(a, b, column);
                if ascending { ord } else { ord.reverse() }
            });
        }

        let (offset, limit) = query.pagination();
        if let Some(offset) = offset {
            rows = rows.into_iter().skip(offset).collect();
        }
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        rows
    }

    pub fn insert(&mut self, table: &str, mut row: Value) -> Value {
        if let Some(object) = row.as_object_mut() {
            if !object.contains_key("id") {
                // pedido_items uses a serial key, every other table uuid
                let id = if table == "pedido_items" {
                    self.next_serial += 1;
                    Value::from(self.next_serial)
                } else {
                    Value::String(uuid::Uuid::new_v4().to_string())
                };
                object.insert("id".into(), id);
            }
            if !object.contains_key("created_at") {
                object.insert(
                    "created_at".into(),
                    Value::String(chrono::Utc::now().to_rfc3339()),
                );
            }
        }
        self.tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        row
    }

    /// Patch rows matching the query; returns the patched rows
    pub fn update(&mut self, table: &str, query: &Query, patch: &Value) -> Vec<Value> {
        let mut updated = Vec::new();
        if let Some(rows) = self.tables.get_mut(table) {
            for row in rows.iter_mut() {
                if query.filters().iter().all(|f| matches_filter(row, f)) {
                    if let (Some(object), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                        for (key, value) in fields {
                            object.insert(key.clone(), value.clone());
                        }
                    }
                    updated.push(row.clone());
                }
            }
        }
        updated
    }

    pub fn delete(&mut self, table: &str, query: &Query) -> usize {
        let Some(rows) = self.tables.get_mut(table) else {
            return 0;
        };
        let before = rows.len();
        rows.retain(|row| !query.filters().iter().all(|f| matches_filter(row, f)));
        before - rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with_products() -> RowStore {
        let mut store = RowStore::default();
        store.seed(
            "produtos",
            vec![
                json!({"id": "p1", "name": "Caneca", "stock": 5}),
                json!({"id": "p2", "name": "Camiseta", "stock": 0}),
                json!({"id": "p3", "name": "Boné", "stock": 12}),
            ],
        );
        store
    }

    #[test]
    fn test_eq_filter_matches_numbers_as_text() {
        let store = store_with_products();
        let rows = store.select("produtos", &Query::new().eq("stock", "5"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "p1");
    }

    #[test]
    fn test_in_filter() {
        let store = store_with_products();
        let rows = store.select(
            "produtos",
            &Query::new().within("id", vec!["p1".into(), "p3".into()]),
        );
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_order_and_range() {
        let store = store_with_products();
        let rows = store.select("produtos", &Query::new().order_asc("name").range(1, 1));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Camiseta");
    }

    #[test]
    fn test_insert_assigns_id_and_created_at() {
        let mut store = RowStore::default();
        let row = store.insert("pedidos", json!({"total_price": 10.0}));
        assert!(row["id"].is_string());
        assert!(row["created_at"].is_string());
    }

    #[test]
    fn test_conditional_update_returns_matched_rows() {
        let mut store = RowStore::default();
        store.seed("pedidos", vec![json!({"id": "o1", "status": "Pendente"})]);

        let hit = store.update(
            "pedidos",
            &Query::new().eq("id", "o1").eq("status", "Pendente"),
            &json!({"status": "Cancelado"}),
        );
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0]["status"], "Cancelado");

        // Second attempt: the status predicate no longer matches
        let miss = store.update(
            "pedidos",
            &Query::new().eq("id", "o1").eq("status", "Pendente"),
            &json!({"status": "Cancelado"}),
        );
        assert!(miss.is_empty());
    }

    #[test]
    fn test_ilike() {
        assert!(ilike("Caneca Azul", "%azul%"));
        assert!(ilike("Caneca Azul", "caneca%"));
        assert!(!ilike("Caneca Azul", "azul%"));
        assert!(!ilike("Caneca Azul", "%verde%"));
    }
}
