//! PostgREST query builder
//!
//! Filters are encoded as `column=op.value` query parameters. The builder
//! only shapes the request; filtering and ordering happen server side.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::data_api::DataApiClient;
use crate::error::{NeonClientError, Result};

/// A request against one table or view
pub struct QueryBuilder<'a> {
    client: &'a DataApiClient,
    table: String,
    columns: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(client: &'a DataApiClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            columns: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Columns to return, e.g. `"id,title,owner(name)"`
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = Some(columns.split_whitespace().collect::<String>());
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn neq(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "neq", value)
    }

    pub fn gt(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "gt", value)
    }

    pub fn gte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lt(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "lt", value)
    }

    pub fn lte(self, column: &str, value: impl ToString) -> Self {
        self.filter(column, "lte", value)
    }

    /// SQL `LIKE`; `*` may be used in place of `%`
    pub fn like(self, column: &str, pattern: &str) -> Self {
        self.filter(column, "like", pattern)
    }

    pub fn ilike(self, column: &str, pattern: &str) -> Self {
        self.filter(column, "ilike", pattern)
    }

    /// `IS` check against `null`, `true` or `false`
    pub fn is(self, column: &str, value: &str) -> Self {
        self.filter(column, "is", value)
    }

    pub fn in_list<T: ToString>(self, column: &str, values: &[T]) -> Self {
        let list = values
            .iter()
            .map(|v| quote_list_item(&v.to_string()))
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, "in", format!("({})", list))
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order.push(format!("{}.{}", column, direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Query parameters in the order they will be sent
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(columns) = &self.columns {
            pairs.push(("select".to_string(), columns.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            pairs.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }
        pairs
    }

    /// Run a read and return the rows as JSON
    pub async fn execute(self) -> Result<Value> {
        let pairs = self.query_pairs();
        self.client
            .send(Method::GET, &self.table, &pairs, None, false)
            .await
    }

    /// Run a read and deserialize the rows
    pub async fn execute_as<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let rows = self.execute().await?;
        serde_json::from_value(rows).map_err(|e| NeonClientError::Parse(e.to_string()))
    }

    /// Insert one row or an array of rows, returning what was written
    pub async fn insert<B: Serialize>(self, body: &B) -> Result<Value> {
        let body = to_body(body)?;
        let pairs = self.select_only();
        self.client
            .send(Method::POST, &self.table, &pairs, Some(body), true)
            .await
    }

    /// Update rows matching the filters
    pub async fn update<B: Serialize>(self, body: &B) -> Result<Value> {
        let body = to_body(body)?;
        let pairs = self.query_pairs();
        self.client
            .send(Method::PATCH, &self.table, &pairs, Some(body), true)
            .await
    }

    /// Delete rows matching the filters
    pub async fn delete(self) -> Result<Value> {
        let pairs = self.query_pairs();
        self.client
            .send(Method::DELETE, &self.table, &pairs, None, true)
            .await
    }

    fn filter(mut self, column: &str, op: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("{}.{}", op, value.to_string())));
        self
    }

    fn select_only(&self) -> Vec<(String, String)> {
        self.columns
            .iter()
            .map(|c| ("select".to_string(), c.clone()))
            .collect()
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| NeonClientError::Parse(e.to_string()))
}

/// Quote list items that contain PostgREST delimiters
fn quote_list_item(item: &str) -> String {
    if item.contains([',', '(', ')', '"', '\\', ' ']) {
        format!("\"{}\"", item.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        item.to_string()
    }
}
