use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON object used for `where`, `include` and `select` clauses.
pub type QueryMap = Map<String, Value>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// 1-indexed page request. Not validated: page 0 behaves like page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

/// Query description for list reads, as accepted by the data-access layer.
///
/// Pieces that were never set are `None` and omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltQuery {
    #[serde(rename = "where", default)]
    pub where_clause: QueryMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<QueryMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<QueryMap>,
}

/// Single-record fetch: no ordering or pagination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOneQuery {
    #[serde(rename = "where", default)]
    pub where_clause: QueryMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<QueryMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<QueryMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountQuery {
    #[serde(rename = "where", default)]
    pub where_clause: QueryMap,
}

/// Immutable builder for read-path queries.
///
/// Every method takes `&self` and returns a new builder, so a builder handed
/// to a hook can be extended without affecting the caller's copy, and shared
/// across requests without synchronization.
///
/// ```
/// use msgen::query::{create_query_builder, Pagination};
/// use serde_json::json;
///
/// let base = create_query_builder("Employee", None);
/// let active = base
///     .where_(json!({ "status": "active" }))
///     .order_by("lastName")
///     .paginate(Pagination { page: 2, page_size: 10 });
///
/// let query = active.build();
/// assert_eq!(query.skip, Some(10));
/// assert!(base.build().where_clause.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    model_name: Arc<str>,
    where_clause: QueryMap,
    include: Option<QueryMap>,
    order_by: Vec<Value>,
    skip: Option<u64>,
    take: Option<u64>,
    select: Option<QueryMap>,
}

/// Start a builder for `model_name`, optionally seeded from an existing query.
#[must_use]
pub fn create_query_builder(model_name: &str, initial: Option<BuiltQuery>) -> QueryBuilder {
    match initial {
        Some(query) => QueryBuilder::from_query(model_name, query),
        None => QueryBuilder::new(model_name),
    }
}

fn into_map(value: Value) -> QueryMap {
    match value {
        Value::Object(map) => map,
        Value::Null => QueryMap::new(),
        other => {
            tracing::debug!(value = %other, "ignoring non-object query clause");
            QueryMap::new()
        }
    }
}

fn merge_optional(ours: Option<&QueryMap>, theirs: Option<&QueryMap>) -> Option<QueryMap> {
    if ours.is_none() && theirs.is_none() {
        return None;
    }
    let mut merged = theirs.cloned().unwrap_or_default();
    merged.extend(ours.cloned().unwrap_or_default());
    Some(merged)
}

fn merge_into(base: Option<&QueryMap>, overlay: QueryMap) -> QueryMap {
    let mut merged = base.cloned().unwrap_or_default();
    merged.extend(overlay);
    merged
}

impl QueryBuilder {
    #[must_use]
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: Arc::from(model_name),
            where_clause: QueryMap::new(),
            include: None,
            order_by: Vec::new(),
            skip: None,
            take: None,
            select: None,
        }
    }

    #[must_use]
    pub fn from_query(model_name: &str, query: BuiltQuery) -> Self {
        Self {
            model_name: Arc::from(model_name),
            where_clause: query.where_clause,
            include: query.include,
            order_by: query.order_by.unwrap_or_default(),
            skip: query.skip,
            take: query.take,
            select: query.select,
        }
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Shallow-merge `conditions` into the current `where`; later keys win.
    #[must_use]
    pub fn where_(&self, conditions: Value) -> Self {
        let mut next = self.clone();
        next.where_clause.extend(into_map(conditions));
        next
    }

    /// Require both the current `where` and `conditions`.
    #[must_use]
    pub fn and_where(&self, conditions: Value) -> Self {
        self.combine("AND", into_map(conditions))
    }

    /// Accept rows matching either the current `where` or `conditions`.
    #[must_use]
    pub fn or_where(&self, conditions: Value) -> Self {
        self.combine("OR", into_map(conditions))
    }

    /// Exclude rows matching `conditions`.
    #[must_use]
    pub fn not_where(&self, conditions: Value) -> Self {
        let mut negated = QueryMap::new();
        negated.insert("NOT".to_string(), Value::Object(into_map(conditions)));
        if self.where_clause.is_empty() {
            let mut next = self.clone();
            next.where_clause = negated;
            return next;
        }
        self.combine("AND", negated)
    }

    // An empty `where` is replaced outright rather than wrapped.
    fn combine(&self, operator: &str, conditions: QueryMap) -> Self {
        let mut next = self.clone();
        if conditions.is_empty() {
            return next;
        }
        next.where_clause = if self.where_clause.is_empty() {
            conditions
        } else {
            let current = Value::Object(self.where_clause.clone());
            let mut wrapped = QueryMap::new();
            wrapped.insert(
                operator.to_string(),
                json!([current, Value::Object(conditions)]),
            );
            wrapped
        };
        next
    }

    /// Shallow-merge relations to load alongside each record.
    #[must_use]
    pub fn include(&self, relations: Value) -> Self {
        let mut next = self.clone();
        next.include = Some(merge_into(self.include.as_ref(), into_map(relations)));
        next
    }

    /// Append an ascending sort on `field`.
    #[must_use]
    pub fn order_by(&self, field: &str) -> Self {
        self.order_by_with(field, SortOrder::Asc)
    }

    #[must_use]
    pub fn order_by_with(&self, field: &str, order: SortOrder) -> Self {
        let mut next = self.clone();
        let mut entry = QueryMap::new();
        entry.insert(field.to_string(), Value::from(order.as_str()));
        next.order_by.push(Value::Object(entry));
        next
    }

    /// `skip = (page - 1) * page_size`, `take = page_size`.
    #[must_use]
    pub fn paginate(&self, pagination: Pagination) -> Self {
        let mut next = self.clone();
        next.skip = Some(
            pagination
                .page
                .saturating_sub(1)
                .saturating_mul(pagination.page_size),
        );
        next.take = Some(pagination.page_size);
        next
    }

    #[must_use]
    pub fn skip(&self, count: u64) -> Self {
        let mut next = self.clone();
        next.skip = Some(count);
        next
    }

    #[must_use]
    pub fn take(&self, count: u64) -> Self {
        let mut next = self.clone();
        next.take = Some(count);
        next
    }

    /// Shallow-merge fields to project.
    #[must_use]
    pub fn select(&self, fields: Value) -> Self {
        let mut next = self.clone();
        next.select = Some(merge_into(self.select.as_ref(), into_map(fields)));
        next
    }

    /// Combine this builder with a query the caller already assembled.
    ///
    /// `where`, `include` and `select` merge with this builder's keys taking
    /// precedence. `skip`/`take` fall back to `existing` only when unset here.
    /// `existing`'s ordering entries come first.
    #[must_use]
    pub fn merge_with(&self, existing: &BuiltQuery) -> Self {
        let mut where_clause = existing.where_clause.clone();
        where_clause.extend(self.where_clause.clone());

        let mut order_by = existing.order_by.clone().unwrap_or_default();
        order_by.extend(self.order_by.iter().cloned());

        Self {
            model_name: Arc::clone(&self.model_name),
            where_clause,
            include: merge_optional(self.include.as_ref(), existing.include.as_ref()),
            order_by,
            skip: self.skip.or(existing.skip),
            take: self.take.or(existing.take),
            select: merge_optional(self.select.as_ref(), existing.select.as_ref()),
        }
    }

    #[must_use]
    pub fn build(&self) -> BuiltQuery {
        BuiltQuery {
            where_clause: self.where_clause.clone(),
            include: self.include.clone(),
            order_by: (!self.order_by.is_empty()).then(|| self.order_by.clone()),
            skip: self.skip,
            take: self.take,
            select: self.select.clone(),
        }
    }

    #[must_use]
    pub fn build_find_one(&self) -> FindOneQuery {
        FindOneQuery {
            where_clause: self.where_clause.clone(),
            include: self.include.clone(),
            select: self.select.clone(),
        }
    }

    #[must_use]
    pub fn build_count(&self) -> CountQuery {
        CountQuery {
            where_clause: self.where_clause.clone(),
        }
    }
}

impl BuiltQuery {
    /// The query as the JSON value lifecycle hooks receive for list stages.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
