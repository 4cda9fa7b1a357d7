//! # Query Builder Module
//!
//! Immutable query descriptions for the read path of generated CRUD handlers.
//!
//! List and read hooks receive a [`QueryBuilder`] in their
//! [`InterceptorContext`](crate::interceptor::InterceptorContext). A hook
//! derives a new builder (for example adding a tenant filter) and returns it;
//! the handler merges it with the query it assembled itself using
//! [`QueryBuilder::merge_with`] and hands the result of
//! [`build`](QueryBuilder::build), [`build_find_one`](QueryBuilder::build_find_one)
//! or [`build_count`](QueryBuilder::build_count) to the data-access layer.
//!
//! ## Output shapes
//!
//! | Method             | Keys                                               |
//! |--------------------|----------------------------------------------------|
//! | `build()`          | `where`, `include`, `orderBy`, `skip`, `take`, `select` |
//! | `build_find_one()` | `where`, `include`, `select`                       |
//! | `build_count()`    | `where`                                            |
//!
//! Anything never set is absent, never an empty collection, so the data
//! layer does not receive "order by nothing" or "select nothing".
//!
//! ## Combining conditions
//!
//! `where_` shallow-merges keys. `and_where`, `or_where` and `not_where` wrap
//! the existing clause in an `AND` / `OR` / `NOT` node; when the current clause
//! is empty the new conditions simply become the clause.

mod builder;

pub use builder::{
    create_query_builder, BuiltQuery, CountQuery, FindOneQuery, Pagination, QueryBuilder,
    QueryMap, SortOrder,
};
