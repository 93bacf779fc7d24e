//! `bizdash-table` — remote-backed data tables.
//!
//! A [`TableController`] binds one [`ResourceDescriptor`] to live query state
//! (page, sort, search, filters) and mediates every read and write against the
//! REST collection it describes. Controllers never share state.
//!
//! The HTTP transport is an injected [`RestClient`]; [`HttpRestClient`] is the
//! `reqwest` implementation used in production.

pub mod catalog;
pub mod client;
pub mod controller;
pub mod descriptor;
pub mod error;
pub mod page;
pub mod query;

pub use catalog::Entity;
pub use client::{ClientConfig, HttpRestClient, RestClient};
pub use controller::{FetchOutcome, MutationKind, TableController, TableView};
pub use descriptor::{ColumnSpec, Render, ResourceDescriptor, UpdateMethod};
pub use error::{ConfigError, RemoteError, TableError};
pub use page::{Record, ResultPage};
pub use query::{query_pairs, query_string, QueryPatch, Sort, SortDir, TableQuery, RESERVED_PARAMS};
