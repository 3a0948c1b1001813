//! # TV Schedule CRUD
//!
//! Create, list, update and delete TV schedule entries stored in DynamoDB.
//!
//! The interesting piece is [`dynamodb::UpdateExpression`], which turns an
//! arbitrary field mapping into the `SET` clause and placeholder maps a
//! partial `UpdateItem` needs. The [`api`] adapters validate HTTP-style
//! events, call the [`store::ScheduleStore`] and classify failures into
//! client and server errors.

pub mod api;
pub mod config;
pub mod dynamodb;
pub mod error;
pub mod logging;
pub mod record;
pub mod store;
pub mod utils;
