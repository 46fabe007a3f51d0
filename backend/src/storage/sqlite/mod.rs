//! # SQLite Storage
//!
//! Durable storage backend built on `sqlx`. `DbConnection` implements every
//! storage trait; the trait impls are split per table below.

pub mod db;

mod child_repository;
mod contact_repository;
mod match_repository;
mod parent_repository;
mod registration_repository;

pub use db::{DbConnection, DEFAULT_DATABASE_URL};
