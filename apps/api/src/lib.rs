//! Roster API Library
//!
//! Core of a user and company management service: domain entities,
//! repository contracts with PostgreSQL and in-memory adapters, password
//! hashing, pagination and the usecases that tie them together.

pub mod auth;
pub mod domain;
pub mod infrastructure;
pub mod pagination;
pub mod usecases;
