//! HTTP request handlers.

pub mod accounts;
pub mod admin;
pub mod auth;
pub mod catalogs;
pub mod committees;
pub mod documents;
pub mod evaluations;
pub mod health;
pub mod organization;
pub mod rank_histories;
pub mod ranks;
