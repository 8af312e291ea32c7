pub mod auth;
pub mod config;
pub mod document_store;
pub mod domain;
pub mod fallback;
pub mod mailchimp_client;
pub mod routes;
pub mod startup;
pub mod telemetry;
