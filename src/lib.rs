//! Maths practice backend: model-generated problems, deterministic grading.
//!
//! The binary in `main.rs` serves the router; the `practice` binary drives the
//! session controller from a terminal.

pub mod answer;
pub mod client;
pub mod config;
pub mod controller;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod generator;
pub mod logic;
pub mod openai;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod util;
