//! Schema-driven command synthesis for the Studio public API.
//!
//! The API description is fetched at runtime, every eligible operation becomes
//! a [`ir::Command`] in a [`transform::CommandRegistry`], and
//! [`execute::execute`] runs one of them through an authenticated
//! [`client::SessionClient`] and renders the response.

pub mod client;
pub mod config;
pub mod error;
pub mod execute;
pub mod ir;
pub mod parse;
pub mod render;
pub mod transform;
