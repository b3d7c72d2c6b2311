//! Browser backends for Shaderlink
//!
//! On `wasm32` this crate provides [`web::WebGlHost`], a [`GlHost`] over
//! `web-sys`, the `ShaderLinker` class exported to JavaScript and an `init`
//! function applications call from their own start hook. With the
//! `host-imports` feature it also links against a raw `env.gl_*` import
//! table and exports a C-ABI `createShaderProgram`.
//!
//! [`GlHost`]: shaderlink_core::GlHost

pub mod bounded;
pub mod export;
pub mod table;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(all(target_arch = "wasm32", feature = "host-imports"))]
pub mod imports;

pub use export::create_program_from_c;
pub use table::ObjectTable;

#[cfg(target_arch = "wasm32")]
pub use web::{ShaderLinker, WebGlHost};

#[cfg(all(target_arch = "wasm32", feature = "host-imports"))]
pub use imports::ImportedHost;
