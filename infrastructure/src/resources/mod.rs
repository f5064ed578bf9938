//! Text resource loading (system prompt, external document).

mod loader;

pub use loader::LocalResourceLoader;
