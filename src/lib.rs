//! Bookshelf application library
//!
//! Wires the application modules into the kernel registry and runs the HTTP
//! server around them.

pub mod modules;

use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Build a registry with every application module registered
pub fn build_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Run the full module lifecycle around the HTTP server.
///
/// Modules are stopped once the server has shut down, even when serving
/// failed.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry();
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, &settings).await;
    let stopped = registry.stop_modules().await;

    served?;
    stopped
}
