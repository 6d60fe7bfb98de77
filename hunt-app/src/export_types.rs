use anyhow::{Context, Result};
use hunt_app_lib::mk_specta;
use specta_typescript::Typescript;

/// Where the bindings go when no path is given
const DEFAULT_BINDINGS_PATH: &str = "ui/bindings.ts";

const BINDINGS_HEADER: &str = "// Generated by export-types from the hunt-app commands and events, do not edit";

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BINDINGS_PATH.to_string());

    let mut lang = Typescript::new();
    lang.header = BINDINGS_HEADER.into();

    mk_specta()
        .export(lang, &path)
        .with_context(|| format!("Couldn't write hunt bindings to {path}"))?;

    println!("Hunt bindings written to {path}");
    Ok(())
}
