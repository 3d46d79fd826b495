//! Minimal extension-to-filetype mapping, used to propagate filetype
//! detection onto newly-created diff buffers.
//!
//! Not a full filetype detector -- a real editor host would use its own
//! detection; this is the small built-in table a headless host needs to
//! drive highlighting in tests and demos.

/// Guess an editor filetype name from a file path's extension. Returns
/// `"text"` for unknown or missing extensions.
pub fn detect(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("rs") => "rust",
        Some("py") => "python",
        Some("js") => "javascript",
        Some("ts") => "typescript",
        Some("tsx") => "typescriptreact",
        Some("jsx") => "javascriptreact",
        Some("go") => "go",
        Some("rb") => "ruby",
        Some("java") => "java",
        Some("c") => "c",
        Some("h") => "c",
        Some("cpp") | Some("cc") | Some("cxx") => "cpp",
        Some("hpp") => "cpp",
        Some("sh") | Some("bash") => "sh",
        Some("md") | Some("markdown") => "markdown",
        Some("json") => "json",
        Some("toml") => "toml",
        Some("yaml") | Some("yml") => "yaml",
        Some("lua") => "lua",
        Some("html") => "html",
        Some("css") => "css",
        _ => "text",
    }
}
