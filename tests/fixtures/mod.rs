//! Shared prompts and canned image references for queue and API tests
#![allow(dead_code)]

/// 1x1 transparent PNG, base64-encoded.
pub const PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub const FOX: &str = "A red fox";
pub const WHALE: &str = "A blue whale";

pub const BATCH: &[&str] = &[
    "A cyberpunk cat in neon rain",
    "A peaceful zen garden on Mars",
    "Portrait of a robot mechanic, oil painting style",
    "A lighthouse in a thunderstorm",
    "A bowl of ramen, studio lighting",
];

pub fn png_data_uri() -> String {
    format!("data:image/png;base64,{}", PNG_BASE64)
}

pub fn prompts(items: &[&str]) -> Vec<String> {
    items.iter().map(|p| p.to_string()).collect()
}
