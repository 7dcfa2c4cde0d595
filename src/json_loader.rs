// json_loader.rs
use serde::Deserialize;

// include_str! requires compile-time paths; all assets must be listed here.
fn asset(name: &str) -> Result<&'static str, String> {
    match name {
        "config.json" => Ok(include_str!("../assets/config.json")),
        "poses.json"  => Ok(include_str!("../assets/poses.json")),
        _ => Err(format!("Asset '{name}' not embedded. Add it to json_loader.rs asset() to embed at compile time.")),
    }
}

pub fn load<T: for<'de> Deserialize<'de>>(name: &str) -> Result<T, String> {
    serde_json::from_str(asset(name)?).map_err(|e| format!("Parse error in {name}: {e}"))
}

/// Raw text of an embedded asset, for callers that parse it themselves.
pub fn text(name: &str) -> Result<&'static str, String> { asset(name) }
