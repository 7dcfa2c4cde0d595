// config.rs — tunables, loaded once from the embedded config.json.
use std::sync::OnceLock;
use serde::Deserialize;

/// Weights used to synthesize ankles and wrists for 14-joint skeletons.
///
/// Picked by eye for adult proportions; they are not derived from anything.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlendWeights {
    #[serde(default = "default_ankle_foot")]  pub ankle_foot: f32,
    #[serde(default = "default_ankle_knee")]  pub ankle_knee: f32,
    #[serde(default = "default_wrist_elbow")] pub wrist_elbow: f32,
    #[serde(default = "default_wrist_hand")]  pub wrist_hand: f32,
}

fn default_ankle_foot()  -> f32 { 0.7 }
fn default_ankle_knee()  -> f32 { 0.3 }
fn default_wrist_elbow() -> f32 { 0.3 }
fn default_wrist_hand()  -> f32 { 0.7 }

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            ankle_foot: default_ankle_foot(), ankle_knee: default_ankle_knee(),
            wrist_elbow: default_wrist_elbow(), wrist_hand: default_wrist_hand(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub blend: BlendWeights,
    /// Ingestion stops after this many poses.
    #[serde(default = "default_max_poses")]
    pub max_poses: usize,
    /// Unindented database lines starting with this are skipped.
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
    /// Closest two figures' joints may come after a drag before it is undone.
    #[serde(default = "default_min_separation")]
    pub min_separation: f32,
}

fn default_max_poses()      -> usize  { 500 }
fn default_tag_prefix()     -> String { "#".to_string() }
fn default_min_separation() -> f32    { 0.05 }

impl Default for Config {
    fn default() -> Self {
        Self {
            blend: BlendWeights::default(),
            max_poses: default_max_poses(),
            tag_prefix: default_tag_prefix(),
            min_separation: default_min_separation(),
        }
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn get() -> &'static Config {
    CONFIG.get_or_init(|| crate::json_loader::load("config.json").unwrap_or_else(|e| {
        tracing::warn!("{e}; using built-in defaults");
        Config::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "max_poses": 12, "blend": { "ankle_foot": 0.6 } }"#).unwrap();
        assert_eq!(cfg.max_poses, 12);
        assert_eq!(cfg.blend.ankle_foot, 0.6);
        assert_eq!(cfg.blend.ankle_knee, 0.3);
        assert_eq!(cfg.tag_prefix, "#");
    }

    #[test]
    fn embedded_config_matches_defaults() {
        assert_eq!(get(), &Config::default());
    }
}
