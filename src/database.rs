// database.rs — turning pose sources into a collection.
//
// Database text format: an unindented line names a pose, the indented lines after it
// are its base-62 body. A line starting with the tag prefix is skipped.
//
//     Pose name
//         abcd...
//         efgh...
//     # tag line
//     Next pose
//         ...

use crate::builtin;
use crate::codec;
use crate::config::Config;
use crate::error::Result;
use crate::pose::{Pose, PoseCollection, PoseRecord};

/// Where a loaded collection came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier { Precomputed, Database, Builtin }

/// Text already fetched by the caller; `None` means that source was unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sources<'a> {
    pub precomputed: Option<&'a str>,
    pub database: Option<&'a str>,
}

/// A named, still-encoded pose body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub name: String,
    pub body: String,
}

/// Splits database text into named blocks. No decoding happens here.
pub fn blocks(text: &str, tag_prefix: &str) -> Vec<Block> {
    let mut out = Vec::new();
    let mut current: Option<Block> = None;
    for line in text.lines() {
        if line.trim().is_empty() { continue; }
        if line.starts_with(char::is_whitespace) {
            match current.as_mut() {
                Some(block) => block.body.push_str(line.trim()),
                None => tracing::debug!(line, "body line without a pose name"),
            }
            continue;
        }
        out.extend(current.take());
        if tag_prefix.is_empty() || !line.starts_with(tag_prefix) {
            current = Some(Block { name: line.trim().to_string(), body: String::new() });
        }
    }
    out.extend(current);
    out
}

/// Decodes every block; broken ones are logged and skipped.
pub fn parse_database(text: &str, cfg: &Config) -> PoseCollection {
    let mut poses = PoseCollection::new();
    for block in blocks(text, &cfg.tag_prefix) {
        if poses.len() >= cfg.max_poses {
            tracing::warn!(max = cfg.max_poses, "pose limit reached, ignoring the rest of the database");
            break;
        }
        match codec::decode(&block.body).map_err(Into::into).and_then(|raw| Pose::from_raw(&block.name, &raw)) {
            Ok(pose) => poses.push(pose, None),
            Err(e) => tracing::warn!(pose = %block.name, "skipping pose: {e}"),
        }
    }
    poses
}

/// Parses a precomputed collection (JSON array of records). Records that fail to parse
/// or validate are skipped; only a document that is not a JSON array is an error.
pub fn parse_precomputed(json: &str, cfg: &Config) -> Result<PoseCollection> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut poses = PoseCollection::new();
    for (i, v) in values.into_iter().enumerate() {
        if poses.len() >= cfg.max_poses {
            tracing::warn!(max = cfg.max_poses, "pose limit reached, ignoring remaining records");
            break;
        }
        let parsed = serde_json::from_value::<PoseRecord>(v)
            .map_err(Into::into)
            .and_then(|rec| Pose::from_record(rec, &cfg.blend));
        match parsed {
            Ok((pose, features)) => poses.push(pose, features),
            Err(e) => tracing::warn!(record = i, "skipping precomputed pose: {e}"),
        }
    }
    Ok(poses)
}

/// Precomputed collection, then database text, then the hand-authored poses.
/// Each tier either produces at least one pose or hands over to the next.
pub fn load_collection(sources: Sources<'_>, cfg: &Config) -> (PoseCollection, Tier) {
    if let Some(json) = sources.precomputed {
        match parse_precomputed(json, cfg) {
            Ok(c) if !c.is_empty() => {
                tracing::info!(poses = c.len(), "loaded precomputed poses");
                return (c, Tier::Precomputed);
            }
            Ok(_) => tracing::warn!("precomputed collection is empty"),
            Err(e) => tracing::warn!("precomputed collection unusable: {e}"),
        }
    }
    if let Some(text) = sources.database {
        let c = parse_database(text, cfg);
        if !c.is_empty() {
            tracing::info!(poses = c.len(), "decoded pose database");
            return (c, Tier::Database);
        }
        tracing::warn!("pose database produced no poses");
    }
    let c = builtin::collection();
    tracing::info!(poses = c.len(), "using built-in poses");
    (c, Tier::Builtin)
}
