//! YAML metadata blocks: `---` ... `---` (or `...`)
//!
//! A document may carry several blocks. Each is parsed on its own and the
//! results are merged in document order, later keys overwriting earlier ones.

use super::fences::{FenceState, FenceTracker};
use mddocs_core::{Error, LineRange, Result, YamlMetadata};

/// Locate every closed YAML block in `lines`. Code fences are respected, so a
/// `---` inside a code block never opens a YAML block.
pub fn find_yaml_blocks<S: AsRef<str>>(lines: &[S]) -> Vec<LineRange> {
    let mut fences = FenceTracker::new();
    let mut blocks = Vec::new();
    let mut open_at = None;

    for (idx, line) in lines.iter().enumerate() {
        let before = fences.state();
        fences.in_block(line.as_ref());
        match (before, fences.state()) {
            (FenceState::Outside, FenceState::InYaml) => open_at = Some(idx),
            (FenceState::InYaml, FenceState::Outside) => {
                if let Some(start) = open_at.take() {
                    blocks.push(LineRange { start, end: idx });
                }
            }
            _ => {}
        }
    }

    blocks
}

/// Parse and merge every YAML block in `lines`.
///
/// Blocks that are not mappings are skipped. Malformed YAML is a
/// [`Error::MalformedYaml`] carrying the block's opening line; the file is
/// left for the caller to fill in.
pub fn extract_yaml<S: AsRef<str>>(lines: &[S]) -> Result<YamlMetadata> {
    let mut metadata = YamlMetadata::default();

    for range in find_yaml_blocks(lines) {
        let body = lines[range.start + 1..range.end]
            .iter()
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        metadata.blocks.push(range);

        if body.trim().is_empty() {
            continue;
        }

        let value: serde_yaml::Value = serde_yaml::from_str(&body)
            .map_err(|e| Error::malformed_yaml("", range.start, e.to_string()))?;

        match serde_json::to_value(&value) {
            Ok(serde_json::Value::Object(map)) => metadata.data.extend(map),
            Ok(_) => log::debug!(
                "Skipping non-mapping YAML block at line {}",
                range.start + 1
            ),
            Err(e) => return Err(Error::malformed_yaml("", range.start, e.to_string())),
        }
    }

    Ok(metadata)
}
