// Raw Converter
// Converts between ContentState and the raw JSON interchange format.
// Offsets and lengths in the raw format count characters.

use super::content_state::{BlockKey, BlockType, CharacterMetadata, ContentBlock, ContentState};
use super::entity::{Entity, EntityData, EntityKey, EntityStore, EntityType, Mutability};
use crate::error::RawError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContentState {
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub entity_map: BTreeMap<String, RawEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub key: String,
    pub text: String,
    #[serde(rename = "type", default)]
    pub block_type: BlockType,
    #[serde(default)]
    pub depth: u8,
    #[serde(default)]
    pub inline_style_ranges: Vec<RawInlineStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<RawEntityRange>,
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInlineStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntityRange {
    pub offset: usize,
    pub length: usize,
    pub key: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub mutability: Mutability,
    #[serde(default)]
    pub data: EntityData,
}

/// Convert content to its raw form. Referenced entities are numbered from 0
/// in order of first appearance.
pub fn convert_to_raw(content: &ContentState, entities: &EntityStore) -> RawContentState {
    let mut entity_map = BTreeMap::new();
    let mut raw_keys: HashMap<EntityKey, usize> = HashMap::new();

    let blocks = content
        .blocks()
        .map(|block| {
            let mut entity_ranges = Vec::new();
            block.find_entity_ranges(
                |c| c.entity.is_some(),
                |start, end| {
                    let Some(key) = block.entity_at(start) else {
                        return;
                    };
                    let Some(entity) = entities.get(key) else {
                        log::warn!("block {} refers to unknown entity {}", block.key(), key);
                        return;
                    };
                    let next = raw_keys.len();
                    let raw_key = *raw_keys.entry(key).or_insert_with(|| {
                        entity_map.insert(
                            next.to_string(),
                            RawEntity {
                                entity_type: entity.entity_type,
                                mutability: entity.mutability,
                                data: entity.data.clone(),
                            },
                        );
                        next
                    });
                    entity_ranges.push(RawEntityRange {
                        offset: start,
                        length: end - start,
                        key: raw_key,
                    });
                },
            );

            RawBlock {
                key: block.key().to_string(),
                text: block.text().to_string(),
                block_type: block.block_type(),
                depth: block.depth(),
                inline_style_ranges: inline_style_ranges(block),
                entity_ranges,
                data: BTreeMap::new(),
            }
        })
        .collect();

    RawContentState { blocks, entity_map }
}

/// One range per style name and maximal run of characters carrying it
fn inline_style_ranges(block: &ContentBlock) -> Vec<RawInlineStyleRange> {
    let mut ranges = Vec::new();
    for name in crate::richtext::content_state::TextStyle::NAMES {
        let mut run_start: Option<usize> = None;
        for (i, c) in block.characters().iter().enumerate() {
            match (c.style.has(name), run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    ranges.push(RawInlineStyleRange {
                        offset: start,
                        length: i - start,
                        style: name.to_string(),
                    });
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            ranges.push(RawInlineStyleRange {
                offset: start,
                length: block.len() - start,
                style: name.to_string(),
            });
        }
    }
    ranges
}

/// Build content from its raw form. Every raw entity is added to `entities`
/// under a fresh key.
pub fn convert_from_raw(
    raw: &RawContentState,
    entities: &mut EntityStore,
) -> Result<ContentState, RawError> {
    let mut keys: HashMap<&str, EntityKey> = HashMap::new();
    for (raw_key, raw_entity) in &raw.entity_map {
        let key = entities.add(Entity::new(
            raw_entity.entity_type,
            raw_entity.mutability,
            raw_entity.data.clone(),
        ));
        keys.insert(raw_key.as_str(), key);
    }

    let mut seen = HashSet::new();
    let mut blocks = Vec::with_capacity(raw.blocks.len());
    for raw_block in &raw.blocks {
        if !seen.insert(raw_block.key.as_str()) {
            return Err(RawError::DuplicateKey(raw_block.key.clone()));
        }

        let len = raw_block.text.chars().count();
        let mut characters = vec![CharacterMetadata::default(); len];
        let check = |offset: usize, length: usize| {
            if offset + length > len {
                Err(RawError::RangeOutOfBounds {
                    block: raw_block.key.clone(),
                    offset,
                    length,
                    len,
                })
            } else {
                Ok(offset..offset + length)
            }
        };

        for range in &raw_block.inline_style_ranges {
            for c in &mut characters[check(range.offset, range.length)?] {
                if !c.style.set(&range.style) {
                    log::debug!("ignoring unknown inline style {}", range.style);
                    break;
                }
            }
        }

        for range in &raw_block.entity_ranges {
            let key = keys.get(range.key.to_string().as_str()).copied().ok_or_else(|| {
                RawError::UnknownEntity {
                    block: raw_block.key.clone(),
                    key: range.key.to_string(),
                }
            })?;
            for c in &mut characters[check(range.offset, range.length)?] {
                c.entity = Some(key);
            }
        }

        blocks.push(ContentBlock::from_parts(
            BlockKey::new(raw_block.key.as_str()),
            raw_block.block_type,
            raw_block.depth,
            raw_block.text.clone(),
            characters,
        ));
    }

    Ok(ContentState::from_blocks(blocks))
}

/// Serialize content as pretty-printed raw JSON
pub fn to_json(content: &ContentState, entities: &EntityStore) -> Result<String, RawError> {
    Ok(serde_json::to_string_pretty(&convert_to_raw(
        content, entities,
    ))?)
}

/// Parse raw JSON into content, adding its entities to `entities`
pub fn from_json(json: &str, entities: &mut EntityStore) -> Result<ContentState, RawError> {
    let raw: RawContentState = serde_json::from_str(json)?;
    convert_from_raw(&raw, entities)
}
