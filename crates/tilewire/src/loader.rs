use std::path::Path;
use tilecore::{Definition, DefinitionError, DefinitionStore, DefinitionStores, DefinitionStyle};
use tokio::fs;

use crate::fsx::path_exists;

/// Read, normalize, and persist one definition descriptor.
///
/// A missing descriptor file is not an error: the directory simply
/// contributes no metadata and `Ok(None)` is returned. Malformed JSON is a
/// configuration error and rejects, aborting that definition's setup.
///
/// The record is tagged with the owning directory's name before saving;
/// whatever the file itself claims for `definitionDirName` is discarded.
/// Records with style `ACTIVITY` go to the activity-stream store, everything
/// else to the tile store.
pub async fn load_definition_metadata(
    stores: &DefinitionStores,
    descriptor_path: &Path,
) -> Result<Option<Definition>, DefinitionError> {
    if !path_exists(descriptor_path).await {
        return Ok(None);
    }

    let bytes = fs::read(descriptor_path).await?;
    let mut definition: Definition =
        serde_json::from_slice(&bytes).map_err(|source| DefinitionError::Descriptor {
            path: descriptor_path.to_path_buf(),
            source,
        })?;

    definition.normalize_placeholder_id();
    definition.definition_dir_name = descriptor_path
        .parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned());

    let store = match definition.style {
        DefinitionStyle::Activity => &stores.activity_streams,
        DefinitionStyle::Tile => &stores.tiles,
    };
    let saved = store.save(definition).await?;

    tracing::info!(
        "saved {} definition '{}'",
        String::from(saved.style),
        saved.definition_dir_name.as_deref().unwrap_or("?")
    );

    Ok(Some(saved))
}
