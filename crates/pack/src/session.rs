use crate::error::PackError;
use crate::grid::{CellInstance, CellTemplate, GridExtents, InstanceCollection, build_grid_with};
use std::sync::Arc;

/// The viewer's pack state: the loaded cell and the pack built from it.
///
/// A session only exists once a template has been loaded, so generation
/// can never run without one. Regeneration builds the new collection
/// completely before replacing the old one; callers that read the session
/// between frames see either the previous pack or the new one.
#[derive(Debug)]
pub struct PackSession {
    template: Arc<CellTemplate>,
    collection: Option<InstanceCollection>,
    generation: u64,
}

impl PackSession {
    pub fn new(template: CellTemplate) -> Self {
        tracing::info!(
            "pack session started with template {} ({})",
            template.name,
            template.asset
        );
        Self {
            template: Arc::new(template),
            collection: None,
            generation: 0,
        }
    }

    pub fn template(&self) -> &Arc<CellTemplate> {
        &self.template
    }

    /// Current pack, if one has been generated.
    pub fn collection(&self) -> Option<&InstanceCollection> {
        self.collection.as_ref()
    }

    pub fn instances(&self) -> &[CellInstance] {
        self.collection
            .as_ref()
            .map(InstanceCollection::instances)
            .unwrap_or(&[])
    }

    /// Incremented on every successful regeneration or clear.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the pack with a fresh `count_x * count_y * count_z` grid.
    pub fn regenerate(
        &mut self,
        count_x: i64,
        count_y: i64,
        count_z: i64,
    ) -> Result<&InstanceCollection, PackError> {
        match GridExtents::new(count_x, count_y, count_z) {
            Ok(extents) => Ok(self.regenerate_with(extents)),
            Err(e) => Err(self.rejected(e)),
        }
    }

    /// Same as [`regenerate`](Self::regenerate), from raw text-field input.
    pub fn regenerate_from_text(
        &mut self,
        x: &str,
        y: &str,
        z: &str,
    ) -> Result<&InstanceCollection, PackError> {
        match GridExtents::parse(x, y, z) {
            Ok(extents) => Ok(self.regenerate_with(extents)),
            Err(e) => Err(self.rejected(e)),
        }
    }

    pub fn regenerate_with(&mut self, extents: GridExtents) -> &InstanceCollection {
        let built = build_grid_with(&self.template, extents);
        self.generation += 1;
        tracing::info!(
            "generated {extents} pack: {} cells, {} flipped (generation {})",
            built.len(),
            built.flipped_count(),
            self.generation
        );
        self.collection.insert(built)
    }

    /// Drop the current pack.
    pub fn clear(&mut self) {
        if self.collection.take().is_some() {
            self.generation += 1;
            tracing::debug!("pack cleared (generation {})", self.generation);
        }
    }

    fn rejected(&self, error: PackError) -> PackError {
        tracing::warn!("pack generation rejected: {error}");
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DimensionIssue;
    use cellpack_assets::ModelAsset;

    fn session() -> PackSession {
        PackSession::new(CellTemplate::from_model(ModelAsset::procedural_cell()))
    }

    #[test]
    fn starts_empty() {
        let s = session();
        assert!(s.collection().is_none());
        assert!(s.instances().is_empty());
        assert_eq!(s.generation(), 0);
    }

    #[test]
    fn rebuild_replaces_fully() {
        let mut s = session();
        s.regenerate(2, 2, 2).unwrap();
        assert_eq!(s.instances().len(), 8);
        s.regenerate(1, 1, 1).unwrap();
        assert_eq!(s.instances().len(), 1);
        assert_eq!(s.generation(), 2);
    }

    #[test]
    fn rejected_request_keeps_previous_pack() {
        let mut s = session();
        s.regenerate(2, 1, 3).unwrap();
        let before: Vec<_> = s.instances().iter().map(|i| i.id).collect();

        let err = s.regenerate(0, 2, 2).unwrap_err();
        assert!(err.is_invalid_dimension());
        let err = s.regenerate(-1, 2, 2).unwrap_err();
        assert!(err.is_invalid_dimension());

        let after: Vec<_> = s.instances().iter().map(|i| i.id).collect();
        assert_eq!(before, after);
        assert_eq!(s.generation(), 1);
    }

    #[test]
    fn text_input_is_validated() {
        let mut s = session();
        s.regenerate_from_text("1", "1", "1").unwrap();
        let err = s.regenerate_from_text("2", "x", "2").unwrap_err();
        assert!(matches!(
            err,
            PackError::InvalidDimension {
                issue: DimensionIssue::NotANumber,
                ..
            }
        ));
        // no silent empty pack
        assert_eq!(s.instances().len(), 1);
    }

    #[test]
    fn clear_drops_pack() {
        let mut s = session();
        s.regenerate(3, 1, 1).unwrap();
        s.clear();
        assert!(s.collection().is_none());
        assert_eq!(s.generation(), 2);
        s.clear();
        assert_eq!(s.generation(), 2);
    }

    #[test]
    fn regenerated_pack_uses_session_template() {
        let mut s = session();
        let template = Arc::clone(s.template());
        let pack = s.regenerate(1, 2, 1).unwrap();
        assert!(Arc::ptr_eq(pack.template(), &template));
    }
}
