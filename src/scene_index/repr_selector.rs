//! Wireframe display modes: forces a repr selector on meshes.

use std::sync::Arc;

use parking_lot::RwLock;

use super::is_excluded;
use crate::core::schema::{self, tokens};
use crate::core::{
    observer_handle, ContainerEditor, DataSource, DirtiedPrimEntry, LocatorSet, Observers, PrimView, SceneIndex,
    SceneIndexHandle, SceneIndexPrim, StageKind,
};
use crate::selection::WireframeColorInterface;
use crate::util::ScenePath;

/// Which wireframe representation meshes draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReprVariant {
    /// Wireframe only.
    WireframeRefined,
    /// Wireframe on shaded, reduced quality.
    WireframeOnSurface,
    /// Wireframe on shaded, full quality.
    WireframeOnSurfaceRefined,
}

impl ReprVariant {
    /// First slot of the repr selector.
    pub fn repr_token(self) -> &'static str {
        match self {
            ReprVariant::WireframeRefined => tokens::REFINED_WIRE,
            ReprVariant::WireframeOnSurface => tokens::WIRE_ON_SURF,
            ReprVariant::WireframeOnSurfaceRefined => tokens::REFINED_WIRE_ON_SURF,
        }
    }
}

/// Sets the repr selector, the override wireframe color and cull style
/// `nothing` on meshes outside the excluded roots.
pub struct ReprSelectorSceneIndex {
    input: SceneIndexHandle,
    variant: RwLock<ReprVariant>,
    excluded_roots: Vec<ScenePath>,
    colors: Arc<dyn WireframeColorInterface>,
    observers: Observers,
}

impl ReprSelectorSceneIndex {
    pub fn new(
        input: SceneIndexHandle,
        variant: ReprVariant,
        excluded_roots: Vec<ScenePath>,
        colors: Arc<dyn WireframeColorInterface>,
    ) -> Arc<Self> {
        let this = Arc::new(Self {
            input: input.clone(),
            variant: RwLock::new(variant),
            excluded_roots,
            colors,
            observers: Observers::new(),
        });
        input.add_observer(observer_handle(&this));
        this
    }

    pub fn variant(&self) -> ReprVariant {
        *self.variant.read()
    }

    /// Switch variant in place, dirtying the repr of affected meshes.
    pub fn set_variant(&self, variant: ReprVariant) {
        {
            let mut current = self.variant.write();
            if *current == variant {
                return;
            }
            *current = variant;
        }
        let locators = LocatorSet::from_locator(schema::repr_selector_locator());
        let entries: Vec<DirtiedPrimEntry> = PrimView::new(self.input.as_ref(), &ScenePath::absolute_root())
            .filter(|p| self.applies_to(p, &self.input.get_prim(p)))
            .map(|p| DirtiedPrimEntry::new(p, locators.clone()))
            .collect();
        self.observers.send_dirtied(self, &entries);
    }

    fn applies_to(&self, path: &ScenePath, prim: &SceneIndexPrim) -> bool {
        prim.prim_type == tokens::MESH && prim.is_defined() && !is_excluded(path, &self.excluded_roots)
    }
}

impl SceneIndex for ReprSelectorSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        let mut prim = self.input.get_prim(path);
        if !self.applies_to(path, &prim) {
            return prim;
        }
        let color = self.colors.wireframe_color(path);
        prim.data_source = Some(
            ContainerEditor::new(prim.data_source.take())
                .set(
                    &schema::primvar_locator(tokens::OVERRIDE_WIREFRAME_COLOR),
                    Some(schema::primvar(color, tokens::CONSTANT, tokens::COLOR)),
                )
                .set(&schema::cull_style_locator(), Some(DataSource::value(tokens::CULL_NOTHING)))
                .set(
                    &schema::repr_selector_locator(),
                    Some(DataSource::value(schema::repr_selector(self.variant().repr_token()))),
                )
                .finish(),
        );
        prim
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.input.get_child_prim_paths(path)
    }

    fn display_name(&self) -> String {
        format!("Flow Viewport Repr Selector Scene Index ({:?})", self.variant())
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::ReprSelector
    }

    filtering_plumbing!();
}

forward_notifications!(ReprSelectorSceneIndex);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{value_at, RetainedContainer, RetainedPrim, RetainedSceneIndex};
    use crate::util::{Color, Token};

    struct White;

    impl WireframeColorInterface for White {
        fn wireframe_color(&self, _prim_path: &ScenePath) -> Color {
            Color::ONE
        }
    }

    #[test]
    fn test_variant_repr_on_meshes() {
        let producer = RetainedSceneIndex::new("producer");
        let path: ScenePath = "/A/Cube".parse().unwrap();
        producer.add_prims(vec![RetainedPrim::new(path.clone(), tokens::MESH, Some(RetainedContainer::new().into_handle()))]);
        let si = ReprSelectorSceneIndex::new(producer, ReprVariant::WireframeRefined, Vec::new(), Arc::new(White));
        let repr = || {
            let prim = si.get_prim(&path);
            value_at(prim.data_source.as_ref().unwrap(), &schema::repr_selector_locator())
                .and_then(|v| v.as_token_array().map(<[Token]>::to_vec))
        };
        let first = |r: Option<Vec<Token>>| r.and_then(|r| r.first().cloned());
        assert_eq!(first(repr()), Some(Token::from(tokens::REFINED_WIRE)));
        assert_eq!(repr().map(|r| r.len()), Some(3));

        si.set_variant(ReprVariant::WireframeOnSurface);
        assert_eq!(first(repr()), Some(Token::from(tokens::WIRE_ON_SURF)));
    }
}
