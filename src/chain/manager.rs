//! Filtering chain manager.
//!
//! Owns the stages between the merging scene index and the terminal:
//!
//! ```text
//! merging -> block removal -> selection -> dirty lead -> isolate select
//!   -> display style -> prune textures -> default material
//!   -> [bounding box | repr selector] -> wireframe highlight
//!   -> custom clients -> terminal
//! ```
//!
//! The block-removal stage and the terminal live for the whole session.
//! Everything between them is rebuilt when the shaded / wireframe /
//! bounding box / x-ray bits of the display style change, or when the
//! excluded roots or the custom clients change. Other display style bits
//! are applied to the existing stages in place.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::client::{ClientEntry, FilteringClient};
use super::display_style::{DisplayStyle, GeometryMode};
use super::terminal::TerminalSceneIndex;
use crate::config::SharedOptions;
use crate::core::{chain_kinds, SceneIndexHandle, StageKind};
use crate::scene_index::{
    BlockPrimRemovalSceneIndex, BoundingBoxSceneIndex, DefaultMaterialSceneIndex, DirtyLeadObjectSceneIndex,
    DisplayStyleOverrideSceneIndex, IsolateSelectSceneIndex, MergingSceneIndex, PruneTexturesSceneIndex,
    ReprSelectorSceneIndex, SelectionSceneIndex, WireframeHighlightSceneIndex, DEFAULT_MATERIAL_PATH,
};
use crate::selection::{
    new_selection, AppSelection, LeadObjectPathTracker, PathInterface, SelectionChanged, SelectionHandle,
    SelectionWireframeColors, WireframeColorInterface,
};
use crate::util::{Result, ScenePath};

/// The geometry stage of the current chain, if any.
#[derive(Clone)]
pub enum GeometryStage {
    None,
    BoundingBox(Arc<BoundingBoxSceneIndex>),
    Repr(Arc<ReprSelectorSceneIndex>),
}

/// Stages of one chain build.
#[derive(Clone)]
pub struct ChainStages {
    pub selection: Arc<SelectionSceneIndex>,
    pub dirty_lead: Arc<DirtyLeadObjectSceneIndex>,
    pub isolate: Arc<IsolateSelectSceneIndex>,
    pub display_style: Arc<DisplayStyleOverrideSceneIndex>,
    pub prune_textures: Arc<PruneTexturesSceneIndex>,
    pub default_material: Arc<DefaultMaterialSceneIndex>,
    pub geometry: GeometryStage,
    pub highlight: Arc<WireframeHighlightSceneIndex>,
    /// Last stage, after the custom clients.
    pub tail: SceneIndexHandle,
}

/// Settings the chain is built from.
struct ChainSettings {
    display_style: DisplayStyle,
    excluded_roots: Vec<ScenePath>,
    isolate: Option<Vec<ScenePath>>,
    refine_level: Option<i32>,
    default_material_path: ScenePath,
    material_exclusions: Vec<ScenePath>,
    clients: Vec<ClientEntry>,
}

pub struct FilteringChain {
    merging: Arc<MergingSceneIndex>,
    blocker: Arc<BlockPrimRemovalSceneIndex>,
    terminal: Arc<TerminalSceneIndex>,
    selection: SelectionHandle,
    options: SharedOptions,
    lead_tracker: LeadObjectPathTracker,
    settings: Mutex<ChainSettings>,
    stages: RwLock<ChainStages>,
}

impl FilteringChain {
    /// Build the chain over `merging`, shaded and textured.
    pub fn new(merging: Arc<MergingSceneIndex>, options: SharedOptions) -> Result<Self> {
        let blocker = BlockPrimRemovalSceneIndex::new(merging.clone());
        let selection = new_selection();
        let settings = ChainSettings {
            display_style: DisplayStyle::SHADED | DisplayStyle::TEXTURED,
            excluded_roots: Vec::new(),
            isolate: None,
            refine_level: None,
            default_material_path: ScenePath::parse(DEFAULT_MATERIAL_PATH)?,
            material_exclusions: Vec::new(),
            clients: Vec::new(),
        };
        let stages = build_stages(&blocker, &selection, &options, &settings, &ScenePath::empty())?;
        let terminal = TerminalSceneIndex::new(stages.tail.clone());
        tracing::info!(target: "fvp::chain", style = ?settings.display_style, "filtering chain created");
        Ok(Self {
            merging,
            blocker,
            terminal,
            selection,
            options,
            lead_tracker: LeadObjectPathTracker::new(),
            settings: Mutex::new(settings),
            stages: RwLock::new(stages),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn merging(&self) -> &Arc<MergingSceneIndex> {
        &self.merging
    }

    /// The session-long end of the chain, observed by the renderer.
    pub fn terminal(&self) -> &Arc<TerminalSceneIndex> {
        &self.terminal
    }

    pub fn terminal_scene(&self) -> SceneIndexHandle {
        self.terminal.clone()
    }

    /// The shared selection set.
    pub fn selection(&self) -> SelectionHandle {
        self.selection.clone()
    }

    /// Stages of the current build.
    pub fn stages(&self) -> ChainStages {
        self.stages.read().clone()
    }

    pub fn selection_scene_index(&self) -> Arc<SelectionSceneIndex> {
        self.stages.read().selection.clone()
    }

    pub fn highlight_scene_index(&self) -> Arc<WireframeHighlightSceneIndex> {
        self.stages.read().highlight.clone()
    }

    pub fn display_style(&self) -> DisplayStyle {
        self.settings.lock().display_style
    }

    pub fn lead_tracker(&self) -> &LeadObjectPathTracker {
        &self.lead_tracker
    }

    /// Stage kinds from the terminal down to the merging scene index.
    pub fn stage_kinds(&self) -> Vec<StageKind> {
        chain_kinds(&self.terminal_scene())
    }

    pub fn fully_selected_paths(&self) -> Vec<ScenePath> {
        self.selection.read().fully_selected_paths()
    }

    // ========================================================================
    // Display style
    // ========================================================================

    /// Apply a frame's display style. Returns true if the chain was rebuilt.
    pub fn update_display_style(&self, style: DisplayStyle) -> Result<bool> {
        let previous = {
            let mut settings = self.settings.lock();
            std::mem::replace(&mut settings.display_style, style)
        };
        if style == previous {
            return Ok(false);
        }
        if style.requires_rebuild(previous) {
            tracing::debug!(target: "fvp::chain", ?previous, ?style, "display style change rebuilds the chain");
            self.rebuild()?;
            return Ok(true);
        }
        let stages = self.stages();
        let changed = DisplayStyle::from_bits(style.bits() ^ previous.bits());
        if changed.contains(DisplayStyle::TEXTURED) {
            stages.prune_textures.mark_textures_dirty(style.contains(DisplayStyle::TEXTURED));
        }
        if changed.contains(DisplayStyle::DEFAULT_MATERIAL) {
            stages.default_material.enable(style.contains(DisplayStyle::DEFAULT_MATERIAL));
        }
        Ok(false)
    }

    /// Re-read the wireframe-on-shaded quality from the options and apply
    /// it in place.
    pub fn refresh_wireframe_quality(&self) {
        let quality = self.options.read().wireframe_on_shaded;
        let style = self.display_style();
        if let (GeometryMode::Wireframe(variant), GeometryStage::Repr(repr)) =
            (style.geometry_mode(quality), self.stages().geometry)
        {
            repr.set_variant(variant);
        }
    }

    /// Force a refinement level on meshes, `None` to leave them alone.
    pub fn set_refine_level(&self, level: Option<i32>) {
        self.settings.lock().refine_level = level;
        let stage = self.stages.read().display_style.clone();
        stage.set_refine_level(level);
    }

    /// Materials the default material does not replace.
    pub fn set_material_exclusions(&self, exclusions: Vec<ScenePath>) -> Result<()> {
        self.settings.lock().material_exclusions = exclusions;
        self.rebuild()
    }

    /// Exclude a subtree drawn natively by the host from the viewport
    /// overrides and highlighting. Rebuilds the chain.
    pub fn add_excluded_scene_root(&self, root: ScenePath) -> Result<()> {
        {
            let mut settings = self.settings.lock();
            if settings.excluded_roots.contains(&root) {
                return Ok(());
            }
            settings.excluded_roots.push(root);
        }
        self.rebuild()
    }

    pub fn excluded_scene_roots(&self) -> Vec<ScenePath> {
        self.settings.lock().excluded_roots.clone()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Apply a host selection notification. `global` is the host's
    /// settled selection.
    pub fn on_selection_changed(&self, notification: &SelectionChanged, global: &AppSelection) {
        let (selection, dirty_lead) = {
            let stages = self.stages.read();
            (stages.selection.clone(), stages.dirty_lead.clone())
        };
        notification.apply(global, &selection);
        self.lead_tracker.update(global, self.merging.as_ref() as &dyn PathInterface, &dirty_lead);
    }

    // ========================================================================
    // Isolate select
    // ========================================================================

    /// Isolate `paths`, or leave isolate mode with `None`.
    pub fn set_isolate_selection(&self, paths: Option<Vec<ScenePath>>) {
        self.settings.lock().isolate = paths.clone();
        let stage = self.stages.read().isolate.clone();
        stage.set_isolate_selection(paths);
    }

    /// Isolate the scene index paths of an application selection.
    pub fn isolate_app_selection(&self, app_selection: &AppSelection) {
        let paths: Vec<ScenePath> =
            app_selection.iter().flat_map(|a| self.merging.scene_index_paths(a)).collect();
        self.set_isolate_selection(Some(paths));
    }

    pub fn clear_isolate_selection(&self) {
        self.set_isolate_selection(None);
    }

    // ========================================================================
    // Custom clients
    // ========================================================================

    /// Append a client after the built-in stages. Rebuilds the chain.
    pub fn add_client(&self, client: Arc<dyn FilteringClient>) -> Result<()> {
        {
            let mut settings = self.settings.lock();
            if settings.clients.iter().any(|c| c.client.name() == client.name()) {
                tracing::warn!(target: "fvp::chain", name = client.name(), "filtering client already added");
                return Ok(());
            }
            settings.clients.push(ClientEntry { client, enabled: true });
        }
        self.rebuild()
    }

    /// Remove a client by name. Returns false if there is none.
    pub fn remove_client(&self, name: &str) -> Result<bool> {
        let removed = {
            let mut settings = self.settings.lock();
            let before = settings.clients.len();
            settings.clients.retain(|c| c.client.name() != name);
            before != settings.clients.len()
        };
        if removed {
            self.rebuild()?;
        }
        Ok(removed)
    }

    /// Enable or disable a client. Returns false if there is none.
    pub fn set_client_enabled(&self, name: &str, enabled: bool) -> Result<bool> {
        let changed = {
            let mut settings = self.settings.lock();
            match settings.clients.iter_mut().find(|c| c.client.name() == name) {
                Some(entry) if entry.enabled != enabled => {
                    entry.enabled = enabled;
                    true
                }
                Some(_) => false,
                None => return Ok(false),
            }
        };
        if changed {
            self.rebuild()?;
        }
        Ok(true)
    }

    // ========================================================================
    // Rebuild
    // ========================================================================

    /// Rebuild every stage between the blocker and the terminal.
    ///
    /// Removals are withheld while the terminal switches so observers
    /// never see the tree half torn down.
    pub fn rebuild(&self) -> Result<()> {
        let lead = self.stages.read().dirty_lead.lead_object_path();
        self.blocker.set_prim_removal_blocked(true);
        let built = {
            let settings = self.settings.lock();
            build_stages(&self.blocker, &self.selection, &self.options, &settings, &lead)
        };
        let stages = match built {
            Ok(stages) => stages,
            Err(e) => {
                self.blocker.set_prim_removal_blocked(false);
                return Err(e);
            }
        };
        self.terminal.set_input(stages.tail.clone());
        *self.stages.write() = stages;
        self.blocker.set_prim_removal_blocked(false);
        tracing::debug!(target: "fvp::chain", kinds = ?self.stage_kinds(), "filtering chain rebuilt");
        Ok(())
    }
}

fn build_stages(
    blocker: &Arc<BlockPrimRemovalSceneIndex>,
    selection: &SelectionHandle,
    options: &SharedOptions,
    settings: &ChainSettings,
    lead: &ScenePath,
) -> Result<ChainStages> {
    let (quality, colors) = {
        let options = options.read();
        (options.wireframe_on_shaded, options.colors)
    };
    let style = settings.display_style;
    let excluded = &settings.excluded_roots;

    let selection_si = SelectionSceneIndex::new(blocker.clone(), selection.clone())?;
    let dirty_lead = DirtyLeadObjectSceneIndex::new(selection_si.clone());
    dirty_lead.set_lead_object_path(lead.clone());
    let isolate = IsolateSelectSceneIndex::new(dirty_lead.clone(), settings.isolate.clone());
    let display_style = DisplayStyleOverrideSceneIndex::new(isolate.clone(), excluded.clone());
    display_style.set_refine_level(settings.refine_level);
    let prune_textures = PruneTexturesSceneIndex::new(display_style.clone());
    if !style.contains(DisplayStyle::TEXTURED) {
        prune_textures.mark_textures_dirty(false);
    }
    let default_material = DefaultMaterialSceneIndex::new(
        prune_textures.clone(),
        settings.default_material_path.clone(),
        settings.material_exclusions.clone(),
    );
    default_material.enable(style.contains(DisplayStyle::DEFAULT_MATERIAL));

    let wireframe_colors: Arc<dyn WireframeColorInterface> =
        Arc::new(SelectionWireframeColors::new(selection.clone(), dirty_lead.clone(), colors));
    let mut tail: SceneIndexHandle = default_material.clone();
    let geometry = match style.geometry_mode(quality) {
        GeometryMode::Shaded => GeometryStage::None,
        GeometryMode::BoundingBox => {
            let bbox = BoundingBoxSceneIndex::new(tail, excluded.clone(), wireframe_colors);
            tail = bbox.clone();
            GeometryStage::BoundingBox(bbox)
        }
        GeometryMode::Wireframe(variant) => {
            let repr = ReprSelectorSceneIndex::new(tail, variant, excluded.clone(), wireframe_colors);
            tail = repr.clone();
            GeometryStage::Repr(repr)
        }
    };

    let highlight = WireframeHighlightSceneIndex::new(tail, selection.clone(), excluded.clone());
    tail = highlight.clone();
    for entry in settings.clients.iter().filter(|c| c.enabled) {
        tail = entry.client.append_scene_index(tail);
        tracing::trace!(target: "fvp::chain", client = entry.client.name(), "appended filtering client");
    }

    Ok(ChainStages {
        selection: selection_si,
        dirty_lead,
        isolate,
        display_style,
        prune_textures,
        default_material,
        geometry,
        highlight,
        tail,
    })
}
