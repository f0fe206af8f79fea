//! Registration registry: producer subtrees of DCC nodes.
//!
//! When a node is added, the factory registered for its type produces a
//! scene index. The registry relocates it under a prefix unique in the
//! merged namespace, attaches the node's path interface, adds it to the
//! merging scene index and registers its pick handler. Removing the node
//! undoes all of it.
//!
//! Prefixes are a single component (`/name` or `/name__N`), so the
//! registration owning a scene index path is found from its first
//! component alone.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::core::{PrefixingSceneIndex, SceneIndexHandle};
use crate::pick::{NativePickHandler, PickHandler, PickHandlerRegistry, UsdPickHandler};
use crate::scene_index::{MergingSceneIndex, PathInterfaceSceneIndex};
use crate::selection::{AppPath, NodeNamePathMapper, PathSegment, RunTimeId};
use crate::util::{sanitize_name, Error, Result, ScenePath};

use super::node::DccNode;
use super::node_hash::NodeHashRegistry;

/// Maps a producer path to the application path of the item it shows.
pub type InterpretFn = Arc<dyn Fn(&ScenePath) -> AppPath + Send + Sync>;

/// What a factory knows when producing a node's scene.
pub struct ProducerContext<'a> {
    pub node: &'a dyn DccNode,
    /// Prefix the produced scene will be relocated under.
    pub prefix: &'a ScenePath,
}

/// Scene index produced for one node.
pub struct ProducedScene {
    pub scene: SceneIndexHandle,
    pub interpret: InterpretFn,
    pub pick_handler: Option<Arc<dyn PickHandler>>,
}

impl ProducedScene {
    /// Scene of a USD stage shown by `node_path`.
    ///
    /// Prims are interpreted as USD paths appended to the node's path and
    /// picked with a [`UsdPickHandler`].
    pub fn usd(scene: SceneIndexHandle, node_path: AppPath) -> Self {
        let interpret: InterpretFn = Arc::new(move |usd_path: &ScenePath| {
            if usd_path.is_empty() || usd_path.is_absolute_root() {
                return AppPath::empty();
            }
            let segment = PathSegment::new(RunTimeId::USD, '/', usd_path.components().iter().cloned());
            node_path.append_segment(segment)
        });
        Self { scene, interpret, pick_handler: Some(Arc::new(UsdPickHandler::new())) }
    }

    /// Scene of DCC-native objects relocated under `prefix`.
    ///
    /// `/prefix/world/cube` is interpreted as `|world|cube`.
    pub fn native(scene: SceneIndexHandle, prefix: ScenePath) -> Self {
        let interpret: InterpretFn = Arc::new(move |path: &ScenePath| match path.strip_prefix(&prefix) {
            Some(rest) if !rest.is_empty() => {
                AppPath::new([PathSegment::new(RunTimeId::DCC, '|', rest.iter().cloned())])
            }
            _ => AppPath::empty(),
        });
        Self { scene, interpret, pick_handler: Some(Arc::new(NativePickHandler)) }
    }
}

pub type ProducerFactory = Arc<dyn Fn(&ProducerContext<'_>) -> Result<ProducedScene> + Send + Sync>;

/// A node's scene index subtree.
pub struct Registration {
    node: Weak<dyn DccNode>,
    node_name: String,
    hash_code: u64,
    prefix: ScenePath,
    root_scene: SceneIndexHandle,
    interpret: InterpretFn,
}

impl Registration {
    /// The node, if it still exists.
    pub fn node(&self) -> Option<Arc<dyn DccNode>> {
        self.node.upgrade()
    }

    pub fn is_alive(&self) -> bool {
        self.node.strong_count() > 0
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    pub fn hash_code(&self) -> u64 {
        self.hash_code
    }

    pub fn prefix(&self) -> &ScenePath {
        &self.prefix
    }

    /// Scene added to the merging scene index.
    pub fn root_scene(&self) -> &SceneIndexHandle {
        &self.root_scene
    }

    pub fn interpret_rprim_path(&self, path: &ScenePath) -> AppPath {
        (self.interpret)(path)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("node_name", &self.node_name)
            .field("prefix", &self.prefix)
            .field("alive", &self.is_alive())
            .finish()
    }
}

pub struct SceneIndexRegistry {
    merging: Arc<MergingSceneIndex>,
    factories: RwLock<HashMap<String, ProducerFactory>>,
    registrations: RwLock<BTreeMap<ScenePath, Arc<Registration>>>,
    node_paths: NodeHashRegistry,
    pick_handlers: Arc<PickHandlerRegistry>,
    counter: Mutex<u32>,
}

impl SceneIndexRegistry {
    pub fn new(merging: Arc<MergingSceneIndex>) -> Self {
        Self {
            merging,
            factories: RwLock::new(HashMap::new()),
            registrations: RwLock::new(BTreeMap::new()),
            node_paths: NodeHashRegistry::new(),
            pick_handlers: Arc::new(PickHandlerRegistry::new()),
            counter: Mutex::new(0),
        }
    }

    pub fn merging(&self) -> &Arc<MergingSceneIndex> {
        &self.merging
    }

    pub fn pick_handlers(&self) -> &Arc<PickHandlerRegistry> {
        &self.pick_handlers
    }

    /// Register the producer of nodes of type `type_name`.
    ///
    /// Returns false if the type already has one.
    pub fn register_producer(&self, type_name: impl Into<String>, factory: ProducerFactory) -> bool {
        let type_name = type_name.into();
        let mut factories = self.factories.write();
        if factories.contains_key(&type_name) {
            tracing::warn!(target: "fvp::registration", %type_name, "producer already registered");
            return false;
        }
        factories.insert(type_name, factory);
        true
    }

    pub fn has_producer(&self, type_name: &str) -> bool {
        self.factories.read().contains_key(type_name)
    }

    /// Produce and compose the scene of `node`.
    pub fn node_added(&self, node: &Arc<dyn DccNode>) -> Result<Arc<Registration>> {
        let hash_code = node.hash_code();
        if self.node_paths.contains(hash_code) {
            return Err(Error::AlreadyRegistered(node.name().to_string()));
        }
        let factory = self
            .factories
            .read()
            .get(node.type_name())
            .cloned()
            .ok_or_else(|| Error::UnknownNodeType(node.type_name().to_string()))?;

        let prefix = self.make_prefix(node.as_ref());
        let produced = factory(&ProducerContext { node: node.as_ref(), prefix: &prefix })?;

        let prefixed: SceneIndexHandle = PrefixingSceneIndex::new(produced.scene, prefix.clone());
        let mapper = Arc::new(NodeNamePathMapper::new(node.name(), prefix.clone()));
        let root_scene: SceneIndexHandle = PathInterfaceSceneIndex::new(prefixed, mapper);

        let registration = Arc::new(Registration {
            node: Arc::downgrade(node),
            node_name: node.name().to_string(),
            hash_code,
            prefix: prefix.clone(),
            root_scene: root_scene.clone(),
            interpret: produced.interpret,
        });
        self.registrations.write().insert(prefix.clone(), registration.clone());
        self.node_paths.add(hash_code, prefix.clone());

        if let Some(handler) = produced.pick_handler {
            if !self.pick_handlers.register(&prefix, handler) {
                tracing::warn!(target: "fvp::registration", %prefix, "pick handler not registered");
            }
        }
        self.merging.add_input_scene(root_scene, prefix.clone());
        tracing::info!(target: "fvp::registration", node = node.name(), %prefix, "scene index registered");
        Ok(registration)
    }

    /// Remove the scene of `node`. Returns false if it had none.
    pub fn node_removed(&self, node: &dyn DccNode) -> bool {
        self.remove_by_hash(node.hash_code())
    }

    /// Remove registrations whose node no longer exists.
    pub fn remove_expired(&self) -> usize {
        let expired: Vec<u64> = self
            .registrations
            .read()
            .values()
            .filter(|r| !r.is_alive())
            .map(|r| r.hash_code)
            .collect();
        expired.into_iter().filter(|h| self.remove_by_hash(*h)).count()
    }

    fn remove_by_hash(&self, hash_code: u64) -> bool {
        let Some(prefix) = self.node_paths.remove(hash_code) else {
            return false;
        };
        let Some(registration) = self.registrations.write().remove(&prefix) else {
            return false;
        };
        self.pick_handlers.unregister(&prefix);
        self.merging.remove_input_scene(&registration.root_scene);
        tracing::info!(target: "fvp::registration", node = %registration.node_name, %prefix, "scene index unregistered");
        true
    }

    /// Registration owning the scene index path `path`.
    pub fn registration_for_rprim(&self, path: &ScenePath) -> Option<Arc<Registration>> {
        if path.is_empty() || path.is_absolute_root() {
            return None;
        }
        self.registrations.read().get(&path.truncate(1)).cloned()
    }

    pub fn registration_for_node(&self, node: &dyn DccNode) -> Option<Arc<Registration>> {
        let prefix = self.node_paths.lookup(node.hash_code());
        self.registrations.read().get(&prefix).cloned()
    }

    /// Scene index prefix of the node with `hash_code`, or the empty path.
    pub fn path_for_hash(&self, hash_code: u64) -> ScenePath {
        self.node_paths.lookup(hash_code)
    }

    pub fn registrations(&self) -> Vec<Arc<Registration>> {
        self.registrations.read().values().cloned().collect()
    }

    /// `/name`, or `/name__N` if the name is not unique in the DCC or the
    /// prefix is taken.
    fn make_prefix(&self, node: &dyn DccNode) -> ScenePath {
        let base = sanitize_name(node.name());
        let registrations = self.registrations.read();
        if node.has_unique_name() {
            let prefix = ScenePath::from_components([base.as_str()]);
            if !registrations.contains_key(&prefix) {
                return prefix;
            }
        }
        let mut counter = self.counter.lock();
        loop {
            *counter += 1;
            let prefix = ScenePath::from_components([format!("{base}__{counter}")]);
            if !registrations.contains_key(&prefix) {
                return prefix;
            }
        }
    }
}
