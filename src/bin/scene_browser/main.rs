//! Scene browser - inspect the viewport scene built from a JSON scene.
//!
//! The scene is registered as a USD stage producer, composed and filtered
//! exactly as a viewport would, then printed or picked from.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use flow_viewport::chain::{DisplayStyle, FilteringChain};
use flow_viewport::config::ViewportOptions;
use flow_viewport::core::data_source::{dump, DataSource};
use flow_viewport::core::{PrimView, SceneDescription, SceneIndex, SceneIndexHandle};
use flow_viewport::pick::{PickHit, PickResolver};
use flow_viewport::registration::{
    DccNode, ProducedScene, ProducerContext, ProducerFactory, SceneIndexRegistry, SimpleNode,
};
use flow_viewport::scene_index::MergingSceneIndex;
use flow_viewport::selection::{AppPath, AppSelection, PathSegment, RunTimeId, SelectionChanged, SelectionOp};
use flow_viewport::{Result, ScenePath};

const STAGE_NODE_TYPE: &str = "usdStage";

/// Global flags shared by every command.
#[derive(Default)]
struct Flags {
    style: Option<DisplayStyle>,
    select: Vec<String>,
    options: Option<String>,
    instancer: Option<String>,
    instance: i32,
    element: i32,
    all: bool,
}

fn main() -> ExitCode {
    flow_viewport::trace::init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let (flags, positional) = match parse_flags(&args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("Error: {msg}");
            return ExitCode::FAILURE;
        }
    };
    if positional.is_empty() {
        print_help();
        return ExitCode::SUCCESS;
    }

    let result = match positional[0] {
        "tree" | "t" => match positional.get(1) {
            Some(file) => cmd_tree(file, &flags),
            None => usage("tree <scene.json>"),
        },
        "dump" | "d" => match (positional.get(1), positional.get(2)) {
            (Some(file), Some(path)) => cmd_dump(file, path, &flags),
            _ => usage("dump <scene.json> <path>"),
        },
        "pick" | "p" => match (positional.get(1), positional.get(2)) {
            (Some(file), Some(path)) => cmd_pick(file, path, &flags),
            _ => usage("pick <scene.json> <path> [--instancer P --instance N] [--element F]"),
        },
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        "version" | "--version" => {
            println!("scene-browser {} ({})", env!("CARGO_PKG_VERSION"), flow_viewport::BUILD_DATE);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn usage(text: &str) -> Result<()> {
    Err(flow_viewport::Error::other(format!("usage: scene-browser {text}")))
}

fn parse_flags(args: &[String]) -> std::result::Result<(Flags, Vec<&str>), String> {
    let mut flags = Flags { instance: -1, element: -1, ..Flags::default() };
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| iter.next().cloned().ok_or_else(|| format!("{name} needs a value"));
        match arg.as_str() {
            "-s" | "--style" => flags.style = Some(parse_style(&value("--style")?)?),
            "--select" => flags.select.push(value("--select")?),
            "-o" | "--options" => flags.options = Some(value("--options")?),
            "--instancer" => flags.instancer = Some(value("--instancer")?),
            "--instance" => flags.instance = parse_int(&value("--instance")?)?,
            "--element" => flags.element = parse_int(&value("--element")?)?,
            "-a" | "--all" => flags.all = true,
            _ => positional.push(arg.as_str()),
        }
    }
    Ok((flags, positional))
}

fn parse_int(s: &str) -> std::result::Result<i32, String> {
    s.parse().map_err(|_| format!("'{s}' is not an integer"))
}

fn parse_style(s: &str) -> std::result::Result<DisplayStyle, String> {
    let mut style = DisplayStyle::NONE;
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        style |= match part.to_ascii_lowercase().as_str() {
            "shaded" => DisplayStyle::SHADED,
            "wireframe" | "wire" => DisplayStyle::WIREFRAME,
            "bbox" | "boundingbox" => DisplayStyle::BOUNDING_BOX,
            "xray" => DisplayStyle::XRAY,
            "textured" => DisplayStyle::TEXTURED,
            "defaultmaterial" => DisplayStyle::DEFAULT_MATERIAL,
            "flat" => DisplayStyle::FLAT_SHADED,
            other => return Err(format!("unknown display style '{other}'")),
        };
    }
    Ok(style)
}

fn print_help() {
    println!("scene-browser - inspect a flow viewport scene");
    println!();
    println!("USAGE:");
    println!("    scene-browser [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    t, tree <scene.json>              Show the filtered scene hierarchy");
    println!("    d, dump <scene.json> <path>       Dump the data of one prim");
    println!("    p, pick <scene.json> <path>       Resolve a pick hit on a prim");
    println!("    version                           Show version and build date");
    println!("    h, help                           Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -s, --style <a,b>     Display style: shaded, wireframe, bbox, xray,");
    println!("                          textured, defaultmaterial, flat");
    println!("    --select <usd path>   Select a stage prim (repeatable)");
    println!("    -o, --options <file>  Viewport options JSON");
    println!("    --instancer <path>    Pick: instancer drawing the hit prim");
    println!("    --instance <n>        Pick: instance index");
    println!("    --element <n>         Pick: face index");
    println!("    -a, --all             Tree: show prim types and paths");
    println!();
    println!("ENVIRONMENT:");
    println!("    FVP_TRACE             Diagnostics filter, e.g. 1 or fvp::pick=debug");
    println!("    FVP_GEOM_SUBSETS_PICK_MODE, FVP_POINT_INSTANCES_PICK_MODE, FVP_SELECTION_KIND");
    println!();
    println!("EXAMPLES:");
    println!("    scene-browser tree stage.json --select /A/Cube -s shaded,wireframe");
    println!("    scene-browser pick stage.json /stage/Instancer/Proto --instancer /stage/Instancer --instance 2");
}

/// A loaded scene composed and filtered like a viewport scene.
struct Session {
    node: Arc<dyn DccNode>,
    registry: Arc<SceneIndexRegistry>,
    chain: FilteringChain,
    options: ViewportOptions,
}

impl Session {
    fn open(file: &str, flags: &Flags) -> Result<Self> {
        let description = SceneDescription::load(file)?;
        let options = match &flags.options {
            Some(path) => ViewportOptions::load(path)?,
            None => ViewportOptions::default(),
        }
        .with_env_overrides();

        let merging = MergingSceneIndex::new();
        let registry = Arc::new(SceneIndexRegistry::new(merging.clone()));
        let scene: SceneIndexHandle = description.build()?;
        let factory: ProducerFactory =
            Arc::new(move |ctx: &ProducerContext<'_>| Ok(ProducedScene::usd(scene.clone(), ctx.node.app_path())));
        registry.register_producer(STAGE_NODE_TYPE, factory);

        let name = if description.name.is_empty() { "stage" } else { description.name.as_str() };
        let node: Arc<dyn DccNode> = Arc::new(SimpleNode::new(name, STAGE_NODE_TYPE));
        registry.node_added(&node)?;

        let chain = FilteringChain::new(merging, options.clone().into_shared())?;
        if let Some(style) = flags.style {
            chain.update_display_style(style)?;
        }

        let session = Self { node, registry, chain, options };
        session.select(&flags.select)?;
        Ok(session)
    }

    fn stage_app_path(&self, usd_path: &ScenePath) -> AppPath {
        self.node
            .app_path()
            .append_segment(PathSegment::new(RunTimeId::USD, '/', usd_path.components().iter().cloned()))
    }

    fn select(&self, paths: &[String]) -> Result<()> {
        let mut global = AppSelection::new();
        let mut ops = Vec::new();
        for path in paths {
            let app_path = self.stage_app_path(&ScenePath::parse(path)?);
            global.append(app_path.clone());
            ops.push(SelectionOp::Append(app_path));
        }
        if !ops.is_empty() {
            self.chain.on_selection_changed(&SelectionChanged::Composite(ops), &global);
        }
        Ok(())
    }
}

fn cmd_tree(file: &str, flags: &Flags) -> Result<()> {
    let session = Session::open(file, flags)?;
    let scene = session.chain.terminal_scene();
    let selected = session.chain.fully_selected_paths();
    for path in PrimView::new(scene.as_ref(), &ScenePath::absolute_root()) {
        if path.is_absolute_root() {
            continue;
        }
        let prim = scene.get_prim(&path);
        let indent = "  ".repeat(path.element_count().saturating_sub(1));
        let mark = if selected.contains(&path) { " *" } else { "" };
        if flags.all {
            println!("{indent}{} [{}] {path}{mark}", path.name(), prim.prim_type);
        } else {
            println!("{indent}{}{mark}", path.name());
        }
    }
    println!();
    println!("style: {:?}", session.chain.display_style());
    println!("chain: {:?}", session.chain.stage_kinds());
    Ok(())
}

fn cmd_dump(file: &str, path: &str, flags: &Flags) -> Result<()> {
    let session = Session::open(file, flags)?;
    let path = ScenePath::parse(path)?;
    let prim = session.chain.terminal_scene().get_prim(&path);
    if !prim.is_defined() {
        return Err(flow_viewport::Error::other(format!("no prim at {path}")));
    }
    println!("{path} [{}]", prim.prim_type);
    if let Some(ds) = prim.data_source {
        let mut out = String::new();
        dump(&DataSource::Container(ds), 1, &mut out);
        print!("{out}");
    }
    Ok(())
}

fn cmd_pick(file: &str, path: &str, flags: &Flags) -> Result<()> {
    let session = Session::open(file, flags)?;
    let object_id = ScenePath::parse(path)?;
    let hit = match &flags.instancer {
        Some(instancer) => PickHit::instance(object_id, ScenePath::parse(instancer)?, flags.instance),
        None => PickHit::prim(object_id),
    }
    .with_element(flags.element);

    let resolver = PickResolver::new(session.registry.clone(), session.options.clone().into_shared());
    let scene = session.chain.terminal_scene();
    let result = resolver.resolve(scene.as_ref(), &[hit]);
    if !result.is_success() {
        println!("nothing picked");
        return Ok(());
    }
    for app_path in result.output.selection.iter() {
        println!("{app_path}");
    }
    for native in &result.output.native {
        println!("{} @ {}", native.path, native.world_hit_point);
    }
    Ok(())
}
