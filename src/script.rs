// "Custom Script" background: user-authored Rhai code drawing on the canvas.
// Visual: whatever the script paints becomes the background.
//
// The script's top-level body is the background's draw hook. If it also defines
// `fn overlay()`, that function runs after the user image has been drawn.
//
// Scripts are NOT sandboxed beyond Rhai's own operation cap: whatever the user
// loads runs against the canvas, and the side panel says so.

use crate::background::{Background, Control, ExtraControls, Overlay};
use crate::draw::{clear_rect, draw_stripes, fill_path, fill_rect, stroke_path};
use crate::error::{Error, Result};
use crate::path::Path;
use crate::types::{Color, FrameBuffer};
use rhai::{Array, CallFnOptions, Dynamic, Engine, EvalAltResult, ImmutableString, ParseError, Scope, AST};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// What runs until the user loads their own script: two eyes and an arc for a mouth.
pub const DEFAULT_SCRIPT: &str = r#"
clear_rect(0, 0, width(), height());
fill_style("black");

begin_path();
ellipse(width() / 4, height() / 5, width() / 10, height() / 10, 0, 0, 2 * PI());
fill();

begin_path();
ellipse(width() * 3 / 4, height() / 5, width() / 10, height() / 10, 0, 0, 2 * PI());
fill();

line_width(width() / 30);
begin_path();
ellipse(width() / 2, height() * 3 / 4, width() / 4, height() / 4, 0, PI(), 0);
stroke();
"#;

const UNSANDBOXED_NOTE: &str = "Scripts are not sandboxed: only run code you trust";

/* --- Script context ---
   Drawing state shared between the engine and the host functions below. */

struct ScriptCanvas {
    /// The compositor's canvas, lent to the script for the duration of a run.
    fb: FrameBuffer,
    fill: Color,
    stroke: Color,
    line_width: f32,
    path: Path,
}

impl ScriptCanvas {
    fn new() -> Self {
        Self {
            fb: FrameBuffer::default(),
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            path: Path::new(),
        }
    }
}

type SharedCanvas = Arc<Mutex<ScriptCanvas>>;

fn lock(canvas: &SharedCanvas) -> std::sync::MutexGuard<'_, ScriptCanvas> {
    canvas.lock().unwrap_or_else(|e| e.into_inner())
}

type HostResult<T> = std::result::Result<T, Box<EvalAltResult>>;

/// Scripts pass ints and floats interchangeably.
fn num(v: &Dynamic) -> HostResult<f32> {
    if let Ok(f) = v.as_float() {
        return Ok(f as f32);
    }
    if let Ok(i) = v.as_int() {
        return Ok(i as f32);
    }
    Err(format!("expected a number, got {}", v.type_name()).into())
}

fn color(s: &str) -> HostResult<Color> {
    Color::parse(s).map_err(|e| e.to_string().into())
}

/* --- Engine + canvas API ---
   Visual: each registered call paints straight onto the lent canvas. */

fn create_engine(canvas: SharedCanvas, max_operations: u64) -> Engine {
    let mut engine = Engine::new();

    engine.set_max_operations(max_operations);
    engine.set_max_call_levels(64);
    engine.set_max_expr_depths(64, 64);
    engine.on_print(|s| info!(target: "script", "{s}"));
    engine.on_debug(|s, _src, pos| debug!(target: "script", ?pos, "{s}"));

    register_canvas_api(&mut engine, canvas);
    engine
}

fn register_canvas_api(engine: &mut Engine, ctx: SharedCanvas) {
    let c = ctx.clone();
    engine.register_fn("width", move || -> f64 { lock(&c).fb.width as f64 });

    let c = ctx.clone();
    engine.register_fn("height", move || -> f64 { lock(&c).fb.height as f64 });

    // ── style ──
    let c = ctx.clone();
    engine.register_fn("fill_style", move |s: ImmutableString| -> HostResult<()> {
        lock(&c).fill = color(&s)?;
        Ok(())
    });

    let c = ctx.clone();
    engine.register_fn("stroke_style", move |s: ImmutableString| -> HostResult<()> {
        lock(&c).stroke = color(&s)?;
        Ok(())
    });

    let c = ctx.clone();
    engine.register_fn("line_width", move |w: Dynamic| -> HostResult<()> {
        let w = num(&w)?;
        // Like the canvas API: non-positive widths are ignored
        if w > 0.0 {
            lock(&c).line_width = w;
        }
        Ok(())
    });

    // ── rectangles ──
    let c = ctx.clone();
    engine.register_fn("fill_rect", move |x: Dynamic, y: Dynamic, w: Dynamic, h: Dynamic| -> HostResult<()> {
        let (x, y, w, h) = (num(&x)?, num(&y)?, num(&w)?, num(&h)?);
        let mut guard = lock(&c);
        let fill = guard.fill;
        fill_rect(&mut guard.fb, x, y, w, h, fill);
        Ok(())
    });

    let c = ctx.clone();
    engine.register_fn("clear_rect", move |x: Dynamic, y: Dynamic, w: Dynamic, h: Dynamic| -> HostResult<()> {
        let (x, y, w, h) = (num(&x)?, num(&y)?, num(&w)?, num(&h)?);
        clear_rect(&mut lock(&c).fb, x, y, w, h);
        Ok(())
    });

    let c = ctx.clone();
    engine.register_fn("stripes", move |colors: Array| -> HostResult<()> {
        let colors = colors
            .into_iter()
            .map(|v| {
                let s = v.into_immutable_string().map_err(|t| format!("stripe colours must be strings, got {t}"))?;
                color(&s)
            })
            .collect::<HostResult<Vec<_>>>()?;
        draw_stripes(&mut lock(&c).fb, &colors);
        Ok(())
    });

    // ── paths ──
    let c = ctx.clone();
    engine.register_fn("begin_path", move || {
        lock(&c).path = Path::new();
    });

    let c = ctx.clone();
    engine.register_fn("move_to", move |x: Dynamic, y: Dynamic| -> HostResult<()> {
        let (x, y) = (num(&x)?, num(&y)?);
        lock(&c).path.move_to(x, y);
        Ok(())
    });

    let c = ctx.clone();
    engine.register_fn("line_to", move |x: Dynamic, y: Dynamic| -> HostResult<()> {
        let (x, y) = (num(&x)?, num(&y)?);
        lock(&c).path.line_to(x, y);
        Ok(())
    });

    let c = ctx.clone();
    engine.register_fn("close_path", move || {
        lock(&c).path.close();
    });

    let c = ctx.clone();
    engine.register_fn(
        "ellipse",
        move |x: Dynamic, y: Dynamic, rx: Dynamic, ry: Dynamic, rot: Dynamic, start: Dynamic, end: Dynamic| -> HostResult<()> {
            let (x, y, rx, ry) = (num(&x)?, num(&y)?, num(&rx)?, num(&ry)?);
            let (rot, start, end) = (num(&rot)?, num(&start)?, num(&end)?);
            if rx < 0.0 || ry < 0.0 {
                return Err("ellipse radii must not be negative".into());
            }
            lock(&c).path.ellipse(x, y, rx, ry, rot, start, end);
            Ok(())
        },
    );

    let c = ctx.clone();
    engine.register_fn("fill", move || {
        let mut guard = lock(&c);
        let ScriptCanvas { fb, fill, path, .. } = &mut *guard;
        fill_path(fb, path, *fill);
    });

    let c = ctx;
    engine.register_fn("stroke", move || {
        let mut guard = lock(&c);
        let ScriptCanvas { fb, stroke, line_width, path, .. } = &mut *guard;
        stroke_path(fb, path, *line_width, *stroke);
    });
}

fn eval_error(err: Box<EvalAltResult>) -> Error {
    Error::Script { line: err.position().line(), message: err.to_string() }
}

fn parse_error(err: ParseError) -> Error {
    Error::Script { line: err.1.line(), message: err.0.to_string() }
}

/* --- The background itself --- */

pub struct CustomScript {
    engine: Engine,
    canvas: SharedCanvas,
    ast: AST,
    has_overlay: bool,
    path: Option<PathBuf>,
}

impl CustomScript {
    /// Starts out running `DEFAULT_SCRIPT`. `max_operations` of 0 means no cap.
    pub fn new(max_operations: u64) -> Result<Self> {
        let canvas = Arc::new(Mutex::new(ScriptCanvas::new()));
        let engine = create_engine(canvas.clone(), max_operations);
        let ast = engine.compile(DEFAULT_SCRIPT).map_err(parse_error)?;
        Ok(Self { engine, canvas, ast, has_overlay: false, path: None })
    }

    /// Compile and swap in new source. On error the previous script stays active.
    pub fn set_source(&mut self, source: &str, path: Option<PathBuf>) -> Result<()> {
        let ast = self.engine.compile(source).map_err(parse_error)?;
        self.has_overlay = ast.iter_functions().any(|f| f.name == "overlay" && f.params.is_empty());
        self.ast = ast;
        self.path = path;
        warn!(
            path = ?self.path,
            overlay = self.has_overlay,
            "custom script loaded; it runs unsandboxed against the canvas"
        );
        Ok(())
    }

    /// Lend `fb` to the script for one run, then take it back (even if the run failed).
    fn run_on<T>(&self, fb: &mut FrameBuffer, run: impl FnOnce() -> HostResult<T>) -> Result<T> {
        {
            let mut c = lock(&self.canvas);
            *c = ScriptCanvas { fb: std::mem::take(fb), ..ScriptCanvas::new() };
        }
        let result = run();
        *fb = std::mem::take(&mut lock(&self.canvas).fb);
        result.map_err(eval_error)
    }
}

impl Background for CustomScript {
    fn id(&self) -> &str { "custom-script" }
    fn name(&self) -> &str { "Custom Script" }

    fn setup(&mut self, controls: &mut ExtraControls) {
        controls.reset();
        controls.push(Control::File { label: "Script".into(), path: self.path.clone() });
        controls.push(Control::Note(UNSANDBOXED_NOTE.into()));
    }

    fn draw<'a>(&'a self, canvas: &mut FrameBuffer) -> Result<Option<Overlay<'a>>> {
        self.run_on(canvas, || self.engine.run_ast_with_scope(&mut Scope::new(), &self.ast))?;

        if !self.has_overlay {
            return Ok(None);
        }
        Ok(Some(Box::new(move |canvas: &mut FrameBuffer| {
            self.run_on(canvas, || {
                // Only the function: re-running the body would paint over the user image.
                let options = CallFnOptions::new().eval_ast(false);
                self.engine
                    .call_fn_with_options::<Dynamic>(options, &mut Scope::new(), &self.ast, "overlay", ())
                    .map(|_| ())
            })
        })))
    }

    fn load_source(&mut self, path: &std::path::Path) -> Result<bool> {
        let source = std::fs::read_to_string(path)?;
        self.set_source(&source, Some(path.to_path_buf()))?;
        Ok(true)
    }
}
