//! Grid Arcade entry point
//!
//! The browser build wires the games to a canvas, the keyboard and the
//! game switcher. The native build plays both games headlessly with a
//! simple autopilot and logs how it went.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent};

    use grid_arcade::renderer::{Batch, GpuRenderer, TextAlign, TextRun, Viewport, css_color};
    use grid_arcade::storage::{KeyValueStore, LocalStore};
    use grid_arcade::{GameKind, Runner, Settings, new_game};

    const CANVAS_ID: &str = "game-canvas";
    const HUD_ID: &str = "hud";
    const SWITCHER_ID: &str = "game-switcher";
    const BUTTON_SELECTOR: &str = ".game-button[data-game]";

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
    type SharedRenderer = Rc<RefCell<Option<GpuRenderer>>>;

    fn document() -> Result<Document, JsValue> {
        web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))
    }

    /// Text runs laid out as absolutely positioned spans over the canvas
    struct Hud {
        root: Element,
        /// Device pixels per CSS pixel
        dpr: f32,
        shown: Vec<TextRun>,
    }

    impl Hud {
        fn new(root: Element, dpr: f32) -> Self {
            Self {
                root,
                dpr,
                shown: Vec::new(),
            }
        }

        /// Replace the spans, skipping the DOM entirely when nothing changed
        fn sync(&mut self, runs: &[TextRun]) {
            if self.shown == runs {
                return;
            }
            if let Err(e) = self.rebuild(runs) {
                log::warn!("HUD update failed: {:?}", e);
                return;
            }
            self.shown = runs.to_vec();
        }

        fn rebuild(&self, runs: &[TextRun]) -> Result<(), JsValue> {
            let document = document()?;
            self.root.set_inner_html("");
            for run in runs {
                let span = document.create_element("span")?;
                span.set_text_content(Some(&run.text));
                // Runs are anchored at their baseline; approximate with the bottom edge
                let shift = match run.align {
                    TextAlign::Left => "translate(0, -100%)",
                    TextAlign::Center => "translate(-50%, -100%)",
                };
                span.set_attribute(
                    "style",
                    &format!(
                        "position:absolute; left:{}px; top:{}px; transform:{}; \
                         font:{}px sans-serif; color:{}; white-space:nowrap;",
                        run.pos.x / self.dpr,
                        run.pos.y / self.dpr,
                        shift,
                        run.size_px / self.dpr,
                        css_color(run.color),
                    ),
                )?;
                self.root.append_child(&span)?;
            }
            Ok(())
        }

        fn clear(&mut self) {
            self.root.set_inner_html("");
            self.shown.clear();
        }

        /// Positions depend on the ratio, so the next sync rebuilds
        fn set_dpr(&mut self, dpr: f32) {
            self.dpr = dpr;
            self.shown.clear();
        }
    }

    /// One running game plus the browser hooks that drive it
    struct GameHandle {
        runner: Rc<RefCell<Runner>>,
        hud: Rc<RefCell<Hud>>,
        frame_id: Rc<Cell<Option<i32>>>,
        frame_cb: FrameCallback,
        key_cb: Closure<dyn FnMut(KeyboardEvent)>,
    }

    impl GameHandle {
        fn start(
            kind: GameKind,
            settings: &Settings,
            gpu: SharedRenderer,
            hud: Rc<RefCell<Hud>>,
            viewport: Viewport,
        ) -> Result<Self, JsValue> {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
            let seed = js_sys::Date::now() as u64;
            let game = new_game(kind, settings, Box::new(LocalStore), seed);
            let runner = Rc::new(RefCell::new(Runner::new(
                game,
                viewport,
                settings.show_grid,
            )));

            let key_cb = {
                let runner = runner.clone();
                Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                    if runner.borrow_mut().key_down(&event.key()) {
                        event.prevent_default();
                    }
                })
            };
            window.add_event_listener_with_callback("keydown", key_cb.as_ref().unchecked_ref())?;

            let frame_id = Rc::new(Cell::new(None));
            let frame_cb: FrameCallback = Rc::new(RefCell::new(None));
            {
                let runner = runner.clone();
                let hud = hud.clone();
                let frame_id = frame_id.clone();
                let next = frame_cb.clone();
                let mut batch = Batch::new();
                *frame_cb.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |now: f64| {
                    frame_id.set(None);
                    batch.clear();
                    if !runner.borrow_mut().frame(now, &mut batch) {
                        return;
                    }
                    present(&gpu, &batch);
                    hud.borrow_mut().sync(&batch.texts);

                    let Some(window) = web_sys::window() else {
                        return;
                    };
                    if let Some(cb) = next.borrow().as_ref() {
                        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                            Ok(id) => frame_id.set(Some(id)),
                            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
                        }
                    }
                }));
            }

            if let Some(cb) = frame_cb.borrow().as_ref() {
                let id = window.request_animation_frame(cb.as_ref().unchecked_ref())?;
                frame_id.set(Some(id));
            }

            Ok(Self {
                runner,
                hud,
                frame_id,
                frame_cb,
                key_cb,
            })
        }

        fn kind(&self) -> GameKind {
            self.runner.borrow().kind()
        }

        fn resize(&self, viewport: Viewport) {
            let mut runner = self.runner.borrow_mut();
            if runner.viewport() != viewport {
                runner.resize(viewport);
            }
        }

        /// Stop the loop, detach input, clear the overlay. Safe to repeat.
        fn destroy(&mut self) {
            if !self.runner.borrow_mut().destroy() {
                return;
            }
            if let Some(window) = web_sys::window() {
                if let Some(id) = self.frame_id.take() {
                    let _ = window.cancel_animation_frame(id);
                }
                let _ = window.remove_event_listener_with_callback(
                    "keydown",
                    self.key_cb.as_ref().unchecked_ref(),
                );
            }
            // The frame closure holds a handle to its own slot
            self.frame_cb.borrow_mut().take();
            self.hud.borrow_mut().clear();
        }
    }

    impl Drop for GameHandle {
        fn drop(&mut self) {
            self.destroy();
        }
    }

    fn present(gpu: &SharedRenderer, batch: &Batch) {
        let mut gpu = gpu.borrow_mut();
        let Some(renderer) = gpu.as_mut() else {
            return;
        };
        match renderer.render(&batch.vertices) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => {
                let (w, h) = renderer.size();
                renderer.resize(w, h);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => log::error!("Out of memory!"),
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }

    /// Find the element by id, or create it under `<body>`
    fn ensure_element(
        document: &Document,
        id: &str,
        tag: &str,
        style: &str,
    ) -> Result<Element, JsValue> {
        if let Some(el) = document.get_element_by_id(id) {
            return Ok(el);
        }
        let el = document.create_element(tag)?;
        el.set_id(id);
        el.set_attribute("style", style)?;
        document
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&el)?;
        Ok(el)
    }

    /// The switcher buttons, created if the page does not supply them
    fn switcher_buttons(document: &Document) -> Result<Vec<HtmlElement>, JsValue> {
        if document.query_selector(BUTTON_SELECTOR)?.is_none() {
            let bar = ensure_element(
                document,
                SWITCHER_ID,
                "div",
                "position:fixed; top:10px; right:12px; z-index:10; display:flex; gap:8px;",
            )?;
            for kind in GameKind::ALL {
                let button = document.create_element("button")?;
                button.set_class_name("game-button");
                button.set_attribute("data-game", kind.as_str())?;
                let label = match kind {
                    GameKind::Blocks => "Blocks",
                    GameKind::Snake => "Snake",
                };
                button.set_text_content(Some(label));
                bar.append_child(&button)?;
            }
        }

        let nodes = document.query_selector_all(BUTTON_SELECTOR)?;
        let mut buttons = Vec::with_capacity(nodes.length() as usize);
        for i in 0..nodes.length() {
            if let Some(node) = nodes.get(i) {
                buttons.push(node.dyn_into::<HtmlElement>()?);
            }
        }
        Ok(buttons)
    }

    /// Match the canvas backing store to its CSS size. Returns the new
    /// pixel size and the device pixel ratio.
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32, f64) {
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height, dpr)
    }

    fn mark_active(buttons: &[HtmlElement], kind: GameKind) {
        for button in buttons {
            let is_active = button.get_attribute("data-game").as_deref() == Some(kind.as_str());
            let _ = button.class_list().toggle_with_force("active", is_active);
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger init failed: {e}").into());
        }

        log::info!("Grid Arcade starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = document()?;

        let canvas: HtmlCanvasElement = ensure_element(
            &document,
            CANVAS_ID,
            "canvas",
            "position:fixed; inset:0; width:100vw; height:100vh; display:block;",
        )?
        .dyn_into()?;
        let hud_root = ensure_element(
            &document,
            HUD_ID,
            "div",
            "position:fixed; inset:0; pointer-events:none; font-family:sans-serif;",
        )?;

        let (width, height, dpr) = fit_canvas(&window, &canvas);
        let viewport = Rc::new(Cell::new(Viewport::new(width as f32, height as f32)));

        let settings = Settings::load(&LocalStore);
        // Seed the entry so the tuning can be edited by hand
        if LocalStore.get(Settings::STORAGE_KEY).is_none() {
            if let Err(e) = settings.save(&mut LocalStore) {
                log::warn!("Could not store default settings: {}", e);
            }
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("surface: {e}")))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("adapter: {e}")))?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let renderer = GpuRenderer::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&format!("device: {e}")))?;
        let gpu: SharedRenderer = Rc::new(RefCell::new(Some(renderer)));
        let hud = Rc::new(RefCell::new(Hud::new(hud_root, dpr as f32)));

        let buttons = Rc::new(switcher_buttons(&document)?);
        let current: Rc<RefCell<Option<GameHandle>>> = Rc::new(RefCell::new(None));

        let start = {
            let current = current.clone();
            let buttons = buttons.clone();
            let gpu = gpu.clone();
            let hud = hud.clone();
            let viewport = viewport.clone();
            move |kind: GameKind| {
                let mut current = current.borrow_mut();
                if let Some(mut old) = current.take() {
                    log::info!("Leaving {}", old.kind().as_str());
                    old.destroy();
                }
                match GameHandle::start(kind, &settings, gpu.clone(), hud.clone(), viewport.get()) {
                    Ok(handle) => {
                        mark_active(&buttons, kind);
                        *current = Some(handle);
                    }
                    Err(e) => log::error!("Failed to start {}: {:?}", kind.as_str(), e),
                }
            }
        };
        let start: Rc<dyn Fn(GameKind)> = Rc::new(start);

        for button in buttons.iter() {
            let start = start.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let kind = event
                    .current_target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|el| el.get_attribute("data-game"))
                    .and_then(|name| GameKind::from_str(&name));
                if let Some(kind) = kind {
                    start(kind);
                }
            });
            button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let on_resize = {
            let window = window.clone();
            Closure::<dyn FnMut()>::new(move || {
                let (width, height, dpr) = fit_canvas(&window, &canvas);
                let size = Viewport::new(width as f32, height as f32);
                if size == viewport.get() {
                    return;
                }
                viewport.set(size);
                if let Some(renderer) = gpu.borrow_mut().as_mut() {
                    renderer.resize(width, height);
                }
                hud.borrow_mut().set_dpr(dpr as f32);
                if let Some(handle) = current.borrow().as_ref() {
                    handle.resize(size);
                }
                log::debug!("Canvas resized to {}x{}", width, height);
            })
        };
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
        on_resize.forget();

        start(GameKind::Blocks);

        log::info!("Grid Arcade running!");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    web::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Grid Arcade (native) starting...");
    log::info!("The playable build targets the browser; running a headless demo");

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    for kind in grid_arcade::GameKind::ALL {
        let (score, frames) = demo::play(kind, seed);
        log::info!(
            "{}: scored {} in {:.1}s of game time",
            kind.as_str(),
            score,
            frames as f64 * demo::FRAME_MS / 1000.0
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autopilot runs at a fixed frame rate
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use grid_arcade::renderer::{Batch, Viewport};
    use grid_arcade::sim::{Direction, SnakeView};
    use grid_arcade::{GameKind, MemoryStore, RenderModel, Runner, Settings, new_game};

    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Ten minutes of game time
    const MAX_FRAMES: usize = 36_000;

    /// Play one game to its end (or the frame cap). Returns (score, frames).
    pub fn play(kind: GameKind, seed: u64) -> (u32, usize) {
        let settings = Settings::default();
        let game = new_game(kind, &settings, Box::new(MemoryStore::new()), seed);
        let mut runner = Runner::new(game, Viewport::new(800.0, 600.0), settings.show_grid);
        let mut batch = Batch::new();

        let mut frames = 0;
        while frames < MAX_FRAMES {
            batch.clear();
            runner.frame(frames as f64 * FRAME_MS, &mut batch);
            frames += 1;

            let Some(model) = runner.last_model() else {
                break;
            };
            if model.is_game_over() {
                break;
            }
            let key = match model {
                RenderModel::Snake(view) => steer(view).map(dom_key),
                RenderModel::Blocks(_) => blocks_key(frames),
            };
            if let Some(key) = key {
                runner.key_down(key);
            }
        }

        let score = runner.last_model().map(|m| m.score()).unwrap_or(0);
        runner.destroy();
        (score, frames)
    }

    /// Greedy: the safe direction that most shortens the distance to food
    pub fn steer(view: &SnakeView) -> Option<Direction> {
        let head = *view.body.first()?;
        Direction::ALL
            .into_iter()
            .filter(|&dir| {
                let next = head.step(dir);
                next.in_bounds(view.tiles, view.tiles)
                    && !view.body[..view.body.len().saturating_sub(1)].contains(&next)
            })
            .min_by_key(|&dir| head.step(dir).manhattan(view.food))
    }

    fn dom_key(dir: Direction) -> &'static str {
        match dir {
            Direction::Up => "ArrowUp",
            Direction::Down => "ArrowDown",
            Direction::Left => "ArrowLeft",
            Direction::Right => "ArrowRight",
        }
    }

    /// Sweep pieces side to side with occasional rotations and soft drops
    fn blocks_key(frame: usize) -> Option<&'static str> {
        match frame % 40 {
            0 => Some(" "),
            10 | 13 => Some("ArrowLeft"),
            20 | 23 | 26 => Some("ArrowRight"),
            f if f % 4 == 1 => Some("ArrowDown"),
            _ => None,
        }
    }
}
