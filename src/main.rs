//! Edge of the World entry point
//!
//! Two thin hosts over the same simulation: the browser game (wasm) and a
//! headless autopilot for native runs.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use edge_of_the_world::Settings;
    use edge_of_the_world::Tuning;
    use edge_of_the_world::audio::{AudioManager, SoundEffect};
    use edge_of_the_world::consts::SIM_DT;
    use edge_of_the_world::persistence::{Codex, HttpLoreStore, NewLore, SaveOutcome};
    use edge_of_the_world::platform::{Action, FrameClock, InputLatch, is_action_key};
    use edge_of_the_world::renderer::RenderState;
    use edge_of_the_world::sim::{Field, GameEvent, GamePhase, GameState, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        canvas: HtmlCanvasElement,
        clock: FrameClock,
        input: InputLatch,
        audio: AudioManager,
        settings: Settings,
        codex: Codex,
        lore_store: HttpLoreStore,
        /// Discoveries waiting to be sent to the lore store
        pending_saves: Vec<NewLore>,
        /// Handle of the scheduled animation frame, if any
        frame_handle: Option<i32>,
    }

    impl Game {
        fn new(seed: u64, canvas: HtmlCanvasElement, settings: Settings) -> Self {
            let field = Field {
                width: canvas.client_width().max(1) as f32,
                height: canvas.client_height().max(1) as f32,
            };
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            let lore_store = HttpLoreStore::new(settings.lore_endpoint.clone());

            Self {
                state: GameState::with_tuning(seed, Tuning::default(), field),
                render_state: None,
                canvas,
                clock: FrameClock::new(),
                input: InputLatch::default(),
                audio,
                settings,
                codex: Codex::new(),
                lore_store,
                pending_saves: Vec::new(),
                frame_handle: None,
            }
        }

        /// Run simulation ticks for the time elapsed since the last frame
        fn update(&mut self, time: f64) {
            let steps = self.clock.advance(time);
            for _ in 0..steps {
                let input = self.input.take();
                tick(&mut self.state, &input, SIM_DT);
                if self.state.phase == GamePhase::GameOver {
                    break;
                }
            }

            for event in self.state.drain_events() {
                self.handle_event(event);
            }
        }

        fn handle_event(&mut self, event: GameEvent) {
            if let Some(effect) = SoundEffect::for_event(&event) {
                self.audio.play(effect);
            }
            match event {
                GameEvent::LoreCollected(discovery) => {
                    self.pending_saves.push(NewLore::from(discovery));
                }
                GameEvent::BiomeChanged { .. } => self.paint_canvas_background(),
                GameEvent::GameOver { .. } => self.update_codex(),
                _ => {}
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, &self.settings) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn paint_canvas_background(&self) {
            let css = self.state.biome().background.to_css();
            let _ = self.canvas.style().set_property("background-color", &css);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = document() else { return };
            let state = &self.state;

            set_text(&document, "score", &state.score.to_string());
            set_text(&document, "distance", &state.display_distance().to_string());
            set_visible(&document, "distance-item", self.settings.show_distance);
            set_text(&document, "biome", state.biome().name);
            set_text(&document, "lore-collected", &state.lore_collected.to_string());
            set_text(
                &document,
                "revive-status",
                if state.player.has_revive {
                    "REVIVE ACTIVE"
                } else {
                    ""
                },
            );

            set_visible(&document, "start-screen", state.phase == GamePhase::Ready);
            set_visible(&document, "game-over", state.phase == GamePhase::GameOver);
            if state.phase == GamePhase::GameOver {
                set_text(&document, "final-score", &state.score.to_string());
            }
        }

        /// Rebuild the codex list from confirmed lore records
        fn update_codex(&self) {
            let Some(document) = document() else { return };
            let Some(list) = document.get_element_by_id("codex") else {
                return;
            };

            list.set_text_content(None);
            for entry in self.codex.entries() {
                if let Ok(item) = document.create_element("li") {
                    item.set_text_content(Some(&format!(
                        "{} ({}): {}",
                        entry.title, entry.biome, entry.content
                    )));
                    let _ = list.append_child(&item);
                }
            }
        }

        /// Fit the playfield and surface to the canvas' displayed size
        fn resize(&mut self) {
            let Some(window) = web_sys::window() else { return };
            let dpr = window.device_pixel_ratio();
            let client_w = self.canvas.client_width().max(1);
            let client_h = self.canvas.client_height().max(1);
            let width = (client_w as f64 * dpr) as u32;
            let height = (client_h as f64 * dpr) as u32;

            self.canvas.set_width(width);
            self.canvas.set_height(height);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
            self.state.resize(client_w as f32, client_h as f32);
            log::debug!("Resized playfield to {client_w}x{client_h}");
        }

        /// Cancel the pending animation frame, if one is scheduled
        fn stop_loop(&mut self) {
            if let Some(handle) = self.frame_handle.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(handle);
                }
            }
        }

        /// Start a fresh run straight into play
        fn restart(&mut self, seed: u64) {
            self.stop_loop();
            let field = self.state.field;
            self.state = GameState::with_tuning(seed, Tuning::default(), field);
            self.clock.reset();
            self.input.clear();
            self.input.press(self.state.phase);
            self.pending_saves.clear();
            self.paint_canvas_background();
            log::info!("Game restarted with seed: {}", seed);
        }

        /// Flip the persisted mute preference
        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.audio.apply_settings(&self.settings);
            self.settings.save();
            log::info!("Muted: {}", self.settings.muted);
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Edge of the World starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, canvas.clone(), settings)));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(err) => log::error!("Failed to create device: {err}"),
        }
        {
            let mut g = game.borrow_mut();
            g.resize();
            g.paint_canvas_background();
        }

        fetch_codex(game.clone());

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_window_handlers(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Edge of the World running!");
    }

    /// Load previously discovered lore for the codex
    fn fetch_codex(game: Rc<RefCell<Game>>) {
        let store = game.borrow().lore_store.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = store.list_lore().await;
            let mut g = game.borrow_mut();
            g.codex.record_fetch(result);
            g.update_codex();
        });
    }

    /// Persist a discovery without blocking the frame loop
    fn save_lore(game: Rc<RefCell<Game>>, lore: NewLore) {
        let store = game.borrow().lore_store.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = store.create_lore(&lore).await;
            let mut g = game.borrow_mut();
            if g.codex.record_save(result) == SaveOutcome::Created {
                g.update_codex();
            }
        });
    }

    /// Route a press to the latch; a start press also wakes audio
    fn press(game: &Rc<RefCell<Game>>) {
        let mut g = game.borrow_mut();
        let phase = g.state.phase;
        if g.input.press(phase) == Some(Action::Start) {
            g.audio.resume();
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                press(&game);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Start button on the start screen
        if let Some(btn) = document().and_then(|d| d.get_element_by_id("start-btn")) {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                press(&game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if is_action_key(&code) {
                    event.prevent_default();
                    press(&game);
                } else if code == "KeyM" {
                    game.borrow_mut().toggle_mute();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let scheduled = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => scheduled.borrow_mut().frame_handle = Some(handle),
            Err(err) => log::error!("requestAnimationFrame failed: {:?}", err),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let (saves, running) = {
            let mut g = game.borrow_mut();
            g.frame_handle = None;

            g.update(time);
            g.render();
            g.update_hud();

            let running = g.state.phase != GamePhase::GameOver;
            if !running {
                g.stop_loop();
                log::info!("Frame loop stopped");
            }
            (std::mem::take(&mut g.pending_saves), running)
        };

        for lore in saves {
            save_lore(game.clone(), lore);
        }
        if running {
            request_animation_frame(game);
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id("restart-btn")) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let seed = js_sys::Date::now() as u64;
            game.borrow_mut().restart(seed);
            request_animation_frame(game.clone());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_window_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Resize
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mute on blur
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restore on focus; also drop the time spent away
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.audio.set_muted(false);
                g.clock.reset();
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use edge_of_the_world::consts::SIM_DT;
    use edge_of_the_world::persistence::{
        Codex, LoreStore, MemoryLoreStore, NewLore, SaveOutcome,
    };
    use edge_of_the_world::platform::InputLatch;
    use edge_of_the_world::sim::{GameEvent, GamePhase, GameState, tick};

    /// Ten simulated minutes
    const MAX_TICKS: u64 = 60 * 60 * 10;
    /// Frames of warning the autopilot wants before reaching an obstacle
    const JUMP_LEAD_FRAMES: f32 = 12.0;

    /// Jump when a low obstacle is about to reach the player
    fn should_jump(state: &GameState) -> bool {
        if !state.player.grounded {
            return false;
        }
        let player = state.player.body.aabb();
        let reach = player.right() + state.speed * JUMP_LEAD_FRAMES;
        state.obstacles.iter().any(|o| {
            let b = o.body.aabb();
            b.left() >= player.left() && b.left() <= reach && b.bottom() > player.top()
        })
    }

    pub fn run(seed: u64) {
        log::info!("Headless run with seed: {}", seed);

        let mut state = GameState::new(seed);
        let mut input = InputLatch::default();
        let mut store = MemoryLoreStore::new();
        let mut codex = Codex::new();
        codex.record_fetch(store.list_lore());
        let mut repeats = 0u32;

        input.press(state.phase);
        while state.phase != GamePhase::GameOver && state.time_ticks < MAX_TICKS {
            if should_jump(&state) {
                input.press(state.phase);
            }
            tick(&mut state, &input.take(), SIM_DT);

            for event in state.drain_events() {
                if let GameEvent::LoreCollected(discovery) = event {
                    let elapsed_ms = (state.time_ticks as f64 * SIM_DT as f64 * 1000.0) as u64;
                    store.set_clock(elapsed_ms);
                    let outcome = codex.record_save(store.create_lore(&NewLore::from(discovery)));
                    if outcome == SaveOutcome::AlreadyKnown {
                        repeats += 1;
                    }
                }
            }
        }

        println!("Score:    {}", state.score);
        println!("Distance: {}", state.display_distance());
        println!("Biome:    {}", state.biome().name);
        println!("Lore:     {} collected", state.lore_collected);
        println!("Codex:    {} records, {} repeats", codex.len(), repeats);
        if codex.is_empty() {
            println!("  (nothing discovered)");
        }
        for entry in codex.entries() {
            println!("  {} ({}): {}", entry.title, entry.biome, entry.content);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Edge of the World (native) starting...");
    log::info!("Native mode runs the simulation headless - use `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
