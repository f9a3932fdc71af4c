//! Cone Crusher entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use futures::future::AbortHandle;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, TouchEvent};

    use cone_crusher::commentary::{GeminiClient, abortable, commentary_or_fallback, sleep_ms};
    use cone_crusher::consts::*;
    use cone_crusher::highscores::today;
    use cone_crusher::input::{Command, Control, ControlState};
    use cone_crusher::persistence::{KeyValueStore, LocalStorage, MemoryStore};
    use cone_crusher::renderer::{RenderState, SceneOptions, build_scene};
    use cone_crusher::sim::level_for_score;
    use cone_crusher::{Engine, HighScores, RunObserver, RunState, Settings, Tuning};

    /// What the engine reported during one frame
    #[derive(Default)]
    struct FrameEvents {
        progressed: bool,
        game_over: Option<u64>,
    }

    impl RunObserver for FrameEvents {
        fn on_progress(&mut self, _run: &RunState) {
            self.progressed = true;
        }

        fn on_game_over(&mut self, final_score: u64) {
            self.game_over = Some(final_score);
        }
    }

    /// Game instance holding all state
    struct Game {
        engine: Engine,
        run: RunState,
        controls: ControlState,
        high_scores: HighScores,
        settings: Settings,
        store: Box<dyn KeyValueStore>,
        render_state: Option<RenderState>,
        /// Outstanding commentary request, aborted when the player moves on
        commentary: Option<AbortHandle>,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let store: Box<dyn KeyValueStore> = match LocalStorage::open() {
                Some(storage) => Box::new(storage),
                None => {
                    log::warn!("LocalStorage unavailable, scores will not persist");
                    Box::new(MemoryStore::new())
                }
            };
            let high_scores = HighScores::load(store.as_ref());
            let settings = Settings::load(store.as_ref());

            Self {
                engine: Engine::new(seed, Tuning::default()),
                run: RunState::default(),
                controls: ControlState::new(),
                high_scores,
                settings,
                store,
                render_state: None,
                commentary: None,
            }
        }

        /// Run one simulation tick and react to what it reported
        fn update(&mut self) {
            let mut events = FrameEvents::default();
            self.engine
                .frame(self.controls.snapshot(), &mut self.run, &mut events);

            if events.progressed {
                self.update_hud();
            }
            if let Some(final_score) = events.game_over {
                self.on_game_over(final_score);
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let options = SceneOptions {
                reduced_motion: self.settings.reduced_motion,
            };
            let vertices = build_scene(
                self.engine.state(),
                self.engine.tuning().dash_period,
                &options,
            );

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
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

        fn start_run(&mut self) {
            let seed = js_sys::Date::now() as u64;
            self.cancel_commentary();
            self.engine.reset(seed);
            self.run = RunState::new_run();
            self.controls.release_all();
            log::info!("Run started with seed: {}", seed);

            show_screen(Screen::Playing);
            set_visible("touch-controls", self.settings.touch_controls);
            self.update_hud();
        }

        fn back_to_menu(&mut self) {
            self.cancel_commentary();
            self.run.reset_to_menu();
            self.controls.release_all();
            show_screen(Screen::Menu);
        }

        fn toggle_pause(&mut self) {
            let paused = self.run.toggle_pause();
            self.controls.release_all();
            set_visible("pause-overlay", paused);
        }

        /// Pause if a run is in progress and not already paused
        fn auto_pause(&mut self, reason: &str) {
            if self.run.is_running() {
                self.toggle_pause();
                log::info!("Auto-paused ({})", reason);
            }
        }

        fn on_game_over(&mut self, final_score: u64) {
            self.controls.release_all();
            set_text("final-score", &final_score.to_string());
            if let Some(input) = element_by_id::<HtmlInputElement>("player-name") {
                input.set_value("");
            }
            show_screen(Screen::GameOver);
            self.begin_commentary(final_score);
        }

        /// Fire the one-shot commentary request; the screen shows a loading
        /// indicator until it lands
        fn begin_commentary(&mut self, final_score: u64) {
            self.cancel_commentary();
            set_text("commentary", "");
            set_visible("commentary-loading", true);

            let client = if self.settings.commentary_enabled {
                GeminiClient::from_build_env()
                    .map_err(|e| log::debug!("Commentary disabled: {}", e))
                    .ok()
            } else {
                None
            };
            let timeout_ms = self.settings.commentary_timeout_ms;

            let request = async move {
                let mut rng = Pcg32::seed_from_u64(js_sys::Date::now() as u64);
                let timeout = sleep_ms(timeout_ms);
                commentary_or_fallback(client.as_ref(), final_score, timeout, &mut rng).await
            };
            let (task, handle) = abortable(request);
            self.commentary = Some(handle);

            wasm_bindgen_futures::spawn_local(async move {
                if let Some(text) = task.await {
                    set_visible("commentary-loading", false);
                    set_text("commentary", &format!("\"{}\"", text));
                }
            });
        }

        fn cancel_commentary(&mut self) {
            if let Some(handle) = self.commentary.take() {
                handle.abort();
            }
        }

        fn save_score(&mut self, name: &str) {
            let result = self.high_scores.save_score(
                self.store.as_mut(),
                name,
                self.run.score,
                today(),
            );
            if let Err(e) = result {
                log::warn!("Could not persist high scores: {}", e);
            }
            self.show_leaderboard();
        }

        fn show_leaderboard(&mut self) {
            render_leaderboard(&self.high_scores);
            show_screen(Screen::Leaderboard);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let level = level_for_score(self.run.score, self.engine.tuning());
            set_text("hud-score", &self.run.score.to_string());
            set_text("hud-level", &format!("Nivel {}", level));

            let hearts: String = (0..INITIAL_LIVES)
                .map(|i| if i < self.run.lives { '♥' } else { '♡' })
                .collect();
            set_text("hud-lives", &hearts);

            // Backdrop hue shifts with every level
            if let Some(backdrop) = element_by_id::<web_sys::HtmlElement>("backdrop") {
                let filter = format!("hue-rotate({}deg)", level * 45);
                let _ = backdrop.style().set_property("filter", &filter);
            }
        }
    }

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Screen {
        Menu,
        Playing,
        GameOver,
        Leaderboard,
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn element_by_id<T: JsCast>(id: &str) -> Option<T> {
        document()?.get_element_by_id(id)?.dyn_into::<T>().ok()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let classes = el.class_list();
            let _ = if visible {
                classes.remove_1("hidden")
            } else {
                classes.add_1("hidden")
            };
        }
    }

    fn show_screen(screen: Screen) {
        set_visible("menu", screen == Screen::Menu);
        set_visible("game-over", screen == Screen::GameOver);
        set_visible("leaderboard", screen == Screen::Leaderboard);
        set_visible("stage", screen == Screen::Playing);
        set_visible("hud", screen == Screen::Playing);
        set_visible("pause-overlay", false);
    }

    fn render_leaderboard(scores: &HighScores) {
        let Some(document) = document() else {
            return;
        };
        let Some(list) = document.get_element_by_id("leaderboard-list") else {
            return;
        };
        list.set_inner_html("");

        if scores.is_empty() {
            if let Ok(row) = document.create_element("p") {
                row.set_class_name("empty");
                row.set_text_content(Some("No hay récords aún... ¡Sé el primero!"));
                let _ = list.append_child(&row);
            }
            return;
        }

        for (rank, entry) in scores.entries.iter().enumerate() {
            let Ok(row) = document.create_element("li") else {
                continue;
            };
            // Names are player input: text nodes only
            for (class, text) in [
                ("rank", (rank + 1).to_string()),
                ("name", entry.name.clone()),
                ("date", entry.date.clone()),
                ("score", entry.score.to_string()),
            ] {
                if let Ok(cell) = document.create_element("span") {
                    cell.set_class_name(class);
                    cell.set_text_content(Some(&text));
                    let _ = row.append_child(&cell);
                }
            }
            let _ = list.append_child(&row);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Cone Crusher starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Backing store at device resolution, CSS size fixed to the stage
        let dpr = window.device_pixel_ratio();
        let width = (GAME_WIDTH as f64 * dpr) as u32;
        let height = (GAME_HEIGHT as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
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

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Failed to create device: {}", e),
        }

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }
        show_screen(Screen::Menu);

        setup_keyboard(game.clone());
        setup_touch_controls(game.clone());
        setup_buttons(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Cone Crusher running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let code = event.code();
                if g.run.started && g.controls.set_key(&code, true) {
                    event.prevent_default();
                } else if let Some(Command::TogglePause) = Command::from_key_code(&code) {
                    g.toggle_pause();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().controls.set_key(&event.code(), false);
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_touch_controls(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };

        for (id, control) in [("touch-left", Control::Left), ("touch-right", Control::Right)] {
            let Some(button) = document.get_element_by_id(id) else {
                continue;
            };

            for (event_name, down) in [
                ("touchstart", true),
                ("touchend", false),
                ("touchcancel", false),
            ] {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    game.borrow_mut().controls.set_touch(control, down);
                });
                let _ = button
                    .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    /// Attach a click handler to the element with `id`
    fn on_click(id: &str, game: Rc<RefCell<Game>>, handler: fn(&mut Game)) {
        let Some(button) = document().and_then(|d| d.get_element_by_id(id)) else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            handler(&mut game.borrow_mut());
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        on_click("start-btn", game.clone(), Game::start_run);
        on_click("retry-btn", game.clone(), Game::start_run);
        on_click("play-btn", game.clone(), Game::start_run);
        on_click("leaderboard-btn", game.clone(), Game::show_leaderboard);
        on_click("back-btn", game.clone(), Game::back_to_menu);
        on_click("resume-btn", game.clone(), Game::toggle_pause);
        on_click("save-score-btn", game, |g| {
            let name = element_by_id::<HtmlInputElement>("player-name")
                .map(|input| input.value())
                .unwrap_or_default();
            g.save_score(&name);
        });
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().auto_pause("tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside); held keys never see their keyup
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.controls.release_all();
                g.auto_pause("window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// One tick per display refresh; the tick itself is a no-op while the
    /// run is paused or over
    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.update();
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cone Crusher (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    let (score, frames) = headless::autopilot_run(0xC0FFEE, 60 * 60 * 10);
    println!("Autopilot crushed {} cones in {} frames", score, frames);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run driven by a simple autopilot, for smoke-testing natively
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use cone_crusher::sim::{InputState, SimState};
    use cone_crusher::{Engine, RunState, Tuning};

    /// Steer toward the lowest cone that is still in play
    fn autopilot(state: &SimState) -> InputState {
        let car_center = state.player.pos.x + state.player.size.x / 2.0;
        let target = state
            .cones
            .iter()
            .filter(|c| !c.is_resolved())
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|c| c.pos.x + c.size.x / 2.0);

        match target {
            Some(x) if x < car_center - 6.0 => InputState::LEFT,
            Some(x) if x > car_center + 6.0 => InputState::RIGHT,
            _ => InputState::NONE,
        }
    }

    /// Play until game over or `max_frames`; returns (score, frames played)
    pub fn autopilot_run(seed: u64, max_frames: u64) -> (u64, u64) {
        let mut engine = Engine::new(seed, Tuning::default());
        let mut run = RunState::new_run();

        let mut frames = 0;
        while frames < max_frames && run.is_running() {
            let input = autopilot(engine.state());
            engine.frame(input, &mut run, &mut ());
            frames += 1;
        }

        log::info!(
            "Autopilot finished: score {}, lives {}, frames {}",
            run.score,
            run.lives,
            frames
        );
        (run.score, frames)
    }
}
