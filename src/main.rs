//! Horde Shooter entry point
//!
//! Handles platform-specific initialization and drives the session. The page
//! owns rendering and audio; this host only feeds it JSON through DOM events:
//! - `horde:frame` carries each frame's snapshot
//! - `horde:sound` carries a sound cue name
//! - `horde:phase` carries the session phase (plus errors/summary)
//! - `horde:game-over` carries the final summary
//!
//! The page sends the identity proof back as a `horde:proof` event.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        CustomEvent, CustomEventInit, Document, HtmlElement, MouseEvent, Request, RequestInit,
        RequestMode, Response, TouchEvent,
    };

    use horde_shooter::consts::{DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH};
    use horde_shooter::platform::PointerTracker;
    use horde_shooter::sim::Session;
    use horde_shooter::verify::{VERIFY_ENDPOINT, VerifyError, VerifyRequest, VerifyResponse};
    use horde_shooter::{Settings, Tuning};

    const FRAME_EVENT: &str = "horde:frame";
    const SOUND_EVENT: &str = "horde:sound";
    const PHASE_EVENT: &str = "horde:phase";
    const GAME_OVER_EVENT: &str = "horde:game-over";
    const PROOF_EVENT: &str = "horde:proof";

    /// Everything the host keeps between frames
    struct Game {
        session: Session,
        pointer: PointerTracker,
        container: HtmlElement,
        document: Document,
        /// Pending animation frame, if the driver is running
        raf_id: Option<i32>,
    }

    impl Game {
        /// Play-field size, taken from the container
        fn field_size(&self) -> Vec2 {
            let w = self.container.client_width() as f32;
            let h = self.container.client_height() as f32;
            if w > 0.0 && h > 0.0 {
                Vec2::new(w, h)
            } else {
                Vec2::new(DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT)
            }
        }

        /// Convert client coordinates to play-field coordinates
        fn local_point(&self, client_x: i32, client_y: i32) -> (f32, f32) {
            let rect = self.container.get_bounding_client_rect();
            (
                client_x as f32 - rect.left() as f32,
                client_y as f32 - rect.top() as f32,
            )
        }

        /// Run one animation frame. Returns whether the driver should keep going.
        fn frame(&mut self, time: f64) -> bool {
            let player_width = self
                .session
                .game()
                .map(|g| g.player.size.x)
                .unwrap_or_default();
            let input = self.pointer.take_input(player_width);

            if let Some(snapshot) = self.session.frame(time, &input) {
                publish(&self.document, FRAME_EVENT, &snapshot.to_json());
                for cue in self.session.sound_cues() {
                    publish(&self.document, SOUND_EVENT, cue.as_str());
                }
            }

            if self.session.is_playing() {
                true
            } else {
                self.stop();
                self.publish_phase();
                false
            }
        }

        /// Cancel the pending animation frame
        fn stop(&mut self) {
            if let (Some(id), Some(window)) = (self.raf_id.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(id);
            }
        }

        fn publish_phase(&self) {
            let summary = self.session.last_summary();
            let detail = serde_json::json!({
                "phase": self.session.phase().as_str(),
                "error": self.session.verification_error(),
                "summary": summary,
                "message": summary.map(|s| s.message()),
                "settings": self.session.settings(),
            });
            publish(&self.document, PHASE_EVENT, &detail.to_string());
        }
    }

    /// Dispatch a custom event with a string detail on the document
    fn publish(document: &Document, name: &str, detail: &str) {
        let init = CustomEventInit::new();
        init.set_detail(&JsValue::from_str(detail));
        match CustomEvent::new_with_event_init_dict(name, &init) {
            Ok(event) => {
                let _ = document.dispatch_event(&event);
            }
            Err(e) => log::warn!("Failed to create {name} event: {e:?}"),
        }
    }

    fn transport_error(e: JsValue) -> VerifyError {
        VerifyError::Transport(format!("{e:?}"))
    }

    /// POST the proof to the verification endpoint
    async fn post_verification(request: &VerifyRequest) -> Result<VerifyResponse, VerifyError> {
        let window =
            web_sys::window().ok_or_else(|| VerifyError::Transport("no window".to_string()))?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::SameOrigin);
        opts.set_body(&JsValue::from_str(&request.to_json()?));

        let req =
            Request::new_with_str_and_init(VERIFY_ENDPOINT, &opts).map_err(transport_error)?;
        req.headers()
            .set("Content-Type", "application/json")
            .map_err(transport_error)?;

        let resp: Response = JsFuture::from(window.fetch_with_request(&req))
            .await
            .map_err(transport_error)?
            .dyn_into()
            .map_err(transport_error)?;
        let text = JsFuture::from(resp.text().map_err(transport_error)?)
            .await
            .map_err(transport_error)?;

        VerifyResponse::from_json(&text.as_string().unwrap_or_default())
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Horde Shooter starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let container: HtmlElement = document
            .get_element_by_id("game-container")
            .expect("no game container")
            .dyn_into()
            .expect("game container is not an HTML element");

        let settings = Settings::load();
        let mut session = Session::new(Tuning::default(), Vec2::ZERO, settings);
        {
            let document = document.clone();
            session.on_game_over(move |summary| {
                log::info!(
                    "Session over: score {}, tokens {}",
                    summary.score,
                    summary.tokens
                );
                if let Ok(json) = serde_json::to_string(summary) {
                    publish(&document, GAME_OVER_EVENT, &json);
                }
            });
        }

        let game = Rc::new(RefCell::new(Game {
            session,
            pointer: PointerTracker::new(),
            container: container.clone(),
            document: document.clone(),
            raf_id: None,
        }));
        {
            let mut g = game.borrow_mut();
            let field = g.field_size();
            g.session.resize(field);
            g.publish_phase();
        }

        setup_pointer_handlers(&container, game.clone());
        setup_verification(&document, game.clone());
        setup_buttons(&document, game.clone());
        setup_auto_pause(game.clone());

        log::info!("Horde Shooter ready, awaiting verification");
    }

    fn setup_pointer_handlers(container: &HtmlElement, game: Rc<RefCell<Game>>) {
        // Mouse down - start firing where the pointer is
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let (x, y) = g.local_point(event.client_x(), event.client_y());
                g.pointer.press(x, y);
            });
            let _ = container
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - only steers while the primary button is held
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let (x, y) = g.local_point(event.client_x(), event.client_y());
                g.pointer.mouse_moved(x, y, event.buttons() & 1 != 0);
            });
            let _ = container
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up / leave
        for name in ["mouseup", "mouseleave"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().pointer.release();
            });
            let _ = container
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start / move
        for name in ["touchstart", "touchmove"] {
            let game = game.clone();
            let pressing = name == "touchstart";
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    let (x, y) = g.local_point(touch.client_x(), touch.client_y());
                    if pressing {
                        g.pointer.press(x, y);
                    } else {
                        g.pointer.touch_moved(x, y);
                    }
                }
            });
            let _ = container
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end / cancel
        for name in ["touchend", "touchcancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if event.touches().length() == 0 {
                    game.borrow_mut().pointer.release();
                }
            });
            let _ = container
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: Escape pauses, M mutes
        {
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "Escape" | "p" | "P" => g.pointer.request_pause(),
                    "m" | "M" => {
                        let enabled = g.session.toggle_sound();
                        log::info!("Sound {}", if enabled { "on" } else { "off" });
                        g.publish_phase();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Proof payloads arrive from the page's verification widget.
    /// The endpoint owns the app id, so proofs are forwarded unchecked.
    fn setup_verification(document: &Document, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: CustomEvent| {
            let Some(payload) = event.detail().as_string() else {
                log::warn!("Ignoring {PROOF_EVENT} without a string payload");
                return;
            };

            let request = match serde_json::from_str::<VerifyRequest>(&payload) {
                Ok(request) => request,
                Err(e) => {
                    log::warn!("Malformed {PROOF_EVENT} payload: {e}");
                    let error = VerifyError::Transport(e.to_string());
                    let mut g = game.borrow_mut();
                    let _ = g.session.apply_verification(Err(error));
                    g.publish_phase();
                    return;
                }
            };

            let game = game.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let outcome = post_verification(&request).await;
                let mut g = game.borrow_mut();
                let _ = g.session.apply_verification(outcome);
                g.publish_phase();
            });
        });
        let _ = document
            .add_event_listener_with_callback(PROOF_EVENT, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Attach a click handler to a button, if the page has it
    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, "start-btn", move || {
                let seed = js_sys::Date::now() as u64;
                let started = {
                    let mut g = game.borrow_mut();
                    let field = g.field_size();
                    g.session.resize(field);
                    let started = g.session.start(seed);
                    g.publish_phase();
                    started
                };
                if started {
                    request_animation_frame(game.clone());
                }
            });
        }
        {
            let game = game.clone();
            on_click(document, "restart-btn", move || {
                let mut g = game.borrow_mut();
                if g.session.restart() {
                    g.publish_phase();
                }
            });
        }
        {
            let game = game.clone();
            on_click(document, "pause-btn", move || {
                game.borrow_mut().pointer.request_pause();
            });
        }
        {
            let game = game.clone();
            on_click(document, "sound-btn", move || {
                let mut g = game.borrow_mut();
                g.session.toggle_sound();
                g.publish_phase();
            });
        }
        on_click(document, "debug-btn", move || {
            let mut g = game.borrow_mut();
            g.session.toggle_debug();
            g.publish_phase();
        });
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let visible =
                    document_clone.visibility_state() == web_sys::VisibilityState::Visible;
                game.borrow_mut().session.visibility_changed(visible);
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().session.visibility_changed(false);
            });
            let _ = window
                .add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Container resized with the window
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                let field = g.field_size();
                g.session.resize(field);
            });
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let handle = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(handle, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => game.borrow_mut().raf_id = Some(id),
            Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let keep_running = {
            let mut g = game.borrow_mut();
            g.raf_id = None;
            g.frame(time)
        };

        if keep_running {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Headless demo: verify locally, then let a scripted pointer sweep the field
/// with the trigger held until the horde gets through.
#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use glam::Vec2;
    use horde_shooter::consts::{DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH, REFERENCE_FRAME_MS};
    use horde_shooter::platform::PointerTracker;
    use horde_shooter::sim::Session;
    use horde_shooter::verify::{LocalVerifier, VerificationLevel, Verifier, VerifyRequest};
    use horde_shooter::{Settings, Tuning};

    const DEMO_APP_ID: &str = "app_headless_demo";
    const DEMO_SEED: u64 = 0x5EED;
    /// Ten minutes at 60 Hz
    const MAX_FRAMES: u32 = 36_000;

    env_logger::init();
    log::info!("Horde Shooter (native) starting...");

    // Optional balance override: first argument is a tuning JSON file
    let tuning = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading tuning from {path}");
            Tuning::from_json(&std::fs::read_to_string(path)?)?
        }
        None => Tuning::default(),
    };

    let field = Vec2::new(DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT);
    let mut session = Session::new(tuning, field, Settings::load());
    session.on_game_over(|summary| {
        log::info!(
            "{} Score {}, tokens {}, level {}",
            summary.message(),
            summary.score,
            summary.tokens,
            summary.level
        );
    });

    let request = VerifyRequest {
        proof: "0xheadless-proof".to_string(),
        merkle_root: "0xheadless-root".to_string(),
        nullifier_hash: "0xheadless-nullifier".to_string(),
        verification_level: VerificationLevel::Device,
        signal: None,
        action: "play".to_string(),
        app_id: DEMO_APP_ID.to_string(),
    };
    let mut verifier = LocalVerifier::new(Some(DEMO_APP_ID.to_string()));
    session.apply_verification(verifier.verify(&request))?;
    session.start(DEMO_SEED);

    let mut pointer = PointerTracker::new();
    let aim_y = field.y - 40.0;
    pointer.press(field.x / 2.0, aim_y);

    let mut frames = 0;
    while session.is_playing() && frames < MAX_FRAMES {
        // Sweep across the field every four seconds
        let sweep = (frames as f32 / 240.0) * std::f32::consts::TAU;
        pointer.touch_moved(field.x / 2.0 + sweep.sin() * field.x * 0.45, aim_y);

        let player_width = session
            .game()
            .map(|g| g.player.size.x)
            .unwrap_or_default();
        let input = pointer.take_input(player_width);

        let snapshot = session.frame(frames as f64 * REFERENCE_FRAME_MS, &input);
        if let Some(snapshot) = snapshot.filter(|_| frames % 600 == 0) {
            log::info!(
                "t={:>4.0}s score {:>5} level {:>2} weapon {:<8} enemies {:>2}",
                snapshot.elapsed_ms / 1000.0,
                snapshot.score,
                snapshot.level,
                snapshot.weapon.as_str(),
                snapshot.enemies.len()
            );
        }
        frames += 1;
    }

    match session.last_summary() {
        Some(summary) => log::info!("Game over after {frames} frames: {summary:?}"),
        None => log::info!("Survived all {frames} frames"),
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
