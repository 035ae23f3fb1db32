//! Browser binding: mount, input listeners and the frame loop
//!
//! One mounted hero owns its engine, its renderer (once WebGPU is ready),
//! its listeners and its pending animation frame. Dropping the handle tears
//! all of it down.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Event, EventTarget, HtmlCanvasElement, MouseEvent, WheelEvent};

use crate::error::{OrbError, OrbResult};
use crate::renderer::RenderState;
use crate::settings::{QualityPreset, Settings};
use crate::sim::{Frame, GradientPair, InputEvent, OrbEngine, handle_input, tick};

impl From<OrbError> for JsValue {
    fn from(err: OrbError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Route `log` to the browser console (safe to call more than once)
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // Already initialized when a second hero mounts
    let _ = console_log::init_with_level(log::Level::Info);
}

fn window() -> OrbResult<web_sys::Window> {
    web_sys::window().ok_or(OrbError::NoWindow)
}

/// Milliseconds on the same clock as animation frame timestamps
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// A registered DOM listener, removed again on drop
pub struct EventListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        passive: Option<bool>,
        handler: impl FnMut(Event) + 'static,
    ) -> OrbResult<Self> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        let registered = match passive {
            Some(passive) => {
                let options = AddEventListenerOptions::new();
                options.set_passive(passive);
                target.add_event_listener_with_callback_and_add_event_listener_options(
                    event,
                    callback.as_ref().unchecked_ref(),
                    &options,
                )
            }
            None => target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()),
        };
        registered.map_err(|_| OrbError::Listener(event))?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Self-rescheduling `requestAnimationFrame` loop
#[derive(Clone, Default)]
struct FrameLoop {
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
    pending: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    fn schedule(&self) {
        if self.pending.get().is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(callback) = self.callback.borrow().as_ref() {
            match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                Ok(id) => self.pending.set(Some(id)),
                Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
            }
        }
    }

    fn is_scheduled(&self) -> bool {
        self.pending.get().is_some()
    }

    fn cancel(&self) {
        if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
    }

    /// Cancel and release the callback (it holds a clone of this loop)
    fn shutdown(&self) {
        self.cancel();
        self.callback.borrow_mut().take();
    }
}

/// What a frame callback did
enum FrameOutcome {
    /// Hero off screen or unmounted; do not reschedule
    Stop,
    /// Renderer not ready; reschedule without work
    Idle,
    Drawn(GradientPair),
}

/// Per-mount state shared by the frame loop and the listeners
struct Hero {
    engine: OrbEngine,
    renderer: Option<RenderState>,
    canvas: HtmlCanvasElement,
    hero_selector: String,
    unmounted: bool,
}

impl Hero {
    /// CSS and physical size of the canvas
    fn canvas_size(&self) -> (Vec2, u32, u32) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let css = Vec2::new(
            self.canvas.client_width().max(1) as f32,
            self.canvas.client_height().max(1) as f32,
        );
        let width = (css.x as f64 * dpr) as u32;
        let height = (css.y as f64 * dpr) as u32;
        (css, width, height)
    }

    fn resize(&mut self) {
        let (css, width, height) = self.canvas_size();
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        handle_input(
            &mut self.engine,
            &InputEvent::Resize {
                width: css.x,
                height: css.y,
            },
        );
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(width, height, css);
        }
    }

    /// Whether the hero region intersects the viewport (no region = always)
    fn hero_on_screen(&self) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        let Some(document) = window.document() else {
            return false;
        };
        let Ok(Some(element)) = document.query_selector(&self.hero_selector) else {
            return true;
        };
        let rect = element.get_bounding_client_rect();
        let viewport_height = window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(f64::MAX);
        rect.bottom() > 0.0 && rect.top() < viewport_height
    }

    fn frame(&mut self, now: f64) -> FrameOutcome {
        if self.unmounted {
            return FrameOutcome::Stop;
        }
        let visible = self.hero_on_screen();
        handle_input(&mut self.engine, &InputEvent::HeroVisibility { visible });
        if !visible {
            log::debug!("Hero off screen, pausing frame loop");
            return FrameOutcome::Stop;
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return FrameOutcome::Idle;
        };

        let frame: Frame = tick(&mut self.engine, now);
        match renderer.render(&frame) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
        FrameOutcome::Drawn(frame.gradient)
    }
}

/// Handle returned to JS; call `unmount()` (or `free()`) to tear down
#[wasm_bindgen]
pub struct OrbHeroHandle {
    mounted: Option<Mounted>,
}

struct Mounted {
    hero: Rc<RefCell<Hero>>,
    frame_loop: FrameLoop,
    _listeners: Vec<EventListener>,
}

impl Drop for Mounted {
    fn drop(&mut self) {
        self.frame_loop.shutdown();
        if let Ok(mut hero) = self.hero.try_borrow_mut() {
            hero.unmounted = true;
            hero.renderer = None;
        }
        log::info!("Orb hero unmounted");
    }
}

#[wasm_bindgen]
impl OrbHeroHandle {
    /// Remove every listener and cancel the pending frame
    pub fn unmount(&mut self) {
        self.mounted.take();
    }

    #[wasm_bindgen(getter)]
    pub fn mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Switch the quality preset (`low`, `medium`, `high`) and persist it
    #[wasm_bindgen(js_name = setQuality)]
    pub fn set_quality(&mut self, preset: &str) -> bool {
        let Some(preset) = QualityPreset::parse(preset) else {
            log::warn!("Unknown quality preset: {}", preset);
            return false;
        };
        self.update_settings(|settings| settings.quality = preset)
    }

    /// Toggle reduced motion and persist it
    #[wasm_bindgen(js_name = setReducedMotion)]
    pub fn set_reduced_motion(&mut self, reduced: bool) -> bool {
        self.update_settings(|settings| settings.reduced_motion = reduced)
    }

    /// Frames simulated so far
    #[wasm_bindgen(getter, js_name = frameCount)]
    pub fn frame_count(&self) -> f64 {
        self.mounted
            .as_ref()
            .and_then(|m| m.hero.try_borrow().ok().map(|h| h.engine.frame_count as f64))
            .unwrap_or(0.0)
    }
}

impl OrbHeroHandle {
    fn update_settings(&mut self, change: impl FnOnce(&mut Settings)) -> bool {
        let Some(mounted) = self.mounted.as_ref() else {
            return false;
        };
        let Ok(mut hero) = mounted.hero.try_borrow_mut() else {
            return false;
        };
        change(&mut hero.engine.settings);
        hero.engine.settings.save();
        let steps = hero.engine.settings.quality.curve_steps();
        if let Some(renderer) = hero.renderer.as_mut() {
            renderer.curve_steps = steps;
        }
        true
    }
}

/// Mount the orb animation on `canvas_id`, pausing while `hero_selector` is
/// off screen. `on_gradient(start_hex, end_hex)` is called every frame.
#[wasm_bindgen(js_name = mountOrbHero)]
pub fn mount_orb_hero(
    canvas_id: &str,
    hero_selector: &str,
    on_gradient: Option<js_sys::Function>,
) -> Result<OrbHeroHandle, JsValue> {
    init_logging();
    Ok(mount(canvas_id, hero_selector, on_gradient)?)
}

fn prefers_reduced_motion(window: &web_sys::Window) -> bool {
    window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .is_some_and(|query| query.matches())
}

fn mount(
    canvas_id: &str,
    hero_selector: &str,
    on_gradient: Option<js_sys::Function>,
) -> OrbResult<OrbHeroHandle> {
    let window = window()?;
    let document = window.document().ok_or(OrbError::NoDocument)?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| OrbError::ElementNotFound(canvas_id.to_string()))?
        .dyn_into()
        .map_err(|_| OrbError::NotACanvas(canvas_id.to_string()))?;

    let mut settings = Settings::load();
    if prefers_reduced_motion(&window) {
        settings.reduced_motion = true;
    }
    let curve_steps = settings.quality.curve_steps();

    let engine = OrbEngine::new(
        settings,
        canvas.client_width().max(1) as f32,
        canvas.client_height().max(1) as f32,
        now_ms(),
    );
    let hero = Rc::new(RefCell::new(Hero {
        engine,
        renderer: None,
        canvas: canvas.clone(),
        hero_selector: hero_selector.to_string(),
        unmounted: false,
    }));
    hero.borrow_mut().resize();

    let frame_loop = FrameLoop::default();
    {
        let hero = hero.clone();
        let looper = frame_loop.clone();
        *frame_loop.callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |now: f64| {
            looper.pending.set(None);
            // Release the borrow before calling back into JS
            let outcome = hero.borrow_mut().frame(now);
            match outcome {
                FrameOutcome::Stop => log::debug!("Frame loop stopped"),
                FrameOutcome::Idle => looper.schedule(),
                FrameOutcome::Drawn(pair) => {
                    if let Some(callback) = on_gradient.as_ref() {
                        let start = JsValue::from_str(&pair.start.to_hex());
                        let end = JsValue::from_str(&pair.end.to_hex());
                        if let Err(e) = callback.call2(&JsValue::NULL, &start, &end) {
                            log::warn!("Gradient callback failed: {:?}", e);
                        }
                    }
                    looper.schedule();
                }
            }
        }));
    }

    let listeners = register_listeners(&window, &canvas, &hero, &frame_loop)?;

    spawn_renderer(hero.clone(), canvas, curve_steps);
    frame_loop.schedule();

    log::info!("Orb hero mounted on #{}", canvas_id);
    Ok(OrbHeroHandle {
        mounted: Some(Mounted {
            hero,
            frame_loop,
            _listeners: listeners,
        }),
    })
}

fn register_listeners(
    window: &web_sys::Window,
    canvas: &HtmlCanvasElement,
    hero: &Rc<RefCell<Hero>>,
    frame_loop: &FrameLoop,
) -> OrbResult<Vec<EventListener>> {
    let mut listeners = Vec::with_capacity(4);

    // Pointer position relative to the canvas
    {
        let hero = hero.clone();
        let canvas = canvas.clone();
        listeners.push(EventListener::new(window, "mousemove", None, move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let rect = canvas.get_bounding_client_rect();
            let x = (event.client_x() as f64 - rect.left()) as f32;
            let y = (event.client_y() as f64 - rect.top()) as f32;
            if let Ok(mut hero) = hero.try_borrow_mut() {
                handle_input(&mut hero.engine, &InputEvent::PointerMove { x, y });
            }
        })?);
    }

    // Page scroll; also restarts a paused loop once the hero is back
    {
        let hero = hero.clone();
        let frame_loop = frame_loop.clone();
        listeners.push(EventListener::new(window, "scroll", Some(true), move |_event| {
            let scroll_y = web_sys::window()
                .and_then(|w| w.scroll_y().ok())
                .unwrap_or(0.0) as f32;
            let Ok(mut hero) = hero.try_borrow_mut() else {
                return;
            };
            handle_input(
                &mut hero.engine,
                &InputEvent::Scroll {
                    scroll_y,
                    at_ms: now_ms(),
                },
            );
            if !frame_loop.is_scheduled() {
                let visible = hero.hero_on_screen();
                let outcome = handle_input(&mut hero.engine, &InputEvent::HeroVisibility { visible });
                drop(hero);
                if outcome.resume {
                    log::debug!("Hero back on screen, resuming frame loop");
                    frame_loop.schedule();
                }
            }
        })?);
    }

    // Wheel morphs the parent; default scrolling is suppressed
    {
        let hero = hero.clone();
        listeners.push(EventListener::new(canvas, "wheel", Some(false), move |event| {
            event.prevent_default();
            let Some(event) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            if let Ok(mut hero) = hero.try_borrow_mut() {
                handle_input(
                    &mut hero.engine,
                    &InputEvent::Wheel {
                        delta_y: event.delta_y() as f32,
                        at_ms: now_ms(),
                    },
                );
            }
        })?);
    }

    {
        let hero = hero.clone();
        listeners.push(EventListener::new(window, "resize", None, move |_event| {
            if let Ok(mut hero) = hero.try_borrow_mut() {
                hero.resize();
            }
        })?);
    }

    Ok(listeners)
}

/// Create the WebGPU surface and renderer in the background
fn spawn_renderer(hero: Rc<RefCell<Hero>>, canvas: HtmlCanvasElement, curve_steps: usize) {
    wasm_bindgen_futures::spawn_local(async move {
        let (css, width, height) = hero.borrow().canvas_size();
        match create_renderer(canvas, width, height, css, curve_steps).await {
            Ok(renderer) => {
                let mut hero = hero.borrow_mut();
                if hero.unmounted {
                    return;
                }
                hero.renderer = Some(renderer);
                log::info!("WebGPU renderer ready");
            }
            Err(e) => log::error!("Renderer init failed: {}", e),
        }
    });
}

async fn create_renderer(
    canvas: HtmlCanvasElement,
    width: u32,
    height: u32,
    css: Vec2,
    curve_steps: usize,
) -> OrbResult<RenderState> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });

    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
        .map_err(|e| OrbError::Gpu(format!("surface creation failed: {e}")))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| OrbError::Gpu(format!("no adapter: {e}")))?;

    log::info!("Using adapter: {:?}", adapter.get_info().name);

    RenderState::new(surface, &adapter, width, height, css, curve_steps).await
}
