//! Orb Hero entry point
//!
//! On the web this mounts the hero on the default canvas. Natively it runs a
//! headless preview and prints the last frame as JSON.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_hero {
    use std::cell::RefCell;

    use orb_hero::platform::{OrbHeroHandle, mount_orb_hero};

    /// Default page wiring
    const CANVAS_ID: &str = "orb-canvas";
    const HERO_SELECTOR: &str = "[data-hero-section]";

    thread_local! {
        static HANDLE: RefCell<Option<OrbHeroHandle>> = const { RefCell::new(None) };
    }

    pub fn run() {
        match mount_orb_hero(CANVAS_ID, HERO_SELECTOR, None) {
            Ok(handle) => HANDLE.with(|h| *h.borrow_mut() = Some(handle)),
            Err(e) => log::warn!("Orb hero not mounted: {:?}", e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_hero::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;

    use orb_hero::platform::{ScriptedInput, run_headless};
    use orb_hero::sim::InputEvent;
    use orb_hero::{OrbResult, QualityPreset, Settings};

    const DEFAULT_FRAMES: u64 = 600;

    /// `orb-hero [settings.json | low | medium | high] [frames]`
    pub fn run() -> OrbResult<()> {
        let mut args = std::env::args().skip(1);
        let settings = match args.next() {
            Some(arg) => match QualityPreset::parse(&arg) {
                Some(preset) => Settings::from_preset(preset),
                None => Settings::load_file(Path::new(&arg))?,
            },
            None => Settings::default(),
        };
        let frames = args
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(DEFAULT_FRAMES);

        log::info!(
            "Orb Hero (native) preview: {} frames, {} quality",
            frames,
            settings.quality.as_str()
        );

        // A fast scroll halfway through shows the disruption and recovery
        let mid = frames / 2;
        let script = [ScriptedInput {
            frame: mid,
            event: InputEvent::Scroll {
                scroll_y: 2000.0,
                at_ms: mid as f64 * orb_hero::consts::FRAME_MS,
            },
        }];

        let report = run_headless(settings, 1280.0, 800.0, frames, &script);
        log::info!(
            "peak particles {}, lightning frames {}, disrupted frames {}",
            report.peak_particles,
            report.lightning_frames,
            report.disrupted_frames
        );

        if let Some(frame) = &report.last_frame {
            println!("{}", serde_json::to_string_pretty(frame)?);
        }
        Ok(())
    }
}
