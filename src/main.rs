use std::process;

use bezlight::cli;
use bezlight::config::Config;
use bezlight::engine::{Engine, EngineError};
use bezlight::window::{FrameLimiter, Window, WindowEvent};
use clap::App;

fn title(config: &Config, engine: &Engine) -> String {
    let light = engine.light();
    format!(
        "{} | {}{}{}",
        config.window.title,
        light.shape(),
        if engine.animate { " | animating" } else { "" },
        if light.two_sided { " | two-sided" } else { "" },
    )
}

/// Applies one input event. Returns false once the viewer should exit.
fn handle_event(
    event: WindowEvent,
    engine: &mut Engine,
    window: &mut Window,
) -> Result<bool, String> {
    match event {
        WindowEvent::Quit => return Ok(false),
        WindowEvent::Resize(width, height) => {
            window.resize(width, height)?;
            engine.resize(width, height);
        }
        WindowEvent::SelectShape(shape) => {
            engine.select_shape(shape).map_err(|e| e.to_string())?;
        }
        WindowEvent::ToggleAnimation => engine.animate = !engine.animate,
        WindowEvent::ToggleMoving => {
            let light = engine.light_mut();
            light.moving = !light.moving;
        }
        WindowEvent::ToggleTwoSided => {
            let light = engine.light_mut();
            light.two_sided = !light.two_sided;
        }
        WindowEvent::SaveFrame => {
            // A failed capture is not worth quitting over.
            if let Err(e) = engine.save_frame(Engine::capture_path()) {
                log::error!("{e}");
            }
        }
    }
    Ok(true)
}

fn run(config: Config) -> Result<(), String> {
    let mut engine = Engine::new(config.clone()).map_err(|e: EngineError| e.to_string())?;
    let mut window = Window::new(&config.window.title, config.window.width, config.window.height)?;
    let mut limiter = FrameLimiter::new(&window);
    window.set_title(&title(&config, &engine));

    loop {
        for event in window.poll_events() {
            if !handle_event(event, &mut engine, &mut window)? {
                return Ok(());
            }
            window.set_title(&title(&config, &engine));
        }

        engine.update();
        engine.render();
        window.present(engine.frame_buffer())?;
        limiter.wait_and_get_delta(&window);
    }
}

fn main() {
    cli::init_logging();

    let matches = App::new("bezlight-viewer")
        .about("Interactive view of a textured Bezier area light")
        .args(&cli::common_args())
        .args(&cli::viewer_args())
        .get_matches();
    let config = match cli::config_from_matches(&matches) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };
    cli::init_thread_pool(config.jobs);

    if let Err(e) = run(config) {
        log::error!("{e}");
        process::exit(1);
    }
}
