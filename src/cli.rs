//! Command-line plumbing shared by the viewer and the bake tool.
//!
//! Flags override whatever the `--config` file sets, which in turn overrides
//! the built-in defaults.

use std::path::PathBuf;

use clap::{App, Arg, ArgMatches};
use rayon::ThreadPoolBuilder;

use crate::config::{Config, ConfigError};
use crate::shape::ShapeId;

/// Arguments understood by every binary.
pub fn common_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name("config")
            .short("c")
            .long("config")
            .value_name("FILE")
            .takes_value(true)
            .help("JSON configuration file"),
        Arg::with_name("shape")
            .short("s")
            .long("shape")
            .value_name("SHAPE")
            .takes_value(true)
            .help("Light shape, by name or id 0-7"),
        Arg::with_name("texture")
            .short("t")
            .long("texture")
            .value_name("IMAGE")
            .takes_value(true)
            .help("Square power-of-two image to prefilter into the light texture"),
        Arg::with_name("dump-clipped")
            .long("dump-clipped")
            .value_name("PNG")
            .takes_value(true)
            .help("Write the clipped image before filtering"),
        Arg::with_name("jobs")
            .short("j")
            .long("jobs")
            .value_name("THREADS")
            .takes_value(true)
            .help("Number of threads to use"),
    ]
}

/// The interactive viewer's extra switches.
pub fn viewer_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name("mesh")
            .short("m")
            .long("mesh")
            .value_name("OBJ")
            .takes_value(true)
            .help("OBJ file with the light's geometry"),
        Arg::with_name("animate")
            .short("a")
            .long("animate")
            .help("Start with the animation running"),
        Arg::with_name("moving")
            .long("moving")
            .help("Let the light bob and spin while animating"),
        Arg::with_name("two-sided")
            .long("two-sided")
            .help("Emit from both faces of the light"),
    ]
}

/// Builds the configuration for a parsed command line.
pub fn config_from_matches(matches: &ArgMatches) -> Result<Config, ConfigError> {
    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(text) = matches.value_of("shape") {
        config.shape = ShapeId::parse(text)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown shape `{text}`")))?;
    }
    if let Some(path) = matches.value_of("texture") {
        config.texture = Some(PathBuf::from(path));
    }
    if let Some(path) = matches.value_of("mesh") {
        config.mesh = Some(PathBuf::from(path));
    }
    if let Some(path) = matches.value_of("dump-clipped") {
        config.dump_clipped = Some(PathBuf::from(path));
    }
    if let Some(text) = matches.value_of("jobs") {
        let jobs = text
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("jobs `{text}` is not a number")))?;
        config.jobs = Some(jobs);
    }
    config.animate |= matches.is_present("animate");
    config.light.moving |= matches.is_present("moving");
    config.light.two_sided |= matches.is_present("two-sided");

    config.validate()?;
    Ok(config)
}

/// Parses `args` (program name first) against `app`.
pub fn parse_from<I, T>(app: App<'static, 'static>, args: I) -> Result<Config, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = app
        .get_matches_from_safe(args)
        .map_err(|e| ConfigError::Invalid(e.message))?;
    config_from_matches(&matches)
}

pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Sets up the global rayon pool.
pub fn init_thread_pool(jobs: Option<usize>) {
    let mut thread_pool_builder = ThreadPoolBuilder::new();
    if let Some(jobs) = jobs {
        thread_pool_builder = thread_pool_builder.num_threads(jobs);
    }
    if let Err(e) = thread_pool_builder.build_global() {
        log::warn!("keeping the existing thread pool: {e}");
    }
}
