//! Headless light texture builder: writes every mip level as a PNG.

use std::path::PathBuf;
use std::process;

use bezlight::cli;
use bezlight::engine;
use clap::{App, Arg};

fn main() {
    cli::init_logging();

    let matches = App::new("bezlight-bake")
        .about("Prefilters an image into the mip chain of a Bezier area light")
        .args(&cli::common_args())
        .arg(
            Arg::with_name("OUTPUT")
                .help("Directory receiving <shape>_lod<n>.png")
                .default_value(".")
                .index(1),
        )
        .get_matches();
    let config = match cli::config_from_matches(&matches) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };
    cli::init_thread_pool(config.jobs);

    let out_dir = PathBuf::from(matches.value_of("OUTPUT").unwrap_or("."));
    if let Err(e) = engine::bake(&config, &out_dir) {
        log::error!("{e}");
        process::exit(1);
    }
}
