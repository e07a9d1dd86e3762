//! Replay driver entry point.

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: mapedit <script.json>");
        return ExitCode::from(2);
    };
    log::info!("Replaying {}", path);

    let result = mapedit_app::Script::load(&path).and_then(|script| pollster::block_on(mapedit_app::replay(script)));
    match result {
        Ok(store) => match serde_json::to_string_pretty(&store.to_geojson()) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to encode features: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            log::error!("Replay failed: {}", e);
            eprintln!("mapedit: {}", e);
            ExitCode::FAILURE
        }
    }
}
