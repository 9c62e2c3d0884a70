mod app;
mod assets;
mod geom;
mod panel;
mod pet;
mod render;
mod sim;

fn main() {
    env_logger::init();
    log::info!("SkyPet starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
