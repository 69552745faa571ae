mod app;
mod config;
mod input;
mod logging;
mod model;
mod render;
mod sim;
mod world;

use anyhow::Result;

fn main() -> Result<()> {
    app::run()
}
