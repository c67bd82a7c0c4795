mod app;
mod config;
mod counter;
mod field;
mod input;
mod logging;
mod page;
mod render;
mod reveal;
mod schedule;
mod shapes;
mod shell;
mod stage;
mod typing;
mod view;

use anyhow::Result;

fn main() -> Result<()> {
    app::run()
}
