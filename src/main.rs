mod app;
mod core;
mod input;
mod io;
mod render;

fn main() -> anyhow::Result<()> {
    app::run()
}
