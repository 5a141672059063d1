use sheen_viewer::{ViewerApp, ViewerSettings};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    ViewerApp::new(ViewerSettings::default())?.run()
}
