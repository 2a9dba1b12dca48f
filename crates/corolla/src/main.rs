use corolla::app::AppModel;
use corolla::config;
use corolla::sys::desktop::HyprDesktop;
use corolla::sys::runtime;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    if std::env::args().nth(1).as_deref() == Some("--write-config") {
        let path = config::write_default_config()?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = config::load_or_setup();
    log::info!("Loaded {} menus", config.menus.len());

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx)?;

    let mut app = AppModel::new(HyprDesktop::new(), config);
    while let Ok(event) = rx.recv_blocking() {
        app.update(event);
    }

    anyhow::bail!("event channel closed")
}
