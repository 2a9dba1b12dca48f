use crate::config::{self, Config, MenuStructure};
use crate::events::{AppEvent, MenuSource, Navigation, Reply};
use crate::menu::{
    AngleAllocator, DisplayGeometry, ErrorCode, InputManipulator, ItemId, MenuId, MenuListener,
    PieMenu,
};
use async_channel::Sender;

/// Forwards listener callbacks to the client connection that opened the menu.
struct ReplyListener {
    tx: Sender<Reply>,
}

impl ReplyListener {
    fn send(&self, reply: Reply) {
        if let Err(e) = self.tx.try_send(reply) {
            log::warn!("Dropped reply to client: {}", e);
        }
    }
}

impl MenuListener for ReplyListener {
    fn on_hover(&mut self, menu: MenuId, item: &ItemId) {
        self.send(Reply::Hover {
            menu,
            item: item.clone(),
        });
    }

    fn on_select(&mut self, menu: MenuId, item: &ItemId) {
        self.send(Reply::Select {
            menu,
            item: item.clone(),
        });
    }

    fn on_cancel(&mut self, menu: MenuId) {
        self.send(Reply::Cancel { menu });
    }

    fn on_hide(&mut self, menu: MenuId) {
        self.send(Reply::Closed { menu });
    }
}

pub struct AppModel<D> {
    menu: PieMenu<D>,
    config: Config,
    next_id: MenuId,
    reply: Option<Sender<Reply>>,
}

impl<D: InputManipulator + DisplayGeometry> AppModel<D> {
    pub fn new(desktop: D, config: Config) -> Self {
        let menu = PieMenu::new(
            desktop,
            config.settings.clone(),
            AngleAllocator::new(config.layout.collision_threshold),
        );

        Self {
            menu,
            config,
            next_id: MenuId::new(1),
            reply: None,
        }
    }

    pub fn menu(&self) -> &PieMenu<D> {
        &self.menu
    }

    pub fn update(&mut self, event: AppEvent) {
        match event {
            AppEvent::Show {
                source,
                edit_mode,
                reply,
            } => self.show(source, edit_mode, reply),
            AppEvent::Hide => self.menu.hide(),
            AppEvent::Cancel => self.menu.cancel(),
            AppEvent::Click(button) => {
                if let Err(e) = self.menu.on_release(button) {
                    log::debug!("Ignored button {}: {}", button, e);
                }
            }
            AppEvent::CursorMove(point) => {
                if let Err(e) = self.menu.on_motion(point) {
                    log::debug!("Ignored pointer motion: {}", e);
                }
            }
            AppEvent::Navigate(navigation) => {
                let result = match navigation {
                    Navigation::HoverCenter => self.menu.hover_center(),
                    Navigation::HoverParent => self.menu.hover_parent(),
                    Navigation::HoverChild(i) => self.menu.hover_child(i),
                    Navigation::SelectChild(i) => self.menu.select_child(i),
                    Navigation::SelectParent => self.menu.select_parent(),
                };
                if let Err(e) = result {
                    log::warn!("Navigation {:?} failed: {}", navigation, e);
                }
            }
            AppEvent::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.apply_config(new_config);
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }

        self.publish_frame();
    }

    /// Swaps in a reloaded configuration. An open menu keeps its tree and angles.
    fn apply_config(&mut self, config: Config) {
        self.menu
            .set_settings(config.settings.clone(), config.layout.collision_threshold);
        self.config = config;
    }

    fn show(&mut self, source: MenuSource, edit_mode: bool, reply: Sender<Reply>) {
        let result = self
            .resolve(source)
            .and_then(|structure| {
                let id = self.next_id;
                let listener = Box::new(ReplyListener { tx: reply.clone() });
                self.menu.show(id, &structure, edit_mode, listener)
            });

        match result {
            Ok(id) => {
                self.next_id = id.next();
                let _ = reply.try_send(Reply::Opened { menu: id });
                self.reply = Some(reply);
            }
            Err(e) => {
                log::warn!("Refused to open a menu: {}", e);
                let _ = reply.try_send(Reply::Error {
                    code: e.code(),
                    message: e.to_string(),
                });
            }
        }
    }

    fn resolve(&self, source: MenuSource) -> Result<MenuStructure, ErrorCode> {
        match source {
            MenuSource::Inline(structure) => Ok(*structure),
            MenuSource::Named(name) => self
                .config
                .find_menu(&name)
                .cloned()
                .ok_or_else(|| ErrorCode::UnknownError(format!("no menu named '{}'", name))),
        }
    }

    /// Sends the current render snapshot to the session's client, and forgets the
    /// client once the session is over.
    fn publish_frame(&mut self) {
        let Some(menu) = self.menu.menu_id() else {
            self.reply = None;
            return;
        };
        if let Some(reply) = &self.reply {
            let nodes = self.menu.frame();
            if reply.try_send(Reply::Frame { menu, nodes }).is_err() {
                log::debug!("Client of menu {} stopped listening", menu);
            }
        }
    }
}
