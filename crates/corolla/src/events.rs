use crate::config::MenuStructure;
use crate::menu::{ItemId, MenuId, NodeVisual};
use async_channel::Sender;
use hyprwarp::wm::Point;
use serde::Serialize;

#[derive(Debug, Clone)]
pub enum MenuSource {
    /// A menu from the config, looked up by name.
    Named(String),
    Inline(Box<MenuStructure>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    HoverCenter,
    HoverParent,
    HoverChild(usize),
    SelectChild(usize),
    SelectParent,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Show {
        source: MenuSource,
        edit_mode: bool,
        reply: Sender<Reply>,
    },
    Hide,
    Cancel,
    Click(u32),
    CursorMove(Point),
    Navigate(Navigation),
    ConfigReload,
}

/// One JSON line written back to the client that opened a menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum Reply {
    Opened { menu: MenuId },
    Error { code: i32, message: String },
    Hover { menu: MenuId, item: ItemId },
    Select { menu: MenuId, item: ItemId },
    Cancel { menu: MenuId },
    Closed { menu: MenuId },
    Frame { menu: MenuId, nodes: Vec<NodeVisual> },
}
