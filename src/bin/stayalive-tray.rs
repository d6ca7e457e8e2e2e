// StayAlive Tray App - menu bar / system tray front end
// Settings are changed from the tray menu; the file can also be edited by hand and reloaded

use anyhow::{Context, Result};
use log::{error, info, warn};
use stayalive::constants::{APP_NAME, NOTIFICATION_WARNING_TIMEOUT_MS, TRAY_INTERVAL_PRESETS_SECONDS};
use stayalive::{
    config, platform_controller, ActionKey, Configuration, ServiceController, UpdateReport,
};
use std::time::{Duration, Instant};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tray_icon::menu::{
    CheckMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem, Submenu,
};
use tray_icon::TrayIconBuilder;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How often the event loop wakes to drain menu events
const MENU_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Menu items whose state follows the configuration
struct TrayMenu {
    status_item: MenuItem,
    interval_items: Vec<(MenuId, u64, CheckMenuItem)>,
    key_items: Vec<(MenuId, ActionKey, CheckMenuItem)>,
    auto_start_item: CheckMenuItem,
    reload_id: MenuId,
    quit_id: MenuId,
}

/// What a menu click asks for
enum MenuAction {
    SetInterval(u64),
    SetKey(ActionKey),
    ToggleAutoStart,
    Reload,
    Quit,
}

impl TrayMenu {
    fn build(cfg: &Configuration) -> Result<(Self, Menu)> {
        let status_item = MenuItem::new(status_text(cfg), false, None);

        let interval_menu = Submenu::new("Interval", true);
        let mut interval_items = Vec::new();
        for secs in TRAY_INTERVAL_PRESETS_SECONDS {
            let item = CheckMenuItem::new(interval_label(secs), true, cfg.interval_secs == secs, None);
            interval_menu
                .append(&item)
                .context("Failed to add interval menu item")?;
            interval_items.push((item.id().clone(), secs, item));
        }

        let key_menu = Submenu::new("Key", true);
        let mut key_items = Vec::new();
        for key in ActionKey::all() {
            let supported = stayalive::action_loop::key_presser::enigo_key(key).is_some();
            let item = CheckMenuItem::new(key.name(), supported, cfg.action_key == key, None);
            key_menu.append(&item).context("Failed to add key menu item")?;
            key_items.push((item.id().clone(), key, item));
        }

        let auto_start_item = CheckMenuItem::new("Launch at Login", true, cfg.auto_start, None);
        let reload_item = MenuItem::new("Reload Configuration", true, None);
        let version_item = MenuItem::new(format!("Version {}", VERSION), false, None);
        let quit_item = MenuItem::new("Quit", true, None);

        let menu = Menu::new();
        menu.append(&status_item).context("Failed to add status menu item")?;
        menu.append(&PredefinedMenuItem::separator())
            .context("Failed to add separator")?;
        menu.append(&interval_menu).context("Failed to add interval submenu")?;
        menu.append(&key_menu).context("Failed to add key submenu")?;
        menu.append(&auto_start_item)
            .context("Failed to add launch at login menu item")?;
        menu.append(&PredefinedMenuItem::separator())
            .context("Failed to add separator")?;
        menu.append(&reload_item).context("Failed to add reload menu item")?;
        menu.append(&version_item).context("Failed to add version menu item")?;
        menu.append(&quit_item).context("Failed to add quit menu item")?;

        let tray_menu = Self {
            status_item,
            interval_items,
            key_items,
            auto_start_item,
            reload_id: reload_item.id().clone(),
            quit_id: quit_item.id().clone(),
        };
        Ok((tray_menu, menu))
    }

    fn action_for(&self, id: &MenuId) -> Option<MenuAction> {
        if let Some((_, secs, _)) = self.interval_items.iter().find(|(item_id, _, _)| item_id == id) {
            return Some(MenuAction::SetInterval(*secs));
        }
        if let Some((_, key, _)) = self.key_items.iter().find(|(item_id, _, _)| item_id == id) {
            return Some(MenuAction::SetKey(*key));
        }
        if self.auto_start_item.id() == id {
            return Some(MenuAction::ToggleAutoStart);
        }
        if &self.reload_id == id {
            return Some(MenuAction::Reload);
        }
        if &self.quit_id == id {
            return Some(MenuAction::Quit);
        }
        None
    }

    /// Make checkmarks and the status line match `cfg`
    ///
    /// Check items toggle themselves when clicked, so this runs after every click.
    fn refresh(&self, cfg: &Configuration) {
        self.status_item.set_text(status_text(cfg));
        for (_, secs, item) in &self.interval_items {
            item.set_checked(cfg.interval_secs == *secs);
        }
        for (_, key, item) in &self.key_items {
            item.set_checked(cfg.action_key == *key);
        }
        self.auto_start_item.set_checked(cfg.auto_start);
    }
}

fn status_text(cfg: &Configuration) -> String {
    format!("Pressing {} every {}", cfg.action_key, interval_label(cfg.interval_secs))
}

fn interval_label(secs: u64) -> String {
    match secs {
        1 => "1 second".to_string(),
        60 => "1 minute".to_string(),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}

fn handle_action(controller: &ServiceController, action: MenuAction) {
    let current = controller.current_config();
    let result = match action {
        MenuAction::SetInterval(secs) => controller.update(Configuration {
            interval_secs: secs,
            ..current
        }),
        MenuAction::SetKey(key) => controller.update(Configuration {
            action_key: key,
            ..current
        }),
        MenuAction::ToggleAutoStart => controller.update(Configuration {
            auto_start: !current.auto_start,
            ..current
        }),
        MenuAction::Reload => controller.reload(),
        MenuAction::Quit => return,
    };

    match result {
        Ok(report) => notify_warnings(&report),
        Err(e) => {
            error!("Failed to apply configuration: {}", e);
            notify(&format!("Failed to apply configuration: {}", e));
        }
    }
}

fn notify_warnings(report: &UpdateReport) {
    for warning in &report.warnings {
        notify(&warning.describe());
    }
}

fn notify(body: &str) {
    if let Err(e) = notify_rust::Notification::new()
        .summary(APP_NAME)
        .body(body)
        .timeout(notify_rust::Timeout::Milliseconds(NOTIFICATION_WARNING_TIMEOUT_MS))
        .show()
    {
        warn!("Failed to show notification: {}", e);
    }
}

/// Solid round 32x32 icon
fn create_icon() -> Result<tray_icon::Icon> {
    let size = 32u32;
    let center = (size as f32 - 1.0) / 2.0;
    let radius = size as f32 / 2.0 - 1.0;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            if dx * dx + dy * dy <= radius * radius {
                rgba.extend_from_slice(&[0, 160, 140, 255]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }

    tray_icon::Icon::from_rgba(rgba, size, size).context("Failed to create icon")
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting StayAlive Tray App v{}", VERSION);

    let store = config::resolve_store(None).context("Failed to locate the configuration file")?;
    let controller = platform_controller(store)?;
    controller.start().context("Failed to start the keep-alive service")?;

    // Create event loop for tray app
    let event_loop = EventLoopBuilder::new().build();

    let (tray_menu, menu) = TrayMenu::build(&controller.current_config())?;

    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip(format!("{} - keeps your session awake", APP_NAME))
        .with_icon(create_icon()?)
        .build()
        .context("Failed to create tray icon")?;

    info!("Tray icon created, running event loop");

    // Run event loop
    event_loop.run(move |_event, _, control_flow| {
        *control_flow = ControlFlow::WaitUntil(Instant::now() + MENU_POLL_INTERVAL);

        // The tray icon is removed when dropped
        let _ = &tray;

        while let Ok(event) = MenuEvent::receiver().try_recv() {
            let Some(action) = tray_menu.action_for(&event.id) else {
                continue;
            };

            if matches!(action, MenuAction::Quit) {
                info!("Quit menu item clicked, exiting");
                controller.shutdown();
                *control_flow = ControlFlow::Exit;
                return;
            }

            handle_action(&controller, action);
            tray_menu.refresh(&controller.current_config());
        }
    });
}
