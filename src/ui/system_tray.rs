//! System Tray
//!
//! Tray icon with quick actions. Menu events are polled from the window's
//! update loop, so the tray must be built after the event loop is running.

use anyhow::Result;
use tray_icon::{
    menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem},
    TrayIcon, TrayIconBuilder,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    Translate,
    ToggleHotkey,
    ShowWindow,
    Quit,
}

pub struct SystemTray {
    _tray_icon: TrayIcon,
    toggle_item: MenuItem,
    translate_id: MenuId,
    toggle_id: MenuId,
    show_id: MenuId,
    quit_id: MenuId,
}

impl SystemTray {
    pub fn new(toggle_label: &str, hotkey_display: &str) -> Result<Self> {
        let menu = Menu::new();

        let translate_item = MenuItem::new("Translate Clipboard", true, None);
        let toggle_item = MenuItem::new(toggle_label, true, None);
        let show_item = MenuItem::new("Show Window", true, None);
        let separator = PredefinedMenuItem::separator();
        let quit_item = MenuItem::new("Quit", true, None);

        menu.append(&translate_item)?;
        menu.append(&toggle_item)?;
        menu.append(&show_item)?;
        menu.append(&separator)?;
        menu.append(&quit_item)?;

        let tray_icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip(format!(
                "Clipboard Japanese Translator - {} to translate",
                hotkey_display
            ))
            .with_icon(load_icon()?)
            .build()?;

        tracing::info!("System tray initialized");

        Ok(Self {
            _tray_icon: tray_icon,
            translate_id: translate_item.id().clone(),
            toggle_id: toggle_item.id().clone(),
            show_id: show_item.id().clone(),
            quit_id: quit_item.id().clone(),
            toggle_item,
        })
    }

    /// Next pending menu action, if any
    pub fn poll(&self) -> Option<TrayAction> {
        let event = MenuEvent::receiver().try_recv().ok()?;
        if event.id == self.translate_id {
            Some(TrayAction::Translate)
        } else if event.id == self.toggle_id {
            Some(TrayAction::ToggleHotkey)
        } else if event.id == self.show_id {
            Some(TrayAction::ShowWindow)
        } else if event.id == self.quit_id {
            Some(TrayAction::Quit)
        } else {
            None
        }
    }

    pub fn set_toggle_label(&self, label: &str) {
        self.toggle_item.set_text(label);
    }
}

/// Round badge with a white "J" on a green-to-teal gradient
fn load_icon() -> Result<tray_icon::Icon> {
    let size = 32u32;
    let mut rgba = vec![0u8; (size * size * 4) as usize];

    let center = size as f32 / 2.0;
    let radius = center - 1.0;

    let color_start = (76u8, 175u8, 80u8);
    let color_end = (0u8, 150u8, 136u8);

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > radius {
                continue;
            }

            let t = (y as f32) / (size as f32);
            let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t) as u8;
            // Soft edge
            let alpha = if dist > radius - 1.5 {
                ((radius - dist + 1.5) / 1.5 * 255.0) as u8
            } else {
                255
            };

            let idx = ((y * size + x) * 4) as usize;
            rgba[idx] = mix(color_start.0, color_end.0);
            rgba[idx + 1] = mix(color_start.1, color_end.1);
            rgba[idx + 2] = mix(color_start.2, color_end.2);
            rgba[idx + 3] = alpha;
        }
    }

    let mut plot = |x: u32, y: u32| {
        let idx = ((y * size + x) * 4) as usize;
        if idx + 3 < rgba.len() {
            rgba[idx..idx + 4].copy_from_slice(&[255, 255, 255, 255]);
        }
    };

    // Top bar of the J
    for x in 12..=21 {
        for y in 8..=9 {
            plot(x, y);
        }
    }
    // Stem
    for y in 8..=20 {
        for x in 17..=18 {
            plot(x, y);
        }
    }
    // Hook
    for x in 11..=18 {
        for y in 21..=22 {
            plot(x, y);
        }
    }
    for y in 17..=22 {
        for x in 11..=12 {
            plot(x, y);
        }
    }

    let icon = tray_icon::Icon::from_rgba(rgba, size, size)?;
    Ok(icon)
}
