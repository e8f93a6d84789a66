// SPDX-License-Identifier: GPL-3.0-only

//! Terminal display
//!
//! Renders each window as a bordered pane using Unicode half-block
//! characters, which doubles the vertical resolution: the upper half of a
//! cell is one pixel (foreground), the lower half the next (background).
//! Panes are laid out side by side in the order they were first shown.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::{DynamicImage, GenericImageView};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Widget},
};
use std::io::{self, Stdout, stdout};
use std::time::Duration;
use tracing::{debug, warn};

use super::DisplaySurface;
use crate::constants::QUIT_KEY;
use crate::errors::AppResult;

/// Interactive display drawing into the terminal's alternate screen
///
/// Raw mode and the alternate screen are entered on creation and restored on
/// drop.
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    panes: Vec<Pane>,
}

impl TerminalDisplay {
    pub fn new() -> AppResult<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = match Terminal::new(backend) {
            Ok(t) => t,
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                return Err(e.into());
            }
        };
        debug!("Terminal display initialized");

        Ok(Self {
            terminal,
            panes: Vec::new(),
        })
    }

    fn redraw(&mut self) -> AppResult<()> {
        let panes = &self.panes;
        self.terminal.draw(|f| render_panes(panes, f.area(), f.buffer_mut()))?;
        Ok(())
    }
}

impl DisplaySurface for TerminalDisplay {
    fn show_window(&mut self, name: &str, image: DynamicImage) -> AppResult<()> {
        match self.panes.iter_mut().find(|p| p.name == name) {
            Some(pane) => pane.image = image,
            None => {
                debug!(window = name, "Creating window");
                self.panes.push(Pane {
                    name: name.to_string(),
                    image,
                });
            }
        }
        self.redraw()
    }

    fn poll_key(&mut self, timeout: Duration) -> AppResult<Option<char>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                // Raw mode swallows SIGINT, so Ctrl+C arrives as a key
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return Ok(Some(QUIT_KEY));
                }
                match key.code {
                    KeyCode::Char(c) => Ok(Some(c)),
                    _ => Ok(None),
                }
            }
            Event::Resize(..) => {
                self.redraw()?;
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to leave raw mode: {}", e);
        }
        if let Err(e) = execute!(self.terminal.backend_mut(), LeaveAlternateScreen) {
            warn!("Failed to leave alternate screen: {}", e);
        }
        let _ = self.terminal.show_cursor();
    }
}

/// A named window and the image it currently shows
struct Pane {
    name: String,
    image: DynamicImage,
}

impl Widget for &Pane {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.image.dimensions();
        let block = Block::bordered().title(format!(" {} {}x{} ", self.name, width, height));
        let inner = block.inner(area);
        block.render(area, buf);
        render_image(&self.image, inner, buf);
    }
}

/// Lay out panes side by side above a one-line status bar
fn render_panes(panes: &[Pane], area: Rect, buf: &mut Buffer) {
    let [content, status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    if panes.is_empty() {
        let msg = "Waiting for sensor...";
        let x = content.x + (content.width.saturating_sub(msg.len() as u16)) / 2;
        let y = content.y + content.height / 2;
        if y < content.y + content.height && x < content.x + content.width {
            buf.set_string(x, y, msg, Style::default());
        }
    } else {
        let count = panes.len() as u32;
        let columns =
            Layout::horizontal(panes.iter().map(|_| Constraint::Ratio(1, count))).split(content);
        for (pane, column) in panes.iter().zip(columns.iter()) {
            pane.render(*column, buf);
        }
    }

    StatusBar {
        message: &format!("'{}' quit", QUIT_KEY),
    }
    .render(status, buf);
}

/// Draw an image into `area`, keeping its aspect ratio and centering it
fn render_image(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
    let (img_width, img_height) = image.dimensions();
    if img_width == 0 || img_height == 0 || area.width == 0 || area.height == 0 {
        return;
    }

    // Each terminal cell displays 2 vertical pixels
    let image_aspect = img_width as f64 / img_height as f64;
    let term_width = area.width as f64;
    let term_height = (area.height * 2) as f64;

    let (display_width, display_height) = if term_width / term_height > image_aspect {
        // Area is wider - fit to height
        let h = term_height;
        let w = h * image_aspect;
        (w as u16, (h / 2.0) as u16)
    } else {
        // Area is taller - fit to width
        let w = term_width;
        let h = w / image_aspect;
        (w as u16, (h / 2.0) as u16)
    };
    if display_width == 0 || display_height == 0 {
        return;
    }

    let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
    let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

    let x_scale = img_width as f64 / display_width as f64;
    let y_scale = img_height as f64 / (display_height * 2) as f64;

    for ty in 0..display_height {
        for tx in 0..display_width {
            let term_x = x_offset + tx;
            let term_y = y_offset + ty;
            if term_x >= area.x + area.width || term_y >= area.y + area.height {
                continue;
            }

            let src_x = (tx as f64 * x_scale) as u32;
            let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
            let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

            if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                cell.set_char('▀');
                cell.set_fg(sample_pixel(image, src_x, src_y_top));
                cell.set_bg(sample_pixel(image, src_x, src_y_bottom));
            }
        }
    }
}

fn sample_pixel(image: &DynamicImage, x: u32, y: u32) -> Color {
    let x = x.min(image.width() - 1);
    let y = y.min(image.height() - 1);
    let [r, g, b, _] = image.get_pixel(x, y).0;
    Color::Rgb(r, g, b)
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}
