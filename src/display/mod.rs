// SPDX-License-Identifier: GPL-3.0-only

//! Display surfaces
//!
//! A display shows images in named windows and reports key presses. The
//! viewer only talks to the [`DisplaySurface`] trait; the terminal display is
//! the interactive one, the headless display is for runs without a terminal.

mod headless;
mod terminal;

pub use headless::HeadlessDisplay;
pub use terminal::TerminalDisplay;

use image::DynamicImage;
use std::time::Duration;

use crate::errors::AppResult;

pub trait DisplaySurface {
    /// Show an image in the window called `name`
    ///
    /// The window is created the first time its name is used; later calls
    /// replace the image it shows.
    fn show_window(&mut self, name: &str, image: DynamicImage) -> AppResult<()>;

    /// Wait up to `timeout` for a key press
    ///
    /// # Returns
    /// * `Ok(Some(c))` - A character key was pressed
    /// * `Ok(None)` - No key within the timeout
    fn poll_key(&mut self, timeout: Duration) -> AppResult<Option<char>>;
}
