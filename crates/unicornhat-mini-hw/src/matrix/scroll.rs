//! Scrolling text across the matrix.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::device::{UnicornHatMini, LETTER_PITCH, LETTER_SLOTS};
use super::framebuffer::Color;
use crate::transport::Transport;
use crate::Result;

/// Default delay between scroll frames.
pub const DEFAULT_SCROLL_INTERVAL: Duration = Duration::from_millis(100);

/// Scroll settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOptions {
    /// Delay after each frame.
    pub interval: Duration,
    /// Start over after the last character until stopped.
    pub looping: bool,
    /// Solid text colour; `None` uses the glyph gradient.
    pub color: Option<Color>,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SCROLL_INTERVAL,
            looping: false,
            color: None,
        }
    }
}

/// Shared handle for observing and stopping a scroll.
///
/// Stopping is checked between frames, so the frame in flight always
/// completes. A stop request is sticky: a stopped handle ends every scroll
/// it is passed to.
#[derive(Debug, Clone, Default)]
pub struct ScrollHandle {
    stop: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl ScrollHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the scroll to end before its next frame.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Returns true while a scroll is drawing frames.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Clears the running flag however the scroll ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn new(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Relaxed);
        Self(flag)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

impl<T: Transport> UnicornHatMini<T> {
    /// Scrolls `text` right to left, one column per frame.
    ///
    /// Each character takes six frames; up to four letters are visible at
    /// once. The exclusive borrow keeps other frame updates out until the
    /// scroll ends. `on_complete` runs when the scroll finishes or is
    /// stopped, but not when a transfer fails.
    pub async fn scroll_text<F>(
        &mut self,
        text: &str,
        options: &ScrollOptions,
        handle: &ScrollHandle,
        on_complete: Option<F>,
    ) -> Result<()>
    where
        F: FnOnce(),
    {
        let chars: Vec<char> = text.chars().collect();

        {
            let _running = RunningGuard::new(&handle.running);
            debug!(
                "Scrolling {} characters (interval {:?}, looping {})",
                chars.len(),
                options.interval,
                options.looping
            );
            self.run_scroll(&chars, options, handle).await?;
        }

        debug!("Scroll finished");
        if let Some(callback) = on_complete {
            callback();
        }
        Ok(())
    }

    async fn run_scroll(
        &mut self,
        chars: &[char],
        options: &ScrollOptions,
        handle: &ScrollHandle,
    ) -> Result<()> {
        self.clear();

        if chars.is_empty() {
            return self.show();
        }

        loop {
            for start in 0..chars.len() {
                for step in 0..LETTER_PITCH {
                    if handle.is_stopped() {
                        debug!("Scroll stopped");
                        return Ok(());
                    }

                    self.clear();
                    for (slot, &ch) in chars[start..]
                        .iter()
                        .take(LETTER_SLOTS as usize)
                        .enumerate()
                    {
                        self.set_letter(ch, slot as u8 + 1, step, options.color)?;
                    }
                    self.show()?;
                    tokio::time::sleep(options.interval).await;
                }
            }

            if !options.looping {
                return Ok(());
            }
            debug!("Restarting scroll");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use std::sync::atomic::AtomicUsize;

    fn open() -> (UnicornHatMini<MemoryTransport>, MemoryTransport) {
        let left = MemoryTransport::new();
        let display = UnicornHatMini::new(left.clone(), MemoryTransport::new()).unwrap();
        left.reset();
        (display, left)
    }

    fn fast() -> ScrollOptions {
        ScrollOptions {
            interval: Duration::from_millis(1),
            ..ScrollOptions::default()
        }
    }

    #[tokio::test]
    async fn test_scroll_frames_and_callback() {
        let (mut display, left) = open();
        let handle = ScrollHandle::new();
        let done = AtomicBool::new(false);

        display
            .scroll_text("HI", &fast(), &handle, Some(|| done.store(true, Ordering::Relaxed)))
            .await
            .unwrap();

        // six frames per character, each a display write plus brightness
        assert_eq!(left.frames().len(), 2 * 6 * 2);
        assert!(done.load(Ordering::Relaxed));
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn test_scroll_ends_on_final_frame() {
        let (mut display, _) = open();
        let options = ScrollOptions {
            color: Some(Color::WHITE),
            ..fast()
        };
        display
            .scroll_text("A", &options, &ScrollHandle::new(), None::<fn()>)
            .await
            .unwrap();

        // the last frame shows 'A' shifted five columns off the left edge
        assert!(display
            .pixels()
            .iter()
            .all(|&p| p == crate::Rgb::default()));
    }

    #[tokio::test]
    async fn test_stop_looping_scroll() {
        let (mut display, left) = open();
        let handle = ScrollHandle::new();
        let stopper = handle.clone();
        let calls = AtomicUsize::new(0);
        let options = ScrollOptions {
            looping: true,
            ..fast()
        };

        let (result, _) = tokio::join!(
            display.scroll_text(
                "LOOP",
                &options,
                &handle,
                Some(|| {
                    calls.fetch_add(1, Ordering::Relaxed);
                })
            ),
            async {
                while !stopper.is_running() {
                    tokio::task::yield_now().await;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
                stopper.stop();
            }
        );

        result.unwrap();
        assert!(!handle.is_running());
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert!(!left.frames().is_empty());
    }

    #[tokio::test]
    async fn test_stopped_handle_draws_nothing() {
        let (mut display, left) = open();
        let handle = ScrollHandle::new();
        handle.stop();

        display
            .scroll_text("HELLO", &fast(), &handle, None::<fn()>)
            .await
            .unwrap();
        assert!(left.frames().is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_shows_blank() {
        let (mut display, left) = open();
        display.set_all(255, 255, 255);
        display
            .scroll_text("", &fast(), &ScrollHandle::new(), None::<fn()>)
            .await
            .unwrap();

        assert_eq!(left.frames().len(), 2);
        assert!(display.physical_buffer().iter().all(|&b| b == 0));
    }

    #[tokio::test]
    async fn test_transfer_error_skips_callback() {
        let (mut display, left) = open();
        left.set_failing(true);
        let handle = ScrollHandle::new();
        let done = AtomicBool::new(false);

        let result = display
            .scroll_text("X", &fast(), &handle, Some(|| done.store(true, Ordering::Relaxed)))
            .await;

        assert!(matches!(result, Err(crate::Error::Transfer { .. })));
        assert!(!done.load(Ordering::Relaxed));
        assert!(!handle.is_running());
    }
}
