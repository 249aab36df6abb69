//! Alternate-screen session with panic-safe cleanup.

use crossterm::{cursor, execute, terminal};
use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the alternate screen is active (read by the panic hook)
pub(crate) static SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Guard that keeps the terminal on the alternate screen with the cursor
/// hidden, and restores both on drop.
pub struct ScreenGuard {
    /// Whether this guard is responsible for cleanup
    active: bool,
}

impl ScreenGuard {
    /// Switch stdout to the alternate screen and hide the cursor.
    ///
    /// # Errors
    /// Returns an error if the escape sequences cannot be written
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();

        execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        SCREEN_ACTIVE.store(true, Ordering::SeqCst);

        Ok(Self { active: true })
    }

    /// Restore the terminal now. Dropping the guard afterwards is a no-op.
    pub fn exit(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            SCREEN_ACTIVE.store(false, Ordering::SeqCst);
            restore()?;
        }
        Ok(())
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        if self.active {
            SCREEN_ACTIVE.store(false, Ordering::SeqCst);
            // Best-effort cleanup - ignore errors during drop
            let _ = restore();
        }
    }
}

fn restore() -> io::Result<()> {
    execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen)
}

/// Install a panic hook that leaves the alternate screen before the panic
/// message is printed, so the message stays visible.
pub(crate) fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        if SCREEN_ACTIVE.swap(false, Ordering::SeqCst) {
            let _ = restore();
        }
        original_hook(panic_info);
    }));
}
