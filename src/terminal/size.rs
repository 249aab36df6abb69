//! Output geometry resolution.

/// Used when the terminal size cannot be queried.
pub const FALLBACK_SIZE: (u32, u32) = (125, 50);

/// Current terminal size in (columns, rows), if stdout is a terminal.
pub fn terminal_size() -> Option<(u32, u32)> {
    match crossterm::terminal::size() {
        Ok((cols, rows)) if cols > 0 && rows > 0 => Some((u32::from(cols), u32::from(rows))),
        Ok(_) => None,
        Err(e) => {
            log::debug!("Terminal size unavailable: {}", e);
            None
        }
    }
}

/// Pick the output size in terminal cells.
///
/// Explicit width and height win independently; anything missing comes
/// from the terminal, then from [`FALLBACK_SIZE`].
pub fn resolve_output_size(
    width: Option<u32>,
    height: Option<u32>,
    terminal: Option<(u32, u32)>,
) -> (u32, u32) {
    let (term_w, term_h) = terminal.unwrap_or(FALLBACK_SIZE);
    (width.unwrap_or(term_w).max(1), height.unwrap_or(term_h).max(1))
}
