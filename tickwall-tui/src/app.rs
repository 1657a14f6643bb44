//! Application state: the feed session plus the UI-local inputs
//! (search buffer, navbar hover flag, full-refresh deadline).

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tracing::info;

use tickwall_core::{FeedConfig, FeedSession, Result, SearchBuffer, Timeframe};

/// Rows from the top within which hovering reveals the navbar
pub const NAVBAR_HEIGHT: u16 = 3;

/// Modifiers that disqualify a key press from feeding the search buffer
const SEARCH_BLOCKERS: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SUPER)
    .union(KeyModifiers::META);

pub struct App {
    config: FeedConfig,
    pub session: FeedSession,
    pub search: SearchBuffer,
    pub navbar_visible: bool,
    session_started: Instant,
}

impl App {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let session = FeedSession::connect(config.clone(), Timeframe::default())?;
        Ok(Self {
            config,
            session,
            search: SearchBuffer::new(),
            navbar_visible: false,
            session_started: Instant::now(),
        })
    }

    /// Handle one key press; returns true when the app should quit
    ///
    /// Plain printable keys go to the search buffer, F1..F6 switch the
    /// timeframe, Esc quits. Modified key presses are ignored so terminal
    /// shortcuts never leak into the query.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Result<bool> {
        match key.code {
            KeyCode::Esc => return Ok(true),
            KeyCode::F(n @ 1..=6) => {
                self.session
                    .set_timeframe(Timeframe::ALL[(n - 1) as usize])?;
            }
            KeyCode::Backspace => self.search.backspace(now),
            KeyCode::Char(ch) if !key.modifiers.intersects(SEARCH_BLOCKERS) => {
                self.search.push(ch, now);
            }
            _ => {}
        }
        Ok(false)
    }

    /// Reveal the navbar while the pointer hovers the top rows
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        if let MouseEventKind::Moved = event.kind {
            self.navbar_visible = event.row < NAVBAR_HEIGHT;
        }
    }

    /// Per-frame housekeeping: search expiry and the unconditional refresh
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        self.search.tick(now);
        if now.duration_since(self.session_started) >= self.config.auto_refresh {
            self.full_refresh(now)?;
        }
        Ok(())
    }

    /// Rebuild the whole session from scratch, as a process reload would:
    /// fresh store, fresh connection, default timeframe. This is the only
    /// defence against a silently dead connection, so it fires regardless
    /// of connectivity state.
    fn full_refresh(&mut self, now: Instant) -> Result<()> {
        info!("auto refresh: rebuilding feed session");
        self.session = FeedSession::connect(self.config.clone(), Timeframe::default())?;
        self.session_started = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, MouseButton};
    use std::time::Duration;

    fn test_app() -> App {
        // Nothing listens on this port; the session just stays unconnected
        App::new(FeedConfig::new("ws://127.0.0.1:1")).unwrap()
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[tokio::test]
    async fn test_plain_chars_feed_search() {
        let mut app = test_app();
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('b'), KeyModifiers::NONE), now)
            .unwrap();
        app.handle_key(key(KeyCode::Char('T'), KeyModifiers::SHIFT), now)
            .unwrap();
        app.handle_key(key(KeyCode::Char('c'), KeyModifiers::NONE), now)
            .unwrap();
        app.handle_key(key(KeyCode::Backspace, KeyModifiers::NONE), now)
            .unwrap();
        assert_eq!(app.search.as_str(), "bT");
    }

    #[tokio::test]
    async fn test_modified_chars_are_ignored() {
        let mut app = test_app();
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL), now)
            .unwrap();
        app.handle_key(key(KeyCode::Char('x'), KeyModifiers::ALT), now)
            .unwrap();
        assert!(app.search.is_empty());
    }

    #[tokio::test]
    async fn test_function_keys_switch_timeframe() {
        let mut app = test_app();
        assert_eq!(app.session.timeframe(), Timeframe::M1);
        app.handle_key(
            key(KeyCode::F(4), KeyModifiers::NONE),
            Instant::now(),
        )
        .unwrap();
        assert_eq!(app.session.timeframe(), Timeframe::M15);
    }

    #[tokio::test]
    async fn test_esc_quits() {
        let mut app = test_app();
        let quit = app
            .handle_key(key(KeyCode::Esc, KeyModifiers::NONE), Instant::now())
            .unwrap();
        assert!(quit);
    }

    #[tokio::test]
    async fn test_navbar_follows_pointer() {
        let mut app = test_app();
        let moved = |row| MouseEvent {
            kind: MouseEventKind::Moved,
            column: 10,
            row,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(moved(0));
        assert!(app.navbar_visible);
        app.handle_mouse(moved(NAVBAR_HEIGHT));
        assert!(!app.navbar_visible);

        // Clicks do not toggle the hover flag
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 20,
            modifiers: KeyModifiers::NONE,
        });
        assert!(!app.navbar_visible);
    }

    #[tokio::test]
    async fn test_full_refresh_resets_timeframe() {
        let mut app = test_app();
        let now = Instant::now();
        app.handle_key(key(KeyCode::F(6), KeyModifiers::NONE), now)
            .unwrap();
        assert_eq!(app.session.timeframe(), Timeframe::H1);

        // Past the refresh deadline the session restarts from defaults
        app.tick(now + app.config.auto_refresh + Duration::from_secs(1))
            .unwrap();
        assert_eq!(app.session.timeframe(), Timeframe::M1);
    }
}
