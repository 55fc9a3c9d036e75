// SPDX-License-Identifier: GPL-3.0-only

//! Terminal capture screen
//!
//! Drives a [`CaptureScreen`] from the keyboard. Captured photos are rendered
//! with Unicode half-block characters; recorded clips play in the player
//! window. When the terminal reports key releases the record key works as
//! press-and-hold, otherwise it toggles.

use crate::app::{CaptureScreen, CaptureState, CapturedMedia, EventLoop, Message, Phase};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// What a key press asks for
#[derive(Debug, Clone)]
pub enum KeyAction {
    None,
    Quit,
    Send(Message),
}

/// Run the terminal capture screen until the user quits
pub fn run(screen: CaptureScreen) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let hold_to_record =
        crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
    if hold_to_record {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(hold_to_record, "Starting terminal capture screen");
    let result = runtime.block_on(run_app(&mut terminal, screen, hold_to_record));

    // Restore terminal
    if hold_to_record {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    screen: CaptureScreen,
    hold_to_record: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut event_loop = EventLoop::new(screen);
    event_loop.start();

    let (key_sender, mut keys) = mpsc::unbounded_channel::<KeyEvent>();
    std::thread::Builder::new()
        .name("terminal-input".into())
        .spawn(move || read_keys(key_sender))?;

    let mut photo = PhotoWidget::default();
    let mut ticker = tokio::time::interval(Duration::from_millis(250));

    loop {
        let screen = event_loop.screen();
        photo.show(&screen.state().media);
        let status = build_status_message(screen, hold_to_record);
        let error = screen.last_error().map(|e| e.to_string());
        let placeholder = placeholder_message(screen.phase());

        terminal.draw(|f| {
            let area = f.area();
            let footer = if error.is_some() { 2 } else { 1 };

            // Reserve bottom lines for status
            let preview_area = Rect {
                height: area.height.saturating_sub(footer),
                ..area
            };
            f.render_widget(
                PhotoView {
                    widget: &photo,
                    placeholder,
                },
                preview_area,
            );

            if let Some(error) = &error {
                let error_area = Rect {
                    y: area.height.saturating_sub(2),
                    height: 1,
                    ..area
                };
                f.render_widget(
                    StatusBar {
                        message: error,
                        background: Color::Red,
                    },
                    error_area,
                );
            }

            let status_area = Rect {
                y: area.height.saturating_sub(1),
                height: 1,
                ..area
            };
            f.render_widget(
                StatusBar {
                    message: &status,
                    background: Color::DarkGray,
                },
                status_area,
            );
        })?;

        tokio::select! {
            key = keys.recv() => {
                let Some(key) = key else { break };
                match map_key(&key, event_loop.screen().state(), hold_to_record) {
                    KeyAction::Quit => break,
                    KeyAction::Send(message) => event_loop.dispatch(message),
                    KeyAction::None => {}
                }
            }
            running = event_loop.step() => {
                if !running {
                    break;
                }
            }
            _ = ticker.tick() => {}
        }
    }

    // Do not leave a recording running behind the terminal
    if event_loop.screen().state().recording.is_recording() {
        let timeout = event_loop.screen().config().stop_timeout();
        event_loop.dispatch(Message::StopCapture);
        event_loop
            .run_until(timeout, |s| !s.state().recording.is_recording())
            .await;
    }

    Ok(())
}

fn read_keys(sender: mpsc::UnboundedSender<KeyEvent>) {
    loop {
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => {
                    if sender.send(key).is_err() {
                        return;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Failed to read terminal input");
                    return;
                }
            },
            Ok(false) if sender.is_closed() => return,
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "Failed to poll terminal input");
                return;
            }
        }
    }
}

fn is_record_key(code: KeyCode) -> bool {
    matches!(code, KeyCode::Char('r') | KeyCode::Char(' '))
}

/// Map a key event to a screen message
///
/// With `hold_to_record` the record key starts on press and stops on
/// release; without it every press toggles.
pub fn map_key(key: &KeyEvent, state: &CaptureState, hold_to_record: bool) -> KeyAction {
    match key.kind {
        KeyEventKind::Release if hold_to_record && is_record_key(key.code) => {
            return KeyAction::Send(Message::StopCapture);
        }
        KeyEventKind::Press => {}
        _ => return KeyAction::None,
    }

    // Ctrl+C to quit
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }

    let message = match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('p') => Message::TakePicture,
        code if is_record_key(code) => {
            if !state.recording.is_recording() {
                Message::StartCapture
            } else if hold_to_record {
                return KeyAction::None;
            } else {
                Message::StopCapture
            }
        }
        KeyCode::Char('f') => Message::ToggleCameraFacing,
        KeyCode::Char('s') if state.preview_visible => Message::SaveCapturedMedia,
        KeyCode::Char('c') | KeyCode::Esc => Message::DismissPreview,
        _ => return KeyAction::None,
    };
    KeyAction::Send(message)
}

fn build_status_message(screen: &CaptureScreen, hold_to_record: bool) -> String {
    let record_hint = if hold_to_record {
        "hold 'r' record"
    } else {
        "'r' record"
    };
    let facing = screen.state().facing;

    let mut msg = match screen.phase() {
        Phase::AwaitingPermissions => "Requesting camera, microphone and gallery access".to_string(),
        Phase::CaptureUnavailable => "Camera or microphone access denied | 'q' quit".to_string(),
        Phase::Idle => format!(
            "[{}] 'p' picture | {} | 'f' switch camera | 'q' quit",
            facing, record_hint
        ),
        Phase::Recording => {
            let elapsed = screen.recording_elapsed().map(|d| d.as_secs()).unwrap_or(0);
            let stop_hint = if hold_to_record {
                "release 'r' to stop"
            } else {
                "'r' stop"
            };
            format!(
                "REC {:02}:{:02} | {}",
                elapsed / 60,
                elapsed % 60,
                stop_hint
            )
        }
        Phase::PreviewingVideo => "Playing clip | 's' save | 'c' close".to_string(),
        Phase::PreviewingPhoto => "'s' save | 'c' close".to_string(),
    };

    if let Some(saved) = screen.last_saved() {
        msg.push_str(&format!(" | Saved: {}", saved.display()));
    }
    msg
}

fn placeholder_message(phase: Phase) -> &'static str {
    match phase {
        Phase::AwaitingPermissions => "Waiting for permissions...",
        Phase::CaptureUnavailable => "Capture unavailable",
        Phase::Recording => "Recording...",
        Phase::PreviewingVideo => "Clip is playing in the player window",
        Phase::Idle | Phase::PreviewingPhoto => "Ready",
    }
}

/// Holds the decoded photo currently on screen
#[derive(Default)]
struct PhotoWidget {
    path: Option<String>,
    image: Option<image::RgbImage>,
}

impl PhotoWidget {
    fn show(&mut self, media: &CapturedMedia) {
        let path = match media {
            CapturedMedia::Photo(path) => Some(path.as_str()),
            _ => None,
        };
        if self.path.as_deref() == path {
            return;
        }

        self.path = path.map(str::to_owned);
        self.image = path.and_then(|p| {
            let p = crate::storage::strip_file_scheme(p);
            match image::open(p) {
                Ok(img) => Some(img.to_rgb8()),
                Err(e) => {
                    warn!(path = %p, error = %e, "Failed to load photo preview");
                    None
                }
            }
        });
    }
}

/// Renders the photo using half-block characters
struct PhotoView<'a> {
    widget: &'a PhotoWidget,
    placeholder: &'a str,
}

impl Widget for PhotoView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(image) = &self.widget.image else {
            let msg = self.placeholder;
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, ratatui::style::Style::default());
            }
            return;
        };
        if image.width() == 0 || image.height() == 0 {
            return;
        }

        // Each terminal cell displays 2 vertical pixels
        let aspect = image.width() as f64 / image.height() as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > aspect {
            let h = term_height;
            ((h * aspect) as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            (w as u16, (w / aspect / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;
        let x_scale = image.width() as f64 / display_width as f64;
        let y_scale = image.height() as f64 / (display_height * 2) as f64;

        for ty in 0..display_height {
            for tx in 0..display_width {
                let src_x = (tx as f64 * x_scale) as u32;
                let src_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(sample_pixel(image, src_x, src_top));
                    cell.set_bg(sample_pixel(image, src_x, src_bottom));
                }
            }
        }
    }
}

fn sample_pixel(image: &image::RgbImage, x: u32, y: u32) -> Color {
    let x = x.min(image.width() - 1);
    let y = y.min(image.height() - 1);
    let [r, g, b] = image.get_pixel(x, y).0;
    Color::Rgb(r, g, b)
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
    background: Color,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(self.background);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(self.background),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn recording_state() -> CaptureState {
        let mut state = CaptureState::default();
        state.begin_recording(uuid::Uuid::new_v4());
        state
    }

    #[test]
    fn hold_to_record_starts_on_press_and_stops_on_release() {
        let idle = CaptureState::default();
        let recording = recording_state();

        assert!(matches!(
            map_key(&key(KeyCode::Char('r'), KeyEventKind::Press), &idle, true),
            KeyAction::Send(Message::StartCapture)
        ));
        assert!(matches!(
            map_key(&key(KeyCode::Char('r'), KeyEventKind::Repeat), &recording, true),
            KeyAction::None
        ));
        assert!(matches!(
            map_key(&key(KeyCode::Char('r'), KeyEventKind::Release), &recording, true),
            KeyAction::Send(Message::StopCapture)
        ));
    }

    #[test]
    fn record_key_toggles_without_release_events() {
        let recording = recording_state();
        assert!(matches!(
            map_key(&key(KeyCode::Char(' '), KeyEventKind::Press), &recording, false),
            KeyAction::Send(Message::StopCapture)
        ));
        assert!(matches!(
            map_key(&key(KeyCode::Char('r'), KeyEventKind::Release), &recording, false),
            KeyAction::None
        ));
    }

    #[test]
    fn save_needs_open_preview() {
        let mut state = CaptureState::default();
        assert!(matches!(
            map_key(&key(KeyCode::Char('s'), KeyEventKind::Press), &state, false),
            KeyAction::None
        ));

        let request = uuid::Uuid::new_v4();
        state.begin_photo(request);
        state.photo_captured(request, "/tmp/img1.jpg".to_string());
        assert!(matches!(
            map_key(&key(KeyCode::Char('s'), KeyEventKind::Press), &state, false),
            KeyAction::Send(Message::SaveCapturedMedia)
        ));
    }

    #[test]
    fn ctrl_c_quits() {
        let mut event = key(KeyCode::Char('c'), KeyEventKind::Press);
        event.modifiers = KeyModifiers::CONTROL;
        assert!(matches!(
            map_key(&event, &CaptureState::default(), false),
            KeyAction::Quit
        ));
    }
}
