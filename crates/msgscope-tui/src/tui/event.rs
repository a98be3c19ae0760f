use std::time::Duration;

use crossterm::event::{
    self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Input the console loop reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Clock for expiring status notices
    Tick,
    Key(KeyEvent),
    Pointer(Pointer),
    Resize(u16, u16),
    /// Reading the terminal failed
    Error(String),
}

/// Mouse input over the message list, in terminal cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pointer {
    /// Left press: open the message under the cursor
    Open { column: u16, row: u16 },
    /// Right press: remove the message under the cursor
    Remove { column: u16, row: u16 },
    ScrollUp,
    ScrollDown,
}

/// Reduce a terminal event to what the console uses. Key releases, mouse
/// moves, drags and focus changes are dropped.
pub fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Mouse(mouse) => pointer(mouse).map(Event::Pointer),
        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        _ => None,
    }
}

fn pointer(mouse: MouseEvent) -> Option<Pointer> {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Pointer::Open { column, row }),
        MouseEventKind::Down(MouseButton::Right) => Some(Pointer::Remove { column, row }),
        MouseEventKind::ScrollUp => Some(Pointer::ScrollUp),
        MouseEventKind::ScrollDown => Some(Pointer::ScrollDown),
        _ => None,
    }
}

/// Reads the terminal on a background task and forwards translated events
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();

            tokio::spawn(async move {
                let mut reader = event::EventStream::new();
                let mut ticks = tokio::time::interval(tick_rate);

                loop {
                    let next = reader.next().fuse();

                    let forwarded = tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticks.tick() => Some(Event::Tick),
                        read = next => match read {
                            Some(Ok(event)) => translate(event),
                            Some(Err(e)) => Some(Event::Error(e.to_string())),
                            None => break,
                        },
                    };

                    if let Some(event) = forwarded
                        && sender.send(event).is_err()
                    {
                        break;
                    }
                }
            })
        };

        Self {
            receiver,
            cancel,
            task,
        }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Stop reading the terminal and wait for the reader task to finish
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn mouse(kind: MouseEventKind) -> CrosstermEvent {
        CrosstermEvent::Mouse(MouseEvent {
            kind,
            column: 7,
            row: 3,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_only_key_presses_pass() {
        let press = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE);
        assert_eq!(translate(CrosstermEvent::Key(press)), Some(Event::Key(press)));

        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Char('y'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert_eq!(translate(CrosstermEvent::Key(release)), None);
    }

    #[test]
    fn test_mouse_buttons_and_wheel() {
        assert_eq!(
            translate(mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(Event::Pointer(Pointer::Open { column: 7, row: 3 }))
        );
        assert_eq!(
            translate(mouse(MouseEventKind::Down(MouseButton::Right))),
            Some(Event::Pointer(Pointer::Remove { column: 7, row: 3 }))
        );
        assert_eq!(
            translate(mouse(MouseEventKind::ScrollDown)),
            Some(Event::Pointer(Pointer::ScrollDown))
        );
        assert_eq!(translate(mouse(MouseEventKind::Moved)), None);
        assert_eq!(translate(mouse(MouseEventKind::Up(MouseButton::Left))), None);
        assert_eq!(translate(mouse(MouseEventKind::Down(MouseButton::Middle))), None);
    }

    #[test]
    fn test_resize_and_focus() {
        assert_eq!(translate(CrosstermEvent::Resize(80, 24)), Some(Event::Resize(80, 24)));
        assert_eq!(translate(CrosstermEvent::FocusLost), None);
    }
}
