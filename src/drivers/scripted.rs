use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::Event;

use super::InputDriver;
use super::keyboard::KeyboardNormalizer;

/// Replays a fixed list of terminal events, for driving the event loop
/// without a terminal. Events pass through the same normalizer as console
/// input. Once the script runs dry, `poll` reports no input.
#[derive(Debug, Default)]
pub struct ScriptedInputDriver {
    events: VecDeque<Event>,
    normalizer: KeyboardNormalizer,
    mouse_capture: bool,
}

impl ScriptedInputDriver {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    pub fn mouse_capture(&self) -> bool {
        self.mouse_capture
    }

    fn skip_filtered(&mut self) {
        while let Some(front) = self.events.front() {
            if self.normalizer.normalize(front.clone()).is_some() {
                break;
            }
            self.events.pop_front();
        }
    }
}

impl InputDriver for ScriptedInputDriver {
    fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
        self.skip_filtered();
        Ok(!self.events.is_empty())
    }

    fn read(&mut self) -> io::Result<Event> {
        while let Some(evt) = self.events.pop_front() {
            if let Some(normalized) = self.normalizer.normalize(evt) {
                return Ok(normalized);
            }
        }
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "script exhausted",
        ))
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        self.mouse_capture = enabled;
        Ok(())
    }
}
