use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// Owns the input driver and pumps its events into a handler.
///
/// The toolkit is single threaded: every document mutation, dispatch and
/// redraw happens inside the handler, on the thread that calls `run`.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn poll(&mut self) -> io::Result<Option<Event>> {
        if self.driver.poll(self.poll_interval)? {
            Ok(Some(self.driver.read()?))
        } else {
            Ok(None)
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Run until the handler returns `ControlFlow::Quit`.
    ///
    /// The handler gets `Some(event)` for each input event and `None` once per
    /// iteration before polling, which is where the host redraws.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                // Drain bursts (wheel scrolling) before the next redraw.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::scripted::ScriptedInputDriver;

    #[test]
    fn drains_events_between_redraws_and_stops_on_quit() {
        let driver = ScriptedInputDriver::new([
            Event::Resize(10, 5),
            Event::Resize(11, 5),
            Event::FocusLost,
        ]);
        let mut event_loop = EventLoop::new(driver, Duration::from_millis(0));
        let mut seen = Vec::new();
        let mut redraws = 0;
        event_loop
            .run(|_, event| {
                match event {
                    None => redraws += 1,
                    Some(Event::FocusLost) => return Ok(ControlFlow::Quit),
                    Some(other) => seen.push(other),
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(seen, vec![Event::Resize(10, 5), Event::Resize(11, 5)]);
        assert_eq!(redraws, 1);
        assert_eq!(event_loop.driver().remaining(), 0);
    }
}
