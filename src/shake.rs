use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const WIGGLE_WINDOW: Duration = Duration::from_millis(800);
// Left, right, left, right: three turns.
const WIGGLE_TURNS: usize = 3;

#[derive(Clone, Copy, PartialEq, Debug)]
enum Direction {
    Left,
    Right,
}

/// Turns keyboard input into shake events: `s` shakes directly, and so
/// does wiggling the left/right arrows quickly.
#[derive(Default)]
pub struct ShakeDetector {
    wiggle: Vec<(Direction, Instant)>,
}

impl ShakeDetector {
    pub fn feed(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }

        let direction = match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.wiggle.clear();
                return true;
            }
            KeyCode::Left => Direction::Left,
            KeyCode::Right => Direction::Right,
            _ => {
                self.wiggle.clear();
                return false;
            }
        };

        self.wiggle.retain(|(_, at)| now.duration_since(*at) <= WIGGLE_WINDOW);
        if self.wiggle.last().is_some_and(|(last, _)| *last == direction) {
            self.wiggle.clear();
        }
        self.wiggle.push((direction, now));

        // N alternating presses make N - 1 turns.
        if self.wiggle.len() > WIGGLE_TURNS {
            self.wiggle.clear();
            return true;
        }
        false
    }
}
