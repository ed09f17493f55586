//! Desktop actuator backed by `enigo`

use super::keys::KeyName;
use super::platform;
use super::{ActuationError, Actuator, PointerButton};
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

/// Synthesizes real keyboard and pointer input on the host
pub struct EnigoActuator {
    enigo: Enigo,
}

impl EnigoActuator {
    pub fn new() -> Result<Self, ActuationError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| ActuationError::Unavailable(format!("{:?}", e)))?;
        Ok(Self { enigo })
    }
}

fn input_error(e: enigo::InputError) -> ActuationError {
    ActuationError::Input(format!("{:?}", e))
}

fn to_enigo_key(key: KeyName) -> Key {
    match key {
        KeyName::Control => Key::Control,
        KeyName::Shift => Key::Shift,
        KeyName::Alt => Key::Alt,
        KeyName::Meta => Key::Meta,
        KeyName::Return => Key::Return,
        KeyName::Tab => Key::Tab,
        KeyName::Escape => Key::Escape,
        KeyName::Space => Key::Space,
        KeyName::Backspace => Key::Backspace,
        KeyName::Delete => Key::Delete,
        KeyName::Up => Key::UpArrow,
        KeyName::Down => Key::DownArrow,
        KeyName::Left => Key::LeftArrow,
        KeyName::Right => Key::RightArrow,
        KeyName::Home => Key::Home,
        KeyName::End => Key::End,
        KeyName::PageUp => Key::PageUp,
        KeyName::PageDown => Key::PageDown,
        KeyName::CapsLock => Key::CapsLock,
        KeyName::F(n) => match n {
            1 => Key::F1,
            2 => Key::F2,
            3 => Key::F3,
            4 => Key::F4,
            5 => Key::F5,
            6 => Key::F6,
            7 => Key::F7,
            8 => Key::F8,
            9 => Key::F9,
            10 => Key::F10,
            11 => Key::F11,
            _ => Key::F12,
        },
        KeyName::Char(c) => Key::Unicode(c),
    }
}

fn to_enigo_button(button: PointerButton) -> Button {
    match button {
        PointerButton::Left => Button::Left,
        PointerButton::Right => Button::Right,
        PointerButton::Middle => Button::Middle,
    }
}

impl Actuator for EnigoActuator {
    fn key_down(&mut self, key: KeyName) -> Result<(), ActuationError> {
        self.enigo
            .key(to_enigo_key(key), Direction::Press)
            .map_err(input_error)
    }

    fn key_up(&mut self, key: KeyName) -> Result<(), ActuationError> {
        self.enigo
            .key(to_enigo_key(key), Direction::Release)
            .map_err(input_error)
    }

    fn button_down(&mut self, button: PointerButton) -> Result<(), ActuationError> {
        self.enigo
            .button(to_enigo_button(button), Direction::Press)
            .map_err(input_error)
    }

    fn button_up(&mut self, button: PointerButton) -> Result<(), ActuationError> {
        self.enigo
            .button(to_enigo_button(button), Direction::Release)
            .map_err(input_error)
    }

    fn click(&mut self, button: PointerButton) -> Result<(), ActuationError> {
        self.enigo
            .button(to_enigo_button(button), Direction::Click)
            .map_err(input_error)
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), ActuationError> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(input_error)
    }

    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), ActuationError> {
        if dx == 0 && dy == 0 {
            return Ok(());
        }
        self.enigo
            .move_mouse(dx, dy, Coordinate::Rel)
            .map_err(input_error)
    }

    fn launch(&mut self, command: &str) -> Result<(), ActuationError> {
        platform::launch(command)
    }

    fn open_url(&mut self, url: &str) -> Result<(), ActuationError> {
        platform::open_url(url)
    }

    fn set_clipboard(&mut self, text: &str) -> Result<(), ActuationError> {
        platform::set_clipboard(text)
    }

    fn screen_size(&self) -> Result<(u32, u32), ActuationError> {
        let (w, h) = self.enigo.main_display().map_err(input_error)?;
        Ok((w.max(1) as u32, h.max(1) as u32))
    }
}
