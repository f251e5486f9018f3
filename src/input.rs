//! Input events, window context and handler chains

use crate::viz::PointVizHandle;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Key {
    Space = 32,
    Apostrophe = 39,
    Minus = 45,
    Key0 = 48,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Equal = 61,
    A = 65,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    LeftBracket = 91,
    RightBracket = 93,
    Esc = 256,
    Enter,
    Tab,
    Backspace,
    Insert,
    Delete,
    Right,
    Left,
    Down,
    Up,
    PageUp,
    PageDown,
    Home,
    End = 269,
    F1 = 290,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

impl Key {
    /// Map a GLFW key code.
    pub fn from_code(code: i32) -> Option<Self> {
        const LETTERS: [Key; 26] = [
            Key::A,
            Key::B,
            Key::C,
            Key::D,
            Key::E,
            Key::F,
            Key::G,
            Key::H,
            Key::I,
            Key::J,
            Key::K,
            Key::L,
            Key::M,
            Key::N,
            Key::O,
            Key::P,
            Key::Q,
            Key::R,
            Key::S,
            Key::T,
            Key::U,
            Key::V,
            Key::W,
            Key::X,
            Key::Y,
            Key::Z,
        ];
        const DIGITS: [Key; 10] = [
            Key::Key0,
            Key::Key1,
            Key::Key2,
            Key::Key3,
            Key::Key4,
            Key::Key5,
            Key::Key6,
            Key::Key7,
            Key::Key8,
            Key::Key9,
        ];
        const SPECIAL: [Key; 14] = [
            Key::Esc,
            Key::Enter,
            Key::Tab,
            Key::Backspace,
            Key::Insert,
            Key::Delete,
            Key::Right,
            Key::Left,
            Key::Down,
            Key::Up,
            Key::PageUp,
            Key::PageDown,
            Key::Home,
            Key::End,
        ];
        const FUNCTION: [Key; 12] = [
            Key::F1,
            Key::F2,
            Key::F3,
            Key::F4,
            Key::F5,
            Key::F6,
            Key::F7,
            Key::F8,
            Key::F9,
            Key::F10,
            Key::F11,
            Key::F12,
        ];

        match code {
            32 => Some(Key::Space),
            39 => Some(Key::Apostrophe),
            45 => Some(Key::Minus),
            48..=57 => Some(DIGITS[(code - 48) as usize]),
            61 => Some(Key::Equal),
            65..=90 => Some(LETTERS[(code - 65) as usize]),
            91 => Some(Key::LeftBracket),
            93 => Some(Key::RightBracket),
            256..=269 => Some(SPECIAL[(code - 256) as usize]),
            290..=301 => Some(FUNCTION[(code - 290) as usize]),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Press state reported with key and mouse button events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Release,
    Press,
    Repeat,
}

impl KeyAction {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(KeyAction::Release),
            1 => Some(KeyAction::Press),
            2 => Some(KeyAction::Repeat),
            _ => None,
        }
    }

    /// Press or repeat.
    pub fn is_down(self) -> bool {
        self != KeyAction::Release
    }
}

/// Modifier keys held during an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub cmd: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        cmd: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        cmd: false,
    };

    /// Decode a GLFW modifier bit field.
    pub fn from_bits(bits: i32) -> Self {
        Self {
            shift: (bits & 0x0001) != 0,
            ctrl: (bits & 0x0002) != 0,
            alt: (bits & 0x0004) != 0,
            cmd: (bits & 0x0008) != 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Modifiers::NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
    pub mods: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonEvent {
    pub button: MouseButton,
    pub action: KeyAction,
    pub mods: Modifiers,
}

/// Context for input callbacks.
///
/// During dispatch of a mouse move, `mouse_x`/`mouse_y` still hold the
/// previous position so handlers can compute the drag delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowCtx {
    /// True if the left mouse button is held
    pub lbutton_down: bool,
    /// True if the middle mouse button is held
    pub mbutton_down: bool,
    pub mouse_x: f64,
    pub mouse_y: f64,
    /// Current viewport width in pixels
    pub viewport_width: u32,
    /// Current viewport height in pixels
    pub viewport_height: u32,
}

impl WindowCtx {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            lbutton_down: false,
            mbutton_down: false,
            mouse_x: 0.0,
            mouse_y: 0.0,
            viewport_width,
            viewport_height,
        }
    }

    /// Viewport width / height.
    pub fn aspect(&self) -> f64 {
        if self.viewport_height == 0 {
            1.0
        } else {
            self.viewport_width as f64 / self.viewport_height as f64
        }
    }
}

/// Keyboard handler. Returning `true` consumes the event.
pub trait KeyHandler: Send {
    fn handle(&mut self, viz: &PointVizHandle, ctx: &WindowCtx, event: KeyEvent) -> bool;
}

impl<F> KeyHandler for F
where
    F: FnMut(&PointVizHandle, &WindowCtx, KeyEvent) -> bool + Send,
{
    fn handle(&mut self, viz: &PointVizHandle, ctx: &WindowCtx, event: KeyEvent) -> bool {
        self(viz, ctx, event)
    }
}

/// Mouse button handler. Returning `true` consumes the event.
pub trait MouseButtonHandler: Send {
    fn handle(&mut self, viz: &PointVizHandle, ctx: &WindowCtx, event: MouseButtonEvent) -> bool;
}

impl<F> MouseButtonHandler for F
where
    F: FnMut(&PointVizHandle, &WindowCtx, MouseButtonEvent) -> bool + Send,
{
    fn handle(&mut self, viz: &PointVizHandle, ctx: &WindowCtx, event: MouseButtonEvent) -> bool {
        self(viz, ctx, event)
    }
}

/// Scroll handler, called with the scroll offsets. Returning `true` consumes
/// the event.
pub trait ScrollHandler: Send {
    fn handle(&mut self, viz: &PointVizHandle, ctx: &WindowCtx, x: f64, y: f64) -> bool;
}

impl<F> ScrollHandler for F
where
    F: FnMut(&PointVizHandle, &WindowCtx, f64, f64) -> bool + Send,
{
    fn handle(&mut self, viz: &PointVizHandle, ctx: &WindowCtx, x: f64, y: f64) -> bool {
        self(viz, ctx, x, y)
    }
}

/// Mouse position handler, called with the new cursor position. Returning
/// `true` consumes the event.
pub trait MousePosHandler: Send {
    fn handle(&mut self, viz: &PointVizHandle, ctx: &WindowCtx, x: f64, y: f64) -> bool;
}

impl<F> MousePosHandler for F
where
    F: FnMut(&PointVizHandle, &WindowCtx, f64, f64) -> bool + Send,
{
    fn handle(&mut self, viz: &PointVizHandle, ctx: &WindowCtx, x: f64, y: f64) -> bool {
        self(viz, ctx, x, y)
    }
}

/// Ordered list of handlers, invoked first-registered first.
pub(crate) struct HandlerChain<H: ?Sized> {
    handlers: Mutex<Vec<Box<H>>>,
}

impl<H: ?Sized> HandlerChain<H> {
    pub(crate) fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, handler: Box<H>) {
        self.handlers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(handler);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Call `f` on each handler until one returns `true`.
    ///
    /// The list is taken out of the mutex for the duration of the dispatch so
    /// that handlers can register further handlers; those are appended after
    /// the existing ones and see the next event.
    pub(crate) fn dispatch(&self, mut f: impl FnMut(&mut H) -> bool) -> bool {
        let mut active =
            std::mem::take(&mut *self.handlers.lock().unwrap_or_else(|e| e.into_inner()));

        let consumed = active.iter_mut().any(|handler| f(handler));

        let mut handlers = self.handlers.lock().unwrap_or_else(|e| e.into_inner());
        let added = std::mem::take(&mut *handlers);
        active.extend(added);
        *handlers = active;
        consumed
    }
}
