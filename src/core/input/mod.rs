pub mod actions;
pub mod bindings;
pub mod router;

use self::actions::{InputEvent, KeyAction, UIAction};
use self::bindings::KeyBindings;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{Key, NamedKey, PhysicalKey};

pub struct InputManager {
    pub bindings: KeyBindings,
}

impl InputManager {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn process_event(&self, event: &WindowEvent) -> Option<InputEvent> {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state,
                    physical_key: PhysicalKey::Code(keycode),
                    logical_key,
                    repeat: false,
                    ..
                },
            ..
        } = event
        {
            match (*state, self.bindings.resolve(*keycode)) {
                (ElementState::Pressed, KeyAction::Drum(key)) => Some(InputEvent::Press(key)),
                (ElementState::Released, KeyAction::Drum(key)) => Some(InputEvent::Release(key)),
                (ElementState::Pressed, KeyAction::UI(action)) => Some(InputEvent::UI(action)),

                // Enter/Escape keep working when unbound.
                (ElementState::Pressed, KeyAction::None) => match logical_key {
                    Key::Named(NamedKey::Enter) => Some(InputEvent::UI(UIAction::Confirm)),
                    Key::Named(NamedKey::Escape) => Some(InputEvent::UI(UIAction::Back)),
                    _ => None,
                },
                _ => None,
            }
        } else {
            None
        }
    }
}
