use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::Action;
use crate::plan::VisualDirection;

/// What a key press in the plan list asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum KeyAction {
    Focus(isize),
    Extend(isize),
    Toggle,
    SelectAll,
    Shift(VisualDirection),
    MoveToBase,
    SetAction(Action),
    ToggleOrder,
    BeginSearch,
    SearchNext,
    Start,
    Continue,
    Skip,
    Switch,
    Abort,
}

impl KeyAction {
    pub(super) fn is_mutation(self) -> bool {
        matches!(
            self,
            KeyAction::Shift(_) | KeyAction::MoveToBase | KeyAction::SetAction(_)
        )
    }
}

fn action_for(c: char) -> Option<Action> {
    Some(match c {
        'p' => Action::Pick,
        'r' => Action::Reword,
        'e' => Action::Edit,
        's' => Action::Squash,
        'f' => Action::Fixup,
        'd' => Action::Drop,
        _ => return None,
    })
}

pub(super) fn map_key(key: KeyEvent) -> Option<KeyAction> {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    let action = match key.code {
        KeyCode::Up if alt => KeyAction::Shift(VisualDirection::Up),
        KeyCode::Down if alt => KeyAction::Shift(VisualDirection::Down),
        KeyCode::Up if shift => KeyAction::Extend(-1),
        KeyCode::Down if shift => KeyAction::Extend(1),
        KeyCode::Up => KeyAction::Focus(-1),
        KeyCode::Down => KeyAction::Focus(1),
        KeyCode::Home => KeyAction::MoveToBase,
        KeyCode::Enter => KeyAction::Start,
        KeyCode::Esc => KeyAction::Abort,
        KeyCode::Char('a') if ctrl => KeyAction::SelectAll,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(' ') => KeyAction::Toggle,
        KeyCode::Char('k') => KeyAction::Focus(-1),
        KeyCode::Char('j') => KeyAction::Focus(1),
        KeyCode::Char('K') => KeyAction::Shift(VisualDirection::Up),
        KeyCode::Char('J') => KeyAction::Shift(VisualDirection::Down),
        KeyCode::Char('g') => KeyAction::MoveToBase,
        KeyCode::Char('o') => KeyAction::ToggleOrder,
        KeyCode::Char('/') => KeyAction::BeginSearch,
        KeyCode::Char('n') => KeyAction::SearchNext,
        KeyCode::Char('q') => KeyAction::Abort,
        KeyCode::Char('c') => KeyAction::Continue,
        KeyCode::Char('S') => KeyAction::Skip,
        KeyCode::Char('w') => KeyAction::Switch,
        KeyCode::Char(c) => KeyAction::SetAction(action_for(c)?),
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn arrows_focus_extend_and_shift() {
        assert_eq!(
            map_key(key(KeyCode::Up, KeyModifiers::NONE)),
            Some(KeyAction::Focus(-1))
        );
        assert_eq!(
            map_key(key(KeyCode::Down, KeyModifiers::SHIFT)),
            Some(KeyAction::Extend(1))
        );
        assert_eq!(
            map_key(key(KeyCode::Up, KeyModifiers::ALT)),
            Some(KeyAction::Shift(VisualDirection::Up))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('J'), KeyModifiers::SHIFT)),
            Some(KeyAction::Shift(VisualDirection::Down))
        );
    }

    #[test]
    fn letters_pick_actions_and_lifecycle() {
        assert_eq!(
            map_key(key(KeyCode::Char('f'), KeyModifiers::NONE)),
            Some(KeyAction::SetAction(Action::Fixup))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('s'), KeyModifiers::NONE)),
            Some(KeyAction::SetAction(Action::Squash))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('S'), KeyModifiers::SHIFT)),
            Some(KeyAction::Skip)
        );
        assert_eq!(
            map_key(key(KeyCode::Char('a'), KeyModifiers::CONTROL)),
            Some(KeyAction::SelectAll)
        );
        assert_eq!(map_key(key(KeyCode::Char('x'), KeyModifiers::NONE)), None);
        assert_eq!(map_key(key(KeyCode::Char('d'), KeyModifiers::CONTROL)), None);
    }
}
