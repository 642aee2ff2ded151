//! Control keywords, matched before any oracle call.
//!
//! These are the user's escape hatch: they work identically in every
//! dialogue state, case- and accent-insensitively, and cost no oracle
//! round-trip. Only whole-message matches count — "cancela a reunião" is a
//! delete request, not a control keyword.

use agenda_core::textnorm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Control {
    /// Abandon the current flow.
    Cancel,
    /// Abandon and immediately start over.
    Restart,
    Help,
    /// List upcoming appointments.
    List,
}

// Folded forms.
const CANCEL: &[&str] = &["cancelar", "cancela", "sair", "parar", "deixa pra la", "esquece"];
const RESTART: &[&str] = &["recomecar", "reiniciar", "comecar de novo", "resetar"];
const HELP: &[&str] = &["ajuda", "help", "menu", "o que voce faz"];
const LIST: &[&str] = &["lista", "listar", "agenda", "compromissos", "meus compromissos"];

pub(super) fn parse(text: &str) -> Option<Control> {
    if textnorm::matches_any(text, CANCEL) {
        Some(Control::Cancel)
    } else if textnorm::matches_any(text, RESTART) {
        Some(Control::Restart)
    } else if textnorm::matches_any(text, HELP) {
        Some(Control::Help)
    } else if textnorm::matches_any(text, LIST) {
        Some(Control::List)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_accent_insensitive() {
        assert_eq!(parse("CANCELAR"), Some(Control::Cancel));
        assert_eq!(parse("Recomeçar"), Some(Control::Restart));
        assert_eq!(parse("  ajuda "), Some(Control::Help));
        assert_eq!(parse("Lista"), Some(Control::List));
    }

    #[test]
    fn test_only_whole_messages_match() {
        assert_eq!(parse("cancela a reunião de amanhã"), None);
        assert_eq!(parse("me ajuda a marcar um horário"), None);
    }

    #[test]
    fn test_ordinary_text_is_not_a_keyword() {
        assert_eq!(parse("reunião amanhã às 15h"), None);
    }
}
