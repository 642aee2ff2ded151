//! Classification prompt assembly.

use agenda_core::oracle::OracleRequest;
use agenda_core::timefmt;
use chrono::Datelike;

/// Fixed instruction block: what to classify and the exact JSON shape to
/// answer with.
const INSTRUCTIONS: &str = r#"Você é o classificador de mensagens de um assistente de agenda.
Analise a mensagem do usuário e responda SOMENTE com um objeto JSON, sem texto extra:

{
  "intent": "create" | "update" | "delete" | "list" | "query" | "clarify",
  "confidence": 0.0-1.0,
  "referenced_task": {"id": "<id de uma tarefa existente>", "match_reason": "<por quê>"} | null,
  "changes": <slots> | null,
  "new_task_info": <slots> | null,
  "suggested_response": "<frase opcional>" | null
}

<slots> = {
  "title": "<título>" | null,
  "when": "YYYY-MM-DDTHH:MM:SS" | null,
  "has_time": true | false,
  "place": "<local>" | null,
  "participants": ["<nome>", ...]
}

Regras:
- "when" sempre no fuso de referência (UTC-3), resolvido a partir de "agora".
- Se o usuário deu uma data sem horário, preencha "when" com 09:00:00 e "has_time": false.
- Use "changes" para alterações de tarefa existente e "new_task_info" para tarefa nova.
- "referenced_task" apenas quando tiver certeza de qual tarefa da lista o usuário fala.
- Em dúvida, use "clarify" com confidence baixa. Nunca invente."#;

/// Build the system prompt: instructions, current time, the user's task
/// list, and (for multi-turn flows) the accumulated slot turns.
pub(crate) fn system_prompt(request: &OracleRequest<'_>) -> String {
    let mut prompt = String::from(INSTRUCTIONS);

    prompt.push_str(&format!(
        "\n\nAgora: {} ({})",
        request.now.format("%Y-%m-%dT%H:%M:%S"),
        timefmt::weekday_name(request.now.weekday())
    ));

    if request.tasks.is_empty() {
        prompt.push_str("\n\nTarefas do usuário: nenhuma.");
    } else {
        prompt.push_str("\n\nTarefas do usuário:");
        for task in request.tasks {
            prompt.push_str(&format!(
                "\n- id={} | {} | {} | {}",
                task.id,
                task.title,
                task.scheduled_date.format("%Y-%m-%dT%H:%M:%S"),
                task.status.as_str()
            ));
        }
    }

    if let Some(accumulated) = &request.accumulated {
        prompt.push_str(&format!(
            "\n\nTexto acumulado da tarefa em andamento (reextraia os slots a partir dele):\n{accumulated}"
        ));
    }

    prompt
}

/// Build the user content: recent history then the current message.
pub(crate) fn user_content(request: &OracleRequest<'_>, history_turns: usize) -> String {
    let mut content = String::new();

    if !request.history.is_empty() {
        let start = request.history.len().saturating_sub(history_turns);
        content.push_str("Histórico recente:\n");
        for turn in &request.history[start..] {
            content.push_str(turn);
            content.push('\n');
        }
        content.push('\n');
    }

    content.push_str(&format!("Mensagem: {}", request.message));
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_core::task::{Task, TaskStatus};
    use chrono::NaiveDate;

    fn request<'a>(history: &'a [String], tasks: &'a [Task]) -> OracleRequest<'a> {
        OracleRequest {
            message: "mude para as 16h",
            history,
            tasks,
            now: NaiveDate::from_ymd_opt(2026, 8, 21)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            accumulated: None,
        }
    }

    #[test]
    fn test_system_prompt_lists_tasks() {
        let tasks = vec![Task {
            id: "t1".to_string(),
            owner_id: "u".to_string(),
            title: "Dentista".to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 8, 25)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
            location: None,
            participants: vec![],
            status: TaskStatus::Pending,
            created_at: NaiveDate::from_ymd_opt(2026, 8, 20)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }];
        let prompt = system_prompt(&request(&[], &tasks));
        assert!(prompt.contains("id=t1"));
        assert!(prompt.contains("Dentista"));
        assert!(prompt.contains("2026-08-21T10:00:00"));
    }

    #[test]
    fn test_user_content_caps_history() {
        let history: Vec<String> = (0..15).map(|i| format!("turno {i}")).collect();
        let content = user_content(&request(&history, &[]), 10);
        assert!(!content.contains("turno 4"));
        assert!(content.contains("turno 5"));
        assert!(content.contains("turno 14"));
        assert!(content.ends_with("Mensagem: mude para as 16h"));
    }
}
