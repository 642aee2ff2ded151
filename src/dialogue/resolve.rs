//! Textual resolution of "which task did the user mean".
//!
//! Runs only when the oracle did not name a task id. Matches the folded
//! message against each upcoming task's title, then against its date and
//! time phrasing. The slice arrives nearest-first, so the first match is
//! the soonest task; only when nothing matches does the caller fall back
//! to a numbered list.

use agenda_core::task::Task;
use agenda_core::textnorm;
use agenda_core::timefmt;
use chrono::NaiveDateTime;

pub(super) fn by_text(text: &str, upcoming: &[Task], now: NaiveDateTime) -> Option<Task> {
    let folded = textnorm::fold(text);

    // Title mentions outrank date mentions: "cancela o dentista de sexta"
    // names the dentist even with two appointments on Friday.
    let by_title = upcoming.iter().find(|t| {
        let title = textnorm::fold(&t.title);
        !title.is_empty() && folded.contains(&title)
    });
    if let Some(task) = by_title {
        return Some(task.clone());
    }

    upcoming
        .iter()
        .find(|t| mentions_when(&folded, t, now))
        .cloned()
}

fn mentions_when(folded: &str, task: &Task, now: NaiveDateTime) -> bool {
    let when = task.scheduled_date;
    let phrases = [
        textnorm::fold(&timefmt::human_date(when.date(), now.date())),
        when.format("%d/%m").to_string(),
        textnorm::fold(&timefmt::human_time(when.time())),
        when.format("%H:%M").to_string(),
    ];
    phrases.iter().any(|p| folded.contains(p.as_str()))
}
