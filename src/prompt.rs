//! Tutoring prompt templates
//!
//! One template per subject plus a generic one. The style directive is not
//! part of the instruction text; the reasoning client sends it separately.

use crate::subject::Subject;

/// Tutor framing for a subject, without the task text
#[must_use]
pub const fn template(subject: Subject) -> &'static str {
    match subject {
        Subject::Physics => {
            "Ты — опытный преподаватель физики. Помоги решить следующую задачу. \
             Объясни решение по шагам, используя понятные термины и законы физики."
        }
        Subject::Chemistry => {
            "Ты — опытный преподаватель химии. Помоги решить следующую задачу. \
             Объясни решение по шагам, используя понятные термины и химические уравнения."
        }
        Subject::Mathematics => {
            "Ты — опытный преподаватель математики. Помоги решить следующую задачу. \
             Объясни решение по шагам, используя понятные термины и математические теоремы."
        }
        Subject::General => {
            "Ты — опытный преподаватель. Помоги решить следующую задачу. \
             Объясни решение по шагам, используя понятные термины и знания."
        }
    }
}

/// Build the instruction sent to the reasoning service
///
/// The task text is appended verbatim after the template.
#[must_use]
pub fn build(subject: Subject, task: &str) -> String {
    format!("{} {task}", template(subject))
}
