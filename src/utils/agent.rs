// src/utils/agent.rs

//! Deterministic stand-in for the teaching assistant model. Produces canned
//! recommendations from aggregated statistics; no external calls.

use crate::models::insight::LessonFailureStat;

pub fn recommend_for_hardest(stat: Option<&LessonFailureStat>) -> String {
    match stat {
        None => "No failed quiz attempts yet. Keep monitoring learner results as enrollments grow."
            .to_string(),
        Some(stat) => format!(
            "Learners struggle most with \"{}\" ({} failed attempts, average score {:.1}%). \
             Consider adding a worked example before the quiz and revisiting the questions \
             most learners miss.",
            stat.lesson_title, stat.failed_count, stat.average_score
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_mentions_lesson() {
        let stat = LessonFailureStat {
            lesson_id: 3,
            lesson_title: "Ownership".into(),
            failed_count: 4,
            average_score: 42.5,
        };
        let text = recommend_for_hardest(Some(&stat));
        assert!(text.contains("\"Ownership\""));
        assert!(text.contains("4 failed attempts"));
        assert!(text.contains("42.5%"));
    }

    #[test]
    fn test_recommendation_without_failures() {
        assert!(recommend_for_hardest(None).starts_with("No failed quiz attempts"));
    }
}
