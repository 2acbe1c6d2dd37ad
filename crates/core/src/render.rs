//! Render a selected exam into one text per output channel.

use std::collections::HashMap;
use std::sync::Arc;

use rand::RngCore;
use tracing::{debug, info, warn};

use crate::exam::ExamSpec;
use crate::question::Question;
use crate::templates::{Engine, MacroError, RenderState};

/// Header, every question and footer, expanded per channel.
///
/// Headers and footers see the exam metadata with `COUNTER` 0. Questions
/// see their own fields; the counter starts at 1 and only advances past
/// non-scaffold questions. Every channel text ends with a newline.
pub fn render_exam(
    exam: &ExamSpec,
    questions: &[Arc<Question>],
    rng: &mut dyn RngCore,
) -> Result<Vec<String>, MacroError> {
    let engine = Engine::new(exam.macros.clone());
    let mut outputs = vec![String::new(); exam.channels.len()];
    let exam_state = RenderState::with_metadata(exam.metadata.clone());

    let header = engine.render(0, &exam_state, &exam.channels, &exam.headers, rng)?;
    append(&mut outputs, header);

    let mut counter = 1;
    for question in questions {
        let texts: Vec<String> = exam
            .channels
            .iter()
            .map(|id| {
                question.channel(id).map_or_else(
                    || {
                        let available: Vec<&str> = question.channel_names().collect();
                        warn!(title = %question.title, channel = %id, ?available, "question has no text for channel");
                        missing_channel(id, &question.title)
                    },
                    ToOwned::to_owned,
                )
            })
            .collect();

        let metadata: HashMap<String, String> =
            question.fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let state = RenderState::with_metadata(metadata);
        debug!(counter, title = %question.title, "rendering question");
        let rendered = engine.render(counter, &state, &exam.channels, &texts, rng)?;
        append(&mut outputs, rendered);

        if !question.scaffold {
            counter += 1;
        }
    }

    let footer = engine.render(0, &exam_state, &exam.channels, &exam.footers, rng)?;
    append(&mut outputs, footer);

    for output in &mut outputs {
        output.push('\n');
    }
    info!(questions = questions.len(), channels = outputs.len(), "exam rendered");
    Ok(outputs)
}

fn append(outputs: &mut [String], parts: Vec<String>) {
    for (out, part) in outputs.iter_mut().zip(parts) {
        out.push_str(&part);
    }
}

/// Placeholder for a question without text in a channel.
fn missing_channel(id: &str, title: &str) -> String {
    format!("\n((COUNTER)): No {id} - DEBUG. Question: {title}\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::MacroTable;
    use crate::question::QuestionBuilder;
    use crate::quota::QuotaSpec;
    use rand::rngs::mock::StepRng;
    use std::path::PathBuf;

    fn exam() -> ExamSpec {
        let mut metadata = HashMap::new();
        metadata.insert("course".to_string(), "Maths".to_string());
        ExamSpec {
            index: PathBuf::from("exam.yaml"),
            difficulty: 2.0,
            tolerance: None,
            tries: None,
            seed: None,
            bank: None,
            files: vec!["description.md".into(), "notes.md".into()],
            channels: vec!["description".into(), "notes".into()],
            headers: vec!["# ((course))\n".into(), String::new()],
            footers: vec!["end".into(), "((COUNTER))".into()],
            macros: MacroTable::new(),
            metadata,
            parts: QuotaSpec::TagText("all".into()),
        }
    }

    #[test]
    fn counter_skips_scaffolds_and_missing_channels_show_placeholder() {
        let questions = vec![
            Arc::new(
                QuestionBuilder::new("intro")
                    .scaffold(true)
                    .channel("description", "Read ((COUNTER)).\n")
                    .channel("notes", "")
                    .build(),
            ),
            Arc::new(
                QuestionBuilder::new("q1")
                    .channel("description", "((COUNTER)). ((title))\n")
                    .channel("notes", "((COUNTER)): ok\n")
                    .build(),
            ),
            Arc::new(
                QuestionBuilder::new("q2").channel("description", "((COUNTER)). ((title))\n").build(),
            ),
        ];

        let out = render_exam(&exam(), &questions, &mut StepRng::new(0, 0)).unwrap();
        assert_eq!(out[0], "# Maths\nRead 1.\n1. q1\n2. q2\nend\n");
        assert_eq!(out[1], "1: ok\n\n2: No notes - DEBUG. Question: q2\n\n0\n");
    }
}
