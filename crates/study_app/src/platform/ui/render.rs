use std::fmt::Write;

use study_core::{AppViewModel, Section, StepStatus};
use study_engine::report_body;

const RULE: &str = "────────────────────────────────────────";

/// Plain-text frame for the current section.
pub fn render(view: &AppViewModel) -> String {
    match view.section {
        Section::Input => render_input(view),
        Section::Progress => render_progress(view),
        Section::Result => render_result(view),
        Section::Error => render_error(view),
    }
}

/// Compact single-line status for redraws between polls.
pub fn status_line(view: &AppViewModel) -> String {
    format!(
        "[{}] {:>3}% {} {}",
        view.elapsed_label,
        view.progress,
        step_marker(view),
        view.current_step
    )
}

fn render_input(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Q방법론 연구 자동화");
    let _ = writeln!(out, "{RULE}");
    if !view.topic_input.is_empty() {
        let _ = writeln!(out, "연구 주제: {}", view.topic_input);
    }
    if let Some(message) = &view.validation_error {
        let _ = writeln!(out, "! {message}");
    }
    out
}

fn render_progress(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "분석 진행 중: {}", view.topic.as_deref().unwrap_or(""));
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{}", status_line(view));
    for step in &view.steps {
        let mark = match step.status {
            StepStatus::Done => "✓",
            StepStatus::Active => "▶",
            StepStatus::Pending => "·",
        };
        let _ = writeln!(out, " {mark} {}. {}", step.number, step.label);
    }
    if let Some(error) = &view.last_poll_error {
        let _ = writeln!(out, "(상태 조회 실패, 재시도 중: {error})");
    }
    if !view.logs.is_empty() {
        let _ = writeln!(out, "{RULE}");
        for line in &view.logs {
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

fn render_result(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "분석 완료 ({})", view.elapsed_label);
    let _ = writeln!(out, "{RULE}");
    if let Some(report) = &view.report {
        out.push_str(&report_body(report));
    }
    out
}

fn render_error(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "오류 발생");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{}", view.error_message.as_deref().unwrap_or(""));
    out
}

fn step_marker(view: &AppViewModel) -> String {
    if view.step_index == 0 {
        "준비 중".to_string()
    } else {
        format!("Step {}/{}", view.step_index, view.steps.len())
    }
}
