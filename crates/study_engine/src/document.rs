use std::fmt::Write;

use study_core::{ConsensusSection, DisplayReport, RepresentativeItems, TypeSection};

/// Full Markdown export: frontmatter followed by [`report_body`].
pub fn build_report_document(
    report: &DisplayReport,
    session_id: &str,
    generated_utc: &str,
) -> String {
    let frontmatter = format!(
        "---\ntopic: {topic}\nsession_id: {session_id}\ngenerated_utc: {generated_utc}\ntype_count: {type_count}\n---\n\n",
        topic = single_line(&report.summary.topic),
        session_id = session_id,
        generated_utc = generated_utc,
        type_count = report.summary.type_count,
    );
    format!("{frontmatter}{body}", body = report_body(report))
}

/// Markdown rendering of a report, shared by the terminal view and the export.
pub fn report_body(report: &DisplayReport) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    let _ = writeln!(out, "# 분석 결과: {}\n", summary.topic);
    let _ = writeln!(out, "## 요약\n");
    let _ = writeln!(out, "- Q-Set 문항: {}", summary.item_count);
    let _ = writeln!(out, "- 페르소나: {}", summary.persona_count);
    let _ = writeln!(out, "- 추출 요인: {}", summary.factor_count);
    let _ = writeln!(out, "- 발견된 유형: {}", summary.type_count);
    let _ = writeln!(out, "- 총 설명 분산: {}\n", summary.total_variance_label);

    if !report.factor_rows.is_empty() {
        let _ = writeln!(out, "## 요인 분석 통계\n");
        let _ = writeln!(out, "| 요인 | 고유값 | 설명 분산 | 누적 분산 |");
        let _ = writeln!(out, "|---|---|---|---|");
        for row in &report.factor_rows {
            let _ = writeln!(
                out,
                "| 요인 {} | {:.2} | {:.1}% | {:.1}% |",
                row.index, row.eigenvalue, row.explained_pct, row.cumulative_pct
            );
        }
        out.push('\n');
    }

    if !report.personas.is_empty() {
        let _ = writeln!(out, "## 페르소나\n");
        for persona in &report.personas {
            let _ = writeln!(
                out,
                "- **{}** ({}, {}, {}): {}",
                persona.name, persona.age, persona.gender, persona.occupation, persona.brief
            );
        }
        out.push('\n');
    }

    if !report.items.is_empty() {
        let _ = writeln!(out, "## Q-Set 문항\n");
        for item in &report.items {
            let _ = writeln!(out, "{}. {}", item.number, item.text);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "## 합의 문항\n");
    match &report.consensus {
        ConsensusSection::Items(lines) => {
            for line in lines {
                let _ = writeln!(
                    out,
                    "- [{}] ({}) {}",
                    line.interpretation, line.score_label, line.text
                );
            }
        }
        ConsensusSection::None { message } => {
            let _ = writeln!(out, "{message}");
        }
    }
    out.push('\n');

    for section in &report.types {
        write_type_section(&mut out, section);
    }
    out
}

fn write_type_section(out: &mut String, section: &TypeSection) {
    let _ = writeln!(out, "## {}. {} ({})\n", section.number, section.name, section.badge);
    if !section.factor.is_empty() {
        let _ = writeln!(out, "- 요인: {}", section.factor);
    }
    if !section.description.is_empty() {
        let _ = writeln!(out, "- 설명: {}", section.description);
    }
    if !section.core_values.is_empty() {
        let _ = writeln!(out, "- 핵심 가치: {}", section.core_values.join(", "));
    }

    let detail = &section.detail;
    let _ = writeln!(out, "- 생존 본능: {}", detail.survival_instinct);
    let _ = writeln!(out, "- 방어 기제: {}", detail.defense_mechanism);
    let _ = writeln!(out, "- 숨겨진 두려움: {}", detail.hidden_fear);
    let _ = writeln!(out, "- 자기 정당화: {}", detail.self_justification);
    if let Some(phrases) = &detail.trigger_phrases {
        let _ = writeln!(out, "- 트리거 문구: {}", phrases.join(" / "));
    }
    if let Some(actions) = &detail.action_plan {
        let _ = writeln!(out, "- 실행 계획:");
        for action in actions {
            let _ = writeln!(out, "  - {action}");
        }
    }

    let _ = writeln!(out, "\n### 대표 문항\n");
    match &section.representative {
        RepresentativeItems::Items(lines) => {
            for line in lines {
                let _ = writeln!(out, "- ({}) {}", line.z_label, line.text);
            }
        }
        RepresentativeItems::Empty { message } => {
            let _ = writeln!(out, "{message}");
        }
    }
    out.push('\n');
}

fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use study_core::{render, ResultPayload};

    #[test]
    fn frontmatter_flattens_multiline_topic() {
        let payload = ResultPayload::from_value(json!({
            "topic_info": { "final_topic": "원격 근무\n인식" }
        }));
        let doc = build_report_document(&render(&payload), "abc123", "2026-01-01T00:00:00Z");
        assert!(doc.starts_with("---\ntopic: 원격 근무 인식\nsession_id: abc123\n"));
        assert!(doc.contains("type_count: 0\n---\n\n# 분석 결과"));
    }

    #[test]
    fn empty_report_still_lists_consensus_message() {
        let body = report_body(&render(&ResultPayload::default()));
        assert!(body.contains("합의 문항 없음"));
        assert!(!body.contains("## 요인 분석 통계"));
    }
}
