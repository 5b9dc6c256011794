use pretty_assertions::assert_eq;
use serde_json::json;
use study_core::{
    render, ConsensusSection, RepresentativeItems, RepresentativeLine, ResultPayload,
    BADGE_MIRROR, BADGE_POSITIVE, NO_CONSENSUS, NO_INFORMATION, NO_ITEMS,
};

fn payload(value: serde_json::Value) -> ResultPayload {
    ResultPayload::from_value(value)
}

#[test]
fn empty_payload_degrades_to_fallbacks() {
    let report = render(&ResultPayload::default());

    assert_eq!(report.summary.topic, "N/A");
    assert_eq!(report.summary.item_count, 0);
    assert_eq!(report.summary.persona_count, 0);
    assert_eq!(report.summary.factor_count, 0);
    assert_eq!(report.summary.type_count, 0);
    assert_eq!(report.summary.total_variance_label, "0.0%");
    assert!(report.factor_rows.is_empty());
    assert!(report.personas.is_empty());
    assert!(report.items.is_empty());
    assert!(report.types.is_empty());
    assert_eq!(
        report.consensus,
        ConsensusSection::None {
            message: NO_CONSENSUS
        }
    );
}

#[test]
fn finalized_topic_wins_over_submitted_topic() {
    let both = payload(json!({ "topic_info": { "final_topic": "정제된 주제", "topic": "raw" } }));
    assert_eq!(render(&both).summary.topic, "정제된 주제");

    let raw_only = payload(json!({ "topic_info": { "topic": "raw" } }));
    assert_eq!(render(&raw_only).summary.topic, "raw");

    let blank = payload(json!({ "topic_info": { "final_topic": "" } }));
    assert_eq!(render(&blank).summary.topic, "N/A");
}

#[test]
fn kaiser_filter_keeps_eigenvalues_at_or_above_one() {
    let report = render(&payload(json!({
        "factor_stats": {
            "n_factors": 2,
            "eigenvalues": [2.1, 1.3, 0.9, 0.4],
            "explained_variance": [0.35, 0.2, 0.1, 0.05],
            "cumulative_variance": [0.35],
            "total_variance": 0.55
        }
    })));

    let indices: Vec<_> = report.factor_rows.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 2]);
    assert_eq!(report.factor_rows[0].eigenvalue, 2.1);
    assert!((report.factor_rows[0].explained_pct - 35.0).abs() < 1e-9);
    assert!((report.factor_rows[0].cumulative_pct - 35.0).abs() < 1e-9);
    // Cumulative variance missing for factor 2.
    assert_eq!(report.factor_rows[1].cumulative_pct, 0.0);
    assert_eq!(report.summary.factor_count, 2);
    assert_eq!(report.summary.total_variance_label, "55.0%");
}

#[test]
fn eigenvalue_of_exactly_one_is_kept() {
    let report = render(&payload(json!({ "factor_stats": { "eigenvalues": [1.0, 0.999] } })));
    assert_eq!(report.factor_rows.len(), 1);
    assert_eq!(report.summary.factor_count, 2);
}

#[test]
fn null_eigenvalue_drops_only_its_own_row() {
    let report = render(&payload(json!({
        "factor_stats": {
            "eigenvalues": [2.1, null, 1.3],
            "explained_variance": [0.3, 0.2, null],
            "cumulative_variance": [0.3, 0.5, 0.6]
        },
        "types": [{ "core_values": ["a", null] }]
    })));

    let indices: Vec<_> = report.factor_rows.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 3]);
    assert_eq!(report.factor_rows[1].eigenvalue, 1.3);
    assert_eq!(report.factor_rows[1].explained_pct, 0.0);
    assert!((report.factor_rows[1].cumulative_pct - 60.0).abs() < 1e-9);
    assert_eq!(report.summary.factor_count, 3);
    assert_eq!(report.types[0].core_values, vec!["a".to_string()]);
}

#[test]
fn persona_briefs_are_truncated_at_eighty_characters() {
    let long = "x".repeat(95);
    let exact = "y".repeat(80);
    let report = render(&payload(json!({
        "personas": [
            { "name": "김민수", "age": 34, "gender": "남성", "occupation": "개발자", "brief": long },
            { "name": "이지은", "brief_description": exact },
            "박서준"
        ]
    })));

    let first = &report.personas[0];
    assert_eq!(first.brief, format!("{}...", "x".repeat(80)));
    assert_eq!(first.age, "34");
    assert_eq!(first.occupation, "개발자");

    let second = &report.personas[1];
    assert_eq!(second.brief, exact);
    assert_eq!(second.age, "");
    assert_eq!(second.gender, "");

    let third = &report.personas[2];
    assert_eq!(third.name, "박서준");
    assert_eq!(third.brief, "");
    assert_eq!(report.summary.persona_count, 3);
}

#[test]
fn items_accept_text_and_structured_entries() {
    let report = render(&payload(json!({
        "q_set": ["첫 문항", { "id": 7, "text": "구조화 문항" }, { "id": 8 }]
    })));

    let lines: Vec<_> = report
        .items
        .iter()
        .map(|i| (i.number, i.text.as_str()))
        .collect();
    assert_eq!(lines, vec![(1, "첫 문항"), (7, "구조화 문항"), (8, "")]);
}

#[test]
fn consensus_items_carry_signed_scores() {
    let report = render(&payload(json!({
        "consensus_items": [
            { "statement": "모두 동의", "avg_z_score": 0.8 },
            { "text": "모두 반대", "avg_z_score": -1.234, "interpretation": "강한 반대" },
            { "statement": "중립", "avg_z_score": 0.0 }
        ]
    })));

    let ConsensusSection::Items(lines) = report.consensus else {
        panic!("expected consensus items");
    };
    assert_eq!(lines[0].score_label, "+0.80");
    assert_eq!(lines[0].interpretation, "공통 동의");
    assert_eq!(lines[1].score_label, "-1.23");
    assert_eq!(lines[1].interpretation, "강한 반대");
    assert_eq!(lines[1].text, "모두 반대");
    assert_eq!(lines[2].score_label, "+0.00");
    assert_eq!(lines[2].interpretation, "공통 중립");
}

#[test]
fn empty_consensus_list_is_the_well_differentiated_state() {
    let report = render(&payload(json!({ "consensus_items": [] })));
    assert_eq!(
        report.consensus,
        ConsensusSection::None {
            message: NO_CONSENSUS
        }
    );
}

#[test]
fn type_without_optional_fields_keeps_narrative_fallbacks() {
    let report = render(&payload(json!({
        "types": [{
            "type_name": "신중한 관찰자",
            "polarity": "negative",
            "short_description": "변화를 경계한다",
            "core_values": ["안정", "신뢰"],
            "hidden_fear": "통제력 상실"
        }]
    })));

    let section = &report.types[0];
    assert_eq!(section.number, 1);
    assert_eq!(section.badge, BADGE_MIRROR);
    assert_eq!(section.core_values, vec!["안정", "신뢰"]);
    assert_eq!(section.detail.survival_instinct, NO_INFORMATION);
    assert_eq!(section.detail.defense_mechanism, NO_INFORMATION);
    assert_eq!(section.detail.hidden_fear, "통제력 상실");
    assert_eq!(section.detail.self_justification, NO_INFORMATION);
    assert_eq!(section.detail.trigger_phrases, None);
    assert_eq!(section.detail.action_plan, None);
    assert_eq!(section.representative, RepresentativeItems::Empty { message: NO_ITEMS });
}

#[test]
fn type_badges_follow_polarity_or_bias() {
    let report = render(&payload(json!({
        "types": [
            { "polarity": "positive" },
            { "bias": "positive" },
            { "bias": "negative" },
            {}
        ]
    })));

    let badges: Vec<_> = report.types.iter().map(|t| t.badge).collect();
    assert_eq!(badges, vec![BADGE_POSITIVE, BADGE_POSITIVE, BADGE_MIRROR, BADGE_MIRROR]);
    assert_eq!(report.types[3].name, "유형 4");
}

#[test]
fn optional_lists_appear_only_when_present() {
    let report = render(&payload(json!({
        "types": [{
            "trigger_phrases": ["그건 비효율적이야"],
            "action_plan": []
        }]
    })));

    let detail = &report.types[0].detail;
    assert_eq!(detail.trigger_phrases, Some(vec!["그건 비효율적이야".to_string()]));
    assert_eq!(detail.action_plan, None);
}

#[test]
fn representative_items_pair_text_with_z_scores() {
    let report = render(&payload(json!({
        "types": [
            {
                "key_statements": [
                    { "statement": "재택이 효율적이다", "z_score": 1.5 },
                    { "statement": "출근이 필요하다", "z_score": -0.8 },
                    { "statement": "점수 없음", "z_score": "high" }
                ]
            },
            {
                "defining_statements": ["정의 문항 1", "정의 문항 2"],
                "defining_scores": [2.346]
            }
        ]
    })));

    assert_eq!(
        report.types[0].representative,
        RepresentativeItems::Items(vec![
            RepresentativeLine {
                text: "재택이 효율적이다".into(),
                z_label: "+1.50".into()
            },
            RepresentativeLine {
                text: "출근이 필요하다".into(),
                z_label: "-0.80".into()
            },
            RepresentativeLine {
                text: "점수 없음".into(),
                z_label: "N/A".into()
            },
        ])
    );
    assert_eq!(
        report.types[1].representative,
        RepresentativeItems::Items(vec![
            RepresentativeLine {
                text: "정의 문항 1".into(),
                z_label: "+2.35".into()
            },
            RepresentativeLine {
                text: "정의 문항 2".into(),
                z_label: "N/A".into()
            },
        ])
    );
}

#[test]
fn render_is_deterministic() {
    let source = payload(json!({
        "topic_info": { "final_topic": "t" },
        "q_set": ["a"],
        "types": [{ "type_name": "x", "polarity": "positive" }]
    }));
    assert_eq!(render(&source), render(&source));
}
