//! Result payload → display report.
//!
//! `render` never fails: every missing or malformed field degrades to one of
//! the fallback literals below.

use serde_json::Value;

use crate::payload::{
    ConsensusEntry, FactorStats, ItemEntry, PersonaEntry, ResultPayload, TypeEntry,
};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_INFORMATION: &str = "정보 없음";
pub const NO_ITEMS: &str = "문항 정보 없음";
pub const NO_CONSENSUS: &str = "합의 문항 없음 — 유형 간 차별화가 뚜렷합니다";
pub const BADGE_POSITIVE: &str = "Type A (긍정)";
pub const BADGE_MIRROR: &str = "Type B (Mirror)";
pub const BRIEF_LIMIT: usize = 80;

const ELLIPSIS: &str = "...";
const KAISER_THRESHOLD: f64 = 1.0;
const CONSENSUS_LEAN: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayReport {
    pub summary: SummaryBlock,
    pub factor_rows: Vec<FactorRow>,
    pub personas: Vec<PersonaCard>,
    pub items: Vec<ItemLine>,
    pub consensus: ConsensusSection,
    pub types: Vec<TypeSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryBlock {
    pub topic: String,
    pub item_count: usize,
    pub persona_count: usize,
    pub factor_count: usize,
    pub type_count: usize,
    pub total_variance_pct: f64,
    /// One decimal place with a percent sign, e.g. "61.0%".
    pub total_variance_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactorRow {
    /// 1-based position in the eigenvalue list.
    pub index: usize,
    pub eigenvalue: f64,
    pub explained_pct: f64,
    pub cumulative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonaCard {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub occupation: String,
    pub brief: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLine {
    pub number: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsensusSection {
    Items(Vec<ConsensusLine>),
    /// No consensus statement: the types are well differentiated.
    None { message: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusLine {
    pub interpretation: String,
    pub score_label: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSection {
    /// 1-based.
    pub number: usize,
    pub name: String,
    pub factor: String,
    pub badge: &'static str,
    pub description: String,
    pub core_values: Vec<String>,
    pub detail: TypeDetail,
    pub representative: RepresentativeItems,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDetail {
    pub survival_instinct: String,
    pub defense_mechanism: String,
    pub hidden_fear: String,
    pub self_justification: String,
    /// Present only when the payload lists at least one phrase.
    pub trigger_phrases: Option<Vec<String>>,
    /// Present only when the payload lists at least one action.
    pub action_plan: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepresentativeItems {
    Items(Vec<RepresentativeLine>),
    Empty { message: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepresentativeLine {
    pub text: String,
    /// Signed, two decimals ("+1.50"), or "N/A".
    pub z_label: String,
}

/// Build the display report for a completed job.
pub fn render(result: &ResultPayload) -> DisplayReport {
    let stats = result.factor_stats.as_ref();
    let types: Vec<TypeSection> = result
        .types
        .as_deref()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, entry)| type_section(i + 1, entry))
        .collect();

    DisplayReport {
        summary: summary_block(result, types.len()),
        factor_rows: stats.map(factor_rows).unwrap_or_default(),
        personas: result
            .personas
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(persona_card)
            .collect(),
        items: result
            .q_set
            .as_deref()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, entry)| item_line(i, entry))
            .collect(),
        consensus: consensus_section(result.consensus_items.as_deref().unwrap_or_default()),
        types,
    }
}

fn summary_block(result: &ResultPayload, type_count: usize) -> SummaryBlock {
    let topic = result
        .topic_info
        .as_ref()
        .and_then(|info| non_empty(&info.final_topic).or_else(|| non_empty(&info.topic)))
        .unwrap_or(NOT_AVAILABLE)
        .to_string();

    let stats = result.factor_stats.as_ref();
    let factor_count = stats
        .and_then(|s| {
            s.n_factors
                .or_else(|| s.eigenvalues.as_ref().map(Vec::len))
        })
        .unwrap_or(0);
    let total_variance_pct = stats
        .and_then(|s| s.total_variance)
        .filter(|v| v.is_finite())
        .map(|v| v * 100.0)
        .unwrap_or(0.0);

    SummaryBlock {
        topic,
        item_count: result.q_set.as_ref().map_or(0, Vec::len),
        persona_count: result.personas.as_ref().map_or(0, Vec::len),
        factor_count,
        type_count,
        total_variance_pct,
        total_variance_label: format!("{total_variance_pct:.1}%"),
    }
}

/// Kaiser criterion: keep factors whose eigenvalue is at least 1.0.
fn factor_rows(stats: &FactorStats) -> Vec<FactorRow> {
    let explained = stats.explained_variance.as_deref().unwrap_or_default();
    let cumulative = stats.cumulative_variance.as_deref().unwrap_or_default();
    stats
        .eigenvalues
        .as_deref()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(i, ev)| ev.map(|ev| (i, ev)))
        .filter(|(_, ev)| *ev >= KAISER_THRESHOLD)
        .map(|(i, ev)| FactorRow {
            index: i + 1,
            eigenvalue: ev,
            explained_pct: slot(explained, i) * 100.0,
            cumulative_pct: slot(cumulative, i) * 100.0,
        })
        .collect()
}

fn slot(values: &[Option<f64>], index: usize) -> f64 {
    values.get(index).copied().flatten().unwrap_or(0.0)
}

fn persona_card(entry: &PersonaEntry) -> PersonaCard {
    match entry {
        PersonaEntry::Name(name) => PersonaCard {
            name: name.clone(),
            ..PersonaCard::default()
        },
        PersonaEntry::Profile(profile) => PersonaCard {
            name: profile.name.clone().unwrap_or_default(),
            age: profile.age.as_ref().map(scalar_text).unwrap_or_default(),
            gender: profile.gender.clone().unwrap_or_default(),
            occupation: profile.occupation.clone().unwrap_or_default(),
            brief: truncate_brief(
                profile
                    .brief
                    .as_deref()
                    .or(profile.brief_description.as_deref())
                    .unwrap_or_default(),
            ),
        },
        PersonaEntry::Other(_) => PersonaCard::default(),
    }
}

/// Keep the first `BRIEF_LIMIT` characters, marking the cut with an ellipsis.
fn truncate_brief(brief: &str) -> String {
    if brief.chars().count() <= BRIEF_LIMIT {
        return brief.to_string();
    }
    let mut cut: String = brief.chars().take(BRIEF_LIMIT).collect();
    cut.push_str(ELLIPSIS);
    cut
}

fn item_line(position: usize, entry: &ItemEntry) -> ItemLine {
    let fallback_number = position as u64 + 1;
    match entry {
        ItemEntry::Text(text) => ItemLine {
            number: fallback_number,
            text: text.clone(),
        },
        ItemEntry::Structured(item) => ItemLine {
            number: item.id.unwrap_or(fallback_number),
            text: item.text.clone().unwrap_or_default(),
        },
        ItemEntry::Other(value) => ItemLine {
            number: fallback_number,
            text: scalar_text(value),
        },
    }
}

fn consensus_section(entries: &[ConsensusEntry]) -> ConsensusSection {
    if entries.is_empty() {
        return ConsensusSection::None {
            message: NO_CONSENSUS,
        };
    }
    ConsensusSection::Items(entries.iter().map(consensus_line).collect())
}

fn consensus_line(entry: &ConsensusEntry) -> ConsensusLine {
    let score = entry.avg_z_score.filter(|v| v.is_finite());
    let interpretation = match non_empty(&entry.interpretation) {
        Some(label) => label.to_string(),
        None => interpret_consensus(score.unwrap_or(0.0)).to_string(),
    };
    ConsensusLine {
        interpretation,
        score_label: score.map_or_else(|| NOT_AVAILABLE.to_string(), signed_two_decimals),
        text: non_empty(&entry.statement)
            .or_else(|| non_empty(&entry.text))
            .unwrap_or_default()
            .to_string(),
    }
}

fn interpret_consensus(score: f64) -> &'static str {
    if score >= CONSENSUS_LEAN {
        "공통 동의"
    } else if score <= -CONSENSUS_LEAN {
        "공통 반대"
    } else {
        "공통 중립"
    }
}

fn type_section(number: usize, entry: &TypeEntry) -> TypeSection {
    let badge = if entry.polarity() == Some("positive") {
        BADGE_POSITIVE
    } else {
        BADGE_MIRROR
    };

    TypeSection {
        number,
        name: non_empty(&entry.type_name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("유형 {number}")),
        factor: entry.factor.clone().unwrap_or_default(),
        badge,
        description: entry.short_description.clone().unwrap_or_default(),
        core_values: entry.core_values.clone().unwrap_or_default(),
        detail: TypeDetail {
            survival_instinct: narrative(&entry.survival_instinct),
            defense_mechanism: narrative(&entry.defense_mechanism),
            hidden_fear: narrative(&entry.hidden_fear),
            self_justification: narrative(&entry.self_justification),
            trigger_phrases: entry.trigger_phrases.clone().filter(|p| !p.is_empty()),
            action_plan: entry.action_plan.clone().filter(|p| !p.is_empty()),
        },
        representative: representative_items(entry),
    }
}

fn narrative(field: &Option<String>) -> String {
    non_empty(field).unwrap_or(NO_INFORMATION).to_string()
}

fn representative_items(entry: &TypeEntry) -> RepresentativeItems {
    let lines: Vec<RepresentativeLine> = match (&entry.key_statements, &entry.defining_statements) {
        (Some(key), _) if !key.is_empty() => key
            .iter()
            .map(|s| RepresentativeLine {
                text: non_empty(&s.statement)
                    .or_else(|| non_empty(&s.text))
                    .unwrap_or_default()
                    .to_string(),
                z_label: z_label(s.z_score.as_ref()),
            })
            .collect(),
        (_, Some(statements)) => {
            let scores = entry.defining_scores.as_deref().unwrap_or_default();
            statements
                .iter()
                .enumerate()
                .filter_map(|(i, text)| {
                    text.as_ref().map(|text| RepresentativeLine {
                        text: text.clone(),
                        z_label: z_label(scores.get(i)),
                    })
                })
                .collect()
        }
        _ => Vec::new(),
    };

    if lines.is_empty() {
        RepresentativeItems::Empty { message: NO_ITEMS }
    } else {
        RepresentativeItems::Items(lines)
    }
}

fn z_label(score: Option<&Value>) -> String {
    score
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .map_or_else(|| NOT_AVAILABLE.to_string(), signed_two_decimals)
}

/// Explicit sign for non-negative values; -0.0 renders as "+0.00".
fn signed_two_decimals(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}", value.abs())
    } else {
        format!("{value:.2}")
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
