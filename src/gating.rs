// Generation gating — turns a community profile into hard constraints for
// the downstream generator.
//
// Decision tree, in priority order:
// 1. New accounts are restricted to the Feedback archetype with zero
//    links, independent of community sensitivity. Platform-level and
//    community-level risk are never compounded.
// 2. ISC above 7.5 forces Feedback with zero links regardless of what was
//    requested. The boundary is exclusive on the high side: exactly 7.5
//    is NOT gated.
// 3-5. Archetype sub-constraints are injected unconditionally once an
//    archetype is resolved; they are independent of ISC.
//
// This is a pure function: no storage access, no clock, no randomness.
// The constraint is computed per generation request and never persisted.

use serde::{Deserialize, Serialize};

/// Content archetype — the narrative shape of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Archetype {
    /// Technical-diary storytelling ("personal journey").
    Journey,
    /// Problem-first framing with a brief solution mention.
    ProblemSolution,
    /// Inquisitive, flaw-seeking request for community feedback. The
    /// lowest-risk archetype, used whenever gating forces a downgrade.
    Feedback,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Journey => "Journey",
            Archetype::ProblemSolution => "ProblemSolution",
            Archetype::Feedback => "Feedback",
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "journey" | "personal-journey" => Ok(Archetype::Journey),
            "problemsolution" | "problem-solution" => Ok(Archetype::ProblemSolution),
            "feedback" | "feedback-seeking" => Ok(Archetype::Feedback),
            other => Err(format!("unknown archetype: {other}")),
        }
    }
}

/// Account warm-up state, derived from account age by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    New,
    WarmingUp,
    Established,
}

impl std::str::FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(AccountStatus::New),
            "warmingup" | "warming-up" => Ok(AccountStatus::WarmingUp),
            "established" => Ok(AccountStatus::Established),
            other => Err(format!("unknown account status: {other}")),
        }
    }
}

/// The concrete constraint set handed to the external generator.
/// Ephemeral — recomputed per request, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConstraint {
    /// Whether the request was allowed as asked.
    pub allowed: bool,
    /// The archetype the generator must actually use.
    pub archetype: Archetype,
    /// Set when the requested archetype was overridden.
    pub forced_archetype: Option<Archetype>,
    /// Prompt-level instructions the generator must obey.
    pub constraints: Vec<String>,
    /// Why the request was downgraded, when it was.
    pub reason: Option<String>,
    /// Maximum permitted links: Some(0) when gated, None = community norms.
    pub max_links: Option<u32>,
}

/// ISC above this forces the Feedback archetype. Exclusive boundary:
/// a score of exactly `ISC_GATE` passes ungated.
pub const ISC_GATE: f64 = 7.5;

/// Validate a generation request against the gating decision tree.
pub fn validate_generation_request(
    isc_score: f64,
    requested: Archetype,
    account_status: AccountStatus,
) -> GenerationConstraint {
    // Branch 1: new accounts are in warm-up mode no matter the community.
    if account_status == AccountStatus::New {
        let forced = requested != Archetype::Feedback;
        return GenerationConstraint {
            allowed: !forced,
            archetype: Archetype::Feedback,
            forced_archetype: forced.then_some(Archetype::Feedback),
            constraints: vec![
                "Account is NEW - warm-up mode active".to_string(),
                "Maximum vulnerability required (use 'I', 'my', 'me' extensively)".to_string(),
                "ZERO links allowed - no URLs of any kind".to_string(),
                "No product pitch - focus entirely on asking for help".to_string(),
                "Maximum formality: 0.9 (very casual and personal)".to_string(),
                "Share struggles and uncertainties openly".to_string(),
            ],
            reason: forced
                .then(|| "New accounts must use Feedback archetype (warm-up mode)".to_string()),
            max_links: Some(0),
        };
    }

    // Branch 2: extreme community sensitivity. Strictly greater than the
    // gate — 7.5 itself stays on the permissive side.
    if isc_score > ISC_GATE {
        let forced = requested != Archetype::Feedback;
        return GenerationConstraint {
            allowed: !forced,
            archetype: Archetype::Feedback,
            forced_archetype: forced.then_some(Archetype::Feedback),
            constraints: vec![
                format!("Community has VERY HIGH sensitivity (ISC {isc_score:.1}/10)"),
                "Maximum vulnerability required (emotions, personal pronouns, questions)"
                    .to_string(),
                "ZERO links allowed - no URLs of any kind".to_string(),
                "Minimize all promotional language".to_string(),
                "Focus on authenticity over polish".to_string(),
                "Show genuine uncertainty and ask for community guidance".to_string(),
            ],
            reason: forced.then(|| {
                format!(
                    "ISC {isc_score:.1} > {ISC_GATE}: only Feedback archetype allowed \
                     for high-sensitivity communities"
                )
            }),
            max_links: Some(0),
        };
    }

    // Branches 3-5: archetype sub-constraints, always applied once the
    // archetype is resolved.
    let mut constraints = archetype_constraints(requested);

    if isc_score > 5.0 {
        constraints.push(format!(
            "Community has elevated sensitivity (ISC {isc_score:.1}/10) - increase authenticity"
        ));
    }
    if isc_score <= 3.0 {
        constraints.push(format!(
            "Community has low sensitivity (ISC {isc_score:.1}/10) - standard promotional \
             language acceptable"
        ));
    }

    GenerationConstraint {
        allowed: true,
        archetype: requested,
        forced_archetype: None,
        constraints,
        reason: None,
        max_links: None,
    }
}

fn archetype_constraints(archetype: Archetype) -> Vec<String> {
    let lines: &[&str] = match archetype {
        Archetype::ProblemSolution => &[
            "ProblemSolution archetype: 90% pain / 10% solution ratio",
            "NO greetings (avoid 'Hi everyone', 'Hey folks', etc.)",
            "Product mention ONLY in final 10% of post",
            "Focus first 2-3 paragraphs entirely on the problem",
            "Explain why existing solutions fail",
            "Keep solution description brief and matter-of-fact",
            "Avoid marketing language entirely in problem section",
        ],
        Archetype::Journey => &[
            "Journey archetype: technical diary style",
            "Include specific milestones with dates or timeframes",
            "Use concrete numbers and metrics (users, iterations, hours spent)",
            "Show the discovery process, not just the outcome",
            "Mention setbacks and failed attempts",
            "Product mention should emerge naturally from the story",
            "Write in past tense for completed milestones, present for current status",
        ],
        Archetype::Feedback => &[
            "Feedback archetype: invert the authority pattern",
            "Ask the community to find flaws and problems",
            "Show controlled imperfection (mention what you're unsure about)",
            "Frame yourself as student, community as teacher",
            "Ask specific questions about concerns or decisions",
            "Acknowledge limitations of your approach",
            "Invite critique, not just praise",
        ],
    };
    lines.iter().map(|s| s.to_string()).collect()
}
