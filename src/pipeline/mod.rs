// Analysis pipeline — staged orchestration from raw posts to stored
// profiles.
//
// Per community the stages run in a fixed order: metrics batch, frozen
// community averages, per-post scores, sensitivity index, pattern
// summary, style fingerprint, assembled profile. Averages are computed
// once from the full batch before any post is scored, so every post in a
// run is judged against the same baseline regardless of ordering.
//
// A batch run never dies on one bad community: communities below the
// sensitivity minimum are skipped with a recorded reason and the run
// continues. Cancellation is cooperative and checked between posts.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::Result;
use tracing::{info, warn};

use crate::db::models::{CommunityProfile, RawPost};
use crate::db::traits::Database;
use crate::error::EngineError;
use crate::nlp::{NlpContext, PostMetrics, Tone};
use crate::patterns::RuleSet;
use crate::scoring::{
    calculate_isc, score_post, CommunityAverages, PostScore, ScoreRules, SensitivityInput,
};
use crate::style::{success_hook, StyleExtractor};

/// Tunables for a batch run, loaded from config by the CLI.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Most posts considered per community; extra input is ignored.
    pub batch_size: usize,
    /// How many representative opening hooks a profile keeps.
    pub top_hooks: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            batch_size: 500,
            top_hooks: 5,
        }
    }
}

/// Shared handle for observing and controlling a run. Cloned via Arc by
/// whoever drives the progress display.
#[derive(Debug, Default)]
pub struct RunHandle {
    cancelled: AtomicBool,
    processed: AtomicUsize,
    total: AtomicUsize,
}

impl RunHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next between-post check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// (processed, total) post counts. `processed` only ever increases
    /// within a run.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.processed.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }

    fn begin(&self, total: usize) {
        self.processed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    fn advance(&self, n: usize) {
        self.processed.fetch_add(n, Ordering::Relaxed);
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub posts_analyzed: usize,
    pub profiles_created: usize,
    /// (community_id, reason) for every community that produced no profile.
    pub errors: Vec<(String, String)>,
}

/// The compiled engine. Rule compilation happens once here; a compile
/// failure aborts before any post is touched.
pub struct Analyzer {
    patterns: RuleSet,
    scoring: ScoreRules,
    style: StyleExtractor,
}

impl Analyzer {
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            patterns: RuleSet::compile()?,
            scoring: ScoreRules::compile()?,
            style: StyleExtractor::compile()?,
        })
    }

    /// Analyze every community in `posts` and persist the results.
    pub async fn run(
        &self,
        db: &dyn Database,
        posts: Vec<RawPost>,
        options: &RunOptions,
        handle: &RunHandle,
    ) -> Result<AnalysisReport> {
        let mut by_community: BTreeMap<String, Vec<RawPost>> = BTreeMap::new();
        for post in posts {
            by_community
                .entry(post.community_id.clone())
                .or_default()
                .push(post);
        }
        for community_posts in by_community.values_mut() {
            community_posts.truncate(options.batch_size);
        }

        let total: usize = by_community.values().map(Vec::len).sum();
        handle.begin(total);
        info!(
            communities = by_community.len(),
            posts = total,
            "Starting analysis run"
        );

        let mut ctx = NlpContext::new();
        let mut report = AnalysisReport {
            posts_analyzed: 0,
            profiles_created: 0,
            errors: Vec::new(),
        };

        for (community_id, community_posts) in &by_community {
            let count = community_posts.len();
            match self.analyze_community(&mut ctx, community_id, community_posts, options, handle)
            {
                Ok(profile) => {
                    db.upsert_profile(&profile).await?;

                    let entries: Vec<_> = profile
                        .forbidden_patterns
                        .detected
                        .iter()
                        .map(|d| (d.category, d.description.clone()))
                        .collect();
                    db.replace_system_patterns(community_id, &entries).await?;

                    info!(
                        community = %community_id,
                        posts = count,
                        isc = profile.sensitivity.score,
                        tier = profile.sensitivity.tier.as_str(),
                        "Community profile stored"
                    );
                    report.posts_analyzed += count;
                    report.profiles_created += 1;
                }
                Err(e @ EngineError::InsufficientData { .. }) => {
                    warn!(community = %community_id, "Skipping community: {e}");
                    handle.advance(count);
                    report.errors.push((community_id.clone(), e.to_string()));
                }
                Err(e) => return Err(e.into()),
            }

            // NLP state is scoped per community batch
            ctx.reset();
        }

        info!(
            profiles = report.profiles_created,
            skipped = report.errors.len(),
            "Analysis run complete"
        );
        Ok(report)
    }

    /// Run the full staged analysis for one community.
    pub fn analyze_community(
        &self,
        ctx: &mut NlpContext,
        community_id: &str,
        posts: &[RawPost],
        options: &RunOptions,
        handle: &RunHandle,
    ) -> Result<CommunityProfile, EngineError> {
        if posts.len() < crate::error::MIN_POSTS_FOR_ISC {
            return Err(EngineError::insufficient_data(community_id, posts.len()));
        }

        let texts: Vec<String> = posts.iter().map(|p| p.text.clone()).collect();

        // Stage 1: per-post metrics
        let metrics = ctx.analyze_batch(&texts);

        // Stage 2: averages frozen from the full batch before any scoring
        let averages = CommunityAverages::from_metrics(&metrics);

        // Stage 3: per-post scores against the frozen averages
        let mut scores: Vec<PostScore> = Vec::with_capacity(posts.len());
        for (text, post_metrics) in texts.iter().zip(&metrics) {
            if handle.is_cancelled() {
                let (processed, total) = handle.progress();
                return Err(EngineError::Cancelled { processed, total });
            }
            scores.push(score_post(&self.scoring, text, post_metrics, &averages));
            handle.advance(1);
        }

        // Stage 4: sensitivity index
        let inputs: Vec<SensitivityInput> = scores
            .iter()
            .zip(posts)
            .map(|(score, post)| SensitivityInput {
                score,
                comment_count: post.comment_count,
            })
            .collect();
        let sensitivity = calculate_isc(community_id, &inputs)?;

        // Stage 5: forbidden patterns over the raw corpus
        let forbidden_patterns = self.patterns.extract(&texts);

        // Stage 6: style fingerprint, openings taken from the top quarter
        let ranked = rank_by_score(&scores);
        let cohort = (ranked.len() / 4).max(1);
        let top_texts: Vec<String> = ranked[..cohort]
            .iter()
            .map(|&i| texts[i].clone())
            .collect();
        let style = self.style.extract(&texts, &top_texts);

        let top_success_hooks = select_hooks(&ranked, &texts, options.top_hooks);

        let mut archetype_distribution: BTreeMap<String, usize> = BTreeMap::new();
        for post in posts {
            let label = post
                .archetype
                .clone()
                .unwrap_or_else(|| "Unclassified".to_string());
            *archetype_distribution.entry(label).or_insert(0) += 1;
        }

        Ok(CommunityProfile {
            community_id: community_id.to_string(),
            sensitivity,
            dominant_tone: dominant_tone(&metrics),
            formality_level: averages.formality,
            avg_sentence_length: averages.avg_sentence_length,
            top_success_hooks,
            forbidden_patterns,
            archetype_distribution,
            style,
            sample_size: posts.len(),
            analyzed_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

/// Indices of `scores`, best total first. Ties keep input order.
fn rank_by_score(scores: &[PostScore]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| {
        scores[b]
            .total_score
            .partial_cmp(&scores[a].total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices
}

/// Opening hooks of the `limit` highest-ranked posts. A top post whose
/// opening is too short to make a hook shrinks the result; it never pulls
/// a lower-ranked post into the slice.
fn select_hooks(ranked: &[usize], texts: &[String], limit: usize) -> Vec<String> {
    ranked
        .iter()
        .take(limit)
        .filter_map(|&i| success_hook(&texts[i]))
        .collect()
}

/// Most common tone across the batch; ties resolve to Neutral.
fn dominant_tone(metrics: &[PostMetrics]) -> Tone {
    let mut positive = 0usize;
    let mut negative = 0usize;
    let mut neutral = 0usize;
    for m in metrics {
        match m.tone {
            Tone::Positive => positive += 1,
            Tone::Negative => negative += 1,
            Tone::Neutral => neutral += 1,
        }
    }

    if positive > negative && positive > neutral {
        Tone::Positive
    } else if negative > positive && negative > neutral {
        Tone::Negative
    } else {
        Tone::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn post(community: &str, id: usize, text: &str, comments: u32) -> RawPost {
        RawPost {
            id: format!("{community}-{id}"),
            community_id: community.to_string(),
            title: String::new(),
            text: text.to_string(),
            upvotes: 10,
            comment_count: comments,
            archetype: Some(if id % 2 == 0 {
                "personal-journey".to_string()
            } else {
                "feedback-seeking".to_string()
            }),
            collected_at: None,
        }
    }

    fn corpus(community: &str, n: usize) -> Vec<RawPost> {
        (0..n)
            .map(|i| {
                let text = if i % 3 == 0 {
                    "I struggled with my side project for months. Has anyone felt this stuck? \
                     I finally learned what my journey was missing."
                } else {
                    "Check out my amazing tool! Leverage synergy and disrupt your workflow \
                     with this limited time offer at https://example.com?utm_source=forum today."
                };
                post(community, i, text, (i % 4) as u32)
            })
            .collect()
    }

    #[tokio::test]
    async fn run_stores_profiles_and_skips_small_communities() {
        let db = db::open_in_memory().unwrap();
        let analyzer = Analyzer::new().unwrap();
        let handle = RunHandle::new();

        let mut posts = corpus("rust", 12);
        posts.extend(corpus("tiny", 3));

        let report = analyzer
            .run(&db, posts, &RunOptions::default(), &handle)
            .await
            .unwrap();
        assert_eq!(report.profiles_created, 1);
        assert_eq!(report.posts_analyzed, 12);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, "tiny");

        let profile = db.get_profile("rust").await.unwrap().unwrap();
        assert_eq!(profile.sample_size, 12);
        assert!(profile.sensitivity.score >= 1.0 && profile.sensitivity.score <= 10.0);
        assert_eq!(
            profile.archetype_distribution.values().sum::<usize>(),
            12
        );
        assert!(db.get_profile("tiny").await.unwrap().is_none());

        // Progress covers every input post, including the skipped ones
        assert_eq!(handle.progress(), (15, 15));
    }

    #[tokio::test]
    async fn detected_patterns_land_in_the_blacklist() {
        let db = db::open_in_memory().unwrap();
        let analyzer = Analyzer::new().unwrap();
        let handle = RunHandle::new();

        analyzer
            .run(&db, corpus("rust", 12), &RunOptions::default(), &handle)
            .await
            .unwrap();

        let entries = db.list_patterns(Some("rust")).await.unwrap();
        assert!(!entries.is_empty());
        assert!(entries
            .iter()
            .all(|e| e.origin == crate::db::models::PatternOrigin::System));
    }

    #[tokio::test]
    async fn cancellation_stops_between_posts() {
        let db = db::open_in_memory().unwrap();
        let analyzer = Analyzer::new().unwrap();
        let handle = RunHandle::new();
        handle.cancel();

        let err = analyzer
            .run(&db, corpus("rust", 12), &RunOptions::default(), &handle)
            .await
            .unwrap_err();
        let engine_err = err.downcast::<EngineError>().unwrap();
        assert!(matches!(engine_err, EngineError::Cancelled { .. }));
    }

    #[test]
    fn reanalysis_is_deterministic_apart_from_timestamp() {
        let analyzer = Analyzer::new().unwrap();
        let handle = RunHandle::new();
        let posts = corpus("rust", 12);

        let options = RunOptions::default();
        let mut ctx = NlpContext::new();
        let a = analyzer
            .analyze_community(&mut ctx, "rust", &posts, &options, &handle)
            .unwrap();
        ctx.reset();
        let b = analyzer
            .analyze_community(&mut ctx, "rust", &posts, &options, &handle)
            .unwrap();

        assert_eq!(a.sensitivity.score, b.sensitivity.score);
        assert_eq!(a.top_success_hooks, b.top_success_hooks);
        assert_eq!(a.forbidden_patterns.detected.len(), b.forbidden_patterns.detected.len());
    }

    #[test]
    fn hook_selection_never_reaches_past_the_top_slice() {
        let texts = vec![
            // Top post opens too short to make a hook
            "Why me? I kept going anyway and it all worked out in the end.".to_string(),
            "Shipping the first beta taught me a lot. More below.".to_string(),
            "Nobody warned me about database migrations. They hurt.".to_string(),
        ];
        let ranked = vec![0, 1, 2];

        // The short-opening top post shrinks the result; the third-ranked
        // post must not be promoted into the top-2 slice.
        assert_eq!(
            select_hooks(&ranked, &texts, 2),
            vec!["Shipping the first beta taught me a lot".to_string()]
        );
    }

    #[test]
    fn dominant_tone_tie_is_neutral() {
        let metrics = vec![
            crate::nlp::extract_metrics("This is great, I love it! Amazing work."),
            crate::nlp::extract_metrics("This is terrible and broken. Awful experience."),
        ];
        assert_eq!(dominant_tone(&metrics), Tone::Neutral);
    }
}
