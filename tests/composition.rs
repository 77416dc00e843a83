// Composition tests — verifying that the stages chain together correctly.
//
// These tests exercise the data flow between modules:
//   metrics -> frozen averages -> post scores -> sensitivity index -> gating
// and the full pipeline against a real (temporary) SQLite database.

use litmus::db::models::RawPost;
use litmus::db::traits::Database;
use litmus::gating::{validate_generation_request, AccountStatus, Archetype};
use litmus::nlp::NlpContext;
use litmus::pipeline::{Analyzer, RunHandle, RunOptions};
use litmus::scoring::{calculate_isc, score_post, CommunityAverages, ScoreRules, SensitivityInput};

fn vulnerable_text(i: usize) -> String {
    format!(
        "I spent {i} weeks stuck on my side project and honestly felt lost. \
         Has anyone else struggled like this? I finally learned what my \
         journey was missing and I want to share the story."
    )
}

fn promotional_text(i: usize) -> String {
    format!(
        "Leverage synergy and disrupt your workflow with this scalable \
         game-changer! Day {i} of the limited time offer at \
         https://example.com/tool?utm_source=forum today."
    )
}

fn posts(community: &str) -> Vec<RawPost> {
    (0..12)
        .map(|i| RawPost {
            id: format!("{community}-{i}"),
            community_id: community.to_string(),
            title: String::new(),
            text: if i < 6 {
                vulnerable_text(i)
            } else {
                promotional_text(i)
            },
            upvotes: 10,
            // The vulnerable half gets the discussion
            comment_count: if i < 6 { 8 } else { 0 },
            archetype: None,
            collected_at: None,
        })
        .collect()
}

// ============================================================
// Chain: metrics -> averages -> scores -> ISC -> gate
// ============================================================

#[test]
fn vulnerable_posts_outscore_promotional_ones() {
    let rules = ScoreRules::compile().unwrap();
    let texts: Vec<String> = (0..12)
        .map(|i| {
            if i < 6 {
                vulnerable_text(i)
            } else {
                promotional_text(i)
            }
        })
        .collect();

    let mut ctx = NlpContext::new();
    let metrics = ctx.analyze_batch(&texts);
    let averages = CommunityAverages::from_metrics(&metrics);

    let scores: Vec<f64> = texts
        .iter()
        .zip(&metrics)
        .map(|(t, m)| score_post(&rules, t, m, &averages).total_score)
        .collect();

    let vulnerable_mean: f64 = scores[..6].iter().sum::<f64>() / 6.0;
    let promotional_mean: f64 = scores[6..].iter().sum::<f64>() / 6.0;
    assert!(
        vulnerable_mean > promotional_mean,
        "vulnerable {vulnerable_mean} should beat promotional {promotional_mean}"
    );
}

#[test]
fn isc_flows_into_gating() {
    let rules = ScoreRules::compile().unwrap();
    let batch = posts("r-sideproject");
    let texts: Vec<String> = batch.iter().map(|p| p.text.clone()).collect();

    let mut ctx = NlpContext::new();
    let metrics = ctx.analyze_batch(&texts);
    let averages = CommunityAverages::from_metrics(&metrics);
    let scores: Vec<_> = texts
        .iter()
        .zip(&metrics)
        .map(|(t, m)| score_post(&rules, t, m, &averages))
        .collect();

    let inputs: Vec<SensitivityInput> = scores
        .iter()
        .zip(&batch)
        .map(|(score, post)| SensitivityInput {
            score,
            comment_count: post.comment_count,
        })
        .collect();
    let isc = calculate_isc("r-sideproject", &inputs).unwrap();
    assert!((1.0..=10.0).contains(&isc.score));

    // Whatever the score, the gate must produce a usable constraint set
    let constraint =
        validate_generation_request(isc.score, Archetype::Journey, AccountStatus::Established);
    assert!(!constraint.constraints.is_empty());
    if isc.score > 7.5 {
        assert_eq!(constraint.archetype, Archetype::Feedback);
        assert_eq!(constraint.max_links, Some(0));
    } else {
        assert_eq!(constraint.archetype, Archetype::Journey);
    }
}

#[test]
fn nine_posts_cannot_produce_an_index() {
    let rules = ScoreRules::compile().unwrap();
    let texts: Vec<String> = (0..9).map(vulnerable_text).collect();

    let mut ctx = NlpContext::new();
    let metrics = ctx.analyze_batch(&texts);
    let averages = CommunityAverages::from_metrics(&metrics);
    let scores: Vec<_> = texts
        .iter()
        .zip(&metrics)
        .map(|(t, m)| score_post(&rules, t, m, &averages))
        .collect();
    let inputs: Vec<SensitivityInput> = scores
        .iter()
        .map(|score| SensitivityInput {
            score,
            comment_count: 1,
        })
        .collect();

    assert!(calculate_isc("r-small", &inputs).is_err());
}

// ============================================================
// Full pipeline against a temporary SQLite database
// ============================================================

#[tokio::test]
async fn pipeline_round_trips_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("litmus.db");
    let db_path = db_path.to_str().unwrap();

    let analyzer = Analyzer::new().unwrap();
    let handle = RunHandle::new();

    {
        let db = litmus::db::open(db_path).unwrap();
        let report = analyzer
            .run(&db, posts("r-sideproject"), &RunOptions::default(), &handle)
            .await
            .unwrap();
        assert_eq!(report.profiles_created, 1);
        assert_eq!(report.posts_analyzed, 12);
    }

    // Reopen: the profile survives the connection
    let db = litmus::db::open(db_path).unwrap();
    let profile = db.get_profile("r-sideproject").await.unwrap().unwrap();
    assert_eq!(profile.community_id, "r-sideproject");
    assert_eq!(profile.sample_size, 12);
    assert!((1.0..=10.0).contains(&profile.sensitivity.score));
    assert!(!profile.forbidden_patterns.detected.is_empty());
    assert!(!profile.style.top_terms.is_empty());

    // The promotional half of the corpus left system blacklist entries
    let entries = db.list_patterns(Some("r-sideproject")).await.unwrap();
    assert!(!entries.is_empty());

    // Re-analysis overwrites the profile whole instead of appending
    analyzer
        .run(&db, posts("r-sideproject"), &RunOptions::default(), &handle)
        .await
        .unwrap();
    let profiles = db.list_profiles().await.unwrap();
    assert_eq!(profiles.len(), 1);
}

#[tokio::test]
async fn batch_size_caps_posts_per_community() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("litmus.db");
    let db = litmus::db::open(db_path.to_str().unwrap()).unwrap();

    let analyzer = Analyzer::new().unwrap();
    let handle = RunHandle::new();
    let options = RunOptions {
        batch_size: 10,
        top_hooks: 5,
    };

    let report = analyzer
        .run(&db, posts("r-sideproject"), &options, &handle)
        .await
        .unwrap();
    assert_eq!(report.posts_analyzed, 10);

    let profile = db.get_profile("r-sideproject").await.unwrap().unwrap();
    assert_eq!(profile.sample_size, 10);
}
