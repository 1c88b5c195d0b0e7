//! Seeded synthetic engagement in the collector's file shapes.
//!
//! Produces five posts, one story, three reels and a presence sample for a
//! set of follower usernames. The same usernames, seed and clock always give
//! the same files.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use crate::types::{
    Comment, CommentSummary, ContentEngagement, EngagementFiles, LikeSummary, OnlineActivity,
    StoryEngagement,
};

const SIMULATED_POSTS: usize = 5;
const SIMULATED_REELS: usize = 3;
const ONLINE_SAMPLE: usize = 50;
const ACTIVE_PROBABILITY: f64 = 0.2;

/// Generate engagement files for `usernames`. Returns empty files when there
/// are no usernames.
#[must_use]
pub fn simulate_engagement(usernames: &[String], seed: u64, now: DateTime<Utc>) -> EngagementFiles {
    if usernames.is_empty() {
        return EngagementFiles::default();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let timestamp = collector_timestamp(now);

    let posts = (0..SIMULATED_POSTS)
        .map(|i| {
            let id = format!("simulated_post_{i}");
            let mut post = simulated_content(
                &mut rng,
                usernames,
                &timestamp,
                (10, 50),
                (0, 10),
                "comment",
            );
            post.url = Some(format!("https://www.instagram.com/p/{id}/"));
            post.view_count = rng
                .random_bool(0.5)
                .then(|| rng.random_range(100..=500));
            post.post_id = Some(id);
            post
        })
        .collect();

    let viewers = pick(&mut rng, usernames, (20, 100));
    let stories = vec![StoryEngagement {
        story_id: None,
        timestamp: Some(timestamp.clone()),
        viewer_count: viewers.len() as u64,
        viewers,
    }];

    let reels = (0..SIMULATED_REELS)
        .map(|i| {
            let id = format!("simulated_reel_{i}");
            let mut reel = simulated_content(
                &mut rng,
                usernames,
                &timestamp,
                (15, 70),
                (0, 15),
                "reel comment",
            );
            reel.url = Some(format!("https://www.instagram.com/reel/{id}/"));
            reel.view_count = Some(rng.random_range(200..=1000));
            reel.reel_id = Some(id);
            reel
        })
        .collect();

    let online_activity = sample(&mut rng, usernames.len(), ONLINE_SAMPLE.min(usernames.len()))
        .into_iter()
        .map(|i| OnlineActivity {
            username: usernames[i].clone(),
            timestamp: Some(timestamp.clone()),
            is_active: rng.random_bool(ACTIVE_PROBABILITY),
        })
        .collect();

    let files = EngagementFiles {
        posts,
        stories,
        reels,
        online_activity,
    };
    tracing::info!(
        seed,
        followers = usernames.len(),
        posts = files.posts.len(),
        stories = files.stories.len(),
        reels = files.reels.len(),
        activity_records = files.online_activity.len(),
        "simulated engagement data"
    );
    files
}

fn simulated_content(
    rng: &mut StdRng,
    usernames: &[String],
    timestamp: &str,
    like_range: (usize, usize),
    comment_range: (usize, usize),
    comment_kind: &str,
) -> ContentEngagement {
    let likers = pick(rng, usernames, like_range);
    let comments: Vec<Comment> = pick(rng, usernames, comment_range)
        .into_iter()
        .map(|username| Comment {
            text: format!("Simulated {comment_kind} by {username}"),
            username,
        })
        .collect();
    ContentEngagement {
        timestamp: Some(timestamp.to_string()),
        likes: LikeSummary {
            count: likers.len() as u64,
            usernames: likers,
        },
        comments: CommentSummary {
            count: comments.len() as u64,
            comments,
        },
        ..ContentEngagement::default()
    }
}

/// A random subset of `usernames` whose size is drawn from `(lo, hi)`, both
/// capped at the population.
fn pick(rng: &mut StdRng, usernames: &[String], (lo, hi): (usize, usize)) -> Vec<String> {
    let n = usernames.len();
    let amount = rng.random_range(lo.min(n)..=hi.min(n));
    sample(rng, n, amount)
        .into_iter()
        .map(|i| usernames[i].clone())
        .collect()
}

/// Naive ISO-8601 with microseconds, as the collector writes it.
fn collector_timestamp(now: DateTime<Utc>) -> String {
    now.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
