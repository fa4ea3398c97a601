//! Behavioural tests for accounts, posts, and votes over the in-memory stores.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::executor::block_on;
use redditclone::domain::{Error, ErrorCode, LoginCredentials, Post, PostDraft, UserIdentity};
use redditclone::state::AppState;
use redditclone::test_support::{FixedClock, PlaintextPasswordHasher, SequentialTokenIssuer};
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};

struct ForumWorld {
    state: AppState,
    identities: HashMap<String, UserIdentity>,
    post: Option<Post>,
    last_error: Option<Error>,
}

type SharedWorld = Arc<Mutex<ForumWorld>>;

#[fixture]
fn forum_world() -> SharedWorld {
    let state = AppState::from_parts(
        Arc::new(SequentialTokenIssuer::new()),
        Arc::new(PlaintextPasswordHasher),
        Arc::new(FixedClock::default()),
    );
    Arc::new(Mutex::new(ForumWorld {
        state,
        identities: HashMap::new(),
        post: None,
        last_error: None,
    }))
}

fn state_of(world: &SharedWorld) -> AppState {
    world.lock().expect("world lock").state.clone()
}

fn identity_of(world: &SharedWorld, username: &str) -> UserIdentity {
    world
        .lock()
        .expect("world lock")
        .identities
        .get(username)
        .cloned()
        .expect("user registered")
}

fn record(world: &SharedWorld, outcome: Result<Post, Error>) {
    let mut ctx = world.lock().expect("world lock");
    match outcome {
        Ok(post) => {
            ctx.post = Some(post);
            ctx.last_error = None;
        }
        Err(err) => ctx.last_error = Some(err),
    }
}

#[given("a registered user {username}")]
fn a_registered_user(forum_world: SharedWorld, username: String) {
    let state = state_of(&forum_world);
    let credentials =
        LoginCredentials::try_from_parts(&username, "password").expect("valid credentials");
    let session = block_on(state.accounts.register(&credentials)).expect("registration succeeds");
    let identity =
        block_on(state.accounts.authenticate(session.token())).expect("token authenticates");
    forum_world
        .lock()
        .expect("world lock")
        .identities
        .insert(username, identity);
}

#[when("{username} publishes a text post")]
fn publishes_a_text_post(forum_world: SharedWorld, username: String) {
    let state = state_of(&forum_world);
    let author = identity_of(&forum_world, &username);
    let draft = PostDraft::try_from_parts("text", "music", "New album", "Thoughts?", "")
        .expect("valid draft");
    let outcome = block_on(state.posts.create(&author, draft));
    record(&forum_world, outcome);
}

#[when("{username} casts {action} on the post")]
fn votes_on_the_post(forum_world: SharedWorld, username: String, action: String) {
    let state = state_of(&forum_world);
    let voter = identity_of(&forum_world, &username);
    let post_id = forum_world
        .lock()
        .expect("world lock")
        .post
        .as_ref()
        .map(|post| post.id().clone())
        .expect("post published");
    let outcome = block_on(async {
        match action.as_str() {
            "upvotes" => state.posts.upvote(&post_id, voter.id()).await,
            "downvotes" => state.posts.downvote(&post_id, voter.id()).await,
            "unvotes" => state.posts.unvote(&post_id, voter.id()).await,
            other => panic!("unsupported vote action {other}"),
        }
    });
    record(&forum_world, outcome);
}

#[when("{username} deletes the post")]
fn deletes_the_post(forum_world: SharedWorld, username: String) {
    let state = state_of(&forum_world);
    let caller = identity_of(&forum_world, &username);
    let post_id = forum_world
        .lock()
        .expect("world lock")
        .post
        .as_ref()
        .map(|post| post.id().clone())
        .expect("post published");
    let outcome = block_on(state.posts.delete(&post_id, caller.id()));
    let mut ctx = forum_world.lock().expect("world lock");
    ctx.last_error = outcome.err();
}

#[then("the post has score {score} from {votes} votes")]
fn the_post_has_score(forum_world: SharedWorld, score: i64, votes: usize) {
    let ctx = forum_world.lock().expect("world lock");
    assert!(ctx.last_error.is_none(), "error: {:?}", ctx.last_error);
    let post = ctx.post.as_ref().expect("post recorded");
    assert_eq!(post.score(), score);
    assert_eq!(post.votes().len(), votes);
}

#[then("the request fails with {code}")]
fn the_request_fails_with(forum_world: SharedWorld, code: String) {
    let ctx = forum_world.lock().expect("world lock");
    let error = ctx.last_error.as_ref().expect("an error was recorded");
    let expected = match code.as_str() {
        "forbidden" => ErrorCode::Forbidden,
        "not_found" => ErrorCode::NotFound,
        other => panic!("unsupported error code {other}"),
    };
    assert_eq!(error.code(), expected);
}

#[rstest]
fn votes_move_the_score_and_round_trip(forum_world: SharedWorld) {
    a_registered_user(forum_world.clone(), "alice".to_owned());
    a_registered_user(forum_world.clone(), "bob".to_owned());
    publishes_a_text_post(forum_world.clone(), "alice".to_owned());
    the_post_has_score(forum_world.clone(), 1, 1);

    votes_on_the_post(forum_world.clone(), "bob".to_owned(), "upvotes".to_owned());
    the_post_has_score(forum_world.clone(), 2, 2);

    votes_on_the_post(forum_world.clone(), "bob".to_owned(), "unvotes".to_owned());
    the_post_has_score(forum_world.clone(), 1, 1);

    votes_on_the_post(forum_world.clone(), "bob".to_owned(), "downvotes".to_owned());
    the_post_has_score(forum_world.clone(), 0, 2);

    votes_on_the_post(forum_world.clone(), "bob".to_owned(), "upvotes".to_owned());
    the_post_has_score(forum_world, 2, 2);
}

#[rstest]
fn repeated_upvotes_are_idempotent(forum_world: SharedWorld) {
    a_registered_user(forum_world.clone(), "alice".to_owned());
    a_registered_user(forum_world.clone(), "bob".to_owned());
    publishes_a_text_post(forum_world.clone(), "alice".to_owned());

    votes_on_the_post(forum_world.clone(), "bob".to_owned(), "upvotes".to_owned());
    votes_on_the_post(forum_world.clone(), "bob".to_owned(), "upvotes".to_owned());
    the_post_has_score(forum_world, 2, 2);
}

#[rstest]
fn only_the_author_may_delete_a_post(forum_world: SharedWorld) {
    a_registered_user(forum_world.clone(), "alice".to_owned());
    a_registered_user(forum_world.clone(), "bob".to_owned());
    publishes_a_text_post(forum_world.clone(), "alice".to_owned());

    deletes_the_post(forum_world.clone(), "bob".to_owned());
    the_request_fails_with(forum_world.clone(), "forbidden".to_owned());

    deletes_the_post(forum_world.clone(), "alice".to_owned());
    votes_on_the_post(forum_world.clone(), "bob".to_owned(), "upvotes".to_owned());
    the_request_fails_with(forum_world, "not_found".to_owned());
}
