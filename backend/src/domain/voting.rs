//! Vote aggregation for posts.
//!
//! [`VoteSet`] keeps at most one [`Vote`] per user. [`apply`] performs an
//! upvote, downvote, or unvote transition on a set and reports the score delta
//! the transition is worth; [`upvote_percentage`] derives the percentage
//! metric from the resulting set. [`Post::apply_vote`](crate::domain::Post::apply_vote)
//! combines the two so score, votes, and percentage always move together.
//!
//! Transition table (`+` upvote, `-` downvote, `0` no vote):
//!
//! | before | action   | after | score delta |
//! |--------|----------|-------|-------------|
//! | `0`    | upvote   | `+`   | +1          |
//! | `+`    | upvote   | `+`   | 0           |
//! | `-`    | upvote   | `+`   | +2          |
//! | `0`    | downvote | `-`   | -1          |
//! | `-`    | downvote | `-`   | 0           |
//! | `+`    | downvote | `-`   | -2          |
//! | `0`    | unvote   | `0`   | 0           |
//! | `+`    | unvote   | `0`   | -1          |
//! | `-`    | unvote   | `0`   | +1          |

use super::ids::UserId;

/// Direction of a single vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VotePolarity {
    /// Worth +1.
    Up,
    /// Worth -1.
    Down,
}

impl VotePolarity {
    /// Score contribution of a vote with this polarity.
    pub fn value(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// One user's vote on a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    user_id: UserId,
    polarity: VotePolarity,
}

impl Vote {
    /// Record `polarity` for `user_id`.
    pub fn new(user_id: UserId, polarity: VotePolarity) -> Self {
        Self { user_id, polarity }
    }

    /// Voter.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Direction of the vote.
    pub fn polarity(&self) -> VotePolarity {
        self.polarity
    }
}

/// Ordered votes with at most one entry per user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteSet(Vec<Vote>);

impl VoteSet {
    /// Empty vote set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of votes cast.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no votes are recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Votes in the order they were first cast.
    pub fn iter(&self) -> impl Iterator<Item = &Vote> {
        self.0.iter()
    }

    /// Current vote of `user_id`, if any.
    pub fn polarity_of(&self, user_id: &UserId) -> Option<VotePolarity> {
        self.position(user_id).and_then(|index| self.0.get(index)).map(Vote::polarity)
    }

    /// Number of upvotes.
    pub fn upvotes(&self) -> usize {
        self.0
            .iter()
            .filter(|vote| vote.polarity == VotePolarity::Up)
            .count()
    }

    fn position(&self, user_id: &UserId) -> Option<usize> {
        self.0.iter().position(|vote| &vote.user_id == user_id)
    }

    fn set(&mut self, user_id: &UserId, polarity: VotePolarity) {
        match self.position(user_id).and_then(|index| self.0.get_mut(index)) {
            Some(vote) => vote.polarity = polarity,
            None => self.0.push(Vote::new(user_id.clone(), polarity)),
        }
    }

    fn remove(&mut self, user_id: &UserId) -> Option<Vote> {
        self.position(user_id).map(|index| self.0.remove(index))
    }
}

/// Vote operation requested by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    /// Cast or flip to +1.
    Upvote,
    /// Cast or flip to -1.
    Downvote,
    /// Retract any existing vote.
    Unvote,
}

impl VoteAction {
    fn target(self) -> Option<VotePolarity> {
        match self {
            Self::Upvote => Some(VotePolarity::Up),
            Self::Downvote => Some(VotePolarity::Down),
            Self::Unvote => None,
        }
    }
}

/// Outcome of applying a [`VoteAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    /// Voter's polarity before the action.
    pub before: Option<VotePolarity>,
    /// Voter's polarity after the action.
    pub after: Option<VotePolarity>,
}

impl VoteTransition {
    /// Score change implied by the transition.
    pub fn score_delta(self) -> i64 {
        contribution(self.after) - contribution(self.before)
    }

    /// Whether the vote set changed.
    pub fn is_change(self) -> bool {
        self.before != self.after
    }
}

fn contribution(polarity: Option<VotePolarity>) -> i64 {
    polarity.map_or(0, VotePolarity::value)
}

/// Apply `action` by `voter` to `votes`.
///
/// Repeating the voter's current polarity and unvoting without a vote are
/// no-ops.
pub fn apply(votes: &mut VoteSet, voter: &UserId, action: VoteAction) -> VoteTransition {
    let before = votes.polarity_of(voter);
    let after = action.target();
    if before != after {
        match after {
            Some(polarity) => votes.set(voter, polarity),
            None => {
                votes.remove(voter);
            }
        }
    }
    VoteTransition { before, after }
}

/// Share of upvotes in `votes`, rounded half up to a whole percent.
///
/// An empty set yields 0.
pub fn upvote_percentage(votes: &VoteSet) -> u8 {
    let total = votes.len();
    if total == 0 {
        return 0;
    }
    let rounded = (200 * votes.upvotes() + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}
