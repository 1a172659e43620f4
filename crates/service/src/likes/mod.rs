//! Article likes: per-article counters with a remote bucket as the source
//! of truth and a local JSON ledger for when the bucket is unreachable.

pub mod article_id;
pub mod count;
pub mod keyed_queue;
pub mod local;
pub mod remote;
pub mod service;

pub use article_id::{sanitize_article_id, ArticleId};
pub use count::clamp_likes;
pub use service::{after_remote, Backend, Counted, LikesService, Transition};
