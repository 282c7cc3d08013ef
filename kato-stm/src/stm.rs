//! STM Manager (spec.md §4.7): appends observations to a session's
//! short-term memory and triggers auto-learn once `max_pattern_length` is
//! reached, per the session's configured `StmMode`.

use kato_core::error::Result;
use kato_core::interfaces::StmMode;
use kato_core::types::{Emotives, Event, Pattern};
use kato_index::IndexLayer;
use kato_kb::KnowledgeBaseStore;
use std::collections::HashMap;
use tracing::debug;

use crate::session::Session;

/// Appends one event to `session`'s STM and, if the STM has reached
/// `max_pattern_length`, learns a pattern from it and applies the
/// configured auto-learn mode. Returns the learned pattern, if any.
pub async fn observe(
    session: &mut Session,
    kb: &dyn KnowledgeBaseStore,
    index: &IndexLayer,
    event: Event,
    emotives: Emotives,
    metadata: HashMap<String, serde_json::Value>,
) -> Result<Option<Pattern>> {
    session.push_event(event, emotives, metadata);

    let threshold = session.session_config.max_pattern_length;
    if threshold == 0 || session.stm.len() < threshold {
        return Ok(None);
    }

    learn(session, kb, index).await
}

/// Learn a pattern from the session's current STM and apply the
/// configured auto-learn mode afterward. A short-term memory holding
/// fewer than two events has nothing to name a pattern from, so this
/// returns `None` without clearing rather than erroring.
pub async fn learn(session: &mut Session, kb: &dyn KnowledgeBaseStore, index: &IndexLayer) -> Result<Option<Pattern>> {
    if session.stm.len() < 2 {
        return Ok(None);
    }

    let events = session.stm.clone();
    let emotives = session.merged_emotives();
    let persistence = session.session_config.persistence;

    let pattern = kb.learn_pattern(events, emotives, persistence).await?;
    index.add_pattern(&pattern);
    debug!(pattern = %pattern.name, mode = ?session.session_config.stm_mode, "learned pattern");

    match session.session_config.stm_mode {
        StmMode::Clear => session.clear_stm(),
        StmMode::Rolling => roll_window(session),
        StmMode::None => {}
    }

    Ok(Some(pattern))
}

/// Keep the most recent `max_pattern_length - 1` events after an
/// auto-learn in `ROLLING` mode.
fn roll_window(session: &mut Session) {
    let keep = session.session_config.max_pattern_length.saturating_sub(1);
    let len = session.stm.len();
    if len <= keep {
        return;
    }
    let drop = len - keep;
    session.stm.drain(0..drop);
    session.emotives_acc.drain(0..drop);
    session.metadata_acc.drain(0..drop);
}
