// crates/game_plugin/src/shims.rs
//! State export/import across a module swap: a `StateEnvelope` header followed
//! by the bincode-encoded `GameState`.

use engine_shared::{calculate_layout_hash, StateEnvelope, StateError};

use crate::state::{GameState, STATE_SCHEMA, STATE_VERSION};

pub const CURRENT_SCHEMA_HASH: u64 = calculate_layout_hash(STATE_SCHEMA);

pub fn save_state(gs: &GameState) -> Result<Vec<u8>, StateError> {
    let payload = bincode::serialize(gs).map_err(|e| StateError::Codec(e.to_string()))?;
    let envelope = StateEnvelope::new(STATE_VERSION, CURRENT_SCHEMA_HASH, payload.len());

    let mut bytes = Vec::with_capacity(StateEnvelope::SIZE + payload.len());
    bytes.extend_from_slice(&envelope.to_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode a snapshot written by `save_state`. Presentation handles come back
/// empty and must be re-acquired.
pub fn load_state(bytes: &[u8]) -> Result<GameState, StateError> {
    let (envelope, payload) = StateEnvelope::split(bytes)?;

    if envelope.schema_hash != CURRENT_SCHEMA_HASH {
        return Err(StateError::SchemaMismatch {
            expected: CURRENT_SCHEMA_HASH,
            found: envelope.schema_hash,
        });
    }
    if envelope.state_version != STATE_VERSION {
        return Err(StateError::VersionMismatch {
            expected: STATE_VERSION,
            found: envelope.state_version,
        });
    }

    bincode::deserialize(payload).map_err(|e| StateError::Codec(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::state::{Barrel, LeaderboardEntry, SpriteId};
    use engine_shared::{InputState, Vec2};

    #[test]
    fn snapshot_keeps_simulation_and_drops_handles() {
        let mut gs = GameState::new(GameConfig::with_assets_dir("/tmp/kd"));
        gs.level = 2;
        gs.score = 3100;
        gs.lives = 1;
        gs.play_time = 42.5;
        gs.time_scale = 0.7;
        gs.barrels.push(Barrel::spawn_at(Vec2::new(12.0, 34.0)));
        gs.leaderboard.push(LeaderboardEntry {
            name: "kay".into(),
            score: 9,
        });
        gs.sprites.get_mut(SpriteId::Woman).frame = 4;
        gs.sprites.get_mut(SpriteId::Woman).texture = Some(77);
        gs.font = Some(3);
        gs.input = InputState::default().with(engine_shared::Action::Jump);

        let restored = load_state(&save_state(&gs).unwrap()).unwrap();

        assert_eq!(restored.level, 2);
        assert_eq!(restored.score, 3100);
        assert_eq!(restored.lives, 1);
        assert_eq!(restored.play_time, 42.5);
        assert_eq!(restored.time_scale, 0.7);
        assert_eq!(restored.barrels, gs.barrels);
        assert_eq!(restored.leaderboard, gs.leaderboard);
        assert_eq!(restored.config, gs.config);
        assert_eq!(restored.sprites.get(SpriteId::Woman).frame, 4);
        assert_eq!(restored.sprites.get(SpriteId::Woman).texture, None);
        assert_eq!(restored.font, None);
        assert_eq!(restored.input, InputState::default());
    }

    #[test]
    fn foreign_schema_is_refused() {
        let gs = GameState::new(GameConfig::default());
        let mut bytes = save_state(&gs).unwrap();
        bytes[8] ^= 0x01;
        assert!(matches!(load_state(&bytes), Err(StateError::SchemaMismatch { .. })));
    }

    #[test]
    fn version_bump_is_refused() {
        let gs = GameState::new(GameConfig::default());
        let mut bytes = save_state(&gs).unwrap();
        bytes[4..8].copy_from_slice(&(STATE_VERSION + 1).to_le_bytes());
        assert!(matches!(load_state(&bytes), Err(StateError::VersionMismatch { .. })));
    }

    #[test]
    fn corrupt_payload_is_a_codec_error() {
        let gs = GameState::new(GameConfig::default());
        let bytes = save_state(&gs).unwrap();
        let mut cut = bytes[..StateEnvelope::SIZE].to_vec();
        cut[16..24].copy_from_slice(&2u64.to_le_bytes());
        cut.extend_from_slice(&[0xFF, 0xFF]);
        assert!(matches!(load_state(&cut), Err(StateError::Codec(_))));
    }
}
