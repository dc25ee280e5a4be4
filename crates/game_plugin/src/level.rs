// crates/game_plugin/src/level.rs
//! Level files and the persisted leaderboard.
//!
//! A level file is a stream of entity tags (`Player`, `Woman`, `Enemy`,
//! `Platform`, `Collectible`, `Ladder`), each followed by `pos(x y)` and, for
//! platforms and ladders, `size(w h)`, all in grid cells. The whole file is
//! parsed before anything in the game state is touched, so a bad file never
//! leaves a half-loaded level behind.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use engine_shared::Vec2;
use tracing::{error, info, warn};

use crate::config::{GRID_SIZE, LEVEL_GAME_OVER, LEVEL_MENU, NAME_LENGTH, PAGE_SIZE};
use crate::error::{LeaderboardError, LevelError};
use crate::state::{ground_platform, Entity, GameState, LeaderboardEntry};

pub const PLAYER_SIZE: Vec2 = Vec2::new(GRID_SIZE, GRID_SIZE * 2.0);
pub const WOMAN_SIZE: Vec2 = Vec2::new(GRID_SIZE * 2.0, GRID_SIZE * 3.0);
pub const ENEMY_SIZE: Vec2 = Vec2::new(GRID_SIZE * 3.0, GRID_SIZE * 5.0);
pub const COLLECTIBLE_SIZE: Vec2 = Vec2::new(GRID_SIZE, GRID_SIZE);

/// The game-over screen has no file; it is laid out here.
const GAME_OVER_LAYOUT: &str = "\
Player
pos(4 21)
Woman
pos(9 20)
Enemy
pos(26 18)
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Player,
    Woman,
    Enemy,
    Platform,
    Collectible,
    Ladder,
}

impl Tag {
    fn parse(s: &str) -> Option<Tag> {
        Some(match s {
            "Player" => Tag::Player,
            "Woman" => Tag::Woman,
            "Enemy" => Tag::Enemy,
            "Platform" => Tag::Platform,
            "Collectible" => Tag::Collectible,
            "Ladder" => Tag::Ladder,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Tag::Player => "Player",
            Tag::Woman => "Woman",
            Tag::Enemy => "Enemy",
            Tag::Platform => "Platform",
            Tag::Collectible => "Collectible",
            Tag::Ladder => "Ladder",
        }
    }

    fn needs_size(self) -> bool {
        matches!(self, Tag::Platform | Tag::Ladder)
    }
}

/// Parsed contents of a level, in pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelLayout {
    pub player: Option<Vec2>,
    pub woman: Option<Vec2>,
    pub enemy: Option<Vec2>,
    pub platforms: Vec<Entity>,
    pub collectibles: Vec<Entity>,
    pub ladders: Vec<Entity>,
}

#[derive(Debug)]
enum Token<'a> {
    Tag(&'a str),
    Pos(&'a str),
    Size(&'a str),
}

/// Split the source into tags and `pos(..)` / `size(..)` groups, keeping
/// the 1-based line each token starts on.
fn tokenize(src: &str) -> Result<Vec<(usize, Token<'_>)>, LevelError> {
    let mut tokens = Vec::new();
    for (idx, line) in src.lines().enumerate() {
        let line_no = idx + 1;
        let mut rest = line.trim();
        while !rest.is_empty() {
            let (kind, after_open) = if let Some(r) = rest.strip_prefix("pos(") {
                (Some(true), r)
            } else if let Some(r) = rest.strip_prefix("size(") {
                (Some(false), r)
            } else {
                (None, rest)
            };

            match kind {
                Some(is_pos) => {
                    let close = after_open.find(')').ok_or_else(|| LevelError::Malformed {
                        line: line_no,
                        text: line.to_string(),
                    })?;
                    let inner = &after_open[..close];
                    tokens.push((line_no, if is_pos { Token::Pos(inner) } else { Token::Size(inner) }));
                    rest = after_open[close + 1..].trim_start();
                }
                None => {
                    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                    tokens.push((line_no, Token::Tag(&rest[..end])));
                    rest = rest[end..].trim_start();
                }
            }
        }
    }
    Ok(tokens)
}

fn parse_pair(line: usize, inner: &str) -> Result<Vec2, LevelError> {
    let malformed = || LevelError::Malformed {
        line,
        text: inner.to_string(),
    };
    let mut parts = inner.split_whitespace();
    let x: f64 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(malformed)?;
    let y: f64 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(malformed)?;
    if parts.next().is_some() {
        return Err(malformed());
    }
    Ok(Vec2::new(x, y))
}

struct Record {
    tag: Tag,
    line: usize,
    pos: Option<Vec2>,
    size: Option<Vec2>,
}

impl Record {
    fn finish(self, layout: &mut LevelLayout) -> Result<(), LevelError> {
        let missing = |field| LevelError::MissingField {
            line: self.line,
            tag: self.tag.name(),
            field,
        };
        let pos = self.pos.ok_or_else(|| missing("pos"))? * GRID_SIZE;
        let size = match (self.tag.needs_size(), self.size) {
            (true, Some(size)) if size.x > 0.0 && size.y > 0.0 => size * GRID_SIZE,
            (true, _) => return Err(missing("size")),
            (false, _) => Vec2::ZERO,
        };

        match self.tag {
            Tag::Player => layout.player = Some(pos),
            Tag::Woman => layout.woman = Some(pos),
            Tag::Enemy => layout.enemy = Some(pos),
            Tag::Platform => layout.platforms.push(Entity::new(pos, size)),
            Tag::Ladder => layout.ladders.push(Entity::new(pos, size)),
            Tag::Collectible => layout.collectibles.push(Entity::new(pos, COLLECTIBLE_SIZE)),
        }
        Ok(())
    }
}

impl LevelLayout {
    pub fn parse(src: &str) -> Result<LevelLayout, LevelError> {
        let mut layout = LevelLayout::default();
        let mut current: Option<Record> = None;

        for (line, token) in tokenize(src)? {
            match token {
                Token::Tag(text) => {
                    let tag = Tag::parse(text).ok_or_else(|| LevelError::UnknownTag {
                        line,
                        tag: text.to_string(),
                    })?;
                    if let Some(done) = current.take() {
                        done.finish(&mut layout)?;
                    }
                    current = Some(Record {
                        tag,
                        line,
                        pos: None,
                        size: None,
                    });
                }
                Token::Pos(inner) | Token::Size(inner) => {
                    let is_pos = matches!(token, Token::Pos(_));
                    let value = parse_pair(line, inner)?;
                    let record = current.as_mut().ok_or_else(|| LevelError::Malformed {
                        line,
                        text: inner.to_string(),
                    })?;
                    let slot = if is_pos {
                        &mut record.pos
                    } else if record.tag.needs_size() {
                        &mut record.size
                    } else {
                        return Err(LevelError::Malformed {
                            line,
                            text: format!("size({inner}) on {}", record.tag.name()),
                        });
                    };
                    *slot = Some(value);
                }
            }
        }

        if let Some(done) = current.take() {
            done.finish(&mut layout)?;
        }
        Ok(layout)
    }

    pub fn read(path: &Path) -> Result<LevelLayout, LevelError> {
        let src = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&src)
    }
}

fn layout_for(gs: &GameState, level: u8) -> Result<LevelLayout, LevelError> {
    match level {
        LEVEL_GAME_OVER => LevelLayout::parse(GAME_OVER_LAYOUT),
        l if l < LEVEL_GAME_OVER => LevelLayout::read(&gs.config.level_path(l)),
        l => Err(LevelError::OutOfRange(l)),
    }
}

/// Drop every level entity except the ground row, and reset animations.
pub fn unload_level(gs: &mut GameState) {
    gs.reset_animations();

    gs.platforms.clear();
    gs.collectibles.clear();
    gs.ladders.clear();
    gs.barrels.clear();
    let texts = std::mem::take(&mut gs.floating_texts);
    gs.discarded_textures.extend(texts.into_iter().filter_map(|t| t.texture));

    gs.platforms.push(ground_platform());
}

fn place(entity: &mut Entity, pos: Option<Vec2>, size: Vec2) {
    if let Some(pos) = pos {
        entity.pos = pos;
    }
    entity.vel = Vec2::ZERO;
    entity.size = size;
}

/// Load `level`, replacing the current one. On error nothing is modified.
pub fn try_load_level(gs: &mut GameState, level: u8) -> Result<(), LevelError> {
    let layout = layout_for(gs, level)?;

    if level == LEVEL_MENU {
        // The first ladder doubles as the menu's exit trigger.
        assert!(!layout.ladders.is_empty(), "menu level must contain at least one ladder");
    }

    unload_level(gs);

    place(&mut gs.player, layout.player, PLAYER_SIZE);
    place(&mut gs.woman, layout.woman, WOMAN_SIZE);
    place(&mut gs.enemy, layout.enemy, ENEMY_SIZE);
    gs.platforms.extend(layout.platforms);
    gs.collectibles = layout.collectibles;
    gs.ladders = layout.ladders;

    if level == LEVEL_MENU {
        load_leaderboard(gs);
    } else if level == LEVEL_GAME_OVER {
        gs.leaderboard.push(LeaderboardEntry {
            name: String::new(),
            score: gs.score,
        });
    }

    gs.level = level;
    info!(level, "level loaded");
    Ok(())
}

/// Load `level`, logging and keeping the current level on failure.
pub fn load_level(gs: &mut GameState, level: u8) -> bool {
    match try_load_level(gs, level) {
        Ok(()) => true,
        Err(err) => {
            error!(level, %err, "failed to load level");
            false
        }
    }
}

// ==================================================================================
// LEADERBOARD
// ==================================================================================

/// Parse `<score> <name>` lines; any run of whitespace separates the two.
/// Blank and unparsable lines are skipped.
pub fn parse_leaderboard(src: &str) -> Vec<LeaderboardEntry> {
    src.lines()
        .filter_map(|line| {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                return None;
            }
            let trimmed = line.trim_start();
            let (score, name) = trimmed.split_once(char::is_whitespace).unwrap_or((trimmed, ""));
            let name = name.trim_start();
            match score.parse::<u32>() {
                Ok(score) => Some(LeaderboardEntry {
                    name: name.chars().take(NAME_LENGTH).collect(),
                    score,
                }),
                Err(_) => {
                    warn!(line, "skipping malformed leaderboard line");
                    None
                }
            }
        })
        .collect()
}

/// Highest score first; equal scores keep file order.
pub fn sort_leaderboard(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}

pub fn read_leaderboard(path: &Path) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
    let src = fs::read_to_string(path).map_err(|source| LeaderboardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut entries = parse_leaderboard(&src);
    sort_leaderboard(&mut entries);
    Ok(entries)
}

/// Append one record. Each record starts with a newline so a file written by
/// anything that omitted the trailing newline still splits cleanly.
pub fn append_leaderboard(path: &Path, entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
    let io_err = |source| LeaderboardError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new().create(true).append(true).open(path).map_err(io_err)?;
    write!(file, "\n{} {}", entry.score, entry.name).map_err(io_err)
}

pub fn last_page(entries: usize) -> u16 {
    (entries / PAGE_SIZE) as u16
}

/// Replace the in-memory leaderboard from disk; keep it on failure.
pub fn load_leaderboard(gs: &mut GameState) {
    let path = gs.config.leaderboard_path();
    match read_leaderboard(&path) {
        Ok(entries) => {
            gs.leaderboard = entries;
            gs.leaderboard_page = gs.leaderboard_page.min(last_page(gs.leaderboard.len()));
        }
        Err(err) => warn!(%err, "leaderboard not loaded"),
    }
}
