// src/badge.rs
use std::fmt;

use crate::token::PublicIdentifier;

/// Badge types known to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeKind {
    Status,
    Players,
    Tps,
    Software,
    Version,
}

impl BadgeKind {
    pub const ALL: [BadgeKind; 5] = [
        BadgeKind::Status,
        BadgeKind::Players,
        BadgeKind::Tps,
        BadgeKind::Software,
        BadgeKind::Version,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BadgeKind::Status => "status",
            BadgeKind::Players => "players",
            BadgeKind::Tps => "tps",
            BadgeKind::Software => "software",
            BadgeKind::Version => "version",
        }
    }
}

impl fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct BadgeUrlBuilder {
    base: String,
    public_id: PublicIdentifier,
}

impl BadgeUrlBuilder {
    pub fn new(base_url: &str, public_id: PublicIdentifier) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_owned(),
            public_id,
        }
    }

    /// `<base><?|&>id=<public id>&type=<badge_type>`; `&` when the base
    /// already carries a query string.
    pub fn build(&self, badge_type: &str) -> String {
        let sep = if self.base.contains('?') { '&' } else { '?' };
        format!("{}{sep}id={}&type={badge_type}", self.base, self.public_id)
    }

    pub fn badge(&self, kind: BadgeKind) -> String {
        self.build(kind.as_str())
    }

    pub fn status(&self) -> String {
        self.badge(BadgeKind::Status)
    }

    pub fn players(&self) -> String {
        self.badge(BadgeKind::Players)
    }

    pub fn tps(&self) -> String {
        self.badge(BadgeKind::Tps)
    }

    pub fn software(&self) -> String {
        self.badge(BadgeKind::Software)
    }

    pub fn version(&self) -> String {
        self.badge(BadgeKind::Version)
    }

    pub fn custom(&self, badge_type: &str) -> String {
        self.build(badge_type)
    }

    /// Every named badge paired with its URL, in display order.
    pub fn all(&self) -> Vec<(BadgeKind, String)> {
        BadgeKind::ALL.iter().map(|k| (*k, self.badge(*k))).collect()
    }
}
