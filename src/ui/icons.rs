//! Shared UI icons.
//!
//! Each emoji has a plain-text fallback for terminals without Unicode support.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");

// Interview indicators
pub static QUESTION: Emoji<'_, '_> = Emoji("💬 ", "Q:");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "[SKIP]");
pub static RESTART: Emoji<'_, '_> = Emoji("🔄 ", "[RESTART]");
pub static PROGRESS: Emoji<'_, '_> = Emoji("📊 ", "[PROG]");
pub static REPORT: Emoji<'_, '_> = Emoji("📄 ", "[REPORT]");
pub static LOCK: Emoji<'_, '_> = Emoji("🔒 ", "[LOCKED]");
