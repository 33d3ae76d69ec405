//! Suggestion → card mapping.
//!
//! A [`Card`] is plain data; turning it into styled lines or plain text is
//! a separate step so headless output and the TUI share one mapping.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::keywords::{Difficulty, KeywordSuggestion, SearchVolume};
use crate::theme::Theme;

pub const NO_IDEAS: &str = "No content ideas provided.";
pub const NO_FEATURES: &str = "No specific SERP features noted.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Caution,
    Warning,
    Severe,
    Neutral,
    VolumeTop,
    VolumeHigh,
    VolumeMid,
}

impl Tone {
    pub fn color(self, theme: &Theme) -> Color {
        match self {
            Tone::Good => theme.good,
            Tone::Caution => theme.caution,
            Tone::Warning => theme.warning,
            Tone::Severe => theme.severe,
            Tone::Neutral => theme.neutral,
            Tone::VolumeTop => theme.volume_top,
            Tone::VolumeHigh => theme.volume_high,
            Tone::VolumeMid => theme.volume_mid,
        }
    }
}

pub fn difficulty_tone(difficulty: &Difficulty) -> Tone {
    match difficulty {
        Difficulty::Low => Tone::Good,
        Difficulty::Medium => Tone::Caution,
        Difficulty::High => Tone::Warning,
        Difficulty::VeryHigh => Tone::Severe,
        Difficulty::Other(_) => Tone::Neutral,
    }
}

/// Six buckets collapse into four visual tiers
pub fn volume_tone(volume: &SearchVolume) -> Tone {
    match volume {
        SearchVolume::Over100K | SearchVolume::UpTo100K => Tone::VolumeTop,
        SearchVolume::UpTo10K => Tone::VolumeHigh,
        SearchVolume::UpTo1K => Tone::VolumeMid,
        SearchVolume::UpTo10 | SearchVolume::UpTo100 | SearchVolume::Other(_) => Tone::Neutral,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Items(Vec<String>),
    Placeholder(&'static str),
}

impl Listing {
    fn from_items(items: &[String], placeholder: &'static str) -> Self {
        if items.is_empty() {
            Listing::Placeholder(placeholder)
        } else {
            Listing::Items(items.to_vec())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub difficulty: Badge,
    pub volume: Badge,
    pub content_ideas: Listing,
    pub serp_features: Listing,
}

impl From<&KeywordSuggestion> for Card {
    fn from(s: &KeywordSuggestion) -> Self {
        Self {
            title: s.keyword.clone(),
            difficulty: Badge {
                label: format!("Difficulty: {}", s.difficulty),
                tone: difficulty_tone(&s.difficulty),
            },
            volume: Badge {
                label: format!("Search Volume: {}", s.search_volume),
                tone: volume_tone(&s.search_volume),
            },
            content_ideas: Listing::from_items(&s.content_ideas, NO_IDEAS),
            serp_features: Listing::from_items(&s.serp_features, NO_FEATURES),
        }
    }
}

pub fn cards(suggestions: &[KeywordSuggestion]) -> Vec<Card> {
    suggestions.iter().map(Card::from).collect()
}

impl Card {
    /// Body lines; the title goes in the surrounding block
    pub fn lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let badge = |b: &Badge| {
            Span::styled(
                format!(" {} ", b.label),
                Style::default()
                    .fg(Color::Black)
                    .bg(b.tone.color(theme))
                    .add_modifier(Modifier::BOLD),
            )
        };
        let heading = |text: &'static str| {
            Line::from(Span::styled(
                text,
                Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
            ))
        };
        let placeholder = |text: &'static str| {
            Line::from(Span::styled(
                text,
                Style::default().fg(theme.text_dim).add_modifier(Modifier::ITALIC),
            ))
        };

        let mut lines = vec![
            Line::from(vec![badge(&self.difficulty), Span::raw(" "), badge(&self.volume)]),
            Line::from(""),
            heading("Content Ideas:"),
        ];

        match &self.content_ideas {
            Listing::Items(ideas) => lines.extend(ideas.iter().map(|idea| {
                Line::from(vec![
                    Span::styled("  • ", Style::default().fg(theme.text_dim)),
                    Span::styled(idea.clone(), Style::default().fg(theme.text)),
                ])
            })),
            Listing::Placeholder(text) => lines.push(placeholder(*text)),
        }

        lines.push(Line::from(""));
        lines.push(heading("SERP Features:"));

        match &self.serp_features {
            Listing::Items(features) => {
                let mut tags = Vec::new();
                for (i, feature) in features.iter().enumerate() {
                    if i > 0 {
                        tags.push(Span::raw(" "));
                    }
                    tags.push(Span::styled(
                        format!("[{}]", feature),
                        Style::default().fg(theme.tag),
                    ));
                }
                lines.push(Line::from(tags));
            }
            Listing::Placeholder(text) => lines.push(placeholder(*text)),
        }

        lines
    }

    /// Rows needed to show the card inside a bordered block `width` columns wide
    pub fn height(&self, width: u16, theme: &Theme) -> u16 {
        let inner = width.saturating_sub(2).max(1) as usize;
        let body: usize = self
            .lines(theme)
            .iter()
            .map(|line| line.width().max(1).div_ceil(inner))
            .sum();
        (body + 2).min(u16::MAX as usize) as u16
    }

    /// Uncolored rendering for stdout
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&format!("  [{}] [{}]\n", self.difficulty.label, self.volume.label));

        out.push_str("  Content Ideas:\n");
        match &self.content_ideas {
            Listing::Items(ideas) => {
                for idea in ideas {
                    out.push_str(&format!("    - {}\n", idea));
                }
            }
            Listing::Placeholder(text) => out.push_str(&format!("    {}\n", text)),
        }

        out.push_str("  SERP Features:\n");
        match &self.serp_features {
            Listing::Items(features) => out.push_str(&format!("    {}\n", features.join(", "))),
            Listing::Placeholder(text) => out.push_str(&format!("    {}\n", text)),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn suggestion(difficulty: &str, volume: &str, ideas: &[&str], features: &[&str]) -> KeywordSuggestion {
        KeywordSuggestion {
            keyword: "standing desk ergonomics".to_string(),
            difficulty: Difficulty::from(difficulty.to_string()),
            search_volume: SearchVolume::from(volume.to_string()),
            content_ideas: ideas.iter().map(|s| s.to_string()).collect(),
            serp_features: features.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_difficulty_tones() {
        let tones: Vec<Tone> = ["Low", "Medium", "High", "Very High", "Impossible"]
            .iter()
            .map(|d| difficulty_tone(&Difficulty::from(d.to_string())))
            .collect();
        assert_eq!(
            tones,
            vec![Tone::Good, Tone::Caution, Tone::Warning, Tone::Severe, Tone::Neutral]
        );
    }

    #[test]
    fn test_volume_tones_collapse_to_four_tiers() {
        let tones: Vec<Tone> = SearchVolume::ALLOWED
            .iter()
            .map(|v| volume_tone(&SearchVolume::from(v.to_string())))
            .collect();
        assert_eq!(
            tones,
            vec![
                Tone::Neutral,
                Tone::Neutral,
                Tone::VolumeMid,
                Tone::VolumeHigh,
                Tone::VolumeTop,
                Tone::VolumeTop
            ]
        );
    }

    #[test]
    fn test_card_reflects_record() {
        let card = Card::from(&suggestion("High", "1K-10K", &["Setup checklist"], &["Videos", "Images"]));

        assert_eq!(card.title, "standing desk ergonomics");
        assert_eq!(card.difficulty.label, "Difficulty: High");
        assert_eq!(card.volume.label, "Search Volume: 1K-10K");
        assert_eq!(card.content_ideas, Listing::Items(vec!["Setup checklist".to_string()]));
        assert_eq!(
            card.serp_features,
            Listing::Items(vec!["Videos".to_string(), "Images".to_string()])
        );
    }

    #[test]
    fn test_empty_lists_use_placeholders() {
        let card = Card::from(&suggestion("Low", "0-10", &[], &[]));
        assert_eq!(card.content_ideas, Listing::Placeholder(NO_IDEAS));
        assert_eq!(card.serp_features, Listing::Placeholder(NO_FEATURES));

        let text = card.to_plain_text();
        assert!(text.contains(NO_IDEAS));
        assert!(text.contains(NO_FEATURES));
    }

    #[test]
    fn test_unknown_difficulty_renders() {
        let card = Card::from(&suggestion("Brutal", "100K+", &["a"], &["b"]));
        assert_eq!(card.difficulty.tone, Tone::Neutral);

        let theme = Theme::default();
        let lines = card.lines(&theme);
        assert!(lines[0].spans[0].content.contains("Difficulty: Brutal"));
        assert_eq!(lines[0].spans[0].style.bg, Some(theme.neutral));
    }

    #[test]
    fn test_height_accounts_for_wrapping() {
        let theme = Theme::default();
        let card = Card::from(&suggestion("Low", "0-10", &["a fairly long content idea that wraps"], &["x"]));
        assert!(card.height(20, &theme) > card.height(200, &theme));
        // badges, blank, heading, 1 idea, blank, heading, tags + 2 borders
        assert_eq!(card.height(200, &theme), 9);
    }
}
