//! Event scripts
//!
//! A script is a JSON-lines file of [`LifecycleEvent`]s. Blank lines and
//! lines starting with `#` are skipped.

use anyhow::{Context, Result};

use astro_core::LifecycleEvent;

/// Parse a JSON-lines script
pub fn parse_script(source: &str) -> Result<Vec<LifecycleEvent>> {
    source
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            serde_json::from_str(line).with_context(|| format!("line {number}: invalid event"))
        })
        .collect()
}

/// Built-in walkthrough of a short chat exchange
pub fn demo_script() -> Vec<LifecycleEvent> {
    use LifecycleEvent::{
        AiMessageReady, AiMessageShown, ChangeColor, ChatOpen, FirstInputFocus, PointerMove,
        Sleep, UserSendsMessage, UserTyping, WaitIdle,
    };

    let mut script = vec![
        ChatOpen,
        WaitIdle,
        FirstInputFocus { x: 640.0, y: 720.0 },
        WaitIdle,
        PointerMove { x: 200.0, y: 400.0 },
        Sleep { ms: 300 },
    ];
    script.extend((0..8).flat_map(|i| {
        [
            UserTyping {
                caret_x: 420.0 + f64::from(i) * 9.0,
                caret_y: 720.0,
            },
            Sleep { ms: 180 },
        ]
    }));
    script.extend([
        UserSendsMessage { x: 640.0, y: 720.0 },
        WaitIdle,
        Sleep { ms: 1200 },
        AiMessageReady,
        AiMessageShown { x: 420.0, y: 360.0 },
        WaitIdle,
        ChangeColor {
            name: "green".to_string(),
        },
        Sleep { ms: 500 },
    ]);
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let events = parse_script(
            "# opening\n\n{\"event\":\"chat_open\"}\n  {\"event\":\"sleep\",\"ms\":5}\n",
        )
        .expect("parse");
        assert_eq!(
            events,
            vec![LifecycleEvent::ChatOpen, LifecycleEvent::Sleep { ms: 5 }]
        );
    }

    #[test]
    fn test_parse_reports_line() {
        let err = parse_script("{\"event\":\"chat_open\"}\n{\"event\":\"nope\"}")
            .expect_err("invalid event");
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_demo_opens_chat_first() {
        let demo = demo_script();
        assert_eq!(demo.first(), Some(&LifecycleEvent::ChatOpen));
        assert!(demo.contains(&LifecycleEvent::AiMessageReady));
    }
}
