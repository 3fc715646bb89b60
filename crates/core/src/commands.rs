use std::sync::OnceLock;

use regex::Regex;

use crate::languages::Language;

/// A recognized `@bot` mention command. Anything else is noise and is
/// ignored by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MentionCommand {
    Enable { target: String, language: Language },
    Disable { target: String },
}

fn enable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"enable autotranslate (?:<@)?([0-9A-Z]+)(?:>)? into (en|ja|vn)")
            .expect("valid enable pattern")
    })
}

fn disable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"disable autotranslate (?:<@)?([0-9A-Z]+)(?:>)?")
            .expect("valid disable pattern")
    })
}

/// Parses mention text against the two command patterns, enable first.
/// Mention targets may be wrapped in Slack's `<@ID>` decoration or appear
/// as a bare id; the decoration is stripped either way.
pub fn parse_mention_command(text: &str) -> Option<MentionCommand> {
    if let Some(captures) = enable_pattern().captures(text) {
        let language = Language::from_code(&captures[2])?;
        return Some(MentionCommand::Enable { target: captures[1].to_owned(), language });
    }

    disable_pattern()
        .captures(text)
        .map(|captures| MentionCommand::Disable { target: captures[1].to_owned() })
}

#[cfg(test)]
mod tests {
    use super::{parse_mention_command, MentionCommand};
    use crate::languages::Language;

    #[test]
    fn parses_enable_with_decorated_mention() {
        let command =
            parse_mention_command("<@UBOT> enable autotranslate <@U1234567890> into en");

        assert_eq!(
            command,
            Some(MentionCommand::Enable {
                target: "U1234567890".to_owned(),
                language: Language::En,
            })
        );
    }

    #[test]
    fn parses_enable_with_bare_id() {
        let command = parse_mention_command("enable autotranslate U1234567890 into ja");

        assert_eq!(
            command,
            Some(MentionCommand::Enable {
                target: "U1234567890".to_owned(),
                language: Language::Ja,
            })
        );
    }

    #[test]
    fn parses_disable() {
        let command = parse_mention_command("<@UBOT> disable autotranslate <@U03J9FTHH8B>");

        assert_eq!(command, Some(MentionCommand::Disable { target: "U03J9FTHH8B".to_owned() }));
    }

    #[test]
    fn enable_wins_when_both_verbs_appear() {
        let command = parse_mention_command(
            "please disable autotranslate later but first enable autotranslate <@U1> into vn",
        );

        assert!(matches!(command, Some(MentionCommand::Enable { .. })));
    }

    #[test]
    fn rejects_unknown_language_codes() {
        assert_eq!(parse_mention_command("enable autotranslate <@U1> into fr"), None);
    }

    #[test]
    fn ignores_unrelated_text() {
        assert_eq!(parse_mention_command("what does this bot even do"), None);
        assert_eq!(parse_mention_command(""), None);
    }
}
