use skimmer_common::LlmProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/provider` shows the active provider; `/provider <name>` switches.
    Provider(Option<LlmProvider>),
    /// `/new` forgets the conversation so far.
    New,
    Help,
    /// `/quit` or `/exit`.
    Quit,
    /// A `/provider` argument that names no provider.
    BadProvider(String),
    Unknown(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Command::Unknown(trimmed.to_string());
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match verb {
        "/provider" => match rest {
            None => Command::Provider(None),
            Some(name) => match name.parse::<LlmProvider>() {
                Ok(p) => Command::Provider(Some(p)),
                Err(_) => Command::BadProvider(name.to_string()),
            },
        },
        "/new" => Command::New,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_switch_and_query() {
        assert_eq!(
            parse_command("/provider openai"),
            Command::Provider(Some(LlmProvider::OpenAi))
        );
        assert_eq!(
            parse_command("  /provider   ollama "),
            Command::Provider(Some(LlmProvider::Ollama))
        );
        assert_eq!(parse_command("/provider"), Command::Provider(None));
        assert_eq!(
            parse_command("/provider gemini"),
            Command::BadProvider("gemini".into())
        );
    }

    #[test]
    fn simple_verbs() {
        assert_eq!(parse_command("/new"), Command::New);
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("/claim x"), Command::Unknown("/claim x".into()));
    }
}
