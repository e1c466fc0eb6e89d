//! Bot construction and the command list

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use postacore::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Я умею:")]
pub enum Command {
    #[command(description = "показывает главное меню")]
    Start,
    #[command(description = "админ-панель (только для администраторов)")]
    Admin,
}

/// Creates a Bot instance with custom or default API URL
///
/// The token comes from BOT_TOKEN (or TELOXIDE_TOKEN).
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.as_str();
    if token.is_empty() {
        anyhow::bail!("BOT_TOKEN is not set");
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token, client);

    let bot = match config::BOT_API_URL.as_deref() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
///
/// `/admin` is left out of the menu; admins know it.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(vec![BotCommand::new("start", "показывает главное меню")])
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "postabot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/admin", "postabot").unwrap(), Command::Admin);
        assert_eq!(Command::parse("/start@postabot", "postabot").unwrap(), Command::Start);
        assert!(Command::parse("/plan", "postabot").is_err());
    }

    #[test]
    fn test_descriptions_list_both_commands() {
        let descriptions = Command::descriptions().to_string();
        assert!(descriptions.contains("/start"));
        assert!(descriptions.contains("/admin"));
    }
}
