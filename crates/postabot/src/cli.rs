use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "postabot")]
#[command(author, version, about = "Telegram bot for autoposting tariffs, private channels and crypto payments", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot with long polling (default)
    Run,

    /// Create missing tables, seed the default tariffs and exit
    Migrate,

    /// Print the tariff table
    Tariffs {
        /// Print as JSON instead of a text table
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["postabot"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_tariffs_json_flag() {
        let cli = Cli::try_parse_from(["postabot", "tariffs", "--json"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Tariffs { json: true }));

        let cli = Cli::try_parse_from(["postabot", "migrate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["postabot", "serve"]).is_err());
    }
}
