use clap::Subcommand;
use studyplan_core::integrations::{CurriculumClient, Integration, TrelloIntegration};
use studyplan_core::{Config, TrelloCredentials};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Trello: login / logout / status
    Trello {
        #[command(subcommand)]
        action: AuthOp,
    },
    /// Show every integration and whether it can be used
    Status,
}

#[derive(Subcommand)]
pub enum AuthOp {
    /// Store an API key and token in the OS keyring
    Login {
        /// Trello API key (https://trello.com/app-key)
        #[arg(long)]
        api_key: Option<String>,
        /// Trello token generated for the API key
        #[arg(long)]
        token: Option<String>,
        /// Check the credentials against Trello before reporting success
        #[arg(long)]
        verify: bool,
    },
    /// Remove stored credentials
    Logout,
    /// Check authentication status
    Status,
}

pub async fn run(action: AuthAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Trello { action: op } => handle_trello(op, config).await,
        AuthAction::Status => {
            let integrations: Vec<Box<dyn Integration>> = vec![
                Box::new(CurriculumClient::new(&config.curriculum.base_url)),
                Box::new(TrelloIntegration::new()),
            ];
            for integration in &integrations {
                let status = if integration.is_authenticated() {
                    "ready"
                } else {
                    "not configured"
                };
                println!("{:<12} {status}", integration.display_name());
            }
            Ok(())
        }
    }
}

async fn handle_trello(op: AuthOp, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match op {
        AuthOp::Login {
            api_key,
            token,
            verify,
        } => {
            let key = api_key.ok_or("--api-key required for Trello")?;
            let tok = token.ok_or("--token required for Trello")?;
            if verify {
                TrelloCredentials::new(key.as_str(), tok.as_str())
                    .verify(&config.trello.base_url)
                    .await?;
            }
            let mut t = TrelloIntegration::new();
            t.set_credentials(&key, &tok)?;
            println!("Trello authenticated");
        }
        AuthOp::Logout => {
            let mut t = TrelloIntegration::new();
            t.disconnect()?;
            println!("Trello disconnected");
        }
        AuthOp::Status => {
            let t = TrelloIntegration::new();
            let status = if t.is_authenticated() {
                "authenticated (keyring)"
            } else if TrelloCredentials::load().is_some() {
                "authenticated (environment or secrets file)"
            } else {
                "not authenticated"
            };
            println!("{status}");
        }
    }
    Ok(())
}
